//! Entity lump: `{ "key" "value" ... }` blocks of quoted strings.

use glam::Vec3;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Key/value pairs of one map entity, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityProperties {
    pairs: Vec<(String, String)>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EntityError {
    #[error("entity #{entity}: `{{` inside an open block")]
    NestedBlock { entity: usize },

    #[error("entity #{entity}: `}}` without matching `{{`")]
    UnmatchedClose { entity: usize },

    #[error("entity #{entity}: key `{key}` has no value")]
    MissingValue { entity: usize, key: String },

    #[error("entity #{entity}: block not closed")]
    Unterminated { entity: usize },
}

impl EntityProperties {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Copy the value of `key` into `out`; leaves `out` untouched when absent.
    pub fn try_get_string(&self, key: &str, out: &mut String) -> bool {
        match self.get(key) {
            Some(v) => {
                out.clear();
                out.push_str(v);
                true
            }
            None => false,
        }
    }

    pub fn classname(&self) -> Option<&str> {
        self.get("classname")
    }

    /// `name`, falling back to the `targetname` used by trigger chains.
    pub fn name(&self) -> Option<&str> {
        self.get("name").or_else(|| self.get("targetname"))
    }

    pub fn sky(&self) -> Option<&str> {
        self.get("sky")
    }

    /// `origin` as three whitespace separated numbers.
    pub fn origin(&self) -> Option<Vec3> {
        self.get_vec3("origin")
    }

    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.get(key)?.trim().parse().ok()
    }

    pub fn get_vec3(&self, key: &str) -> Option<Vec3> {
        let mut it = self.get(key)?.split_whitespace().map(str::parse::<f32>);
        let v = Vec3::new(it.next()?.ok()?, it.next()?.ok()?, it.next()?.ok()?);
        it.next().is_none().then_some(v)
    }

    /// Brush model referenced as `"model" "*N"`.
    pub fn model_index(&self) -> Option<u32> {
        self.get("model")?.strip_prefix('*')?.parse().ok()
    }

    pub fn is_worldspawn(&self) -> bool {
        self.classname() == Some("worldspawn")
    }
}

/// Split entity text into blocks.
///
/// Anything between tokens (whitespace, stray words) is skipped; structural
/// faults are errors.
pub fn parse_entities(text: &str) -> Result<Vec<EntityProperties>, EntityError> {
    static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)"|([{}])"#).unwrap());

    let mut out = Vec::new();
    let mut open: Option<Vec<(String, String)>> = None;
    let mut key: Option<String> = None;

    for cap in TOKEN.captures_iter(text) {
        let entity = out.len();
        match (cap.get(1), cap.get(2).map(|m| m.as_str())) {
            (_, Some("{")) => {
                if open.is_some() {
                    return Err(EntityError::NestedBlock { entity });
                }
                open = Some(Vec::new());
            }
            (_, Some(_)) => {
                let pairs = open.take().ok_or(EntityError::UnmatchedClose { entity })?;
                if let Some(key) = key.take() {
                    return Err(EntityError::MissingValue { entity, key });
                }
                out.push(EntityProperties::new(pairs));
            }
            (Some(s), None) => {
                let Some(pairs) = open.as_mut() else {
                    warn!("entity text: string {:?} outside any block ignored", s.as_str());
                    continue;
                };
                match key.take() {
                    Some(k) => pairs.push((k, s.as_str().to_owned())),
                    None => key = Some(s.as_str().to_owned()),
                }
            }
            (None, None) => {}
        }
    }

    if open.is_some() {
        return Err(EntityError::Unterminated { entity: out.len() });
    }
    Ok(out)
}

// ──────────────────────────────────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    const TEXT: &str = r#"
{
"classname" "worldspawn"
"sky" "sr"
"message" "Skidrow"
}
{
"origin" "-128 64 24.5"
"classname" "info_player_start"
"angle" "90"
}
{
"model" "*3"
"classname" "func_door"
"targetname" "t12"
}
"#;

    #[test]
    fn parses_blocks_in_order() {
        let ents = parse_entities(TEXT).unwrap();
        assert_eq!(ents.len(), 3);
        assert!(ents[0].is_worldspawn());
        assert_eq!(ents[0].sky(), Some("sr"));
        assert_eq!(ents[1].classname(), Some("info_player_start"));
        assert_eq!(ents[1].origin(), Some(vec3(-128.0, 64.0, 24.5)));
        assert_eq!(ents[1].get_f32("angle"), Some(90.0));
        assert_eq!(ents[2].model_index(), Some(3));
        assert_eq!(ents[2].name(), Some("t12"));
        let keys: Vec<_> = ents[1].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["origin", "classname", "angle"]);
    }

    #[test]
    fn try_get_string_keeps_output_on_miss() {
        let ents = parse_entities(TEXT).unwrap();
        let mut s = String::from("default");
        assert!(!ents[0].try_get_string("missing", &mut s));
        assert_eq!(s, "default");
        assert!(ents[0].try_get_string("message", &mut s));
        assert_eq!(s, "Skidrow");
    }

    #[test]
    fn empty_values_and_text() {
        assert!(parse_entities("").unwrap().is_empty());
        let ents = parse_entities(r#"{ "target" "" }"#).unwrap();
        assert_eq!(ents[0].get("target"), Some(""));
    }

    #[test]
    fn malformed_origin_is_none() {
        let ents = parse_entities(r#"{ "origin" "1 2" } { "origin" "1 2 x" } { "origin" "1 2 3 4" }"#).unwrap();
        assert!(ents.iter().all(|e| e.origin().is_none()));
    }

    #[test]
    fn structural_faults() {
        assert_eq!(
            parse_entities(r#"{ "a" "b" { }"#).unwrap_err(),
            EntityError::NestedBlock { entity: 0 }
        );
        assert_eq!(
            parse_entities(r#"{ } }"#).unwrap_err(),
            EntityError::UnmatchedClose { entity: 1 }
        );
        assert_eq!(
            parse_entities(r#"{ "a" "b" "c" }"#).unwrap_err(),
            EntityError::MissingValue { entity: 0, key: "c".into() }
        );
        assert_eq!(
            parse_entities(r#"{ "a" "b" } { "c" "d""#).unwrap_err(),
            EntityError::Unterminated { entity: 1 }
        );
    }

    #[test]
    fn stray_string_is_skipped() {
        let ents = parse_entities(r#""junk" { "classname" "light" }"#).unwrap();
        assert_eq!(ents.len(), 1);
        assert_eq!(ents[0].classname(), Some("light"));
    }
}

use super::{BrushModel, Classname, LeafLink, Name, Origin, PropertiesIndex, systems};
use crate::bsp::EntityProperties;
use crate::world::Level;
use glam::Vec3;
use hecs::{EntityBuilder, World};
use log::warn;

/// Spawn the map entity `props` (entry `index` of the entity lump).
///
/// `worldspawn` is the level itself and gets no simulation entity.
pub fn spawn_entity(
    world: &mut World,
    level: &Level,
    index: usize,
    props: &EntityProperties,
) -> Option<hecs::Entity> {
    if props.is_worldspawn() {
        return None;
    }

    let mut b = EntityBuilder::new();
    b.add(PropertiesIndex(index));

    if let Some(c) = props.classname() {
        b.add(Classname(c.to_owned()));
    } else {
        warn!("entity #{index} has no classname");
    }
    if let Some(n) = props.name() {
        b.add(Name(n.to_owned()));
    }

    let origin = props.origin();
    if let Some(o) = origin {
        b.add(Origin(o));
    }

    let brush = props.model_index().and_then(|m| {
        let model = level.models.get(m as usize).filter(|_| m != 0);
        if model.is_none() {
            warn!("entity #{index}: model *{m} does not exist");
        }
        let model = model?;
        let offset = origin.unwrap_or(Vec3::ZERO);
        Some(BrushModel {
            model: m,
            head: model.head,
            bounds: model.bounds.translated(offset),
            offset,
        })
    });
    if let Some(brush) = brush {
        b.add(brush);
    }

    let link = systems::leaves_for(level, origin.map(Origin).as_ref(), brush.as_ref());
    b.add(LeafLink(link));

    Some(world.spawn(b.build()))
}

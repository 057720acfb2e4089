use super::{BrushModel, LeafLink, Origin};
use crate::world::{LeafList, Level};
use hecs::World;

/// Leaves touched by a point entity (`origin`) or a brush entity (`brush`).
pub fn leaves_for(level: &Level, origin: Option<&Origin>, brush: Option<&BrushModel>) -> LeafList {
    match (brush, origin) {
        (Some(b), _) => level.leaves_in_box(&b.bounds),
        (None, Some(o)) => LeafList::from_slice(&[level.leaf_at(o.0)]),
        (None, None) => LeafList::new(),
    }
}

/// Refresh every entity's leaf link from its current position.
pub fn link_entities(world: &mut World, level: &Level) {
    for (_, (link, origin, brush)) in
        world.query_mut::<(&mut LeafLink, Option<&Origin>, Option<&BrushModel>)>()
    {
        link.0 = leaves_for(level, origin, brush);
    }
}

//! One loaded level: tree, entity list and the simulation around them.

use glam::Vec3;
use log::{info, warn};
use std::path::Path;

use crate::bsp::{BspFile, EntityProperties, LoadError, loader};
use crate::defs::{ContentFlags, SurfaceFlags};
use crate::sim::{BrushModel, PropertiesIndex, TicRunner};
use crate::world::{Face, FaceId, LeafId, Level, TexInfo, TraceResult};

/// Leaves farther than this from the eye are not drawn.
pub const RENDER_DISTANCE: f32 = 5000.0;

/// Receives the faces chosen by [`Map::render`], nearest leaves first.
pub trait FaceSink {
    fn draw_face(&mut self, id: FaceId, face: &Face, texinfo: &TexInfo);
}

pub struct Map {
    level: Level,
    entities: Vec<EntityProperties>,
    sim: TicRunner,
}

impl Map {
    /// Load a level file; the level is named after the file stem.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_bsp(&BspFile::from_file(path)?, &name)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, LoadError> {
        Self::from_bsp(&BspFile::from_bytes(bytes)?, "")
    }

    fn from_bsp(bsp: &BspFile, name: &str) -> Result<Self, LoadError> {
        let level = loader::load_level(bsp, name)?;
        let entities = loader::load_entities(bsp)?;

        if !entities.first().is_some_and(EntityProperties::is_worldspawn) {
            warn!("level `{name}`: first entity is not worldspawn");
        }

        let mut sim = TicRunner::new();
        let spawned = entities
            .iter()
            .enumerate()
            .filter_map(|(i, props)| sim.spawn_entity(&level, i, props))
            .count();
        info!("level `{name}`: {spawned} entities spawned");

        Ok(Self { level, entities, sim })
    }

    /*──────────────────────────── accessors ───────────────────────────*/

    #[inline]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[inline]
    pub fn entity_properties(&self) -> &[EntityProperties] {
        &self.entities
    }

    pub fn worldspawn(&self) -> Option<&EntityProperties> {
        self.entities.iter().find(|e| e.is_worldspawn())
    }

    /// Sky box name from worldspawn.
    pub fn sky(&self) -> Option<&str> {
        self.worldspawn()?.sky()
    }

    /// Properties of a spawned entity; `None` once it has been despawned.
    pub fn properties_of(&self, entity: hecs::Entity) -> Option<&EntityProperties> {
        let index = self.sim.world().get::<&PropertiesIndex>(entity).ok()?.0;
        self.entities.get(index)
    }

    #[inline]
    pub fn world(&self) -> &hecs::World {
        self.sim.world()
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut hecs::World {
        self.sim.world_mut()
    }

    /*──────────────────────────── queries ─────────────────────────────*/

    /// Trace through the world and every brush entity; the nearest hit wins.
    pub fn line_trace(&self, start: Vec3, end: Vec3, mask: ContentFlags) -> TraceResult {
        let mut best = self.level.trace(start, end, mask);
        if best.start_solid {
            return best;
        }

        let mut brushes = self.sim.world().query::<&BrushModel>();
        for (entity, brush) in brushes.iter() {
            match brush.bounds.clip_segment(start, end) {
                Some(enter) if enter <= best.fraction => {}
                _ => continue,
            }

            let mut tr =
                self.level
                    .trace_from(brush.head, start - brush.offset, end - brush.offset, mask);
            if tr.hit && tr.fraction < best.fraction {
                tr.end_position = start + (end - start) * tr.fraction;
                tr.entity = Some(entity);
                best = tr;
            }
        }
        best
    }

    /*──────────────────────────── frame hooks ─────────────────────────*/

    /// Advance the simulation by `dt` seconds; returns the tics run.
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.sim.pump(&self.level, dt)
    }

    /// Feed the faces of the leaves around `eye` to `sink`, front to back,
    /// each face once.  Returns the number of faces drawn.
    pub fn render<S: FaceSink>(&self, eye: Vec3, sink: &mut S) -> usize {
        let mut leaves: Vec<LeafId> = Vec::new();
        self.level.fill_visible_leaves(eye, RENDER_DISTANCE, &mut leaves);

        let mut drawn = vec![false; self.level.faces.len()];
        let mut count = 0;
        for &leaf in &leaves {
            for &id in self.level.leaf_faces(leaf) {
                if std::mem::replace(&mut drawn[id as usize], true) {
                    continue;
                }
                let face = &self.level.faces[id as usize];
                let texinfo = &self.level.texinfo[face.texinfo as usize];
                if texinfo.flags.contains(SurfaceFlags::NODRAW) {
                    continue;
                }
                sink.draw_face(id, face, texinfo);
                count += 1;
            }
        }
        count
    }
}

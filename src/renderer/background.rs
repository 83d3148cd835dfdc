//! Overworld scenery: hills, bushes and clouds repeated across the level
//!
//! Pieces that would cover a block or the castle are left out, ground
//! pieces need ground under their left edge, and bushes of one kind keep
//! a minimum distance from each other. Underground levels have none.

use std::collections::HashMap;

use super::{ImageId, Surface, blit};
use crate::sim::World;
use crate::sim::animation::SpriteRegion;
use crate::sim::collision::{Aabb, intersects};
use crate::sim::entity::EntityKind;
use crate::sim::level_end::Castle;

/// Horizontal period of the pattern
pub const PATTERN_WIDTH: f32 = 1500.0;
/// Sheet pixels are drawn at twice their size
const SCALE: f32 = 2.0;
/// Pieces placed below this line stand on the ground
const GROUND_LINE: f32 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneryKind {
    BigHill,
    SmallHill,
    SmallBush,
    MediumBush,
    LargeBush,
    Cloud,
    WideCloud,
}

impl SceneryKind {
    pub fn region(self) -> SpriteRegion {
        match self {
            SceneryKind::BigHill => SpriteRegion::new(0, 142, 82, 75),
            SceneryKind::SmallHill => SpriteRegion::new(256, 158, 100, 38),
            SceneryKind::SmallBush => SpriteRegion::new(376, 161, 32, 90),
            SceneryKind::MediumBush => SpriteRegion::new(664, 161, 64, 90),
            SceneryKind::LargeBush => SpriteRegion::new(184, 161, 70, 90),
            SceneryKind::Cloud => SpriteRegion::new(136, 17, 32, 24),
            SceneryKind::WideCloud => SpriteRegion::new(440, 17, 80, 24),
        }
    }

    fn min_spacing(self) -> Option<f32> {
        match self {
            SceneryKind::LargeBush => Some(200.0),
            SceneryKind::SmallBush | SceneryKind::MediumBush => Some(150.0),
            _ => None,
        }
    }
}

/// One period of the pattern: kind and top-left position
const PATTERN: [(SceneryKind, f32, f32); 8] = [
    (SceneryKind::BigHill, 20.0, 378.0),
    (SceneryKind::LargeBush, 380.0, 417.0),
    (SceneryKind::Cloud, 160.0, 100.0),
    (SceneryKind::SmallHill, 650.0, 410.0),
    (SceneryKind::Cloud, 580.0, 70.0),
    (SceneryKind::SmallBush, 757.0, 417.0),
    (SceneryKind::WideCloud, 880.0, 100.0),
    (SceneryKind::MediumBush, 1327.0, 417.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneryPiece {
    pub kind: SceneryKind,
    pub dest: Aabb,
}

/// The castle keeps scenery off its walls but not its battlements
fn castle_keep_out(castle: &Castle) -> Aabb {
    let a = castle.aabb;
    Aabb::new(a.pos.x + 40.0, a.pos.y + 60.0, a.size.x - 80.0, a.size.y - 60.0)
}

/// Every scenery piece the level shows, in draw order
pub fn scenery_layout(world: &World) -> Vec<SceneryPiece> {
    if world.info.underground {
        return Vec::new();
    }

    let mut blockers = Vec::new();
    let mut ground = Vec::new();
    for entity in world.entities() {
        match &entity.kind {
            // Bumped blocks count at rest so scenery does not flicker
            EntityKind::Block(b) => blockers.push(Aabb::new(b.aabb.pos.x, b.rest_y, b.aabb.size.x, b.aabb.size.y)),
            EntityKind::Castle(c) => blockers.push(castle_keep_out(c)),
            EntityKind::Ground(g) => ground.push((g.aabb.left(), g.aabb.right())),
            _ => {}
        }
    }

    let repeats = (world.info.width / PATTERN_WIDTH).ceil() as u32;
    let mut last_bush: HashMap<SceneryKind, f32> = HashMap::new();
    let mut pieces = Vec::new();
    for i in 0..repeats {
        let offset = i as f32 * PATTERN_WIDTH;
        for &(kind, x, y) in &PATTERN {
            let region = kind.region();
            let dest = Aabb::new(x + offset, y, region.w as f32 * SCALE, region.h as f32 * SCALE);
            if blockers.iter().any(|b| intersects(b, &dest)) {
                continue;
            }
            if y > GROUND_LINE {
                let left = dest.pos.x;
                if !ground.iter().any(|&(l, r)| left >= l && left <= r) {
                    continue;
                }
                if let Some(spacing) = kind.min_spacing() {
                    if last_bush.get(&kind).is_some_and(|&last| (left - last).abs() < spacing) {
                        continue;
                    }
                    last_bush.insert(kind, left);
                }
            }
            pieces.push(SceneryPiece { kind, dest });
        }
    }
    pieces
}

/// Draw the scenery the camera can see; runs in camera space before entities
pub fn draw_scenery(surface: &mut dyn Surface, world: &World) {
    for piece in scenery_layout(world) {
        if world.camera.is_visible(&piece.dest) {
            blit(surface, ImageId::Scenery, piece.kind.region(), piece.dest);
        }
    }
}

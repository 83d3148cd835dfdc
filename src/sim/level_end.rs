//! End-of-level markers: the flagpole that starts the finish sequence and
//! the castle the player walks into

use super::animation::SpriteRegion;
use super::collision::{Aabb, intersects};
use super::entity::{Siblings, UpdateCtx};
use super::state::GameEvent;
use crate::consts::FLAGPOLE_SCORE;

pub const FLAGPOLE_WIDTH: f32 = 16.0;
pub const FLAGPOLE_HEIGHT: f32 = 300.0;
/// Width of the touch zone centered on the pole
pub const FLAGPOLE_HITBOX_WIDTH: f32 = 10.0;

pub static POLE_TOP_REGION: SpriteRegion = SpriteRegion::new(136, 230, 16, 16);
pub static POLE_SEGMENT_REGION: SpriteRegion = SpriteRegion::new(143, 247, 16, 16);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flagpole {
    pub aabb: Aabb,
    pub triggered: bool,
}

impl Flagpole {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            aabb: Aabb::new(x, y, FLAGPOLE_WIDTH, FLAGPOLE_HEIGHT),
            triggered: false,
        }
    }

    pub fn hitbox(&self) -> Aabb {
        let inset = (self.aabb.size.x - FLAGPOLE_HITBOX_WIDTH) / 2.0;
        Aabb::new(
            self.aabb.pos.x + inset,
            self.aabb.pos.y,
            FLAGPOLE_HITBOX_WIDTH,
            self.aabb.size.y,
        )
    }

    pub fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) -> bool {
        if self.triggered {
            return false;
        }
        let hitbox = self.hitbox();
        let Some(player) = siblings.player_mut() else { return false };
        if player.can_grab_pole() && intersects(&player.body.aabb(), &hitbox) {
            self.triggered = true;
            player.start_pole_slide(self.aabb.center().x, self.aabb.bottom());
            log::info!("flagpole reached");
            ctx.emit(GameEvent::Score(FLAGPOLE_SCORE));
            ctx.emit(GameEvent::FlagpoleReached);
        }
        false
    }
}

pub const CASTLE_SIZE: f32 = 320.0;
/// Door position from the castle's left edge
pub const CASTLE_DOOR_OFFSET: f32 = 64.0;
pub const CASTLE_FLAG_RISE: f32 = 40.0;
pub const CASTLE_FLAG_SPEED: f32 = 2.0;

pub static CASTLE_REGION: SpriteRegion = SpriteRegion::new(247, 863, 160, 160);

/// Decorative, non-solid. Drives the player's walk to the door once the
/// finish sequence hands it over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Castle {
    pub aabb: Aabb,
    pub entering: bool,
    pub flag_y: f32,
    pub flag_rising: bool,
}

impl Castle {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            aabb: Aabb::new(x, y, CASTLE_SIZE, CASTLE_SIZE),
            entering: false,
            flag_y: y,
            flag_rising: false,
        }
    }

    #[inline]
    pub fn door_x(&self) -> f32 {
        self.aabb.pos.x + CASTLE_DOOR_OFFSET
    }

    pub fn flag_target_y(&self) -> f32 {
        self.aabb.pos.y - CASTLE_FLAG_RISE
    }

    /// Called by the player once it lands after the flagpole
    pub fn start_player_entrance(&mut self) {
        self.entering = true;
    }

    pub fn update(&mut self, siblings: &mut Siblings<'_>) -> bool {
        if !self.entering {
            return false;
        }
        let door_x = self.door_x();
        if let Some(player) = siblings.player_mut() {
            player.start_castle_entry(door_x);
            if player.is_inside_castle() {
                self.flag_rising = true;
            }
        }

        if self.flag_rising {
            self.flag_y = (self.flag_y - CASTLE_FLAG_SPEED).max(self.flag_target_y());
        }
        false
    }
}

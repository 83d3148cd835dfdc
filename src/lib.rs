//! Block Hopper - A side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, level lifecycle)
//! - `renderer`: Render boundary (surface trait, sprite tables, draw pass)
//! - `audio`: Audio boundary (sound effects, best-effort playback)
//! - `settings`: Key bindings, volumes and camera tuning

pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{CameraConfig, KeyBindings, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (one tick per display frame)
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 480.0;

    /// Downward acceleration shared by walking entities (pixels/tick²)
    pub const GRAVITY: f32 = 0.8;

    /// Below `level height + FALL_MARGIN` an entity has fallen out of the level
    pub const FALL_MARGIN: f32 = 120.0;
    /// Below `level height + DEATH_PLANE_MARGIN` the death fall is over
    pub const DEATH_PLANE_MARGIN: f32 = 320.0;

    /// Points
    pub const COIN_SCORE: u32 = 200;
    pub const STOMP_SCORE: u32 = 200;
    pub const KICK_SCORE: u32 = 400;
    pub const FLAGPOLE_SCORE: u32 = 400;
    pub const POWER_UP_SCORE: u32 = 1000;

    /// HUD defaults
    pub const STARTING_LIVES: u32 = 3;
    pub const LEVEL_TIME: u32 = 300;
    pub const COINS_PER_LIFE: u32 = 100;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No randomness
//! - Stable iteration order (spawn order, changed only by removal)
//! - No rendering or platform dependencies

pub mod animation;
pub mod blocks;
pub mod camera;
pub mod collision;
pub mod enemies;
pub mod entity;
pub mod hud;
pub mod items;
pub mod level;
pub mod level_end;
pub mod player;
pub mod state;
pub mod terrain;
pub mod tick;
pub mod timer;
pub mod world;

pub use camera::Camera;
pub use collision::{Aabb, Body, Contact, intersects, resolve_axis_separation};
pub use entity::{Entity, EntityId, EntityKind, LevelInfo};
pub use hud::{Hud, HudState};
pub use level::LevelDefinition;
pub use player::{Player, PlayerMode};
pub use state::{GameEvent, GameState, LevelError, LevelPhase};
pub use tick::{InputState, TickInput, tick};
pub use timer::Countdown;
pub use world::World;

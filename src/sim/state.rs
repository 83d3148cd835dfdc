//! Game state and the level lifecycle
//!
//! `GameState` owns the loaded level list, the live world and the HUD, and
//! exposes the three lifecycle calls a menu may make: load, restart, next.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hud::Hud;
use super::level::LevelDefinition;
use super::player::Player;
use super::timer::Countdown;
use super::world::World;
use crate::settings::CameraConfig;

/// Ticks between reaching the castle and the next level appearing
pub const TRANSITION_TICKS: u32 = 90;

/// Something that happened during a tick, for the HUD, lifecycle, audio and UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Score(u32),
    CoinCollected,
    /// A block was struck from below without breaking
    BlockBumped,
    BrickBroken,
    PowerUpSpawned,
    PowerUpCollected,
    EnemyStomped,
    ShellKicked,
    /// A sliding shell took out another enemy
    EnemyKnockedOut,
    PlayerJumped,
    /// Super form lost to a hit
    PlayerDamaged,
    PlayerDied,
    /// The player fell out or finished dying and was put back at spawn
    PlayerLost,
    FlagpoleReached,
    LevelComplete,
}

/// Current phase of the loaded level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelPhase {
    Playing,
    /// Finished; counting down to the next level
    Transitioning(Countdown),
    /// The last level was finished
    Completed,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level index {index} out of range ({count} levels)")]
    InvalidIndex { index: usize, count: usize },
    #[error("level data could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    levels: Vec<LevelDefinition>,
    current: usize,
    camera: CameraConfig,
    pub world: World,
    pub hud: Hud,
    pub phase: LevelPhase,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Start on the first of `levels`
    pub fn new(levels: Vec<LevelDefinition>, camera: CameraConfig) -> Result<Self, LevelError> {
        let first = levels
            .first()
            .ok_or(LevelError::InvalidIndex { index: 0, count: 0 })?;
        let world = first.instantiate(camera);
        log::info!("Loaded level {} (0/{})", first.id, levels.len());
        Ok(Self {
            levels,
            current: 0,
            camera,
            world,
            hud: Hud::new(),
            phase: LevelPhase::Playing,
            events: Vec::new(),
            time_ticks: 0,
        })
    }

    pub fn with_builtin_levels(camera: CameraConfig) -> Result<Self, LevelError> {
        Self::new(LevelDefinition::builtin()?, camera)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn current_level(&self) -> usize {
        self.current
    }

    pub fn definition(&self) -> &LevelDefinition {
        &self.levels[self.current]
    }

    /// Replace the world with a fresh copy of level `index` and resume
    /// play. An index out of range changes nothing.
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelError> {
        let Some(def) = self.levels.get(index) else {
            let err = LevelError::InvalidIndex {
                index,
                count: self.levels.len(),
            };
            log::warn!("Rejected level load: {err}");
            return Err(err);
        };
        self.world = def.instantiate(self.camera);
        self.current = index;
        self.phase = LevelPhase::Playing;
        self.hud.resume_play();
        log::info!("Loaded level {} ({}/{})", def.id, index, self.levels.len());
        Ok(())
    }

    /// Reload the current level from its definition
    pub fn restart_level(&mut self) {
        if let Err(err) = self.load_level(self.current) {
            log::warn!("Restart failed: {err}");
        }
    }

    /// Advance to the following level, keeping super form. Returns false
    /// (and marks the run completed) when there is none.
    pub fn next_level(&mut self) -> bool {
        let next = self.current + 1;
        if next >= self.levels.len() {
            log::info!("All levels complete; final score {}", self.hud.score);
            self.phase = LevelPhase::Completed;
            return false;
        }
        let carry_super = self.world.player().is_some_and(Player::is_super);
        if self.load_level(next).is_err() {
            return false;
        }
        if carry_super {
            if let Some(player) = self.world.player_mut() {
                player.make_super();
            }
        }
        true
    }

    /// Begin the countdown to the next level (once)
    pub fn complete_level(&mut self) {
        if self.phase == LevelPhase::Playing {
            log::info!("Level {} complete", self.definition().id);
            self.phase = LevelPhase::Transitioning(Countdown::new(TRANSITION_TICKS));
        }
    }

    /// Take every event reported since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

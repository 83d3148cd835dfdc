//! Frame-based sprite animation driver
//!
//! Purely presentational: gameplay never reads the current frame. Given the
//! same sequence of `set_state`/`tick` calls the driver always lands on the
//! same frame.

use serde::{Deserialize, Serialize};

/// A rectangle inside a sprite sheet, in sheet pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRegion {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl SpriteRegion {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }
}

/// Logical animation states shared by every animated entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimState {
    IdleRight,
    IdleLeft,
    WalkRight,
    WalkLeft,
    JumpRight,
    JumpLeft,
    TurnRight,
    TurnLeft,
    CrouchRight,
    CrouchLeft,
    Death,
    FlagpoleLeft,
    FlagpoleRight,
    FlagpoleJumpOff,
    /// Generic looping state for single-clip entities (blocks, enemies)
    Loop,
    /// Generic held state (used blocks, shells, squashed enemies)
    Hold,
}

impl AnimState {
    pub fn idle(facing: f32) -> Self {
        if facing >= 0.0 { Self::IdleRight } else { Self::IdleLeft }
    }

    pub fn walk(facing: f32) -> Self {
        if facing >= 0.0 { Self::WalkRight } else { Self::WalkLeft }
    }

    pub fn jump(facing: f32) -> Self {
        if facing >= 0.0 { Self::JumpRight } else { Self::JumpLeft }
    }

    pub fn crouch(facing: f32) -> Self {
        if facing >= 0.0 { Self::CrouchRight } else { Self::CrouchLeft }
    }
}

/// Frames for one state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub frames: &'static [SpriteRegion],
    pub looping: bool,
    /// Ticks each frame is shown (looping clips only)
    pub frame_delay: u32,
}

impl Clip {
    pub const fn held(frames: &'static [SpriteRegion]) -> Self {
        Self {
            frames,
            looping: false,
            frame_delay: 0,
        }
    }

    pub const fn looped(frames: &'static [SpriteRegion], frame_delay: u32) -> Self {
        Self {
            frames,
            looping: true,
            frame_delay,
        }
    }
}

/// State name → clip mapping
pub type ClipTable = [(AnimState, Clip)];

/// Per-instance animation cursor over a static clip table
#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    table: &'static ClipTable,
    state: AnimState,
    frame: usize,
    timer: u32,
}

impl Animator {
    pub fn new(table: &'static ClipTable, state: AnimState) -> Self {
        Self {
            table,
            state,
            frame: 0,
            timer: 0,
        }
    }

    /// Switch state. Re-entering the current state keeps frame and timer.
    pub fn set_state(&mut self, state: AnimState) {
        if self.state != state {
            self.state = state;
            self.frame = 0;
            self.timer = 0;
        }
    }

    /// Swap clip tables (e.g. small → super form), restarting the state
    pub fn set_table(&mut self, table: &'static ClipTable) {
        self.table = table;
        self.frame = 0;
        self.timer = 0;
    }

    /// Advance one tick. Only looping clips move.
    pub fn tick(&mut self) {
        let Some(clip) = self.clip() else { return };
        if !clip.looping || clip.frames.is_empty() {
            return;
        }
        self.timer += 1;
        if self.timer >= clip.frame_delay {
            self.timer = 0;
            self.frame = (self.frame + 1) % clip.frames.len();
        }
    }

    pub fn clip(&self) -> Option<&'static Clip> {
        self.table
            .iter()
            .find(|(state, _)| *state == self.state)
            .map(|(_, clip)| clip)
    }

    /// Region to draw this tick, if the state has any frames
    pub fn current_frame(&self) -> Option<SpriteRegion> {
        self.clip().and_then(|clip| clip.frames.get(self.frame).copied())
    }

    #[inline]
    pub fn state(&self) -> AnimState {
        self.state
    }

    #[inline]
    pub fn frame_index(&self) -> usize {
        self.frame
    }

    #[inline]
    pub fn frame_timer(&self) -> u32 {
        self.timer
    }
}

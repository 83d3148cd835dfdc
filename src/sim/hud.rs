//! Score, clock, coins and lives, plus the death / time-up / game-over
//! display sequence that runs between attempts

use super::state::GameEvent;
use super::timer::Countdown;
use crate::consts::{COIN_SCORE, COINS_PER_LIFE, LEVEL_TIME, STARTING_LIVES, TICKS_PER_SECOND};

pub const DEATH_DELAY_TICKS: u32 = 70;
pub const TIME_UP_TICKS: u32 = 120;
pub const GAME_OVER_TICKS: u32 = 300;

/// Screen shown once the death delay ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    TimeUp,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HudState {
    Playing,
    DeathAnimation { cause: DeathCause, delay: Countdown },
    TimeUp(Countdown),
    GameOver(Countdown),
}

/// What the HUD asks the level lifecycle to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudSignal {
    /// The clock ran out
    KillPlayer,
    RestartLevel,
    /// Game over finished; start again from the first level
    ResetGame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u32,
    /// Game-seconds left
    pub time: u32,
    pub coins: u32,
    pub lives: u32,
    /// Ticks into the current game-second
    clock: u32,
    pub state: HudState,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            score: 0,
            time: LEVEL_TIME,
            coins: 0,
            lives: STARTING_LIVES,
            clock: 0,
            state: HudState::Playing,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == HudState::Playing
    }

    /// The world stops updating while a full-screen message is shown
    pub fn freezes_world(&self) -> bool {
        matches!(self.state, HudState::TimeUp(_) | HudState::GameOver(_))
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn add_coin(&mut self) {
        self.coins += 1;
        self.add_score(COIN_SCORE);
        if self.coins >= COINS_PER_LIFE {
            self.coins = 0;
            self.lives += 1;
            log::info!("extra life ({} lives)", self.lives);
        }
    }

    pub fn apply_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Score(points) => self.add_score(*points),
            GameEvent::CoinCollected => self.add_coin(),
            _ => {}
        }
    }

    /// Deduct a life; the last one starts the game-over sequence
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.start_death(DeathCause::GameOver);
        }
    }

    fn start_death(&mut self, cause: DeathCause) {
        log::info!("death sequence: {cause:?}");
        self.state = HudState::DeathAnimation {
            cause,
            delay: Countdown::new(DEATH_DELAY_TICKS),
        };
    }

    pub fn reset_timer(&mut self) {
        self.time = LEVEL_TIME;
        self.clock = 0;
    }

    /// Drop any death, time-up or game-over sequence for a freshly loaded
    /// level. Abandoning a game over starts a new game.
    pub fn resume_play(&mut self) {
        if self.lives == 0 {
            self.reset();
        }
        self.state = HudState::Playing;
        self.reset_timer();
    }

    /// Back to a fresh game
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance one tick. `clock_running` is false while the level is not
    /// being played (finish sequence, transitions).
    pub fn tick(&mut self, clock_running: bool) -> Option<HudSignal> {
        match self.state {
            HudState::Playing => {
                if !clock_running || self.time == 0 {
                    return None;
                }
                self.clock += 1;
                if self.clock < TICKS_PER_SECOND {
                    return None;
                }
                self.clock = 0;
                self.time -= 1;
                if self.time > 0 {
                    return None;
                }
                // The clock's own death costs the life here; the lost
                // attempt reported by the player later is not counted again
                self.lives = self.lives.saturating_sub(1);
                let cause = if self.lives == 0 {
                    DeathCause::GameOver
                } else {
                    DeathCause::TimeUp
                };
                self.start_death(cause);
                Some(HudSignal::KillPlayer)
            }
            HudState::DeathAnimation { cause, mut delay } => {
                self.state = if delay.tick() {
                    match cause {
                        DeathCause::TimeUp => HudState::TimeUp(Countdown::new(TIME_UP_TICKS)),
                        DeathCause::GameOver => HudState::GameOver(Countdown::new(GAME_OVER_TICKS)),
                    }
                } else {
                    HudState::DeathAnimation { cause, delay }
                };
                None
            }
            HudState::TimeUp(mut shown) => {
                if !shown.tick() {
                    self.state = HudState::TimeUp(shown);
                    return None;
                }
                if self.lives > 0 {
                    self.state = HudState::Playing;
                    self.reset_timer();
                    Some(HudSignal::RestartLevel)
                } else {
                    self.state = HudState::GameOver(Countdown::new(GAME_OVER_TICKS));
                    None
                }
            }
            HudState::GameOver(mut shown) => {
                if !shown.tick() {
                    self.state = HudState::GameOver(shown);
                    return None;
                }
                log::info!("game over; final score {}", self.score);
                self.reset();
                Some(HudSignal::ResetGame)
            }
        }
    }
}

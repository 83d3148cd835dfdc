//! Block Hopper entry point
//!
//! Headless native runner: plays the built-in levels with a seeded
//! autopilot, drawing every frame into a recorded draw list.
//!
//! Usage: `block-hopper [ticks] [seed] [settings.json]`

use std::env;
use std::process::ExitCode;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use block_hopper::Settings;
use block_hopper::audio::{AudioManager, LogSink};
use block_hopper::consts::TICKS_PER_SECOND;
use block_hopper::renderer::{DrawList, draw_frame};
use block_hopper::sim::{GameEvent, GameState, InputState, LevelPhase, TickInput, tick};

const DEFAULT_TICKS: u64 = 60 * 120;
const DEFAULT_SEED: u64 = 0x5eed;
const DEFAULT_SETTINGS: &str = "settings.json";

/// Chance per tick of starting a jump press
const JUMP_CHANCE: f64 = 0.04;
/// How long a jump is held (ticks)
const JUMP_HOLD: std::ops::Range<u32> = 4..20;
/// Chance per tick of letting go of right for a moment
const PAUSE_CHANCE: f64 = 0.005;

/// Scripted key presses: hold right, jump at random
struct Autopilot {
    rng: Pcg32,
    jump_ticks: u32,
    pause_ticks: u32,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            jump_ticks: 0,
            pause_ticks: 0,
        }
    }

    /// Host-style key snapshot for the next tick
    fn keys(&mut self) -> InputState {
        if self.jump_ticks == 0 && self.rng.random_bool(JUMP_CHANCE) {
            self.jump_ticks = self.rng.random_range(JUMP_HOLD);
        }
        if self.pause_ticks == 0 && self.rng.random_bool(PAUSE_CHANCE) {
            self.pause_ticks = self.rng.random_range(10..40);
        }

        let mut keys = InputState::new();
        keys.insert("ArrowRight".to_string(), self.pause_ticks == 0);
        keys.insert("ArrowUp".to_string(), self.jump_ticks > 0);
        self.jump_ticks = self.jump_ticks.saturating_sub(1);
        self.pause_ticks = self.pause_ticks.saturating_sub(1);
        keys
    }
}

/// Run totals for the closing summary
#[derive(Debug, Default)]
struct RunStats {
    coins: u32,
    stomps: u32,
    deaths: u32,
    levels_cleared: u32,
    draw_commands: usize,
}

impl RunStats {
    fn record(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::CoinCollected => self.coins += 1,
                GameEvent::EnemyStomped => self.stomps += 1,
                GameEvent::PlayerLost => self.deaths += 1,
                GameEvent::LevelComplete => self.levels_cleared += 1,
                _ => {}
            }
        }
    }
}

/// Game instance holding all state
struct Game {
    state: GameState,
    settings: Settings,
    audio: AudioManager<LogSink>,
    draw_list: DrawList,
    autopilot: Autopilot,
    stats: RunStats,
}

impl Game {
    fn new(settings: Settings, seed: u64) -> Result<Self, block_hopper::sim::LevelError> {
        Ok(Self {
            state: GameState::with_builtin_levels(settings.camera)?,
            audio: AudioManager::from_settings(LogSink::default(), &settings),
            settings,
            draw_list: DrawList::new(),
            autopilot: Autopilot::new(seed),
            stats: RunStats::default(),
        })
    }

    /// One fixed step: input, simulation, audio, draw
    fn frame(&mut self) {
        let keys = self.autopilot.keys();
        let input = TickInput::from_keys(&keys, &self.settings.keys);
        tick(&mut self.state, &input);

        let events = self.state.drain_events();
        self.stats.record(&events);
        self.audio.handle_events(&events);

        self.draw_list.clear();
        draw_frame(&mut self.draw_list, &self.state, &self.settings);
        self.stats.draw_commands += self.draw_list.commands.len();
    }

    fn finished(&self) -> bool {
        self.state.phase == LevelPhase::Completed
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> T {
    match args.get(index) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparseable argument {raw:?}");
            default
        }),
        None => default,
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Block Hopper (headless) starting...");

    let args: Vec<String> = env::args().skip(1).collect();
    let ticks: u64 = parse_arg(&args, 0, DEFAULT_TICKS);
    let seed: u64 = parse_arg(&args, 1, DEFAULT_SEED);
    let settings_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_SETTINGS);
    let settings = Settings::load(settings_path);

    let mut game = match Game::new(settings, seed) {
        Ok(game) => game,
        Err(err) => {
            log::error!("Could not load levels: {err}");
            return ExitCode::FAILURE;
        }
    };

    for t in 0..ticks {
        game.frame();
        if t % (TICKS_PER_SECOND as u64 * 10) == 0 {
            let hud = &game.state.hud;
            log::debug!(
                "t={t} level={} score={} time={} lives={}",
                game.state.current_level(),
                hud.score,
                hud.time,
                hud.lives
            );
        }
        if game.finished() {
            log::info!("All levels cleared after {t} ticks");
            break;
        }
    }

    let hud = &game.state.hud;
    log::info!(
        "Run over: level {}/{}, score {}, lives {}, coins {}, stomps {}, deaths {}, levels cleared {}",
        game.state.current_level() + 1,
        game.state.level_count(),
        hud.score,
        hud.lives,
        game.stats.coins,
        game.stats.stomps,
        game.stats.deaths,
        game.stats.levels_cleared
    );
    log::info!(
        "{} draw commands, {} sounds",
        game.stats.draw_commands,
        game.audio.sink().played
    );
    ExitCode::SUCCESS
}

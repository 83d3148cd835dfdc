//! End-to-end gameplay scenarios driven through the public API

use block_hopper::consts::{COIN_SCORE, FLAGPOLE_SCORE, STOMP_SCORE};
use block_hopper::settings::CameraConfig;
use block_hopper::sim::blocks::{Block, BlockContent, BlockKind};
use block_hopper::sim::enemies::Walker;
use block_hopper::sim::items::{COIN_FADE_TICKS, CoinState};
use block_hopper::sim::level_end::{Castle, Flagpole};
use block_hopper::sim::player::{POLE_SLIDE_TICKS, Player};
use block_hopper::sim::state::TRANSITION_TICKS;
use block_hopper::sim::terrain::Ground;
use block_hopper::sim::{
    Camera, EntityKind, GameEvent, GameState, Hud, LevelDefinition, LevelInfo, LevelPhase, TickInput, World, tick,
};

fn empty_world(width: f32) -> World {
    let info = LevelInfo {
        width,
        height: 480.0,
        underground: false,
    };
    World::new(info, Camera::new(800.0, 480.0, CameraConfig::default()))
}

fn floor(world: &mut World, width: f32) {
    world.spawn(EntityKind::Ground(Ground::new(0.0, 448.0, width, 32.0)));
}

fn step(world: &mut World) -> Vec<GameEvent> {
    let mut events = Vec::new();
    world.tick(&TickInput::default(), &mut events);
    events
}

fn coin_state(world: &World) -> Option<(f32, CoinState)> {
    world.entities().iter().find_map(|e| match &e.kind {
        EntityKind::Coin(c) => Some((c.aabb.pos.y, c.state)),
        _ => None,
    })
}

#[test]
fn coin_pops_out_rises_falls_and_scores() {
    let mut world = empty_world(1000.0);
    let player = world.spawn(EntityKind::Player(Player::new(105.0, 335.0)));
    floor(&mut world, 1000.0);
    world.spawn(EntityKind::Block(Block::new(100.0, 300.0, BlockKind::Question, BlockContent::Coin)));
    if let Some(p) = world.player_mut() {
        p.body.vel.y = -5.0;
    }

    let mut hud = Hud::new();
    let mut bumped = 0;
    let mut peak = f32::MAX;
    let mut collected_at = None;
    let mut removed_at = None;
    for t in 0..80 {
        let events = step(&mut world);
        bumped += events.iter().filter(|e| **e == GameEvent::BlockBumped).count();
        for event in &events {
            hud.apply_event(event);
        }
        match coin_state(&world) {
            Some((y, state)) => {
                peak = peak.min(y);
                if collected_at.is_none() && events.contains(&GameEvent::CoinCollected) {
                    assert_eq!(y, 300.0);
                    assert!(matches!(state, CoinState::Removing(_)));
                    collected_at = Some(t);
                }
            }
            None if collected_at.is_some() && removed_at.is_none() => removed_at = Some(t),
            None => {}
        }
    }

    assert_eq!(bumped, 1, "a bonus block releases its content once");
    assert_eq!(peak, 300.0 - 64.0);
    let collected_at = collected_at.expect("coin was never collected");
    assert_eq!(removed_at, Some(collected_at + COIN_FADE_TICKS as i32));
    assert_eq!(hud.score, COIN_SCORE);
    assert_eq!(hud.coins, 1);
    assert!(world.get(player).is_some());
}

fn stomp_setup(vel_y: f32) -> (World, Vec<GameEvent>) {
    let mut world = empty_world(1000.0);
    let mut player = Player::new(200.0, 180.0);
    player.body.vel.y = vel_y;
    world.spawn(EntityKind::Player(player));
    world.spawn(EntityKind::Walker(Walker::new(200.0, 200.0)));
    let events = step(&mut world);
    (world, events)
}

fn walker_alive(world: &World) -> bool {
    world.entities().iter().any(|e| matches!(&e.kind, EntityKind::Walker(w) if w.is_alive()))
}

#[test]
fn descending_onto_walker_stomps_it() {
    let (world, events) = stomp_setup(5.0);
    assert!(events.contains(&GameEvent::EnemyStomped));
    assert!(events.contains(&GameEvent::Score(STOMP_SCORE)));
    assert!(!events.contains(&GameEvent::PlayerDied));
    assert!(!walker_alive(&world));
    assert!(world.player().is_some_and(|p| !p.is_dying() && p.body.vel.y < 0.0));
}

#[test]
fn rising_into_walker_hurts_player() {
    let (world, events) = stomp_setup(-1.0);
    assert!(!events.contains(&GameEvent::EnemyStomped));
    assert!(events.contains(&GameEvent::PlayerDied));
    assert!(walker_alive(&world));
    assert!(world.player().is_some_and(Player::is_dying));
}

#[test]
fn flagpole_slide_leads_into_castle_without_input() {
    let mut world = empty_world(2000.0);
    world.spawn(EntityKind::Player(Player::new(490.0, 300.0)));
    floor(&mut world, 2000.0);
    world.spawn(EntityKind::Flagpole(Flagpole::new(500.0, 148.0)));
    world.spawn(EntityKind::Castle(Castle::new(700.0, 128.0)));

    let mut hud = Hud::new();
    let mut reached = 0;
    let mut progress = Vec::new();
    let mut complete_at = None;
    for t in 0..1000 {
        let events = step(&mut world);
        for event in &events {
            hud.apply_event(event);
        }
        reached += events.iter().filter(|e| **e == GameEvent::FlagpoleReached).count();
        if let Some(p) = world.player().and_then(Player::slide_progress) {
            if progress.last() != Some(&1.0) {
                progress.push(p);
            }
        }
        if events.contains(&GameEvent::LevelComplete) {
            complete_at = Some(t);
            break;
        }
    }

    assert_eq!(reached, 1);
    assert_eq!(hud.score, FLAGPOLE_SCORE);
    // First entry is the grab itself (progress 0), then one step per tick
    assert_eq!(progress.len(), POLE_SLIDE_TICKS as usize + 1);
    assert!(progress.windows(2).all(|w| w[1] > w[0]));
    assert_eq!(progress.last(), Some(&1.0));
    assert!(complete_at.is_some(), "castle sequence never finished");
    assert!(world.player().is_some_and(Player::is_inside_castle));

    // The castle flag rises once the player is inside
    for _ in 0..30 {
        step(&mut world);
    }
    let castle = world.entities().iter().find_map(|e| match &e.kind {
        EntityKind::Castle(c) => Some(*c),
        _ => None,
    });
    assert!(castle.is_some_and(|c| c.flag_y == c.flag_target_y()));
}

#[test]
fn restart_reloads_identical_level() {
    let mut state = GameState::with_builtin_levels(CameraConfig::default()).unwrap();
    let initial = state.world.entities().to_vec();

    let right = TickInput {
        right: true,
        ..TickInput::default()
    };
    for _ in 0..120 {
        tick(&mut state, &right);
    }
    assert_ne!(state.world.entities(), &initial[..]);

    state.restart_level();
    let first = state.world.entities().to_vec();
    state.restart_level();
    assert_eq!(first, initial);
    assert_eq!(state.world.entities(), &first[..]);
}

const SHORT_LEVELS: &str = r#"[
    {
        "id": "a",
        "width": 1200,
        "height": 480,
        "player_spawn": { "x": 490, "y": 300 },
        "ground_segments": [ { "x": 0, "width": 1200, "height": 32 } ],
        "level_end": {
            "flagpole": { "x": 500, "y": 148 },
            "castle": { "x": 700, "y": 128 }
        }
    },
    {
        "id": "b",
        "width": 1200,
        "height": 480,
        "underground": true,
        "player_spawn": { "x": 100, "y": 380 },
        "ground_segments": [ { "x": 0, "width": 1200, "height": 32 } ]
    }
]"#;

#[test]
fn finishing_a_level_loads_the_next_after_transition() {
    let levels = LevelDefinition::parse_list(SHORT_LEVELS).unwrap();
    let mut state = GameState::new(levels, CameraConfig::default()).unwrap();

    let mut transition_started = None;
    for t in 0..2000 {
        tick(&mut state, &TickInput::default());
        if transition_started.is_none() && matches!(state.phase, LevelPhase::Transitioning(_)) {
            transition_started = Some(t);
        }
        if state.current_level() == 1 {
            // The countdown starts ticking in the same call that finished the level
            assert_eq!(transition_started.map(|s| t - s), Some(TRANSITION_TICKS as i32 - 1));
            break;
        }
    }

    assert_eq!(state.current_level(), 1);
    assert_eq!(state.phase, LevelPhase::Playing);
    assert!(state.world.info.underground);
    assert_eq!(state.hud.score, FLAGPOLE_SCORE);
    let events = state.drain_events();
    assert_eq!(events.iter().filter(|e| **e == GameEvent::LevelComplete).count(), 1);
}

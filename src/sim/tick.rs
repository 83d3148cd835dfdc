//! Fixed timestep simulation tick
//!
//! One call advances the world by one display frame, then folds what the
//! entities reported into the HUD and the level lifecycle.

use std::collections::HashMap;

use super::hud::HudSignal;
use super::state::{GameEvent, GameState, LevelPhase};
use crate::settings::KeyBindings;

/// Raw host key state: key name -> pressed
pub type InputState = HashMap<String, bool>;

/// Logical input for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Crouch (super form only)
    pub down: bool,
}

impl TickInput {
    /// Map a host key snapshot through the bindings
    pub fn from_keys(keys: &InputState, bindings: &KeyBindings) -> Self {
        let held = |names: &[String]| names.iter().any(|name| keys.get(name).copied().unwrap_or(false));
        Self {
            left: held(&bindings.left),
            right: held(&bindings.right),
            jump: held(&bindings.jump),
            down: held(&bindings.down),
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;
    let mut events = Vec::new();

    // Full-screen messages and the finished run hold the world still
    if !state.hud.freezes_world() && state.phase != LevelPhase::Completed {
        let live = state.hud.is_playing() && state.phase == LevelPhase::Playing;
        let input = if live { *input } else { TickInput::default() };
        state.world.tick(&input, &mut events);
    }

    let mut lost = false;
    let mut completed = false;
    for event in &events {
        state.hud.apply_event(event);
        match event {
            GameEvent::PlayerLost => lost = true,
            GameEvent::LevelComplete => completed = true,
            _ => {}
        }
    }
    if lost {
        handle_player_lost(state);
    } else if completed {
        state.complete_level();
    }

    match state.hud.tick(state.phase == LevelPhase::Playing) {
        Some(HudSignal::KillPlayer) => {
            if let Some(player) = state.world.player_mut() {
                player.die(&mut events);
            }
        }
        Some(HudSignal::RestartLevel) => state.restart_level(),
        Some(HudSignal::ResetGame) => {
            if let Err(err) = state.load_level(0) {
                log::warn!("Reset failed: {err}");
            }
        }
        None => {}
    }

    if let LevelPhase::Transitioning(mut countdown) = state.phase {
        if countdown.tick() {
            state.next_level();
        } else {
            state.phase = LevelPhase::Transitioning(countdown);
        }
    }

    state.events.extend(events);
}

/// A finished death fall or a pit fall costs a life. While the clock's
/// time-up sequence runs the life has already been charged.
fn handle_player_lost(state: &mut GameState) {
    if !state.hud.is_playing() {
        return;
    }
    state.hud.lose_life();
    if state.hud.is_playing() {
        log::info!("Life lost ({} left); restarting level", state.hud.lives);
        state.restart_level();
    } else {
        log::info!("Out of lives");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CameraConfig;
    use crate::sim::hud::HudState;
    use crate::sim::state::TRANSITION_TICKS;

    fn state() -> GameState {
        GameState::with_builtin_levels(CameraConfig::default()).unwrap()
    }

    #[test]
    fn test_from_keys_uses_bindings() {
        let bindings = KeyBindings::default();
        let mut keys = InputState::new();
        keys.insert("d".to_string(), true);
        keys.insert(" ".to_string(), true);
        keys.insert("ArrowLeft".to_string(), false);
        let input = TickInput::from_keys(&keys, &bindings);
        assert_eq!(
            input,
            TickInput {
                left: false,
                right: true,
                jump: true,
                down: false
            }
        );
    }

    #[test]
    fn test_player_lost_costs_a_life_and_restarts() {
        let mut state = state();
        let spawn_layout = state.world.entities().len();
        if let Some(player) = state.world.player_mut() {
            player.body.pos.y = 2000.0;
        }
        tick(&mut state, &TickInput::default());
        assert_eq!(state.hud.lives, 2);
        assert!(state.hud.is_playing());
        assert_eq!(state.world.entities().len(), spawn_layout);
        assert!(state.drain_events().contains(&GameEvent::PlayerLost));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_level_complete_transitions_after_delay() {
        let mut state = state();
        state.complete_level();
        for _ in 0..TRANSITION_TICKS - 1 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.current_level(), 0);
        assert!(matches!(state.phase, LevelPhase::Transitioning(_)));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.current_level(), 1);
        assert_eq!(state.phase, LevelPhase::Playing);
    }

    #[test]
    fn test_clock_frozen_during_transition() {
        let mut state = state();
        state.complete_level();
        let time = state.hud.time;
        for _ in 0..TRANSITION_TICKS / 2 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.hud.time, time);
    }

    #[test]
    fn test_time_up_kills_then_restarts() {
        let mut state = state();
        state.hud.time = 1;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.world.player().is_some_and(|p| p.is_dying()));
        assert_eq!(state.hud.lives, 2);
        while !state.hud.is_playing() {
            tick(&mut state, &TickInput::default());
        }
        // Charged once even though the death fall also ended the attempt
        assert_eq!(state.hud.lives, 2);
        assert!(!state.world.player().is_some_and(|p| p.is_dying()));
    }

    #[test]
    fn test_menu_load_during_game_over_sticks() {
        let mut state = state();
        state.hud.lives = 0;
        state.hud.state = HudState::GameOver(crate::sim::timer::Countdown::new(5));
        state.load_level(1).unwrap();
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.current_level(), 1);
        assert_eq!(state.phase, LevelPhase::Playing);
        assert!(state.hud.is_playing());
        assert_eq!(state.hud.lives, crate::consts::STARTING_LIVES);
    }

    #[test]
    fn test_menu_load_during_death_sequence_sticks() {
        let mut state = state();
        state.hud.lose_life();
        state.hud.state = HudState::TimeUp(crate::sim::timer::Countdown::new(5));
        state.load_level(1).unwrap();
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.current_level(), 1);
        assert!(state.hud.is_playing());
        assert_eq!(state.hud.lives, crate::consts::STARTING_LIVES - 1);
    }

    #[test]
    fn test_world_frozen_on_game_over_screen() {
        let mut state = state();
        state.hud.state = HudState::GameOver(crate::sim::timer::Countdown::new(10));
        let before = state.world.entities().to_vec();
        tick(&mut state, &TickInput::default());
        assert_eq!(state.world.entities(), &before[..]);
    }
}

//! Collectibles: coins (placed or popped out of a block) and the power-up

use super::animation::SpriteRegion;
use super::collision::{Aabb, Body, Contact, intersects};
use super::entity::{Siblings, UpdateCtx, bounce_off_level_edges, collide_with_ground};
use super::state::GameEvent;
use super::timer::Countdown;
use crate::consts::{GRAVITY, POWER_UP_SCORE};

pub const COIN_SIZE: f32 = 20.0;
/// Pop-out rise speed (pixels/tick)
pub const COIN_RISE_SPEED: f32 = 8.0;
/// How far a popped coin rises above its start before falling back
pub const COIN_POP_HEIGHT: f32 = 64.0;
pub const COIN_FADE_TICKS: u32 = 5;
/// Radians per tick
pub const COIN_SPIN: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoinState {
    /// Placed in the level, waiting for the player
    Static,
    Rising,
    Falling,
    /// Collected; fading out before removal
    Removing(Countdown),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coin {
    pub aabb: Aabb,
    pub start_y: f32,
    pub vel_y: f32,
    pub state: CoinState,
    pub spin: f32,
}

impl Coin {
    fn with_state(x: f32, y: f32, state: CoinState) -> Self {
        Self {
            aabb: Aabb::new(x, y, COIN_SIZE, COIN_SIZE),
            start_y: y,
            vel_y: 0.0,
            state,
            spin: 0.0,
        }
    }

    pub fn placed(x: f32, y: f32) -> Self {
        Self::with_state(x, y, CoinState::Static)
    }

    /// A coin released by a bonus block, starting at the block's top
    pub fn pop_out(x: f32, y: f32) -> Self {
        Self::with_state(x, y, CoinState::Rising)
    }

    pub fn alpha(&self) -> f32 {
        match self.state {
            CoinState::Removing(fade) => fade.fraction_remaining(),
            _ => 1.0,
        }
    }

    fn collect(&mut self, ctx: &mut UpdateCtx<'_>) {
        ctx.emit(GameEvent::CoinCollected);
        self.state = CoinState::Removing(Countdown::new(COIN_FADE_TICKS));
    }

    pub fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) -> bool {
        self.spin += COIN_SPIN;
        match self.state {
            CoinState::Static => {
                let touched = siblings
                    .player()
                    .is_some_and(|p| p.can_collect() && intersects(&p.body.aabb(), &self.aabb));
                if touched {
                    self.collect(ctx);
                }
            }
            CoinState::Rising => {
                self.aabb.pos.y -= COIN_RISE_SPEED;
                let peak = self.start_y - COIN_POP_HEIGHT;
                if self.aabb.pos.y <= peak {
                    self.aabb.pos.y = peak;
                    self.vel_y = 0.0;
                    self.state = CoinState::Falling;
                }
            }
            CoinState::Falling => {
                self.vel_y += GRAVITY;
                self.aabb.pos.y += self.vel_y;
                if self.aabb.pos.y >= self.start_y {
                    self.aabb.pos.y = self.start_y;
                    self.collect(ctx);
                }
            }
            CoinState::Removing(mut fade) => {
                let done = fade.tick();
                self.state = CoinState::Removing(fade);
                return done;
            }
        }
        false
    }
}

pub const POWER_UP_SIZE: f32 = 30.0;
pub const POWER_UP_SPEED: f32 = 2.0;
pub const POWER_UP_EMERGE_SPEED: f32 = 1.0;
pub static POWER_UP_REGION: SpriteRegion = SpriteRegion::new(0, 8, 16, 16);

/// The growth mushroom: rises out of its block, then wanders right
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUp {
    pub body: Body,
    pub dir: f32,
    /// Pixels still to rise before it starts moving
    pub emerge_remaining: f32,
}

impl PowerUp {
    pub fn emerging(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x, y, POWER_UP_SIZE, POWER_UP_SIZE),
            dir: 1.0,
            emerge_remaining: POWER_UP_SIZE,
        }
    }

    #[inline]
    pub fn is_emerging(&self) -> bool {
        self.emerge_remaining > 0.0
    }

    pub fn on_obstacle_contact(&mut self, contact: Contact) {
        if let Some(dir) = contact.away_direction() {
            self.dir = dir;
        }
    }

    pub fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) -> bool {
        if self.is_emerging() {
            let step = POWER_UP_EMERGE_SPEED.min(self.emerge_remaining);
            self.body.pos.y -= step;
            self.emerge_remaining -= step;
            return false;
        }

        let me = self.body.aabb();
        if let Some(player) = siblings.player_mut() {
            if player.can_collect_power_up() && intersects(&player.body.aabb(), &me) {
                player.transform_to_super();
                ctx.emit(GameEvent::Score(POWER_UP_SCORE));
                ctx.emit(GameEvent::PowerUpCollected);
                return true;
            }
        }

        self.body.vel.x = self.dir * POWER_UP_SPEED;
        self.body.integrate(GRAVITY);
        self.body.grounded = false;
        if let Some(dir) = collide_with_ground(&mut self.body, siblings).wall.and_then(Contact::away_direction) {
            self.dir = dir;
        }
        self.dir = bounce_off_level_edges(&mut self.body, self.dir, &ctx.level);
        self.body.pos.y > ctx.level.fall_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, EntityKind, LevelInfo};
    use crate::sim::player::Player;
    use crate::sim::tick::TickInput;

    fn step<T>(target: &mut T, others: &mut [Entity], f: fn(&mut T, &mut Siblings<'_>, &mut UpdateCtx<'_>) -> bool) -> (bool, Vec<GameEvent>) {
        let input = TickInput::default();
        let mut spawns = Vec::new();
        let mut events = Vec::new();
        let mut ctx = UpdateCtx {
            input: &input,
            level: LevelInfo {
                width: 1000.0,
                height: 480.0,
                underground: false,
            },
            spawns: &mut spawns,
            events: &mut events,
        };
        let removed = f(target, &mut Siblings::new(others, &mut []), &mut ctx);
        (removed, events)
    }

    #[test]
    fn test_pop_out_coin_arc() {
        let mut coin = Coin::pop_out(105.0, 300.0);
        let mut peak = coin.aabb.pos.y;
        let mut collected_at = None;
        for t in 1..=40 {
            let (removed, events) = step(&mut coin, &mut [], Coin::update);
            peak = peak.min(coin.aabb.pos.y);
            if events.contains(&GameEvent::CoinCollected) {
                collected_at = Some(t);
                assert_eq!(coin.aabb.pos.y, 300.0);
            }
            if removed {
                assert_eq!(collected_at.map(|c| t - c), Some(COIN_FADE_TICKS as i32));
                break;
            }
        }
        assert_eq!(peak, 236.0);
        assert!(collected_at.is_some());
    }

    #[test]
    fn test_static_coin_collected_on_touch() {
        let mut coin = Coin::placed(100.0, 400.0);
        let (_, events) = step(&mut coin, &mut [], Coin::update);
        assert!(events.is_empty());

        let mut others = vec![Entity {
            id: 1,
            kind: EntityKind::Player(Player::new(95.0, 395.0)),
        }];
        let (removed, events) = step(&mut coin, &mut others, Coin::update);
        assert!(!removed);
        assert_eq!(events, vec![GameEvent::CoinCollected]);
        assert!(matches!(coin.state, CoinState::Removing(_)));

        // Fading coins do not score twice
        let (_, events) = step(&mut coin, &mut others, Coin::update);
        assert!(events.is_empty());
        assert!(coin.alpha() < 1.0);
    }

    #[test]
    fn test_power_up_emerges_then_is_collected() {
        let mut power_up = PowerUp::emerging(100.0, 300.0);
        for _ in 0..POWER_UP_SIZE as usize {
            step(&mut power_up, &mut [], PowerUp::update);
        }
        assert!(!power_up.is_emerging());
        assert_eq!(power_up.body.pos.y, 270.0);

        let mut others = vec![Entity {
            id: 1,
            kind: EntityKind::Player(Player::new(110.0, 270.0)),
        }];
        let (removed, events) = step(&mut power_up, &mut others, PowerUp::update);
        assert!(removed);
        assert!(events.contains(&GameEvent::Score(POWER_UP_SCORE)));
        assert!(others[0].as_player().unwrap().is_transforming());
    }
}

//! Enemies: the walker (stompable patroller) and the shell enemy
//! (walks, retreats into a kickable shell, then slides as a projectile)

use super::animation::{AnimState, Animator, Clip, ClipTable, SpriteRegion};
use super::collision::{Aabb, Body, Contact, intersects, is_stomp};
use super::entity::{EntityKind, Siblings, UpdateCtx, bounce_off_level_edges, collide_with_ground};
use super::state::GameEvent;
use super::timer::Countdown;
use crate::consts::{GRAVITY, STOMP_SCORE};

pub const WALKER_SIZE: f32 = 32.0;
pub const WALKER_SPEED: f32 = 1.0;
pub const WALKER_SQUASHED_HEIGHT: f32 = 16.0;
pub const WALKER_SQUASH_TICKS: u32 = 30;

static WALKER_WALK: [SpriteRegion; 2] = [SpriteRegion::new(0, 4, 16, 16), SpriteRegion::new(30, 4, 16, 16)];
static WALKER_FLAT: [SpriteRegion; 1] = [SpriteRegion::new(60, 8, 16, 16)];
pub static WALKER_CLIPS: [(AnimState, Clip); 2] = [
    (AnimState::Loop, Clip::looped(&WALKER_WALK, 15)),
    (AnimState::Hold, Clip::held(&WALKER_FLAT)),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkerState {
    Walking,
    /// Flattened; removed when the countdown expires
    Squashed(Countdown),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Walker {
    pub body: Body,
    /// -1 left, +1 right
    pub dir: f32,
    pub state: WalkerState,
    pub animator: Animator,
}

impl Walker {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x, y, WALKER_SIZE, WALKER_SIZE),
            dir: -1.0,
            state: WalkerState::Walking,
            animator: Animator::new(&WALKER_CLIPS as &ClipTable, AnimState::Loop),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == WalkerState::Walking
    }

    /// Flatten in place; the walker stays visible for the squash countdown
    pub fn squash(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.state = WalkerState::Squashed(Countdown::new(WALKER_SQUASH_TICKS));
        self.body.set_height_keep_bottom(WALKER_SQUASHED_HEIGHT);
        self.body.vel = glam::Vec2::ZERO;
        self.animator.set_state(AnimState::Hold);
        log::debug!("walker squashed at x={:.0}", self.body.pos.x);
    }

    pub fn on_obstacle_contact(&mut self, contact: Contact) {
        if let Some(dir) = contact.away_direction() {
            self.dir = dir;
        }
    }

    pub fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) -> bool {
        if let WalkerState::Squashed(timer) = &mut self.state {
            return timer.tick();
        }

        self.body.vel.x = self.dir * WALKER_SPEED;
        self.body.integrate(GRAVITY);
        self.body.grounded = false;

        if let Some(dir) = collide_with_ground(&mut self.body, siblings).wall.and_then(Contact::away_direction) {
            self.dir = dir;
        }
        self.dir = bounce_off_level_edges(&mut self.body, self.dir, &ctx.level);

        // Turn around when walking into another live walker
        let me = self.body.aabb();
        let dir = self.dir;
        let blocked = siblings.iter().any(|e| match &e.kind {
            EntityKind::Walker(other) => {
                let them = other.body.aabb();
                other.is_alive() && intersects(&me, &them) && (them.center().x - me.center().x) * dir > 0.0
            }
            _ => false,
        });
        if blocked {
            self.dir = -self.dir;
        }

        if self.body.pos.y > ctx.level.fall_line() {
            return true;
        }
        self.animator.tick();
        false
    }
}

pub const SHELL_ENEMY_WIDTH: f32 = 32.0;
pub const SHELL_ENEMY_HEIGHT: f32 = 48.0;
pub const SHELL_HEIGHT: f32 = 32.0;
pub const SHELL_WALK_SPEED: f32 = 1.0;
pub const SHELL_SLIDE_SPEED: f32 = 8.0;
pub const KICK_COOLDOWN_TICKS: u32 = 10;

static SHELL_WALK: [SpriteRegion; 2] = [SpriteRegion::new(180, 0, 24, 24), SpriteRegion::new(150, 0, 24, 24)];
static SHELL_CURLED: [SpriteRegion; 1] = [SpriteRegion::new(360, 5, 24, 12)];
pub static SHELL_CLIPS: [(AnimState, Clip); 2] = [
    (AnimState::Loop, Clip::looped(&SHELL_WALK, 15)),
    (AnimState::Hold, Clip::held(&SHELL_CURLED)),
];

static SHELL_WALK_DARK: [SpriteRegion; 2] = [SpriteRegion::new(180, 30, 24, 24), SpriteRegion::new(150, 30, 24, 24)];
static SHELL_CURLED_DARK: [SpriteRegion; 1] = [SpriteRegion::new(360, 35, 24, 12)];
pub static SHELL_CLIPS_UNDERGROUND: [(AnimState, Clip); 2] = [
    (AnimState::Loop, Clip::looped(&SHELL_WALK_DARK, 15)),
    (AnimState::Hold, Clip::held(&SHELL_CURLED_DARK)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Walking,
    /// Stationary and kickable
    ShellIdle,
    /// Sliding at constant speed, knocking out other enemies
    ShellMoving,
    /// Knocked out by another shell; removed on its next update
    Defeated,
}

/// What a player touching the shell enemy leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Ignore,
    /// Player bounces; award `score`
    Stomped { score: u32 },
    /// Shell sent sliding; the player bounces when the kick came from above
    Kicked { score: u32, bounce: bool },
    DamagePlayer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShellEnemy {
    pub body: Body,
    pub dir: f32,
    pub state: ShellState,
    pub kick_cooldown: Countdown,
    /// Direction of the last kick; a stationary shell ignores a repeat kick
    /// in the same direction
    pub last_kick: Option<f32>,
    pub underground: bool,
    pub animator: Animator,
}

impl ShellEnemy {
    pub fn new(x: f32, y: f32, underground: bool) -> Self {
        let table: &'static ClipTable = if underground { &SHELL_CLIPS_UNDERGROUND } else { &SHELL_CLIPS };
        Self {
            body: Body::new(x, y, SHELL_ENEMY_WIDTH, SHELL_ENEMY_HEIGHT),
            dir: -1.0,
            state: ShellState::Walking,
            kick_cooldown: Countdown::default(),
            last_kick: None,
            underground,
            animator: Animator::new(table, AnimState::Loop),
        }
    }

    /// Still interacts with the world
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state != ShellState::Defeated
    }

    pub fn enter_shell(&mut self) {
        self.state = ShellState::ShellIdle;
        self.body.set_height_keep_bottom(SHELL_HEIGHT);
        self.body.vel.x = 0.0;
        self.last_kick = None;
        self.kick_cooldown = Countdown::new(KICK_COOLDOWN_TICKS);
        self.animator.set_state(AnimState::Hold);
    }

    fn kick(&mut self, dir: f32) {
        self.state = ShellState::ShellMoving;
        self.dir = dir;
        self.last_kick = Some(dir);
        self.kick_cooldown = Countdown::new(KICK_COOLDOWN_TICKS);
        log::debug!("shell kicked dir={dir}");
    }

    fn stop(&mut self) {
        self.state = ShellState::ShellIdle;
        self.body.vel.x = 0.0;
        self.last_kick = None;
        self.kick_cooldown = Countdown::new(KICK_COOLDOWN_TICKS);
    }

    pub fn defeat(&mut self) {
        self.state = ShellState::Defeated;
    }

    /// Resolve a player touching this enemy. Mutates the shell; the caller
    /// applies the outcome to the player.
    pub fn on_player_contact(&mut self, player: &Body) -> ContactOutcome {
        let me = self.body.aabb();
        let from_above = is_stomp(player, &me);
        // The shell always travels away from the player's side
        let away = if player.aabb().center().x < me.center().x { 1.0 } else { -1.0 };

        match self.state {
            ShellState::Defeated => ContactOutcome::Ignore,
            ShellState::Walking if from_above => {
                self.enter_shell();
                ContactOutcome::Stomped { score: STOMP_SCORE }
            }
            ShellState::Walking => ContactOutcome::DamagePlayer,
            ShellState::ShellIdle => {
                if self.kick_cooldown.is_active() || self.last_kick == Some(away) {
                    return ContactOutcome::Ignore;
                }
                self.kick(away);
                ContactOutcome::Kicked {
                    score: if from_above { crate::consts::KICK_SCORE } else { 0 },
                    bounce: from_above,
                }
            }
            ShellState::ShellMoving if from_above => {
                self.stop();
                ContactOutcome::Stomped { score: 0 }
            }
            // Just kicked: the kicker is still touching it
            ShellState::ShellMoving if self.kick_cooldown.is_active() => ContactOutcome::Ignore,
            ShellState::ShellMoving => ContactOutcome::DamagePlayer,
        }
    }

    fn turn(&mut self, dir: f32) {
        match self.state {
            ShellState::Walking => self.dir = dir,
            ShellState::ShellMoving => {
                self.dir = dir;
                self.last_kick = Some(dir);
            }
            ShellState::ShellIdle | ShellState::Defeated => {}
        }
    }

    pub fn on_obstacle_contact(&mut self, contact: Contact) {
        if let Some(dir) = contact.away_direction() {
            self.turn(dir);
        }
    }

    pub fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) -> bool {
        self.body.vel.x = match self.state {
            ShellState::Defeated => return true,
            ShellState::Walking => self.dir * SHELL_WALK_SPEED,
            ShellState::ShellIdle => 0.0,
            ShellState::ShellMoving => self.dir * SHELL_SLIDE_SPEED,
        };
        self.kick_cooldown.tick();

        self.body.integrate(GRAVITY);
        self.body.grounded = false;
        if let Some(dir) = collide_with_ground(&mut self.body, siblings).wall.and_then(Contact::away_direction) {
            self.turn(dir);
        }
        if self.state != ShellState::ShellIdle {
            let dir = bounce_off_level_edges(&mut self.body, self.dir, &ctx.level);
            if dir != self.dir {
                self.turn(dir);
            }
        }

        if self.state == ShellState::ShellMoving {
            self.knock_out_enemies(siblings, ctx);
        }

        if self.body.pos.y > ctx.level.fall_line() {
            return true;
        }
        self.animator.tick();
        false
    }

    fn knock_out_enemies(&self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) {
        let me: Aabb = self.body.aabb();
        for sibling in siblings.iter_mut() {
            let knocked = match &mut sibling.kind {
                EntityKind::Walker(w) if w.is_alive() && intersects(&me, &w.body.aabb()) => {
                    w.squash();
                    true
                }
                EntityKind::Shell(s) if s.is_active() && intersects(&me, &s.body.aabb()) => {
                    s.defeat();
                    true
                }
                _ => false,
            };
            if knocked {
                ctx.emit(GameEvent::Score(STOMP_SCORE));
                ctx.emit(GameEvent::EnemyKnockedOut);
            }
        }
    }
}

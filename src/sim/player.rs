//! The player: input-driven movement plus the scripted modes (dying,
//! growing, pole slide, castle walk) other entities put it into.

use glam::Vec2;

use super::animation::{AnimState, Animator, Clip, ClipTable, SpriteRegion};
use super::collision::{Aabb, Body, intersects, is_stomp};
use super::enemies::ContactOutcome;
use super::entity::{EntityKind, Siblings, UpdateCtx, collide_with_ground};
use super::state::GameEvent;
use super::timer::Countdown;
use crate::consts::{DEATH_PLANE_MARGIN, GRAVITY, STOMP_SCORE};
use crate::lerp;

pub const PLAYER_WIDTH: f32 = 30.0;
pub const SMALL_HEIGHT: f32 = 30.0;
pub const SUPER_HEIGHT: f32 = 60.0;
pub const CROUCH_HEIGHT: f32 = 40.0;

pub const WALK_SPEED: f32 = 3.0;
/// Airborne velocity may differ from the take-off speed by at most this much
pub const AIR_CONTROL: f32 = 2.0;
pub const JUMP_VELOCITY: f32 = -15.0;
pub const STOMP_BOUNCE: f32 = -8.0;
pub const DAMAGE_BOUNCE: f32 = -6.0;
pub const DEATH_LAUNCH: f32 = -12.0;
pub const DEATH_GRAVITY: f32 = 0.5;

pub const TURN_TICKS: u32 = 5;
pub const TRANSFORM_TICKS: u32 = 48;
pub const SHRINK_TICKS: u32 = 30;
pub const INVINCIBLE_TICKS: u32 = 120;
/// Visibility toggles every this many ticks while flickering
pub const FLICKER_INTERVAL: u32 = 4;

pub const POLE_SLIDE_TICKS: u32 = 60;
pub const POLE_HOLD_TICKS: u32 = 30;
pub const POLE_RELEASE_VELOCITY: Vec2 = Vec2::new(2.0, -4.0);
pub const CASTLE_WALK_SPEED: f32 = 2.0;

const fn small(x: u16, y: u16) -> SpriteRegion {
    SpriteRegion::new(x, y, 19, 16)
}

const fn tall(x: u16, y: u16) -> SpriteRegion {
    SpriteRegion::new(x, y, 16, 32)
}

static S_IDLE_R: [SpriteRegion; 1] = [small(211, 0)];
static S_IDLE_L: [SpriteRegion; 1] = [small(181, 0)];
static S_WALK_R: [SpriteRegion; 3] = [small(300, 0), small(272, 0), small(241, 0)];
static S_WALK_L: [SpriteRegion; 3] = [small(89, 0), small(121, 0), small(150, 0)];
static S_JUMP_R: [SpriteRegion; 1] = [small(359, 0)];
static S_JUMP_L: [SpriteRegion; 1] = [small(29, 0)];
static S_TURN_R: [SpriteRegion; 1] = [small(331, 0)];
static S_TURN_L: [SpriteRegion; 1] = [small(60, 0)];
static S_DEATH: [SpriteRegion; 1] = [small(0, 16)];
static POLE_L: [SpriteRegion; 1] = [small(331, 30)];
static POLE_R: [SpriteRegion; 1] = [small(61, 30)];
static POLE_OFF: [SpriteRegion; 1] = [small(30, 30)];

pub static SMALL_CLIPS: [(AnimState, Clip); 12] = [
    (AnimState::IdleRight, Clip::held(&S_IDLE_R)),
    (AnimState::IdleLeft, Clip::held(&S_IDLE_L)),
    (AnimState::WalkRight, Clip::looped(&S_WALK_R, 8)),
    (AnimState::WalkLeft, Clip::looped(&S_WALK_L, 8)),
    (AnimState::JumpRight, Clip::held(&S_JUMP_R)),
    (AnimState::JumpLeft, Clip::held(&S_JUMP_L)),
    (AnimState::TurnRight, Clip::held(&S_TURN_R)),
    (AnimState::TurnLeft, Clip::held(&S_TURN_L)),
    (AnimState::Death, Clip::held(&S_DEATH)),
    (AnimState::FlagpoleLeft, Clip::held(&POLE_L)),
    (AnimState::FlagpoleRight, Clip::held(&POLE_R)),
    (AnimState::FlagpoleJumpOff, Clip::held(&POLE_OFF)),
];

static B_IDLE_R: [SpriteRegion; 1] = [tall(209, 52)];
static B_IDLE_L: [SpriteRegion; 1] = [tall(180, 52)];
static B_WALK_R: [SpriteRegion; 3] = [tall(239, 52), tall(299, 53), tall(270, 52)];
static B_WALK_L: [SpriteRegion; 3] = [tall(150, 52), tall(90, 53), tall(121, 52)];
static B_JUMP_R: [SpriteRegion; 1] = [tall(359, 52)];
static B_JUMP_L: [SpriteRegion; 1] = [tall(30, 52)];
static B_CROUCH_R: [SpriteRegion; 1] = [SpriteRegion::new(389, 57, 16, 22)];
static B_CROUCH_L: [SpriteRegion; 1] = [SpriteRegion::new(0, 57, 16, 22)];
static B_TURN_R: [SpriteRegion; 1] = [tall(60, 52)];
static B_TURN_L: [SpriteRegion; 1] = [tall(329, 52)];

pub static SUPER_CLIPS: [(AnimState, Clip); 14] = [
    (AnimState::IdleRight, Clip::held(&B_IDLE_R)),
    (AnimState::IdleLeft, Clip::held(&B_IDLE_L)),
    (AnimState::WalkRight, Clip::looped(&B_WALK_R, 8)),
    (AnimState::WalkLeft, Clip::looped(&B_WALK_L, 8)),
    (AnimState::JumpRight, Clip::held(&B_JUMP_R)),
    (AnimState::JumpLeft, Clip::held(&B_JUMP_L)),
    (AnimState::CrouchRight, Clip::held(&B_CROUCH_R)),
    (AnimState::CrouchLeft, Clip::held(&B_CROUCH_L)),
    (AnimState::TurnRight, Clip::held(&B_TURN_R)),
    (AnimState::TurnLeft, Clip::held(&B_TURN_L)),
    (AnimState::Death, Clip::held(&S_DEATH)),
    (AnimState::FlagpoleLeft, Clip::held(&POLE_L)),
    (AnimState::FlagpoleRight, Clip::held(&POLE_R)),
    (AnimState::FlagpoleJumpOff, Clip::held(&POLE_OFF)),
];

/// Stage of the flagpole sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlidePhase {
    Sliding,
    /// At the bottom on the near side of the pole
    HoldLeft(Countdown),
    /// Swung round to the far side
    HoldRight(Countdown),
}

/// Mutually exclusive player modes; exactly one is handled per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerMode {
    Normal,
    Dying,
    Transforming(Countdown),
    PoleSlide {
        pole_x: f32,
        start_y: f32,
        end_y: f32,
        progress: Countdown,
        phase: SlidePhase,
    },
    /// Hopped off the pole, waiting to land
    PostPole { signalled: bool },
    CastleEntry { target_x: f32, inside: bool },
}

/// Timers started by taking a hit in super form
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageState {
    pub invincible: Countdown,
    /// Super form is kept until this expires
    pub shrink: Countdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub body: Body,
    pub spawn: Vec2,
    /// +1 right, -1 left
    pub facing: f32,
    pub jump_direction: f32,
    /// Horizontal speed at the last grounded tick; airborne control is
    /// relative to it
    pub ground_speed: f32,
    pub mode: PlayerMode,
    pub is_super: bool,
    pub crouching: bool,
    pub damage: DamageState,
    pub turn_lock: Countdown,
    pub visible: bool,
    pub animator: Animator,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            body: Body::new(x, y, PLAYER_WIDTH, SMALL_HEIGHT),
            spawn: Vec2::new(x, y),
            facing: 1.0,
            jump_direction: 1.0,
            ground_speed: 0.0,
            mode: PlayerMode::Normal,
            is_super: false,
            crouching: false,
            damage: DamageState::default(),
            turn_lock: Countdown::default(),
            visible: true,
            animator: Animator::new(&SMALL_CLIPS, AnimState::IdleRight),
        }
    }

    #[inline]
    pub fn is_super(&self) -> bool {
        self.is_super
    }

    #[inline]
    pub fn is_dying(&self) -> bool {
        self.mode == PlayerMode::Dying
    }

    #[inline]
    pub fn is_transforming(&self) -> bool {
        matches!(self.mode, PlayerMode::Transforming(_))
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.damage.invincible.is_active()
    }

    pub fn is_inside_castle(&self) -> bool {
        matches!(self.mode, PlayerMode::CastleEntry { inside: true, .. })
    }

    /// Fraction of the pole slide completed, while on the pole
    pub fn slide_progress(&self) -> Option<f32> {
        match self.mode {
            PlayerMode::PoleSlide { progress, .. } => Some(progress.progress()),
            _ => None,
        }
    }

    /// Obstacles may push the player out of themselves
    pub fn accepts_pushes(&self) -> bool {
        !matches!(
            self.mode,
            PlayerMode::Dying | PlayerMode::PoleSlide { .. } | PlayerMode::CastleEntry { inside: true, .. }
        )
    }

    pub fn can_bump_blocks(&self) -> bool {
        matches!(self.mode, PlayerMode::Normal | PlayerMode::PostPole { .. })
    }

    pub fn can_collect(&self) -> bool {
        !matches!(self.mode, PlayerMode::Dying | PlayerMode::CastleEntry { inside: true, .. })
    }

    pub fn can_collect_power_up(&self) -> bool {
        self.mode == PlayerMode::Normal
    }

    /// Flagpole contact only starts a slide from free movement
    pub fn can_grab_pole(&self) -> bool {
        self.mode == PlayerMode::Normal
    }

    /// Advance one tick. The player is never removed; falling out of the
    /// level respawns it and reports `PlayerLost`.
    pub fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) -> bool {
        self.tick_damage();

        match self.mode {
            PlayerMode::Dying => {
                self.update_dying(ctx);
                return false;
            }
            PlayerMode::Transforming(_) => {
                self.update_transform();
                return false;
            }
            PlayerMode::CastleEntry { inside: true, .. } => return false,
            _ => {}
        }

        self.check_enemy_contacts(siblings, ctx);

        match self.mode {
            PlayerMode::Dying => {}
            PlayerMode::PoleSlide { .. } => self.update_pole_slide(),
            PlayerMode::PostPole { .. } => self.update_post_pole(siblings, ctx),
            PlayerMode::CastleEntry { .. } => self.update_castle_entry(siblings, ctx),
            PlayerMode::Normal => self.update_normal(siblings, ctx),
            PlayerMode::Transforming(_) => {}
        }
        self.animator.tick();
        false
    }

    fn tick_damage(&mut self) {
        if self.damage.shrink.tick() {
            self.shrink_to_small();
        }
        if self.damage.invincible.is_active() {
            let done = self.damage.invincible.tick();
            self.visible = done || (self.damage.invincible.remaining() / FLICKER_INTERVAL) % 2 == 0;
        }
    }

    fn update_dying(&mut self, ctx: &mut UpdateCtx<'_>) {
        self.body.vel.y += DEATH_GRAVITY;
        self.body.pos.y += self.body.vel.y;
        if self.body.pos.y > ctx.level.height + DEATH_PLANE_MARGIN {
            self.respawn(ctx.events);
        }
    }

    fn update_transform(&mut self) {
        let PlayerMode::Transforming(mut timer) = self.mode else { return };
        let done = timer.tick();
        self.body.set_height_keep_bottom(lerp(SMALL_HEIGHT, SUPER_HEIGHT, timer.progress()));
        self.visible = (timer.elapsed() / FLICKER_INTERVAL) % 2 == 0;
        if done {
            self.make_super();
            self.visible = true;
            self.mode = PlayerMode::Normal;
        } else {
            self.mode = PlayerMode::Transforming(timer);
        }
    }

    fn check_enemy_contacts(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) {
        // Stomp tests use the approach state, so landing on two enemies at
        // once squashes both
        let probe = self.body;
        let reach = probe.aabb();
        for sibling in siblings.iter_mut() {
            if self.is_invincible() || self.is_dying() {
                return;
            }
            match &mut sibling.kind {
                EntityKind::Walker(walker) if walker.is_alive() && intersects(&reach, &walker.body.aabb()) => {
                    if is_stomp(&probe, &walker.body.aabb()) {
                        walker.squash();
                        self.body.vel.y = STOMP_BOUNCE;
                        ctx.emit(GameEvent::Score(STOMP_SCORE));
                        ctx.emit(GameEvent::EnemyStomped);
                    } else {
                        self.take_damage(ctx.events);
                    }
                }
                EntityKind::Shell(shell) if shell.is_active() && intersects(&reach, &shell.body.aabb()) => {
                    match shell.on_player_contact(&probe) {
                        ContactOutcome::Ignore => {}
                        ContactOutcome::Stomped { score } => {
                            self.body.vel.y = STOMP_BOUNCE;
                            if score > 0 {
                                ctx.emit(GameEvent::Score(score));
                            }
                            ctx.emit(GameEvent::EnemyStomped);
                        }
                        ContactOutcome::Kicked { score, bounce } => {
                            if bounce {
                                self.body.vel.y = STOMP_BOUNCE;
                            }
                            if score > 0 {
                                ctx.emit(GameEvent::Score(score));
                            }
                            ctx.emit(GameEvent::ShellKicked);
                        }
                        ContactOutcome::DamagePlayer => self.take_damage(ctx.events),
                    }
                }
                _ => {}
            }
        }
    }

    fn update_pole_slide(&mut self) {
        let PlayerMode::PoleSlide {
            pole_x,
            start_y,
            end_y,
            mut progress,
            phase,
        } = self.mode
        else {
            return;
        };

        let phase = match phase {
            SlidePhase::Sliding => {
                let done = progress.tick();
                self.body.pos.y = lerp(start_y, end_y, progress.progress());
                if done {
                    SlidePhase::HoldLeft(Countdown::new(POLE_HOLD_TICKS))
                } else {
                    SlidePhase::Sliding
                }
            }
            SlidePhase::HoldLeft(mut hold) => {
                if hold.tick() {
                    self.body.pos.x = pole_x;
                    self.animator.set_state(AnimState::FlagpoleRight);
                    SlidePhase::HoldRight(Countdown::new(POLE_HOLD_TICKS))
                } else {
                    SlidePhase::HoldLeft(hold)
                }
            }
            SlidePhase::HoldRight(mut hold) => {
                if hold.tick() {
                    self.release_from_pole();
                    return;
                }
                SlidePhase::HoldRight(hold)
            }
        };
        self.mode = PlayerMode::PoleSlide {
            pole_x,
            start_y,
            end_y,
            progress,
            phase,
        };
    }

    fn release_from_pole(&mut self) {
        self.mode = PlayerMode::PostPole { signalled: false };
        self.facing = 1.0;
        self.body.vel = POLE_RELEASE_VELOCITY;
        self.body.grounded = false;
        self.animator.set_state(AnimState::FlagpoleJumpOff);
        log::debug!("released from flagpole at x={:.0}", self.body.pos.x);
    }

    fn update_post_pole(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) {
        let landed_last_tick = self.body.grounded;
        self.body.integrate(GRAVITY);
        self.body.grounded = false;
        let contacts = collide_with_ground(&mut self.body, siblings);
        if self.fell_out(ctx) {
            return;
        }

        let PlayerMode::PostPole { signalled } = self.mode else { return };
        if signalled || !(landed_last_tick || contacts.landed) {
            return;
        }
        self.body.vel.x = 0.0;
        self.animator.set_state(AnimState::IdleRight);
        self.mode = PlayerMode::PostPole { signalled: true };
        match siblings.castle_mut() {
            Some(castle) => castle.start_player_entrance(),
            None => ctx.emit(GameEvent::LevelComplete),
        }
    }

    fn update_castle_entry(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) {
        let PlayerMode::CastleEntry { target_x, .. } = self.mode else { return };
        self.facing = 1.0;
        self.body.vel.x = CASTLE_WALK_SPEED;
        self.animator.set_state(AnimState::WalkRight);
        self.body.integrate(GRAVITY);
        self.body.grounded = false;
        collide_with_ground(&mut self.body, siblings);
        if self.fell_out(ctx) {
            return;
        }

        if self.body.pos.x >= target_x {
            self.body.pos.x = target_x;
            self.body.vel = Vec2::ZERO;
            self.visible = false;
            self.mode = PlayerMode::CastleEntry { target_x, inside: true };
            log::info!("player entered the castle");
            ctx.emit(GameEvent::LevelComplete);
        }
    }

    fn update_normal(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) {
        if self.turn_lock.is_active() {
            if self.turn_lock.tick() {
                self.animator.set_state(AnimState::idle(self.facing));
            }
            return;
        }

        let input = *ctx.input;
        if self.body.grounded {
            self.ground_speed = self.body.vel.x;
            if self.is_super {
                self.update_crouch(input.down, siblings);
            }
        }

        if self.crouching {
            self.body.vel.x = 0.0;
            self.animator.set_state(AnimState::crouch(self.facing));
        } else {
            if input.jump && self.body.grounded {
                self.body.vel.y = JUMP_VELOCITY;
                self.body.grounded = false;
                self.jump_direction = self.facing;
                self.animator.set_state(AnimState::jump(self.facing));
                ctx.emit(GameEvent::PlayerJumped);
            }

            if self.body.grounded {
                if input.left {
                    self.walk_or_turn(-1.0);
                } else if input.right {
                    self.walk_or_turn(1.0);
                } else {
                    self.body.vel.x = 0.0;
                    self.animator.set_state(AnimState::idle(self.facing));
                }
            } else {
                self.animator.set_state(AnimState::jump(self.jump_direction));
                self.body.vel.x = if input.left {
                    (self.ground_speed - AIR_CONTROL).max(-WALK_SPEED)
                } else if input.right {
                    (self.ground_speed + AIR_CONTROL).min(WALK_SPEED)
                } else {
                    self.ground_speed
                };
            }
        }

        self.body.integrate(GRAVITY);
        if self.body.pos.x < 0.0 {
            self.body.pos.x = 0.0;
        }
        if self.fell_out(ctx) {
            return;
        }
        self.body.grounded = false;
        collide_with_ground(&mut self.body, siblings);
    }

    fn walk_or_turn(&mut self, dir: f32) {
        if self.facing != dir {
            self.facing = dir;
            self.turn_lock = Countdown::new(TURN_TICKS);
            self.animator
                .set_state(if dir > 0.0 { AnimState::TurnRight } else { AnimState::TurnLeft });
        } else {
            self.body.vel.x = dir * WALK_SPEED;
            self.animator.set_state(AnimState::walk(dir));
        }
    }

    fn update_crouch(&mut self, down: bool, siblings: &Siblings<'_>) {
        if down && !self.crouching {
            self.crouching = true;
            self.body.set_height_keep_bottom(CROUCH_HEIGHT);
        } else if !down && self.crouching {
            let standing = Aabb::new(
                self.body.pos.x,
                self.body.bottom() - SUPER_HEIGHT,
                self.body.size.x,
                SUPER_HEIGHT,
            );
            if !siblings.any_solid_overlaps(&standing) {
                self.crouching = false;
                self.body.set_height_keep_bottom(SUPER_HEIGHT);
            }
        }
    }

    /// Respawn when below the fall-through line
    fn fell_out(&mut self, ctx: &mut UpdateCtx<'_>) -> bool {
        if self.body.pos.y > ctx.level.fall_line() {
            self.respawn(ctx.events);
            true
        } else {
            false
        }
    }

    /// Redirect the player just below a bumped block
    pub fn bump_head(&mut self, block_bottom: f32, rebound: f32) {
        self.body.pos.y = block_bottom;
        self.body.vel.y = rebound;
    }

    /// Grow immediately (level carry-over); `transform_to_super` animates it
    pub fn make_super(&mut self) {
        self.is_super = true;
        self.crouching = false;
        self.body.set_height_keep_bottom(SUPER_HEIGHT);
        self.animator.set_table(&SUPER_CLIPS);
        self.animator.set_state(AnimState::idle(self.facing));
    }

    fn shrink_to_small(&mut self) {
        self.is_super = false;
        self.crouching = false;
        self.body.set_height_keep_bottom(SMALL_HEIGHT);
        self.animator.set_table(&SMALL_CLIPS as &ClipTable);
        self.animator.set_state(AnimState::idle(self.facing));
    }

    /// Start the growth animation. Returns false when there is nothing to do.
    pub fn transform_to_super(&mut self) -> bool {
        if self.is_super || self.mode != PlayerMode::Normal {
            return false;
        }
        self.mode = PlayerMode::Transforming(Countdown::new(TRANSFORM_TICKS));
        self.crouching = false;
        self.body.vel = Vec2::ZERO;
        log::debug!("player transforming");
        true
    }

    /// Grab the pole whose center line is `pole_x`, sliding down to `base_y`
    pub fn start_pole_slide(&mut self, pole_x: f32, base_y: f32) {
        let end_y = base_y - self.body.size.y;
        self.crouching = false;
        self.turn_lock = Countdown::default();
        self.body.pos.x = pole_x - self.body.size.x;
        self.body.vel = Vec2::ZERO;
        self.facing = 1.0;
        self.mode = PlayerMode::PoleSlide {
            pole_x,
            start_y: self.body.pos.y.min(end_y),
            end_y,
            progress: Countdown::new(POLE_SLIDE_TICKS),
            phase: SlidePhase::Sliding,
        };
        self.animator.set_state(AnimState::FlagpoleLeft);
    }

    /// Hand control to the castle: walk right until `target_x`
    pub fn start_castle_entry(&mut self, target_x: f32) {
        if !matches!(self.mode, PlayerMode::PostPole { .. } | PlayerMode::Normal) {
            return;
        }
        self.mode = PlayerMode::CastleEntry { target_x, inside: false };
        log::debug!("castle entry toward x={target_x:.0}");
    }

    /// Take a hit: super form shrinks with a grace period, small form dies
    pub fn take_damage(&mut self, events: &mut Vec<GameEvent>) {
        if self.is_invincible() || self.is_dying() {
            return;
        }
        if self.is_super {
            self.damage.invincible = Countdown::new(INVINCIBLE_TICKS);
            self.damage.shrink = Countdown::new(SHRINK_TICKS);
            self.body.vel.y = DAMAGE_BOUNCE;
            events.push(GameEvent::PlayerDamaged);
        } else {
            self.die(events);
        }
    }

    pub fn die(&mut self, events: &mut Vec<GameEvent>) {
        if self.is_dying() {
            return;
        }
        if self.is_super {
            self.shrink_to_small();
        }
        self.damage = DamageState::default();
        self.turn_lock = Countdown::default();
        self.mode = PlayerMode::Dying;
        self.body.vel = Vec2::new(0.0, DEATH_LAUNCH);
        self.visible = true;
        self.animator.set_state(AnimState::Death);
        log::info!("player died at x={:.0}", self.body.pos.x);
        events.push(GameEvent::PlayerDied);
    }

    /// Back to the spawn point in small form; the lifecycle decides what a
    /// lost attempt means
    pub fn respawn(&mut self, events: &mut Vec<GameEvent>) {
        self.body = Body::new(self.spawn.x, self.spawn.y, PLAYER_WIDTH, SMALL_HEIGHT);
        self.is_super = false;
        self.crouching = false;
        self.mode = PlayerMode::Normal;
        self.damage = DamageState::default();
        self.turn_lock = Countdown::default();
        self.visible = true;
        self.facing = 1.0;
        self.ground_speed = 0.0;
        self.animator.set_table(&SMALL_CLIPS);
        self.animator.set_state(AnimState::IdleRight);
        events.push(GameEvent::PlayerLost);
    }
}

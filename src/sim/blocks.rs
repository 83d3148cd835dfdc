//! Bumpable blocks and the debris a broken brick leaves behind

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::animation::{AnimState, Animator, Clip, ClipTable, SpriteRegion};
use super::collision::{Aabb, Body};
use super::entity::{EntityKind, Siblings, UpdateCtx};
use super::items::{COIN_SIZE, Coin, POWER_UP_SIZE, PowerUp};
use super::state::GameEvent;
use super::timer::Countdown;

pub const BLOCK_SIZE: f32 = 30.0;
pub const STAIR_SIZE: f32 = 32.0;
pub const HIT_ANIMATION_TICKS: u32 = 10;
/// Peak upward offset of the bump animation
pub const BUMP_HEIGHT: f32 = 8.0;
/// Vertical tolerance between the player's head and the block's underside
pub const HEAD_HIT_TOLERANCE: f32 = 10.0;
/// Horizontal inset so grazing a corner does not count as a hit
pub const HEAD_HIT_MARGIN: f32 = 5.0;
/// Downward speed given to a player who bumped a block
pub const HEAD_BUMP_REBOUND: f32 = 2.0;
pub const BRICK_SCORE: u32 = 50;

static QUESTION_SHIMMER: [SpriteRegion; 4] = [
    SpriteRegion::new(80, 112, 16, 16),
    SpriteRegion::new(96, 112, 16, 16),
    SpriteRegion::new(112, 112, 16, 16),
    SpriteRegion::new(96, 112, 16, 16),
];
static QUESTION_USED: [SpriteRegion; 1] = [SpriteRegion::new(128, 112, 16, 16)];
static BRICK: [SpriteRegion; 1] = [SpriteRegion::new(272, 112, 16, 16)];
static STAIR: [SpriteRegion; 1] = [SpriteRegion::new(0, 33, 16, 16)];

pub static QUESTION_CLIPS: [(AnimState, Clip); 2] = [
    (AnimState::Loop, Clip::looped(&QUESTION_SHIMMER, 15)),
    (AnimState::Hold, Clip::held(&QUESTION_USED)),
];
pub static BRICK_CLIPS: [(AnimState, Clip); 1] = [(AnimState::Hold, Clip::held(&BRICK))];
pub static STAIR_CLIPS: [(AnimState, Clip); 1] = [(AnimState::Hold, Clip::held(&STAIR))];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Brick,
    Question,
    Stair,
}

/// What a question block releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockContent {
    #[default]
    Coin,
    #[serde(alias = "mushroom")]
    PowerUp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockState {
    Idle,
    /// Struck from below this tick; resolved in the same update
    Hit { by_super: bool },
    HitAnimation(Countdown),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub aabb: Aabb,
    /// Resting y; the bump animation offsets from here
    pub rest_y: f32,
    pub kind: BlockKind,
    pub content: BlockContent,
    /// Question blocks release their content once
    pub used: bool,
    pub state: BlockState,
    pub animator: Animator,
}

impl Block {
    pub fn new(x: f32, y: f32, kind: BlockKind, content: BlockContent) -> Self {
        let (size, table, anim): (f32, &'static ClipTable, AnimState) = match kind {
            BlockKind::Question => (BLOCK_SIZE, &QUESTION_CLIPS, AnimState::Loop),
            BlockKind::Brick => (BLOCK_SIZE, &BRICK_CLIPS, AnimState::Hold),
            BlockKind::Stair => (STAIR_SIZE, &STAIR_CLIPS, AnimState::Hold),
        };
        Self {
            aabb: Aabb::new(x, y, size, size),
            rest_y: y,
            kind,
            content,
            used: false,
            state: BlockState::Idle,
            animator: Animator::new(table, anim),
        }
    }

    /// Can the next bump still do something?
    pub fn is_bumpable(&self) -> bool {
        match self.kind {
            BlockKind::Question => !self.used,
            BlockKind::Brick => true,
            BlockKind::Stair => false,
        }
    }

    /// Head near the underside, inside the side margins, moving up
    pub fn is_hit_from_below(&self, player: &Body) -> bool {
        let head = player.pos.y;
        let near_underside = (head - self.aabb.bottom()).abs() < HEAD_HIT_TOLERANCE;
        let under = player.pos.x + player.size.x > self.aabb.left() + HEAD_HIT_MARGIN
            && player.pos.x < self.aabb.right() - HEAD_HIT_MARGIN;
        near_underside && under && player.vel.y < 0.0
    }

    pub fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) -> bool {
        if self.kind == BlockKind::Question && !self.used {
            self.animator.tick();
        }

        if self.state == BlockState::Idle && self.is_bumpable() {
            if let Some(player) = siblings.player_mut() {
                if player.can_bump_blocks() && self.is_hit_from_below(&player.body) {
                    self.state = BlockState::Hit {
                        by_super: player.is_super(),
                    };
                    player.bump_head(self.aabb.bottom(), HEAD_BUMP_REBOUND);
                }
            }
        }

        match self.state {
            BlockState::Hit { by_super } => {
                if self.resolve_hit(by_super, ctx) {
                    return true;
                }
            }
            BlockState::HitAnimation(mut timer) => {
                let done = timer.tick();
                let lift = (timer.fraction_remaining() * PI).sin() * BUMP_HEIGHT;
                self.aabb.pos.y = self.rest_y - lift;
                self.state = if done {
                    self.aabb.pos.y = self.rest_y;
                    BlockState::Idle
                } else {
                    BlockState::HitAnimation(timer)
                };
            }
            BlockState::Idle => {}
        }

        siblings.push_movers_out_of(&self.aabb);
        false
    }

    /// Apply a bump. Returns true when the block is destroyed.
    fn resolve_hit(&mut self, by_super: bool, ctx: &mut UpdateCtx<'_>) -> bool {
        match self.kind {
            BlockKind::Question => {
                if self.used {
                    self.state = BlockState::Idle;
                    return false;
                }
                self.used = true;
                self.animator.set_state(AnimState::Hold);
                match self.content {
                    BlockContent::Coin => {
                        let x = self.aabb.pos.x + (self.aabb.size.x - COIN_SIZE) / 2.0;
                        ctx.spawn(EntityKind::Coin(Coin::pop_out(x, self.rest_y)));
                    }
                    BlockContent::PowerUp => {
                        let x = self.aabb.pos.x + (self.aabb.size.x - POWER_UP_SIZE) / 2.0;
                        ctx.spawn(EntityKind::PowerUp(PowerUp::emerging(x, self.rest_y)));
                        ctx.emit(GameEvent::PowerUpSpawned);
                    }
                }
                log::debug!("question block at x={:.0} released {:?}", self.aabb.pos.x, self.content);
                ctx.emit(GameEvent::BlockBumped);
            }
            BlockKind::Brick if by_super => {
                for debris in BrickDebris::burst(&self.aabb, ctx.level.underground) {
                    ctx.spawn(EntityKind::Debris(debris));
                }
                log::debug!("brick broken at x={:.0}", self.aabb.pos.x);
                ctx.emit(GameEvent::Score(BRICK_SCORE));
                ctx.emit(GameEvent::BrickBroken);
                return true;
            }
            BlockKind::Brick => ctx.emit(GameEvent::BlockBumped),
            BlockKind::Stair => {
                self.state = BlockState::Idle;
                return false;
            }
        }
        self.state = BlockState::HitAnimation(Countdown::new(HIT_ANIMATION_TICKS));
        false
    }
}

pub const DEBRIS_SIZE: f32 = 16.0;
pub const DEBRIS_GRAVITY: f32 = 0.5;
pub const DEBRIS_SPEED: f32 = 4.0;
pub const DEBRIS_LIFETIME: u32 = 60;
/// Degrees per tick
pub const DEBRIS_SPIN: f32 = 10.0;

pub static DEBRIS_REGION: SpriteRegion = SpriteRegion::new(180, 26, 8, 8);
pub static DEBRIS_REGION_UNDERGROUND: SpriteRegion = SpriteRegion::new(180, 134, 8, 8);

/// A tumbling brick fragment; purely cosmetic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickDebris {
    pub body: Body,
    /// Degrees
    pub rotation: f32,
    pub spin: f32,
    pub life: Countdown,
    pub underground: bool,
}

impl BrickDebris {
    pub fn new(x: f32, y: f32, dir: f32, launch: f32, underground: bool) -> Self {
        let mut body = Body::new(x, y, DEBRIS_SIZE, DEBRIS_SIZE);
        body.vel = glam::Vec2::new(dir * DEBRIS_SPEED, launch);
        Self {
            body,
            rotation: 0.0,
            spin: dir * DEBRIS_SPIN,
            life: Countdown::new(DEBRIS_LIFETIME),
            underground,
        }
    }

    /// Four fragments from the corners of a broken brick
    pub fn burst(brick: &Aabb, underground: bool) -> [BrickDebris; 4] {
        let (x, y) = (brick.pos.x, brick.pos.y);
        let (hw, hh) = (brick.size.x / 2.0, brick.size.y / 2.0);
        [
            BrickDebris::new(x, y, -1.0, -8.0, underground),
            BrickDebris::new(x + hw, y, 1.0, -8.0, underground),
            BrickDebris::new(x, y + hh, -1.0, -5.0, underground),
            BrickDebris::new(x + hw, y + hh, 1.0, -5.0, underground),
        ]
    }

    pub fn region(&self) -> SpriteRegion {
        if self.underground { DEBRIS_REGION_UNDERGROUND } else { DEBRIS_REGION }
    }

    pub fn update(&mut self) -> bool {
        self.body.integrate(DEBRIS_GRAVITY);
        self.rotation += self.spin;
        self.life.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, LevelInfo};
    use crate::sim::player::Player;
    use crate::sim::tick::TickInput;

    fn player_below(block: &Block, vy: f32) -> Entity {
        let mut player = Player::new(block.aabb.pos.x, block.aabb.bottom() + 4.0);
        player.body.vel.y = vy;
        Entity {
            id: 1,
            kind: EntityKind::Player(player),
        }
    }

    fn step(block: &mut Block, others: &mut [Entity]) -> (bool, Vec<EntityKind>, Vec<GameEvent>) {
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
        let removed = block.update(&mut Siblings::new(others, &mut []), &mut ctx);
        (removed, spawns, events)
    }

    #[test]
    fn test_question_block_releases_coin_once() {
        let mut block = Block::new(100.0, 300.0, BlockKind::Question, BlockContent::Coin);
        let mut others = vec![player_below(&block, -5.0)];
        let (removed, spawns, events) = step(&mut block, &mut others);
        assert!(!removed);
        assert!(block.used);
        assert_eq!(spawns.len(), 1);
        let EntityKind::Coin(coin) = &spawns[0] else { panic!("expected a coin") };
        assert_eq!(coin.aabb.pos, glam::Vec2::new(105.0, 300.0));
        assert!(events.contains(&GameEvent::BlockBumped));

        let player = others[0].as_player().unwrap();
        assert_eq!(player.body.pos.y, 330.0);
        assert_eq!(player.body.vel.y, HEAD_BUMP_REBOUND);

        for _ in 0..HIT_ANIMATION_TICKS {
            step(&mut block, &mut []);
        }
        assert_eq!(block.state, BlockState::Idle);
        assert_eq!(block.aabb.pos.y, 300.0);

        let mut again = vec![player_below(&block, -5.0)];
        let (_, spawns, _) = step(&mut block, &mut again);
        assert!(spawns.is_empty());
    }

    #[test]
    fn test_hit_animation_lifts_then_settles() {
        let mut block = Block::new(0.0, 200.0, BlockKind::Brick, BlockContent::Coin);
        let mut others = vec![player_below(&block, -3.0)];
        step(&mut block, &mut others);
        let mut lowest = block.aabb.pos.y;
        for _ in 0..HIT_ANIMATION_TICKS {
            step(&mut block, &mut []);
            lowest = lowest.min(block.aabb.pos.y);
        }
        assert!(lowest < 200.0 && lowest >= 200.0 - BUMP_HEIGHT);
        assert_eq!(block.aabb.pos.y, 200.0);
    }

    #[test]
    fn test_super_player_breaks_brick() {
        let mut block = Block::new(0.0, 200.0, BlockKind::Brick, BlockContent::Coin);
        let mut others = vec![player_below(&block, -3.0)];
        if let EntityKind::Player(p) = &mut others[0].kind {
            p.make_super();
            p.body.pos.y = block.aabb.bottom() + 4.0;
        }
        let (removed, spawns, events) = step(&mut block, &mut others);
        assert!(removed);
        assert_eq!(spawns.iter().filter(|k| matches!(k, EntityKind::Debris(_))).count(), 4);
        assert!(events.contains(&GameEvent::BrickBroken));
    }

    #[test]
    fn test_stair_ignores_head_hits_but_stays_solid() {
        let mut block = Block::new(0.0, 200.0, BlockKind::Stair, BlockContent::Coin);
        let mut player = Player::new(0.0, 225.0);
        player.body.vel.y = -4.0;
        let mut others = vec![Entity {
            id: 1,
            kind: EntityKind::Player(player),
        }];
        let (_, spawns, events) = step(&mut block, &mut others);
        assert!(spawns.is_empty());
        assert!(events.is_empty());
        assert_eq!(others[0].as_player().unwrap().body.pos.y, 232.0);
    }

    #[test]
    fn test_debris_expires() {
        let mut debris = BrickDebris::new(0.0, 0.0, 1.0, -8.0, false);
        let ticks = (1..=100).find(|_| debris.update());
        assert_eq!(ticks, Some(DEBRIS_LIFETIME as usize));
        assert_eq!(debris.rotation, DEBRIS_SPIN * DEBRIS_LIFETIME as f32);
    }
}

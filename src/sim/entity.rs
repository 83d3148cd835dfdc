//! Entities: the closed set of simulated kinds and the views they update through
//!
//! An entity updates with `&mut` access to itself and to every sibling, split
//! around its own slot. Spawns and events go through `UpdateCtx` and are
//! applied by the world after the pass.

use super::blocks::{Block, BrickDebris};
use super::collision::{Aabb, Body, Contact, intersects, resolve_axis_separation};
use super::enemies::{ShellEnemy, Walker};
use super::items::{Coin, PowerUp};
use super::level_end::{Castle, Flagpole};
use super::player::Player;
use super::state::GameEvent;
use super::terrain::{Ground, MovingPlatform, Pipe};
use super::tick::TickInput;

/// Stable handle, assigned in spawn order
pub type EntityId = u32;

/// Static facts about the loaded level every entity may read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelInfo {
    pub width: f32,
    pub height: f32,
    pub underground: bool,
}

impl LevelInfo {
    /// Anything whose top is below this line has fallen out of the level
    pub fn fall_line(&self) -> f32 {
        self.height + crate::consts::FALL_MARGIN
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player(Player),
    Ground(Ground),
    Block(Block),
    Pipe(Pipe),
    MovingPlatform(MovingPlatform),
    Walker(Walker),
    Shell(ShellEnemy),
    Coin(Coin),
    PowerUp(PowerUp),
    Debris(BrickDebris),
    Flagpole(Flagpole),
    Castle(Castle),
}

impl Entity {
    /// Advance one tick. Returns true when the entity should be removed.
    pub fn update(&mut self, siblings: &mut Siblings<'_>, ctx: &mut UpdateCtx<'_>) -> bool {
        match &mut self.kind {
            EntityKind::Player(p) => p.update(siblings, ctx),
            EntityKind::Ground(_) => false,
            EntityKind::Block(b) => b.update(siblings, ctx),
            EntityKind::Pipe(p) => p.update(siblings),
            EntityKind::MovingPlatform(m) => m.update(siblings),
            EntityKind::Walker(w) => w.update(siblings, ctx),
            EntityKind::Shell(s) => s.update(siblings, ctx),
            EntityKind::Coin(c) => c.update(siblings, ctx),
            EntityKind::PowerUp(m) => m.update(siblings, ctx),
            EntityKind::Debris(d) => d.update(),
            EntityKind::Flagpole(f) => f.update(siblings, ctx),
            EntityKind::Castle(c) => c.update(siblings),
        }
    }

    /// World-space bounding box (used for culling and debug outlines)
    pub fn bounds(&self) -> Aabb {
        match &self.kind {
            EntityKind::Player(p) => p.body.aabb(),
            EntityKind::Ground(g) => g.aabb,
            EntityKind::Block(b) => b.aabb,
            EntityKind::Pipe(p) => p.aabb,
            EntityKind::MovingPlatform(m) => m.aabb,
            EntityKind::Walker(w) => w.body.aabb(),
            EntityKind::Shell(s) => s.body.aabb(),
            EntityKind::Coin(c) => c.aabb,
            EntityKind::PowerUp(m) => m.body.aabb(),
            EntityKind::Debris(d) => d.body.aabb(),
            EntityKind::Flagpole(f) => f.aabb,
            EntityKind::Castle(c) => c.aabb,
        }
    }

    /// Box of anything that blocks movement
    pub fn solid_bounds(&self) -> Option<Aabb> {
        match &self.kind {
            EntityKind::Ground(g) => Some(g.aabb),
            EntityKind::Block(b) => Some(b.aabb),
            EntityKind::Pipe(p) => Some(p.aabb),
            EntityKind::MovingPlatform(m) => Some(m.aabb),
            _ => None,
        }
    }

    /// Body of a mover that obstacles may push or carry
    pub fn pushable_body_mut(&mut self) -> Option<&mut Body> {
        match &mut self.kind {
            EntityKind::Player(p) if p.accepts_pushes() => Some(&mut p.body),
            EntityKind::Walker(w) if w.is_alive() => Some(&mut w.body),
            EntityKind::Shell(s) if s.is_active() => Some(&mut s.body),
            EntityKind::PowerUp(m) if !m.is_emerging() => Some(&mut m.body),
            _ => None,
        }
    }

    /// Obstacle response: push this entity out of `obstacle` if it is a mover,
    /// then let it react to the side it was pushed to.
    pub fn push_out_of(&mut self, obstacle: &Aabb) -> Option<Contact> {
        let contact = resolve_axis_separation(self.pushable_body_mut()?, obstacle)?;
        self.on_obstacle_contact(contact);
        Some(contact)
    }

    /// Per-kind reaction once the resolver has moved the body
    fn on_obstacle_contact(&mut self, contact: Contact) {
        match &mut self.kind {
            EntityKind::Walker(w) => w.on_obstacle_contact(contact),
            EntityKind::Shell(s) => s.on_obstacle_contact(contact),
            EntityKind::PowerUp(m) => m.on_obstacle_contact(contact),
            _ => {}
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    /// Short kind name for logs
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            EntityKind::Player(_) => "player",
            EntityKind::Ground(_) => "ground",
            EntityKind::Block(_) => "block",
            EntityKind::Pipe(_) => "pipe",
            EntityKind::MovingPlatform(_) => "moving-platform",
            EntityKind::Walker(_) => "walker",
            EntityKind::Shell(_) => "shell",
            EntityKind::Coin(_) => "coin",
            EntityKind::PowerUp(_) => "power-up",
            EntityKind::Debris(_) => "debris",
            EntityKind::Flagpole(_) => "flagpole",
            EntityKind::Castle(_) => "castle",
        }
    }
}

/// Every other live entity, in list order, around the one being updated
///
/// Earlier siblings have already been updated this tick; later ones have not.
pub struct Siblings<'a> {
    before: &'a mut [Entity],
    after: &'a mut [Entity],
}

impl<'a> Siblings<'a> {
    pub fn new(before: &'a mut [Entity], after: &'a mut [Entity]) -> Self {
        Self { before, after }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.before.iter().chain(self.after.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.before.iter_mut().chain(self.after.iter_mut())
    }

    pub fn player(&self) -> Option<&Player> {
        self.iter().find_map(Entity::as_player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.iter_mut().find_map(Entity::as_player_mut)
    }

    pub fn castle_mut(&mut self) -> Option<&mut Castle> {
        self.iter_mut().find_map(|e| match &mut e.kind {
            EntityKind::Castle(c) => Some(c),
            _ => None,
        })
    }

    /// True if any solid sibling overlaps `area`
    pub fn any_solid_overlaps(&self, area: &Aabb) -> bool {
        self.iter()
            .filter_map(Entity::solid_bounds)
            .any(|solid| intersects(&solid, area))
    }

    /// Push every overlapping mover out of `obstacle`
    pub fn push_movers_out_of(&mut self, obstacle: &Aabb) {
        for entity in self.iter_mut() {
            entity.push_out_of(obstacle);
        }
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Results of ground resolution for one mover
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroundContacts {
    /// Side of the last segment the mover was pushed to horizontally
    pub wall: Option<Contact>,
    pub landed: bool,
}

/// Resolve a mover against every ground segment among its siblings
///
/// Ground is passive: movers resolve themselves against it. Other obstacles
/// push movers from their own update.
pub fn collide_with_ground(body: &mut Body, siblings: &Siblings<'_>) -> GroundContacts {
    let mut contacts = GroundContacts::default();
    for sibling in siblings.iter() {
        let EntityKind::Ground(ground) = &sibling.kind else { continue };
        match resolve_axis_separation(body, &ground.aabb) {
            Some(side @ (Contact::Left | Contact::Right)) => contacts.wall = Some(side),
            Some(Contact::Top) => contacts.landed = true,
            _ => {}
        }
    }
    contacts
}

/// Reverse at the level's horizontal edges, returning the new direction
pub fn bounce_off_level_edges(body: &mut Body, dir: f32, level: &LevelInfo) -> f32 {
    if dir < 0.0 && body.pos.x <= 0.0 {
        body.pos.x = 0.0;
        1.0
    } else if dir > 0.0 && body.pos.x >= level.width - body.size.x {
        body.pos.x = level.width - body.size.x;
        -1.0
    } else {
        dir
    }
}

/// Per-update context: input snapshot, level facts, and the buffers the world
/// drains after the pass
pub struct UpdateCtx<'a> {
    pub input: &'a TickInput,
    pub level: LevelInfo,
    pub spawns: &'a mut Vec<EntityKind>,
    pub events: &'a mut Vec<GameEvent>,
}

impl UpdateCtx<'_> {
    /// Queue a new entity; it gets its first update next tick
    pub fn spawn(&mut self, kind: EntityKind) {
        self.spawns.push(kind);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

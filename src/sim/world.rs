//! The world loop: one ordered update pass over every live entity per tick
//!
//! Removal and spawning are applied after the pass. An entity sees earlier
//! siblings already updated this tick and later ones not yet; spawned
//! entities get their first update on the next tick.

use std::panic::{self, AssertUnwindSafe};

use super::camera::Camera;
use super::entity::{Entity, EntityId, EntityKind, LevelInfo, Siblings, UpdateCtx};
use super::player::Player;
use super::state::GameEvent;
use super::tick::TickInput;

#[derive(Debug, Clone)]
pub struct World {
    entities: Vec<Entity>,
    pub camera: Camera,
    pub info: LevelInfo,
    next_id: EntityId,
}

impl World {
    pub fn new(info: LevelInfo, mut camera: Camera) -> Self {
        camera.set_level_boundaries(info.width, info.height);
        camera.reset();
        Self {
            entities: Vec::new(),
            camera,
            info,
            next_id: 0,
        }
    }

    /// Append an entity at the end of the update order
    pub fn spawn(&mut self, kind: EntityKind) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(Entity { id, kind });
        id
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn player(&self) -> Option<&Player> {
        self.entities.iter().find_map(Entity::as_player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.entities.iter_mut().find_map(Entity::as_player_mut)
    }

    /// Entities in update order that the camera can see
    pub fn visible_entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(|e| self.camera.is_visible(&e.bounds()))
    }

    /// Run one update pass, pushing everything entities report into `events`
    pub fn tick(&mut self, input: &TickInput, events: &mut Vec<GameEvent>) {
        self.tick_with(input, events, |entity, siblings, ctx| entity.update(siblings, ctx));
    }

    fn tick_with<F>(&mut self, input: &TickInput, events: &mut Vec<GameEvent>, mut update: F)
    where
        F: FnMut(&mut Entity, &mut Siblings<'_>, &mut UpdateCtx<'_>) -> bool,
    {
        let mut spawns = Vec::new();
        let mut removed = vec![false; self.entities.len()];

        for (i, remove) in removed.iter_mut().enumerate() {
            let (before, rest) = self.entities.split_at_mut(i);
            let Some((entity, after)) = rest.split_first_mut() else {
                break;
            };
            let mut siblings = Siblings::new(before, after);
            let mut ctx = UpdateCtx {
                input,
                level: self.info,
                spawns: &mut spawns,
                events: &mut *events,
            };
            let (id, name) = (entity.id, entity.kind_name());
            *remove = update_isolated(id, name, || update(entity, &mut siblings, &mut ctx));
        }

        let mut flags = removed.into_iter();
        self.entities.retain(|_| !flags.next().unwrap_or(false));
        for kind in spawns {
            self.spawn(kind);
        }

        if let Some(bounds) = self.player().map(|p| p.body.aabb()) {
            self.camera.update(&bounds);
        }
    }
}

/// Run one entity's update, containing a panic to that entity. A panicked
/// entity is kept.
fn update_isolated(id: EntityId, name: &str, update: impl FnOnce() -> bool) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(update)) {
        Ok(remove) => remove,
        Err(_) => {
            log::error!("{name} #{id} panicked during update; keeping it");
            false
        }
    }
}

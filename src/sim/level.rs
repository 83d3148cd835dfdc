//! Declarative level data and its instantiation into a fresh world
//!
//! Optional sections may be absent. A list entry that does not parse is
//! logged and skipped; the rest of the level still loads.

use serde::{Deserialize, Serialize};

use super::blocks::{Block, BlockContent, BlockKind};
use super::camera::Camera;
use super::enemies::{ShellEnemy, Walker};
use super::entity::{EntityKind, LevelInfo};
use super::items::Coin;
use super::level_end::{Castle, Flagpole};
use super::player::Player;
use super::state::LevelError;
use super::terrain::{Ground, MovingPlatform, Pipe, PipeSize};
use super::world::World;
use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::settings::CameraConfig;

static BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A list entry that either parsed or is kept raw to be reported and skipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry<T> {
    Valid(T),
    Malformed(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundDef {
    pub x: f32,
    /// Defaults to resting on the bottom of the level
    #[serde(default)]
    pub y: Option<f32>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub content: BlockContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeDef {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub size: PipeSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformDef {
    pub x: f32,
    pub y: f32,
    /// Travel bounds; default to the whole level height
    #[serde(default)]
    pub top: Option<f32>,
    #[serde(default)]
    pub bottom: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    #[serde(alias = "goomba")]
    Walker,
    #[serde(alias = "turtle", alias = "koopa")]
    Shell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDef {
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelEndDef {
    #[serde(default)]
    pub flagpole: Option<Point>,
    #[serde(default)]
    pub castle: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub id: String,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub underground: bool,
    pub player_spawn: Point,
    #[serde(default)]
    pub ground_segments: Vec<Entry<GroundDef>>,
    #[serde(default)]
    pub blocks: Vec<Entry<BlockDef>>,
    #[serde(default)]
    pub pipes: Vec<Entry<PipeDef>>,
    #[serde(default)]
    pub moving_platforms: Vec<Entry<PlatformDef>>,
    #[serde(default)]
    pub coins: Vec<Entry<Point>>,
    #[serde(default)]
    pub enemies: Vec<Entry<EnemyDef>>,
    #[serde(default)]
    pub level_end: LevelEndDef,
}

/// Valid entries of a list, warning about the rest
fn valid<'a, T>(level: &str, section: &str, entries: &'a [Entry<T>]) -> impl Iterator<Item = &'a T> {
    entries.iter().filter_map(move |entry| match entry {
        Entry::Valid(def) => Some(def),
        Entry::Malformed(raw) => {
            log::warn!("level {level}: skipping malformed {section} entry {raw}");
            None
        }
    })
}

impl LevelDefinition {
    /// Parse a JSON array of level definitions
    pub fn parse_list(json: &str) -> Result<Vec<LevelDefinition>, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The levels shipped with the game
    pub fn builtin() -> Result<Vec<LevelDefinition>, LevelError> {
        Self::parse_list(BUILTIN_LEVELS)
    }

    pub fn info(&self) -> LevelInfo {
        LevelInfo {
            width: self.width,
            height: self.height,
            underground: self.underground,
        }
    }

    /// Build a fresh world: player first, then ground, blocks, pipes,
    /// platforms, coins, enemies, flagpole and castle
    pub fn instantiate(&self, camera: CameraConfig) -> World {
        let info = self.info();
        let mut world = World::new(info, Camera::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT, camera));
        let id = self.id.as_str();

        world.spawn(EntityKind::Player(Player::new(self.player_spawn.x, self.player_spawn.y)));

        for g in valid(id, "ground", &self.ground_segments) {
            let y = g.y.unwrap_or(self.height - g.height);
            world.spawn(EntityKind::Ground(Ground::new(g.x, y, g.width, g.height)));
        }
        for b in valid(id, "block", &self.blocks) {
            world.spawn(EntityKind::Block(Block::new(b.x, b.y, b.kind, b.content)));
        }
        for p in valid(id, "pipe", &self.pipes) {
            world.spawn(EntityKind::Pipe(Pipe::new(p.x, p.y, p.size)));
        }
        for m in valid(id, "moving platform", &self.moving_platforms) {
            let top = m.top.unwrap_or(0.0);
            let bottom = m.bottom.unwrap_or(self.height);
            world.spawn(EntityKind::MovingPlatform(MovingPlatform::new(m.x, m.y, top, bottom)));
        }
        for c in valid(id, "coin", &self.coins) {
            world.spawn(EntityKind::Coin(Coin::placed(c.x, c.y)));
        }
        for e in valid(id, "enemy", &self.enemies) {
            let kind = match e.kind {
                EnemyKind::Walker => EntityKind::Walker(Walker::new(e.x, e.y)),
                EnemyKind::Shell => EntityKind::Shell(ShellEnemy::new(e.x, e.y, self.underground)),
            };
            world.spawn(kind);
        }
        if let Some(pole) = self.level_end.flagpole {
            world.spawn(EntityKind::Flagpole(Flagpole::new(pole.x, pole.y)));
        }
        if let Some(castle) = self.level_end.castle {
            world.spawn(EntityKind::Castle(Castle::new(castle.x, castle.y)));
        }

        log::debug!("level {id}: {} entities", world.len());
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"[{
        "id": "t-1",
        "width": 1000,
        "height": 480,
        "player_spawn": { "x": 50, "y": 380 },
        "ground_segments": [ { "x": 0, "width": 1000, "height": 32 } ],
        "blocks": [
            { "x": 200, "y": 300, "type": "question", "content": "mushroom" },
            {},
            { "x": 230, "y": 300, "type": "brick" }
        ],
        "enemies": [
            { "type": "goomba", "x": 400, "y": 416 },
            { "type": "piranha", "x": 500, "y": 416 }
        ]
    }]"#;

    #[test]
    fn test_builtin_levels_parse() {
        let levels = LevelDefinition::builtin().unwrap();
        assert!(levels.len() >= 2);
        assert_eq!(levels[0].id, "1-1");
        assert!(levels.iter().any(|l| l.underground));
        for level in &levels {
            let world = level.instantiate(CameraConfig::default());
            assert!(world.player().is_some());
        }
    }

    #[test]
    fn test_missing_sections_and_malformed_entries_are_skipped() {
        let levels = LevelDefinition::parse_list(MINIMAL).unwrap();
        let world = levels[0].instantiate(CameraConfig::default());
        let kinds: Vec<&str> = world.entities().iter().map(|e| e.kind_name()).collect();
        assert_eq!(kinds, vec!["player", "ground", "block", "block", "walker"]);
    }

    #[test]
    fn test_ground_defaults_to_level_bottom() {
        let levels = LevelDefinition::parse_list(MINIMAL).unwrap();
        let world = levels[0].instantiate(CameraConfig::default());
        assert_eq!(world.entities()[1].bounds().pos.y, 448.0);
    }

    #[test]
    fn test_instantiation_is_repeatable() {
        let levels = LevelDefinition::builtin().unwrap();
        let a = levels[0].instantiate(CameraConfig::default());
        let b = levels[0].instantiate(CameraConfig::default());
        assert_eq!(a.entities(), b.entities());
    }

    #[test]
    fn test_bad_json_is_a_parse_error() {
        assert!(matches!(LevelDefinition::parse_list("{"), Err(LevelError::Parse(_))));
    }
}

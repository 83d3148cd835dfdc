//! Per-kind drawing in world space
//!
//! Animated entities draw their animator's current frame. Static art
//! (ground tiles, pipes, platforms, the flagpole) uses the tables here.

use glam::Vec2;

use super::{Color, ImageId, Surface, blit};
use crate::sim::animation::{Animator, SpriteRegion};
use crate::sim::blocks::{Block, BlockKind, BrickDebris};
use crate::sim::collision::Aabb;
use crate::sim::entity::{Entity, EntityKind};
use crate::sim::items::{Coin, POWER_UP_REGION};
use crate::sim::level_end::{CASTLE_REGION, Castle, Flagpole, POLE_SEGMENT_REGION, POLE_TOP_REGION};
use crate::sim::player::Player;
use crate::sim::terrain::{Ground, MovingPlatform, PIPE_HEAD_HEIGHT, Pipe};

/// Ground tiles are 16 px in the sheet, drawn at 32
pub const GROUND_TILE: SpriteRegion = SpriteRegion::new(0, 16, 16, 16);
pub const GROUND_TILE_SIZE: f32 = 32.0;

pub const PIPE_TOP_LEFT: SpriteRegion = SpriteRegion::new(119, 196, 16, 16);
pub const PIPE_TOP_RIGHT: SpriteRegion = SpriteRegion::new(136, 196, 16, 16);
pub const PIPE_STEM_LEFT: SpriteRegion = SpriteRegion::new(119, 213, 16, 16);
pub const PIPE_STEM_RIGHT: SpriteRegion = SpriteRegion::new(135, 213, 16, 16);
/// Right halves overlap the left ones to hide the seam
const PIPE_SEAM: f32 = 3.0;
const PIPE_STEM_SEGMENT: f32 = 16.0;

pub const PLATFORM_REGION: SpriteRegion = SpriteRegion::new(143, 43, 32, 8);
pub const CASTLE_FLAG_REGION: SpriteRegion = SpriteRegion::new(0, 0, 32, 32);
const CASTLE_FLAG_OFFSET: Vec2 = Vec2::new(-94.0, 10.0);
const CASTLE_FLAG_SIZE: f32 = 32.0;

const POLE_SEGMENT: f32 = 16.0;

const COIN_FILL: Color = [1.0, 0.84, 0.0, 1.0];
const COIN_RIM: Color = [0.85, 0.65, 0.13, 1.0];

fn draw_frame_of(surface: &mut dyn Surface, image: ImageId, animator: &Animator, dest: Aabb) {
    if let Some(frame) = animator.current_frame() {
        blit(surface, image, frame, dest);
    }
}

/// Draw any entity except the player, which `draw_player` handles
pub fn draw_entity(surface: &mut dyn Surface, entity: &Entity) {
    match &entity.kind {
        EntityKind::Player(p) => draw_player(surface, p),
        EntityKind::Ground(g) => draw_ground(surface, g),
        EntityKind::Block(b) => draw_block(surface, b),
        EntityKind::Pipe(p) => draw_pipe(surface, p),
        EntityKind::MovingPlatform(m) => draw_platform(surface, m),
        EntityKind::Walker(w) => draw_frame_of(surface, ImageId::Enemies, &w.animator, w.body.aabb()),
        EntityKind::Shell(s) => draw_frame_of(surface, ImageId::Enemies, &s.animator, s.body.aabb()),
        EntityKind::Coin(c) => draw_coin(surface, c),
        EntityKind::PowerUp(m) => blit(surface, ImageId::Items, POWER_UP_REGION, m.body.aabb()),
        EntityKind::Debris(d) => draw_debris(surface, d),
        EntityKind::Flagpole(f) => draw_flagpole(surface, f),
        EntityKind::Castle(c) => draw_castle(surface, c),
    }
}

pub fn draw_player(surface: &mut dyn Surface, player: &Player) {
    if player.visible {
        draw_frame_of(surface, ImageId::Player, &player.animator, player.body.aabb());
    }
}

fn draw_ground(surface: &mut dyn Surface, ground: &Ground) {
    let cols = (ground.aabb.size.x / GROUND_TILE_SIZE).ceil() as u32;
    let rows = (ground.aabb.size.y / GROUND_TILE_SIZE).ceil() as u32;
    for row in 0..rows {
        for col in 0..cols {
            let dest = Aabb::new(
                ground.aabb.pos.x + col as f32 * GROUND_TILE_SIZE,
                ground.aabb.pos.y + row as f32 * GROUND_TILE_SIZE,
                GROUND_TILE_SIZE,
                GROUND_TILE_SIZE,
            );
            blit(surface, ImageId::Ground, GROUND_TILE, dest);
        }
    }
}

fn draw_block(surface: &mut dyn Surface, block: &Block) {
    let image = match block.kind {
        BlockKind::Stair => ImageId::Tileset,
        BlockKind::Brick | BlockKind::Question => ImageId::Blocks,
    };
    draw_frame_of(surface, image, &block.animator, block.aabb);
}

fn draw_pipe(surface: &mut dyn Surface, pipe: &Pipe) {
    let head = pipe.head();
    let half = head.size.x / 2.0;
    blit(
        surface,
        ImageId::Tileset,
        PIPE_TOP_LEFT,
        Aabb::new(head.pos.x.floor(), head.pos.y.floor(), half, PIPE_HEAD_HEIGHT),
    );
    blit(
        surface,
        ImageId::Tileset,
        PIPE_TOP_RIGHT,
        Aabb::new((head.pos.x + half).floor() - PIPE_SEAM, head.pos.y.floor(), half, PIPE_HEAD_HEIGHT),
    );

    let stem = pipe.stem();
    let stem_half = stem.size.x / 2.0;
    let segments = (stem.size.y / PIPE_STEM_SEGMENT).ceil() as u32;
    for i in 0..segments {
        let top = i as f32 * PIPE_STEM_SEGMENT;
        let h = PIPE_STEM_SEGMENT.min(stem.size.y - top);
        let y = (stem.pos.y + top).floor();
        blit(
            surface,
            ImageId::Tileset,
            PIPE_STEM_LEFT,
            Aabb::new(stem.pos.x.floor(), y, stem_half, h),
        );
        blit(
            surface,
            ImageId::Tileset,
            PIPE_STEM_RIGHT,
            Aabb::new((stem.pos.x + stem_half).floor() - PIPE_SEAM, y, stem_half, h),
        );
    }
}

fn draw_platform(surface: &mut dyn Surface, platform: &MovingPlatform) {
    blit(surface, ImageId::Platform, PLATFORM_REGION, platform.aabb);
}

/// A spinning disc: horizontal extent follows the spin angle
fn draw_coin(surface: &mut dyn Surface, coin: &Coin) {
    let alpha = coin.alpha();
    if alpha <= 0.0 {
        return;
    }
    let squash = coin.spin.cos().abs().max(0.15);
    let w = coin.aabb.size.x * squash;
    let rim = Aabb::new(coin.aabb.center().x - w / 2.0, coin.aabb.pos.y, w, coin.aabb.size.y);
    let fill = Aabb::new(rim.pos.x + 2.0, rim.pos.y + 2.0, (w - 4.0).max(0.0), rim.size.y - 4.0);

    surface.set_alpha(alpha);
    surface.fill_ellipse(rim, COIN_RIM);
    surface.fill_ellipse(fill, COIN_FILL);
    surface.set_alpha(1.0);
}

fn draw_debris(surface: &mut dyn Surface, debris: &BrickDebris) {
    if surface.image_ready(ImageId::Items) {
        surface.draw_image_rotated(ImageId::Items, debris.region(), debris.body.aabb(), debris.rotation.to_radians());
    }
}

fn draw_flagpole(surface: &mut dyn Surface, pole: &Flagpole) {
    let a = pole.aabb;
    blit(
        surface,
        ImageId::Tileset,
        POLE_TOP_REGION,
        Aabb::new(a.pos.x - 6.0, a.pos.y - POLE_SEGMENT, POLE_SEGMENT, POLE_SEGMENT),
    );
    let segments = (a.size.y / POLE_SEGMENT).floor() as u32;
    for i in 0..segments {
        let dest = Aabb::new(a.pos.x, a.pos.y + i as f32 * POLE_SEGMENT, POLE_SEGMENT, POLE_SEGMENT);
        blit(surface, ImageId::Tileset, POLE_SEGMENT_REGION, dest);
    }
}

fn draw_castle(surface: &mut dyn Surface, castle: &Castle) {
    let flag = Aabb::new(
        castle.aabb.center().x + CASTLE_FLAG_OFFSET.x,
        castle.flag_y + CASTLE_FLAG_OFFSET.y,
        CASTLE_FLAG_SIZE,
        CASTLE_FLAG_SIZE,
    );
    blit(surface, ImageId::CastleFlag, CASTLE_FLAG_REGION, flag);
    blit(surface, ImageId::Castle, CASTLE_REGION, castle.aabb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, DrawList};
    use crate::sim::terrain::PipeSize;

    fn entity(kind: EntityKind) -> Entity {
        Entity { id: 0, kind }
    }

    #[test]
    fn test_ground_tiles_cover_segment() {
        let mut list = DrawList::new();
        draw_entity(&mut list, &entity(EntityKind::Ground(Ground::new(0.0, 448.0, 100.0, 32.0))));
        assert_eq!(list.image_count(ImageId::Ground), 4);
    }

    #[test]
    fn test_pipe_head_and_stem_segments() {
        let mut list = DrawList::new();
        // Large stem is 100 tall: 7 segments, the last one 4 px
        draw_entity(&mut list, &entity(EntityKind::Pipe(Pipe::new(0.0, 320.0, PipeSize::Large))));
        assert_eq!(list.image_count(ImageId::Tileset), 2 + 2 * 7);
        let last = list.commands.last().cloned();
        assert!(matches!(last, Some(DrawCommand::Image { dest, .. }) if dest.size.y == 4.0));
    }

    #[test]
    fn test_fading_coin_restores_alpha() {
        let mut list = DrawList::new();
        draw_entity(&mut list, &entity(EntityKind::Coin(Coin::placed(0.0, 0.0))));
        assert_eq!(list.commands.first(), Some(&DrawCommand::Alpha(1.0)));
        assert_eq!(list.commands.last(), Some(&DrawCommand::Alpha(1.0)));
    }

    #[test]
    fn test_invisible_player_not_drawn() {
        let mut list = DrawList::new();
        let mut player = Player::new(0.0, 0.0);
        player.visible = false;
        draw_player(&mut list, &player);
        assert!(list.commands.is_empty());
    }
}

//! Render boundary
//!
//! The simulation never touches pixels. A frame is described through the
//! `Surface` trait: sprite-sheet blits, a few primitives and text. Hosts
//! implement it over their canvas; `DrawList` records the calls for
//! headless runs and tests.

pub mod background;
pub mod hud;
pub mod sprites;

use std::collections::HashSet;

use glam::Vec2;

use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::settings::Settings;
use crate::sim::GameState;
use crate::sim::animation::SpriteRegion;
use crate::sim::collision::Aabb;

/// RGBA, 0.0 - 1.0
pub type Color = [f32; 4];

pub const SKY: Color = [0.42, 0.55, 1.0, 1.0];
pub const UNDERGROUND_SKY: Color = [0.0, 0.0, 0.0, 1.0];
pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
pub const HITBOX: Color = [1.0, 0.0, 0.0, 1.0];

/// Named image resources the host loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageId {
    Player,
    Enemies,
    Blocks,
    Items,
    /// Shared tileset: stairs, pipes, flagpole
    Tileset,
    Ground,
    Platform,
    Castle,
    CastleFlag,
    /// Hills, bushes and clouds
    Scenery,
    TimeUp,
    GameOver,
}

impl ImageId {
    pub const ALL: [ImageId; 12] = [
        ImageId::Player,
        ImageId::Enemies,
        ImageId::Blocks,
        ImageId::Items,
        ImageId::Tileset,
        ImageId::Ground,
        ImageId::Platform,
        ImageId::Castle,
        ImageId::CastleFlag,
        ImageId::Scenery,
        ImageId::TimeUp,
        ImageId::GameOver,
    ];

    /// Asset path relative to the game's root
    pub fn path(self) -> &'static str {
        match self {
            ImageId::Player => "images/player.png",
            ImageId::Enemies => "images/enemies.png",
            ImageId::Blocks => "images/blocks.png",
            ImageId::Items => "images/items.png",
            ImageId::Tileset => "images/tileset.png",
            ImageId::Ground => "images/ground.png",
            ImageId::Platform => "images/platform.png",
            ImageId::Castle => "images/castle.png",
            ImageId::CastleFlag => "images/castle-flag.png",
            ImageId::Scenery => "images/grass.png",
            ImageId::TimeUp => "images/timeup.png",
            ImageId::GameOver => "images/gameover.png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Host drawing capability
pub trait Surface {
    /// Images load asynchronously; drawing an unready image is skipped
    fn image_ready(&self, image: ImageId) -> bool;
    fn draw_image(&mut self, image: ImageId, src: SpriteRegion, dest: Aabb);
    /// Rotated about the destination's center, in radians
    fn draw_image_rotated(&mut self, image: ImageId, src: SpriteRegion, dest: Aabb, _angle: f32) {
        self.draw_image(image, src, dest);
    }
    fn fill_rect(&mut self, rect: Aabb, color: Color);
    fn fill_ellipse(&mut self, rect: Aabb, color: Color);
    fn stroke_rect(&mut self, rect: Aabb, color: Color, line_width: f32);
    fn fill_text(&mut self, text: &str, pos: Vec2, align: TextAlign, color: Color);
    fn set_alpha(&mut self, alpha: f32);
    fn push_translation(&mut self, offset: Vec2);
    fn pop_translation(&mut self);
}

/// Blit `src` of `image` if the image has loaded
pub fn blit(surface: &mut dyn Surface, image: ImageId, src: SpriteRegion, dest: Aabb) {
    if surface.image_ready(image) {
        surface.draw_image(image, src, dest);
    }
}

/// One recorded surface call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Image {
        image: ImageId,
        src: SpriteRegion,
        dest: Aabb,
        angle: f32,
    },
    FillRect(Aabb, Color),
    FillEllipse(Aabb, Color),
    StrokeRect(Aabb, Color, f32),
    Text {
        text: String,
        pos: Vec2,
        align: TextAlign,
    },
    Alpha(f32),
    PushTranslation(Vec2),
    PopTranslation,
}

/// Surface that records every call
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    missing: HashSet<ImageId>,
}

impl DrawList {
    /// All images ready
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `images` are still loading
    pub fn with_missing(images: &[ImageId]) -> Self {
        Self {
            commands: Vec::new(),
            missing: images.iter().copied().collect(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn image_count(&self, image: ImageId) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { image: i, .. } if *i == image))
            .count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for DrawList {
    fn image_ready(&self, image: ImageId) -> bool {
        !self.missing.contains(&image)
    }

    fn draw_image(&mut self, image: ImageId, src: SpriteRegion, dest: Aabb) {
        self.draw_image_rotated(image, src, dest, 0.0);
    }

    fn draw_image_rotated(&mut self, image: ImageId, src: SpriteRegion, dest: Aabb, angle: f32) {
        self.commands.push(DrawCommand::Image {
            image,
            src,
            dest,
            angle,
        });
    }

    fn fill_rect(&mut self, rect: Aabb, color: Color) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn fill_ellipse(&mut self, rect: Aabb, color: Color) {
        self.commands.push(DrawCommand::FillEllipse(rect, color));
    }

    fn stroke_rect(&mut self, rect: Aabb, color: Color, line_width: f32) {
        self.commands.push(DrawCommand::StrokeRect(rect, color, line_width));
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, align: TextAlign, _color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            align,
        });
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::Alpha(alpha));
    }

    fn push_translation(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::PushTranslation(offset));
    }

    fn pop_translation(&mut self) {
        self.commands.push(DrawCommand::PopTranslation);
    }
}

/// Draw one frame: sky, camera-space scenery and entities, then the HUD
pub fn draw_frame(surface: &mut dyn Surface, state: &GameState, settings: &Settings) {
    let world = &state.world;
    let screen = Aabb::new(0.0, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
    let sky = if world.info.underground { UNDERGROUND_SKY } else { SKY };
    surface.fill_rect(screen, sky);

    if !state.hud.freezes_world() {
        surface.push_translation(world.camera.world_to_screen(Vec2::ZERO));
        background::draw_scenery(surface, world);
        // The player goes last so it stays in front of the castle
        let mut player = None;
        for entity in world.visible_entities() {
            match entity.as_player() {
                Some(p) => player = Some(p),
                None => sprites::draw_entity(surface, entity),
            }
        }
        if let Some(p) = player {
            sprites::draw_player(surface, p);
        }
        if settings.show_hitboxes {
            for entity in world.visible_entities() {
                surface.stroke_rect(entity.bounds(), HITBOX, 1.0);
            }
        }
        surface.pop_translation();
    }

    hud::draw_hud(surface, &state.hud, world.info.underground);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CameraConfig;

    fn state() -> GameState {
        GameState::with_builtin_levels(CameraConfig::default()).unwrap()
    }

    #[test]
    fn test_frame_is_translated_by_camera() {
        let mut state = state();
        state.world.camera.position = Vec2::new(120.0, 0.0);
        let mut list = DrawList::new();
        draw_frame(&mut list, &state, &Settings::default());
        assert!(list.commands.contains(&DrawCommand::PushTranslation(Vec2::new(-120.0, 0.0))));
        let pushes = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::PushTranslation(_)))
            .count();
        let pops = list.commands.iter().filter(|c| **c == DrawCommand::PopTranslation).count();
        assert_eq!(pushes, pops);
        assert_eq!(list.image_count(ImageId::Player), 1);
    }

    #[test]
    fn test_unready_images_are_skipped() {
        let state = state();
        let mut list = DrawList::with_missing(&[ImageId::Ground, ImageId::Player]);
        draw_frame(&mut list, &state, &Settings::default());
        assert_eq!(list.image_count(ImageId::Ground), 0);
        assert_eq!(list.image_count(ImageId::Player), 0);
        // Everything else still draws
        assert!(list.image_count(ImageId::Blocks) > 0);
    }

    #[test]
    fn test_offscreen_entities_are_culled() {
        let state = state();
        let mut list = DrawList::new();
        draw_frame(&mut list, &state, &Settings::default());
        // The castle is thousands of pixels to the right of the first screen
        assert_eq!(list.image_count(ImageId::Castle), 0);
    }

    #[test]
    fn test_scenery_drawn_behind_entities() {
        let state = state();
        let mut list = DrawList::new();
        draw_frame(&mut list, &state, &Settings::default());
        let position = |image: ImageId| {
            list.commands
                .iter()
                .position(|c| matches!(c, DrawCommand::Image { image: i, .. } if *i == image))
        };
        let scenery = position(ImageId::Scenery);
        assert!(scenery.is_some());
        assert!(scenery < position(ImageId::Ground));
        assert!(scenery < position(ImageId::Player));
    }

    #[test]
    fn test_hitboxes_on_request() {
        let state = state();
        let mut settings = Settings::default();
        let mut list = DrawList::new();
        draw_frame(&mut list, &state, &settings);
        assert!(!list.commands.iter().any(|c| matches!(c, DrawCommand::StrokeRect(..))));
        settings.show_hitboxes = true;
        list.clear();
        draw_frame(&mut list, &state, &settings);
        assert!(list.commands.iter().any(|c| matches!(c, DrawCommand::StrokeRect(..))));
    }
}

//! Screen-space HUD overlay

use glam::Vec2;

use super::{Color, ImageId, Surface, TextAlign, WHITE};
use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::sim::animation::SpriteRegion;
use crate::sim::collision::Aabb;
use crate::sim::hud::{Hud, HudState};

pub const HUD_HEIGHT: f32 = 40.0;
const HUD_BAR: Color = [0.42, 0.55, 1.0, 1.0];
const HUD_BAR_UNDERGROUND: Color = [0.0, 0.0, 0.0, 1.0];
const BLACK: Color = [0.0, 0.0, 0.0, 1.0];
const LABEL_Y: f32 = 5.0;
const VALUE_Y: f32 = 22.0;
/// Full-screen message images are drawn whole
const SCREEN_REGION: SpriteRegion = SpriteRegion::new(0, 0, 800, 480);

/// Counters while playing, a full-screen message otherwise
pub fn draw_hud(surface: &mut dyn Surface, hud: &Hud, underground: bool) {
    match hud.state {
        HudState::Playing | HudState::DeathAnimation { .. } => draw_counters(surface, hud, underground),
        HudState::TimeUp(_) => draw_message(surface, ImageId::TimeUp, "TIME UP"),
        HudState::GameOver(_) => draw_message(surface, ImageId::GameOver, "GAME OVER"),
    }
}

fn draw_counters(surface: &mut dyn Surface, hud: &Hud, underground: bool) {
    let bar = if underground { HUD_BAR_UNDERGROUND } else { HUD_BAR };
    surface.fill_rect(Aabb::new(0.0, 0.0, VIEWPORT_WIDTH, HUD_HEIGHT), bar);

    surface.fill_text("SCORE", Vec2::new(40.0, LABEL_Y), TextAlign::Left, WHITE);
    let score = hud.score.to_string();
    // Short scores sit under the middle of the label
    let score_x = match score.len() {
        0..=2 => 77.0,
        3 => 60.0,
        _ => 55.0,
    };
    surface.fill_text(&score, Vec2::new(score_x, VALUE_Y), TextAlign::Left, WHITE);

    let columns = [
        ("TIME", hud.time, VIEWPORT_WIDTH * 0.4),
        ("COINS", hud.coins, VIEWPORT_WIDTH * 0.6),
        ("LIVES", hud.lives, VIEWPORT_WIDTH - 80.0),
    ];
    for (label, value, x) in columns {
        surface.fill_text(label, Vec2::new(x, LABEL_Y), TextAlign::Center, WHITE);
        surface.fill_text(&value.to_string(), Vec2::new(x, VALUE_Y), TextAlign::Center, WHITE);
    }
}

fn draw_message(surface: &mut dyn Surface, image: ImageId, fallback: &str) {
    let screen = Aabb::new(0.0, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
    surface.fill_rect(screen, BLACK);
    if surface.image_ready(image) {
        surface.draw_image(image, SCREEN_REGION, screen);
    } else {
        surface.fill_text(
            fallback,
            Vec2::new(VIEWPORT_WIDTH / 2.0, VIEWPORT_HEIGHT / 2.0),
            TextAlign::Center,
            WHITE,
        );
    }
}

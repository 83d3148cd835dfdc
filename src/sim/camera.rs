//! Side-scrolling follow camera
//!
//! The camera only scrolls forward. Vertical motion is damped and ignores
//! small height changes inside a deadzone.

use glam::Vec2;

use super::collision::Aabb;
use crate::settings::CameraConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World-space top-left corner of the viewport
    pub position: Vec2,
    pub viewport: Vec2,
    /// Largest position the level allows
    pub max: Vec2,
    pub config: CameraConfig,
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32, config: CameraConfig) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport: Vec2::new(viewport_width, viewport_height),
            max: Vec2::ZERO,
            config,
        }
    }

    pub fn set_level_boundaries(&mut self, width: f32, height: f32) {
        self.max = Vec2::new((width - self.viewport.x).max(0.0), (height - self.viewport.y).max(0.0));
    }

    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
    }

    /// Follow `target` for one tick
    pub fn update(&mut self, target: &Aabb) {
        let target_x = (target.pos.x - self.config.left_offset)
            .max(self.position.x)
            .clamp(0.0, self.max.x);
        let target_y = (target.pos.y - self.viewport.y / 2.0).clamp(0.0, self.max.y);

        self.position.x += (target_x - self.position.x) * self.config.horizontal_smoothing;
        let dy = target_y - self.position.y;
        if dy.abs() > self.config.vertical_deadzone {
            self.position.y += dy * self.config.vertical_smoothing;
        }
    }

    /// Viewport rectangle in world space
    pub fn view(&self) -> Aabb {
        Aabb::new(self.position.x, self.position.y, self.viewport.x, self.viewport.y)
    }

    /// Draw-time culling only; off-screen entities still update
    pub fn is_visible(&self, bounds: &Aabb) -> bool {
        let view = self.view();
        bounds.right() > view.left()
            && bounds.left() < view.right()
            && bounds.bottom() > view.top()
            && bounds.top() < view.bottom()
    }

    /// Screen position of a world point; the world origin gives the draw
    /// offset for the camera-space pass
    #[inline]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.position
    }
}

//! Collision detection and response for axis-aligned boxes
//!
//! Everything in the level is a box. Overlap is strict (touching edges do not
//! collide) and response pushes the mover out along whichever axis needs the
//! smaller displacement. Fast movers can tunnel through thin obstacles; the
//! resolver does not sweep.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box, origin top-left, +y down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test on both axes
    pub fn intersects(&self, other: &Aabb) -> bool {
        intersects(self, other)
    }

    /// Overlap depth along X and Y (either may be <= 0 when apart)
    pub fn overlap(&self, other: &Aabb) -> Vec2 {
        Vec2::new(
            (self.right() - other.left()).min(other.right() - self.left()),
            (self.bottom() - other.top()).min(other.bottom() - self.top()),
        )
    }
}

/// A moving box: position, size, velocity and the grounded flag the
/// resolver maintains.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
            vel: Vec2::ZERO,
            grounded: false,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Change height while keeping the feet where they are
    pub fn set_height_keep_bottom(&mut self, height: f32) {
        let bottom = self.bottom();
        self.size.y = height;
        self.pos.y = bottom - height;
    }

    /// Apply gravity then integrate position by velocity
    pub fn integrate(&mut self, gravity: f32) {
        self.vel.y += gravity;
        self.pos += self.vel;
    }
}

/// Which side of the obstacle the mover was pushed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Pushed out to the obstacle's left (mover hit a wall moving right)
    Left,
    /// Pushed out to the obstacle's right
    Right,
    /// Landed on top of the obstacle
    Top,
    /// Bumped the obstacle's underside
    Bottom,
}

impl Contact {
    /// Side contacts are the ones walkers turn around on
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Contact::Left | Contact::Right)
    }

    /// Horizontal direction that leads away from the obstacle
    pub fn away_direction(self) -> Option<f32> {
        match self {
            Contact::Left => Some(-1.0),
            Contact::Right => Some(1.0),
            Contact::Top | Contact::Bottom => None,
        }
    }
}

/// Strict AABB overlap: touching edges do not count
#[inline]
pub fn intersects(a: &Aabb, b: &Aabb) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Push `mover` out of `obstacle` along the axis of smaller overlap
///
/// Ties go to the vertical axis. The velocity component on the resolved axis
/// is zeroed; landing on top sets `grounded`. Returns `None` (and leaves the
/// mover untouched) when the boxes do not intersect.
pub fn resolve_axis_separation(mover: &mut Body, obstacle: &Aabb) -> Option<Contact> {
    let m = mover.aabb();
    if !intersects(&m, obstacle) {
        return None;
    }

    let overlap = m.overlap(obstacle);
    let m_center = m.center();
    let o_center = obstacle.center();

    if overlap.x < overlap.y {
        mover.vel.x = 0.0;
        if m_center.x < o_center.x {
            mover.pos.x = obstacle.left() - mover.size.x;
            Some(Contact::Left)
        } else {
            mover.pos.x = obstacle.right();
            Some(Contact::Right)
        }
    } else {
        mover.vel.y = 0.0;
        if m_center.y < o_center.y {
            mover.pos.y = obstacle.top() - mover.size.y;
            mover.grounded = true;
            Some(Contact::Top)
        } else {
            mover.pos.y = obstacle.bottom();
            Some(Contact::Bottom)
        }
    }
}

/// "From above" contact used for stomps: the mover's feet are above the
/// target's vertical midpoint and the mover is descending.
pub fn is_stomp(mover: &Body, target: &Aabb) -> bool {
    mover.bottom() < target.top() + target.size.y / 2.0 && mover.vel.y > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(10.0, 0.0, 10.0, 10.0);
        assert!(!intersects(&a, &b));

        let c = Aabb::new(0.0, 10.0, 10.0, 10.0);
        assert!(!intersects(&a, &c));

        let d = Aabb::new(9.5, 9.5, 10.0, 10.0);
        assert!(intersects(&a, &d));
    }

    #[test]
    fn test_landing_on_top_sets_grounded() {
        let ground = Aabb::new(0.0, 100.0, 200.0, 32.0);
        let mut body = Body::new(50.0, 75.0, 30.0, 30.0);
        body.vel = Vec2::new(3.0, 5.0);

        let contact = resolve_axis_separation(&mut body, &ground);
        assert_eq!(contact, Some(Contact::Top));
        assert_eq!(body.pos.y, 70.0);
        assert_eq!(body.vel.y, 0.0);
        assert_eq!(body.vel.x, 3.0);
        assert!(body.grounded);
    }

    #[test]
    fn test_head_bump_does_not_ground() {
        let block = Aabb::new(0.0, 100.0, 30.0, 30.0);
        let mut body = Body::new(0.0, 125.0, 30.0, 30.0);
        body.vel.y = -6.0;

        let contact = resolve_axis_separation(&mut body, &block);
        assert_eq!(contact, Some(Contact::Bottom));
        assert_eq!(body.pos.y, 130.0);
        assert_eq!(body.vel.y, 0.0);
        assert!(!body.grounded);
    }

    #[test]
    fn test_wall_push_picks_smaller_axis() {
        let wall = Aabb::new(100.0, 0.0, 64.0, 130.0);
        let mut body = Body::new(80.0, 50.0, 30.0, 30.0);
        body.vel.x = 3.0;

        let contact = resolve_axis_separation(&mut body, &wall);
        assert_eq!(contact, Some(Contact::Left));
        assert_eq!(body.pos.x, 70.0);
        assert_eq!(body.vel.x, 0.0);
        assert_eq!(body.pos.y, 50.0);
    }

    #[test]
    fn test_tie_resolves_vertically() {
        let obstacle = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let mut body = Body::new(-5.0, -5.0, 10.0, 10.0);
        assert_eq!(resolve_axis_separation(&mut body, &obstacle), Some(Contact::Top));
    }

    #[test]
    fn test_no_overlap_is_noop() {
        let obstacle = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let mut body = Body::new(20.0, 20.0, 10.0, 10.0);
        body.vel = Vec2::new(1.0, 1.0);
        let before = body;
        assert_eq!(resolve_axis_separation(&mut body, &obstacle), None);
        assert_eq!(body, before);
    }

    #[test]
    fn test_stomp_requires_descent_above_midpoint() {
        let enemy = Aabb::new(200.0, 200.0, 32.0, 32.0);
        let mut player = Body::new(195.0, 180.0, 30.0, 30.0);
        player.vel.y = 5.0;
        assert!(is_stomp(&player, &enemy));

        player.vel.y = -1.0;
        assert!(!is_stomp(&player, &enemy));

        player.vel.y = 5.0;
        player.pos.y = 190.0; // bottom 220, below midpoint 216
        assert!(!is_stomp(&player, &enemy));
    }

    // Integer-valued coordinates keep the arithmetic exact, so the strict
    // overlap test sees exactly-touching boxes after a push.
    fn boxes() -> impl Strategy<Value = (Body, Aabb)> {
        (-100i32..100, -100i32..100, 1i32..60, 1i32..60, 1i32..60, 1i32..60).prop_flat_map(
            |(ox, oy, ow, oh, mw, mh)| {
                // Offsets chosen so the mover always overlaps the obstacle
                (-(mw - 1)..ow, -(mh - 1)..oh).prop_map(move |(dx, dy)| {
                    (
                        Body::new((ox + dx) as f32, (oy + dy) as f32, mw as f32, mh as f32),
                        Aabb::new(ox as f32, oy as f32, ow as f32, oh as f32),
                    )
                })
            },
        )
    }

    proptest! {
        #[test]
        fn prop_resolution_clears_resolved_axis_only((mover, obstacle) in boxes()) {
            let before = mover.aabb().overlap(&obstacle);
            let mut body = mover;
            let contact = resolve_axis_separation(&mut body, &obstacle);
            let after = body.aabb().overlap(&obstacle);

            match contact {
                Some(c) if c.is_horizontal() => {
                    prop_assert_eq!(after.x, 0.0);
                    prop_assert_eq!(after.y, before.y);
                }
                Some(_) => {
                    prop_assert_eq!(after.y, 0.0);
                    prop_assert_eq!(after.x, before.x);
                }
                None => prop_assert!(false, "overlapping boxes must resolve"),
            }
            prop_assert!(!intersects(&body.aabb(), &obstacle));
        }

        #[test]
        fn prop_resolution_is_idempotent((mover, obstacle) in boxes()) {
            let mut body = mover;
            resolve_axis_separation(&mut body, &obstacle);
            let once = body;
            prop_assert_eq!(resolve_axis_separation(&mut body, &obstacle), None);
            prop_assert_eq!(body, once);
        }
    }
}

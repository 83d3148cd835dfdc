//! Static and moving terrain: ground segments, pipes, moving platforms

use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::entity::Siblings;

/// A run of solid floor. Passive: movers resolve against it themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    pub aabb: Aabb,
}

impl Ground {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            aabb: Aabb::new(x, y, width, height),
        }
    }
}

/// Pipe stem height class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipeSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl PipeSize {
    /// (stem width, stem height)
    pub fn stem(self) -> (f32, f32) {
        match self {
            PipeSize::Small => (54.0, 32.0),
            PipeSize::Medium => (54.0, 64.0),
            PipeSize::Large => (56.0, 100.0),
        }
    }
}

pub const PIPE_HEAD_WIDTH: f32 = 64.0;
pub const PIPE_HEAD_HEIGHT: f32 = 30.0;

/// A pipe: a head cap over a narrower stem, solid as one box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipe {
    pub aabb: Aabb,
    pub size: PipeSize,
}

impl Pipe {
    pub fn new(x: f32, y: f32, size: PipeSize) -> Self {
        let (_, stem_h) = size.stem();
        Self {
            aabb: Aabb::new(x, y, PIPE_HEAD_WIDTH, stem_h + PIPE_HEAD_HEIGHT),
            size,
        }
    }

    /// Head cap box (drawn from the sheet's head region)
    pub fn head(&self) -> Aabb {
        Aabb::new(self.aabb.pos.x, self.aabb.pos.y, PIPE_HEAD_WIDTH, PIPE_HEAD_HEIGHT)
    }

    /// Stem box, centered under the head
    pub fn stem(&self) -> Aabb {
        let (stem_w, stem_h) = self.size.stem();
        Aabb::new(
            self.aabb.pos.x + (PIPE_HEAD_WIDTH - stem_w) / 2.0,
            self.aabb.pos.y + PIPE_HEAD_HEIGHT,
            stem_w,
            stem_h,
        )
    }

    pub fn update(&mut self, siblings: &mut Siblings<'_>) -> bool {
        siblings.push_movers_out_of(&self.aabb);
        false
    }
}

pub const PLATFORM_WIDTH: f32 = 64.0;
pub const PLATFORM_HEIGHT: f32 = 16.0;
pub const PLATFORM_SPEED: f32 = 1.0;
/// How far a rider's feet may be from the deck and still be carried
pub const CARRY_TOLERANCE: f32 = 10.0;

/// A platform oscillating vertically between `top` and `bottom`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingPlatform {
    pub aabb: Aabb,
    pub top: f32,
    pub bottom: f32,
    pub speed: f32,
    /// +1 moving down, -1 moving up
    pub dir: f32,
}

impl MovingPlatform {
    pub fn new(x: f32, y: f32, top: f32, bottom: f32) -> Self {
        let (top, bottom) = if top <= bottom { (top, bottom) } else { (bottom, top) };
        Self {
            aabb: Aabb::new(x, y.clamp(top, bottom), PLATFORM_WIDTH, PLATFORM_HEIGHT),
            top,
            bottom,
            speed: PLATFORM_SPEED,
            dir: -1.0,
        }
    }

    pub fn update(&mut self, siblings: &mut Siblings<'_>) -> bool {
        self.aabb.pos.y += self.speed * self.dir;
        if self.aabb.pos.y <= self.top {
            self.aabb.pos.y = self.top;
            self.dir = 1.0;
        } else if self.aabb.pos.y >= self.bottom {
            self.aabb.pos.y = self.bottom;
            self.dir = -1.0;
        }

        let deck = self.aabb;
        for sibling in siblings.iter_mut() {
            let Some(body) = sibling.pushable_body_mut() else { continue };
            let rider = body.aabb();
            let over_deck = rider.right() > deck.left() && rider.left() < deck.right();
            if over_deck && body.vel.y >= 0.0 && (rider.bottom() - deck.top()).abs() <= CARRY_TOLERANCE {
                body.pos.y = deck.top() - body.size.y;
                body.vel.y = 0.0;
                body.grounded = true;
            } else {
                sibling.push_out_of(&deck);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Body;
    use crate::sim::enemies::Walker;
    use crate::sim::entity::{Entity, EntityKind};

    fn walker_at(x: f32, y: f32) -> Entity {
        let mut walker = Walker::new(x, y);
        walker.body = Body::new(x, y, 32.0, 32.0);
        Entity {
            id: 1,
            kind: EntityKind::Walker(walker),
        }
    }

    #[test]
    fn test_pipe_dimensions() {
        let pipe = Pipe::new(100.0, 300.0, PipeSize::Medium);
        assert_eq!(pipe.aabb, Aabb::new(100.0, 300.0, 64.0, 94.0));
        assert_eq!(pipe.stem(), Aabb::new(105.0, 330.0, 54.0, 64.0));
        assert_eq!(Pipe::new(0.0, 0.0, PipeSize::Large).aabb.size.y, 130.0);
    }

    #[test]
    fn test_pipe_turns_walker_around() {
        let mut pipe = Pipe::new(100.0, 300.0, PipeSize::Small);
        let mut others = vec![walker_at(80.0, 320.0)];
        if let EntityKind::Walker(w) = &mut others[0].kind {
            w.dir = 1.0;
        }
        pipe.update(&mut Siblings::new(&mut others, &mut []));
        let EntityKind::Walker(w) = &others[0].kind else { unreachable!() };
        assert_eq!(w.body.pos.x, 68.0);
        assert_eq!(w.dir, -1.0);
    }

    #[test]
    fn test_platform_oscillates_between_bounds() {
        let mut platform = MovingPlatform::new(0.0, 102.0, 100.0, 104.0);
        let mut ys = Vec::new();
        for _ in 0..8 {
            platform.update(&mut Siblings::new(&mut [], &mut []));
            ys.push(platform.aabb.pos.y);
        }
        assert_eq!(ys, vec![101.0, 100.0, 101.0, 102.0, 103.0, 104.0, 103.0, 102.0]);
    }

    #[test]
    fn test_platform_carries_rider() {
        let mut platform = MovingPlatform::new(0.0, 200.0, 100.0, 300.0);
        // Rider settled 0.8 into the deck after its own gravity step
        let mut others = vec![walker_at(10.0, 168.8)];
        platform.update(&mut Siblings::new(&mut others, &mut []));
        let EntityKind::Walker(w) = &others[0].kind else { unreachable!() };
        assert_eq!(w.body.bottom(), 199.0);
        assert!(w.body.grounded);
        assert_eq!(w.body.vel.y, 0.0);
    }
}

//! Spatial entities
//!
//! Player, bullets, enemies and explosions all share one shape: a box with a
//! position, a category, an optional motion and an optional time-to-live.

use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable handle to an entity inside one [`World`](super::World)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Collision categories as bits, for compatibility masks
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CategoryMask: u8 {
        const PLAYER = 1 << 0;
        const BULLET = 1 << 1;
        const ENEMY = 1 << 2;
        const EXPLOSION = 1 << 3;
    }
}

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Player,
    Bullet,
    Enemy,
    Explosion,
}

impl Category {
    /// This category's bit
    pub fn bit(self) -> CategoryMask {
        match self {
            Category::Player => CategoryMask::PLAYER,
            Category::Bullet => CategoryMask::BULLET,
            Category::Enemy => CategoryMask::ENEMY,
            Category::Explosion => CategoryMask::EXPLOSION,
        }
    }

    /// Categories this one reports contacts with
    pub fn contact_mask(self) -> CategoryMask {
        match self {
            Category::Player => CategoryMask::ENEMY,
            Category::Bullet => CategoryMask::ENEMY,
            Category::Enemy => CategoryMask::PLAYER | CategoryMask::BULLET,
            Category::Explosion => CategoryMask::empty(),
        }
    }

    /// Whether a pair of categories is ever tested for contact
    pub fn can_contact(self, other: Category) -> bool {
        self.contact_mask().contains(other.bit()) && other.contact_mask().contains(self.bit())
    }

    /// Ordering used to canonicalize contact pairs (Player < Bullet < Enemy)
    pub fn rank(self) -> u8 {
        self.bit().bits()
    }
}

/// How an entity moves each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Does not move on its own
    Static,
    /// Travels from `from` to `to` over `duration` seconds, then stops
    Linear {
        from: Vec2,
        to: Vec2,
        duration: f32,
        elapsed: f32,
    },
    /// Constant velocity (units per second)
    Velocity(Vec2),
}

impl Motion {
    pub fn linear(from: Vec2, to: Vec2, duration: f32) -> Self {
        Motion::Linear {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Whether a linear path has reached its end
    pub fn is_finished(&self) -> bool {
        match *self {
            Motion::Linear {
                duration, elapsed, ..
            } => elapsed >= duration,
            _ => false,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap: boxes that only share an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// A simulated entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub category: Category,
    /// Center position
    pub pos: Vec2,
    pub size: Vec2,
    /// Visual heading in radians (does not affect the bounding box)
    pub rotation: f32,
    pub alive: bool,
    /// Seconds left before the entity expires
    pub ttl: Option<f32>,
    pub motion: Motion,
}

impl Entity {
    pub fn new(id: EntityId, category: Category, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            category,
            pos,
            size,
            rotation: 0.0,
            alive: true,
            ttl: None,
            motion: Motion::Static,
        }
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_ttl(mut self, ttl: f32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    /// Advance motion and TTL by `dt`.
    ///
    /// Returns true once the entity has run out: its linear path is complete
    /// or its TTL has elapsed. The caller decides what running out means for
    /// each category.
    pub fn advance(&mut self, dt: f32) -> bool {
        match &mut self.motion {
            Motion::Static => {}
            Motion::Linear {
                from,
                to,
                duration,
                elapsed,
            } => {
                *elapsed = (*elapsed + dt).min(*duration);
                let t = if *duration > 0.0 {
                    *elapsed / *duration
                } else {
                    1.0
                };
                self.pos = from.lerp(*to, t);
            }
            Motion::Velocity(vel) => {
                self.pos += *vel * dt;
            }
        }

        let ttl_elapsed = match &mut self.ttl {
            Some(ttl) => {
                *ttl -= dt;
                *ttl <= 0.0
            }
            None => false,
        };

        ttl_elapsed || self.motion.is_finished()
    }

    /// Shift the entity and any path it is following
    pub fn translate(&mut self, offset: Vec2) {
        self.pos += offset;
        if let Motion::Linear { from, to, .. } = &mut self.motion {
            *from += offset;
            *to += offset;
        }
    }
}

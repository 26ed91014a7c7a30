//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod entity;
pub mod level;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{Contact, find_contacts};
pub use entity::{Aabb, Category, CategoryMask, Entity, EntityId, Motion};
pub use level::{LevelProgression, LevelTable};
pub use spawn::SpawnDirector;
pub use state::{Command, GameEvent, GameMode, GameState};
pub use tick::{Simulation, TickInput};
pub use world::{Advance, PlayArea, World};

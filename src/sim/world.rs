//! The simulated world
//!
//! Owns every entity in an id-keyed table, the seeded RNG and the play area.
//! Ids are allocated from a counter and never reused within one world.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Category, Entity, EntityId, Motion};
use crate::consts::*;
use crate::settings::Settings;
use crate::{heading, play_area_margin};

/// Horizontally centered band of the viewport where gameplay happens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl PlayArea {
    pub fn for_viewport(viewport: Vec2) -> Self {
        let margin = play_area_margin(viewport);
        Self {
            min_x: margin,
            max_x: viewport.x - margin,
            min_y: 0.0,
            max_y: viewport.y,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Clamp a center x so a box of `half_width` stays inside.
    ///
    /// A box wider than the area is pinned to its left edge.
    pub fn clamp_x(&self, x: f32, half_width: f32) -> f32 {
        let lo = self.min_x + half_width;
        let hi = (self.max_x - half_width).max(lo);
        x.max(lo).min(hi)
    }

    /// Whether a y coordinate is on screen (bottom inclusive, top exclusive)
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.min_y && y < self.max_y
    }
}

/// What happened to entities during one advance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advance {
    /// Entities whose position changed, with the new position
    pub moved: Vec<(EntityId, Vec2)>,
    /// Entities that ran out this tick and are no longer alive
    pub expired: Vec<(EntityId, Category)>,
}

/// Owner of all simulated entities
#[derive(Debug, Clone)]
pub struct World {
    settings: Settings,
    play_area: PlayArea,
    entities: BTreeMap<EntityId, Entity>,
    player: EntityId,
    rng: Pcg32,
    next_id: u32,
}

impl World {
    /// Create a world with the player waiting below the screen
    pub fn new(settings: &Settings) -> Self {
        let mut world = Self {
            settings: settings.clone(),
            play_area: PlayArea::for_viewport(settings.viewport),
            entities: BTreeMap::new(),
            player: EntityId(0),
            rng: Pcg32::seed_from_u64(settings.seed),
            next_id: 1,
        };

        let id = world.next_entity_id();
        let start = Vec2::new(settings.viewport.x / 2.0, -settings.player_size.y);
        world.insert(Entity::new(id, Category::Player, start, settings.player_size));
        world.player = id;

        world
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.insert(id, entity);
        id
    }

    pub fn viewport(&self) -> Vec2 {
        self.settings.viewport
    }

    pub fn play_area(&self) -> PlayArea {
        self.play_area
    }

    pub fn player_id(&self) -> EntityId {
        self.player
    }

    /// The player, if it is still part of the world
    pub fn player(&self) -> Option<&Entity> {
        self.entities.get(&self.player).filter(|p| p.alive)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// All entities in id order, dead ones included until the next sweep
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Alive entities of one category
    pub fn iter_category(&self, category: Category) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(move |e| e.alive && e.category == category)
    }

    pub fn count(&self, category: Category) -> usize {
        self.iter_category(category).count()
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.get(&id).is_some_and(|e| e.alive)
    }

    /// Seed for a successor world, drawn from this world's RNG
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }

    fn random_play_x(&mut self) -> f32 {
        let area = self.play_area;
        if area.width() > 0.0 {
            self.rng.random_range(area.min_x..area.max_x)
        } else {
            area.min_x
        }
    }

    /// Spawn an enemy above the top edge heading for a random point below
    /// the bottom edge
    pub fn spawn_enemy(&mut self) -> EntityId {
        let height = self.settings.viewport.y;
        let start = Vec2::new(self.random_play_x(), height * ENEMY_SPAWN_HEIGHT_FACTOR);
        let end = Vec2::new(self.random_play_x(), height * ENEMY_EXIT_HEIGHT_FACTOR);
        self.spawn_enemy_between(start, end)
    }

    /// Spawn an enemy flying a fixed path. Its heading never changes.
    pub fn spawn_enemy_between(&mut self, start: Vec2, end: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let enemy = Entity::new(id, Category::Enemy, start, self.settings.enemy_size)
            .with_motion(Motion::linear(start, end, self.settings.enemy_flight_secs))
            .with_rotation(heading(start, end));
        self.insert(enemy)
    }

    /// Fire a bullet from the player's position straight past the top edge.
    ///
    /// Returns `None` when there is no live player to fire from.
    pub fn spawn_bullet(&mut self) -> Option<EntityId> {
        let origin = self.player()?.pos;
        let id = self.next_entity_id();
        let size = self.settings.bullet_size;
        let target = Vec2::new(origin.x, self.settings.viewport.y + size.y);
        let bullet = Entity::new(id, Category::Bullet, origin, size)
            .with_motion(Motion::linear(origin, target, self.settings.bullet_flight_secs))
            .with_rotation(std::f32::consts::FRAC_PI_2);
        Some(self.insert(bullet))
    }

    /// Place a short-lived explosion
    pub fn spawn_explosion(&mut self, at: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let explosion = Entity::new(id, Category::Explosion, at, self.settings.explosion_size)
            .with_ttl(self.settings.explosion_ttl_secs);
        self.insert(explosion)
    }

    /// Start the player's glide from below the screen to its resting height
    pub fn begin_player_entry(&mut self) {
        let rest_y = self.settings.viewport.y * PLAYER_REST_FRACTION;
        let duration = self.settings.player_entry_secs;
        if let Some(player) = self.entities.get_mut(&self.player) {
            let target = Vec2::new(player.pos.x, rest_y);
            player.motion = Motion::linear(player.pos, target, duration);
        }
    }

    /// Shift the player horizontally, clamped to the play area.
    ///
    /// Returns the new position if the player moved.
    pub fn move_player_by(&mut self, dx: f32) -> Option<Vec2> {
        let area = self.play_area;
        let player = self.entities.get_mut(&self.player).filter(|p| p.alive)?;
        let x = area.clamp_x(player.pos.x + dx, player.size.x / 2.0);
        let offset = x - player.pos.x;
        if offset == 0.0 {
            return None;
        }
        player.translate(Vec2::new(offset, 0.0));
        Some(player.pos)
    }

    /// Mark an entity dead. Already-dead or missing ids are a no-op.
    ///
    /// Returns true only if this call killed it.
    pub fn kill(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) if entity.alive => {
                entity.alive = false;
                true
            }
            _ => false,
        }
    }

    /// Remove an entity immediately, returning it if it was present
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Drop every dead entity, returning their ids in id order
    pub fn sweep(&mut self) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| !e.alive)
            .map(|e| e.id)
            .collect();
        for id in &dead {
            self.entities.remove(id);
        }
        dead
    }

    /// Advance every live entity by `dt`
    pub fn tick(&mut self, dt: f32) -> Advance {
        self.advance_where(dt, |_| true)
    }

    /// Advance only entities with a TTL (explosions); everything else stays
    /// frozen where it is
    pub fn tick_transients(&mut self, dt: f32) -> Advance {
        self.advance_where(dt, |e| e.ttl.is_some())
    }

    fn advance_where(&mut self, dt: f32, filter: impl Fn(&Entity) -> bool) -> Advance {
        let mut advance = Advance::default();

        for entity in self.entities.values_mut() {
            if !entity.alive || !filter(entity) {
                continue;
            }

            let before = entity.pos;
            let ran_out = entity.advance(dt);
            if entity.pos != before {
                advance.moved.push((entity.id, entity.pos));
            }

            if ran_out {
                match entity.category {
                    // Arriving at the rest position just ends the glide
                    Category::Player => entity.motion = Motion::Static,
                    Category::Bullet | Category::Enemy | Category::Explosion => {
                        entity.alive = false;
                        advance.expired.push((entity.id, entity.category));
                    }
                }
            }
        }

        advance
    }
}

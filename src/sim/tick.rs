//! Simulation clock
//!
//! One tick runs in a fixed order: buffered commands, world motion, spawn
//! schedule, contact detection, contact resolution, then removal of dead
//! entities. Everything a collaborator needs to know comes out as events.

use glam::Vec2;

use super::collision::{Contact, find_contacts};
use super::entity::{Category, Entity, EntityId};
use super::level::LevelProgression;
use super::spawn::SpawnDirector;
use super::state::{Command, GameEvent, GameMode, GameState};
use super::world::{Advance, World};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Commands buffered for the next tick.
///
/// At most one of each is kept: repeated taps collapse into a single flag
/// and drags add up into one net distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub start: bool,
    pub fire: bool,
    pub restart: bool,
    /// Net horizontal drag since the last tick
    pub drag_dx: f32,
}

impl TickInput {
    pub fn push(&mut self, command: Command) {
        match command {
            Command::Start => self.start = true,
            Command::Fire => self.fire = true,
            Command::Restart => self.restart = true,
            Command::Drag(dx) => self.drag_dx += dx,
        }
    }
}

/// The whole simulation: world, state machine and spawn schedule
#[derive(Debug, Clone)]
pub struct Simulation {
    settings: Settings,
    progression: LevelProgression,
    world: World,
    state: GameState,
    spawner: SpawnDirector,
    pending: TickInput,
    events: Vec<GameEvent>,
    time_ticks: u64,
}

impl Simulation {
    /// Create a simulation in PreGame.
    ///
    /// Settings are validated first. The player's spawn event is delivered
    /// with the first tick.
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let world = World::new(&settings);
        let state = GameState::new(settings.starting_lives);
        let progression = settings.progression();
        let mut sim = Self {
            settings,
            progression,
            world,
            state,
            spawner: SpawnDirector::new(),
            pending: TickInput::default(),
            events: Vec::new(),
            time_ticks: 0,
        };
        sim.announce_player();
        Ok(sim)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn lives(&self) -> i32 {
        self.state.lives
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    /// Ticks advanced since creation (restarts included)
    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Seconds between spawns right now, if spawning is active
    pub fn spawn_interval(&self) -> Option<f32> {
        self.spawner.interval()
    }

    /// Alive entities in id order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.world.entities().filter(|e| e.alive)
    }

    /// Queue a command for the next tick
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Spawn an enemy on a chosen path (scripted waves, tests)
    pub fn spawn_enemy_between(&mut self, start: Vec2, end: Vec2) -> EntityId {
        let id = self.world.spawn_enemy_between(start, end);
        self.announce_spawn(id);
        id
    }

    /// Advance by `dt` seconds and return the events produced
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let input = std::mem::take(&mut self.pending);
        self.step(&input, dt);
        std::mem::take(&mut self.events)
    }

    fn step(&mut self, input: &TickInput, dt: f32) {
        self.time_ticks += 1;
        self.apply_input(input);

        match self.state.mode {
            GameMode::PreGame => {
                let advance = self.world.tick(dt);
                self.apply_advance(advance);
            }

            GameMode::InGame => {
                let advance = self.world.tick(dt);
                let escaped: Vec<EntityId> = advance
                    .expired
                    .iter()
                    .filter(|(_, category)| *category == Category::Enemy)
                    .map(|(id, _)| *id)
                    .collect();
                self.apply_advance(advance);

                for _ in 0..self.spawner.tick(dt) {
                    let id = self.world.spawn_enemy();
                    self.announce_spawn(id);
                }

                let contacts = find_contacts(self.world.entities());
                for contact in contacts {
                    self.resolve_contact(contact);
                }

                if self.settings.escaped_enemy_costs_life {
                    for id in escaped {
                        if !self.state.is_playing() {
                            break;
                        }
                        log::debug!("Enemy {id} escaped");
                        self.lose_life();
                    }
                }
            }

            GameMode::PostGame => {
                // Ships freeze where they were; explosions finish playing out
                let advance = self.world.tick_transients(dt);
                self.apply_advance(advance);

                self.state.post_game_secs += dt;
                if !self.state.results_ready
                    && self.state.post_game_secs >= self.settings.game_over_delay_secs
                {
                    self.state.results_ready = true;
                    let final_score = self.state.final_score.unwrap_or(self.state.score);
                    self.events.push(GameEvent::ResultsReady { final_score });
                }
            }
        }

        for id in self.world.sweep() {
            self.events.push(GameEvent::EntityRemoved { id });
        }
    }

    fn apply_input(&mut self, input: &TickInput) {
        if input.restart {
            self.restart();
        }

        if input.start {
            if self.state.mode == GameMode::PreGame {
                self.start_game();
            } else {
                log::debug!("Ignoring start in {:?}", self.state.mode);
            }
        }

        if !input.drag_dx.is_finite() {
            log::warn!("Ignoring non-finite drag {}", input.drag_dx);
        } else if input.drag_dx != 0.0 && self.state.is_playing() {
            if let Some(position) = self.world.move_player_by(input.drag_dx) {
                let id = self.world.player_id();
                self.events.push(GameEvent::EntityMoved { id, position });
            }
        }

        if input.fire {
            if self.state.is_playing() {
                if let Some(id) = self.world.spawn_bullet() {
                    self.announce_spawn(id);
                }
            } else {
                log::debug!("Ignoring fire in {:?}", self.state.mode);
            }
        }
    }

    fn start_game(&mut self) {
        self.state.begin_run(self.settings.starting_lives);
        self.world.begin_player_entry();
        self.spawner.start_level(self.state.level, &self.progression);
        log::info!("Game started (lives: {})", self.state.lives);

        self.events.push(GameEvent::ModeChanged {
            mode: GameMode::InGame,
        });
        self.events.push(GameEvent::ScoreChanged {
            value: self.state.score,
        });
        self.events.push(GameEvent::LivesChanged {
            value: self.state.lives,
        });
        self.events.push(GameEvent::LevelChanged {
            value: self.state.level,
        });
    }

    /// Discard the world after a finished run and start over in PreGame
    fn restart(&mut self) {
        if self.state.mode != GameMode::PostGame {
            log::debug!("Ignoring restart in {:?}", self.state.mode);
            return;
        }

        for entity in self.world.entities() {
            self.events.push(GameEvent::EntityRemoved { id: entity.id });
        }

        let seed = self.world.next_seed();
        let settings = Settings {
            seed,
            ..self.settings.clone()
        };
        self.world = World::new(&settings);
        self.state = GameState::new(self.settings.starting_lives);
        self.spawner = SpawnDirector::new();
        log::info!("Restarted with seed {seed}");

        self.events.push(GameEvent::ModeChanged {
            mode: GameMode::PreGame,
        });
        self.events.push(GameEvent::ScoreChanged { value: 0 });
        self.events.push(GameEvent::LivesChanged {
            value: self.state.lives,
        });
        self.events.push(GameEvent::LevelChanged {
            value: self.state.level,
        });
        self.announce_player();
    }

    fn apply_advance(&mut self, advance: Advance) {
        for (id, position) in advance.moved {
            self.events.push(GameEvent::EntityMoved { id, position });
        }
    }

    fn resolve_contact(&mut self, contact: Contact) {
        if !self.state.is_playing() {
            return;
        }
        match contact.kinds() {
            (Category::Player, Category::Enemy) => self.player_hit(contact.second),
            (Category::Bullet, Category::Enemy) => self.enemy_shot(contact.first, contact.second),
            other => log::debug!("Unhandled contact kinds {other:?}"),
        }
    }

    fn player_hit(&mut self, enemy: EntityId) {
        // Either side may already be gone from an earlier contact this tick
        if !self.world.is_alive(self.world.player_id()) {
            return;
        }
        let Some(at) = self.alive_position(enemy) else {
            return;
        };

        self.world.kill(enemy);
        self.explode(at);
        self.lose_life();
    }

    fn enemy_shot(&mut self, bullet: EntityId, enemy: EntityId) {
        if !self.world.is_alive(bullet) {
            return;
        }
        let Some(at) = self.alive_position(enemy) else {
            return;
        };
        // Enemies off screen cannot be scored
        if !self.world.play_area().contains_y(at.y) {
            return;
        }

        self.world.kill(bullet);
        self.world.kill(enemy);
        self.explode(at);
        self.add_score(1);
    }

    fn alive_position(&self, id: EntityId) -> Option<Vec2> {
        self.world.get(id).filter(|e| e.alive).map(|e| e.pos)
    }

    fn explode(&mut self, at: Vec2) {
        let id = self.world.spawn_explosion(at);
        self.announce_spawn(id);
        self.events.push(GameEvent::ExplosionSpawned { position: at });
    }

    fn lose_life(&mut self) {
        let out_of_lives = self.state.lose_life();
        self.events.push(GameEvent::LivesChanged {
            value: self.state.lives,
        });
        if out_of_lives {
            self.game_over();
        }
    }

    fn add_score(&mut self, points: u64) {
        let old = self.state.score;
        self.state.score += points;
        self.events.push(GameEvent::ScoreChanged {
            value: self.state.score,
        });

        let gained = self.progression.levels_gained(old, self.state.score);
        if gained > 0 {
            self.state.level += gained;
            log::info!(
                "Level {} reached at score {}",
                self.state.level,
                self.state.score
            );
            self.spawner.start_level(self.state.level, &self.progression);
            self.events.push(GameEvent::LevelChanged {
                value: self.state.level,
            });
        }
    }

    fn game_over(&mut self) {
        if self.state.mode == GameMode::PostGame {
            return;
        }
        let final_score = self.state.end_run();
        self.spawner.suspend();
        self.world.kill(self.world.player_id());
        log::info!("Game over (score: {final_score})");

        self.events.push(GameEvent::GameOver { final_score });
        self.events.push(GameEvent::ModeChanged {
            mode: GameMode::PostGame,
        });
    }

    fn announce_player(&mut self) {
        let id = self.world.player_id();
        self.announce_spawn(id);
    }

    fn announce_spawn(&mut self, id: EntityId) {
        if let Some(entity) = self.world.get(id) {
            self.events.push(GameEvent::EntitySpawned {
                id,
                category: entity.category,
                position: entity.pos,
                rotation: entity.rotation,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::level::LevelTable;

    fn started() -> Simulation {
        let mut sim = Simulation::new(Settings::with_seed(12345)).expect("valid settings");
        sim.push(Command::Start);
        sim.tick(SIM_DT);
        // Let the player finish gliding in
        for _ in 0..40 {
            sim.tick(SIM_DT);
        }
        sim
    }

    /// Settings whose spawn schedule never fires within a test
    fn quiet(seed: u64) -> Settings {
        Settings {
            level_table: LevelTable::new(vec![1000.0]),
            ..Settings::with_seed(seed)
        }
    }

    fn player_pos(sim: &Simulation) -> Vec2 {
        sim.world().player().unwrap().pos
    }

    /// An enemy parked on top of the player for one tick
    fn ram_player(sim: &mut Simulation) -> EntityId {
        let at = player_pos(sim);
        sim.spawn_enemy_between(at, at - Vec2::new(0.0, 1.0))
    }

    #[test]
    fn test_tick_pregame_to_ingame() {
        let mut sim = Simulation::new(Settings::with_seed(1)).expect("valid settings");
        assert_eq!(sim.mode(), GameMode::PreGame);

        let events = sim.tick(SIM_DT);
        assert_eq!(sim.mode(), GameMode::PreGame);
        assert!(matches!(
            events[0],
            GameEvent::EntitySpawned {
                category: Category::Player,
                ..
            }
        ));

        sim.push(Command::Start);
        let events = sim.tick(SIM_DT);
        assert_eq!(sim.mode(), GameMode::InGame);
        assert!(events.contains(&GameEvent::ModeChanged {
            mode: GameMode::InGame
        }));
        assert!(events.contains(&GameEvent::LivesChanged { value: 10 }));
        assert_eq!(sim.spawn_interval(), Some(1.2));
    }

    #[test]
    fn test_fire_ignored_outside_ingame() {
        let mut sim = Simulation::new(Settings::with_seed(1)).expect("valid settings");
        sim.push(Command::Fire);
        sim.push(Command::Drag(50.0));
        sim.tick(SIM_DT);
        assert_eq!(sim.world().count(Category::Bullet), 0);
        assert_eq!(player_pos(&sim).x, VIEWPORT_WIDTH / 2.0);
    }

    #[test]
    fn test_fire_spawns_one_bullet_per_tick() {
        let mut sim = started();
        sim.push(Command::Fire);
        sim.push(Command::Fire);
        sim.tick(SIM_DT);
        assert_eq!(sim.world().count(Category::Bullet), 1);
    }

    #[test]
    fn test_drags_accumulate() {
        let mut sim = started();
        let x = player_pos(&sim).x;
        sim.push(Command::Drag(30.0));
        sim.push(Command::Drag(-10.0));
        sim.tick(SIM_DT);
        assert!((player_pos(&sim).x - (x + 20.0)).abs() < 1e-3);
    }

    #[test]
    fn test_no_spawns_before_start() {
        let mut sim = Simulation::new(Settings::with_seed(1)).expect("valid settings");
        for _ in 0..600 {
            sim.tick(SIM_DT);
        }
        assert_eq!(sim.world().count(Category::Enemy), 0);
    }

    #[test]
    fn test_spawns_follow_level_interval() {
        let mut sim = Simulation::new(Settings::with_seed(1)).expect("valid settings");
        sim.push(Command::Start);
        let mut spawned = 0;
        // 3 seconds at level 1 (1.2s interval) -> 2 enemies
        for _ in 0..180 {
            spawned += sim
                .tick(SIM_DT)
                .iter()
                .filter(|e| {
                    matches!(
                        e,
                        GameEvent::EntitySpawned {
                            category: Category::Enemy,
                            ..
                        }
                    )
                })
                .count();
        }
        assert_eq!(spawned, 2);
    }

    #[test]
    fn test_player_contact_costs_life_and_explodes() {
        let mut sim = started();
        let enemy = ram_player(&mut sim);
        let events = sim.tick(SIM_DT);

        assert_eq!(sim.lives(), 9);
        assert!(events.contains(&GameEvent::LivesChanged { value: 9 }));
        assert!(events.contains(&GameEvent::EntityRemoved { id: enemy }));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::ExplosionSpawned { .. }))
        );
        assert!(sim.world().get(enemy).is_none());
        assert_eq!(sim.world().count(Category::Explosion), 1);
    }

    #[test]
    fn test_escaped_enemy_rule() {
        let settings = Settings {
            escaped_enemy_costs_life: true,
            ..quiet(3)
        };
        let mut sim = Simulation::new(settings).expect("valid settings");
        sim.push(Command::Start);
        sim.tick(SIM_DT);

        // Far from the player, ends below the screen
        let area = sim.world().play_area();
        let x = area.min_x + 10.0;
        sim.spawn_enemy_between(Vec2::new(x, 0.0), Vec2::new(x, -100.0));
        for _ in 0..(ENEMY_FLIGHT_SECS / SIM_DT) as usize + 2 {
            sim.tick(SIM_DT);
        }
        assert_eq!(sim.lives(), 9);
    }

    #[test]
    fn test_escaped_enemy_free_by_default() {
        let mut sim = Simulation::new(quiet(4)).expect("valid settings");
        sim.push(Command::Start);
        sim.tick(SIM_DT);
        let x = sim.world().play_area().min_x + 10.0;
        sim.spawn_enemy_between(Vec2::new(x, 0.0), Vec2::new(x, -100.0));
        for _ in 0..(ENEMY_FLIGHT_SECS / SIM_DT) as usize + 2 {
            sim.tick(SIM_DT);
        }
        assert_eq!(sim.lives(), 10);
    }

    #[test]
    fn test_game_over_freezes_and_reports_results() {
        let settings = Settings {
            starting_lives: 1,
            ..quiet(5)
        };
        let mut sim = Simulation::new(settings).expect("valid settings");
        sim.push(Command::Start);
        for _ in 0..40 {
            sim.tick(SIM_DT);
        }

        let far = Vec2::new(sim.world().play_area().min_x + 90.0, 1500.0);
        let bystander = sim.spawn_enemy_between(far, far - Vec2::new(0.0, 1000.0));
        ram_player(&mut sim);
        let events = sim.tick(SIM_DT);

        assert_eq!(sim.mode(), GameMode::PostGame);
        assert!(events.contains(&GameEvent::GameOver { final_score: 0 }));
        assert!(sim.world().player().is_none());
        assert_eq!(sim.spawn_interval(), None);

        let frozen = sim.world().get(bystander).unwrap().pos;
        let mut results = 0;
        for _ in 0..120 {
            results += sim
                .tick(SIM_DT)
                .iter()
                .filter(|e| matches!(e, GameEvent::ResultsReady { final_score: 0 }))
                .count();
        }
        assert_eq!(results, 1);
        assert_eq!(sim.world().get(bystander).unwrap().pos, frozen);
        assert_eq!(sim.world().count(Category::Explosion), 0);
    }

    #[test]
    fn test_non_finite_drag_is_ignored() {
        let mut sim = started();
        let x = player_pos(&sim).x;
        sim.push(Command::Drag(f32::NAN));
        let events = sim.tick(SIM_DT);
        assert_eq!(player_pos(&sim).x, x);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::EntityMoved { .. })));

        sim.push(Command::Drag(f32::INFINITY));
        sim.tick(SIM_DT);
        assert_eq!(player_pos(&sim).x, x);
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let narrow = Settings {
            viewport: Vec2::new(120.0, 400.0),
            ..Settings::default()
        };
        assert!(matches!(Simulation::new(narrow), Err(ConfigError::Invalid(_))));

        let no_gap = Settings {
            level_table: LevelTable::new(vec![0.0]),
            ..Settings::default()
        };
        assert!(matches!(Simulation::new(no_gap), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_huge_tick_returns_with_capped_spawns() {
        let mut sim = Simulation::new(Settings::with_seed(3)).expect("valid settings");
        sim.push(Command::Start);
        sim.tick(SIM_DT);
        let events = sim.tick(1.0e8);
        let spawned = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::EntitySpawned {
                        category: Category::Enemy,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(spawned, MAX_SPAWN_CATCH_UP as usize);
    }

    #[test]
    fn test_time_ticks_counts_every_tick() {
        let mut sim = Simulation::new(quiet(6)).expect("valid settings");
        assert_eq!(sim.time_ticks(), 0);
        for _ in 0..5 {
            sim.tick(SIM_DT);
        }
        assert_eq!(sim.time_ticks(), 5);
    }

    #[test]
    fn test_restart_only_from_postgame() {
        let mut sim = started();
        sim.push(Command::Restart);
        sim.tick(SIM_DT);
        assert_eq!(sim.mode(), GameMode::InGame);
    }

    #[test]
    fn test_determinism() {
        // Two simulations with the same seed and inputs produce identical events
        let script = |sim: &mut Simulation| {
            let mut all = Vec::new();
            sim.push(Command::Start);
            for i in 0..600 {
                if i % 20 == 0 {
                    sim.push(Command::Fire);
                }
                if i % 7 == 0 {
                    sim.push(Command::Drag(if i % 2 == 0 { 35.0 } else { -20.0 }));
                }
                all.extend(sim.tick(SIM_DT));
            }
            all
        };

        let mut sim1 = Simulation::new(Settings::with_seed(99999)).expect("valid settings");
        let mut sim2 = Simulation::new(Settings::with_seed(99999)).expect("valid settings");
        assert_eq!(script(&mut sim1), script(&mut sim2));
        assert_eq!(sim1.state(), sim2.state());
    }
}

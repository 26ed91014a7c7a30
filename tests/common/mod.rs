#![allow(dead_code)]

use glam::Vec2;
use solo_mission::Settings;
use solo_mission::consts::SIM_DT;
use solo_mission::sim::{Category, Command, EntityId, GameEvent, LevelTable, Simulation};

/// Settings whose spawn schedule never fires during a test
pub fn quiet_settings(seed: u64) -> Settings {
    Settings {
        level_table: LevelTable::new(vec![1000.0, 900.0, 800.0, 700.0]),
        ..Settings::with_seed(seed)
    }
}

/// Start a game and let the player glide into position
pub fn started(settings: Settings) -> (Simulation, Vec<GameEvent>) {
    let mut sim = Simulation::new(settings).expect("valid settings");
    let mut events = Vec::new();
    sim.push(Command::Start);
    for _ in 0..40 {
        events.extend(sim.tick(SIM_DT));
    }
    (sim, events)
}

pub fn player_pos(sim: &Simulation) -> Vec2 {
    sim.world().player().expect("player should be alive").pos
}

/// Park an almost stationary enemy at `at`
pub fn park_enemy(sim: &mut Simulation, at: Vec2) -> EntityId {
    sim.spawn_enemy_between(at, at - Vec2::new(0.0, 1.0))
}

/// Park an enemy on the player so they touch on the next tick
pub fn ram_player(sim: &mut Simulation) -> EntityId {
    let at = player_pos(sim);
    park_enemy(sim, at)
}

/// Put an enemy in front of the player, fire, and tick until it is shot.
///
/// Returns every event produced along the way.
pub fn shoot_down_one(sim: &mut Simulation) -> Vec<GameEvent> {
    let target = player_pos(sim) + Vec2::new(0.0, 300.0);
    let enemy = park_enemy(sim, target);
    let score = sim.score();

    sim.push(Command::Fire);
    let mut events = Vec::new();
    for _ in 0..60 {
        events.extend(sim.tick(SIM_DT));
        if sim.score() > score {
            break;
        }
    }
    assert!(
        sim.world().get(enemy).is_none(),
        "enemy {enemy} should have been shot down"
    );
    events
}

pub fn count_matching(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

pub fn enemy_spawns(events: &[GameEvent]) -> usize {
    count_matching(events, |e| {
        matches!(
            e,
            GameEvent::EntitySpawned {
                category: Category::Enemy,
                ..
            }
        )
    })
}

//! Solo Mission headless runner
//!
//! Drives the simulation with a simple autopilot and logs what happens.
//! Usage: `solo-mission [settings.json]` (set `RUST_LOG=info` for a play-by-play).

use std::process::ExitCode;

use solo_mission::{ConfigError, Settings};
use solo_mission::consts::*;
use solo_mission::sim::{Category, Command, GameEvent, GameMode, Simulation};

/// Longest run before giving up on a game over (seconds of game time)
const MAX_RUN_SECS: f32 = 300.0;
/// Seconds between autopilot shots
const FIRE_INTERVAL: f32 = 0.25;

/// Host-side loop state
struct Runner {
    sim: Simulation,
    accumulator: f32,
    fire_cooldown: f32,
    runs_finished: u32,
    last_score: u64,
}

impl Runner {
    fn new(settings: Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            sim: Simulation::new(settings)?,
            accumulator: 0.0,
            fire_cooldown: 0.0,
            runs_finished: 0,
            last_score: 0,
        })
    }

    /// Run fixed-step ticks for one rendered frame
    fn update(&mut self, frame_dt: f32) {
        let frame_dt = frame_dt.min(0.1);
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.autopilot();
            let events = self.sim.tick(SIM_DT);
            self.handle_events(&events);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    /// Chase the lowest on-screen enemy and keep firing
    fn autopilot(&mut self) {
        match self.sim.mode() {
            GameMode::PreGame => self.sim.push(Command::Start),
            GameMode::InGame => {
                let world = self.sim.world();
                let Some(player) = world.player() else {
                    return;
                };
                let area = world.play_area();
                let target = world
                    .iter_category(Category::Enemy)
                    .filter(|e| area.contains_y(e.pos.y) && e.pos.y > player.pos.y)
                    .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

                if let Some(enemy) = target {
                    let dx = (enemy.pos.x - player.pos.x).clamp(-12.0, 12.0);
                    if dx != 0.0 {
                        self.sim.push(Command::Drag(dx));
                    }
                }

                self.fire_cooldown -= SIM_DT;
                if self.fire_cooldown <= 0.0 {
                    self.sim.push(Command::Fire);
                    self.fire_cooldown = FIRE_INTERVAL;
                }
            }
            GameMode::PostGame => {}
        }
    }

    fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::LevelChanged { value } => log::info!("Level {value}"),
                GameEvent::LivesChanged { value } => log::debug!("Lives {value}"),
                GameEvent::ScoreChanged { value } => log::debug!("Score {value}"),
                GameEvent::GameOver { final_score } => {
                    log::info!("Game over with {final_score} points");
                    self.last_score = final_score;
                }
                GameEvent::ResultsReady { final_score } => {
                    println!("Run {} finished: score {final_score}", self.runs_finished + 1);
                    self.runs_finished += 1;
                    if self.runs_finished < 2 {
                        self.sim.push(Command::Restart);
                    }
                }
                _ => {}
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Solo Mission (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Could not load settings from {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    log::info!("Game initialized with seed: {}", settings.seed);

    let mut runner = match Runner::new(settings) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Invalid settings: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Uneven frame times exercise the fixed-step accumulator
    let frame_times = [1.0 / 50.0, 1.0 / 75.0, 1.0 / 60.0];
    let mut elapsed = 0.0;
    let mut frame = 0usize;
    while runner.runs_finished < 2 && elapsed < MAX_RUN_SECS * 2.0 {
        let dt = frame_times[frame % frame_times.len()];
        runner.update(dt);
        elapsed += dt;
        frame += 1;
    }

    if runner.runs_finished < 2 {
        println!(
            "Stopped after {elapsed:.0}s ({} ticks): score {}, lives {}, level {}",
            runner.sim.time_ticks(),
            runner.sim.score(),
            runner.sim.lives(),
            runner.sim.level()
        );
    } else {
        println!("Last recorded score: {}", runner.last_score);
    }

    ExitCode::SUCCESS
}

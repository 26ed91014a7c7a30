//! Enemy spawn scheduling
//!
//! A repeating countdown replaces the engine's "wait, spawn, repeat forever"
//! action. Starting a level swaps the schedule wholesale so an interval from
//! a previous level can never fire afterwards.

use serde::{Deserialize, Serialize};

use super::level::LevelProgression;
use crate::consts::MAX_SPAWN_CATCH_UP;

/// An active repeating schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Schedule {
    level: u32,
    interval: f32,
    countdown: f32,
}

/// Decides when enemies are due
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnDirector {
    schedule: Option<Schedule>,
}

impl SpawnDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending schedule with one for `level`.
    ///
    /// The first enemy is due one full interval from now.
    pub fn start_level(&mut self, level: u32, progression: &LevelProgression) {
        let interval = progression.spawn_interval(level);
        if !(interval > 0.0 && interval.is_finite()) {
            log::warn!("Level {level} has unusable spawn interval {interval}, not spawning");
            self.schedule = None;
            return;
        }
        if let Some(old) = self.schedule {
            log::debug!(
                "Replacing level {} spawn schedule ({}s) with level {level} ({interval}s)",
                old.level,
                old.interval
            );
        }
        self.schedule = Some(Schedule {
            level,
            interval,
            countdown: interval,
        });
    }

    /// Cancel the schedule entirely
    pub fn suspend(&mut self) {
        self.schedule = None;
    }

    pub fn is_active(&self) -> bool {
        self.schedule.is_some()
    }

    /// Seconds between spawns of the active schedule
    pub fn interval(&self) -> Option<f32> {
        self.schedule.map(|s| s.interval)
    }

    /// Seconds until the next spawn
    pub fn countdown(&self) -> Option<f32> {
        self.schedule.map(|s| s.countdown)
    }

    /// Advance the countdown and return how many enemies are now due.
    ///
    /// A tick longer than the interval can make several spawns due at once,
    /// up to [`MAX_SPAWN_CATCH_UP`]. Past that the backlog is dropped and
    /// the countdown restarts.
    pub fn tick(&mut self, dt: f32) -> u32 {
        let Some(schedule) = self.schedule.as_mut() else {
            return 0;
        };
        if !(dt > 0.0) {
            return 0;
        }

        schedule.countdown -= dt;
        if schedule.countdown > 0.0 {
            return 0;
        }

        let missed = (-schedule.countdown / schedule.interval).floor();
        if missed >= MAX_SPAWN_CATCH_UP as f32 {
            log::warn!(
                "Spawn schedule fell {missed} intervals behind, capping at {MAX_SPAWN_CATCH_UP}"
            );
            schedule.countdown = schedule.interval;
            return MAX_SPAWN_CATCH_UP;
        }
        schedule.countdown += (missed + 1.0) * schedule.interval;
        missed as u32 + 1
    }
}

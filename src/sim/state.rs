//! Game state, commands and events
//!
//! `GameState` is the authoritative score/lives/level/mode record. Commands
//! come in from the input layer; events go out to rendering, audio and
//! persistence, which never feed back into the state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Category, EntityId};

/// Current mode of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Waiting for the first tap
    PreGame,
    /// Active gameplay
    InGame,
    /// Run ended; only a restart leaves this mode
    PostGame,
}

/// Logical input commands, applied at the start of the next tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Start,
    /// Horizontal drag distance since the last command
    Drag(f32),
    Fire,
    Restart,
}

/// Outbound notifications for collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EntitySpawned {
        id: EntityId,
        category: Category,
        position: Vec2,
        rotation: f32,
    },
    EntityRemoved {
        id: EntityId,
    },
    EntityMoved {
        id: EntityId,
        position: Vec2,
    },
    ScoreChanged {
        value: u64,
    },
    LivesChanged {
        value: i32,
    },
    LevelChanged {
        value: u32,
    },
    ExplosionSpawned {
        position: Vec2,
    },
    ModeChanged {
        mode: GameMode,
    },
    GameOver {
        final_score: u64,
    },
    /// The game-over pause has elapsed; time to show results
    ResultsReady {
        final_score: u64,
    },
}

/// Score, lives, level and mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    pub score: u64,
    pub lives: i32,
    pub level: u32,
    /// Score recorded when the run ended
    pub final_score: Option<u64>,
    /// Seconds spent in PostGame
    pub post_game_secs: f32,
    /// Whether `ResultsReady` has gone out for this run
    pub results_ready: bool,
}

impl GameState {
    pub fn new(starting_lives: i32) -> Self {
        Self {
            mode: GameMode::PreGame,
            score: 0,
            lives: starting_lives,
            level: 1,
            final_score: None,
            post_game_secs: 0.0,
            results_ready: false,
        }
    }

    /// Reset counters for a fresh run and enter InGame
    pub fn begin_run(&mut self, starting_lives: i32) {
        self.mode = GameMode::InGame;
        self.score = 0;
        self.lives = starting_lives;
        self.level = 1;
        self.final_score = None;
        self.post_game_secs = 0.0;
        self.results_ready = false;
    }

    /// Take one life, flooring at zero. Returns true if the last life went.
    pub fn lose_life(&mut self) -> bool {
        self.lives = (self.lives - 1).max(0);
        self.lives == 0
    }

    /// Enter PostGame and record the final score
    pub fn end_run(&mut self) -> u64 {
        self.mode = GameMode::PostGame;
        self.final_score = Some(self.score);
        self.score
    }

    pub fn is_playing(&self) -> bool {
        self.mode == GameMode::InGame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = GameState::new(10);
        assert_eq!(state.mode, GameMode::PreGame);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 10);
        assert_eq!(state.level, 1);
        assert!(!state.is_playing());
    }

    #[test]
    fn test_lives_floor_at_zero() {
        let mut state = GameState::new(2);
        assert!(!state.lose_life());
        assert!(state.lose_life());
        assert!(state.lose_life());
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_end_run_records_score() {
        let mut state = GameState::new(1);
        state.begin_run(1);
        state.score = 17;
        assert_eq!(state.end_run(), 17);
        assert_eq!(state.mode, GameMode::PostGame);
        assert_eq!(state.final_score, Some(17));
    }

    #[test]
    fn test_state_serializes() {
        let state = GameState::new(10);
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}

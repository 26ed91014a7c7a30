//! Level progression
//!
//! Levels make enemies arrive faster. The table maps each level to the
//! seconds between spawns; score thresholds decide when the level goes up.

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_SPAWN_INTERVALS;

/// Spawn interval per level (index 0 = level 1), non-increasing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelTable(Vec<f32>);

impl Default for LevelTable {
    fn default() -> Self {
        Self(LEVEL_SPAWN_INTERVALS.to_vec())
    }
}

impl LevelTable {
    pub fn new(intervals: Vec<f32>) -> Self {
        Self(intervals)
    }

    /// Number of levels with their own entry
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Spawn interval for a level.
    ///
    /// Levels past the end of the table hold at the last entry and log a
    /// warning; level 0 is treated as level 1.
    pub fn interval(&self, level: u32) -> f32 {
        let index = level.max(1) as usize - 1;
        match self.0.get(index) {
            Some(&secs) => secs,
            None => {
                let last = self.0.last().copied().unwrap_or(LEVEL_SPAWN_INTERVALS[3]);
                log::warn!("No spawn interval for level {level}, holding at {last}s");
                last
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.0.is_empty() {
            return Err("level_table must have at least one entry".to_string());
        }
        if let Some(bad) = self.0.iter().find(|secs| !(**secs > 0.0)) {
            return Err(format!("level_table intervals must be positive, got {bad}"));
        }
        if self.0.windows(2).any(|w| w[1] > w[0]) {
            return Err(format!(
                "level_table must be non-increasing, got {:?}",
                self.0
            ));
        }
        Ok(())
    }
}

/// Level table plus the score thresholds that advance through it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgression {
    table: LevelTable,
    level_up_scores: Vec<u64>,
}

impl Default for LevelProgression {
    fn default() -> Self {
        Self::new(LevelTable::default(), crate::consts::LEVEL_UP_SCORES.to_vec())
    }
}

impl LevelProgression {
    pub fn new(table: LevelTable, level_up_scores: Vec<u64>) -> Self {
        Self {
            table,
            level_up_scores,
        }
    }

    /// Spawn interval for a level (see [`LevelTable::interval`])
    pub fn spawn_interval(&self, level: u32) -> f32 {
        self.table.interval(level)
    }

    /// Number of level-ups earned moving from `old_score` to `new_score`.
    ///
    /// Counts thresholds in `(old_score, new_score]`, so each threshold is
    /// crossed exactly once no matter how the score gets there.
    pub fn levels_gained(&self, old_score: u64, new_score: u64) -> u32 {
        if new_score <= old_score {
            return 0;
        }
        self.level_up_scores
            .iter()
            .filter(|&&threshold| threshold > old_score && threshold <= new_score)
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intervals() {
        let table = LevelTable::default();
        assert_eq!(table.interval(1), 1.2);
        assert_eq!(table.interval(2), 1.0);
        assert_eq!(table.interval(3), 0.8);
        assert_eq!(table.interval(4), 0.5);
    }

    #[test]
    fn test_past_table_holds_last_interval() {
        let table = LevelTable::default();
        assert_eq!(table.interval(5), 0.5);
        assert_eq!(table.interval(42), 0.5);
    }

    #[test]
    fn test_level_zero_reads_first_entry() {
        assert_eq!(LevelTable::default().interval(0), 1.2);
    }

    #[test]
    fn test_thresholds_each_count_once() {
        let progression = LevelProgression::default();
        assert_eq!(progression.levels_gained(9, 10), 1);
        assert_eq!(progression.levels_gained(10, 11), 0);
        assert_eq!(progression.levels_gained(14, 15), 0);
        assert_eq!(progression.levels_gained(19, 20), 1);
        assert_eq!(progression.levels_gained(29, 30), 1);
        assert_eq!(progression.levels_gained(30, 31), 0);
        assert_eq!(progression.levels_gained(0, 30), 3);
        assert_eq!(progression.levels_gained(12, 12), 0);
    }

    #[test]
    fn test_validate() {
        assert!(LevelTable::default().validate().is_ok());
        assert!(LevelTable::new(vec![]).validate().is_err());
        assert!(LevelTable::new(vec![1.0, 1.0, 0.2]).validate().is_ok());
        assert!(LevelTable::new(vec![1.0, 1.5]).validate().is_err());
        assert!(LevelTable::new(vec![1.0, 0.0]).validate().is_err());
    }
}

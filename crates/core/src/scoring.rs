//! Scoring module - score, level and gravity speed
//!
//! Rules:
//! - A clear of `n` lines scores `10 * 2^(n-1) * level` (integer arithmetic).
//! - Level is `total_lines / 10 + 1`, recomputed on every clear.
//! - Gravity interval is `max(100ms, 500ms - (level - 1) * 50ms)`.
//!
//! A starting level may be set directly before play; it sticks until the first
//! line clear recomputes the level from the line total.

use std::time::Duration;

use crate::types::{
    BASE_FALL_INTERVAL_MS, BASE_LINE_SCORE, FALL_INTERVAL_STEP_MS, LINES_PER_LEVEL,
    MIN_FALL_INTERVAL_MS,
};

/// Result of registering a line clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Points added by this clear.
    pub points: u32,
    pub level_before: u32,
    pub level_after: u32,
}

impl ScoreResult {
    pub fn leveled_up(&self) -> bool {
        self.level_after != self.level_before
    }
}

/// Points for clearing `lines` rows at `level`.
///
/// Zero lines score nothing. Saturates instead of overflowing for absurdly
/// tall custom pieces.
pub fn calculate_line_score(lines: u32, level: u32) -> u32 {
    if lines == 0 {
        return 0;
    }
    let multiplier = 1u32.checked_shl(lines - 1).unwrap_or(u32::MAX);
    BASE_LINE_SCORE
        .saturating_mul(multiplier)
        .saturating_mul(level)
}

/// Level management
/// Level increases every 10 lines cleared, starting at 1
pub fn calculate_level(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Gravity interval for a level (in milliseconds), floored at 100ms.
pub fn fall_interval_ms(level: u32) -> u32 {
    let speedup = level.saturating_sub(1).saturating_mul(FALL_INTERVAL_STEP_MS);
    BASE_FALL_INTERVAL_MS
        .saturating_sub(speedup)
        .max(MIN_FALL_INTERVAL_MS)
}

/// Score, level and line total for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreKeeper {
    score: u32,
    level: u32,
    total_lines: u32,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            total_lines: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn total_lines(&self) -> u32 {
        self.total_lines
    }

    /// Apply a line clear. `0` is a no-op.
    pub fn register_lines_cleared(&mut self, lines: u32) -> ScoreResult {
        let level_before = self.level;
        if lines == 0 {
            return ScoreResult {
                points: 0,
                level_before,
                level_after: level_before,
            };
        }

        let points = calculate_line_score(lines, self.level);
        self.score = self.score.saturating_add(points);
        self.total_lines = self.total_lines.saturating_add(lines);
        self.level = calculate_level(self.total_lines);

        ScoreResult {
            points,
            level_before,
            level_after: self.level,
        }
    }

    /// Override the level (starting level selection). Values below 1 are raised to 1.
    pub fn set_level(&mut self, level: u32) {
        self.level = level.max(1);
    }

    /// Current gravity interval in milliseconds
    pub fn fall_interval_ms(&self) -> u32 {
        fall_interval_ms(self.level)
    }

    /// Current gravity interval
    pub fn fall_interval(&self) -> Duration {
        Duration::from_millis(self.fall_interval_ms() as u64)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ScoreKeeper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_scores() {
        assert_eq!(calculate_line_score(0, 1), 0);
        assert_eq!(calculate_line_score(1, 1), 10);
        assert_eq!(calculate_line_score(2, 1), 20);
        assert_eq!(calculate_line_score(3, 1), 40);
        assert_eq!(calculate_line_score(4, 1), 80);
        assert_eq!(calculate_line_score(1, 3), 30);
        assert_eq!(calculate_line_score(4, 5), 400);
    }

    #[test]
    fn test_line_score_saturates() {
        assert_eq!(calculate_line_score(40, 7), u32::MAX);
    }

    #[test]
    fn test_level_calculation() {
        assert_eq!(calculate_level(0), 1);
        assert_eq!(calculate_level(9), 1);
        assert_eq!(calculate_level(10), 2);
        assert_eq!(calculate_level(29), 3);
        assert_eq!(calculate_level(100), 11);
    }

    #[test]
    fn test_fall_intervals() {
        assert_eq!(fall_interval_ms(1), 500);
        assert_eq!(fall_interval_ms(2), 450);
        assert_eq!(fall_interval_ms(5), 300);
        assert_eq!(fall_interval_ms(9), 100);
        assert_eq!(fall_interval_ms(20), 100);
        assert_eq!(fall_interval_ms(0), 500);
    }

    #[test]
    fn test_fall_interval_is_monotonic() {
        let mut previous = fall_interval_ms(1);
        for level in 2..40 {
            let current = fall_interval_ms(level);
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn test_keeper_register() {
        let mut keeper = ScoreKeeper::new();
        let result = keeper.register_lines_cleared(1);
        assert_eq!(result.points, 10);
        assert_eq!(keeper.score(), 10);
        assert_eq!(keeper.total_lines(), 1);
        assert!(!result.leveled_up());

        let result = keeper.register_lines_cleared(0);
        assert_eq!(result.points, 0);
        assert_eq!(keeper.score(), 10);
    }

    #[test]
    fn test_keeper_levels_up_after_ten_lines() {
        let mut keeper = ScoreKeeper::new();
        for _ in 0..2 {
            keeper.register_lines_cleared(4);
        }
        let result = keeper.register_lines_cleared(2);
        assert!(result.leveled_up());
        assert_eq!(keeper.level(), 2);
        assert_eq!(keeper.fall_interval(), Duration::from_millis(450));
    }

    #[test]
    fn test_starting_level_sticks_until_clear() {
        let mut keeper = ScoreKeeper::new();
        keeper.set_level(3);
        assert_eq!(keeper.level(), 3);

        let result = keeper.register_lines_cleared(1);
        assert_eq!(result.points, 30);
        assert_eq!(keeper.level(), 1);
    }

    #[test]
    fn test_reset() {
        let mut keeper = ScoreKeeper::new();
        keeper.set_level(4);
        keeper.register_lines_cleared(3);
        keeper.reset();
        assert_eq!(keeper, ScoreKeeper::new());
    }
}

//! Global constants

use crate::types::Score;

/// Number of squares on the Othello board.
pub const BOARD_SQUARES: usize = 64;

/// Width and height of the board.
pub const BOARD_SIZE: usize = 8;

/// Maximum possible score (disc difference).
pub const SCORE_MAX: Score = 64;

/// Minimum possible score (disc difference).
pub const SCORE_MIN: Score = -64;

/// Infinity score for search algorithms.
pub const SCORE_INF: Score = 30000;

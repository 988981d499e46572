//! Common type aliases used throughout the engine.

/// Score (disc difference: -64 to +64).
pub type Score = i32;

/// Milliseconds of thinking time. `None` means the budget is unlimited.
pub type TimeBudget = Option<u64>;

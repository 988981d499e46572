//! Core engine for an Othello (Reversi) playing system.
//!
//! The crate is organized bottom-up: bit-parallel board primitives
//! ([`bitboard`], [`flip`], [`stability`]), the immutable [`board::Board`]
//! model, an exact endgame [`solver`], two tree-search move selectors
//! ([`mcts`] and [`puct`]), and the [`players`] / [`game`] layer that
//! composes them into complete games.

pub mod bitboard;
pub mod board;
pub mod constants;
pub mod disc;
pub mod flip;
pub mod game;
pub mod mcts;
pub mod players;
pub mod puct;
pub mod solver;
pub mod square;
pub mod stability;
pub mod types;

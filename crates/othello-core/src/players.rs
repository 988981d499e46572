//! Player abstraction, baseline players, and the solver hand-off wrapper.

use rand::seq::IteratorRandom;
use tracing::debug;

use crate::board::Board;
use crate::disc::Disc;
use crate::solver;
use crate::square::Square;
use crate::types::TimeBudget;

/// A move-selecting agent for one side of a game.
///
/// The game driver calls [`get_move`](Player::get_move) once per turn;
/// players with internal search state use `opponent_move` to advance it.
pub trait Player {
    /// The color this player plays.
    fn color(&self) -> Disc;

    /// Computes the next move.
    ///
    /// # Arguments
    ///
    /// * `board` - The current position, before this player's move.
    /// * `opponent_move` - The opponent's last move; `None` on the first
    ///   move of the game or when the opponent passed.
    /// * `ms_left` - Remaining time budget in milliseconds; `None` means
    ///   unlimited.
    ///
    /// # Returns
    ///
    /// The chosen square, or `None` to pass.
    fn get_move(
        &mut self,
        board: &Board,
        opponent_move: Option<Square>,
        ms_left: TimeBudget,
    ) -> Option<Square>;
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn color(&self) -> Disc {
        (**self).color()
    }

    fn get_move(
        &mut self,
        board: &Board,
        opponent_move: Option<Square>,
        ms_left: TimeBudget,
    ) -> Option<Square> {
        (**self).get_move(board, opponent_move, ms_left)
    }
}

/// Splits a remaining time budget evenly over the turns the mover can
/// still expect to play (`ceil(empties / 2)`).
pub fn turn_budget_ms(board: &Board, ms_left: u64) -> u64 {
    let moves_left = board.empty_count().div_ceil(2).max(1) as u64;
    ms_left / moves_left
}

/// Plays a uniformly random legal move.
pub struct RandomPlayer {
    color: Disc,
}

impl RandomPlayer {
    pub fn new(color: Disc) -> Self {
        RandomPlayer { color }
    }
}

impl Player for RandomPlayer {
    fn color(&self) -> Disc {
        self.color
    }

    fn get_move(
        &mut self,
        board: &Board,
        _opponent_move: Option<Square>,
        _ms_left: TimeBudget,
    ) -> Option<Square> {
        let mut rng = rand::rng();
        board.find_moves(self.color).iter().choose(&mut rng)
    }
}

/// Composes a base player with the exact endgame solver.
///
/// While more than `depth` squares are empty, moves are delegated to the
/// base player with `reserved_ms` withheld from its budget; once the
/// position is shallow enough, the solver takes over.
pub struct WithSolver<P> {
    inner: P,
    depth: u32,
    reserved_ms: u64,
}

impl<P: Player> WithSolver<P> {
    /// Wraps `inner`, switching to exact search at `depth` empties and
    /// keeping `reserved_ms` of the budget in reserve for it.
    pub fn new(inner: P, depth: u32, reserved_ms: u64) -> Self {
        WithSolver {
            inner,
            depth,
            reserved_ms,
        }
    }
}

impl<P: Player> Player for WithSolver<P> {
    fn color(&self) -> Disc {
        self.inner.color()
    }

    fn get_move(
        &mut self,
        board: &Board,
        opponent_move: Option<Square>,
        ms_left: TimeBudget,
    ) -> Option<Square> {
        let color = self.inner.color();
        if !board.has_moves(color) {
            return None;
        }

        let empties = board.empty_count();
        if empties <= self.depth {
            debug!("solving endgame at {empties} empties");
            return solver::solve(board, color).sq;
        }

        let ms_left = ms_left.map(|ms| ms.saturating_sub(self.reserved_ms));
        self.inner.get_move(board, opponent_move, ms_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_budget() {
        let board = Board::new(); // 60 empties -> 30 turns left
        assert_eq!(turn_budget_ms(&board, 30_000), 1_000);
    }

    #[test]
    fn test_random_player_moves_are_legal() {
        let board = Board::new();
        let mut player = RandomPlayer::new(Disc::Black);
        for _ in 0..20 {
            let sq = player.get_move(&board, None, None).unwrap();
            assert!(board.find_moves(Disc::Black).contains(sq));
        }
    }

    #[test]
    fn test_random_player_passes_without_moves() {
        // A full board leaves nothing to play.
        let board = Board::from_string(&format!("{}{}", "X".repeat(32), "O".repeat(32))).unwrap();
        let mut player = RandomPlayer::new(Disc::Black);
        assert_eq!(player.get_move(&board, None, None), None);
    }

    #[test]
    fn test_with_solver_hands_off_at_threshold() {
        // One empty left: the wrapper must return the solver's move.
        let board = Board::from_string(&format!("{}O-", "X".repeat(62))).unwrap();
        let mut player = WithSolver::new(RandomPlayer::new(Disc::Black), 12, 0);
        assert_eq!(player.get_move(&board, None, None), Some(Square::H8));
    }

    #[test]
    fn test_with_solver_delegates_early() {
        let board = Board::new();
        let mut player = WithSolver::new(RandomPlayer::new(Disc::Black), 12, 100);
        let sq = player.get_move(&board, None, Some(60_000)).unwrap();
        assert!(board.find_moves(Disc::Black).contains(sq));
    }
}

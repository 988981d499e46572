//! Complete-game driver.
//!
//! Alternates two [`Player`]s from a starting position, tracking per-side
//! wall clocks and pass state. Two consecutive passes end the game; an
//! illegal move or an exhausted clock forfeits in favor of the opponent.

use std::time::Instant;

use tracing::error;

use crate::board::Board;
use crate::disc::{Disc, GameOutcome};
use crate::players::Player;
use crate::square::Square;
use crate::types::TimeBudget;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEnd {
    /// Both sides passed consecutively (includes a full board).
    DoublePass,
    /// The named side exceeded its time budget and lost.
    Timeout(Disc),
    /// The named side played an illegal move (or passed while holding
    /// legal moves) and lost.
    IllegalMove(Disc),
}

/// The result of a completed game.
#[derive(Debug, Clone, Copy)]
pub struct GameReport {
    /// The winner, or a draw.
    pub outcome: GameOutcome,
    /// How the game ended.
    pub end: GameEnd,
    /// The final position.
    pub board: Board,
    /// Number of discs placed over the course of the game.
    pub moves_played: u32,
}

/// Plays a full game from the standard starting position.
pub fn play_game(
    black: &mut dyn Player,
    white: &mut dyn Player,
    budget_ms: TimeBudget,
) -> GameReport {
    play_game_from(black, white, Board::new(), Disc::Black, budget_ms)
}

/// Plays a game from an arbitrary position.
///
/// # Arguments
///
/// * `black`, `white` - The two players.
/// * `board` - The starting position.
/// * `to_move` - The side to move first.
/// * `budget_ms` - Per-side time budget for the whole game; `None` for
///   unlimited time.
pub fn play_game_from(
    black: &mut dyn Player,
    white: &mut dyn Player,
    board: Board,
    to_move: Disc,
    budget_ms: TimeBudget,
) -> GameReport {
    let mut board = board;
    let mut to_move = to_move;
    let mut last_move: Option<Square> = None;
    let mut consecutive_passes = 0;
    let mut clocks = [budget_ms, budget_ms];
    let mut moves_played = 0;

    while consecutive_passes < 2 {
        let idx = if to_move == Disc::Black { 0 } else { 1 };
        let player: &mut dyn Player = if to_move == Disc::Black {
            &mut *black
        } else {
            &mut *white
        };

        let start = Instant::now();
        let mv = player.get_move(&board, last_move, clocks[idx]);
        let elapsed = start.elapsed().as_millis() as u64;

        if let Some(limit) = clocks[idx] {
            if elapsed > limit {
                error!("{to_move:?} exceeded its time budget; forfeiting");
                return forfeit(board, to_move, GameEnd::Timeout(to_move), moves_played);
            }
            clocks[idx] = Some(limit - elapsed);
        }

        match mv {
            Some(sq) => {
                if !board.find_moves(to_move).contains(sq) {
                    error!("{to_move:?} played illegal move {sq}; forfeiting");
                    return forfeit(board, to_move, GameEnd::IllegalMove(to_move), moves_played);
                }
                board = board.resolve_move(sq, to_move);
                consecutive_passes = 0;
                moves_played += 1;
            }
            None => {
                if board.has_moves(to_move) {
                    error!("{to_move:?} passed with legal moves available; forfeiting");
                    return forfeit(board, to_move, GameEnd::IllegalMove(to_move), moves_played);
                }
                consecutive_passes += 1;
            }
        }

        last_move = mv;
        to_move = to_move.opposite();
    }

    GameReport {
        outcome: board.winning_player(),
        end: GameEnd::DoublePass,
        board,
        moves_played,
    }
}

fn forfeit(board: Board, loser: Disc, end: GameEnd, moves_played: u32) -> GameReport {
    GameReport {
        outcome: loser.opposite().winning_outcome(),
        end,
        board,
        moves_played,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::RandomPlayer;

    #[test]
    fn test_random_game_terminates() {
        let mut black = RandomPlayer::new(Disc::Black);
        let mut white = RandomPlayer::new(Disc::White);
        let report = play_game(&mut black, &mut white, None);

        assert_eq!(report.end, GameEnd::DoublePass);
        assert!(report.board.is_terminal());
        assert_eq!(report.outcome, report.board.winning_player());
        assert_eq!(
            report.board.black.count() + report.board.white.count(),
            4 + report.moves_played
        );
    }

    #[test]
    fn test_double_pass_on_stuck_board() {
        // A full board: both sides must pass immediately.
        let board = Board::from_string(&format!("{}{}", "X".repeat(40), "O".repeat(24))).unwrap();
        let mut black = RandomPlayer::new(Disc::Black);
        let mut white = RandomPlayer::new(Disc::White);
        let report = play_game_from(&mut black, &mut white, board, Disc::Black, None);

        assert_eq!(report.end, GameEnd::DoublePass);
        assert_eq!(report.moves_played, 0);
        assert_eq!(report.outcome, GameOutcome::BlackWins);
    }

    #[test]
    fn test_illegal_move_forfeits() {
        struct CornerGrabber;
        impl Player for CornerGrabber {
            fn color(&self) -> Disc {
                Disc::Black
            }
            fn get_move(
                &mut self,
                _board: &Board,
                _opponent_move: Option<Square>,
                _ms_left: TimeBudget,
            ) -> Option<Square> {
                Some(Square::A1)
            }
        }

        let mut black = CornerGrabber;
        let mut white = RandomPlayer::new(Disc::White);
        let report = play_game(&mut black, &mut white, None);
        assert_eq!(report.end, GameEnd::IllegalMove(Disc::Black));
        assert_eq!(report.outcome, GameOutcome::WhiteWins);
    }

    #[test]
    fn test_illegal_pass_forfeits() {
        struct AlwaysPass;
        impl Player for AlwaysPass {
            fn color(&self) -> Disc {
                Disc::White
            }
            fn get_move(
                &mut self,
                _board: &Board,
                _opponent_move: Option<Square>,
                _ms_left: TimeBudget,
            ) -> Option<Square> {
                None
            }
        }

        let mut black = RandomPlayer::new(Disc::Black);
        let mut white = AlwaysPass;
        let report = play_game(&mut black, &mut white, None);
        assert_eq!(report.end, GameEnd::IllegalMove(Disc::White));
        assert_eq!(report.outcome, GameOutcome::BlackWins);
    }
}

//! Exact endgame solving.
//!
//! Plain negamax with alpha-beta pruning over the remaining empty squares.
//! The search is exhaustive: the returned score is the final disc
//! differential under optimal play from both sides, measured from the root
//! mover. Callers are expected to invoke it only once few enough squares
//! remain (around 20 empties) for the search to finish in tournament time.

use arrayvec::ArrayVec;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::constants::SCORE_INF;
use crate::disc::Disc;
use crate::flip;
use crate::square::Square;
use crate::types::Score;

/// Maximum number of legal moves in any Othello position.
const MAX_MOVES: usize = 34;

/// Static square values for move ordering: corners first, X- and
/// C-squares last. Ordering only affects speed; the search result is
/// exact either way.
///
/// Reference: <https://github.com/abulmo/edax-reversi/blob/14f048c05ddfa385b6bf954a9c2905bbe677e9d3/src/move.c#L30>
#[rustfmt::skip]
const SQUARE_VALUE: [i32; 64] = [
    18,  4, 16, 12, 12, 16,  4, 18,
     4,  2,  6,  8,  8,  6,  2,  4,
    16,  6, 14, 10, 10, 14,  6, 16,
    12,  8, 10,  0,  0, 10,  8, 12,
    12,  8, 10,  0,  0, 10,  8, 12,
    16,  6, 14, 10, 10, 14,  6, 16,
     4,  2,  6,  8,  8,  6,  2,  4,
    18,  4, 16, 12, 12, 16,  4, 18,
];

/// An exact solver verdict: the move to play and the final disc
/// differential it guarantees. `sq` is `None` when the root side must pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// The optimal move for the root side, or `None` for a forced pass.
    pub sq: Option<Square>,
    /// Final disc differential from the root mover under optimal play.
    pub score: Score,
}

#[inline(always)]
fn disc_diff(player: Bitboard, opponent: Bitboard) -> Score {
    player.count() as Score - opponent.count() as Score
}

/// Collects the legal moves ordered by static square value, best first.
fn ordered_moves(moves: Bitboard) -> ArrayVec<Square, MAX_MOVES> {
    let mut list: ArrayVec<Square, MAX_MOVES> = moves.iter().collect();
    list.sort_unstable_by_key(|sq| -SQUARE_VALUE[sq.index()]);
    list
}

/// Negamax with alpha-beta over the remaining empties.
///
/// A side with no moves passes without consuming depth; a second
/// consecutive pass ends the game at the disc differential.
fn negamax(player: Bitboard, opponent: Bitboard, mut alpha: Score, beta: Score, passed: bool) -> Score {
    let moves = player.get_moves(opponent);
    if moves.is_empty() {
        if passed {
            return disc_diff(player, opponent);
        }
        return -negamax(opponent, player, -beta, -alpha, true);
    }

    let mut best = -SCORE_INF;
    for sq in ordered_moves(moves) {
        let flipped = flip::flip(sq, player, opponent);
        let next_player = opponent ^ flipped;
        let next_opponent = player ^ flipped ^ sq.bitboard();
        let score = -negamax(next_player, next_opponent, -beta, -alpha, false);
        if score > best {
            best = score;
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    break;
                }
            }
        }
    }
    best
}

/// Solves the position exactly for the side to move.
///
/// # Arguments
///
/// * `board` - The position to solve.
/// * `color` - The side to move at the root.
///
/// # Returns
///
/// The optimal move and the resulting disc differential from `color`'s
/// perspective. When `color` must pass, returns `sq: None` and the
/// negation of the opponent's optimal score.
pub fn solve(board: &Board, color: Disc) -> Solution {
    let (mine, opp) = board.player_view(color);
    let moves = mine.get_moves(opp);

    if moves.is_empty() {
        let score = -negamax(opp, mine, -SCORE_INF, SCORE_INF, true);
        return Solution { sq: None, score };
    }

    let mut alpha = -SCORE_INF;
    let mut best_move = None;
    for sq in ordered_moves(moves) {
        let flipped = flip::flip(sq, mine, opp);
        let next_player = opp ^ flipped;
        let next_opponent = mine ^ flipped ^ sq.bitboard();
        let score = -negamax(next_player, next_opponent, -SCORE_INF, -alpha, false);
        if score > alpha {
            alpha = score;
            best_move = Some(sq);
        }
    }

    Solution {
        sq: best_move,
        score: alpha,
    }
}

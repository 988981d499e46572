use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;

use othello_core::board::Board;
use othello_core::disc::Disc;
use othello_core::solver::solve;

/// Plays random moves until at most `target_empties` squares remain.
/// Returns the position and the side to move, or `None` when the game
/// finished early.
fn random_position(rng: &mut StdRng, target_empties: u32) -> Option<(Board, Disc)> {
    let mut board = Board::new();
    let mut to_move = Disc::Black;
    let mut just_passed = false;

    while board.empty_count() > target_empties {
        match board.find_moves(to_move).iter().choose(rng) {
            Some(sq) => {
                board = board.resolve_move(sq, to_move);
                just_passed = false;
            }
            None => {
                if just_passed {
                    return None;
                }
                just_passed = true;
            }
        }
        to_move = to_move.opposite();
    }
    Some((board, to_move))
}

/// The solver's root score must equal the disc differential actually
/// reached when both sides follow solver-returned moves to the end.
#[test]
fn solver_score_matches_optimal_playout() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut checked = 0;

    while checked < 8 {
        let Some((start, root_color)) = random_position(&mut rng, 6) else {
            continue;
        };
        let root = solve(&start, root_color);

        let mut board = start;
        let mut to_move = root_color;
        while !board.is_terminal() {
            let step = solve(&board, to_move);

            // The game value is invariant along an optimal line.
            let for_root = if to_move == root_color {
                step.score
            } else {
                -step.score
            };
            assert_eq!(for_root, root.score);

            if let Some(sq) = step.sq {
                board = board.resolve_move(sq, to_move);
            }
            to_move = to_move.opposite();
        }

        let (mine, opp) = board.player_view(root_color);
        assert_eq!(mine.count() as i32 - opp.count() as i32, root.score);
        checked += 1;
    }
}

/// A solved game replayed move-by-move never changes its value.
#[test]
fn solver_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(42);
    let (board, color) = loop {
        if let Some(pos) = random_position(&mut rng, 8) {
            break pos;
        }
    };

    let first = solve(&board, color);
    let second = solve(&board, color);
    assert_eq!(first, second);
}

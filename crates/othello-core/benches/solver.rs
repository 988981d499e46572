use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;

use othello_core::board::Board;
use othello_core::disc::Disc;
use othello_core::solver::solve;

/// Plays seeded random moves down to `target_empties` squares.
fn endgame_position(target_empties: u32) -> (Board, Disc) {
    let mut rng = StdRng::seed_from_u64(2024);
    loop {
        let mut board = Board::new();
        let mut to_move = Disc::Black;
        let mut just_passed = false;
        let reached = loop {
            if board.empty_count() <= target_empties {
                break true;
            }
            match board.find_moves(to_move).iter().choose(&mut rng) {
                Some(sq) => {
                    board = board.resolve_move(sq, to_move);
                    just_passed = false;
                }
                None => {
                    if just_passed {
                        break false;
                    }
                    just_passed = true;
                }
            }
            to_move = to_move.opposite();
        };
        if reached {
            return (board, to_move);
        }
    }
}

fn bench_solve_8_empties(c: &mut Criterion) {
    let (board, to_move) = endgame_position(8);
    c.bench_function("solve_8_empties", |b| {
        b.iter(|| solve(black_box(&board), black_box(to_move)))
    });
}

fn bench_solve_12_empties(c: &mut Criterion) {
    let (board, to_move) = endgame_position(12);
    c.bench_function("solve_12_empties", |b| {
        b.iter(|| solve(black_box(&board), black_box(to_move)))
    });
}

criterion_group!(benches, bench_solve_8_empties, bench_solve_12_empties);
criterion_main!(benches);

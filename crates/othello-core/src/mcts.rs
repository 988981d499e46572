//! Monte-Carlo tree search with random rollouts (UCT).
//!
//! Each node accumulates how often the side to move at that node went on
//! to LOSE the rollout. Measured from the parent, which is the side that
//! chooses between children, a higher average is therefore better, and
//! the UCT-1 exploitation term can read the child's value directly.

use std::time::Instant;

use rand::Rng;
use rand::RngExt;
use rand::seq::IteratorRandom;
use tracing::{debug, warn};

use crate::board::Board;
use crate::disc::{Disc, GameOutcome};
use crate::players::{Player, turn_budget_ms};
use crate::square::Square;
use crate::types::TimeBudget;

/// Traversals per turn when no time budget is given.
pub const DEFAULT_TRAVERSALS: u32 = 100;

/// Default UCT exploration constant.
pub const DEFAULT_EXPLORE_COEFF: f64 = 4.0;

/// Plays the game out with uniformly random moves until both sides pass.
pub fn random_rollout(mut board: Board, mut to_move: Disc, rng: &mut impl Rng) -> GameOutcome {
    let mut just_passed = false;
    loop {
        match board.find_moves(to_move).iter().choose(rng) {
            Some(sq) => {
                board = board.resolve_move(sq, to_move);
                just_passed = false;
            }
            None => {
                if just_passed {
                    return board.winning_player();
                }
                just_passed = true;
            }
        }
        to_move = to_move.opposite();
    }
}

/// A node of the UCT search tree, owning the subtree below it.
pub struct SearchTree {
    explore_coeff: f64,
    board: Board,
    to_move: Disc,
    value: f64,
    visits: u32,
    unexplored: Vec<Square>,
    explored: Vec<(Square, SearchTree)>,
}

impl SearchTree {
    /// Creates an unexpanded node for `to_move` at `board`.
    pub fn new(board: Board, to_move: Disc, explore_coeff: f64) -> Self {
        SearchTree {
            explore_coeff,
            board,
            to_move,
            value: 0.0,
            visits: 0,
            unexplored: board.find_moves(to_move).iter().collect(),
            explored: Vec::new(),
        }
    }

    /// Number of times this node has been visited.
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Accumulated value (loss count for this node's mover).
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of children already expanded.
    pub fn explored_count(&self) -> usize {
        self.explored.len()
    }

    /// Number of legal moves not yet expanded.
    pub fn unexplored_count(&self) -> usize {
        self.unexplored.len()
    }

    fn uct_score(&self, parent_visits: u32) -> f64 {
        (self.value / self.visits as f64)
            + self.explore_coeff * ((parent_visits as f64).ln() / self.visits as f64).sqrt()
    }

    fn apply_outcome(&mut self, result: GameOutcome) {
        self.visits += 1;
        if result == GameOutcome::Draw {
            self.value += 0.5;
        } else if result != self.to_move.winning_outcome() {
            self.value += 1.0;
        }
    }

    /// Runs one traversal: descend by UCT through fully expanded nodes,
    /// expand one random unexplored move, roll the game out from the new
    /// child, and credit the outcome to every node on the path.
    ///
    /// A terminal node reports its fixed result without expanding.
    pub fn traverse(&mut self, rng: &mut impl Rng) -> GameOutcome {
        let result = if !self.unexplored.is_empty() {
            let idx = rng.random_range(0..self.unexplored.len());
            let sq = self.unexplored.swap_remove(idx);
            let next_board = self.board.resolve_move(sq, self.to_move);
            let opponent = self.to_move.opposite();
            let next_to_move = if next_board.has_moves(opponent) {
                opponent
            } else {
                // Opponent has no reply: the pass is folded into the child.
                self.to_move
            };

            let mut child = SearchTree::new(next_board, next_to_move, self.explore_coeff);
            let result = random_rollout(next_board, next_to_move, rng);
            child.apply_outcome(result);
            self.explored.push((sq, child));
            result
        } else if self.explored.is_empty() {
            return self.board.winning_player();
        } else {
            let parent_visits = self.visits;
            let mut best_idx = 0;
            let mut best_score = f64::NEG_INFINITY;
            for (i, (_, child)) in self.explored.iter().enumerate() {
                let score = child.uct_score(parent_visits);
                if score > best_score {
                    best_score = score;
                    best_idx = i;
                }
            }
            self.explored[best_idx].1.traverse(rng)
        };

        self.apply_outcome(result);
        result
    }

    /// Detaches and returns the explored child reached by `sq`, dropping
    /// the rest of the tree when the caller installs it as the new root.
    fn take_child(&mut self, sq: Square) -> Option<SearchTree> {
        let idx = self.explored.iter().position(|(mv, _)| *mv == sq)?;
        Some(self.explored.swap_remove(idx).1)
    }

    /// Index of the most-visited child, ties broken by first-seen order.
    fn most_visited_index(&self) -> usize {
        let mut best_idx = 0;
        let mut best_visits = 0;
        for (i, (_, child)) in self.explored.iter().enumerate() {
            if child.visits > best_visits {
                best_visits = child.visits;
                best_idx = i;
            }
        }
        best_idx
    }
}

/// Move selector driving a [`SearchTree`] under a wall-clock budget.
pub struct MctsPlayer {
    color: Disc,
    explore_coeff: f64,
    turn_ms_buffer: u64,
    tree: SearchTree,
}

impl MctsPlayer {
    /// Creates a player with the default exploration constant.
    pub fn new(color: Disc) -> Self {
        Self::with_options(color, DEFAULT_EXPLORE_COEFF, 0)
    }

    /// Creates a player with an explicit exploration constant and a
    /// per-turn safety margin subtracted from the allocated time.
    pub fn with_options(color: Disc, explore_coeff: f64, turn_ms_buffer: u64) -> Self {
        MctsPlayer {
            color,
            explore_coeff,
            turn_ms_buffer,
            tree: SearchTree::new(Board::new(), Disc::Black, explore_coeff),
        }
    }
}

impl Player for MctsPlayer {
    fn color(&self) -> Disc {
        self.color
    }

    fn get_move(
        &mut self,
        board: &Board,
        opponent_move: Option<Square>,
        ms_left: TimeBudget,
    ) -> Option<Square> {
        if let Some(sq) = opponent_move {
            match self.tree.take_child(sq) {
                Some(subtree) => self.tree = subtree,
                None => {
                    warn!("opponent move {sq} is outside the search tree; starting a fresh root");
                    self.tree = SearchTree::new(*board, self.color, self.explore_coeff);
                }
            }
        }
        // On an opponent pass the tree already has us to move again.

        if !board.has_moves(self.color) {
            return None;
        }

        let mut rng = rand::rng();
        let mut traversals = 0u32;
        if let Some(ms) = ms_left {
            let budget = turn_budget_ms(board, ms).saturating_sub(self.turn_ms_buffer);
            let start = Instant::now();
            while traversals == 0 || (start.elapsed().as_millis() as u64) < budget {
                self.tree.traverse(&mut rng);
                traversals += 1;
            }
        } else {
            for _ in 0..DEFAULT_TRAVERSALS {
                self.tree.traverse(&mut rng);
            }
            traversals = DEFAULT_TRAVERSALS;
        }

        let idx = self.tree.most_visited_index();
        let (sq, subtree) = self.tree.explored.swap_remove(idx);
        debug!(
            "searched {traversals} traversals; playing {sq} (expected win rate {:.3})",
            subtree.value / subtree.visits as f64
        );
        self.tree = subtree;
        Some(sq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollout_reaches_terminal() {
        let mut rng = rand::rng();
        for _ in 0..10 {
            // The rollout must return without hanging; the outcome is one
            // of the three legal results by construction.
            let _ = random_rollout(Board::new(), Disc::Black, &mut rng);
        }
    }

    #[test]
    fn test_traverse_updates_counts() {
        let mut rng = rand::rng();
        let mut tree = SearchTree::new(Board::new(), Disc::Black, DEFAULT_EXPLORE_COEFF);
        let legal = Board::new().find_moves(Disc::Black).count() as usize;

        for i in 1..=50u32 {
            tree.traverse(&mut rng);
            assert_eq!(tree.visits(), i);
            assert_eq!(tree.explored_count() + tree.unexplored_count(), legal);
        }
        assert_eq!(tree.unexplored_count(), 0);
        assert!(tree.value() <= tree.visits() as f64);
    }

    #[test]
    fn test_terminal_node_reports_winner() {
        let board = Board::from_string(&format!("{}{}", "X".repeat(33), "O".repeat(31))).unwrap();
        let mut tree = SearchTree::new(board, Disc::Black, DEFAULT_EXPLORE_COEFF);
        let mut rng = rand::rng();
        assert_eq!(tree.explored_count() + tree.unexplored_count(), 0);
        assert_eq!(tree.traverse(&mut rng), GameOutcome::BlackWins);
        // Terminal nodes report their result without being expanded.
        assert_eq!(tree.visits(), 0);
    }

    #[test]
    fn test_player_returns_legal_move() {
        let board = Board::new();
        let mut player = MctsPlayer::new(Disc::Black);
        let sq = player.get_move(&board, None, None).unwrap();
        assert!(board.find_moves(Disc::Black).contains(sq));
    }

    #[test]
    fn test_player_passes_without_moves() {
        let board = Board::from_string(&format!("{}{}", "X".repeat(32), "O".repeat(32))).unwrap();
        let mut player = MctsPlayer::new(Disc::Black);
        assert_eq!(player.get_move(&board, None, None), None);
    }
}

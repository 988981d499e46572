//! Network-guided tree search (PUCT).
//!
//! The search consumes an externally supplied policy/value evaluator and
//! grows a tree one node per simulation. Node values accumulate from the
//! perspective of the side to move at that node, so a parent reads its
//! children through a sign flip.

use std::time::Instant;

use rand::Rng;
use rand::RngExt;
use tracing::{debug, warn};

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::constants::{BOARD_SIZE, BOARD_SQUARES};
use crate::disc::{Disc, GameOutcome};
use crate::players::{Player, turn_budget_ms};
use crate::square::Square;
use crate::types::TimeBudget;

/// Policy logits over the 64 squares, pre-softmax.
pub type PolicyLogits = [f32; BOARD_SQUARES];

/// Evaluator input: an 8x8x2 stack of (mine, opp) occupancy planes from
/// the to-move player's perspective, indexed `[rank][file][plane]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardTensor(pub [[[f32; 2]; BOARD_SIZE]; BOARD_SIZE]);

impl BoardTensor {
    /// Builds the tensor from the mover's view of a board.
    pub fn from_view(mine: Bitboard, opp: Bitboard) -> Self {
        let mut planes = [[[0.0; 2]; BOARD_SIZE]; BOARD_SIZE];
        for sq in Square::iter() {
            if mine.contains(sq) {
                planes[sq.rank()][sq.file()][0] = 1.0;
            }
            if opp.contains(sq) {
                planes[sq.rank()][sq.file()][1] = 1.0;
            }
        }
        BoardTensor(planes)
    }
}

/// A policy/value oracle supplied by the host.
///
/// Implementations return pre-softmax logits over all 64 squares and an
/// expected outcome in `[-1, 1]` from the mover's perspective. The search
/// calls it synchronously from inside simulations.
pub trait Evaluator {
    fn evaluate(&self, tensor: &BoardTensor) -> (PolicyLogits, f32);
}

/// A knowledge-free evaluator: flat policy, neutral value.
///
/// Useful as a baseline and in tests; with it the search degenerates to
/// prior-weighted visit balancing.
pub struct UniformEvaluator;

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _tensor: &BoardTensor) -> (PolicyLogits, f32) {
        ([0.0; BOARD_SQUARES], 0.0)
    }
}

fn softmax(logits: &PolicyLogits) -> PolicyLogits {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = [0.0f32; BOARD_SQUARES];
    let mut sum = 0.0f32;
    for (o, &l) in out.iter_mut().zip(logits.iter()) {
        *o = (l - max).exp();
        sum += *o;
    }
    for o in &mut out {
        *o /= sum;
    }
    out
}

/// Search configuration for [`PuctPlayer`].
#[derive(Debug, Clone, Copy)]
pub struct PuctConfig {
    /// Exploration constant multiplying the prior-weighted term.
    pub explore_coeff: f32,
    /// When true, always play the most-visited move; otherwise sample
    /// proportionally to visit counts.
    pub finalized: bool,
    /// Safety margin subtracted from each turn's time allocation.
    pub time_buffer_ms: u64,
    /// Simulations per turn when no time budget is given.
    pub sims_per_turn: u32,
}

impl Default for PuctConfig {
    fn default() -> Self {
        PuctConfig {
            explore_coeff: 4.0,
            finalized: true,
            time_buffer_ms: 80,
            sims_per_turn: 400,
        }
    }
}

/// A node of the PUCT search tree.
///
/// Unexpanded nodes (never simulated through) hold no children; expansion
/// creates the complete child set over the legal moves in one step.
pub struct SearchTree {
    board: Board,
    mv: Option<Square>,
    to_move: Disc,
    prior: f32,
    value: f32,
    visits: u32,
    children: Option<Vec<SearchTree>>,
}

impl SearchTree {
    /// Creates an unexpanded root for `to_move` at `board`.
    pub fn new_root(board: Board, to_move: Disc) -> Self {
        SearchTree {
            board,
            mv: None,
            to_move,
            prior: 1.0,
            value: 0.0,
            visits: 0,
            children: None,
        }
    }

    /// Number of simulations that passed through this node.
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Accumulated value from this node's mover's perspective.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// The move that produced this node, if any.
    pub fn last_move(&self) -> Option<Square> {
        self.mv
    }

    /// Number of children, or `None` while unexpanded.
    pub fn child_count(&self) -> Option<usize> {
        self.children.as_ref().map(Vec::len)
    }

    fn make_child(&self, sq: Square, prior: f32) -> SearchTree {
        let board = self.board.resolve_move(sq, self.to_move);
        let opponent = self.to_move.opposite();
        let to_move = if board.has_moves(opponent) {
            opponent
        } else {
            // Opponent has no reply: the pass is folded into the child.
            self.to_move
        };
        SearchTree {
            board,
            mv: Some(sq),
            to_move,
            prior,
            value: 0.0,
            visits: 0,
            children: None,
        }
    }

    fn expand(&mut self, evaluator: &dyn Evaluator) -> f32 {
        debug_assert!(self.children.is_none(), "can only expand an unvisited node");

        let (mine, opp) = self.board.player_view(self.to_move);
        let (mut logits, value) = evaluator.evaluate(&BoardTensor::from_view(mine, opp));

        // Mask illegal moves and re-normalize.
        let legal = self.board.find_moves(self.to_move);
        for sq in Square::iter() {
            if !legal.contains(sq) {
                logits[sq.index()] = f32::NEG_INFINITY;
            }
        }
        let priors = softmax(&logits);

        self.children = Some(
            legal
                .iter()
                .map(|sq| self.make_child(sq, priors[sq.index()]))
                .collect(),
        );
        self.visits = 1;
        self.value = value;
        value
    }

    fn puct_score(&self, parent_visits: u32, explore_coeff: f32) -> f32 {
        let exploit = if self.visits > 0 {
            -self.value / self.visits as f32
        } else {
            0.0
        };
        let explore = self.prior * (parent_visits as f32).sqrt() / (1.0 + self.visits as f32);
        exploit + explore_coeff * explore
    }

    fn terminal_value(&self) -> f32 {
        match self.board.winning_player() {
            GameOutcome::Draw => 0.0,
            w if w == self.to_move.winning_outcome() => 1.0,
            _ => -1.0,
        }
    }

    /// Runs one simulation from this node and returns its value from this
    /// node's mover's perspective.
    ///
    /// Terminal nodes return their fixed value on every visit; unexpanded
    /// nodes are evaluated and expanded; expanded nodes recurse through
    /// the PUCT-maximal child and absorb the returned value with a sign
    /// flip whenever the movers differ.
    pub fn simulate(&mut self, evaluator: &dyn Evaluator, explore_coeff: f32) -> f32 {
        if self.board.is_terminal() {
            return self.terminal_value();
        }

        if self.children.is_none() {
            return self.expand(evaluator);
        }

        let parent_visits = self.visits;
        let children = self.children.as_mut().expect("expanded node has children");
        let mut best_idx = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (i, child) in children.iter().enumerate() {
            let score = child.puct_score(parent_visits, explore_coeff);
            if score > best_score {
                best_score = score;
                best_idx = i;
            }
        }

        let child = &mut children[best_idx];
        let child_to_move = child.to_move;
        let mut value = child.simulate(evaluator, explore_coeff);
        if child_to_move != self.to_move {
            value = -value;
        }
        self.value += value;
        self.visits += 1;
        value
    }

    /// Detaches and returns the child reached by `sq`; the rest of the
    /// tree is released when the caller installs it as the new root.
    fn take_child(&mut self, sq: Square) -> Option<SearchTree> {
        let children = self.children.as_mut()?;
        let idx = children.iter().position(|c| c.mv == Some(sq))?;
        Some(children.swap_remove(idx))
    }

    /// Picks the index of the move to play: most-visited when finalized,
    /// otherwise sampled proportionally to visit counts.
    fn best_child_index(&self, finalized: bool, rng: &mut impl Rng) -> usize {
        let children = self.children.as_ref().expect("root must be expanded");
        if finalized {
            let mut best_idx = 0;
            let mut best_visits = 0;
            for (i, child) in children.iter().enumerate() {
                if child.visits > best_visits {
                    best_visits = child.visits;
                    best_idx = i;
                }
            }
            return best_idx;
        }

        let total: u32 = children.iter().map(|c| c.visits).sum();
        if total == 0 {
            return 0;
        }
        let mut r = rng.random_range(0..total);
        for (i, child) in children.iter().enumerate() {
            if r < child.visits {
                return i;
            }
            r -= child.visits;
        }
        children.len() - 1
    }
}

/// Move selector driving a PUCT [`SearchTree`] with an [`Evaluator`].
pub struct PuctPlayer<E> {
    color: Disc,
    evaluator: E,
    config: PuctConfig,
    tree: SearchTree,
}

impl<E: Evaluator> PuctPlayer<E> {
    /// Creates a player with the default configuration.
    pub fn new(color: Disc, evaluator: E) -> Self {
        Self::with_config(color, evaluator, PuctConfig::default())
    }

    /// Creates a player with an explicit configuration.
    pub fn with_config(color: Disc, evaluator: E, config: PuctConfig) -> Self {
        PuctPlayer {
            color,
            evaluator,
            config,
            tree: SearchTree::new_root(Board::new(), Disc::Black),
        }
    }
}

impl<E: Evaluator> Player for PuctPlayer<E> {
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
                    warn!("opponent move {sq} was never expanded; starting a fresh root");
                    self.tree = SearchTree::new_root(*board, self.color);
                }
            }
            if self.tree.visits == 0 {
                warn!("adopted subtree has no visits");
            }
        }

        if !board.has_moves(self.color) {
            return None;
        }

        let mut rng = rand::rng();
        let coeff = self.config.explore_coeff;
        let mut sims = 0u32;
        if let Some(ms) = ms_left {
            let budget = turn_budget_ms(board, ms).saturating_sub(self.config.time_buffer_ms);
            let start = Instant::now();
            while sims == 0 || (start.elapsed().as_millis() as u64) < budget {
                self.tree.simulate(&self.evaluator, coeff);
                sims += 1;
            }
        } else {
            // At least one simulation so the root is always expanded.
            sims = self.config.sims_per_turn.max(1);
            for _ in 0..sims {
                self.tree.simulate(&self.evaluator, coeff);
            }
        }

        let idx = self
            .tree
            .best_child_index(self.config.finalized, &mut rng);
        let children = self.tree.children.as_mut().expect("root was simulated");
        let subtree = children.swap_remove(idx);
        debug!(
            "ran {sims} simulations; playing {} ({} visits)",
            subtree.mv.map(|sq| sq.to_string()).unwrap_or_default(),
            subtree.visits
        );
        self.tree = subtree;
        self.tree.mv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_creates_complete_children() {
        let mut tree = SearchTree::new_root(Board::new(), Disc::Black);
        let value = tree.simulate(&UniformEvaluator, 4.0);
        assert_eq!(value, 0.0);
        assert_eq!(tree.visits(), 1);
        assert_eq!(tree.child_count(), Some(4));

        // A flat policy over four legal moves gives each a quarter prior.
        let children = tree.children.as_ref().unwrap();
        for child in children {
            assert!((child.prior - 0.25).abs() < 1e-5);
            assert_eq!(child.visits, 0);
            assert!(child.children.is_none());
        }
    }

    #[test]
    fn test_simulate_increments_visits() {
        let mut tree = SearchTree::new_root(Board::new(), Disc::Black);
        for i in 1..=30u32 {
            tree.simulate(&UniformEvaluator, 4.0);
            assert_eq!(tree.visits(), i);
        }
        // Every legal move stays represented after arbitrary simulation.
        assert_eq!(tree.child_count(), Some(4));
    }

    #[test]
    fn test_terminal_value_fixed() {
        let board = Board::from_string(&format!("{}{}", "X".repeat(33), "O".repeat(31))).unwrap();
        let mut tree = SearchTree::new_root(board, Disc::Black);
        for _ in 0..3 {
            assert_eq!(tree.simulate(&UniformEvaluator, 4.0), 1.0);
        }
        let mut losing = SearchTree::new_root(board, Disc::White);
        assert_eq!(losing.simulate(&UniformEvaluator, 4.0), -1.0);
        assert!(tree.children.is_none());
    }

    #[test]
    fn test_player_returns_legal_move() {
        let board = Board::new();
        let mut player = PuctPlayer::with_config(
            Disc::Black,
            UniformEvaluator,
            PuctConfig {
                sims_per_turn: 50,
                ..Default::default()
            },
        );
        let sq = player.get_move(&board, None, None).unwrap();
        assert!(board.find_moves(Disc::Black).contains(sq));
    }

    #[test]
    fn test_player_passes_without_moves() {
        let board = Board::from_string(&format!("{}{}", "X".repeat(32), "O".repeat(32))).unwrap();
        let mut player = PuctPlayer::new(Disc::Black, UniformEvaluator);
        assert_eq!(player.get_move(&board, None, None), None);
    }

    #[test]
    fn test_tensor_orientation() {
        let board = Board::new();
        let (mine, opp) = board.player_view(Disc::Black);
        let tensor = BoardTensor::from_view(mine, opp);
        // Black's discs (e4, d5) fill plane 0; White's (d4, e5) plane 1.
        assert_eq!(tensor.0[3][4][0], 1.0);
        assert_eq!(tensor.0[4][3][0], 1.0);
        assert_eq!(tensor.0[3][3][1], 1.0);
        assert_eq!(tensor.0[4][4][1], 1.0);
        assert_eq!(tensor.0[0][0][0], 0.0);
    }
}

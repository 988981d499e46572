//! WTHOR historical game-record parsing.
//!
//! A database file is a 16-byte header followed by fixed 68-byte game
//! records. Each record carries an 8-byte game header (bytes 6 and 7 are
//! the real and theoretical final scores) and 60 move bytes encoding a
//! square as `10 * (y + 1) + (x + 1)`. A zero byte terminates the record
//! and emits no state. Black moves first; a side with no legal reply
//! simply passes, so consecutive move bytes can belong to the same color.

use anyhow::{Context, Result, bail, ensure};

use othello_core::board::Board;
use othello_core::disc::{Disc, GameOutcome};
use othello_core::square::Square;

/// Bytes of the per-file header.
pub const DB_HEADER_BYTES: usize = 16;

/// Bytes of one game record.
pub const GAME_BYTES: usize = 68;

/// Bytes of the per-game header inside a record.
pub const GAME_HEADER_BYTES: usize = 8;

/// One position/move pair from a replayed game.
#[derive(Debug, Clone, Copy)]
pub struct GameState {
    /// The position before the move.
    pub board: Board,
    /// The side making the move.
    pub player: Disc,
    /// The move played.
    pub mv: Square,
}

impl GameState {
    /// Converts the state to a training tuple: the mover's `(mine, opp)`
    /// bitboard planes, the move index `x + 8 * y`, and the game outcome
    /// from the mover's perspective (+1 win, 0 draw, -1 loss).
    pub fn to_data(&self, outcome: GameOutcome) -> (u64, u64, u8, i8) {
        let (mine, opp) = self.board.player_view(self.player);
        let value = if outcome == GameOutcome::Draw {
            0
        } else if outcome == self.player.winning_outcome() {
            1
        } else {
            -1
        };
        (mine.bits(), opp.bits(), self.mv.index() as u8, value)
    }
}

/// A fully replayed game record.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Real final score from the record header.
    pub real_score: u8,
    /// Theoretical final score from the record header.
    pub theoretical_score: u8,
    /// All position/move pairs, in play order.
    pub states: Vec<GameState>,
    /// Outcome of the replayed final position.
    pub outcome: GameOutcome,
}

/// Decodes one move byte into a square.
fn parse_move_byte(byte: u8) -> Result<Square> {
    let x = byte % 10;
    let y = byte / 10;
    ensure!(
        (1..=8).contains(&x) && (1..=8).contains(&y),
        "move byte {byte} is not a board square"
    );
    Ok(Square::from_file_rank(x - 1, y - 1))
}

/// Replays one 68-byte game record from the starting position.
pub fn parse_game(game_bytes: &[u8]) -> Result<GameRecord> {
    ensure!(
        game_bytes.len() == GAME_BYTES,
        "game record is {} bytes, expected {GAME_BYTES}",
        game_bytes.len()
    );

    let real_score = game_bytes[6];
    let theoretical_score = game_bytes[7];

    let mut board = Board::new();
    let mut player = Disc::Black;
    let mut states = Vec::new();

    for (ply, &byte) in game_bytes[GAME_HEADER_BYTES..].iter().enumerate() {
        if byte == 0 {
            break;
        }
        let sq = parse_move_byte(byte).with_context(|| format!("ply {ply}"))?;
        if !board.find_moves(player).contains(sq) {
            bail!("illegal move {sq} at ply {ply}");
        }

        states.push(GameState {
            board,
            player,
            mv: sq,
        });
        board = board.resolve_move(sq, player);

        // The record omits passes: keep the same mover when the other
        // side has no reply.
        if board.has_moves(player.opposite()) {
            player = player.opposite();
        }
    }

    Ok(GameRecord {
        real_score,
        theoretical_score,
        states,
        outcome: board.winning_player(),
    })
}

/// Parses a whole database file body.
pub fn parse_db(bytes: &[u8]) -> Result<Vec<GameRecord>> {
    ensure!(
        bytes.len() >= DB_HEADER_BYTES,
        "database shorter than its {DB_HEADER_BYTES}-byte header"
    );

    let data = &bytes[DB_HEADER_BYTES..];
    data.chunks_exact(GAME_BYTES)
        .enumerate()
        .map(|(i, chunk)| parse_game(chunk).with_context(|| format!("game {i}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_move(sq: Square) -> u8 {
        (10 * (sq.rank() + 1) + sq.file() + 1) as u8
    }

    /// A complete 60-move game known to end 57-7 for Black, including
    /// positions where one side passes implicitly.
    const GAME: &str = "e6f4c3c4d3d6e3d2f3f5c1c2b4b3a3e2c5c6f6g5g4a2a1a4f2h5g3f7h6h3f8f1e1d1h4h7a5g7h8g6g1g8b6e8b5g2d8b7a6h2e7d7c8a8a7b8c7h1b2b1";

    fn game_record_bytes() -> Vec<u8> {
        let mut record = vec![0u8; GAME_BYTES];
        record[6] = 57;
        for (i, chunk) in GAME.as_bytes().chunks(2).enumerate() {
            let sq: Square = std::str::from_utf8(chunk).unwrap().parse().unwrap();
            record[GAME_HEADER_BYTES + i] = encode_move(sq);
        }
        record
    }

    #[test]
    fn test_parse_move_byte() {
        assert_eq!(parse_move_byte(11).unwrap(), Square::A1);
        assert_eq!(parse_move_byte(88).unwrap(), Square::H8);
        assert_eq!(parse_move_byte(65).unwrap(), Square::E6);
        assert!(parse_move_byte(9).is_err());
        assert!(parse_move_byte(90).is_err());
        assert!(parse_move_byte(19).is_err());
    }

    #[test]
    fn test_parse_full_game() {
        let record = parse_game(&game_record_bytes()).unwrap();
        assert_eq!(record.real_score, 57);
        assert_eq!(record.states.len(), 60);
        assert_eq!(record.outcome, GameOutcome::BlackWins);

        // Replay the last state one step forward to check the final board.
        let last = record.states.last().unwrap();
        let final_board = last.board.resolve_move(last.mv, last.player);
        assert_eq!(final_board.black.count(), 57);
        assert_eq!(final_board.white.count(), 7);
    }

    #[test]
    fn test_zero_byte_terminates() {
        let mut record = game_record_bytes();
        // Truncate the game after ten moves.
        for b in &mut record[GAME_HEADER_BYTES + 10..] {
            *b = 0;
        }
        let parsed = parse_game(&record).unwrap();
        assert_eq!(parsed.states.len(), 10);
    }

    #[test]
    fn test_illegal_move_rejected() {
        let mut record = game_record_bytes();
        record[GAME_HEADER_BYTES] = encode_move(Square::A1); // a1 is not legal at start
        assert!(parse_game(&record).is_err());
    }

    #[test]
    fn test_to_data_values() {
        let record = parse_game(&game_record_bytes()).unwrap();
        let first = &record.states[0];
        let (mine, opp, mv, value) = first.to_data(record.outcome);
        assert_eq!(mine, Board::new().black.bits());
        assert_eq!(opp, Board::new().white.bits());
        assert_eq!(mv, Square::E6.index() as u8);
        // The first mover is Black, who wins this game.
        assert_eq!(value, 1);
    }

    #[test]
    fn test_parse_db_layout() {
        let mut bytes = vec![0u8; DB_HEADER_BYTES];
        bytes.extend_from_slice(&game_record_bytes());
        bytes.extend_from_slice(&game_record_bytes());
        let games = parse_db(&bytes).unwrap();
        assert_eq!(games.len(), 2);
        assert!(parse_db(&bytes[..8]).is_err());
    }
}

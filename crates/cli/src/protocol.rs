//! The tournament line protocol.
//!
//! The harness starts this process with a color argument, reads one
//! `Player ready: <name> (<color>)` line, then repeats: it writes
//! `opp_x opp_y ms_left` (negative x = the opponent passed, budget -1 =
//! unlimited) and reads back `<x> <y>` (`-1 -1` for a pass). Anything
//! else on stdout would corrupt the channel, so logging uses stderr.

use std::fmt;
use std::io::{self, BufRead, Write};

use tracing::debug;

use othello_core::board::Board;
use othello_core::disc::Disc;
use othello_core::players::Player;
use othello_core::square::Square;

/// Fatal protocol failures. Per the driver contract these terminate the
/// player process with a nonzero exit.
#[derive(Debug)]
pub enum ProtocolError {
    /// Reading stdin or writing stdout failed.
    Io(io::Error),
    /// An input line did not parse as `opp_x opp_y ms_left`.
    Malformed(String),
    /// The harness relayed a move that is not legal on our board.
    IllegalOpponentMove(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Io(err) => write!(f, "I/O error: {err}"),
            ProtocolError::Malformed(line) => write!(f, "malformed input line: {line:?}"),
            ProtocolError::IllegalOpponentMove(line) => {
                write!(f, "illegal opponent move: {line:?}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<io::Error> for ProtocolError {
    fn from(err: io::Error) -> Self {
        ProtocolError::Io(err)
    }
}

fn color_word(color: Disc) -> &'static str {
    match color {
        Disc::Black => "black",
        _ => "white",
    }
}

/// Runs the request/reply loop until the harness closes stdin.
pub fn run_player(
    mut player: Box<dyn Player>,
    color: Disc,
    name: &str,
) -> Result<(), ProtocolError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "Player ready: {name} ({})", color_word(color))?;
    out.flush()?;

    let mut board = Board::new();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(x), Some(y), Some(ms), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ProtocolError::Malformed(line));
        };
        let (Ok(opp_x), Ok(opp_y), Ok(ms_left)) =
            (x.parse::<i64>(), y.parse::<i64>(), ms.parse::<i64>())
        else {
            return Err(ProtocolError::Malformed(line));
        };

        let ms_left = if ms_left < 0 { None } else { Some(ms_left as u64) };

        let opponent_move = if opp_x < 0 {
            None
        } else {
            if !(0..8).contains(&opp_x) || !(0..8).contains(&opp_y) {
                return Err(ProtocolError::Malformed(line));
            }
            let sq = Square::from_file_rank(opp_x as u8, opp_y as u8);
            if !board.find_moves(color.opposite()).contains(sq) {
                return Err(ProtocolError::IllegalOpponentMove(line));
            }
            board = board.resolve_move(sq, color.opposite());
            Some(sq)
        };

        let mv = player.get_move(&board, opponent_move, ms_left);
        match mv {
            Some(sq) => {
                debug!("playing {sq}");
                board = board.resolve_move(sq, color);
                writeln!(out, "{} {}", sq.file(), sq.rank())?;
            }
            None => {
                debug!("passing");
                writeln!(out, "-1 -1")?;
            }
        }
        out.flush()?;
    }

    Ok(())
}

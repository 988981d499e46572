//! Subprocess engine speaking the tournament line protocol.
//!
//! The child is started with a single `Black`/`White` argument, announces
//! itself with one `Player ready` line, then answers `opp_x opp_y ms_left`
//! requests with `x y` replies (`-1 -1` for a pass). An unparseable reply
//! is reported as a pass; the game driver converts an illegal pass into a
//! forfeit.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::{error, info};

use othello_core::board::Board;
use othello_core::disc::Disc;
use othello_core::players::Player;
use othello_core::square::Square;
use othello_core::types::TimeBudget;

use crate::error::{MatchError, Result};

pub struct ExternalPlayer {
    color: Disc,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ExternalPlayer {
    /// Spawns the engine process and consumes its ready line.
    pub fn spawn(command: &str, color: Disc) -> Result<Self> {
        let argv = shlex::split(command)
            .ok_or_else(|| MatchError::Config(format!("unparseable command: {command}")))?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| MatchError::Config("empty engine command".to_string()))?;

        let color_arg = match color {
            Disc::Black => "Black",
            _ => "White",
        };

        let mut child = Command::new(program)
            .args(args)
            .arg(color_arg)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|err| MatchError::Engine(format!("failed to start {program}: {err}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MatchError::Engine("engine stdin unavailable".to_string()))?;
        let mut stdout = BufReader::new(
            child
                .stdout
                .take()
                .ok_or_else(|| MatchError::Engine("engine stdout unavailable".to_string()))?,
        );

        let mut ready = String::new();
        stdout.read_line(&mut ready)?;
        if ready.is_empty() {
            return Err(MatchError::Engine(
                "engine exited before announcing readiness".to_string(),
            ));
        }
        info!("{}", ready.trim_end());

        Ok(ExternalPlayer {
            color,
            child,
            stdin,
            stdout,
        })
    }
}

impl Player for ExternalPlayer {
    fn color(&self) -> Disc {
        self.color
    }

    fn get_move(
        &mut self,
        _board: &Board,
        opponent_move: Option<Square>,
        ms_left: TimeBudget,
    ) -> Option<Square> {
        let (opp_x, opp_y) = match opponent_move {
            Some(sq) => (sq.file() as i64, sq.rank() as i64),
            None => (-1, -1),
        };
        let ms = ms_left.map(|ms| ms as i64).unwrap_or(-1);

        if let Err(err) = writeln!(self.stdin, "{opp_x} {opp_y} {ms}")
            .and_then(|_| self.stdin.flush())
        {
            error!("failed to write to engine: {err}");
            return None;
        }

        let mut reply = String::new();
        if let Err(err) = self.stdout.read_line(&mut reply) {
            error!("failed to read from engine: {err}");
            return None;
        }

        let mut parts = reply.split_whitespace();
        let (Some(x), Some(y)) = (parts.next(), parts.next()) else {
            error!("engine reply malformed: {reply:?}");
            return None;
        };
        let (Ok(x), Ok(y)) = (x.parse::<i64>(), y.parse::<i64>()) else {
            error!("engine reply malformed: {reply:?}");
            return None;
        };

        if x < 0 {
            return None;
        }
        if !(0..8).contains(&x) || !(0..8).contains(&y) {
            error!("engine reply out of range: {reply:?}");
            return None;
        }
        Some(Square::from_file_rank(x as u8, y as u8))
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

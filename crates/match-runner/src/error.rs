//! Error types for the match runner.

use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, MatchError>;

/// Fatal errors aborting a match.
#[derive(Debug)]
pub enum MatchError {
    /// Invalid runner configuration.
    Config(String),
    /// An external engine failed to start or shut down.
    Engine(String),
    /// Underlying I/O failure.
    Io(io::Error),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::Config(msg) => write!(f, "configuration error: {msg}"),
            MatchError::Engine(msg) => write!(f, "engine error: {msg}"),
            MatchError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for MatchError {}

impl From<io::Error> for MatchError {
    fn from(err: io::Error) -> Self {
        MatchError::Io(err)
    }
}

//! The CLI binary's own small `Error` enum, in the same manual style
//! `vasm`/`vex`'s binaries use: a plain enum over the lower-level error
//! types it can receive, with a hand-written `Display` impl. No `anyhow`/
//! `thiserror` — matching the rest of the workspace.

use std::fmt;
use std::io;

use goif_core::error::GoifError;

#[derive(Debug)]
pub enum Error {
    Goif(GoifError),
    /// I/O failure on the REPL's own prompt/input handling, distinct from
    /// the program's `STDIN`/`STDOUT`/`STDERR` (those go through
    /// [`goif_core::streams::Streams`] and surface as `GoifError`).
    ReplIo(io::Error),
}

impl From<GoifError> for Error {
    fn from(err: GoifError) -> Error {
        Error::Goif(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Goif(err) => write!(f, "{}", err),
            Error::ReplIo(err) => write!(f, "Error: {}", err),
        }
    }
}

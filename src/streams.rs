//! The process-wide I/O the evaluator touches (§6): `STDIN`/`STDOUT`/`STDERR`.
//!
//! Binding these to the real process streams is explicitly a `cli`-crate
//! concern (§1's "external collaborators"); the core only depends on this
//! trait, so tests can swap in an in-memory fixture.

use std::io;

pub trait Streams {
    /// Blocks for one line from `STDIN`, newline stripped.
    fn read_stdin_line(&mut self) -> io::Result<String>;
    fn write_stdout(&mut self, text: &str) -> io::Result<()>;
    fn write_stderr(&mut self, text: &str) -> io::Result<()>;
}

/// Binds [`Streams`] to the real process standard streams.
#[derive(Default)]
pub struct ProcessStreams;

impl Streams for ProcessStreams {
    fn read_stdin_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::BufRead::read_line(&mut io::stdin().lock(), &mut line)?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn write_stdout(&mut self, text: &str) -> io::Result<()> {
        use io::Write;
        write!(io::stdout(), "{}", text)
    }

    fn write_stderr(&mut self, text: &str) -> io::Result<()> {
        use io::Write;
        write!(io::stderr(), "{}", text)
    }
}

/// An in-memory [`Streams`] for tests: `STDIN` is a fixed queue of lines,
/// `STDOUT`/`STDERR` are captured buffers.
#[derive(Default)]
pub struct MemoryStreams {
    pub stdin: std::collections::VecDeque<String>,
    pub stdout: String,
    pub stderr: String,
}

impl MemoryStreams {
    pub fn with_stdin(lines: impl IntoIterator<Item = impl Into<String>>) -> MemoryStreams {
        MemoryStreams {
            stdin: lines.into_iter().map(Into::into).collect(),
            ..MemoryStreams::default()
        }
    }
}

impl Streams for MemoryStreams {
    fn read_stdin_line(&mut self) -> io::Result<String> {
        self.stdin
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "STDIN exhausted"))
    }

    fn write_stdout(&mut self, text: &str) -> io::Result<()> {
        self.stdout.push_str(text);
        Ok(())
    }

    fn write_stderr(&mut self, text: &str) -> io::Result<()> {
        self.stderr.push_str(text);
        Ok(())
    }
}

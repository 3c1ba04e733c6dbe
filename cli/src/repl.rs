//! The interactive REPL (§6): prompt `>>> `, one statement per line,
//! evaluated with the transient one-past-the-end program counter
//! ([`Evaluator::resume`]) and a namespace that survives across lines.
//! `LOAD <path> <ALIAS>` is special-cased here (only the REPL holds a
//! [`SourceProvider`] at this point) rather than handled by
//! [`Program::compile_repl_line`].

use std::collections::HashMap;
use std::io::{self, Write};

use goif_core::error::GoifError;
use goif_core::evaluator::Evaluator;
use goif_core::loader::Program;
use goif_core::streams::ProcessStreams;
use goif_core::value::Value;

use crate::error::Error;
use crate::source::FileSourceProvider;

const PROMPT: &str = ">>> ";

pub fn run(mut program: Program, args: Vec<String>, unsafe_jump: bool, debug: bool) -> Result<(), Error> {
    let mut vars: HashMap<String, Value> = HashMap::new();
    for (i, arg) in args.iter().enumerate() {
        vars.insert(format!("ARG{}", i + 1), Value::Str(arg.clone()));
    }

    // Only used as a `SourceProvider` for REPL `LOAD`s; the file already
    // loaded as `MAIN` (or the REPL's synthetic empty root) has no path to
    // resolve further `LOAD`s against here, so REPL-level `LOAD` paths are
    // always resolved relative to the current directory.
    let mut provider = FileSourceProvider::new(None);

    let stdin = io::stdin();
    loop {
        print!("{}", PROMPT);
        io::stdout().flush().map_err(Error::ReplIo)?;

        let mut raw = String::new();
        let bytes_read = stdin.read_line(&mut raw).map_err(Error::ReplIo)?;
        if bytes_read == 0 {
            return Ok(());
        }
        let line = raw.trim_end_matches(|c| c == '\n' || c == '\r');

        if let Some((path, alias)) = parse_repl_load(line) {
            if let Err(err) = program.load_additional(&mut provider, &path, &alias, goif_core::constants::FID_MAIN) {
                eprintln!("{}", GoifError::from(err));
            }
            continue;
        }

        let exits_session = line.trim().eq_ignore_ascii_case("RETURN");

        let stmt = match program.compile_repl_line(line) {
            Ok(Some(stmt)) => stmt,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{}", GoifError::from(err));
                continue;
            }
        };

        let mut eval = Evaluator::resume(&program, vars, unsafe_jump, debug);
        let mut streams = ProcessStreams::default();
        let outcome = eval.run_one(&stmt, &mut streams).and_then(|()| eval.run(&mut streams));
        vars = eval.into_vars();

        if let Err(err) = outcome {
            eprintln!("{}", GoifError::from(err));
        }

        if exits_session {
            return Ok(());
        }
    }
}

/// Recognizes a REPL-typed `LOAD <path> <ALIAS>` (§6). Unlike a stored
/// file's `LOAD`, this is checked against the raw entered text directly,
/// since `Program::compile_repl_line` never sees `LOAD` lines (the loader's
/// ordinary file compilation strips them before parsing ever runs).
fn parse_repl_load(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    let mut words = trimmed.split_whitespace();
    let keyword = words.next()?;
    if !keyword.eq_ignore_ascii_case("LOAD") {
        return None;
    }
    let path = words.next()?.to_owned();
    let alias = words.next()?.to_ascii_uppercase();
    if words.next().is_some() {
        return None;
    }
    Some((path, alias))
}

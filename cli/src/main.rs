//! Command-line interpreter and REPL for the GOIF language (§6).
//!
//! Knows nothing about expression evaluation or the loader's internals; it
//! only drives `goif-core`'s public `Loader`/`Evaluator` API and supplies
//! the concrete [`Streams`]/[`SourceProvider`] implementations the core
//! reads and writes through.

#[macro_use]
extern crate clap;

mod error;
mod repl;
mod source;

use std::path::PathBuf;
use std::process;

use clap::Arg;

use goif_core::error::GoifError;
use goif_core::evaluator::Evaluator;
use goif_core::loader::{load, Program};
use goif_core::streams::ProcessStreams;

use error::Error;
use source::FileSourceProvider;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("debug")
                .short("d")
                .help("Prints each executed statement and significant events"),
        )
        .arg(
            Arg::with_name("interactive")
                .short("i")
                .help("Starts an interactive REPL instead of running to completion"),
        )
        .arg(
            Arg::with_name("unsafe_jump")
                .short("j")
                .help("Allows the call stack to exceed 255 frames"),
        )
        .arg(
            Arg::with_name("PROGRAM")
                .help("The GOIF source file to run")
                .required_unless("interactive")
                .index(1),
        )
        .arg(
            Arg::with_name("ARGS")
                .help("Bound at startup as ARG1..ARGN")
                .multiple(true)
                .index(2),
        )
        .get_matches();

    let debug = matches.is_present("debug");
    let interactive = matches.is_present("interactive");
    let unsafe_jump = matches.is_present("unsafe_jump");
    let program_path = matches.value_of("PROGRAM").map(PathBuf::from);
    let args: Vec<String> = matches
        .values_of("ARGS")
        .map(|values| values.map(str::to_owned).collect())
        .unwrap_or_default();

    let result = if interactive {
        run_interactive(program_path, args, unsafe_jump, debug)
    } else {
        run_script(program_path.expect("required_unless(\"interactive\") enforced by clap"), args, unsafe_jump, debug)
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run_script(path: PathBuf, args: Vec<String>, unsafe_jump: bool, debug: bool) -> Result<(), Error> {
    let program = load_program(Some(path))?;
    let mut evaluator = Evaluator::new(&program, &args, unsafe_jump, debug);
    let mut streams = ProcessStreams::default();
    evaluator.run(&mut streams).map_err(GoifError::from)?;
    Ok(())
}

fn run_interactive(path: Option<PathBuf>, args: Vec<String>, unsafe_jump: bool, debug: bool) -> Result<(), Error> {
    let program = load_program(path)?;
    repl::run(program, args, unsafe_jump, debug)
}

fn load_program(path: Option<PathBuf>) -> Result<Program, Error> {
    let mut provider = FileSourceProvider::new(path);
    load(&mut provider).map_err(GoifError::from).map_err(Error::from)
}

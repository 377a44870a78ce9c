//! The vgtree command-line interface.
//!
//! Reads a memcheck log from a file or standard input, parses it, and
//! prints the errors grouped by shared call stacks. Thin wiring only; all
//! of the actual work happens in the library.

pub mod args;
pub mod output;

use std::io::{self, BufRead, Write};
use std::path::Path;

use clap::Parser;
use miette::{miette, IntoDiagnostic, Result};

use crate::parsed_error::ParsedError;
use crate::parser;
use crate::source_lookup::FileReader;
use crate::tree::SharedStackNode;

use args::VgtreeArgs;

/// The main entry point for the CLI.
pub fn run() -> Result<()> {
    let args = VgtreeArgs::parse();

    let mut reader = FileReader::new();
    for path in &args.path {
        reader.add_prefix(path.as_path());
    }

    let lines = read_log(&args, &mut reader)?;
    let outcome = parser::parse(&lines)?;

    if args.json {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &outcome).into_diagnostic()?;
        writeln!(stdout).into_diagnostic()?;
        return Ok(());
    }

    let mut out = output::stdout();
    if args.unknowns && !outcome.unknowns.is_empty() {
        output::print_unknowns(&mut out, &outcome.unknowns).into_diagnostic()?;
    }

    let errors: Vec<&ParsedError> = outcome.errors.iter().collect();
    let tree = SharedStackNode::build(errors, args.direction.into());
    output::print_tree(&mut out, &tree, &mut reader, args.sources).into_diagnostic()?;

    Ok(())
}

/// Read the log as a list of lines, from standard input or through the
/// file reader.
fn read_log(args: &VgtreeArgs, reader: &mut FileReader) -> Result<Vec<String>> {
    if args.log == "-" {
        let lines: io::Result<Vec<String>> = io::stdin().lock().lines().collect();
        return lines.into_diagnostic();
    }

    // Without an explicit search path, guess that source files live near
    // the log.
    if args.path.is_empty() {
        if let Some(parent) = Path::new(&args.log)
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            reader.add_prefix(parent);
        }
    }

    reader
        .read_file(&args.log)
        .ok_or_else(|| miette!("could not read log file '{}'", args.log))
}

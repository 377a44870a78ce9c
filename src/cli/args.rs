//! Command-line arguments for the vgtree CLI, built with `clap`'s derive
//! support.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::stack::Direction;

#[derive(Debug, Parser)]
#[command(
    name = "vgtree",
    version,
    about = "Parse a Valgrind memcheck log and browse its errors as a tree of shared call stacks."
)]
pub struct VgtreeArgs {
    /// The Valgrind log file. Pass '-' to read from standard input.
    pub log: String,

    /// Directory to search for source code. May be given more than once.
    /// Defaults to the directory containing the log file.
    #[arg(short, long = "path")]
    pub path: Vec<PathBuf>,

    /// Which end of the call stacks to group from.
    #[arg(long, value_enum, default_value = "bottom")]
    pub direction: GroupDirection,

    /// Emit the parse result as JSON instead of a tree.
    #[arg(long)]
    pub json: bool,

    /// Print the log lines the parser did not recognize.
    #[arg(long)]
    pub unknowns: bool,

    /// Show the nearest source line for each group, when the file can be
    /// found.
    #[arg(long)]
    pub sources: bool,
}

/// CLI spelling of the grouping direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupDirection {
    /// Group by the frames where errors were detected.
    Top,
    /// Group by entry point and call path.
    Bottom,
}

impl From<GroupDirection> for Direction {
    fn from(direction: GroupDirection) -> Self {
        match direction {
            GroupDirection::Top => Direction::FromTop,
            GroupDirection::Bottom => Direction::FromBottom,
        }
    }
}

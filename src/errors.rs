//! Failure states of the parsing core.
//!
//! A log with zero recognizable errors is still a successful parse; these
//! variants cover the cases where there is nothing to parse at all.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    /// The caller handed over an empty line list.
    #[error("the log contains no lines")]
    #[diagnostic(help("pass the full contents of a Valgrind memcheck log"))]
    EmptyLog,

    /// No line in the input carried the `==<pid>==` marker.
    #[error("no Valgrind output found in the log")]
    #[diagnostic(help(
        "memcheck lines start with an ==<pid>== marker; was this log produced by Valgrind?"
    ))]
    NoValgrindLines,
}

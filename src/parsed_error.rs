//! One complete error parsed from a memcheck log.

use std::fmt;

use serde::Serialize;

use crate::stack::{Direction, Stack, StackFrame};

/// The allocation or deallocation event related to an error.
///
/// Valgrind prints these as a second call stack under an explanatory
/// header, for example where a block that was read after being freed was
/// originally allocated. The stack may be empty when the log was truncated
/// inside the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSource {
    /// The header line, verbatim.
    pub kind: String,
    /// Where the allocation or deallocation happened.
    pub stack: Stack,
}

/// A complete error parsed from the log: a diagnostic kind, the call stack
/// where the error was detected, and possibly the source of the memory
/// involved.
///
/// Instances are assembled by the parser and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedError {
    /// The diagnostic line, verbatim, e.g. `Invalid read of size 4`.
    pub kind: String,
    error_stack: Stack,
    source: Option<ErrorSource>,
}

impl ParsedError {
    /// A new error of the given kind with empty call stacks.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            error_stack: Stack::new(),
            source: None,
        }
    }

    /// Set the location where the error was detected. The line should match
    /// the top-frame pattern.
    pub fn set_location(&mut self, line: &str) {
        self.error_stack.set_location(StackFrame::from_line(line));
    }

    /// Add a caller to the error call stack.
    pub fn add_caller(&mut self, line: &str) {
        self.error_stack.add_caller(StackFrame::from_line(line));
    }

    /// Record the source header for this error. Starts an empty source
    /// stack.
    pub fn set_source_kind(&mut self, kind: impl Into<String>) {
        self.source = Some(ErrorSource {
            kind: kind.into(),
            stack: Stack::new(),
        });
    }

    /// Set the location of the source event. No-op unless a source header
    /// was recorded first.
    pub fn set_source_location(&mut self, line: &str) {
        if let Some(source) = &mut self.source {
            source.stack.set_location(StackFrame::from_line(line));
        }
    }

    /// Add a caller to the source call stack. No-op unless a source header
    /// was recorded first.
    pub fn add_source_caller(&mut self, line: &str) {
        if let Some(source) = &mut self.source {
            source.stack.add_caller(StackFrame::from_line(line));
        }
    }

    pub fn error_stack(&self) -> &Stack {
        &self.error_stack
    }

    pub fn source(&self) -> Option<&ErrorSource> {
        self.source.as_ref()
    }

    /// The error-stack frame at `index`, counted from the chosen end.
    pub fn frame(&self, index: usize, direction: Direction) -> Option<&StackFrame> {
        self.error_stack.frame(index, direction)
    }

    /// True when both errors carry a frame at `index` and those frames are
    /// equal. A stack that is too short on either side compares unequal.
    pub fn shares_frame_with(&self, other: &ParsedError, index: usize, direction: Direction) -> bool {
        match (self.frame(index, direction), other.frame(index, direction)) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => false,
        }
    }

    /// A longer, multi-line rendering of this error.
    pub fn info(&self) -> String {
        let mut info = format!("Type: {}\n\nLocation:\n", self.kind);
        for frame in self.error_stack.frames() {
            info.push_str(&format!("    {frame}\n"));
        }
        if let Some(source) = &self.source {
            info.push_str(&format!("\nSource: {}\n", source.kind));
            for frame in source.stack.frames() {
                info.push_str(&format!("    {frame}\n"));
            }
        }
        info
    }
}

impl fmt::Display for ParsedError {
    /// One line: the error kind and the innermost frame.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_stack.frame(0, Direction::FromTop) {
            Some(top) => write!(f, "{} @ {}", self.kind, top),
            None => write!(f, "{}", self.kind),
        }
    }
}

//! Call stacks and the frames they are made of.
//!
//! A [`StackFrame`] holds the fields extracted from one stack line of a
//! memcheck log. A [`Stack`] is the ordered sequence of frames printed for
//! one error or one allocation source, innermost frame first, and can be
//! indexed from either end through a [`Direction`].

use std::fmt;

use serde::Serialize;

use crate::patterns::PATTERNS;

/// Which end of a call stack counts as index zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Index 0 is the innermost frame, where the error was detected.
    FromTop,
    /// Index 0 is the outermost frame, typically the process entry point.
    FromBottom,
}

/// A single frame within a call stack.
///
/// Valgrind does not always know every field. A frame from a stripped
/// binary carries a library but no file or line; a frame it could not
/// resolve at all carries nothing but the address. Absent fields are
/// `None`, never the empty string.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StackFrame {
    pub address: Option<String>,
    pub method: Option<String>,
    pub arguments: Option<String>,
    pub modifier: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub library: Option<String>,
}

impl StackFrame {
    /// Extract a frame from one stack line of the log.
    ///
    /// A line that does not match the frame grammar yields a frame with
    /// every field unset.
    pub fn from_line(line: &str) -> Self {
        let Some(caps) = PATTERNS.is_any_stack_frame.captures(line) else {
            return Self::default();
        };

        let field = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().trim_end())
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };

        Self {
            address: field("address"),
            method: field("method"),
            arguments: field("arguments"),
            modifier: field("modifier"),
            file: field("file"),
            // The pattern only admits digits here; a value too large for
            // u32 leaves the field unset.
            line: caps.name("line").and_then(|m| m.as_str().parse().ok()),
            library: field("library"),
        }
    }

    /// A frame that exists only to label a tree node, such as the root of a
    /// grouping tree. Carries a method name and nothing else.
    pub fn synthetic(label: &str) -> Self {
        Self {
            method: Some(label.to_string()),
            ..Self::default()
        }
    }

    /// A human readable description of where this frame points.
    pub fn file_location(&self) -> String {
        match (&self.file, &self.line, &self.library, &self.address) {
            (Some(file), Some(line), _, _) => format!("{file}:{line}"),
            (Some(file), None, _, _) => file.clone(),
            (None, _, Some(library), Some(address)) => format!("{library}@{address}"),
            (None, _, Some(library), None) => library.clone(),
            _ => String::new(),
        }
    }

    /// A human readable description of the method this frame points into.
    pub fn full_method(&self) -> String {
        match (&self.method, &self.arguments) {
            (Some(method), Some(arguments)) => format!("{method}{arguments}"),
            (Some(method), None) => method.clone(),
            _ => String::new(),
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_location(), self.full_method())
    }
}

/// Two frames are equal when they name the same place in the program. The
/// instruction address is deliberately left out; it is too specific to be
/// a useful grouping key.
impl PartialEq for StackFrame {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.arguments == other.arguments
            && self.file == other.file
            && self.line == other.line
            && self.library == other.library
    }
}

impl Eq for StackFrame {}

/// An ordered call stack, innermost frame first.
///
/// Built by one [`Stack::set_location`] followed by any number of
/// [`Stack::add_caller`] calls, and never reordered afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stack {
    frames: Vec<StackFrame>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establish the innermost frame, index 0.
    pub fn set_location(&mut self, frame: StackFrame) {
        if self.frames.is_empty() {
            self.frames.push(frame);
        } else {
            self.frames[0] = frame;
        }
    }

    /// Append the next caller, one step further out.
    pub fn add_caller(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    /// The frame at `index` counted from the chosen end, or `None` when the
    /// stack is too short.
    pub fn frame(&self, index: usize, direction: Direction) -> Option<&StackFrame> {
        match direction {
            Direction::FromTop => self.frames.get(index),
            Direction::FromBottom => {
                let length = self.frames.len();
                if index < length {
                    self.frames.get(length - 1 - index)
                } else {
                    None
                }
            }
        }
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

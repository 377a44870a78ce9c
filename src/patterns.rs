//! Line classification for Valgrind memcheck logs.
//!
//! Every line Valgrind prints starts with a `==<pid>==` marker, which is how
//! tool output is told apart from whatever the traced program writes to the
//! same stream. After that marker a line is either part of the startup
//! banner, the first line of a known error, the header of an allocation
//! "source" block, one line of a call stack, or something this crate does
//! not recognize.
//!
//! All recognition is regex based. The patterns are compiled once into a
//! [`Patterns`] value and shared through the [`struct@PATTERNS`] static;
//! classification itself is stateless.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// The shared, immutable pattern set. Safe to use from any thread.
    pub static ref PATTERNS: Patterns = Patterns::new();
}

/// Compiled regular expressions for every line shape memcheck emits.
///
/// The individual fields are public so tests can count matches per pattern;
/// library code goes through the helper methods below.
pub struct Patterns {
    /// Any line carrying the `==<pid>== ` marker.
    pub is_valgrind: Regex,
    /// Captures the content of a marked line, marker removed.
    pub strip_valgrind: Regex,
    /// Captures the process id inside the marker.
    pub read_pid: Regex,
    /// Startup banner lines that carry no error information.
    pub is_header: Regex,
    /// The innermost frame of a call stack, introduced by `at`.
    pub is_stack_frame_top: Regex,
    /// Any other frame of a call stack, introduced by `by`.
    pub is_stack_frame_caller: Regex,
    /// Either frame kind; carries the named capture groups for extraction.
    pub is_any_stack_frame: Regex,
    pub is_uninitialised_jump: Regex,
    pub is_invalid_read: Regex,
    pub is_invalid_write: Regex,
    pub is_mismatched_free: Regex,
    pub is_invalid_free: Regex,
    pub is_memory_loss: Regex,
    /// "Uninitialised value was created by a stack/heap allocation".
    pub is_allocation_origin: Regex,
    /// "Address 0x… is N bytes before/inside/after a block of size N …".
    pub is_block_description: Regex,
}

impl Patterns {
    pub fn new() -> Self {
        // A stack frame line is assembled by Valgrind from several pieces of
        // information, and not every piece is available for every frame. Two
        // typical lines:
        //
        //    at 0x400A10: set() (errorProducingApplication.cpp:37)
        //    by 0x4EBAFAF: ??? (in /usr/lib/x86_64-linux-gnu/libstdc++.so.6.0.19)
        //
        // The address in memory of the offending instruction.
        let address = r"(?P<address>0x[a-fA-F0-9]+): ";

        let anon_namespace = r"\(anonymous namespace\)";
        let unknown_method = r"\(\?\)+?";
        let proper_method = format!(r"(?P<method>(?:{anon_namespace})?[\w:=+*~&? \[\]<>.,]+) ?");

        // The method containing the instruction, or an unresolved placeholder.
        let method = format!("(?:(?:{unknown_method})|(?:{proper_method}))");

        // Argument list and any modifier, such as `const`, on the method.
        let arguments = r"(?P<arguments>(?:\([\w ,:*<>()&]*\))?) ";
        let modifier = r"(?P<modifier>[\w]*)? ?";

        // Valgrind prints either a source location with a line number or the
        // compiled unit (e.g. a .so file) containing the instruction.
        let file_and_line = r"(?P<file>[\w /.+-]+\.\w+):(?P<line>\d+)";
        let library = r"in (?P<library>[\w/.+_-]+)";
        let file_or_library = format!("(?:(?:{file_and_line})|(?:{library}))");

        let post_method = format!("(?:{arguments}{modifier})?");
        let frame = format!(r"{address}{method}(?:{post_method}\({file_or_library}\))?");

        // Memory loss records qualify the count with a certainty and may
        // split it into direct and indirect bytes:
        //
        //    80 (48 direct, 32 indirect) bytes in 1 blocks are possibly lost in loss record 2 of 2
        let direct_indirect = r"(?:\([\d,.]+ direct, [\d,.]+ indirect\))? ?";
        let bytes_blocks = r"bytes in [\d,.]+ blocks are ";
        let certainty = "(?:(?:possibly)|(?:definitely)) ";
        let loss_record = r"lost in loss record [\d,.]+ of [\d,.]+";

        // A source block explains where memory related to an error was
        // allocated or freed. Its header matches one of two shapes.
        let memory_location = "(?:(?:before)|(?:inside)|(?:after))";
        let memory_operation = "(?:(?:alloc'd)|(?:free'd))";

        Self {
            is_valgrind: compile(r"^==\d+== .*$"),
            strip_valgrind: compile(r"^==\d+== (.*)"),
            read_pid: compile(r"^==(\d+)== .*$"),
            is_header: compile(
                &[
                    ".*Memcheck, a memory error detector",
                    r".*Copyright \(C\) \d+-\d+, and GNU GPL'd, by Julian Seward et al.",
                    r".*Using Valgrind-\d+.\d+.\d+.* and LibVEX; rerun with -h for copyright info",
                    ".*Command: .*",
                ]
                .join("|"),
            ),
            is_stack_frame_top: compile(&format!("^.*at {frame}")),
            is_stack_frame_caller: compile(&format!("^.*by {frame}")),
            is_any_stack_frame: compile(&format!("^.*(?:(?:at)|(?:by)) {frame}")),
            is_uninitialised_jump: compile(
                r"^.*Conditional jump or move depends on uninitialised value\(s\)$",
            ),
            is_invalid_read: compile(r"^.*Invalid read of size \d+$"),
            is_invalid_write: compile(r"^.*Invalid write of size \d+$"),
            is_mismatched_free: compile(r"^.*Mismatched free\(\) / delete / delete \[\]"),
            is_invalid_free: compile(r"^.*Invalid free\(\) / delete / delete\[\] / realloc\(\)"),
            is_memory_loss: compile(&format!(
                r"^.*[\d,.]+ {direct_indirect}{bytes_blocks}{certainty}{loss_record}"
            )),
            is_allocation_origin: compile(
                r"^.*Uninitialised value was created by a (?:(?:stack)|(?:heap)) allocation",
            ),
            is_block_description: compile(&format!(
                r"^.*Address 0x[a-fA-F0-9]+ is \d+ bytes {memory_location} a block of size \d+ {memory_operation}"
            )),
        }
    }

    /// True if the line carries the `==<pid>==` marker.
    pub fn is_valgrind_line(&self, line: &str) -> bool {
        self.is_valgrind.is_match(line)
    }

    /// The content of a marked line with the marker removed and surrounding
    /// whitespace trimmed. `None` for lines without the marker. A line that
    /// is only the marker yields the empty string.
    pub fn strip_tag<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.strip_valgrind
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|content| content.as_str().trim())
    }

    /// The process id from a marked line.
    pub fn pid<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.read_pid
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|pid| pid.as_str())
    }

    /// True if the line is the first line of a known error kind.
    ///
    /// The listing of kinds may be incomplete. Errors not recognized here
    /// are reported back to the caller as unrecognized lines.
    pub fn is_error_start(&self, line: &str) -> bool {
        self.is_uninitialised_jump.is_match(line)
            || self.is_invalid_read.is_match(line)
            || self.is_invalid_write.is_match(line)
            || self.is_mismatched_free.is_match(line)
            || self.is_invalid_free.is_match(line)
            || self.is_memory_loss.is_match(line)
    }

    /// True if the line is the header of a known source block.
    pub fn is_source_start(&self, line: &str) -> bool {
        self.is_allocation_origin.is_match(line) || self.is_block_description.is_match(line)
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new()
    }
}

// The pattern strings are compile-time constants; a failure here is a bug
// in this module, not in caller input.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

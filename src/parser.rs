//! The memcheck log scanner.
//!
//! [`parse`] walks the raw line sequence once, front to back. Lines without
//! the `==<pid>==` marker are transport noise from the traced program and
//! are skipped outright. Marked lines drive a small state machine: skip the
//! banner, then repeatedly assemble one [`ParsedError`] from a diagnostic
//! line, its call stack and an optional source block, collecting every
//! marked line that fits no known shape into the unknowns list.
//!
//! All state lives in a [`Cursor`] scoped to one call, so a parse is a pure
//! transformation of its input.

use serde::Serialize;

use crate::errors::ParseError;
use crate::parsed_error::ParsedError;
use crate::patterns::PATTERNS;

/// Everything one parse produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    /// The errors found, in log order.
    pub errors: Vec<ParsedError>,
    /// Marked lines the parser did not recognize, in log order, marker
    /// stripped. Lines that were only the marker are not recorded.
    pub unknowns: Vec<String>,
    /// The process id from the first marked line. Kept as text; Valgrind
    /// pids have no arithmetic meaning here.
    pub pid: String,
}

/// Parse the contents of a memcheck log.
///
/// Returns an error for input that contains no Valgrind output at all;
/// a well-formed log with zero errors parses successfully. When a
/// diagnostic line is not followed by its location frame the parse stops
/// at that point and the errors read so far are returned.
pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<ParseOutcome, ParseError> {
    if lines.is_empty() {
        return Err(ParseError::EmptyLog);
    }

    let mut cursor = Cursor::new(lines);
    let pid = cursor.seek_first_valgrind_line()?;
    cursor.skip_header();

    let mut errors = Vec::new();
    while let Some(error) = cursor.read_error() {
        errors.push(error);
    }

    Ok(ParseOutcome {
        errors,
        unknowns: cursor.unknowns,
        pid,
    })
}

/// The parser's position in the line list plus its accumulators. One
/// instance per [`parse`] call.
struct Cursor<'a, S> {
    lines: &'a [S],
    index: usize,
    /// Content of the current marked line, marker stripped and trimmed.
    /// `None` once the input is exhausted.
    current: Option<String>,
    unknowns: Vec<String>,
}

impl<'a, S: AsRef<str>> Cursor<'a, S> {
    fn new(lines: &'a [S]) -> Self {
        Self {
            lines,
            index: 0,
            current: None,
            unknowns: Vec::new(),
        }
    }

    /// Find the first marked line, leave the cursor on it and return the
    /// process id it carries.
    fn seek_first_valgrind_line(&mut self) -> Result<String, ParseError> {
        while self.index < self.lines.len() {
            let line = self.lines[self.index].as_ref();
            if let Some(pid) = PATTERNS.pid(line) {
                let pid = pid.to_string();
                self.current = PATTERNS.strip_tag(line).map(str::to_string);
                return Ok(pid);
            }
            self.index += 1;
        }
        Err(ParseError::NoValgrindLines)
    }

    /// Step to the next marked line, skipping unmarked ones. False at end
    /// of input.
    fn advance(&mut self) -> bool {
        self.index += 1;
        while self.index < self.lines.len() {
            let line = self.lines[self.index].as_ref();
            if let Some(content) = PATTERNS.strip_tag(line) {
                self.current = Some(content.to_string());
                return true;
            }
            self.index += 1;
        }
        self.current = None;
        false
    }

    /// Skip the contiguous banner lines under the first marked line.
    fn skip_header(&mut self) {
        while let Some(line) = self.current.as_deref() {
            if !PATTERNS.is_header.is_match(line) {
                break;
            }
            if !self.advance() {
                break;
            }
        }
    }

    /// Read the next error from the log. Skips unrecognized lines,
    /// collecting them, until a diagnostic line is found. Returns `None`
    /// when the input is exhausted or when the error's location frame is
    /// missing, both of which end the parse.
    fn read_error(&mut self) -> Option<ParsedError> {
        loop {
            let line = self.current.clone()?;
            if PATTERNS.is_error_start(&line) {
                break;
            }
            if !line.is_empty() {
                self.unknowns.push(line);
            }
            if !self.advance() {
                return None;
            }
        }

        let mut error = ParsedError::new(self.current.clone()?);

        // Without the location frame the record is not presentable. The
        // parse stops here instead of resynchronizing; continuing blindly
        // would attribute later frames to the wrong error.
        if !self.advance() {
            return None;
        }
        let location = self.current.clone()?;
        if !PATTERNS.is_stack_frame_top.is_match(&location) {
            return None;
        }
        error.set_location(&location);

        // Running out of input mid-stack is fine; the record keeps the
        // frames collected so far.
        if !self.collect_callers(|line| error.add_caller(line)) {
            return Some(error);
        }

        // A source block, when present, follows the error stack directly.
        if let Some(line) = self.current.clone() {
            if PATTERNS.is_source_start(&line) {
                error.set_source_kind(line);
                if !self.advance() {
                    return Some(error);
                }
                let location = match self.current.clone() {
                    Some(location) => location,
                    None => return Some(error),
                };
                if PATTERNS.is_stack_frame_top.is_match(&location) {
                    error.set_source_location(&location);
                    self.collect_callers(|line| error.add_source_caller(line));
                }
                // A source header without its location frame leaves the
                // record valid with an empty source stack; the line that is
                // current goes back to the scanner.
            }
        }

        Some(error)
    }

    /// Advance and hand lines to `add` for as long as they match the
    /// caller-frame pattern. True if a non-caller line is current when the
    /// collection ends, false if the input ran out.
    fn collect_callers(&mut self, mut add: impl FnMut(&str)) -> bool {
        loop {
            if !self.advance() {
                return false;
            }
            let Some(line) = self.current.as_deref() else {
                return false;
            };
            if !PATTERNS.is_stack_frame_caller.is_match(line) {
                return true;
            }
            add(line);
        }
    }
}

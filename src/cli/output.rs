//! User-facing output for the CLI: the colored error tree and the
//! unrecognized-line report.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::source_lookup::FileReader;
use crate::tree::SharedStackNode;

/// A stdout stream that only colors when attached to a terminal.
pub fn stdout() -> StandardStream {
    let choice = if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print the grouping tree, one indented line per node, with the errors
/// that end at a node listed under it. With `show_sources`, each node also
/// gets the text of its nearest source line when the file can be found.
pub fn print_tree(
    out: &mut StandardStream,
    root: &SharedStackNode,
    reader: &mut FileReader,
    show_sources: bool,
) -> io::Result<()> {
    print_node(out, root, 0, reader, show_sources)
}

fn print_node(
    out: &mut StandardStream,
    node: &SharedStackNode,
    depth: usize,
    reader: &mut FileReader,
    show_sources: bool,
) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    let location = node.location();

    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(out, "{indent}{}", location.full_method())?;
    out.reset()?;
    let place = location.file_location();
    if !place.is_empty() {
        write!(out, " ({place})")?;
    }
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(out, " [{} errors]", node.error_count())?;
    out.reset()?;

    if show_sources {
        print_source_line(out, node, &indent, reader)?;
    }

    for error in node.attached_errors() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(out, "{indent}  * {error}")?;
        out.reset()?;
    }

    for child in node.children() {
        print_node(out, child, depth + 1, reader, show_sources)?;
    }
    Ok(())
}

/// Look up the node's nearest source location and print that line of code,
/// when both the location and the file are available.
fn print_source_line(
    out: &mut StandardStream,
    node: &SharedStackNode,
    indent: &str,
    reader: &mut FileReader,
) -> io::Result<()> {
    let nearest = node.nearest_source_location();
    let (Some(file), Some(line)) = (nearest.file, nearest.line) else {
        return Ok(());
    };
    let Some(lines) = reader.read_file(&file) else {
        return Ok(());
    };
    let Some(text) = (line as usize).checked_sub(1).and_then(|index| lines.get(index)) else {
        return Ok(());
    };
    out.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(out, "{indent}    {file}:{line}: {}", text.trim())?;
    out.reset()
}

/// Print the lines the parser did not recognize.
pub fn print_unknowns(out: &mut StandardStream, unknowns: &[String]) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
    writeln!(out, "The parser did not recognize {} lines:", unknowns.len())?;
    out.reset()?;
    for unknown in unknowns {
        writeln!(out, "  {unknown}")?;
    }
    Ok(())
}

// tests/tree_tests.rs
//
// Tests for the shared-stack grouping tree: the partition property, child
// ordering, direction handling and location labeling.

use vgtree::parsed_error::ParsedError;
use vgtree::parser::parse;
use vgtree::stack::{Direction, StackFrame};
use vgtree::tree::SharedStackNode;

const LOG: &str = include_str!("data/memcheck.log");

/// Build an error from a kind and raw frame lines, top frame first.
fn error(kind: &str, frames: &[&str]) -> ParsedError {
    let mut error = ParsedError::new(kind);
    let mut frames = frames.iter();
    if let Some(top) = frames.next() {
        error.set_location(top);
    }
    for caller in frames {
        error.add_caller(caller);
    }
    error
}

#[test]
fn frame_equality_ignores_the_address() {
    let first = StackFrame::from_line("   at 0x111: foo (a.c:10)");
    let second = StackFrame::from_line("   by 0x999: foo (a.c:10)");
    assert_eq!(first, second);

    let elsewhere = StackFrame::from_line("   at 0x111: foo (a.c:11)");
    assert_ne!(first, elsewhere);
}

#[test]
fn errors_sharing_one_frame_attach_to_a_single_child() {
    let first = error("Invalid read of size 4", &["at 0x1: foo (a.c:10)"]);
    let second = error("Invalid write of size 8", &["at 0x2: foo (a.c:10)"]);
    let root = SharedStackNode::build(vec![&first, &second], Direction::FromTop);

    assert_eq!(root.error_count(), 2);
    assert_eq!(root.attached_errors().count(), 0);
    assert_eq!(root.children().len(), 1);

    let child = &root.children()[0];
    assert_eq!(child.error_count(), 2);
    assert_eq!(child.frames_shared(), 1);
    // Both stacks end exactly here, so both errors attach to this node
    // and no further children exist.
    assert_eq!(child.attached_errors().count(), 2);
    assert!(child.children().is_empty());
    assert_eq!(child.location().file.as_deref(), Some("a.c"));
}

#[test]
fn shorter_stack_attaches_while_longer_continues() {
    let short = error("Invalid read of size 4", &["at 0x1: foo (a.c:10)"]);
    let long = error(
        "Invalid write of size 8",
        &["at 0x2: foo (a.c:10)", "by 0x3: main (m.c:5)"],
    );
    let root = SharedStackNode::build(vec![&short, &long], Direction::FromTop);

    let child = &root.children()[0];
    assert_eq!(child.error_count(), 2);
    assert_eq!(child.attached_errors().count(), 1);
    assert_eq!(child.children().len(), 1);
    assert_eq!(child.children()[0].error_count(), 1);
    assert_eq!(
        child.children()[0].location().method.as_deref(),
        Some("main")
    );
}

#[test]
fn direction_changes_the_grouping() {
    let first = error(
        "Invalid read of size 4",
        &["at 0x1: foo (a.c:10)", "by 0x2: main (m.c:5)"],
    );
    let second = error(
        "Invalid read of size 1",
        &["at 0x3: bar (b.c:20)", "by 0x4: main (m.c:5)"],
    );
    let errors = vec![&first, &second];

    // Both errors share their entry point, so they merge from the bottom.
    let from_bottom = SharedStackNode::build(errors.clone(), Direction::FromBottom);
    assert_eq!(from_bottom.children().len(), 1);
    assert_eq!(from_bottom.children()[0].error_count(), 2);

    // Their innermost frames differ, so they split from the top.
    let from_top = SharedStackNode::build(errors, Direction::FromTop);
    assert_eq!(from_top.children().len(), 2);
}

#[test]
fn root_nodes_carry_synthetic_labels() {
    let only = error("Invalid read of size 4", &["at 0x1: foo (a.c:10)"]);
    let errors = vec![&only];

    let from_top = SharedStackNode::build(errors.clone(), Direction::FromTop);
    assert_eq!(from_top.location().method.as_deref(), Some("<Stack top>"));

    let from_bottom = SharedStackNode::build(errors, Direction::FromBottom);
    assert_eq!(
        from_bottom.location().method.as_deref(),
        Some("<Below main>")
    );
    assert_eq!(
        from_bottom.nearest_source_location(),
        from_bottom.location()
    );
}

#[test]
fn nearest_source_location_skips_library_frames() {
    let leak = error(
        "48 bytes in 1 blocks are definitely lost in loss record 1 of 2",
        &[
            "at 0x4C2B0E0: malloc (in /usr/lib/valgrind/vgpreload_memcheck-amd64-linux.so)",
            "by 0x400A2F: leakMemory() (demo.cpp:47)",
        ],
    );
    let root = SharedStackNode::build(vec![&leak], Direction::FromTop);

    // At depth one only the malloc frame is shared. It names no file, so
    // the lookup falls back to the node's own location.
    let depth_one = &root.children()[0];
    assert!(depth_one.location().library.is_some());
    assert!(depth_one.nearest_source_location().file.is_none());

    // At depth two the caller names a file, which wins over malloc.
    let depth_two = &depth_one.children()[0];
    let nearest = depth_two.nearest_source_location();
    assert_eq!(nearest.file.as_deref(), Some("demo.cpp"));
    assert_eq!(nearest.line, Some(47));
}

#[test]
fn children_sort_by_descending_count_with_stable_ties() {
    let lines: Vec<&str> = LOG.lines().collect();
    let outcome = parse(&lines).unwrap();
    let root = SharedStackNode::build(outcome.errors.iter().collect(), Direction::FromBottom);

    let counts: Vec<usize> = root
        .children()
        .iter()
        .map(|child| child.error_count())
        .collect();
    assert_eq!(counts, vec![2, 1, 1, 1, 1]);

    // The two leak records enter through main at line 89 and form the
    // widest group, which sorts first.
    assert_eq!(root.children()[0].location().line, Some(89));

    // Children with equal counts keep the order their pivots appeared in
    // the error list.
    let tied: Vec<Option<u32>> = root.children()[1..]
        .iter()
        .map(|child| child.location().line)
        .collect();
    assert_eq!(tied, vec![Some(92), Some(86), Some(87), Some(88)]);
}

#[test]
fn tree_partitions_the_fixture_errors_exactly() {
    let lines: Vec<&str> = LOG.lines().collect();
    let outcome = parse(&lines).unwrap();

    for direction in [Direction::FromTop, Direction::FromBottom] {
        let root = SharedStackNode::build(outcome.errors.iter().collect(), direction);
        assert_eq!(root.error_count(), outcome.errors.len());
        check_partition(&root, direction);
    }
}

/// Walk the whole tree checking its invariants. Returns the number of
/// errors attached somewhere in this subtree.
fn check_partition(node: &SharedStackNode, direction: Direction) -> usize {
    let depth = node.frames_shared();

    // Every error here agrees with the node's location on the last shared
    // frame.
    if depth > 0 {
        let location = node.location();
        for error in node.errors() {
            assert_eq!(error.frame(depth - 1, direction).unwrap(), &location);
        }
    }

    // Attached errors are exactly the ones whose stack ends at this depth.
    for error in node.attached_errors() {
        assert_eq!(error.error_stack().len(), depth);
    }

    // Siblings disagree on the frame they branch over.
    let branch_frames: Vec<StackFrame> = node
        .children()
        .iter()
        .map(|child| child.location())
        .collect();
    for (index, frame) in branch_frames.iter().enumerate() {
        for other in &branch_frames[index + 1..] {
            assert_ne!(frame, other);
        }
    }

    // Counts are sorted descending and children partition the remainder.
    let mut attached = node.attached_errors().count();
    let mut previous = usize::MAX;
    for child in node.children() {
        assert!(child.error_count() <= previous);
        previous = child.error_count();
        assert_eq!(child.frames_shared(), depth + 1);
        attached += check_partition(child, direction);
    }
    assert_eq!(attached, node.error_count());
    attached
}

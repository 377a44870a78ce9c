//! Grouping of parsed errors by shared call-stack frames.
//!
//! Many distinct errors flow through the same code path. A
//! [`SharedStackNode`] tree makes that visible: every node stands for a set
//! of errors whose stacks agree on the first `frames_shared` frames when
//! read from the chosen end, and its children split that set by the next
//! frame. Reading from the bottom groups by entry point and call path;
//! reading from the top groups by the place the errors were detected.
//!
//! The tree borrows the errors it organizes and is rebuilt from scratch
//! whenever the error set changes.

use crate::parsed_error::ParsedError;
use crate::stack::{Direction, StackFrame};

/// One position in the shared-stack tree, holding every error whose call
/// stack passes through it.
#[derive(Debug)]
pub struct SharedStackNode<'a> {
    /// All errors below this point. They agree on the first
    /// `frames_shared` frames in `direction`.
    errors: Vec<&'a ParsedError>,
    /// Branches off this stack path, widest first. Each child's error list
    /// is a subset of this node's and shares one frame more.
    children: Vec<SharedStackNode<'a>>,
    frames_shared: usize,
    direction: Direction,
}

impl<'a> SharedStackNode<'a> {
    /// Build the whole tree for the given errors, grouped from the chosen
    /// end of their stacks.
    pub fn build(errors: Vec<&'a ParsedError>, direction: Direction) -> Self {
        Self::new(errors, 0, direction)
    }

    fn new(errors: Vec<&'a ParsedError>, frames_shared: usize, direction: Direction) -> Self {
        let mut node = Self {
            errors,
            children: Vec::new(),
            frames_shared,
            direction,
        };
        node.create_children();
        // Widest groups first. The sort is stable, so children with equal
        // counts keep the order their pivots were encountered in.
        node.children
            .sort_by(|left, right| right.error_count().cmp(&left.error_count()));
        node
    }

    /// Partition this node's errors by their frame at index
    /// `frames_shared`. The pivot is always the first error remaining in
    /// the pool; errors whose stack is exhausted at this depth stay
    /// attached here and join no child.
    fn create_children(&mut self) {
        let depth = self.frames_shared;
        let direction = self.direction;
        let mut pool: Vec<&'a ParsedError> = self.errors.clone();

        while let Some(&pivot) = pool.first() {
            let group: Vec<&'a ParsedError> = pool
                .iter()
                .copied()
                .filter(|error| error.shares_frame_with(pivot, depth, direction))
                .collect();
            pool.retain(|error| {
                !error.shares_frame_with(pivot, depth, direction)
                    && error.frame(depth, direction).is_some()
            });

            if !group.is_empty() {
                self.children
                    .push(SharedStackNode::new(group, depth + 1, direction));
            }
        }
    }

    /// The number of errors that pass through this node.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Every error that passes through this node.
    pub fn errors(&self) -> &[&'a ParsedError] {
        &self.errors
    }

    /// The errors whose whole stack is the path to this node. They belong
    /// to no child.
    pub fn attached_errors(&self) -> impl Iterator<Item = &'a ParsedError> + '_ {
        let depth = self.frames_shared;
        self.errors
            .iter()
            .copied()
            .filter(move |error| error.error_stack().len() == depth)
    }

    pub fn children(&self) -> &[SharedStackNode<'a>] {
        &self.children
    }

    pub fn frames_shared(&self) -> usize {
        self.frames_shared
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The frame this node stands for: the deepest one all its errors
    /// share. The root shares nothing and gets a synthetic label instead.
    pub fn location(&self) -> StackFrame {
        if self.frames_shared > 0 {
            self.errors[0]
                .frame(self.frames_shared - 1, self.direction)
                .cloned()
                .unwrap_or_default()
        } else {
            match self.direction {
                Direction::FromBottom => StackFrame::synthetic("<Below main>"),
                Direction::FromTop => StackFrame::synthetic("<Stack top>"),
            }
        }
    }

    /// The nearest shared frame that names a source file, walking from this
    /// node's own frame toward the shared end of the stack. Falls back to
    /// [`SharedStackNode::location`], which may itself name no file.
    pub fn nearest_source_location(&self) -> StackFrame {
        if self.frames_shared == 0 {
            return self.location();
        }
        for index in (0..self.frames_shared).rev() {
            if let Some(frame) = self.errors[0].frame(index, self.direction) {
                if frame.file.is_some() {
                    return frame.clone();
                }
            }
        }
        self.location()
    }
}

use std::fmt;

use text_size::TextRange;

use crate::SyntaxKind;

/// A child the grammar guarantees was not found under its parent.
///
/// Parser output only lacks a required child where it recovered from a
/// syntax error. Anywhere else this means the tree was built by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingChildError {
    pub parent: SyntaxKind,
    pub expected: SyntaxKind,
    /// Range of the parent node.
    pub range: TextRange,
}

impl fmt::Display for MissingChildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} has no {:?} child", self.parent, self.range, self.expected)
    }
}

impl std::error::Error for MissingChildError {}

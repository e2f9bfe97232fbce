//! Lossless syntax tree with parent links and attached trivia.
//!
//! The tree owns its text and stores nodes and tokens in a flat arena. It is
//! navigated through `Copy` handles borrowing the tree, and supports the two
//! in-place edits incremental reparsing needs: patching a single token and
//! swapping out a subtree.

mod builder;
mod error;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod tree;
mod trivia;

pub use builder::Builder;
pub use error::MissingChildError;
pub use syntax::{
    ChildrenWithTokens, Descendants, NodeOrToken, SyntaxElement, SyntaxNode, SyntaxNodePtr,
    SyntaxToken, TokenAtOffset,
};
pub use syntax_kind::SyntaxKind;
pub use syntax_set::SyntaxSet;
pub use text_size::{TextRange, TextSize};
pub use tree::{ElementId, SyntaxTree};
pub use trivia::{TriviaPiece, TriviaPieceKind, trivia_len};

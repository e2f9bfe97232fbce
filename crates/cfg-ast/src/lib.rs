//! Typed views over the Cfg syntax tree.
//!
//! A view is a `Copy` handle around an [`ElementId`]. Reading goes through a
//! `&SyntaxTree`, editing through a `&mut Parse`, so views can be kept while
//! the tree changes underneath them.

use std::fmt;

use cfg_tokenizer::InvalidLexicalFormError;
use cfg_yellow::{ElementId, MissingChildError, SyntaxNode, SyntaxTree};

mod nodes;
pub mod rules;
pub mod visitor;

pub use nodes::{
    ArgList, Binding, Block, BoolLiteral, FieldName, File, FuncCall, FuncName, Item, ListLiteral,
    NameRef, NumberLiteral, StringLiteral, TypeAscription, Value,
};
pub use visitor::{Visitor, accept, walk};

pub trait Node: Copy {
    fn cast(syntax: SyntaxNode<'_>) -> Option<Self>;

    fn id(self) -> ElementId;

    /// The node behind this view.
    ///
    /// Panics if the node was removed by an edit. Views survive token patches
    /// and edits elsewhere in the tree, but not a re-parse of their own
    /// region.
    #[track_caller]
    fn syntax(self, tree: &SyntaxTree) -> SyntaxNode<'_> {
        match tree.node(self.id()) {
            Some(node) if Self::cast(node).is_some() => node,
            _ => panic!("{:?} is not a live node of this type", self.id()),
        }
    }
}

/// Why a setter refused to edit the tree. The tree is untouched in both
/// cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    MissingChild(MissingChildError),
    InvalidLexicalForm(InvalidLexicalFormError),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::MissingChild(error) => error.fmt(f),
            EditError::InvalidLexicalForm(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditError::MissingChild(error) => Some(error),
            EditError::InvalidLexicalForm(error) => Some(error),
        }
    }
}

impl From<MissingChildError> for EditError {
    fn from(error: MissingChildError) -> Self {
        EditError::MissingChild(error)
    }
}

impl From<InvalidLexicalFormError> for EditError {
    fn from(error: InvalidLexicalFormError) -> Self {
        EditError::InvalidLexicalForm(error)
    }
}

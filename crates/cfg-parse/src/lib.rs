//! Parser for Cfg files producing a lossless syntax tree, plus incremental
//! re-parsing of edited trees.

use std::fmt::Write as _;

use cfg_errors::Diagnostic;
use cfg_tokenizer::Token;
use cfg_yellow::{ElementId, SyntaxNode, SyntaxTree, TextRange, TextSize};

mod grammar;
mod parser;
mod reparsing;
#[cfg(test)]
mod tests;

pub use reparsing::Reparse;

/// Parses `text` into a tree. Never fails: syntax errors are recovered and
/// reported in [`Parse::errors`].
pub fn parse(text: &str) -> Parse {
    parse_tokens(text, cfg_tokenizer::tokenize(text))
}

/// Parses already lexed `tokens` of `text`.
#[tracing::instrument(level = "trace", skip_all, fields(len = text.len()))]
pub fn parse_tokens(text: &str, tokens: Vec<Token>) -> Parse {
    let mut parser = parser::Parser::new(text, tokens);
    grammar::items::file(&mut parser);
    let (tree, errors) = parser.build_tree();
    Parse { tree, errors }
}

/// The result of parsing: a tree and the syntax errors found on the way.
#[derive(Debug, Clone)]
pub struct Parse {
    tree: SyntaxTree,
    errors: Vec<Diagnostic>,
}

impl Parse {
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        self.tree.root()
    }

    pub fn text(&self) -> &str {
        self.tree.text()
    }

    /// Syntax errors ordered by start offset.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// The tree dump followed by the errors, one per line.
    pub fn debug_dump(&self) -> String {
        let mut buf = self.tree.debug_dump();
        if !self.errors.is_empty() {
            buf.push_str("Errors:\n");
            for error in &self.errors {
                _ = writeln!(buf, "  {error}");
            }
        }
        buf
    }

    /// Applies `edit` to the text and brings tree and errors up to date.
    ///
    /// The result is the same as parsing the edited text from scratch. Ids
    /// of elements the edit does not touch stay valid unless the whole tree
    /// had to be rebuilt, as reported by the returned [`Reparse`].
    #[track_caller]
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Reparse {
        let text = self.text();
        assert!(
            edit.range.end() <= TextSize::of(text)
                && text.is_char_boundary(edit.range.start().into())
                && text.is_char_boundary(edit.range.end().into()),
            "edit {:?} is out of bounds for a text of length {}",
            edit.range,
            text.len()
        );

        reparsing::apply(self, edit)
    }

    /// Replaces the text of `element`, keeping its leading and trailing
    /// trivia.
    #[track_caller]
    pub fn replace_text(&mut self, element: ElementId, text: &str) -> Reparse {
        let Some(node_or_token) = self.tree.element(element) else {
            panic!("`replace_text` expects a live element, got {element:?}");
        };
        let range = node_or_token.trimmed_range();
        self.apply_edit(&TextEdit::replace(range, text))
    }
}

unsafe impl salsa::Update for Parse {
    unsafe fn maybe_update(old_pointer: *mut Self, new_value: Self) -> bool {
        let old_value = unsafe { &mut *old_pointer };
        if old_value.text() == new_value.text() {
            false
        } else {
            *old_value = new_value;
            true
        }
    }
}

/// Replacement of `range` by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub text: String,
}

impl TextEdit {
    pub fn replace(range: TextRange, text: impl Into<String>) -> Self {
        Self { range, text: text.into() }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::replace(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }

    /// Applies the edit to `text`.
    pub fn apply(&self, text: &mut String) {
        text.replace_range(std::ops::Range::<usize>::from(self.range), &self.text);
    }
}

use std::fmt;

use cfg_yellow::SyntaxKind;

/// Text rejected because it does not lex as exactly one token of the
/// expected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLexicalFormError {
    pub text: String,
    pub expected: SyntaxKind,
}

impl fmt::Display for InvalidLexicalFormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} does not lex as {}", self.text, self.expected.describe())
    }
}

impl std::error::Error for InvalidLexicalFormError {}

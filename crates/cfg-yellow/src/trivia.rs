//! Trivia pieces attached to tokens.

use text_size::TextSize;

use crate::SyntaxKind;

/// Kinds of trivia stored alongside tokens.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPieceKind {
    Whitespace,
    Newline,
    SingleLineComment,
}

impl TriviaPieceKind {
    /// The syntax kind used when trivia is listed as a flat token stream.
    pub fn syntax_kind(self) -> SyntaxKind {
        match self {
            Self::Whitespace => SyntaxKind::WHITESPACE,
            Self::Newline => SyntaxKind::NEWLINE,
            Self::SingleLineComment => SyntaxKind::LINE_COMMENT,
        }
    }
}

/// A trivia fragment with its kind and length.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriviaPiece {
    pub kind: TriviaPieceKind,
    pub len: TextSize,
}

impl TriviaPiece {
    /// Creates a new trivia piece with the given kind and length.
    pub fn new(kind: TriviaPieceKind, len: TextSize) -> Self {
        Self { kind, len }
    }
}

/// Total length of a run of trivia.
pub fn trivia_len(pieces: &[TriviaPiece]) -> TextSize {
    pieces.iter().map(|piece| piece.len).sum()
}

//! Incremental builder for the syntax tree.

use text_size::{TextRange, TextSize};

use crate::tree::{Element, ElementData};
use crate::{ElementId, SyntaxKind, SyntaxTree, TriviaPiece};

/// Builds a `SyntaxTree` from parser events.
pub struct Builder {
    text: String,
    elements: Vec<Element>,
    opened: Vec<(ElementId, Vec<ElementId>)>,
    text_len: TextSize,
    root: Option<ElementId>,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 32;
const DEFAULT_TREE_SIZE: usize = 1024;

impl Builder {
    /// Creates a new builder for `text`.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            elements: Vec::with_capacity(DEFAULT_TREE_SIZE),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            text_len: TextSize::new(0),
            root: None,
        }
    }

    fn push(&mut self, element: Element) -> ElementId {
        let id = ElementId::new(self.elements.len());
        self.elements.push(element);
        if let Some((_, children)) = self.opened.last_mut() {
            children.push(id);
        }
        id
    }

    /// Starts a new node of the given kind.
    #[track_caller]
    pub fn start_node(&mut self, kind: SyntaxKind) {
        assert!(self.root.is_none(), "the root node is already finished");

        let parent = self.opened.last().map(|&(id, _)| id);
        let id = self.push(Element {
            kind,
            parent,
            range: TextRange::empty(self.text_len),
            data: ElementData::Vacant,
        });
        self.opened.push((id, Vec::new()));
    }

    /// Finishes the most recently started node.
    #[track_caller]
    pub fn finish_node(&mut self) {
        let (id, children) = self.opened.pop().expect("no opened nodes?");
        let element = &mut self.elements[id.index()];
        element.range = TextRange::new(element.range.start(), self.text_len);
        element.data = ElementData::Node { children };

        if self.opened.is_empty() {
            self.root = Some(id);
        }
    }

    /// Adds a token with its leading and trailing trivia.
    #[track_caller]
    pub fn token(
        &mut self,
        leading_trivia: impl ExactSizeIterator<Item = TriviaPiece>,
        kind: SyntaxKind,
        text_len: TextSize,
        trailing_trivia: impl ExactSizeIterator<Item = TriviaPiece>,
    ) {
        let parent = self.opened.last().map(|&(id, _)| id).expect("tokens need an opened node");
        let leading: Box<[TriviaPiece]> = leading_trivia.collect();
        let trailing: Box<[TriviaPiece]> = trailing_trivia.collect();

        let start = self.text_len;
        self.text_len +=
            crate::trivia_len(&leading) + text_len + crate::trivia_len(&trailing);
        assert!(
            self.text.is_char_boundary(usize::from(self.text_len)),
            "token ends outside of the text or inside a character"
        );

        self.push(Element {
            kind,
            parent: Some(parent),
            range: TextRange::new(start, self.text_len),
            data: ElementData::Token { leading, trailing },
        });
    }

    /// Finishes building and returns the `SyntaxTree`.
    #[track_caller]
    pub fn finish(mut self) -> SyntaxTree {
        assert!(self.opened.is_empty(), "unfinished nodes");
        assert_eq!(
            usize::from(self.text_len),
            self.text.len(),
            "tokens do not cover the whole text"
        );
        let root = self.root.expect("no root node");

        SyntaxTree {
            text: std::mem::take(&mut self.text),
            elements: std::mem::take(&mut self.elements),
            vacant: Vec::new(),
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::Builder;
    use crate::{SyntaxKind, TriviaPiece, TriviaPieceKind};

    #[test]
    fn builds_nested_nodes_with_trivia() {
        let mut builder = Builder::new("a = 1\n");
        builder.start_node(SyntaxKind::FILE);
        builder.start_node(SyntaxKind::BINDING);
        builder.start_node(SyntaxKind::FIELD_NAME);
        builder.token(
            [].into_iter(),
            SyntaxKind::NAME,
            TextSize::new(1),
            [TriviaPiece::new(TriviaPieceKind::Whitespace, TextSize::new(1))].into_iter(),
        );
        builder.finish_node();
        builder.token(
            [].into_iter(),
            SyntaxKind::EQ,
            TextSize::new(1),
            [TriviaPiece::new(TriviaPieceKind::Whitespace, TextSize::new(1))].into_iter(),
        );
        builder.start_node(SyntaxKind::NUMBER_LITERAL);
        builder.token([].into_iter(), SyntaxKind::INT_NUMBER, TextSize::new(1), [].into_iter());
        builder.finish_node();
        builder.finish_node();
        builder.token(
            [TriviaPiece::new(TriviaPieceKind::Newline, TextSize::new(1))].into_iter(),
            SyntaxKind::EOF,
            TextSize::new(0),
            [].into_iter(),
        );
        builder.finish_node();

        let tree = builder.finish();
        assert_eq!(
            tree.debug_dump(),
            r#"FILE@0..6
  BINDING@0..5
    FIELD_NAME@0..2
      NAME@0..2 "a "
    EQ@2..4 "= "
    NUMBER_LITERAL@4..5
      INT_NUMBER@4..5 "1"
  EOF@5..6 "\n"
"#
        );
    }

    #[test]
    #[should_panic(expected = "unfinished nodes")]
    fn finish_rejects_open_nodes() {
        let mut builder = Builder::new("");
        builder.start_node(SyntaxKind::FILE);
        let _ = builder.finish();
    }
}

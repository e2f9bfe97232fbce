//! Public syntax tree API: lightweight `Copy` handles into a [`SyntaxTree`].

use std::fmt;

use text_size::{TextRange, TextSize};

use crate::tree::{Element, ElementData};
use crate::{ElementId, MissingChildError, SyntaxKind, SyntaxTree, TriviaPiece, TriviaPieceKind};

/// Node handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a SyntaxTree,
    id: ElementId,
}

impl<'a> SyntaxNode<'a> {
    #[inline]
    pub(crate) fn new(tree: &'a SyntaxTree, id: ElementId) -> Self {
        Self { tree, id }
    }

    #[inline]
    fn element(self) -> &'a Element {
        self.tree.get(self.id)
    }

    #[inline]
    fn child_ids(self) -> &'a [ElementId] {
        match &self.element().data {
            ElementData::Node { children } => children,
            _ => &[],
        }
    }

    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.element().kind
    }

    #[inline]
    pub fn id(self) -> ElementId {
        self.id
    }

    #[inline]
    pub fn tree(self) -> &'a SyntaxTree {
        self.tree
    }

    /// Full range, trivia of the first and last token included.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.element().range
    }

    /// From the first non-trivia byte to the last one. Empty for nodes that
    /// only hold zero-width tokens.
    pub fn trimmed_range(self) -> TextRange {
        let mut tokens = self.descendant_tokens().filter(|token| !token.trimmed_range().is_empty());
        match tokens.next() {
            Some(first) => {
                let last = tokens.last().unwrap_or(first);
                TextRange::new(first.trimmed_range().start(), last.trimmed_range().end())
            }
            None => TextRange::empty(self.text_range().start()),
        }
    }

    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    #[inline]
    pub fn parent(self) -> Option<Self> {
        self.element().parent.map(|parent| Self::new(self.tree, parent))
    }

    /// This node, then its parent, up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        std::iter::successors(Some(self), |node| node.parent())
    }

    #[inline]
    pub fn children_with_tokens(self) -> ChildrenWithTokens<'a> {
        ChildrenWithTokens { tree: self.tree, children: self.child_ids().iter() }
    }

    #[inline]
    pub fn children(self) -> impl DoubleEndedIterator<Item = SyntaxNode<'a>> + Clone {
        self.children_with_tokens().filter_map(SyntaxElement::into_node)
    }

    #[inline]
    pub fn first_child_or_token(self) -> Option<SyntaxElement<'a>> {
        self.children_with_tokens().next()
    }

    #[inline]
    pub fn last_child_or_token(self) -> Option<SyntaxElement<'a>> {
        self.children_with_tokens().next_back()
    }

    #[inline]
    pub fn next_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        SyntaxElement::Node(self).next_sibling_or_token()
    }

    #[inline]
    pub fn prev_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        SyntaxElement::Node(self).prev_sibling_or_token()
    }

    /// Leftmost token of the subtree; `None` only for childless nodes.
    pub fn first_token(self) -> Option<SyntaxToken<'a>> {
        let mut child = self.first_child_or_token()?;
        loop {
            match child {
                NodeOrToken::Node(node) => child = node.first_child_or_token()?,
                NodeOrToken::Token(token) => return Some(token),
            }
        }
    }

    pub fn last_token(self) -> Option<SyntaxToken<'a>> {
        let mut child = self.last_child_or_token()?;
        loop {
            match child {
                NodeOrToken::Node(node) => child = node.last_child_or_token()?,
                NodeOrToken::Token(token) => return Some(token),
            }
        }
    }

    /// This node and everything below it, in preorder.
    #[inline]
    pub fn descendants_with_tokens(self) -> Descendants<'a> {
        Descendants { tree: self.tree, stack: vec![self.id] }
    }

    /// This node and every node below it, in preorder.
    pub fn descendants(self) -> impl Iterator<Item = SyntaxNode<'a>> {
        self.descendants_with_tokens().filter_map(SyntaxElement::into_node)
    }

    /// Every token below this node, in source order.
    pub fn descendant_tokens(self) -> impl Iterator<Item = SyntaxToken<'a>> {
        self.descendants_with_tokens().filter_map(SyntaxElement::into_token)
    }

    pub fn find_child_of_kind(self, kind: SyntaxKind) -> Option<SyntaxElement<'a>> {
        self.children_with_tokens().find(|child| child.kind() == kind)
    }

    /// Like [`find_child_of_kind`](Self::find_child_of_kind), for children the
    /// grammar guarantees to be present.
    pub fn find_required_child_of_kind(
        self,
        kind: SyntaxKind,
    ) -> Result<SyntaxElement<'a>, MissingChildError> {
        self.find_child_of_kind(kind).ok_or(MissingChildError {
            parent: self.kind(),
            expected: kind,
            range: self.text_range(),
        })
    }

    /// Returns the non-empty token(s) touching `offset`.
    pub fn token_at_offset(self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'a>> {
        let range = self.text_range();
        if offset < range.start() || offset > range.end() {
            return TokenAtOffset::None;
        }

        let mut children = self.children_with_tokens().filter(|child| {
            let range = child.text_range();
            !range.is_empty() && range.start() <= offset && offset <= range.end()
        });

        let left = children.next();
        let right = children.next();

        match (left, right) {
            (Some(left), None) => left.token_at_offset(offset),
            (Some(left), Some(right)) => match (
                left.token_at_offset(offset).left_biased(),
                right.token_at_offset(offset).right_biased(),
            ) {
                (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
                (Some(token), None) | (None, Some(token)) => TokenAtOffset::Single(token),
                (None, None) => TokenAtOffset::None,
            },
            (None, _) => TokenAtOffset::None,
        }
    }

    /// Smallest element whose full range contains `range`.
    pub fn covering_element(self, range: TextRange) -> SyntaxElement<'a> {
        let Some(token) = self.token_at_offset(range.start()).right_biased() else {
            return NodeOrToken::Node(self);
        };

        if token.text_range().contains_range(range) {
            return NodeOrToken::Token(token);
        }

        token
            .parent()
            .ancestors()
            .find(|ancestor| ancestor.text_range().contains_range(range))
            .map_or(NodeOrToken::Node(self), NodeOrToken::Node)
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Token handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    tree: &'a SyntaxTree,
    id: ElementId,
}

impl<'a> SyntaxToken<'a> {
    #[inline]
    pub(crate) fn new(tree: &'a SyntaxTree, id: ElementId) -> Self {
        Self { tree, id }
    }

    #[inline]
    fn element(self) -> &'a Element {
        self.tree.get(self.id)
    }

    #[inline]
    fn trivia(self) -> (&'a [TriviaPiece], &'a [TriviaPiece]) {
        match &self.element().data {
            ElementData::Token { leading, trailing } => (leading, trailing),
            _ => (&[], &[]),
        }
    }

    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.element().kind
    }

    #[inline]
    pub fn id(self) -> ElementId {
        self.id
    }

    /// Range of the token with its leading and trailing trivia.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.element().range
    }

    /// Range of the token text alone.
    pub fn trimmed_range(self) -> TextRange {
        let (leading, trailing) = self.trivia();
        let range = self.text_range();
        TextRange::new(
            range.start() + crate::trivia_len(leading),
            range.end() - crate::trivia_len(trailing),
        )
    }

    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        &self.tree.text[self.trimmed_range()]
    }

    #[inline]
    pub fn leading_trivia(self) -> &'a [TriviaPiece] {
        self.trivia().0
    }

    #[inline]
    pub fn trailing_trivia(self) -> &'a [TriviaPiece] {
        self.trivia().1
    }

    pub fn has_line_break_before(self) -> bool {
        self.leading_trivia().iter().any(|piece| piece.kind == TriviaPieceKind::Newline)
    }

    /// Tokens are never the root, so they always have a parent.
    #[inline]
    pub fn parent(self) -> SyntaxNode<'a> {
        match self.element().parent {
            Some(parent) => SyntaxNode::new(self.tree, parent),
            None => unreachable!("token {:?} without a parent", self.id),
        }
    }

    /// The following token in source order, crossing node boundaries.
    pub fn next_token(self) -> Option<Self> {
        let mut element = SyntaxElement::Token(self);
        loop {
            match element.next_sibling_or_token() {
                Some(NodeOrToken::Token(token)) => return Some(token),
                Some(NodeOrToken::Node(node)) => match node.first_token() {
                    Some(token) => return Some(token),
                    None => element = NodeOrToken::Node(node),
                },
                None => element = NodeOrToken::Node(element.parent()?),
            }
        }
    }

    /// The preceding token in source order, crossing node boundaries.
    pub fn prev_token(self) -> Option<Self> {
        let mut element = SyntaxElement::Token(self);
        loop {
            match element.prev_sibling_or_token() {
                Some(NodeOrToken::Token(token)) => return Some(token),
                Some(NodeOrToken::Node(node)) => match node.last_token() {
                    Some(token) => return Some(token),
                    None => element = NodeOrToken::Node(node),
                },
                None => element = NodeOrToken::Node(element.parent()?),
            }
        }
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxToken<'_> {}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.text_range(), self.text())
    }
}

impl fmt::Display for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

impl<'a> SyntaxElement<'a> {
    fn tree(self) -> &'a SyntaxTree {
        match self {
            NodeOrToken::Node(node) => node.tree,
            NodeOrToken::Token(token) => token.tree,
        }
    }

    #[inline]
    pub fn kind(self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    #[inline]
    pub fn id(self) -> ElementId {
        match self {
            NodeOrToken::Node(node) => node.id(),
            NodeOrToken::Token(token) => token.id(),
        }
    }

    #[inline]
    pub fn text_range(self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    #[inline]
    pub fn trimmed_range(self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.trimmed_range(),
            NodeOrToken::Token(token) => token.trimmed_range(),
        }
    }

    #[inline]
    pub fn text(self) -> &'a str {
        match self {
            NodeOrToken::Node(node) => node.text(),
            NodeOrToken::Token(token) => token.text(),
        }
    }

    #[inline]
    pub fn text_trimmed(self) -> &'a str {
        match self {
            NodeOrToken::Node(node) => node.text_trimmed(),
            NodeOrToken::Token(token) => token.text_trimmed(),
        }
    }

    #[inline]
    pub fn parent(self) -> Option<SyntaxNode<'a>> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => Some(token.parent()),
        }
    }

    pub fn next_sibling_or_token(self) -> Option<Self> {
        let siblings = self.parent()?.child_ids();
        let index = siblings.iter().position(|&id| id == self.id())?;
        let id = *siblings.get(index + 1)?;
        self.tree().element(id)
    }

    pub fn prev_sibling_or_token(self) -> Option<Self> {
        let siblings = self.parent()?.child_ids();
        let index = siblings.iter().position(|&id| id == self.id())?;
        let id = *siblings.get(index.checked_sub(1)?)?;
        self.tree().element(id)
    }

    fn token_at_offset(self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'a>> {
        match self {
            NodeOrToken::Node(node) => node.token_at_offset(offset),
            NodeOrToken::Token(token) => TokenAtOffset::Single(token),
        }
    }
}

/// Iterator over the children of a node, tokens included.
#[derive(Clone)]
pub struct ChildrenWithTokens<'a> {
    tree: &'a SyntaxTree,
    children: std::slice::Iter<'a, ElementId>,
}

impl<'a> ChildrenWithTokens<'a> {
    #[inline]
    fn map_child(&self, id: ElementId) -> SyntaxElement<'a> {
        match self.tree.get(id).data {
            ElementData::Node { .. } => NodeOrToken::Node(SyntaxNode::new(self.tree, id)),
            _ => NodeOrToken::Token(SyntaxToken::new(self.tree, id)),
        }
    }
}

impl<'a> Iterator for ChildrenWithTokens<'a> {
    type Item = SyntaxElement<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.children.next()?;
        Some(self.map_child(id))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.children.size_hint()
    }
}

impl DoubleEndedIterator for ChildrenWithTokens<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = *self.children.next_back()?;
        Some(self.map_child(id))
    }
}

impl ExactSizeIterator for ChildrenWithTokens<'_> {}

/// Preorder walk over a subtree, driven by an explicit stack of arena ids.
#[derive(Clone)]
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<ElementId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = SyntaxElement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let element = self.tree.get(id);
        if let ElementData::Node { children } = &element.data {
            self.stack.extend(children.iter().rev());
            Some(NodeOrToken::Node(SyntaxNode::new(self.tree, id)))
        } else {
            Some(NodeOrToken::Token(SyntaxToken::new(self.tree, id)))
        }
    }
}

/// Locates a node by kind and trimmed range, so it can be found again after
/// the tree was edited or rebuilt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SyntaxNodePtr {
    /// Node kind used for lookup.
    pub kind: SyntaxKind,
    /// Non-trivia text range used for lookup.
    pub range: TextRange,
}

impl SyntaxNodePtr {
    pub fn new(node: SyntaxNode<'_>) -> Self {
        Self { kind: node.kind(), range: node.trimmed_range() }
    }

    /// Finds the node again, in `tree` or in an edited copy of it.
    pub fn try_to_node(self, tree: &SyntaxTree) -> Option<SyntaxNode<'_>> {
        let start_node = match tree.root().covering_element(self.range) {
            NodeOrToken::Node(node) => node,
            NodeOrToken::Token(token) => token.parent(),
        };

        start_node
            .ancestors()
            .find(|node| node.kind() == self.kind && node.trimmed_range() == self.range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

impl<N: fmt::Display, T: fmt::Display> fmt::Display for NodeOrToken<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOrToken::Node(node) => fmt::Display::fmt(node, f),
            NodeOrToken::Token(token) => fmt::Display::fmt(token, f),
        }
    }
}

/// Tokens touching an offset. An offset on the boundary of two tokens
/// touches both.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    None,
    Single(T),
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(token) | Self::Between(_, token) => Some(token),
        }
    }

    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(token) | Self::Between(token, _) => Some(token),
        }
    }
}

impl<T> Iterator for TokenAtOffset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let (token, rest) = match std::mem::replace(self, Self::None) {
            Self::None => return None,
            Self::Single(token) => (token, Self::None),
            Self::Between(left, right) => (left, Self::Single(right)),
        };
        *self = rest;
        Some(token)
    }
}

//! Arena storage for the syntax tree and the in-place edits it supports.

use std::fmt;
use std::fmt::Write as _;

use text_size::{TextRange, TextSize};

use crate::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, TriviaPiece};

/// Index of an element inside a [`SyntaxTree`].
///
/// Ids stay valid across edits that do not touch the element. Ids of
/// replaced subtrees are recycled, so they must not be held across edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(index.try_into().expect("syntax tree has more than u32::MAX elements"))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone)]
pub(crate) struct Element {
    pub(crate) kind: SyntaxKind,
    pub(crate) parent: Option<ElementId>,
    /// Full range, including the trivia of every token below.
    pub(crate) range: TextRange,
    pub(crate) data: ElementData,
}

#[derive(Clone)]
pub(crate) enum ElementData {
    Node { children: Vec<ElementId> },
    Token { leading: Box<[TriviaPiece]>, trailing: Box<[TriviaPiece]> },
    Vacant,
}

/// Owned, lossless syntax tree for a single source text.
#[derive(Clone)]
pub struct SyntaxTree {
    pub(crate) text: String,
    pub(crate) elements: Vec<Element>,
    pub(crate) vacant: Vec<ElementId>,
    pub(crate) root: ElementId,
}

impl SyntaxTree {
    /// Returns the root syntax node.
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self, self.root)
    }

    /// Returns the full source text for this tree.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Resolves `id`, returning `None` for recycled or foreign ids.
    pub fn element(&self, id: ElementId) -> Option<SyntaxElement<'_>> {
        match self.elements.get(id.index())?.data {
            ElementData::Node { .. } => Some(SyntaxElement::Node(SyntaxNode::new(self, id))),
            ElementData::Token { .. } => Some(SyntaxElement::Token(SyntaxToken::new(self, id))),
            ElementData::Vacant => None,
        }
    }

    pub fn node(&self, id: ElementId) -> Option<SyntaxNode<'_>> {
        self.element(id)?.into_node()
    }

    pub fn token(&self, id: ElementId) -> Option<SyntaxToken<'_>> {
        self.element(id)?.into_token()
    }

    /// Number of live elements (nodes and tokens).
    pub fn len(&self) -> usize {
        self.elements.len() - self.vacant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub(crate) fn get(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    /// Renders the tree as indented `KIND@range` lines, tokens with their text.
    pub fn debug_dump(&self) -> String {
        let mut buf = String::new();
        let mut stack = vec![(self.root, 0)];

        while let Some((id, depth)) = stack.pop() {
            let element = self.get(id);
            let indent = depth * 2;
            _ = write!(buf, "{:indent$}{:?}@{:?}", "", element.kind, element.range);

            if let ElementData::Node { children } = &element.data {
                stack.extend(children.iter().rev().map(|&child| (child, depth + 1)));
            } else {
                _ = write!(buf, " {:?}", &self.text[element.range]);
            }
            buf.push('\n');
        }

        buf
    }

    /// Replaces the trimmed text of token `id` in place.
    ///
    /// Trivia and kind are kept; every element id stays valid and ranges
    /// after the token are shifted. The caller guarantees that the new text
    /// still lexes as the same single token.
    #[track_caller]
    pub fn patch_token(&mut self, id: ElementId, text: &str) {
        let token = self.token(id).expect("`patch_token` expects a live token");
        let old = token.trimmed_range();

        self.text.replace_range(std::ops::Range::<usize>::from(old), text);
        self.shift_after(id, old, TextSize::of(text));
    }

    /// Replaces the subtree rooted at `id` with `fragment`.
    ///
    /// The fragment's text replaces the full range of the old subtree. Ids of
    /// the old subtree are recycled; ids outside of it stay valid. Returns the
    /// id of the spliced-in root.
    #[track_caller]
    pub fn replace_subtree(&mut self, id: ElementId, mut fragment: Self) -> ElementId {
        let old = self.element(id).expect("`replace_subtree` expects a live element");
        let old_range = old.text_range();
        let parent = old.parent().map(|parent| parent.id());

        let Some(parent) = parent else {
            *self = fragment;
            return self.root;
        };

        self.text.replace_range(std::ops::Range::<usize>::from(old_range), &fragment.text);
        self.vacate(id);
        self.shift_after(parent, old_range, TextSize::of(fragment.text.as_str()));

        let new_id = self.adopt(&mut fragment, parent, old_range.start());

        if let ElementData::Node { children } = &mut self.elements[parent.index()].data {
            for child in children.iter_mut() {
                if *child == id {
                    *child = new_id;
                }
            }
        }

        new_id
    }

    /// Moves the whole of `fragment` into this arena under `parent`, shifting
    /// every range by `offset`.
    fn adopt(&mut self, fragment: &mut Self, parent: ElementId, offset: TextSize) -> ElementId {
        let fragment_root = fragment.root;
        let root = self.adopt_one(fragment, fragment_root, parent, offset);
        let mut stack = vec![root];

        // Adopted nodes still list their children by fragment id until
        // they are popped here.
        while let Some(id) = stack.pop() {
            let ElementData::Node { children } = &mut self.elements[id.index()].data else {
                continue;
            };
            let children: Vec<ElementId> = std::mem::take(children)
                .into_iter()
                .map(|child| self.adopt_one(fragment, child, id, offset))
                .collect();
            stack.extend(children.iter().copied());
            self.elements[id.index()].data = ElementData::Node { children };
        }

        root
    }

    fn adopt_one(
        &mut self,
        fragment: &mut Self,
        from: ElementId,
        parent: ElementId,
        offset: TextSize,
    ) -> ElementId {
        let element = &mut fragment.elements[from.index()];
        let data = std::mem::replace(&mut element.data, ElementData::Vacant);
        let (kind, range) = (element.kind, element.range + offset);
        self.alloc(Element { kind, parent: Some(parent), range, data })
    }

    fn alloc(&mut self, element: Element) -> ElementId {
        match self.vacant.pop() {
            Some(id) => {
                self.elements[id.index()] = element;
                id
            }
            None => {
                let id = ElementId::new(self.elements.len());
                self.elements.push(element);
                id
            }
        }
    }

    fn vacate(&mut self, id: ElementId) {
        let mut stack = vec![id];

        while let Some(id) = stack.pop() {
            let element = &mut self.elements[id.index()];
            if let ElementData::Node { children } =
                std::mem::replace(&mut element.data, ElementData::Vacant)
            {
                stack.extend(children);
            }
            element.parent = None;
            self.vacant.push(id);
        }
    }

    /// Adjusts ranges after `old` was replaced by `new_len` bytes of text.
    ///
    /// `anchor` and its ancestors enclose the edit and only grow or shrink;
    /// every other live element starting at or after `old.end()` moves.
    fn shift_after(&mut self, anchor: ElementId, old: TextRange, new_len: TextSize) {
        let enclosing: Vec<ElementId> =
            std::iter::successors(Some(anchor), |&id| self.get(id).parent).collect();

        let old_end = old.end();
        let resize = |offset: TextSize| offset - old.len() + new_len;

        for (index, element) in self.elements.iter_mut().enumerate() {
            if matches!(element.data, ElementData::Vacant) {
                continue;
            }

            let range = element.range;
            if enclosing.contains(&ElementId::new(index)) {
                element.range = TextRange::new(range.start(), resize(range.end()));
            } else if range.start() >= old_end {
                element.range = TextRange::new(resize(range.start()), resize(range.end()));
            }
        }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("text_len", &self.text().len())
            .field("elements", &self.len())
            .finish_non_exhaustive()
    }
}

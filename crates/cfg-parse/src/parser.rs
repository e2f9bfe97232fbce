use cfg_errors::Diagnostic;
use cfg_tokenizer::Token;
use cfg_yellow::{Builder, SyntaxKind, SyntaxSet, SyntaxTree};
use drop_bomb::DropBomb;
use text_size::{TextRange, TextSize};

/// Recovery never skips past these, whatever the caller's recovery set.
const ALWAYS_SYNC: SyntaxSet =
    SyntaxSet::new([SyntaxKind::LEFT_BRACE, SyntaxKind::RIGHT_BRACE, SyntaxKind::EOF]);

/// Blocks, argument lists and list literals nest at most this deep.
pub(crate) const MAX_DEPTH: u32 = 128;

pub(crate) struct Parser<'t> {
    text: &'t str,
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    errors: Vec<Diagnostic>,
    depth: u32,
    deepest: u32,
}

impl<'t> Parser<'t> {
    /// `tokens` must come from lexing `text` and end with `EOF`.
    pub(crate) fn new(text: &'t str, tokens: Vec<Token>) -> Self {
        debug_assert_eq!(tokens.last().map(|token| token.kind), Some(SyntaxKind::EOF));
        Self { text, tokens, pos: 0, events: Vec::new(), errors: Vec::new(), depth: 0, deepest: 0 }
    }

    /// Deepest nesting level reached so far.
    pub(crate) fn deepest(&self) -> u32 {
        self.deepest
    }

    /// Parses the bracketed construct at the current token with `f`, one
    /// level deeper. Past [`MAX_DEPTH`] the construct is not descended into
    /// and becomes a flat `ERROR` node instead.
    pub(crate) fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> CompletedMarker,
    ) -> CompletedMarker {
        if self.depth >= MAX_DEPTH {
            return self.error_too_deep();
        }

        self.depth += 1;
        self.deepest = self.deepest.max(self.depth);
        let m = f(self);
        self.depth -= 1;
        m
    }

    /// Skips the bracketed group starting at the current token. Stops in
    /// front of a `}` closing a brace opened before the group.
    fn error_too_deep(&mut self) -> CompletedMarker {
        use SyntaxKind::*;

        let m = self.start();
        let start = self.current().kind_range.start();
        let (mut braces, mut brackets) = (0_u32, 0_u32);

        loop {
            match self.peek_kind() {
                EOF => break,
                RIGHT_BRACE if braces == 0 => break,
                LEFT_BRACE => braces += 1,
                RIGHT_BRACE => braces -= 1,
                LEFT_PAREN | LEFT_BRACKET => brackets += 1,
                RIGHT_PAREN | RIGHT_BRACKET => brackets = brackets.saturating_sub(1),
                _ => {}
            }
            self.advance();
            if braces == 0 && brackets == 0 {
                break;
            }
        }

        let range = TextRange::new(start, self.prev_end());
        self.errors.push(Diagnostic::error("nesting too deep", range));
        m.complete(self, ERROR)
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens.get(self.pos + n).map_or(SyntaxKind::EOF, |token| token.kind)
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_set(&self, set: &SyntaxSet) -> bool {
        set.contains(self.peek_kind())
    }

    /// The current token is the first one on its line.
    pub(crate) fn at_line_start(&self) -> bool {
        self.pos > 0 && self.current().at_line_start()
    }

    /// A point where recovery stops skipping tokens.
    fn at_sync(&self, recovery: &SyntaxSet) -> bool {
        self.at_set(&recovery.union(ALWAYS_SYNC)) || self.at_line_start()
    }

    pub(crate) fn advance(&mut self) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        if self.at(SyntaxKind::UNKNOWN) {
            let range = self.current().kind_range;
            let message = if self.text[range].starts_with('"') {
                "unterminated string literal"
            } else {
                "unrecognized character"
            };
            self.errors.push(Diagnostic::error(message, range));
        }

        self.events.push(Event::Token);
        self.pos += 1;
    }

    /// Adds the `EOF` token to the current node. Only the root does this.
    pub(crate) fn finish_eof(&mut self) {
        debug_assert!(self.at(SyntaxKind::EOF));
        self.events.push(Event::Token);
        self.pos += 1;
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }

        self.error(format!("expected {}", kind.describe()));
        false
    }

    pub(crate) fn start(&mut self) -> Marker {
        let index = self.events.len() as u32;
        self.events.push(Event::Open { kind: None, wrapped_by: None });
        Marker { index, bomb: DropBomb::new("unfinished syntax node") }
    }

    /// End of the last consumed token, excluding its trivia.
    fn prev_end(&self) -> TextSize {
        match self.pos.checked_sub(1).and_then(|prev| self.tokens.get(prev)) {
            Some(token) => token.kind_range.end(),
            None => self.current().kind_range.start(),
        }
    }

    /// Reports something missing right after the previous token.
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let range = TextRange::empty(self.prev_end());
        self.errors.push(Diagnostic::error(message, range));
    }

    /// Reports a problem with the current token.
    pub(crate) fn error_here(&mut self, message: &str) {
        let range = self.current().kind_range;
        self.errors.push(Diagnostic::error(message, range));
    }

    /// Wraps the current token in an `ERROR` node.
    pub(crate) fn error_and_bump(&mut self, message: &str) {
        let m = self.start();
        if !self.at(SyntaxKind::UNKNOWN) {
            self.error_here(message);
        }
        self.advance();
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Reports `message` and, unless already at a sync point, skips tokens
    /// into an `ERROR` node until one is reached.
    pub(crate) fn error_recover(&mut self, message: &str, recovery: &SyntaxSet) {
        if self.at_sync(recovery) {
            self.error(message);
        } else {
            self.error_and_skip(message, recovery);
        }
    }

    /// Like [`Parser::error_recover`], but always consumes at least one
    /// token. Braces and `EOF` are never skipped.
    pub(crate) fn error_and_skip(&mut self, message: &str, recovery: &SyntaxSet) {
        if matches!(
            self.peek_kind(),
            SyntaxKind::LEFT_BRACE | SyntaxKind::RIGHT_BRACE | SyntaxKind::EOF
        ) {
            self.error(message);
            return;
        }

        let m = self.start();
        let start = self.current().kind_range.start();
        let unknown = self.at(SyntaxKind::UNKNOWN);

        self.advance();
        while !self.at_sync(recovery) {
            self.advance();
        }

        if !unknown {
            let range = TextRange::new(start, self.prev_end());
            self.errors.push(Diagnostic::error(message, range));
        }
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Replays the events into a tree. A node that was wrapped through
    /// [`CompletedMarker::precede`] opens after its wrappers, outermost first.
    pub(crate) fn build_tree(self) -> (SyntaxTree, Vec<Diagnostic>) {
        let Parser { text, tokens, mut events, mut errors, .. } = self;
        let mut builder = Builder::new(text);
        let mut tokens = tokens.into_iter();
        let mut wrappers = Vec::new();

        for index in 0..events.len() {
            match std::mem::replace(&mut events[index], Event::Replayed) {
                Event::Open { kind, mut wrapped_by } => {
                    wrappers.push(kind);
                    while let Some(outer) = wrapped_by {
                        let Event::Open { kind, wrapped_by: next } =
                            std::mem::replace(&mut events[outer as usize], Event::Replayed)
                        else {
                            unreachable!("only an open node can wrap another")
                        };
                        wrappers.push(kind);
                        wrapped_by = next;
                    }

                    for kind in wrappers.drain(..).rev() {
                        let Some(kind) = kind else { unreachable!("marker was never completed") };
                        builder.start_node(kind);
                    }
                }
                Event::Close => builder.finish_node(),
                Event::Token => {
                    let Some(Token { leading, kind, kind_range, trailing }) = tokens.next() else {
                        unreachable!("more token events than tokens")
                    };
                    let (leading, trailing) = (leading.into_iter(), trailing.into_iter());
                    builder.token(leading, kind, kind_range.len(), trailing);
                }
                Event::Replayed => {}
            }
        }

        errors.sort_by_key(|error| error.range().start());
        (builder.finish(), errors)
    }
}

enum Event {
    /// `kind` is filled in when the marker completes. `wrapped_by` is the
    /// index of the `Open` of a node started later that encloses this one.
    Open { kind: Option<SyntaxKind>, wrapped_by: Option<u32> },
    Close,
    Token,
    /// An `Open` already consumed while replaying a wrapped node.
    Replayed,
}

pub(crate) struct Marker {
    index: u32,
    bomb: DropBomb,
}

impl Marker {
    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        let Event::Open { kind: slot, .. } = &mut p.events[self.index as usize] else {
            unreachable!("marker does not point at an open node")
        };
        *slot = Some(kind);

        p.events.push(Event::Close);
        CompletedMarker { index: self.index }
    }
}

pub(crate) struct CompletedMarker {
    index: u32,
}

impl CompletedMarker {
    /// Starts a node that will enclose this one, for rules that only know
    /// their kind after parsing a first child.
    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let outer = p.start();

        let Event::Open { wrapped_by, .. } = &mut p.events[self.index as usize] else {
            unreachable!("marker does not point at an open node")
        };
        *wrapped_by = Some(outer.index);

        outer
    }
}

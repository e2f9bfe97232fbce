mod cursor;
mod error;

use cursor::Cursor;
pub use cfg_yellow::SyntaxKind;
use cfg_yellow::SyntaxKind::*;
use cfg_yellow::{TriviaPiece, TriviaPieceKind, trivia_len};
pub use error::InvalidLexicalFormError;
use text_size::{TextLen, TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub leading: Vec<TriviaPiece>,
    pub kind: SyntaxKind,
    pub kind_range: TextRange,
    pub trailing: Vec<TriviaPiece>,
}

impl Token {
    const EOF: Self = Self {
        kind: EOF,
        kind_range: TextRange::empty(TextSize::new(0)),
        leading: Vec::new(),
        trailing: Vec::new(),
    };

    /// Range covering the token and all of its trivia.
    pub fn full_range(&self) -> TextRange {
        TextRange::new(
            self.kind_range.start() - trivia_len(&self.leading),
            self.kind_range.end() + trivia_len(&self.trailing),
        )
    }

    /// The token and its trivia as a flat run of `(kind, range)` pairs, in
    /// text order.
    pub fn flatten(&self) -> impl Iterator<Item = (SyntaxKind, TextRange)> + '_ {
        let leading = trivia_ranges(&self.leading, self.full_range().start());
        let trailing = trivia_ranges(&self.trailing, self.kind_range.end());
        leading.chain(std::iter::once((self.kind, self.kind_range))).chain(trailing)
    }

    /// Returns `true` if the token is the first one on its line.
    pub fn at_line_start(&self) -> bool {
        self.leading.iter().any(|piece| piece.kind == TriviaPieceKind::Newline)
    }
}

fn trivia_ranges(
    pieces: &[TriviaPiece],
    start: TextSize,
) -> impl Iterator<Item = (SyntaxKind, TextRange)> + '_ {
    pieces.iter().scan(start, |offset, piece| {
        let range = TextRange::at(*offset, piece.len);
        *offset = range.end();
        Some((piece.kind.syntax_kind(), range))
    })
}

pub struct Tokenizer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    current: Token,
    trivia_pieces: Vec<TriviaPiece>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut tokenizer = Self {
            text,
            cursor: Cursor::new(text),
            current: Token::EOF,
            trivia_pieces: Vec::with_capacity(4),
        };
        tokenizer.next_token();
        tokenizer
    }

    fn offset(&self) -> TextSize {
        self.text.text_len() - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        let len = self.cursor.pos_within_token();

        TextRange::new(end - len, end)
    }

    fn text(&self) -> &'a str {
        &self.text[self.range()]
    }

    /// Returns the current token and lexes the next one. Yields `EOF`
    /// forever once the text is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.trivia(false);
        let trailing_start = self.trivia_pieces.len();
        let (kind, kind_range) = self.syntax_kind();
        self.trivia(true);

        let (leading, trailing) = self.trivia_pieces.split_at(trailing_start);
        let leading = leading.to_vec();
        let trailing = trailing.to_vec();

        self.trivia_pieces.clear();
        std::mem::replace(&mut self.current, Token { leading, kind, kind_range, trailing })
    }

    /// Trailing trivia stops in front of a line break, which starts the
    /// leading trivia of the next token.
    fn trivia(&mut self, trailing: bool) {
        loop {
            if self.cursor.is_eof() || (trailing && self.cursor.at_newline()) {
                break;
            }

            let kind = match self.cursor.peek() {
                '\n' => {
                    self.cursor.advance();
                    TriviaPieceKind::Newline
                }
                '\r' if self.cursor.second() == '\n' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    TriviaPieceKind::Newline
                }
                '#' => {
                    self.rest_of_line();
                    TriviaPieceKind::SingleLineComment
                }
                '/' if self.cursor.second() == '/' => {
                    self.rest_of_line();
                    TriviaPieceKind::SingleLineComment
                }
                first_char if first_char.is_whitespace() => {
                    while !self.cursor.is_eof()
                        && !self.cursor.at_newline()
                        && self.cursor.peek().is_whitespace()
                    {
                        self.cursor.advance();
                    }
                    TriviaPieceKind::Whitespace
                }
                _ => break,
            };

            self.trivia_pieces.push(TriviaPiece::new(kind, self.cursor.pos_within_token()));
            self.cursor.reset_pos_within_token();
        }
    }

    fn rest_of_line(&mut self) {
        while !self.cursor.is_eof() && !self.cursor.at_newline() {
            self.cursor.advance();
        }
    }

    fn syntax_kind(&mut self) -> (SyntaxKind, TextRange) {
        let kind = if self.cursor.is_eof() {
            EOF
        } else {
            match self.cursor.advance() {
                '(' => LEFT_PAREN,
                ')' => RIGHT_PAREN,
                '[' => LEFT_BRACKET,
                ']' => RIGHT_BRACKET,
                '{' => LEFT_BRACE,
                '}' => RIGHT_BRACE,
                '=' => EQ,
                ':' => COLON,
                ',' => COMMA,
                ';' => SEMICOLON,
                '-' => MINUS,
                '"' => self.string(),
                first_char @ '0'..='9' => self.number(first_char),
                'A'..='Z' | 'a'..='z' | '_' => {
                    self.cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');

                    match self.text() {
                        "true" => TRUE_KW,
                        "false" => FALSE_KW,
                        _ => NAME,
                    }
                }
                _ => UNKNOWN,
            }
        };

        let range = self.range();
        self.cursor.reset_pos_within_token();

        (kind, range)
    }

    /// Lexes the rest of a string literal. A string cut short by the end of
    /// the line is an `UNKNOWN` token.
    fn string(&mut self) -> SyntaxKind {
        loop {
            if self.cursor.is_eof() || self.cursor.at_newline() {
                return UNKNOWN;
            }

            match self.cursor.advance() {
                '"' => return STRING,
                '\\' if !self.cursor.is_eof() && !self.cursor.at_newline() => {
                    self.cursor.advance();
                }
                _ => {}
            }
        }
    }

    fn number(&mut self, c: char) -> SyntaxKind {
        if c == '0' {
            match self.cursor.peek() {
                'b' | 'o' => {
                    self.cursor.advance();
                    self.digits(false);
                    return INT_NUMBER;
                }
                'x' => {
                    self.cursor.advance();
                    self.digits(true);
                    return INT_NUMBER;
                }
                '0'..='9' | '_' | '.' | 'e' | 'E' => {
                    self.digits(false);
                }
                _ => return INT_NUMBER,
            }
        } else {
            self.digits(false);
        }

        if self.cursor.matches('.') && self.cursor.second().is_ascii_digit() {
            self.cursor.advance();
            self.digits(false);
            self.float_exponent();
            return FLOAT_NUMBER;
        }

        if self.cursor.matches('e') || self.cursor.matches('E') {
            self.float_exponent();
            return FLOAT_NUMBER;
        }

        INT_NUMBER
    }

    fn digits(&mut self, allow_hex: bool) {
        loop {
            match self.cursor.peek() {
                '_' | '0'..='9' => {
                    self.cursor.advance();
                }
                'a'..='f' | 'A'..='F' if allow_hex => {
                    self.cursor.advance();
                }
                _ => return,
            }
        }
    }

    fn float_exponent(&mut self) {
        if self.cursor.matches('e') || self.cursor.matches('E') {
            self.cursor.advance();
            if self.cursor.matches('-') || self.cursor.matches('+') {
                self.cursor.advance();
            }
            self.digits(false);
        }
    }
}

/// Lexes `text` into tokens. The last token is always `EOF`, and the full
/// ranges of the tokens cover the text without gaps.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(text);
    let mut tokens = Vec::new();

    loop {
        let token = tokenizer.next_token();
        let eof = token.kind == EOF;
        tokens.push(token);
        if eof {
            return tokens;
        }
    }
}

/// Returns the kind of `text` if it is exactly one token without trivia.
pub fn lex_single(text: &str) -> Option<SyntaxKind> {
    match tokenize(text).as_slice() {
        [token, eof]
            if token.leading.is_empty()
                && token.trailing.is_empty()
                && eof.leading.is_empty() =>
        {
            Some(token.kind)
        }
        _ => None,
    }
}

/// Checks that `text` lexes as a single `expected` token.
pub fn expect_single(text: &str, expected: SyntaxKind) -> Result<(), InvalidLexicalFormError> {
    if lex_single(text) == Some(expected) {
        Ok(())
    } else {
        Err(InvalidLexicalFormError { text: text.to_owned(), expected })
    }
}

#[cfg(test)]
mod tests {
    use proptest::{prop_assert, prop_assert_eq, proptest};

    use super::*;

    fn token_text<'a>(token: &Token, text: &'a str) -> &'a str {
        &text[token.kind_range]
    }

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        tokenize(text).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn test_number_literals() {
        for int in ["123", "0", "0b1010", "0o755", "0x1f", "0x_FF", "123_456"] {
            assert_eq!(lex_single(int), Some(INT_NUMBER), "{int}");
        }
        for float in ["123.456", "0.0", "1e10", "1.0e-5", "2E+3", "123_456.789_012"] {
            assert_eq!(lex_single(float), Some(FLOAT_NUMBER), "{float}");
        }
    }

    #[test]
    fn test_binding() {
        let text = "x: int = -1;";
        let tokens = tokenize(text);
        let tokens: Vec<_> =
            tokens.iter().map(|token| (token.kind, token_text(token, text))).collect();

        assert_eq!(
            tokens,
            [
                (NAME, "x"),
                (COLON, ":"),
                (NAME, "int"),
                (EQ, "="),
                (MINUS, "-"),
                (INT_NUMBER, "1"),
                (SEMICOLON, ";"),
                (EOF, ""),
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(kinds("true trueish false _false"), [TRUE_KW, NAME, FALSE_KW, NAME, EOF]);
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("f(a, [b]) { }"),
            [
                NAME,
                LEFT_PAREN,
                NAME,
                COMMA,
                LEFT_BRACKET,
                NAME,
                RIGHT_BRACKET,
                RIGHT_PAREN,
                LEFT_BRACE,
                RIGHT_BRACE,
                EOF
            ]
        );
    }

    #[test]
    fn test_trivia_attachment() {
        let text = "a = 1 # one\n  b";
        let tokens = tokenize(text);

        let one = &tokens[2];
        assert_eq!(token_text(one, text), "1");
        assert_eq!(
            one.trailing,
            [
                TriviaPiece::new(TriviaPieceKind::Whitespace, 1.into()),
                TriviaPiece::new(TriviaPieceKind::SingleLineComment, 5.into()),
            ]
        );

        let b = &tokens[3];
        assert_eq!(token_text(b, text), "b");
        assert!(b.at_line_start());
        assert_eq!(
            b.leading,
            [
                TriviaPiece::new(TriviaPieceKind::Newline, 1.into()),
                TriviaPiece::new(TriviaPieceKind::Whitespace, 2.into()),
            ]
        );
        assert_eq!(b.full_range(), TextRange::new(11.into(), 15.into()));
    }

    #[test]
    fn test_crlf_is_one_newline() {
        let text = "a\r\n// note\r\nb";
        let tokens = tokenize(text);

        assert!(tokens[0].trailing.is_empty());
        assert_eq!(
            tokens[1].leading,
            [
                TriviaPiece::new(TriviaPieceKind::Newline, 2.into()),
                TriviaPiece::new(TriviaPieceKind::SingleLineComment, 7.into()),
                TriviaPiece::new(TriviaPieceKind::Newline, 2.into()),
            ]
        );
        assert_eq!(token_text(&tokens[1], text), "b");
    }

    #[test]
    fn test_strings() {
        let text = r#"name = "a \"quoted\" word""#;
        let tokens = tokenize(text);
        assert_eq!(tokens[2].kind, STRING);
        assert_eq!(token_text(&tokens[2], text), r#""a \"quoted\" word""#);
    }

    #[test]
    fn test_unterminated_string() {
        let text = "\"abc\nx";
        let tokens = tokenize(text);

        assert_eq!(tokens[0].kind, UNKNOWN);
        assert_eq!(token_text(&tokens[0], text), "\"abc");
        assert_eq!(tokens[1].kind, NAME);
        assert!(tokens[1].at_line_start());
    }

    #[test]
    fn test_unknown_characters() {
        assert_eq!(kinds("a @ b"), [NAME, UNKNOWN, NAME, EOF]);
        assert_eq!(kinds("\0"), [UNKNOWN, EOF]);
        assert_eq!(kinds("é"), [UNKNOWN, EOF]);
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens, [Token::EOF]);
    }

    #[test]
    fn test_lex_single() {
        assert_eq!(lex_single("foo"), Some(NAME));
        assert_eq!(lex_single("true"), Some(TRUE_KW));
        assert_eq!(lex_single("\"x\""), Some(STRING));
        assert_eq!(lex_single(" foo"), None);
        assert_eq!(lex_single("foo bar"), None);
        assert_eq!(lex_single(""), None);

        assert!(expect_single("bar_2", NAME).is_ok());
        let error = expect_single("bar-2", NAME).unwrap_err();
        assert_eq!(error, InvalidLexicalFormError { text: "bar-2".to_owned(), expected: NAME });
        assert_eq!(error.to_string(), r#""bar-2" does not lex as a name"#);
    }

    proptest! {
        #[test]
        fn tokens_cover_text(text in r"(?s).*") {
            let tokens = tokenize(&text);
            let mut offset = TextSize::new(0);

            for token in &tokens {
                prop_assert_eq!(token.full_range().start(), offset);
                offset = token.full_range().end();
            }

            prop_assert_eq!(offset, text.text_len());
            prop_assert!(tokens.last().is_some_and(|token| token.kind == EOF));
        }

        #[test]
        fn config_like_text_covers(text in r"[a-z0-9 =:,;(){}\[\]\n#/\x22-]*") {
            let tokens = tokenize(&text);
            let rendered: String =
                tokens.iter().map(|token| &text[token.full_range()]).collect();
            prop_assert_eq!(rendered, text);
        }

        #[test]
        fn flattened_tokens_are_contiguous(text in r"[a-z0-9 =,(){}\n#\t]*") {
            let mut offset = TextSize::new(0);

            for token in tokenize(&text) {
                let flat: Vec<_> = token.flatten().collect();
                prop_assert_eq!(flat.iter().filter(|(kind, _)| !kind.is_trivia()).count(), 1);

                for (_, range) in flat {
                    prop_assert_eq!(range.start(), offset);
                    offset = range.end();
                }
            }

            prop_assert_eq!(offset, text.text_len());
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u16)]
pub enum SyntaxKind {
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    EQ,
    COLON,
    COMMA,
    SEMICOLON,
    MINUS,

    TRUE_KW,
    FALSE_KW,
    NAME,

    INT_NUMBER,
    FLOAT_NUMBER,
    STRING,

    WHITESPACE,
    NEWLINE,
    LINE_COMMENT,

    UNKNOWN,
    EOF,

    FILE,
    FUNC_CALL,
    FUNC_NAME,
    ARG_LIST,
    BLOCK,
    BINDING,
    FIELD_NAME,
    TYPE_ASCRIPTION,
    NUMBER_LITERAL,
    STRING_LITERAL,
    BOOL_LITERAL,
    NAME_REF,
    LIST_LITERAL,
    ERROR,
}

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::NEWLINE | Self::LINE_COMMENT)
    }

    /// Human readable form used in diagnostics, e.g. `')'` or `a name`.
    pub fn describe(self) -> &'static str {
        match self {
            Self::LEFT_PAREN => "'('",
            Self::RIGHT_PAREN => "')'",
            Self::LEFT_BRACKET => "'['",
            Self::RIGHT_BRACKET => "']'",
            Self::LEFT_BRACE => "'{'",
            Self::RIGHT_BRACE => "'}'",
            Self::EQ => "'='",
            Self::COLON => "':'",
            Self::COMMA => "','",
            Self::SEMICOLON => "';'",
            Self::MINUS => "'-'",
            Self::TRUE_KW => "'true'",
            Self::FALSE_KW => "'false'",
            Self::NAME => "a name",
            Self::INT_NUMBER | Self::FLOAT_NUMBER => "a number",
            Self::STRING => "a string",
            Self::EOF => "end of file",
            _ => "a token",
        }
    }
}

use cfg_parse::{Parse, Reparse};
use cfg_yellow::SyntaxKind::{self, *};
use cfg_yellow::{ElementId, MissingChildError, SyntaxNode, SyntaxToken, SyntaxTree};

use crate::{EditError, Node};

macro_rules! ast_node {
    ($($(#[$attr:meta])* $name:ident => $kind:ident,)*) => {$(
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) ElementId);

        impl Node for $name {
            fn cast(syntax: SyntaxNode<'_>) -> Option<Self> {
                (syntax.kind() == $kind).then(|| Self(syntax.id()))
            }

            fn id(self) -> ElementId {
                self.0
            }
        }
    )*};
}

ast_node! {
    File => FILE,
    FuncCall => FUNC_CALL,
    FuncName => FUNC_NAME,
    ArgList => ARG_LIST,
    Block => BLOCK,
    Binding => BINDING,
    FieldName => FIELD_NAME,
    TypeAscription => TYPE_ASCRIPTION,
    NumberLiteral => NUMBER_LITERAL,
    StringLiteral => STRING_LITERAL,
    BoolLiteral => BOOL_LITERAL,
    ListLiteral => LIST_LITERAL,
    NameRef => NAME_REF,
}

fn required(node: SyntaxNode<'_>, kind: SyntaxKind) -> Result<ElementId, MissingChildError> {
    node.find_required_child_of_kind(kind).map(|child| child.id())
}

fn optional(node: SyntaxNode<'_>, kind: SyntaxKind) -> Option<ElementId> {
    node.find_child_of_kind(kind).map(|child| child.id())
}

fn required_token(
    node: SyntaxNode<'_>,
    kind: SyntaxKind,
) -> Result<SyntaxToken<'_>, MissingChildError> {
    node.find_required_child_of_kind(kind)?.into_token().ok_or(MissingChildError {
        parent: node.kind(),
        expected: kind,
        range: node.text_range(),
    })
}

/// Replaces the `kind` token under `node` after checking that `text` is a
/// single token of that kind.
fn set_token(
    parse: &mut Parse,
    node: ElementId,
    kind: SyntaxKind,
    text: &str,
) -> Result<Reparse, EditError> {
    let token = match parse.tree().node(node) {
        Some(node) => required(node, kind)?,
        None => panic!("{node:?} is not a live node"),
    };
    cfg_tokenizer::expect_single(text, kind)?;
    Ok(parse.replace_text(token, text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    FuncCall(FuncCall),
    Binding(Binding),
}

impl Node for Item {
    fn cast(syntax: SyntaxNode<'_>) -> Option<Self> {
        match syntax.kind() {
            FUNC_CALL => Some(Item::FuncCall(FuncCall(syntax.id()))),
            BINDING => Some(Item::Binding(Binding(syntax.id()))),
            _ => None,
        }
    }

    fn id(self) -> ElementId {
        match self {
            Item::FuncCall(call) => call.0,
            Item::Binding(binding) => binding.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Number(NumberLiteral),
    String(StringLiteral),
    Bool(BoolLiteral),
    List(ListLiteral),
    FuncCall(FuncCall),
    NameRef(NameRef),
}

impl Node for Value {
    fn cast(syntax: SyntaxNode<'_>) -> Option<Self> {
        let id = syntax.id();
        let value = match syntax.kind() {
            NUMBER_LITERAL => Value::Number(NumberLiteral(id)),
            STRING_LITERAL => Value::String(StringLiteral(id)),
            BOOL_LITERAL => Value::Bool(BoolLiteral(id)),
            LIST_LITERAL => Value::List(ListLiteral(id)),
            FUNC_CALL => Value::FuncCall(FuncCall(id)),
            NAME_REF => Value::NameRef(NameRef(id)),
            _ => return None,
        };
        Some(value)
    }

    fn id(self) -> ElementId {
        match self {
            Value::Number(it) => it.0,
            Value::String(it) => it.0,
            Value::Bool(it) => it.0,
            Value::List(it) => it.0,
            Value::FuncCall(it) => it.0,
            Value::NameRef(it) => it.0,
        }
    }
}

impl File {
    pub fn new(tree: &SyntaxTree) -> Self {
        Self(tree.root().id())
    }

    pub fn items(self, tree: &SyntaxTree) -> impl Iterator<Item = Item> + '_ {
        self.syntax(tree).children().filter_map(Item::cast)
    }
}

impl FuncCall {
    pub fn func_name(self, tree: &SyntaxTree) -> Result<FuncName, MissingChildError> {
        required(self.syntax(tree), FUNC_NAME).map(FuncName)
    }

    pub fn arg_list(self, tree: &SyntaxTree) -> Result<ArgList, MissingChildError> {
        required(self.syntax(tree), ARG_LIST).map(ArgList)
    }

    pub fn block(self, tree: &SyntaxTree) -> Option<Block> {
        optional(self.syntax(tree), BLOCK).map(Block)
    }

    pub fn func_name_text(self, tree: &SyntaxTree) -> Result<&str, MissingChildError> {
        self.func_name(tree)?.func_name_text(tree)
    }
}

impl FuncName {
    pub fn name_token(self, tree: &SyntaxTree) -> Result<SyntaxToken<'_>, MissingChildError> {
        required_token(self.syntax(tree), NAME)
    }

    pub fn func_name_text(self, tree: &SyntaxTree) -> Result<&str, MissingChildError> {
        self.name_token(tree).map(SyntaxToken::text_trimmed)
    }

    pub fn set_func_name(self, parse: &mut Parse, name: &str) -> Result<Reparse, EditError> {
        set_token(parse, self.0, NAME, name)
    }
}

impl ArgList {
    pub fn args(self, tree: &SyntaxTree) -> impl Iterator<Item = Value> + '_ {
        self.syntax(tree).children().filter_map(Value::cast)
    }
}

impl Block {
    pub fn items(self, tree: &SyntaxTree) -> impl Iterator<Item = Item> + '_ {
        self.syntax(tree).children().filter_map(Item::cast)
    }
}

impl Binding {
    pub fn field_name(self, tree: &SyntaxTree) -> Result<FieldName, MissingChildError> {
        required(self.syntax(tree), FIELD_NAME).map(FieldName)
    }

    pub fn type_ascription(self, tree: &SyntaxTree) -> Option<TypeAscription> {
        optional(self.syntax(tree), TYPE_ASCRIPTION).map(TypeAscription)
    }

    /// Missing only where the parser recovered from an error. The error names
    /// the first kind a value can take, as [`validate`](crate::rules::validate)
    /// does.
    pub fn value(self, tree: &SyntaxTree) -> Result<Value, MissingChildError> {
        let node = self.syntax(tree);
        node.children().find_map(Value::cast).ok_or(MissingChildError {
            parent: BINDING,
            expected: NUMBER_LITERAL,
            range: node.text_range(),
        })
    }

    pub fn field_name_text(self, tree: &SyntaxTree) -> Result<&str, MissingChildError> {
        self.field_name(tree)?.field_name_text(tree)
    }
}

impl FieldName {
    pub fn name_token(self, tree: &SyntaxTree) -> Result<SyntaxToken<'_>, MissingChildError> {
        required_token(self.syntax(tree), NAME)
    }

    pub fn field_name_text(self, tree: &SyntaxTree) -> Result<&str, MissingChildError> {
        self.name_token(tree).map(SyntaxToken::text_trimmed)
    }

    pub fn set_field_name(self, parse: &mut Parse, name: &str) -> Result<Reparse, EditError> {
        set_token(parse, self.0, NAME, name)
    }
}

impl TypeAscription {
    pub fn name_token(self, tree: &SyntaxTree) -> Result<SyntaxToken<'_>, MissingChildError> {
        required_token(self.syntax(tree), NAME)
    }

    pub fn type_name_text(self, tree: &SyntaxTree) -> Result<&str, MissingChildError> {
        self.name_token(tree).map(SyntaxToken::text_trimmed)
    }
}

impl NumberLiteral {
    pub fn minus_token(self, tree: &SyntaxTree) -> Option<SyntaxToken<'_>> {
        self.syntax(tree).find_child_of_kind(MINUS)?.into_token()
    }

    /// The `INT_NUMBER` or `FLOAT_NUMBER` token, without its sign.
    pub fn number_token(self, tree: &SyntaxTree) -> Result<SyntaxToken<'_>, MissingChildError> {
        let node = self.syntax(tree);
        node.children_with_tokens()
            .filter_map(|child| child.into_token())
            .find(|token| matches!(token.kind(), INT_NUMBER | FLOAT_NUMBER))
            .ok_or(MissingChildError {
                parent: NUMBER_LITERAL,
                expected: INT_NUMBER,
                range: node.text_range(),
            })
    }

    pub fn is_negative(self, tree: &SyntaxTree) -> bool {
        self.minus_token(tree).is_some()
    }

    /// The value of an integer literal, or `None` for floats and integers
    /// that do not fit.
    pub fn as_i64(self, tree: &SyntaxTree) -> Option<i64> {
        let token = self.number_token(tree).ok().filter(|token| token.kind() == INT_NUMBER)?;
        let digits = token.text_trimmed().replace('_', "");

        let (radix, digits) = match digits.get(..2) {
            Some("0x") => (16, &digits[2..]),
            Some("0o") => (8, &digits[2..]),
            Some("0b") => (2, &digits[2..]),
            _ => (10, digits.as_str()),
        };

        let magnitude = u64::from_str_radix(digits, radix).ok()?;
        if self.is_negative(tree) {
            0_i64.checked_sub_unsigned(magnitude)
        } else {
            i64::try_from(magnitude).ok()
        }
    }

    pub fn as_f64(self, tree: &SyntaxTree) -> Option<f64> {
        let token = self.number_token(tree).ok()?;
        if token.kind() == INT_NUMBER {
            return self.as_i64(tree).map(|value| value as f64);
        }

        let value: f64 = token.text_trimmed().replace('_', "").parse().ok()?;
        Some(if self.is_negative(tree) { -value } else { value })
    }
}

impl StringLiteral {
    /// The string with quotes removed and escapes resolved.
    pub fn value(self, tree: &SyntaxTree) -> Result<String, MissingChildError> {
        let text = required_token(self.syntax(tree), STRING)?.text_trimmed();
        let inner = text.strip_prefix('"').and_then(|text| text.strip_suffix('"')).unwrap_or(text);
        Ok(unescape(inner))
    }

    /// Replaces the literal with one whose [`value`](Self::value) is `value`.
    pub fn set_value(self, parse: &mut Parse, value: &str) -> Result<Reparse, EditError> {
        set_token(parse, self.0, STRING, &escape(value))
    }
}

impl BoolLiteral {
    /// The `true` or `false` keyword.
    pub fn token(self, tree: &SyntaxTree) -> Result<SyntaxToken<'_>, MissingChildError> {
        let node = self.syntax(tree);
        node.children_with_tokens()
            .filter_map(|child| child.into_token())
            .find(|token| matches!(token.kind(), TRUE_KW | FALSE_KW))
            .ok_or(MissingChildError {
                parent: BOOL_LITERAL,
                expected: TRUE_KW,
                range: node.text_range(),
            })
    }

    pub fn value(self, tree: &SyntaxTree) -> bool {
        self.token(tree).is_ok_and(|token| token.kind() == TRUE_KW)
    }
}

impl ListLiteral {
    pub fn elements(self, tree: &SyntaxTree) -> impl Iterator<Item = Value> + '_ {
        self.syntax(tree).children().filter_map(Value::cast)
    }
}

impl NameRef {
    pub fn name_token(self, tree: &SyntaxTree) -> Result<SyntaxToken<'_>, MissingChildError> {
        required_token(self.syntax(tree), NAME)
    }

    pub fn name_text(self, tree: &SyntaxTree) -> Result<&str, MissingChildError> {
        self.name_token(tree).map(SyntaxToken::text_trimmed)
    }
}

fn unescape(text: &str) -> String {
    let mut buf = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            buf.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => buf.push('\n'),
            Some('r') => buf.push('\r'),
            Some('t') => buf.push('\t'),
            Some('0') => buf.push('\0'),
            Some(c @ ('\\' | '"')) => buf.push(c),
            // Unknown escapes are kept verbatim.
            Some(c) => {
                buf.push('\\');
                buf.push(c);
            }
            None => buf.push('\\'),
        }
    }

    buf
}

fn escape(value: &str) -> String {
    let mut buf = String::with_capacity(value.len() + 2);
    buf.push('"');
    for c in value.chars() {
        match c {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            '\0' => buf.push_str("\\0"),
            c => buf.push(c),
        }
    }
    buf.push('"');
    buf
}

#[cfg(test)]
mod escape_tests {
    use proptest::prelude::*;

    use super::{escape, unescape};

    #[test]
    fn unknown_escape_is_kept() {
        assert_eq!(unescape(r"a\qb\"), r"a\qb\");
        assert_eq!(unescape(r#"\"\\\n"#), "\"\\\n");
    }

    proptest! {
        #[test]
        fn escape_round_trips(value in "\\PC{0,16}|[\"\\\\\n\r\t\0]{0,8}") {
            let literal = escape(&value);
            prop_assert_eq!(cfg_tokenizer::lex_single(&literal), Some(cfg_yellow::SyntaxKind::STRING));
            prop_assert_eq!(unescape(&literal[1..literal.len() - 1]), value);
        }
    }
}

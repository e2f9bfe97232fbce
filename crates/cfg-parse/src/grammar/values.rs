use cfg_yellow::SyntaxKind::{self, *};
use cfg_yellow::SyntaxSet;

use super::{delimited, items};
use crate::parser::{CompletedMarker, Parser};

pub(crate) const VALUE_FIRST: SyntaxSet = SyntaxSet::new([
    INT_NUMBER,
    FLOAT_NUMBER,
    MINUS,
    STRING,
    TRUE_KW,
    FALSE_KW,
    LEFT_BRACKET,
    NAME,
]);

/// Parses a value if one starts here. Consumes nothing otherwise.
pub(crate) fn value(p: &mut Parser) -> Option<CompletedMarker> {
    let m = match p.peek_kind() {
        INT_NUMBER | FLOAT_NUMBER | MINUS => number_literal(p),
        STRING => token_node(p, STRING_LITERAL),
        TRUE_KW | FALSE_KW => token_node(p, BOOL_LITERAL),
        LEFT_BRACKET => list_literal(p),
        NAME if p.nth(1) == LEFT_PAREN => {
            let name = token_node(p, FUNC_NAME);
            items::func_call(p, name)
        }
        NAME => token_node(p, NAME_REF),
        _ => return None,
    };
    Some(m)
}

fn token_node(p: &mut Parser, kind: SyntaxKind) -> CompletedMarker {
    let m = p.start();
    p.advance();
    m.complete(p, kind)
}

fn number_literal(p: &mut Parser) -> CompletedMarker {
    let m = p.start();
    p.eat(MINUS);
    if !p.eat(INT_NUMBER) && !p.eat(FLOAT_NUMBER) {
        p.error("expected a number after '-'");
    }
    m.complete(p, NUMBER_LITERAL)
}

fn list_literal(p: &mut Parser) -> CompletedMarker {
    p.nested(list_literal_inner)
}

fn list_literal_inner(p: &mut Parser) -> CompletedMarker {
    let m = p.start();

    let closed = delimited(
        p,
        LEFT_BRACKET,
        RIGHT_BRACKET,
        COMMA,
        "expected a list element",
        &VALUE_FIRST,
        |p| value(p).is_some(),
    );

    if !closed {
        p.error("expected ']'");
    }
    m.complete(p, LIST_LITERAL)
}

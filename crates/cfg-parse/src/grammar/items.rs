use cfg_yellow::SyntaxKind::*;
use cfg_yellow::SyntaxSet;

use super::{delimited, values};
use crate::parser::{CompletedMarker, Parser};

const ITEM_RECOVERY: SyntaxSet = SyntaxSet::new([NAME]);
const BINDING_RECOVERY: SyntaxSet = SyntaxSet::new([EQ, SEMICOLON, COMMA]);
const VALUE_RECOVERY: SyntaxSet = SyntaxSet::new([SEMICOLON, COMMA]);

pub(crate) fn file(p: &mut Parser) {
    let m = p.start();

    while !p.at(EOF) {
        item(p);
    }

    p.finish_eof();
    m.complete(p, FILE);
}

fn item(p: &mut Parser) {
    match p.peek_kind() {
        NAME => {
            let name = p.start();
            p.advance();
            if matches!(p.peek_kind(), LEFT_PAREN | LEFT_BRACE) {
                let name = name.complete(p, FUNC_NAME);
                func_call(p, name);
            } else {
                let name = name.complete(p, FIELD_NAME);
                binding(p, name);
            }
        }
        LEFT_BRACE => {
            let m = p.start();
            p.error_here("expected an item, found a block");
            block(p);
            m.complete(p, ERROR);
        }
        RIGHT_BRACE => p.error_and_bump("unexpected '}'"),
        _ => p.error_and_skip("expected an item", &ITEM_RECOVERY),
    }
}

/// `FuncName ArgList Block?`, entered right after the function name.
pub(crate) fn func_call(p: &mut Parser, name: CompletedMarker) -> CompletedMarker {
    let m = name.precede(p);

    if p.at(LEFT_PAREN) {
        arg_list(p);
    } else {
        p.expect(LEFT_PAREN);
    }

    if p.at(LEFT_BRACE) {
        block(p);
    }

    m.complete(p, FUNC_CALL)
}

/// An argument list without its `)` is kept as an `ERROR` node.
fn arg_list(p: &mut Parser) -> CompletedMarker {
    p.nested(|p| {
        let m = p.start();

        let closed = delimited(
            p,
            LEFT_PAREN,
            RIGHT_PAREN,
            COMMA,
            "expected an argument",
            &values::VALUE_FIRST,
            |p| values::value(p).is_some(),
        );

        if closed {
            m.complete(p, ARG_LIST)
        } else {
            p.error("expected ')'");
            m.complete(p, ERROR)
        }
    })
}

/// `{ Item* }`. Also the entry point for re-parsing a single block.
pub(crate) fn block(p: &mut Parser) -> CompletedMarker {
    debug_assert_eq!(p.peek_kind(), LEFT_BRACE);

    p.nested(|p| {
        let m = p.start();
        p.advance();

        while !matches!(p.peek_kind(), RIGHT_BRACE | EOF) {
            item(p);
        }

        p.expect(RIGHT_BRACE);
        m.complete(p, BLOCK)
    })
}

fn binding(p: &mut Parser, name: CompletedMarker) {
    let m = name.precede(p);

    if p.at(COLON) {
        type_ascription(p);
    }

    // The value has to start on the line of the `=`.
    if (p.eat(EQ) || recover_eq(p)) && (p.at_line_start() || values::value(p).is_none()) {
        p.error_recover("expected a value", &VALUE_RECOVERY);
    }

    if p.at(SEMICOLON) || p.at(COMMA) {
        p.advance();
    }

    m.complete(p, BINDING);
}

/// Skips junk in front of a misplaced `=`, returning whether one was found.
fn recover_eq(p: &mut Parser) -> bool {
    p.error_recover("expected '='", &BINDING_RECOVERY);
    p.eat(EQ)
}

fn type_ascription(p: &mut Parser) {
    debug_assert_eq!(p.peek_kind(), COLON);

    let m = p.start();
    p.advance();
    if !p.eat(NAME) {
        p.error_recover("expected a type name", &BINDING_RECOVERY);
    }
    m.complete(p, TYPE_ASCRIPTION);
}

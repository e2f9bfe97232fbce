use cfg_yellow::SyntaxKind::{self, *};
use cfg_yellow::SyntaxSet;

use crate::parser::Parser;

pub(crate) mod items;
mod values;

/// Parses `bra (element (delim element)* delim?)? ket`, returning whether
/// `ket` was found. Stops early at braces, so a missing `ket` never makes
/// the list swallow a block.
pub(crate) fn delimited(
    p: &mut Parser<'_>,
    bra: SyntaxKind,
    ket: SyntaxKind,
    delim: SyntaxKind,
    unexpected_message: &'static str,
    first_set: &SyntaxSet,
    mut parser: impl FnMut(&mut Parser<'_>) -> bool,
) -> bool {
    debug_assert_eq!(p.peek_kind(), bra);
    p.advance();

    while !matches!(p.peek_kind(), EOF | LEFT_BRACE | RIGHT_BRACE) && !p.at(ket) {
        if p.at(delim) {
            p.error_and_bump(unexpected_message);
            continue;
        }

        if !p.at_set(first_set) {
            if p.at_line_start() {
                break;
            }
            p.error_and_bump(unexpected_message);
            continue;
        }

        if !parser(p) {
            break;
        }

        if !p.eat(delim) {
            if p.at_set(first_set) && !p.at_line_start() {
                p.expect(delim);
            } else {
                break;
            }
        }
    }

    p.eat(ket)
}

//! Incremental re-parsing.
//!
//! An edit is applied with the cheapest of three strategies: patching a
//! single token in place, re-parsing the innermost block around the edit, or
//! parsing the whole text again. The first two only apply when the result
//! is guaranteed to match a full parse.

use cfg_errors::Diagnostic;
use cfg_tokenizer::Token;
use cfg_yellow::SyntaxKind::{self, *};
use cfg_yellow::{
    ElementId, NodeOrToken, SyntaxToken, SyntaxTree, TextRange, TextSize, TriviaPiece,
};

use crate::parser::MAX_DEPTH;
use crate::{Parse, TextEdit, grammar, parser};

/// How an edit was merged into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reparse {
    /// One token's text was patched; every element id survived.
    Token,
    /// The innermost enclosing block was re-parsed and spliced in.
    Block,
    /// The whole text was parsed again.
    Full,
}

pub(crate) fn apply(parse: &mut Parse, edit: &TextEdit) -> Reparse {
    let reparse = if let Some(patch) = find_token_patch(&parse.tree, edit) {
        apply_token_patch(parse, patch);
        Reparse::Token
    } else if let Some(fragment) = reparse_block(&parse.tree, edit) {
        apply_block(parse, edit, fragment);
        Reparse::Block
    } else {
        let mut text = parse.text().to_owned();
        edit.apply(&mut text);
        *parse = crate::parse(&text);
        Reparse::Full
    };

    tracing::debug!(?reparse, range = ?edit.range, inserted = edit.text.len(), "applied edit");
    reparse
}

struct TokenPatch {
    id: ElementId,
    old_range: TextRange,
    text: String,
}

fn is_patchable(kind: SyntaxKind) -> bool {
    matches!(kind, NAME | INT_NUMBER | FLOAT_NUMBER | STRING)
}

fn find_token_patch(tree: &SyntaxTree, edit: &TextEdit) -> Option<TokenPatch> {
    let token = tree.root().token_at_offset(edit.range.start()).find(|token| {
        is_patchable(token.kind()) && token.trimmed_range().contains_range(edit.range)
    })?;

    let old_range = token.trimmed_range();
    let mut text = token.text_trimmed().to_owned();
    TextEdit::replace(edit.range - old_range.start(), edit.text.as_str()).apply(&mut text);

    if cfg_tokenizer::lex_single(&text) != Some(token.kind()) {
        return None;
    }

    // The neighbours may lex differently next to the new text.
    let prev = token.prev_token();
    let next = token.next_token()?;
    let window_start = prev.unwrap_or(token).text_range().start();
    let window = TextRange::new(window_start, next.text_range().end());

    let mut window_text = tree.text()[window].to_owned();
    TextEdit::replace(edit.range - window_start, edit.text.as_str()).apply(&mut window_text);
    let relexed = cfg_tokenizer::tokenize(&window_text);

    let expected = prev
        .map(|prev| (prev, prev.trimmed_range().len()))
        .into_iter()
        .chain([(token, TextSize::of(text.as_str())), (next, next.trimmed_range().len())]);

    let mut relexed = relexed.iter();
    for (expected, len) in expected {
        if !relexed.next().is_some_and(|token| same_token(token, expected, len)) {
            return None;
        }
    }
    let at_end = next.kind() == EOF
        || relexed.next().is_some_and(|eof| eof.kind == EOF && eof.leading.is_empty());
    if !at_end {
        return None;
    }

    Some(TokenPatch { id: token.id(), old_range, text })
}

fn same_token(token: &Token, expected: SyntaxToken<'_>, len: TextSize) -> bool {
    token.kind == expected.kind()
        && token.kind_range.len() == len
        && token.leading == expected.leading_trivia()
        && token.trailing == expected.trailing_trivia()
}

fn apply_token_patch(parse: &mut Parse, patch: TokenPatch) {
    let TokenPatch { id, old_range, text } = patch;
    parse.tree.patch_token(id, &text);

    let new_end = old_range.start() + TextSize::of(text.as_str());
    let map = |offset: TextSize| {
        if offset <= old_range.start() { offset } else { offset - old_range.end() + new_end }
    };

    parse.errors = std::mem::take(&mut parse.errors)
        .into_iter()
        .map(|error| error.map_range(|range| map_range(range, map)))
        .collect();
}

struct BlockFragment {
    id: ElementId,
    /// Offset of the block in the old text.
    offset: TextSize,
    /// Old range between the braces; errors in there came from the block.
    inner: TextRange,
    tree: SyntaxTree,
    errors: Vec<Diagnostic>,
}

fn reparse_block(tree: &SyntaxTree, edit: &TextEdit) -> Option<BlockFragment> {
    let start_node = match tree.root().covering_element(edit.range) {
        NodeOrToken::Node(node) => node,
        NodeOrToken::Token(token) => token.parent(),
    };

    // Only a block closed by its own `}` is known to end where it ends now.
    let (block, open, close) =
        start_node.ancestors().filter(|node| node.kind() == BLOCK).find_map(|block| {
            let open = block.first_child_or_token()?.into_token()?;
            let close = block.last_child_or_token()?.into_token()?;
            let encloses = open.kind() == LEFT_BRACE
                && close.kind() == RIGHT_BRACE
                && open.trimmed_range().end() <= edit.range.start()
                && edit.range.end() <= close.trimmed_range().start();
            encloses.then_some((block, open, close))
        })?;

    let offset = block.text_range().start();
    let mut text = block.text().to_owned();
    TextEdit::replace(edit.range - offset, edit.text.as_str()).apply(&mut text);

    let tokens = cfg_tokenizer::tokenize(&text);
    if !is_balanced_block(&tokens, open.leading_trivia(), close.trailing_trivia()) {
        return None;
    }

    let mut parser = parser::Parser::new(&text, tokens);
    grammar::items::block(&mut parser);

    // The fragment was parsed from depth zero. Every enclosing level is an
    // ancestor node, so staying below the limit here means a full parse
    // would not have reached it either.
    let enclosing = u32::try_from(block.ancestors().count()).ok()?;
    if enclosing.saturating_add(parser.deepest()) >= MAX_DEPTH {
        return None;
    }
    let (fragment, errors) = parser.build_tree();

    Some(BlockFragment {
        id: block.id(),
        offset,
        inner: TextRange::new(open.trimmed_range().end(), close.trimmed_range().start()),
        tree: fragment,
        errors,
    })
}

/// Checks that `tokens` are one `{ ... }` whose braces match each other and
/// whose outer trivia is unchanged.
fn is_balanced_block(tokens: &[Token], leading: &[TriviaPiece], trailing: &[TriviaPiece]) -> bool {
    let [first, .., last, eof] = tokens else {
        return false;
    };

    if first.kind != LEFT_BRACE
        || first.leading != leading
        || last.kind != RIGHT_BRACE
        || last.trailing != trailing
        || !eof.leading.is_empty()
    {
        return false;
    }

    let last_index = tokens.len() - 2;
    let mut depth = 0_i32;
    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            LEFT_BRACE => depth += 1,
            RIGHT_BRACE => {
                depth -= 1;
                if depth == 0 && index != last_index {
                    return false;
                }
            }
            _ => {}
        }
    }

    depth == 0
}

fn apply_block(parse: &mut Parse, edit: &TextEdit, fragment: BlockFragment) {
    let BlockFragment { id, offset, inner, tree, errors } = fragment;
    parse.tree.replace_subtree(id, tree);

    let new_end = edit.range.start() + TextSize::of(edit.text.as_str());
    let map = |offset: TextSize| {
        if offset <= edit.range.start() { offset } else { offset - edit.range.end() + new_end }
    };

    let mut merged: Vec<Diagnostic> = std::mem::take(&mut parse.errors)
        .into_iter()
        .filter(|error| !inner.contains_range(error.range()))
        .map(|error| error.map_range(|range| map_range(range, map)))
        .collect();
    merged.extend(errors.into_iter().map(|error| error.map_range(|range| range + offset)));
    merged.sort_by_key(|error| error.range().start());

    parse.errors = merged;
}

fn map_range(range: TextRange, map: impl Fn(TextSize) -> TextSize) -> TextRange {
    TextRange::new(map(range.start()), map(range.end()))
}

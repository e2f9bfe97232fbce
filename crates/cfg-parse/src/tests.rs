use std::fs;
use std::path::{Path, PathBuf};

use cfg_yellow::SyntaxKind::*;
use cfg_yellow::{TextRange, TextSize};
use expect_test::expect_file;
use proptest::prelude::*;

use crate::{Parse, Reparse, TextEdit, parse};

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "cfg" {
                    let expected = path.with_extension("tree");
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, expected, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

#[test]
fn parse_test_data() {
    let cases = TestCase::list();
    assert!(!cases.is_empty(), "no test cases found");

    for case in cases {
        let parse = parse(&case.text);
        assert_eq!(parse.text(), case.text, "{} is not lossless", case.input.display());
        expect_file![&case.expected].assert_eq(&parse.debug_dump());
    }
}

#[test]
fn empty_file() {
    let parse = parse("");
    assert_eq!(parse.debug_dump(), "FILE@0..0\n  EOF@0..0 \"\"\n");
    assert!(parse.errors().is_empty());
}

#[test]
fn func_call_shape() {
    let parse = parse("foo() { bar = 1 }");
    let call = parse.root().children().next().unwrap();
    assert_eq!(call.kind(), FUNC_CALL);
    assert_eq!(
        call.children().map(|node| node.kind()).collect::<Vec<_>>(),
        [FUNC_NAME, ARG_LIST, BLOCK]
    );
    assert_eq!(call.find_child_of_kind(FUNC_NAME).unwrap().text(), "foo");
    assert!(parse.errors().is_empty());
}

#[test]
fn missing_close_paren_keeps_block() {
    let parse = parse("foo( { bar = 1 }");
    let call = parse.root().children().next().unwrap();
    assert_eq!(
        call.children().map(|node| node.kind()).collect::<Vec<_>>(),
        [FUNC_NAME, ERROR, BLOCK]
    );
    let messages: Vec<_> = parse.errors().iter().map(|error| error.message()).collect();
    assert_eq!(messages, ["expected ')'"]);
}

fn assert_matches_full_parse(parse: &Parse) {
    let expected = crate::parse(parse.text());
    assert_eq!(parse.debug_dump(), expected.debug_dump(), "text: {:?}", parse.text());
}

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

fn messages(parse: &Parse) -> Vec<&str> {
    parse.errors().iter().map(|error| error.message()).collect()
}

#[test]
fn rename_patches_single_token() {
    let mut parse = parse("foo() { bar = 1 }\n");
    let binding = parse.root().descendants().find(|node| node.kind() == BINDING).unwrap().id();

    let reparse = parse.apply_edit(&TextEdit::replace(range(8, 11), "baz"));

    assert_eq!(reparse, Reparse::Token);
    assert_eq!(parse.text(), "foo() { baz = 1 }\n");
    assert_eq!(parse.tree().node(binding).unwrap().text_trimmed(), "baz = 1");
    assert_matches_full_parse(&parse);
}

#[test]
fn replace_text_keeps_trivia() {
    let mut parse = parse("a = 1\nb = 2\n");
    let name = parse
        .root()
        .descendant_tokens()
        .filter(|token| token.kind() == NAME)
        .nth(1)
        .unwrap()
        .id();

    let reparse = parse.replace_text(name, "port");

    assert_eq!(reparse, Reparse::Token);
    assert_eq!(parse.text(), "a = 1\nport = 2\n");
    assert_eq!(parse.tree().token(name).unwrap().text(), "\nport ");
    assert_matches_full_parse(&parse);
}

#[test]
fn token_patch_shifts_later_errors() {
    let mut parse = parse("a = 1\n}\n");
    assert_eq!(parse.errors()[0].range(), range(6, 7));

    let reparse = parse.apply_edit(&TextEdit::replace(range(0, 1), "alpha"));

    assert_eq!(reparse, Reparse::Token);
    assert_eq!(parse.errors()[0].range(), range(10, 11));
    assert_matches_full_parse(&parse);
}

#[test]
fn token_kind_change_is_not_patched() {
    let mut parse = parse("a = 1\n");

    let reparse = parse.apply_edit(&TextEdit::replace(range(4, 5), "x"));

    assert_eq!(reparse, Reparse::Full);
    let literal = parse.root().descendants().find(|node| node.kind() == NAME_REF);
    assert!(literal.is_some());
    assert_matches_full_parse(&parse);
}

#[test]
fn edit_inside_block_reparses_block() {
    let mut parse = parse("foo() { bar = 1 }\n");
    let name = parse.root().descendants().find(|node| node.kind() == FUNC_NAME).unwrap().id();

    let reparse = parse.apply_edit(&TextEdit::insert(TextSize::new(15), "\n  baz = 2"));

    assert_eq!(reparse, Reparse::Block);
    assert_eq!(parse.text(), "foo() { bar = 1\n  baz = 2 }\n");
    assert_eq!(parse.tree().node(name).unwrap().text(), "foo");
    assert_matches_full_parse(&parse);
}

#[test]
fn block_reparse_replaces_inner_errors() {
    let mut parse = parse("f() {\n  a = @\n}\n}\n");
    let messages: Vec<_> = parse.errors().iter().map(|error| error.message()).collect();
    assert_eq!(messages, ["unrecognized character", "unexpected '}'"]);

    let reparse = parse.apply_edit(&TextEdit::delete(range(12, 13)));

    assert_eq!(reparse, Reparse::Block);
    let messages: Vec<_> = parse.errors().iter().map(|error| error.message()).collect();
    assert_eq!(messages, ["expected a value", "unexpected '}'"]);
    assert_matches_full_parse(&parse);
}

#[test]
fn unbalanced_edit_falls_back_to_full_parse() {
    let mut parse = parse("foo() { bar = 1 }\n");

    let reparse = parse.apply_edit(&TextEdit::delete(range(16, 17)));

    assert_eq!(reparse, Reparse::Full);
    let messages: Vec<_> = parse.errors().iter().map(|error| error.message()).collect();
    assert_eq!(messages, ["expected '}'"]);
    assert_matches_full_parse(&parse);
}

#[test]
fn typing_a_file_char_by_char() {
    let target = "server(\"main\", 8080) {\n  limits() { burst = rate(10); }\n  tags = [a, b]\n}\n";
    let mut parse = parse("");

    for (offset, ch) in target.char_indices() {
        let offset = TextSize::try_from(offset).unwrap();
        parse.apply_edit(&TextEdit::insert(offset, ch.to_string()));
        assert_matches_full_parse(&parse);
    }

    assert_eq!(parse.text(), target);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
}

#[test]
fn edit_dropping_inner_brace_of_unclosed_block() {
    let mut parse = parse("f() { g() { }\n");
    assert_eq!(messages(&parse), ["expected '}'"]);

    let reparse = parse.apply_edit(&TextEdit::delete(range(10, 12)));

    assert_eq!(reparse, Reparse::Full);
    assert_eq!(parse.text(), "f() { g() }\n");
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());
    assert_matches_full_parse(&parse);
}

#[test]
fn deeply_nested_lists_are_cut_off() {
    let text = format!("a = {}", "[".repeat(10_000));
    let parse = parse(&text);

    assert_eq!(parse.text(), text);
    let messages = messages(&parse);
    assert_eq!(messages.iter().filter(|&&message| message == "nesting too deep").count(), 1);
    assert_eq!(messages.iter().filter(|&&message| message == "expected ']'").count(), 128);
}

#[test]
fn deeply_nested_blocks_are_cut_off() {
    let text = "f() {".repeat(100_000);
    let parse = parse(&text);

    assert_eq!(parse.text(), text);
    assert!(messages(&parse).contains(&"nesting too deep"));
    assert_eq!(parse.root().descendants().filter(|node| node.kind() == BLOCK).count(), 128);
}

#[test]
fn edit_reaching_nesting_limit_is_parsed_in_full() {
    let depth = crate::parser::MAX_DEPTH as usize - 1;
    let prefix = "f() {\n".repeat(depth);
    let text = format!("{prefix}a = 1\n{}", "}\n".repeat(depth));
    let mut parse = parse(&text);
    assert!(parse.errors().is_empty(), "{:?}", parse.errors());

    let offset = TextSize::try_from(prefix.len()).unwrap();
    let reparse = parse.apply_edit(&TextEdit::insert(offset, "b = [[1]]\n"));

    assert_eq!(reparse, Reparse::Full);
    assert_eq!(messages(&parse), ["nesting too deep"]);
    assert_matches_full_parse(&parse);
}

#[test]
#[should_panic = "out of bounds"]
fn edit_past_end_panics() {
    let mut parse = parse("a = 1");
    parse.apply_edit(&TextEdit::insert(TextSize::new(10), "x"));
}

const SOURCE: &str = r#"[a-z0-9 =:;,(){}\[\]"\n#@-]{0,48}"#;
const EDIT_SOURCE: &str = r#"[a-z0-9 =:;,.(){}\[\]"\r\n\t#/@-]{0,48}"#;
const EDIT_INSERT: &str = r#"[a-z0-9 =;,.(){}\[\]"\r\n\t#/@-]{0,6}"#;

proptest! {
    #[test]
    fn every_token_lands_in_one_leaf(text in r"\PC{0,64}") {
        let parse = parse(&text);
        let tokens: Vec<_> = parse.root().descendant_tokens().collect();

        prop_assert_eq!(tokens.len(), cfg_tokenizer::tokenize(&text).len());
        let mut offset = TextSize::new(0);
        for token in &tokens {
            prop_assert_eq!(token.text_range().start(), offset);
            offset = token.text_range().end();
        }
        prop_assert_eq!(offset, TextSize::of(text.as_str()));
        prop_assert_eq!(parse.root().text(), text.as_str());
    }

    #[test]
    fn errors_are_sorted_and_in_bounds(text in SOURCE) {
        let parse = parse(&text);
        let len = TextSize::of(text.as_str());
        for pair in parse.errors().windows(2) {
            prop_assert!(pair[0].range().start() <= pair[1].range().start());
        }
        for error in parse.errors() {
            prop_assert!(error.range().end() <= len);
        }
    }

    #[test]
    fn edit_sequences_match_full_parse(
        text in EDIT_SOURCE,
        edits in prop::collection::vec((0usize..=48, 0usize..8, EDIT_INSERT), 1..6),
    ) {
        let mut incremental = parse(&text);
        let mut edited = text;

        for (start, len, insert) in edits {
            let start = start.min(edited.len());
            let end = (start + len).min(edited.len());
            let edit = TextEdit::replace(
                TextRange::new(TextSize::try_from(start).unwrap(), TextSize::try_from(end).unwrap()),
                insert,
            );

            incremental.apply_edit(&edit);
            edit.apply(&mut edited);

            prop_assert_eq!(incremental.text(), edited.as_str());
            prop_assert_eq!(incremental.debug_dump(), parse(&edited).debug_dump());
        }
    }
}

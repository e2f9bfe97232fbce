use cfg_db::{Diagnostic, File, check_file};
use salsa::{DatabaseImpl, Setter};

/// A `//~ ERROR message` comment. Some diagnostic reported on the same line
/// must contain `message`.
#[derive(Debug)]
struct Annotation {
    line: usize,
    message: String,
}

fn annotations(fixture: &str) -> Vec<Annotation> {
    fixture
        .lines()
        .zip(1..)
        .filter_map(|(text, line)| {
            let (_, comment) = text.split_once("//~")?;
            let message = comment.trim().trim_start_matches("ERROR").trim();
            (!message.is_empty()).then(|| Annotation { line, message: message.to_owned() })
        })
        .collect()
}

/// Accumulated diagnostics as `(line, message)`, lines counted from 1.
fn reported(db: &DatabaseImpl, file: File) -> Vec<(usize, String)> {
    let line_index = file.line_index(db);
    check_file::accumulated::<Diagnostic>(db, file)
        .into_iter()
        .map(|diag| {
            let line = line_index.line_col(diag.range().start()).line as usize + 1;
            (line, diag.message().to_owned())
        })
        .collect()
}

#[track_caller]
fn check(fixture: &str) {
    let db = DatabaseImpl::default();
    let file = File::new(&db, "fixture.cfg".into(), fixture.to_owned());

    let mut unclaimed = reported(&db, file);
    let mut missing = Vec::new();
    for annotation in annotations(fixture) {
        let claimed = unclaimed.iter().position(|(line, message)| {
            *line == annotation.line && message.contains(&annotation.message)
        });
        match claimed {
            Some(index) => {
                unclaimed.swap_remove(index);
            }
            None => missing.push(annotation),
        }
    }

    assert!(
        missing.is_empty() && unclaimed.is_empty(),
        "missing: {missing:#?}\nunexpected (line, message): {unclaimed:#?}"
    );
}

#[test]
fn clean_file() {
    check(
        r#"
# upstream servers
server("main", 8080) {
    hosts = ["a.example", "b.example"]
    limits() { burst = rate(12); window = 30 }
}
"#,
    );
}

#[test]
fn missing_close_paren() {
    check(
        r#"
server( { //~ ERROR expected ')'
    port = 8080
}
"#,
    );
}

#[test]
fn bad_values() {
    check(
        r#"
a = //~ ERROR expected a value
b = @ //~ ERROR unrecognized character
c = "open //~ ERROR unterminated string literal
d: = 1 //~ ERROR expected a type name
"#,
    );
}

#[test]
fn stray_tokens() {
    check(
        r#"
} //~ ERROR unexpected '}'
= 1 //~ ERROR expected an item
x = [1, 2 //~ ERROR expected ']'
limits { } //~ ERROR expected '('
"#,
    );
}

#[test]
fn edits_update_diagnostics() {
    let mut db = DatabaseImpl::default();
    let file = File::new(&db, "edit.cfg".into(), "a = 1\n".to_owned());
    assert!(check_file::accumulated::<Diagnostic>(&db, file).is_empty());

    file.set_text(&mut db).to("a = \n".to_owned());

    let diagnostics = check_file::accumulated::<Diagnostic>(&db, file);
    let messages: Vec<_> = diagnostics.iter().map(|diag| diag.message()).collect();
    assert_eq!(messages, ["expected a value"]);
    assert_eq!(file.parse(&db).text(), "a = \n");
}

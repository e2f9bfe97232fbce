use std::fmt::Write as _;
use std::io::{IsTerminal as _, Write as _};
use std::process::ExitCode;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use cfg_db::{Diagnostic, File, check_file};
use cfg_errors::Renderer;
use clap::{Parser, Subcommand};
use salsa::DatabaseImpl;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "cfg", version, about = "Check and inspect Cfg files")]
struct Options {
    /// Log filter for stderr, e.g. `debug` or `cfg_parse=trace`.
    #[arg(long, env = "CFG_LOG", default_value = "warn", global = true)]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report syntax errors, exiting with failure if there are any.
    Check { path: Utf8PathBuf },
    /// Print the syntax tree.
    Tree { path: Utf8PathBuf },
    /// Print the token stream.
    Tokens { path: Utf8PathBuf },
}

fn main() -> anyhow::Result<ExitCode> {
    let options = Options::parse();

    let filter = EnvFilter::try_new(&options.log)
        .with_context(|| format!("invalid log filter `{}`", options.log))?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match options.command {
        Command::Check { path } => check(path),
        Command::Tree { path } => {
            let text = read(&path)?;
            print_stdout(&cfg_parse::parse(&text).debug_dump())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Tokens { path } => {
            let text = read(&path)?;
            print_stdout(&render_tokens(&text))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read(path: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))
}

fn print_stdout(text: &str) -> anyhow::Result<()> {
    std::io::stdout().lock().write_all(text.as_bytes()).context("failed to write to stdout")
}

fn check(path: Utf8PathBuf) -> anyhow::Result<ExitCode> {
    let db = DatabaseImpl::default();
    let text = read(&path)?;

    let renderer =
        if std::io::stderr().is_terminal() { Renderer::styled() } else { Renderer::plain() };

    let file = File::new(&db, path, text);
    let diagnostics = check_file::accumulated::<Diagnostic>(&db, file);

    let path = file.path(&db).as_str();
    let text = file.text(&db);

    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic.render(&renderer, path, text));
    }

    if diagnostics.is_empty() {
        tracing::info!(%path, "no errors");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{path}: {} error(s)", diagnostics.len());
        Ok(ExitCode::FAILURE)
    }
}

/// One `KIND@range "text"` line per token, trivia pieces on lines of their own.
fn render_tokens(text: &str) -> String {
    let mut buf = String::new();
    for token in cfg_tokenizer::tokenize(text) {
        for (kind, range) in token.flatten() {
            _ = writeln!(buf, "{kind:?}@{range:?} {:?}", &text[range]);
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use expect_test::expect;

    use super::*;

    #[test]
    fn options_are_well_formed() {
        Options::command().debug_assert();
    }

    #[test]
    fn log_defaults_to_warn() {
        let options = Options::try_parse_from(["cfg", "tree", "a.cfg"]).unwrap();
        assert!(matches!(options.command, Command::Tree { path } if path.as_str() == "a.cfg"));
        if std::env::var_os("CFG_LOG").is_none() {
            assert_eq!(options.log, "warn");
        }
    }

    #[test]
    fn tokens_include_trivia() {
        expect![[r##"
            NAME@0..1 "a"
            WHITESPACE@1..2 " "
            EQ@2..3 "="
            WHITESPACE@3..4 " "
            INT_NUMBER@4..5 "1"
            WHITESPACE@5..6 " "
            LINE_COMMENT@6..15 "# comment"
            NEWLINE@15..16 "\n"
            EOF@16..16 ""
        "##]]
        .assert_eq(&render_tokens("a = 1 # comment\n"));
    }
}

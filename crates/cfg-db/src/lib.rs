//! Salsa database glue: source files as inputs, parsing and syntax checks as
//! tracked queries.

use camino::Utf8PathBuf;
pub use cfg_errors::Diagnostic;
use cfg_parse::Parse;
pub use line_index::LineIndex;
use salsa::{Accumulator, Database};

#[salsa::input(debug)]
pub struct File {
    #[returns(ref)]
    pub path: Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
}

#[salsa::tracked]
impl File {
    #[salsa::tracked(returns(ref), no_eq)]
    pub fn parse(self, db: &dyn Database) -> Parse {
        cfg_parse::parse(self.text(db))
    }

    #[salsa::tracked(returns(ref), no_eq)]
    pub fn line_index(self, db: &dyn Database) -> LineIndex {
        LineIndex::new(self.text(db))
    }
}

/// Reports the syntax errors of `file`. Read them back with
/// `check_file::accumulated::<Diagnostic>(db, file)`.
#[salsa::tracked]
pub fn check_file(db: &dyn Database, file: File) {
    let parse = file.parse(db);
    tracing::debug!(path = %file.path(db), errors = parse.errors().len(), "checked file");

    for error in parse.errors() {
        error.clone().accumulate(db);
    }
}

use std::io::Write;
use std::path::{Path, PathBuf};

use goldenfile::Mint;

use crate::importers::importer::StatementImporter;
use crate::journal::Journal;

/// Extracts entries from the statement at `input`, and compares their
/// journal against the golden file at `testdata/importers/<golden_path>`.
pub fn golden_test(importer: &dyn StatementImporter, input: &Path, golden_path: &str) {
    let mut mint = Mint::new("testdata/importers");
    let differ = Box::new(goldenfile::differs::text_diff);
    let mut out = mint
        .new_goldenfile_with_differ(golden_path, differ)
        .expect("new goldenfile");

    let entries = importer.extract(input).expect("perform import");
    let s = format!("{}", Journal(&entries));
    out.write_all(s.as_bytes()).expect("write output");
}

pub fn write_statement(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write statement");
    path
}

//! Output files, where "-" means stdout.

use std::fmt;
use std::fs::File;
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Error, Result};

use crate::entry::LedgerEntry;
use crate::journal::Journal;

/// Specifies a file to write to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FileSpec {
    /// Write to stdout.
    Stdio,
    /// Write to the file at the given path, replacing it.
    Path(PathBuf),
}

impl fmt::Display for FileSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use FileSpec::*;
        match self {
            Stdio => f.write_str("<stdio>"),
            Path(path) => write!(f, "{:?}", path),
        }
    }
}

impl FileSpec {
    pub fn writer(&self) -> Result<Box<dyn Write>> {
        use FileSpec::*;
        Ok(match self {
            Stdio => Box::new(stdout()),
            Path(path) => Box::new(
                File::create(path).with_context(|| format!("opening {:?} for writing", path))?,
            ),
        })
    }
}

impl FromStr for FileSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        use FileSpec::*;
        if s == "-" {
            Ok(Stdio)
        } else {
            Ok(Path(s.into()))
        }
    }
}

pub fn write_file(file_spec: &FileSpec, content: &str) -> Result<()> {
    let mut f = file_spec.writer()?;
    f.write_all(content.as_bytes())
        .with_context(|| format!("writing to {}", file_spec))?;
    f.flush().with_context(|| format!("writing to {}", file_spec))
}

pub fn write_journal(file_spec: &FileSpec, entries: &[LedgerEntry]) -> Result<()> {
    write_file(file_spec, &format!("{}", Journal(entries)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_case::test_case;

    #[test_case("-" => FileSpec::Stdio)]
    #[test_case("out.journal" => FileSpec::Path(PathBuf::from("out.journal")))]
    fn parse(s: &str) -> FileSpec {
        s.parse().expect("parse")
    }

    #[test]
    fn write_replaces_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.journal");
        std::fs::write(&path, "old content that is longer").expect("write");
        write_file(&FileSpec::Path(path.clone()), "new").expect("write_file");
        assert_eq!("new", std::fs::read_to_string(&path).expect("read"));
    }
}

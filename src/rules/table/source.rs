//! Reading rules tables from RON files. A file is a list of chains and
//! includes of other files:
//!
//! ```ron
//! [
//!     Include("shops.ron"),
//!     Chain("start", [
//!         Rule(predicate: HasTag("POT"), action: SetFlag(Cleared), result: Return),
//!     ]),
//! ]
//! ```

use std::collections::hash_map::Entry as MapEntry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::debug;
use serde_derive::Deserialize;

use crate::rules::table::{Chain, Rule, Table};

pub fn load_from_path(path: &Path) -> Result<Table> {
    let mut loader = Loader::default();
    loader.load_path(path)?;
    let table = loader.into_table();
    table.validate()?;
    Ok(table)
}

#[cfg(test)]
pub fn load_from_str_unvalidated(s: &str) -> Result<Table> {
    let mut loader = Loader::default();
    loader.load_entries(None, ron::de::from_str(s)?)?;
    Ok(loader.into_table())
}

#[cfg(test)]
pub fn load_from_str(s: &str) -> Result<Table> {
    let table = load_from_str_unvalidated(s)?;
    table.validate()?;
    Ok(table)
}

#[derive(Debug, Deserialize)]
enum Entry {
    /// Path to another rules file, relative to the including file.
    Include(PathBuf),
    Chain(String, Vec<Rule>),
}

/// Accumulates the chains of a rules file and everything it includes.
#[derive(Default)]
struct Loader {
    chains: HashMap<String, Chain>,
    /// Canonical paths of files loaded so far. Each is loaded at most once.
    loaded: HashSet<PathBuf>,
}

impl Loader {
    fn load_path(&mut self, path: &Path) -> Result<()> {
        let path =
            std::fs::canonicalize(path).with_context(|| format!("finding rules file {:?}", path))?;
        if !self.loaded.insert(path.clone()) {
            debug!("rules file {:?} already loaded", path);
            return Ok(());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading rules file {:?}", path))?;
        let entries: Vec<Entry> =
            ron::de::from_str(&content).with_context(|| format!("parsing {:?}", path))?;
        debug!("loading rules file {:?}", path);
        self.load_entries(path.parent(), entries)
    }

    /// Adds `entries`, resolving includes against `dir`.
    fn load_entries(&mut self, dir: Option<&Path>, entries: Vec<Entry>) -> Result<()> {
        for entry in entries {
            match entry {
                Entry::Include(include) => {
                    let include = match dir {
                        Some(dir) => dir.join(include),
                        None => include,
                    };
                    self.load_path(&include)
                        .with_context(|| format!("including {:?}", include))?;
                }
                Entry::Chain(name, rules) => match self.chains.entry(name) {
                    MapEntry::Occupied(existing) => {
                        bail!("chain {:?} is defined more than once", existing.key());
                    }
                    MapEntry::Vacant(slot) => {
                        slot.insert(Chain::new(rules));
                    }
                },
            }
        }
        Ok(())
    }

    fn into_table(self) -> Table {
        Table::new(self.chains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).expect("create");
        f.write_all(content.as_bytes()).expect("write");
        path
    }

    #[test]
    fn includes_are_relative_to_including_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
        write_file(
            &dir.path().join("sub"),
            "shops.ron",
            r#"[Chain("shops", [])]"#,
        );
        let main = write_file(
            dir.path(),
            "main.ron",
            r#"[
                Include("sub/shops.ron"),
                Chain("start", [
                    Rule(predicate: True, action: JumpChain("shops"), result: Continue),
                ]),
            ]"#,
        );
        load_from_path(&main).expect("load");
    }

    #[test]
    fn repeated_include_is_loaded_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), "common.ron", r#"[Chain("common", [])]"#);
        let main = write_file(
            dir.path(),
            "main.ron",
            r#"[
                Include("common.ron"),
                Include("common.ron"),
                Chain("start", []),
            ]"#,
        );
        load_from_path(&main).expect("load");
    }

    #[test]
    fn duplicate_chain_is_an_error() {
        load_from_str(r#"[Chain("start", []), Chain("start", [])]"#).expect_err("should fail");
    }

    #[test]
    fn missing_include_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let main = write_file(
            dir.path(),
            "main.ron",
            r#"[Include("missing.ron"), Chain("start", [])]"#,
        );
        load_from_path(&main).expect_err("should fail");
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_derive::Deserialize;

pub mod processor;
pub mod rhai;
pub mod table;

use processor::Categorizer;

/// Names a file of categorization rules, and the engine that interprets it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub enum RulesSource {
    /// A RON rules table.
    Table(PathBuf),
    /// A Rhai script defining `fn categorize(entry)`.
    Rhai(PathBuf),
}

impl RulesSource {
    /// Resolves a relative rules path against `dir`.
    pub fn relative_to(self, dir: &Path) -> Self {
        use RulesSource::*;
        match self {
            Table(path) => Table(dir.join(path)),
            Rhai(path) => Rhai(dir.join(path)),
        }
    }

    pub fn load(&self) -> Result<Box<dyn Categorizer>> {
        use RulesSource::*;
        Ok(match self {
            Table(path) => Box::new(
                table::Table::from_path(path)
                    .with_context(|| format!("loading rules table {:?}", path))?,
            ),
            Rhai(path) => Box::new(
                rhai::Rhai::from_file(path)
                    .with_context(|| format!("loading rhai rules {:?}", path))?,
            ),
        })
    }
}

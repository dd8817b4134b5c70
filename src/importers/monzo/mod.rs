//! Importer for Monzo current account (and legacy prepaid account) JSON
//! exports.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

use crate::entry::LedgerEntry;
use crate::importers::config::ImporterConfig;
use crate::importers::importer::StatementImporter;
use crate::rules::processor::Categorizer;

mod error;
mod mapper;
mod raw;
mod recognize;

pub struct Importer {
    config: ImporterConfig,
    categorizer: Option<Box<dyn Categorizer>>,
}

impl Importer {
    pub fn new(config: ImporterConfig, categorizer: Option<Box<dyn Categorizer>>) -> Self {
        Importer {
            config,
            categorizer,
        }
    }

    /// Creates the importer, loading its categorization rules if any are
    /// configured.
    pub fn from_config(config: ImporterConfig) -> Result<Self> {
        let categorizer = config
            .rules
            .as_ref()
            .map(|rules| rules.load())
            .transpose()
            .with_context(|| format!("loading rules for {}", config.account))?;
        Ok(Self::new(config, categorizer))
    }
}

fn read_statement(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {:?}", path))
}

impl StatementImporter for Importer {
    fn identify(&self, path: &Path) -> Result<bool> {
        let content = read_statement(path)?;
        Ok(recognize::parse_statement(&content)
            .map(|statement| recognize::identify(&statement, &self.config.account_id))
            .unwrap_or(false))
    }

    fn file_date(&self, path: &Path) -> Result<Option<NaiveDate>> {
        let content = read_statement(path)?;
        Ok(recognize::parse_statement(&content)
            .as_ref()
            .and_then(recognize::period_end))
    }

    fn extract(&self, path: &Path) -> Result<Vec<LedgerEntry>> {
        let content = read_statement(path)?;
        mapper::extract(
            &content,
            &path.to_string_lossy(),
            &self.config,
            self.categorizer.as_deref(),
        )
        .with_context(|| format!("extracting transactions from {:?}", path))
    }

    fn file_account(&self) -> &str {
        &self.config.account
    }

    fn file_name(&self, path: &Path) -> Result<String> {
        let base = path
            .file_name()
            .ok_or_else(|| anyhow!("{:?} does not name a file", path))?;
        Ok(format!("{}.{}", self.config.prefix, base.to_string_lossy()))
    }
}

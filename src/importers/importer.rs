use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::entry::LedgerEntry;

/// Reads statements of one kind, for one account.
pub trait StatementImporter {
    /// Returns whether the file at `path` is a statement this importer
    /// handles. Failing to read the file is an error, but content in any
    /// other format is not.
    fn identify(&self, path: &Path) -> Result<bool>;

    /// Returns the end of the period the statement covers.
    fn file_date(&self, path: &Path) -> Result<Option<NaiveDate>>;

    /// Converts the statement's transactions into ledger entries.
    fn extract(&self, path: &Path) -> Result<Vec<LedgerEntry>>;

    /// The ledger account that the statement belongs to.
    fn file_account(&self) -> &str;

    /// Name to archive the statement under.
    fn file_name(&self, path: &Path) -> Result<String>;
}

use anyhow::Result;

use crate::entry::LedgerEntry;

/// Refines the classification of a freshly imported entry, e.g. confirming
/// its flag, adding tags or adding a balancing posting.
pub trait Categorizer {
    fn categorize(&self, entry: LedgerEntry) -> Result<LedgerEntry>;
}

//! The ledger entries produced by importers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Error, Result};
use chrono::NaiveDate;
use serde_derive::Deserialize;

use crate::money::Units;

/// Review status of an entry.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum Flag {
    /// Needs review. Every imported entry starts with this flag.
    Pending,
    /// Confirmed, typically set by a categorizer that recognised the entry.
    Cleared,
}

impl Flag {
    pub fn as_str(self) -> &'static str {
        use Flag::*;
        match self {
            Pending => "!",
            Cleared => "*",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        use Flag::*;
        match s {
            "!" => Ok(Pending),
            "*" => Ok(Cleared),
            _ => bail!("invalid flag {:?}, want \"!\" or \"*\"", s),
        }
    }
}

/// One account leg of an entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Posting {
    pub account: String,
    /// `None` leaves the amount to be inferred when the journal is read.
    pub units: Option<Units>,
}

/// Where an entry came from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Provenance {
    pub source: String,
    /// Position of the record within the source, counting from zero.
    pub index: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub flag: Flag,
    pub payee: String,
    pub narration: String,
    pub tags: BTreeSet<String>,
    pub metadata: BTreeMap<String, String>,
    pub postings: Vec<Posting>,
    pub provenance: Provenance,
}

impl LedgerEntry {
    /// Returns the amount of the first posting that has one. For an imported
    /// entry, this is the amount against the imported account.
    pub fn primary_units(&self) -> Option<&Units> {
        self.postings.iter().find_map(|post| post.units.as_ref())
    }

    /// Returns the currency of the first posting with an amount.
    pub fn currency(&self) -> Option<&str> {
        self.primary_units().map(|units| units.currency.as_str())
    }
}

/// Helper to declaratively define a `LedgerEntry`.
pub struct EntryBuilder {
    entry: LedgerEntry,
}

impl EntryBuilder {
    pub fn new<S: Into<String>>(date: NaiveDate, payee: S) -> Self {
        EntryBuilder {
            entry: LedgerEntry {
                date,
                flag: Flag::Pending,
                payee: payee.into(),
                narration: String::new(),
                tags: BTreeSet::new(),
                metadata: BTreeMap::new(),
                postings: Vec::new(),
                provenance: Provenance::default(),
            },
        }
    }

    pub fn flag(mut self, flag: Flag) -> Self {
        self.entry.flag = flag;
        self
    }

    pub fn narration<S: Into<String>>(mut self, narration: S) -> Self {
        self.entry.narration = narration.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.entry.metadata = metadata;
        self
    }

    #[cfg(test)]
    pub fn meta<K: Into<String>, V: Into<String>>(mut self, k: K, v: V) -> Self {
        self.entry.metadata.insert(k.into(), v.into());
        self
    }

    pub fn posting<S: Into<String>>(mut self, account: S, units: Option<Units>) -> Self {
        self.entry.postings.push(Posting {
            account: account.into(),
            units,
        });
        self
    }

    pub fn provenance<S: Into<String>>(mut self, source: S, index: usize) -> Self {
        self.entry.provenance = Provenance {
            source: source.into(),
            index,
        };
        self
    }

    pub fn build(self) -> LedgerEntry {
        self.entry
    }
}

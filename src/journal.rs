//! Formats `LedgerEntry` values as a Ledger/hledger journal.

use std::fmt;

use chrono::Datelike;

use crate::comment::Comment;
use crate::entry::{LedgerEntry, Posting};

/// Separates the payee from the narration in a transaction description, as
/// understood by hledger.
const PAYEE_SEPARATOR: &str = " | ";

const INDENT: &str = "    ";

/// Wraps a slice of entries for formatting as a journal.
pub struct Journal<'a>(pub &'a [LedgerEntry]);

impl fmt::Display for Journal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", JournalEntry(entry))?;
        }
        Ok(())
    }
}

/// Wraps a single entry for formatting.
pub struct JournalEntry<'a>(pub &'a LedgerEntry);

impl fmt::Display for JournalEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let entry = self.0;
        write!(
            f,
            "{:04}/{:02}/{:02} {} {}",
            entry.date.year(),
            entry.date.month(),
            entry.date.day(),
            entry.flag,
            single_line(&entry.payee),
        )?;
        if !entry.narration.is_empty() {
            write!(f, "{}{}", PAYEE_SEPARATOR, single_line(&entry.narration))?;
        }
        writeln!(f)?;

        let comment = Comment::builder()
            .with_tags(&entry.tags)
            .with_value_tags(&entry.metadata)
            .build();
        for line in comment.into_lines() {
            writeln!(f, "{}; {}", INDENT, line)?;
        }

        for post in &entry.postings {
            writeln!(f, "{}{}", INDENT, JournalPosting(post))?;
        }
        Ok(())
    }
}

struct JournalPosting<'a>(&'a Posting);

impl fmt::Display for JournalPosting<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(&self.0.account)?;
        if let Some(units) = &self.0.units {
            write!(f, "  {}", units)?;
        }
        Ok(())
    }
}

/// The description shares its line with the date, and `|` would start the
/// narration early.
fn single_line(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "/")
}

use std::fmt;

#[cfg(test)]
use anyhow::Result;
use rust_decimal::Decimal;
use serde::de;
use serde_derive::Deserialize;

use crate::entry::LedgerEntry;

#[derive(Debug, Deserialize)]
pub enum Predicate {
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    /// Matches if any posting's account matches.
    Account(StringMatch),
    HasMeta(String),
    HasTag(String),
    /// Money came into the imported account (including zero amounts).
    Incoming,
    Meta(String, StringMatch),
    Narration(StringMatch),
    Not(Box<Predicate>),
    /// Money left the imported account.
    Outgoing,
    Payee(StringMatch),
    Tag(StringMatch),
    True,
}

impl Predicate {
    pub fn is_match(&self, entry: &LedgerEntry) -> bool {
        use Predicate::*;
        match self {
            True => true,
            All(preds) => preds.iter().all(|p| p.is_match(entry)),
            Any(preds) => preds.iter().any(|p| p.is_match(entry)),
            Account(matcher) => entry
                .postings
                .iter()
                .any(|post| matcher.matches_string(&post.account)),
            HasMeta(key) => entry.metadata.contains_key(key),
            HasTag(tag) => entry.tags.contains(tag),
            Incoming => entry
                .primary_units()
                .map(|units| units.quantity >= Decimal::ZERO)
                .unwrap_or(false),
            Meta(key, matcher) => entry
                .metadata
                .get(key)
                .map(|value| matcher.matches_string(value))
                .unwrap_or(false),
            Narration(matcher) => matcher.matches_string(&entry.narration),
            Not(pred) => !pred.is_match(entry),
            Outgoing => entry
                .primary_units()
                .map(|units| units.quantity < Decimal::ZERO)
                .unwrap_or(false),
            Payee(matcher) => matcher.matches_string(&entry.payee),
            Tag(matcher) => entry.tags.iter().any(|tag| matcher.matches_string(tag)),
        }
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        ron::de::from_str(s).map_err(Into::into)
    }
}

#[derive(Debug)]
pub struct Regex(regex::Regex);

impl<'de> de::Deserialize<'de> for Regex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(RegexVisitor)
    }
}

struct RegexVisitor;

impl<'de> de::Visitor<'de> for RegexVisitor {
    type Value = Regex;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a string containing a regular expression")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        regex::Regex::new(v)
            .map(Regex)
            .map_err(|e| E::custom(format!("{}", e)))
    }
}

#[derive(Debug, Deserialize)]
pub enum StringMatch {
    AsLower(Box<StringMatch>),
    Contains(String),
    Eq(String),
    Matches(Regex),
}

impl StringMatch {
    fn matches_string(&self, s: &str) -> bool {
        use StringMatch::*;

        match self {
            AsLower(m) => m.matches_string(&s.to_lowercase()),
            Contains(want) => s.contains(want),
            Eq(want) => want == s,
            Matches(regex) => regex.0.is_match(s),
        }
    }
}

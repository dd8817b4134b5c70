use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, Context, Error, Result};
use chrono::NaiveDate;
use rhai::Dynamic;
use rust_decimal::Decimal;

use crate::entry::{LedgerEntry, Posting, Provenance};
use crate::money::Units;

const DATE_FORMAT: &str = "%Y-%m-%d";

// Map is a newtype wrapper of `rhai::Map` to allow `From` conversions in
// both directions.
pub struct Map(pub rhai::Map);

impl Map {
    fn new() -> Self {
        Map(rhai::Map::new())
    }

    fn take_value<T: Any>(&mut self, key: &str) -> Result<T> {
        self.0
            .remove(key)
            .ok_or_else(|| anyhow!("missing {} field", key))?
            .try_cast()
            .ok_or_else(|| anyhow!("{} field was not the expected type", key))
    }

    fn take_opt_value<T: Any>(&mut self, key: &str) -> Result<Option<T>> {
        let value: Dynamic = match self.0.remove(key) {
            Some(v) => v,
            None => return Ok(None),
        };
        if value.is::<()>() {
            return Ok(None);
        }
        value
            .try_cast::<T>()
            .ok_or_else(|| anyhow!("{} field was not the expected type", key))
            .map(Some)
    }

    /// Takes a decimal amount, also accepting a script integer.
    fn take_opt_decimal(&mut self, key: &str) -> Result<Option<Decimal>> {
        let value: Dynamic = match self.0.remove(key) {
            Some(v) => v,
            None => return Ok(None),
        };
        if value.is::<()>() {
            return Ok(None);
        }
        if value.is::<rhai::INT>() {
            return value
                .try_cast::<rhai::INT>()
                .map(|v| Some(Decimal::from(v)))
                .ok_or_else(|| anyhow!("{} field was not the expected type", key));
        }
        value
            .try_cast::<Decimal>()
            .ok_or_else(|| anyhow!("{} field was not a number", key))
            .map(Some)
    }

    fn put_value<T: Any + Clone + Send + Sync>(&mut self, key: &str, value: T) {
        self.0.insert(key.into(), Dynamic::from(value));
    }

    fn put_opt_value<T: Any + Clone + Send + Sync>(&mut self, key: &str, value: Option<T>) {
        self.0.insert(
            key.into(),
            match value {
                None => Dynamic::UNIT,
                Some(value) => Dynamic::from(value),
            },
        );
    }
}

impl From<LedgerEntry> for Map {
    fn from(entry: LedgerEntry) -> Self {
        let mut map = Self::new();
        map.put_value("date", entry.date.format(DATE_FORMAT).to_string());
        map.put_value("flag", entry.flag.as_str().to_string());
        map.put_value("payee", entry.payee);
        map.put_value("narration", entry.narration);
        map.put_value(
            "tags",
            entry
                .tags
                .into_iter()
                .map(Dynamic::from)
                .collect::<rhai::Array>(),
        );
        map.put_value(
            "metadata",
            entry
                .metadata
                .into_iter()
                .map(|(key, value)| (key.into(), Dynamic::from(value)))
                .collect::<rhai::Map>(),
        );
        map.put_value(
            "postings",
            entry
                .postings
                .into_iter()
                .map(Map::from)
                .map(|m| Dynamic::from(m.0))
                .collect::<rhai::Array>(),
        );
        map
    }
}

impl TryFrom<Map> for LedgerEntry {
    type Error = Error;
    fn try_from(mut map: Map) -> Result<Self> {
        let date: String = map.take_value("date")?;
        let flag: String = map.take_value("flag")?;
        Ok(LedgerEntry {
            date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
                .with_context(|| format!("parsing date {:?}", date))?,
            flag: flag.parse()?,
            payee: map.take_value("payee")?,
            narration: map.take_value("narration")?,
            tags: map
                .take_value::<rhai::Array>("tags")?
                .into_iter()
                .map(Dynamic::try_cast::<String>)
                .map(|opt| opt.ok_or_else(|| anyhow!("got non-string in tags array")))
                .collect::<Result<BTreeSet<String>>>()?,
            metadata: map
                .take_value::<rhai::Map>("metadata")?
                .into_iter()
                .map(|(key, value)| {
                    let value = value
                        .try_cast::<String>()
                        .ok_or_else(|| anyhow!("got non-string value in metadata[{:?}]", key))?;
                    Ok((key.to_string(), value))
                })
                .collect::<Result<BTreeMap<String, String>>>()?,
            postings: map
                .take_value::<rhai::Array>("postings")?
                .into_iter()
                .map(|item: Dynamic| {
                    item.try_cast::<rhai::Map>()
                        .ok_or_else(|| anyhow!("expected map in postings"))
                        .map(Map)
                        .and_then(Posting::try_from)
                })
                .collect::<Result<Vec<Posting>>>()
                .with_context(|| "in postings")?,
            provenance: Provenance::default(),
        })
    }
}

impl From<Posting> for Map {
    fn from(posting: Posting) -> Self {
        let mut map = Map::new();
        map.put_value("account", posting.account);
        let (amount, currency) = match posting.units {
            Some(units) => (Some(units.quantity), Some(units.currency)),
            None => (None, None),
        };
        map.put_opt_value("amount", amount);
        map.put_opt_value("currency", currency);
        map
    }
}

impl TryFrom<Map> for Posting {
    type Error = Error;
    fn try_from(mut map: Map) -> Result<Posting> {
        let account: String = map.take_value("account")?;
        let amount = map.take_opt_decimal("amount")?;
        let currency: Option<String> = map.take_opt_value("currency")?;
        let units = match (amount, currency) {
            (Some(quantity), Some(currency)) => Some(Units::new(quantity, currency)),
            (None, None) => None,
            (Some(_), None) => return Err(anyhow!("posting to {} has no currency", account)),
            (None, Some(_)) => return Err(anyhow!("posting to {} has no amount", account)),
        };
        Ok(Posting { account, units })
    }
}

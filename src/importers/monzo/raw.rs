//! Transaction records as they appear in a Monzo JSON export.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de, Deserializer};
use serde_derive::Deserialize;
use serde_json::{Map, Value};

use crate::importers::monzo::error::StatementError;

/// Placeholder for the id of a record that does not have one.
const UNKNOWN_ID: &str = "<unknown>";

#[derive(Debug, Deserialize)]
pub struct RawTransaction {
    pub id: String,
    pub account_id: Option<String>,
    pub created: String,
    pub amount: MinorAmount,
    pub description: String,
    pub merchant: Option<Merchant>,
    pub notes: Option<String>,
    pub counterparty: Option<Map<String, Value>>,
    pub suggested_tags: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

impl RawTransaction {
    /// Deserializes the record at position `index` in the statement.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, StatementError> {
        <Self as de::Deserialize>::deserialize(value).map_err(|source| StatementError::BadRecord {
            index,
            id: value
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_ID)
                .to_string(),
            source,
        })
    }

    /// Returns the merchant's name and category, if the merchant is expanded
    /// and named.
    pub fn named_merchant(&self) -> Option<(&str, Option<&str>)> {
        match &self.merchant {
            Some(Merchant::Details(MerchantDetails {
                name: Some(name),
                category,
            })) => Some((name.as_str(), category.as_deref())),
            _ => None,
        }
    }

    /// Returns whether the bank's own metadata has the given key.
    pub fn has_metadata(&self, key: &str) -> bool {
        self.metadata
            .as_ref()
            .map(|m| m.contains_key(key))
            .unwrap_or(false)
    }
}

/// Merchants are exported either expanded, or as just the merchant id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Merchant {
    Details(MerchantDetails),
    Id(String),
}

#[derive(Debug, Deserialize)]
pub struct MerchantDetails {
    pub name: Option<String>,
    pub category: Option<String>,
}

/// An exact amount in minor units (e.g. pence). Negative amounts leave the
/// account.
#[derive(Debug)]
pub struct MinorAmount(pub Decimal);

impl<'de> de::Deserialize<'de> for MinorAmount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_any(MinorAmountVisitor)
    }
}

struct MinorAmountVisitor;
impl<'de> de::Visitor<'de> for MinorAmountVisitor {
    type Value = MinorAmount;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an amount in minor units, as a decimal string or a number")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
        Decimal::from_str(s.trim())
            .map(MinorAmount)
            .map_err(|e| de::Error::custom(format!("bad amount {:?}: {}", s, e)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(MinorAmount(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(MinorAmount(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Decimal::try_from(v)
            .map(MinorAmount)
            .map_err(|e| de::Error::custom(format!("bad amount {}: {}", v, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!("-250") => Some(Decimal::from(-250)); "string")]
    #[test_case(json!(" 12.5 ") => Some(Decimal::new(125, 1)); "fractional_string")]
    #[test_case(json!(-250) => Some(Decimal::from(-250)); "negative_integer")]
    #[test_case(json!(500) => Some(Decimal::from(500)); "positive_integer")]
    #[test_case(json!(-250.0) => Some(Decimal::from(-250)); "float")]
    #[test_case(json!(1e40) => None; "float_out_of_range")]
    #[test_case(json!("abc") => None; "not_a_number")]
    #[test_case(json!(null) => None; "null")]
    fn minor_amount(v: Value) -> Option<Decimal> {
        <MinorAmount as de::Deserialize>::deserialize(&v)
            .ok()
            .map(|a| a.0)
    }

    #[test]
    fn minimal_record() {
        let v = json!({
            "id": "tx_1",
            "created": "2023-01-05T10:00:00Z",
            "amount": "-250",
            "description": "pot_savings",
        });
        let txn = RawTransaction::from_value(0, &v).expect("from_value");
        assert_eq!("tx_1", txn.id);
        assert!(txn.merchant.is_none());
        assert!(txn.named_merchant().is_none());
        assert!(!txn.has_metadata("faster_payment"));
    }

    #[test]
    fn merchant_forms() {
        let expanded = json!({
            "id": "tx_1", "created": "2023-01-05", "amount": 1, "description": "d",
            "merchant": {"name": "Tesco", "category": "groceries", "logo": "x"},
        });
        let txn = RawTransaction::from_value(0, &expanded).unwrap();
        assert_eq!(Some(("Tesco", Some("groceries"))), txn.named_merchant());

        let id_only = json!({
            "id": "tx_1", "created": "2023-01-05", "amount": 1, "description": "d",
            "merchant": "merch_0001",
        });
        let txn = RawTransaction::from_value(0, &id_only).unwrap();
        assert_eq!(None, txn.named_merchant());

        let unnamed = json!({
            "id": "tx_1", "created": "2023-01-05", "amount": 1, "description": "d",
            "merchant": {"category": "cash"},
        });
        let txn = RawTransaction::from_value(0, &unnamed).unwrap();
        assert_eq!(None, txn.named_merchant());
    }

    #[test]
    fn bad_record_names_index_and_id() {
        let v = json!({"id": "tx_9", "created": "2023-01-05", "amount": "1"});
        let err = RawTransaction::from_value(7, &v).expect_err("should fail");
        let msg = format!("{}", err);
        assert!(msg.contains("#7"), "{}", msg);
        assert!(msg.contains("tx_9"), "{}", msg);
        assert!(msg.contains("description"), "{}", msg);
    }
}

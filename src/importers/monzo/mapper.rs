//! Converts the transaction records of a statement into ledger entries.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::entry::{EntryBuilder, Flag, LedgerEntry};
use crate::importers::config::ImporterConfig;
use crate::importers::monzo::error::StatementError;
use crate::importers::monzo::raw::{Merchant, RawTransaction};
use crate::liberal_date::parse_date_liberally;
use crate::money::Units;
use crate::rules::processor::Categorizer;
use crate::tags;

/// Descriptions of transfers to and from pots start with this.
const POT_DESCRIPTION_PREFIX: &str = "pot_";
const ATM_PAYEE: &str = "ATM";
const CASH_CATEGORY: &str = "cash";

/// Keys in the bank's own transaction metadata that hint at the payment type.
const DIRECT_DEBIT_KEY: &str = "bacs_direct_debit_instruction_id";
const FASTER_PAYMENT_KEY: &str = "faster_payment";

/// Counterparty fields that are joined into the `counterparty` metadata
/// value, in order.
const COUNTERPARTY_FIELDS: [&str; 4] = ["account_number", "sort_code", "number", "name"];
const COUNTERPARTY_SEPARATOR: &str = ", ";

/// Extracts one entry per transaction record in `content`, in record order.
///
/// Content that is not UTF-8 text yields no entries. Anything else wrong with
/// the statement is an error, as the statement is expected to have been
/// identified already.
pub fn extract(
    content: &[u8],
    source: &str,
    config: &ImporterConfig,
    categorizer: Option<&dyn Categorizer>,
) -> Result<Vec<LedgerEntry>> {
    let text = match std::str::from_utf8(content) {
        Ok(text) => text,
        Err(e) => {
            warn!("{}: not UTF-8 text, no entries extracted: {}", source, e);
            return Ok(Vec::new());
        }
    };
    let statement: Value = serde_json::from_str(text).map_err(StatementError::from)?;
    let records = statement_records(&statement)?;
    debug!("{}: {} transaction records", source, records.len());

    let mapper = Mapper { config, source };
    records
        .iter()
        .enumerate()
        .map(|(index, record)| -> Result<LedgerEntry> {
            let raw = RawTransaction::from_value(index, record)?;
            let entry = mapper.map(index, &raw)?;
            match categorizer {
                Some(categorizer) => categorizer
                    .categorize(entry)
                    .with_context(|| format!("categorizing transaction {}", raw.id)),
                None => Ok(entry),
            }
        })
        .collect()
}

fn statement_records(statement: &Value) -> Result<&Vec<Value>, StatementError> {
    statement
        .get("transactions")
        .ok_or(StatementError::MissingTransactions)?
        .as_array()
        .ok_or(StatementError::TransactionsNotAList)
}

struct Mapper<'a> {
    config: &'a ImporterConfig,
    source: &'a str,
}

impl Mapper<'_> {
    fn map(&self, index: usize, raw: &RawTransaction) -> Result<LedgerEntry, StatementError> {
        let date = parse_date_liberally(&raw.created).ok_or_else(|| StatementError::BadDate {
            id: raw.id.clone(),
            value: raw.created.clone(),
        })?;
        if raw.account_id.as_deref() != Some(self.config.account_id.as_str()) {
            warn!(
                "{}: transaction {} is for account {:?}, not {:?}",
                self.source, raw.id, raw.account_id, self.config.account_id
            );
        }

        let mut tags: BTreeSet<String> = raw
            .suggested_tags
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let mut meta = BTreeMap::<String, String>::new();

        if let Some(Merchant::Id(merchant_id)) = &raw.merchant {
            debug!("transaction {} has unexpanded merchant {}", raw.id, merchant_id);
        }
        let (payee, narration) = if let Some((name, category)) = raw.named_merchant() {
            if let Some(category) = category.filter(|c| !c.is_empty()) {
                meta.insert(tags::CATEGORY_KEY.to_string(), category.to_string());
            }
            (name.to_string(), raw.description.clone())
        } else if raw.description.starts_with(POT_DESCRIPTION_PREFIX) {
            tags.insert(tags::POT.to_string());
            (tags::POT_PAYEE.to_string(), raw.description.clone())
        } else {
            (raw.description.clone(), String::new())
        };

        if let Some(notes) = raw.notes.as_deref() {
            if !notes.is_empty() && notes != payee && notes != narration {
                meta.insert(tags::NOTES_KEY.to_string(), notes.to_string());
            }
        }
        if let Some(counterparty) = raw.counterparty.as_ref().and_then(counterparty_summary) {
            meta.insert(tags::COUNTERPARTY_KEY.to_string(), counterparty);
        }
        meta.insert(tags::ID_KEY.to_string(), raw.id.clone());

        if payee == ATM_PAYEE
            && meta.get(tags::CATEGORY_KEY).map(String::as_str) == Some(CASH_CATEGORY)
        {
            tags.insert(tags::CASH_POINT.to_string());
        }
        if let Some(tag) = payment_type_tag(raw) {
            tags.insert(tag.to_string());
        }

        Ok(EntryBuilder::new(date, payee)
            .narration(narration)
            .flag(Flag::Pending)
            .tags(tags)
            .metadata(meta)
            .posting(
                &self.config.account,
                Some(Units::from_minor(raw.amount.0, &self.config.currency)),
            )
            .provenance(self.source, index)
            .build())
    }
}

/// Joins the known counterparty fields that are present. Returns `None` if
/// there is nothing to join, so a counterparty holding only unknown fields
/// leaves no empty `counterparty` value on the entry.
fn counterparty_summary(counterparty: &Map<String, Value>) -> Option<String> {
    let summary = COUNTERPARTY_FIELDS
        .iter()
        .filter_map(|field| counterparty.get(*field))
        .filter_map(value_text)
        .join(COUNTERPARTY_SEPARATOR);
    if summary.is_empty() {
        None
    } else {
        Some(summary)
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A direct debit takes precedence over a faster payment.
fn payment_type_tag(raw: &RawTransaction) -> Option<&'static str> {
    if raw.has_metadata(DIRECT_DEBIT_KEY) {
        Some(tags::DIRECT_DEBIT)
    } else if raw.has_metadata(FASTER_PAYMENT_KEY) {
        if raw.amount.0 < Decimal::ZERO {
            Some(tags::FASTER_PAYMENT_OUT)
        } else {
            Some(tags::FASTER_PAYMENT_IN)
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use serde_json::json;
    use test_case::test_case;

    const ACCOUNT_ID: &str = "acc_X";

    fn config() -> ImporterConfig {
        ImporterConfig::new("Assets:Monzo:Current", ACCOUNT_ID)
    }

    fn record(extra: Value) -> Value {
        let mut record = json!({
            "id": "tx_1",
            "account_id": ACCOUNT_ID,
            "created": "2023-01-05T10:00:00Z",
            "amount": "-250",
            "description": "pot_savings",
        });
        if let (Some(record), Value::Object(extra)) = (record.as_object_mut(), extra) {
            record.extend(extra);
        }
        record
    }

    fn extract_records(records: Vec<Value>) -> Vec<LedgerEntry> {
        let content = json!({ "transactions": records }).to_string();
        extract(content.as_bytes(), "statement.json", &config(), None).expect("extract")
    }

    fn extract_one(extra: Value) -> LedgerEntry {
        let mut entries = extract_records(vec![record(extra)]);
        assert_eq!(1, entries.len());
        entries.remove(0)
    }

    fn tag_set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn pot_transfer() {
        let entry = extract_one(json!({}));
        let want = EntryBuilder::new(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(), "Monzo Pot")
            .narration("pot_savings")
            .tags(["POT"])
            .meta("id", "tx_1")
            .posting(
                "Assets:Monzo:Current",
                Some(Units::new(Decimal::new(-250, 2), "GBP")),
            )
            .provenance("statement.json", 0)
            .build();
        assert_eq!(want, entry);
    }

    #[test]
    fn named_merchant() {
        let entry = extract_one(json!({
            "description": "Tesco Superstore",
            "merchant": {"name": "Tesco", "category": "groceries"},
        }));
        assert_eq!("Tesco", entry.payee);
        assert_eq!("Tesco Superstore", entry.narration);
        assert_eq!(Some("groceries"), entry.metadata.get("category").map(String::as_str));
        assert!(!entry.tags.contains("POT"));
    }

    #[test]
    fn merchant_with_empty_category() {
        let entry = extract_one(json!({
            "description": "pot_looking",
            "merchant": {"name": "Shop", "category": ""},
        }));
        assert_eq!("Shop", entry.payee);
        assert_eq!("pot_looking", entry.narration);
        assert_eq!(None, entry.metadata.get("category"));
        assert!(entry.tags.is_empty());
    }

    #[test_case(json!({"merchant": null}); "null_merchant")]
    #[test_case(json!({"merchant": "merch_0001"}); "merchant_id_only")]
    #[test_case(json!({"merchant": {"category": "cash"}}); "unnamed_merchant")]
    fn description_as_payee(extra: Value) {
        let mut extra = extra;
        if let Some(extra) = extra.as_object_mut() {
            extra.insert("description".to_string(), json!("Corner Shop"));
        }
        let entry = extract_one(extra);
        assert_eq!("Corner Shop", entry.payee);
        assert_eq!("", entry.narration);
        assert_eq!(None, entry.metadata.get("category"));
    }

    #[test_case(json!({"faster_payment": true}), "500" => tag_set(&["FPI"]); "faster_payment_in")]
    #[test_case(json!({"faster_payment": "true"}), "0" => tag_set(&["FPI"]); "faster_payment_zero")]
    #[test_case(json!({"faster_payment": true}), "-500" => tag_set(&["FPO"]); "faster_payment_out")]
    #[test_case(
        json!({"faster_payment": true, "bacs_direct_debit_instruction_id": "ddi_1"}), "-500"
        => tag_set(&["DD"]); "direct_debit_first")]
    #[test_case(json!({"bacs_direct_debit_instruction_id": null}), "-500" => tag_set(&["DD"]); "direct_debit")]
    #[test_case(json!({"notes": ""}), "-500" => tag_set(&[]); "no_hints")]
    fn payment_type_tags(metadata: Value, amount: &str) -> BTreeSet<String> {
        extract_one(json!({
            "description": "Someone",
            "amount": amount,
            "metadata": metadata,
        }))
        .tags
    }

    #[test]
    fn atm_without_category_is_not_cash_point() {
        let entry = extract_one(json!({"description": "ATM"}));
        assert_eq!("ATM", entry.payee);
        assert!(!entry.tags.contains("CPT"));
    }

    #[test]
    fn atm_with_cash_category_is_cash_point() {
        let entry = extract_one(json!({
            "description": "LINK ATM 123",
            "merchant": {"name": "ATM", "category": "cash"},
        }));
        assert!(entry.tags.contains("CPT"));
    }

    #[test]
    fn atm_with_other_category_is_not_cash_point() {
        let entry = extract_one(json!({
            "description": "LINK ATM 123",
            "merchant": {"name": "ATM", "category": "general"},
        }));
        assert!(!entry.tags.contains("CPT"));
    }

    #[test_case("Lunch with Sam" => Some("Lunch with Sam".to_string()); "distinct")]
    #[test_case("" => None; "empty")]
    #[test_case("Pret" => None; "same_as_payee")]
    #[test_case("PRET A MANGER" => None; "same_as_narration")]
    fn notes(notes: &str) -> Option<String> {
        extract_one(json!({
            "description": "PRET A MANGER",
            "merchant": {"name": "Pret", "category": "eating_out"},
            "notes": notes,
        }))
        .metadata
        .get("notes")
        .cloned()
    }

    #[test_case(
        json!({"name": "J Smith", "sort_code": "040004", "account_number": "12345678"})
        => Some("12345678, 040004, J Smith".to_string()); "ordered_fields")]
    #[test_case(json!({"number": "+447700900000", "name": "Sam"})
        => Some("+447700900000, Sam".to_string()); "phone_number")]
    #[test_case(json!({"user_id": "user_1"}) => None; "no_known_fields")]
    #[test_case(json!({}) => None; "empty")]
    #[test_case(json!({"name": null, "account_number": 12345678})
        => Some("12345678".to_string()); "null_and_numeric")]
    fn counterparty(counterparty: Value) -> Option<String> {
        extract_one(json!({
            "description": "Transfer",
            "counterparty": counterparty,
        }))
        .metadata
        .get("counterparty")
        .cloned()
    }

    #[test]
    fn suggested_tags_are_kept() {
        let entry = extract_one(json!({"suggested_tags": "  #food\t#treat  "}));
        assert_eq!(tag_set(&["#food", "#treat", "POT"]), entry.tags);
    }

    #[test]
    fn entries_follow_record_order() {
        let entries = extract_records(vec![
            record(json!({"id": "tx_b", "created": "2023-02-01"})),
            record(json!({"id": "tx_a", "created": "2023-01-01"})),
        ]);
        let ids: Vec<_> = entries
            .iter()
            .map(|e| (e.metadata["id"].as_str(), e.provenance.index))
            .collect();
        assert_eq!(vec![("tx_b", 0), ("tx_a", 1)], ids);
    }

    #[test]
    fn extraction_is_repeatable() {
        let records = vec![
            record(json!({"suggested_tags": "x y"})),
            record(json!({"id": "tx_2", "merchant": {"name": "Tesco", "category": "groceries"}})),
        ];
        assert_eq!(extract_records(records.clone()), extract_records(records));
    }

    #[test]
    fn exact_amounts() {
        let entry = extract_one(json!({"amount": "123456789012345"}));
        assert_eq!(
            Some(&Units::new(Decimal::new(123456789012345, 2), "GBP")),
            entry.primary_units(),
        );
    }

    #[test]
    fn other_currency() {
        let mut config = config();
        config.currency = "EUR".to_string();
        let content = json!({ "transactions": [record(json!({}))] }).to_string();
        let entries = extract(content.as_bytes(), "s.json", &config, None).expect("extract");
        assert_eq!(Some("EUR"), entries[0].currency());
    }

    #[test]
    fn categorizer_runs_on_each_entry() {
        struct Confirm;
        impl Categorizer for Confirm {
            fn categorize(&self, mut entry: LedgerEntry) -> Result<LedgerEntry> {
                entry.flag = Flag::Cleared;
                entry.tags.insert("seen".to_string());
                Ok(entry)
            }
        }
        let content = json!({ "transactions": [record(json!({"suggested_tags": "x"}))] }).to_string();
        let entries =
            extract(content.as_bytes(), "s.json", &config(), Some(&Confirm)).expect("extract");
        assert_eq!(Flag::Cleared, entries[0].flag);
        assert_eq!(tag_set(&["POT", "seen", "x"]), entries[0].tags);
    }

    #[test]
    fn not_utf8_yields_nothing() {
        let entries = extract(b"\xff\xfe\x00", "s.json", &config(), None).expect("extract");
        assert!(entries.is_empty());
    }

    #[test]
    fn empty_statement_yields_nothing() {
        assert!(extract_records(vec![]).is_empty());
    }

    #[test_case(b"not json" as &[u8], "not valid JSON"; "not_json")]
    #[test_case(b"{}" as &[u8], "no \"transactions\" key"; "missing_transactions")]
    #[test_case(b"{\"transactions\": 1}" as &[u8], "not a list"; "transactions_not_a_list")]
    #[test_case(
        b"{\"transactions\": [{\"account_id\": \"acc_X\", \"created\": \"2023-01-05\", \"amount\": \"1\", \"description\": \"d\"}]}" as &[u8],
        "missing field `id`"; "missing_id")]
    #[test_case(
        b"{\"transactions\": [{\"id\": \"tx_1\", \"created\": \"someday\", \"amount\": \"1\", \"description\": \"d\"}]}" as &[u8],
        "cannot parse date"; "bad_date")]
    fn structural_faults(content: &[u8], want: &str) {
        let err = extract(content, "s.json", &config(), None).expect_err("should fail");
        let msg = format!("{:#}", err);
        assert!(msg.contains(want), "{}", msg);
    }
}

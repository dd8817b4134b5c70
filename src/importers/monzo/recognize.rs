//! Decides whether a file is a statement for a given account, and which
//! period it covers.
//!
//! Being asked about files that belong to other importers is routine here,
//! so every problem with the content is a "not mine" answer rather than an
//! error.

use chrono::NaiveDate;
use log::debug;
use serde_json::Value;

use crate::liberal_date::parse_date_liberally;

/// Prefix of every Monzo transaction id.
pub const TRANSACTION_ID_PREFIX: &str = "tx_";

/// Number of leading records that are checked when identifying a file.
const SAMPLE_SIZE: usize = 5;

const TRANSACTIONS_KEY: &str = "transactions";

/// Parses `content` as a statement, returning `None` if it is not UTF-8 text
/// holding JSON.
pub fn parse_statement(content: &[u8]) -> Option<Value> {
    let text = match std::str::from_utf8(content) {
        Ok(text) => text,
        Err(e) => {
            debug!("not UTF-8 text: {}", e);
            return None;
        }
    };
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("not JSON: {}", e);
            None
        }
    }
}

/// Returns the date of the latest transaction in the statement, or `None` if
/// the statement has no transactions or any of their dates are missing or
/// unparsable.
pub fn period_end(statement: &Value) -> Option<NaiveDate> {
    let transactions = statement.get(TRANSACTIONS_KEY)?.as_array()?;
    let mut latest: Option<NaiveDate> = None;
    for (index, txn) in transactions.iter().enumerate() {
        let created = match txn.get("created").and_then(Value::as_str) {
            Some(created) => created,
            None => {
                debug!("transaction #{} has no created date", index);
                return None;
            }
        };
        let date = match parse_date_liberally(created) {
            Some(date) => date,
            None => {
                debug!("transaction #{} has unparsable date {:?}", index, created);
                return None;
            }
        };
        latest = latest.max(Some(date));
    }
    if latest.is_none() {
        debug!("statement has no transactions");
    }
    latest
}

/// Returns whether `statement` is one for the account with id `account_id`.
///
/// Only the first few transactions are inspected. Each must have a Monzo
/// transaction id and belong to the account.
pub fn identify(statement: &Value, account_id: &str) -> bool {
    if period_end(statement).is_none() {
        return false;
    }
    let transactions = match statement.get(TRANSACTIONS_KEY).and_then(Value::as_array) {
        Some(transactions) => transactions,
        None => return false,
    };
    transactions
        .iter()
        .take(SAMPLE_SIZE)
        .enumerate()
        .all(|(index, txn)| is_account_transaction(index, txn, account_id))
}

fn is_account_transaction(index: usize, txn: &Value, account_id: &str) -> bool {
    let id = txn.get("id").and_then(Value::as_str);
    if !id.map_or(false, |id| id.starts_with(TRANSACTION_ID_PREFIX)) {
        debug!("transaction #{} has id {:?}, not a Monzo id", index, id);
        return false;
    }
    let txn_account_id = txn.get("account_id").and_then(Value::as_str);
    if txn_account_id != Some(account_id) {
        debug!(
            "transaction #{} is for account {:?}, want {:?}",
            index, txn_account_id, account_id
        );
        return false;
    }
    true
}

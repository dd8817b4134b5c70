use thiserror::Error;

/// Faults in a statement that was expected to be well formed, i.e. one that
/// has already been identified as belonging to the importer.
#[derive(Debug, Error)]
pub enum StatementError {
    #[error("statement is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("statement has no \"transactions\" key")]
    MissingTransactions,
    #[error("\"transactions\" is not a list")]
    TransactionsNotAList,
    #[error("malformed transaction record #{index} (id {id}): {source}")]
    BadRecord {
        index: usize,
        id: String,
        source: serde_json::Error,
    },
    #[error("transaction {id}: cannot parse date {value:?}")]
    BadDate { id: String, value: String },
}

/// Tag applied to transfers into or out of a Monzo pot.
pub const POT: &str = "POT";
/// Tag for cash point (ATM) withdrawals.
pub const CASH_POINT: &str = "CPT";
/// Tag for transactions made under a BACS direct debit instruction.
pub const DIRECT_DEBIT: &str = "DD";
/// Tag for an outbound faster payment.
pub const FASTER_PAYMENT_OUT: &str = "FPO";
/// Tag for an inbound faster payment.
pub const FASTER_PAYMENT_IN: &str = "FPI";

/// Metadata key holding the bank's transaction identifier. Present on every
/// imported entry.
pub const ID_KEY: &str = "id";
/// Metadata key holding the merchant category, provided by the bank.
pub const CATEGORY_KEY: &str = "category";
/// Metadata key holding the user's notes on the transaction.
pub const NOTES_KEY: &str = "notes";
/// Metadata key holding the counterparty details.
pub const COUNTERPARTY_KEY: &str = "counterparty";

/// Payee used for transfers to and from pots.
pub const POT_PAYEE: &str = "Monzo Pot";

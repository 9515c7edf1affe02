//! Canonical types for the import pipeline
//!
//! Every source format is normalized into these structures before anything
//! touches the target store. All of them are transient: a `ParsedDataSet` is
//! built once per uploaded file and discarded after orchestration.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Accounting classification of a group or ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nature {
    /// Assets - what the business owns (Cash, Inventory, Receivables, etc.)
    Asset,
    /// Liabilities - what the business owes (Loans, Payables, etc.)
    Liability,
    /// Income/Revenue - money earned by the business
    Income,
    /// Expenses - costs incurred by the business
    Expense,
}

impl Nature {
    /// Returns the normal balance side for this nature.
    /// Assets and Expenses normally carry debit balances;
    /// Liabilities and Income carry credit balances.
    pub fn normal_balance(&self) -> EntryType {
        match self {
            Nature::Asset | Nature::Expense => EntryType::Debit,
            Nature::Liability | Nature::Income => EntryType::Credit,
        }
    }

    /// Parse an explicit nature value from a source column, if recognizable
    pub fn from_source(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asset" | "assets" => Some(Nature::Asset),
            "liability" | "liabilities" => Some(Nature::Liability),
            "income" | "revenue" => Some(Nature::Income),
            "expense" | "expenses" => Some(Nature::Expense),
            _ => None,
        }
    }
}

/// Debit/credit side of an entry or balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    Debit,
    Credit,
}

/// Voucher classification used by the target store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherType {
    Sales,
    Purchase,
    Payment,
    Receipt,
    Journal,
    Contra,
    DebitNote,
    CreditNote,
}

impl VoucherType {
    /// Canonical display name, as stored in the voucher-type table
    pub fn name(&self) -> &'static str {
        match self {
            VoucherType::Sales => "Sales",
            VoucherType::Purchase => "Purchase",
            VoucherType::Payment => "Payment",
            VoucherType::Receipt => "Receipt",
            VoucherType::Journal => "Journal",
            VoucherType::Contra => "Contra",
            VoucherType::DebitNote => "Debit Note",
            VoucherType::CreditNote => "Credit Note",
        }
    }
}

/// Account group from the source export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group name (natural key)
    pub name: String,
    /// Optional parent group name
    pub parent: Option<String>,
    /// Classification, taken from the source when present, otherwise
    /// inferred from the name
    pub nature: Nature,
}

/// Ledger account from the source export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Ledger name (natural key)
    pub name: String,
    /// Name of the group this ledger belongs to
    pub group_name: String,
    pub address: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
    pub pan: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Signed opening balance (debit positive, credit negative)
    pub opening_balance: BigDecimal,
    /// Whether this is a system-provided default ledger
    pub is_default: bool,
}

impl Ledger {
    /// Minimal ledger with only name, group and opening balance set
    pub fn new(name: String, group_name: String, opening_balance: BigDecimal) -> Self {
        Self {
            name,
            group_name,
            address: None,
            state: None,
            pincode: None,
            gstin: None,
            pan: None,
            email: None,
            phone: None,
            opening_balance,
            is_default: false,
        }
    }
}

/// Stock item from the source export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    /// Item name (natural key)
    pub name: String,
    /// Name of the stock group this item belongs to
    pub group_name: String,
    /// Unit of measure (Nos, Kgs, ...)
    pub unit: String,
    pub hsn_code: Option<String>,
    pub gst_rate: Option<BigDecimal>,
    /// Opening stock quantity
    pub opening_qty: BigDecimal,
    /// Opening stock value
    pub opening_value: BigDecimal,
}

/// One side of a voucher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherEntry {
    /// Ledger the entry posts to
    pub ledger_name: String,
    /// Signed amount (debit positive, credit negative)
    pub amount: BigDecimal,
    pub entry_type: EntryType,
}

impl VoucherEntry {
    /// Build an entry from a signed amount; the sign decides the side
    pub fn from_signed(ledger_name: String, amount: BigDecimal) -> Self {
        let entry_type = if amount < BigDecimal::from(0) {
            EntryType::Credit
        } else {
            EntryType::Debit
        };
        Self {
            ledger_name,
            amount,
            entry_type,
        }
    }
}

/// Voucher (transaction) from the source export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub voucher_type: VoucherType,
    /// Voucher number (natural key)
    pub number: String,
    pub date: NaiveDate,
    /// Party ledger name, when the source names one
    pub party_name: Option<String>,
    pub narration: String,
    pub entries: Vec<VoucherEntry>,
    pub total_amount: BigDecimal,
}

/// Opening balance derived from a ledger's signed opening amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningBalance {
    pub ledger_name: String,
    /// Signed amount (debit positive, credit negative)
    pub amount: BigDecimal,
    pub entry_type: EntryType,
}

/// Everything one parsed upload contains, in canonical form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDataSet {
    pub groups: Vec<Group>,
    pub ledgers: Vec<Ledger>,
    pub stock_items: Vec<StockItem>,
    pub vouchers: Vec<Voucher>,
    /// Rows whose kind could not be recognized (CSV `Type` column)
    pub unrecognized_rows: usize,
}

impl ParsedDataSet {
    /// Whether the upload contained no usable records at all
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.ledgers.is_empty()
            && self.stock_items.is_empty()
            && self.vouchers.is_empty()
    }

    /// Derive opening balances from the parsed ledgers
    ///
    /// These are not independently authored by any source format; a ledger
    /// with a non-zero signed opening amount yields exactly one entry.
    pub fn opening_balances(&self) -> Vec<OpeningBalance> {
        let zero = BigDecimal::from(0);
        self.ledgers
            .iter()
            .filter(|ledger| ledger.opening_balance != zero)
            .map(|ledger| {
                let entry_type = if ledger.opening_balance < zero {
                    EntryType::Credit
                } else {
                    EntryType::Debit
                };
                OpeningBalance {
                    ledger_name: ledger.name.clone(),
                    amount: ledger.opening_balance.clone(),
                    entry_type,
                }
            })
            .collect()
    }
}

/// Errors that abort an import before or during parsing
///
/// Per-record failures never appear here; they accumulate on the report
/// instead (see [`crate::import::RecordIssue`]). Anything of this type means
/// the whole operation was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The upload cannot be used at all (empty, corrupted, unreadable)
    #[error("invalid input: {0}")]
    FatalInput(String),
    /// The file extension is not one of .xml/.xlsx/.xls/.csv
    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),
    /// Structural failure inside one format parser
    #[error("failed to parse {format} file: {message} ({hint})")]
    Parse {
        format: &'static str,
        message: String,
        hint: &'static str,
    },
    /// Repository or file-store failure surfaced by a collaborator
    #[error("storage error: {0}")]
    Storage(String),
}

impl ImportError {
    /// Build a parse error, picking a diagnostic hint by pattern-matching the
    /// underlying parser's message
    pub fn parse(format: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        let hint = if lowered.contains("utf") || lowered.contains("encoding") {
            "likely encoding/BOM issue"
        } else if lowered.contains("eof") || lowered.contains("unexpected end") {
            "likely truncated upload"
        } else {
            "file may not be a valid export"
        };
        ImportError::Parse {
            format,
            message,
            hint,
        }
    }
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

//! Field mapping for tabular sources (spreadsheet and CSV)
//!
//! Exports are wildly inconsistent about header spelling: "Opening Balance",
//! "OPENING_BALANCE" and "OpeningBalance" all occur in the wild. Header keys
//! are normalized to bare lowercase alphanumerics on ingestion, which folds
//! most variants together; genuinely different namings ("Under" vs "Parent")
//! are handled with alias lists per logical field.

use std::collections::HashMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::classify::{classify_nature, map_voucher_type};
use crate::parse::values::{parse_date, parse_signed_amount};
use crate::types::{Group, Ledger, Nature, StockItem, Voucher, VoucherEntry};

/// One row of a tabular source, keyed by normalized header text
#[derive(Debug, Default)]
pub struct FieldRow {
    values: HashMap<String, String>,
}

impl FieldRow {
    /// Build a row from raw (header, value) pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let values = pairs
            .into_iter()
            .filter_map(|(key, value)| {
                let key = normalize_key(&key);
                let value = value.trim().to_string();
                if key.is_empty() {
                    None
                } else {
                    Some((key, value))
                }
            })
            .collect();
        Self { values }
    }

    /// First non-empty value among the given normalized field aliases
    pub fn first(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.values.get(*alias))
            .map(|value| value.as_str())
            .find(|value| !value.is_empty())
    }

    /// Whether every cell in the row is empty
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|value| value.is_empty())
    }
}

/// Collapse a header to lowercase alphanumerics ("Opening Balance" and
/// "OPENING_BALANCE" both become "openingbalance"); stray BOM characters in
/// the first header of a CSV are dropped with everything else non-alphanumeric
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Build a [`Group`] from a tabular row; `None` when the name is missing
pub fn group_from_row(row: &FieldRow) -> Option<Group> {
    let name = row.first(&["name", "groupname"])?.to_string();
    let parent = row
        .first(&["parent", "under", "parentgroup"])
        .map(str::to_string);
    let nature = row
        .first(&["nature"])
        .and_then(Nature::from_source)
        .unwrap_or_else(|| classify_nature(&name));
    Some(Group {
        name,
        parent,
        nature,
    })
}

/// Build a [`Ledger`] from a tabular row; `None` when the name is missing
pub fn ledger_from_row(row: &FieldRow) -> Option<Ledger> {
    let name = row.first(&["name", "ledgername"])?.to_string();
    let group_name = row
        .first(&["group", "under", "parent", "groupname"])
        .unwrap_or_default()
        .to_string();
    let opening_balance =
        parse_signed_amount(row.first(&["openingbalance", "opening"]).unwrap_or_default());

    Some(Ledger {
        name,
        group_name,
        address: row.first(&["address"]).map(str::to_string),
        state: row.first(&["state"]).map(str::to_string),
        pincode: row.first(&["pincode", "pin"]).map(str::to_string),
        gstin: row.first(&["gstin", "gstno", "gstnumber"]).map(str::to_string),
        pan: row.first(&["pan", "panno"]).map(str::to_string),
        email: row.first(&["email", "emailid"]).map(str::to_string),
        phone: row.first(&["phone", "mobile", "contact"]).map(str::to_string),
        opening_balance,
        is_default: false,
    })
}

/// Build a [`StockItem`] from a tabular row; `None` when the name is missing
pub fn stock_item_from_row(row: &FieldRow) -> Option<StockItem> {
    let name = row.first(&["name", "itemname", "stockitem"])?.to_string();
    let group_name = row
        .first(&["group", "under", "stockgroup", "parent"])
        .unwrap_or_default()
        .to_string();
    let unit = row
        .first(&["unit", "uom", "baseunit", "units"])
        .unwrap_or("Nos")
        .to_string();
    let gst_rate = row
        .first(&["gstrate", "gst", "taxrate"])
        .and_then(parse_rate);
    let opening_qty =
        parse_signed_amount(row.first(&["openingqty", "openingquantity", "qty"]).unwrap_or_default());
    let opening_value =
        parse_signed_amount(row.first(&["openingvalue", "openingamount"]).unwrap_or_default());

    Some(StockItem {
        name,
        group_name,
        unit,
        hsn_code: row.first(&["hsn", "hsncode", "hsnsac"]).map(str::to_string),
        gst_rate,
        opening_qty,
        opening_value,
    })
}

/// Build a [`Voucher`] from a flat tabular row
///
/// `None` when the number or date is missing/unparsable (a flat row without
/// either carries nothing importable). A row naming a ledger synthesizes one
/// entry from the signed amount; multi-entry vouchers only occur in XML.
pub fn voucher_from_row(row: &FieldRow) -> Option<Voucher> {
    let number = row
        .first(&["voucherno", "vouchernumber", "number", "no"])?
        .to_string();
    let date = parse_date(row.first(&["date", "voucherdate", "vchdate"]).unwrap_or_default())?;
    let voucher_type =
        map_voucher_type(row.first(&["vouchertype", "type"]).unwrap_or_default());
    let party_name = row
        .first(&["party", "partyname", "partyledger"])
        .map(str::to_string);
    let narration = row
        .first(&["narration", "description", "remarks"])
        .unwrap_or_default()
        .to_string();
    let amount =
        parse_signed_amount(row.first(&["amount", "total", "totalamount"]).unwrap_or_default());

    let entries = match row.first(&["ledger", "ledgername"]) {
        Some(ledger_name) => vec![VoucherEntry::from_signed(
            ledger_name.to_string(),
            amount.clone(),
        )],
        None => Vec::new(),
    };

    Some(Voucher {
        voucher_type,
        number,
        date,
        party_name,
        narration,
        entries,
        total_amount: amount.abs(),
    })
}

/// Parse a GST rate cell, tolerating a trailing percent sign
fn parse_rate(raw: &str) -> Option<BigDecimal> {
    let cleaned = raw.trim().trim_end_matches('%').trim();
    BigDecimal::from_str(cleaned).ok()
}

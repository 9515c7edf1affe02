//! CSV export parser
//!
//! One flat file for all entity kinds: a `Type` column decides which bucket
//! each row lands in. Rows are streamed so memory is bounded by the parsed
//! record lists, not the raw file size.

use csv::ReaderBuilder;

use crate::parse::fields::{
    group_from_row, ledger_from_row, stock_item_from_row, voucher_from_row, FieldRow,
};
use crate::types::{ImportError, ImportResult, ParsedDataSet};

/// Parse decoded CSV text into a canonical data set
///
/// The `Type` column is matched case-insensitively by substring; a row whose
/// type matches none of the four kinds is counted in `unrecognized_rows`
/// rather than silently dropped.
pub fn parse(text: &str) -> ImportResult<ParsedDataSet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::parse("CSV", e.to_string()))?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut data = ParsedDataSet::default();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::parse("CSV", e.to_string()))?;
        let row = FieldRow::from_pairs(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(|value| value.to_string())),
        );
        if row.is_blank() {
            continue;
        }

        let kind = row
            .first(&["type", "recordtype"])
            .unwrap_or_default()
            .to_lowercase();
        if kind.contains("group") {
            if let Some(group) = group_from_row(&row) {
                data.groups.push(group);
            }
        } else if kind.contains("ledger") {
            if let Some(ledger) = ledger_from_row(&row) {
                data.ledgers.push(ledger);
            }
        } else if kind.contains("stock") {
            if let Some(item) = stock_item_from_row(&row) {
                data.stock_items.push(item);
            }
        } else if kind.contains("voucher") {
            if let Some(voucher) = voucher_from_row(&row) {
                data.vouchers.push(voucher);
            }
        } else {
            data.unrecognized_rows += 1;
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Nature, VoucherType};
    use bigdecimal::BigDecimal;

    #[test]
    fn rows_bucket_by_type_substring() {
        let text = "\
Type,Name,Group,Opening Balance
Group,Sundry Creditors,,
Ledger,Cash,Current Assets,Dr 1000
Stock Item,Widget,Finished Goods,
Account Ledger,Bank,Bank Accounts,
";
        let data = parse(text).unwrap();
        assert_eq!(data.groups.len(), 1);
        assert_eq!(data.ledgers.len(), 2);
        assert_eq!(data.stock_items.len(), 1);
        assert_eq!(data.groups[0].nature, Nature::Liability);
        assert_eq!(data.ledgers[0].opening_balance, BigDecimal::from(1000));
        assert_eq!(data.unrecognized_rows, 0);
    }

    #[test]
    fn unrecognized_types_are_counted_not_dropped() {
        let text = "\
Type,Name
Widget,Thing One
Gadget,Thing Two
Ledger,Cash
";
        let data = parse(text).unwrap();
        assert_eq!(data.ledgers.len(), 1);
        assert_eq!(data.unrecognized_rows, 2);
    }

    #[test]
    fn voucher_rows_carry_their_own_type_name() {
        let text = "\
Type,Voucher No,Date,Party,Amount,Narration
Sales Voucher,V-1,20240315,ABC Traders,5900,March sale
";
        let data = parse(text).unwrap();
        assert_eq!(data.vouchers.len(), 1);
        assert_eq!(data.vouchers[0].voucher_type, VoucherType::Sales);
        assert_eq!(data.vouchers[0].total_amount, BigDecimal::from(5900));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let text = "Type,Name\n,,\nLedger,Cash\n";
        let data = parse(text).unwrap();
        assert_eq!(data.ledgers.len(), 1);
        assert_eq!(data.unrecognized_rows, 0);
    }
}

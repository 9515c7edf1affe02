//! Spreadsheet (.xlsx/.xls) export parser
//!
//! Entity kinds live on separate named sheets; a missing sheet just means
//! zero records of that kind. Row 1 of each sheet is the header row, and the
//! remaining rows go through the shared field mapper exactly like CSV rows.

use std::io::Cursor;

use calamine::{Data, Reader, Xls, Xlsx};

use crate::parse::fields::{
    group_from_row, ledger_from_row, stock_item_from_row, voucher_from_row, FieldRow,
};
use crate::parse::values::from_spreadsheet_serial;
use crate::types::{ImportError, ImportResult, ParsedDataSet};

/// Parse a `.xlsx` workbook from raw upload bytes
pub fn parse_xlsx(bytes: &[u8]) -> ImportResult<ParsedDataSet> {
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::parse("spreadsheet", e.to_string()))?;
    parse_workbook(workbook)
}

/// Parse a legacy `.xls` workbook from raw upload bytes
pub fn parse_xls(bytes: &[u8]) -> ImportResult<ParsedDataSet> {
    let workbook: Xls<_> = Xls::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::parse("spreadsheet", e.to_string()))?;
    parse_workbook(workbook)
}

fn parse_workbook<R>(mut workbook: R) -> ImportResult<ParsedDataSet>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::fmt::Display,
{
    let mut data = ParsedDataSet::default();

    let sheet_names = workbook.sheet_names().to_owned();
    for sheet_name in sheet_names {
        let kind = sheet_name
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        let bucket = match kind.as_str() {
            "groups" | "group" => SheetKind::Groups,
            "ledgers" | "ledger" => SheetKind::Ledgers,
            "stockitems" | "stockitem" => SheetKind::StockItems,
            "vouchers" | "voucher" => SheetKind::Vouchers,
            _ => continue,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::parse("spreadsheet", e.to_string()))?;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            continue;
        };
        let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

        for cells in rows {
            let row = FieldRow::from_pairs(
                headers
                    .iter()
                    .cloned()
                    .zip(cells.iter().map(cell_to_string)),
            );
            if row.is_blank() {
                continue;
            }
            match bucket {
                SheetKind::Groups => {
                    if let Some(group) = group_from_row(&row) {
                        data.groups.push(group);
                    }
                }
                SheetKind::Ledgers => {
                    if let Some(ledger) = ledger_from_row(&row) {
                        data.ledgers.push(ledger);
                    }
                }
                SheetKind::StockItems => {
                    if let Some(item) = stock_item_from_row(&row) {
                        data.stock_items.push(item);
                    }
                }
                SheetKind::Vouchers => {
                    if let Some(voucher) = voucher_from_row(&row) {
                        data.vouchers.push(voucher);
                    }
                }
            }
        }
    }
    Ok(data)
}

#[derive(Clone, Copy)]
enum SheetKind {
    Groups,
    Ledgers,
    StockItems,
    Vouchers,
}

/// Render a cell to the text the field mapper sees
///
/// Native date cells become ISO dates via the serial epoch rule; numeric
/// cells keep their plain representation so a serial in a date column still
/// reaches the shared date parser as a bare number.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::Float(value) => format_number(*value),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => from_spreadsheet_serial(value.as_f64())
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| format_number(value.as_f64())),
        other => other.to_string().trim().to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_render_without_fraction() {
        assert_eq!(cell_to_string(&Data::Float(45366.0)), "45366");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
    }

    #[test]
    fn strings_are_trimmed() {
        assert_eq!(cell_to_string(&Data::String("  Cash ".to_string())), "Cash");
    }

    #[test]
    fn empty_cells_render_empty() {
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn garbage_workbook_bytes_are_a_parse_error() {
        assert!(matches!(
            parse_xlsx(b"not a zip archive"),
            Err(ImportError::Parse { .. })
        ));
    }
}

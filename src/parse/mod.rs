//! Format detection and parsing of source exports
//!
//! Three serializations of the same dataset are supported; all of them land
//! in the one canonical [`ParsedDataSet`]. Text formats (XML, CSV) pass
//! through the encoding normalizer first; spreadsheets are binary and go to
//! the workbook reader as-is.

pub mod csv;
pub mod encoding;
pub mod fields;
pub mod spreadsheet;
pub mod values;
pub mod xml;

use std::path::Path;

use crate::types::{ImportError, ImportResult, ParsedDataSet};

/// Supported upload formats, decided by file extension alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xml,
    Xlsx,
    Xls,
    Csv,
}

impl SourceFormat {
    /// Detect the format from the uploaded file's name
    ///
    /// Anything other than `.xml`, `.xlsx`, `.xls` or `.csv` is rejected
    /// before a single byte is parsed.
    pub fn from_file_name(name: &str) -> ImportResult<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match extension.as_str() {
            "xml" => Ok(SourceFormat::Xml),
            "xlsx" => Ok(SourceFormat::Xlsx),
            "xls" => Ok(SourceFormat::Xls),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(ImportError::UnsupportedFormat(extension)),
        }
    }
}

/// Parse raw upload bytes in the given format into a canonical data set
pub fn parse_bytes(bytes: &[u8], format: SourceFormat) -> ImportResult<ParsedDataSet> {
    if bytes.is_empty() {
        return Err(ImportError::FatalInput(
            "empty or corrupted file".to_string(),
        ));
    }
    match format {
        SourceFormat::Xml => xml::parse(&encoding::decode_text(bytes)?),
        SourceFormat::Csv => csv::parse(&encoding::decode_text(bytes)?),
        SourceFormat::Xlsx => spreadsheet::parse_xlsx(bytes),
        SourceFormat::Xls => spreadsheet::parse_xls(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection_by_extension() {
        assert_eq!(
            SourceFormat::from_file_name("export.xml").unwrap(),
            SourceFormat::Xml
        );
        assert_eq!(
            SourceFormat::from_file_name("Books.XLSX").unwrap(),
            SourceFormat::Xlsx
        );
        assert_eq!(
            SourceFormat::from_file_name("data.csv").unwrap(),
            SourceFormat::Csv
        );
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        assert!(matches!(
            SourceFormat::from_file_name("export.pdf"),
            Err(ImportError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
        assert!(matches!(
            SourceFormat::from_file_name("no_extension"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn empty_uploads_are_fatal_for_every_format() {
        for format in [
            SourceFormat::Xml,
            SourceFormat::Xlsx,
            SourceFormat::Xls,
            SourceFormat::Csv,
        ] {
            assert!(matches!(
                parse_bytes(b"", format),
                Err(ImportError::FatalInput(_))
            ));
        }
    }
}

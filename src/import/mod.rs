//! Import options, reports, and the top-level engine

pub mod orchestrator;

pub use orchestrator::ImportOrchestrator;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::parse::{parse_bytes, SourceFormat};
use crate::traits::{FileStore, ImportStore};
use crate::types::{ImportResult, ParsedDataSet};

/// Per-run import options
///
/// All kinds import by default; the voucher cap bounds worst-case run time
/// on oversized uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub import_groups: bool,
    pub import_ledgers: bool,
    pub import_stock_items: bool,
    pub import_vouchers: bool,
    pub max_vouchers: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            import_groups: true,
            import_ledgers: true,
            import_stock_items: true,
            import_vouchers: true,
            max_vouchers: 1000,
        }
    }
}

/// One record that could not be imported, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIssue {
    /// Natural key of the failed record
    pub record: String,
    pub message: String,
}

/// Create-or-skip accounting for one entity kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<RecordIssue>,
}

/// Raw pre-cap totals of what the upload contained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_groups: usize,
    pub total_ledgers: usize,
    pub total_stock_items: usize,
    pub total_vouchers: usize,
    /// CSV rows whose `Type` matched no entity kind
    pub unrecognized_rows: usize,
}

/// Outcome of one import run
///
/// Existing here means the run as a whole succeeded; per-record failures are
/// inside the per-kind reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub groups: EntityReport,
    pub ledgers: EntityReport,
    pub stock_items: EntityReport,
    pub vouchers: EntityReport,
    pub summary: ImportSummary,
}

impl ImportReport {
    /// Fresh report with the summary totals taken from a parsed set
    pub fn for_data(data: &ParsedDataSet) -> Self {
        Self {
            summary: ImportSummary {
                total_groups: data.groups.len(),
                total_ledgers: data.ledgers.len(),
                total_stock_items: data.stock_items.len(),
                total_vouchers: data.vouchers.len(),
                unrecognized_rows: data.unrecognized_rows,
            },
            ..Self::default()
        }
    }
}

/// The import engine: file in, report out
///
/// Ties the format parsers and the orchestrator together behind the two
/// collaborator abstractions ([`ImportStore`], [`FileStore`]) the hosting
/// application provides.
pub struct ImportEngine<S: ImportStore, F: FileStore> {
    orchestrator: ImportOrchestrator<S>,
    files: F,
}

impl<S: ImportStore, F: FileStore> ImportEngine<S, F> {
    pub fn new(store: S, files: F) -> Self {
        Self {
            orchestrator: ImportOrchestrator::new(store),
            files,
        }
    }

    /// Import one uploaded file
    ///
    /// The extension decides the format before any byte is read; parse
    /// failures reject the whole run. After orchestration the upload is
    /// deleted best-effort; a deletion failure is logged, never surfaced.
    pub async fn import_file(
        &mut self,
        file_name: &str,
        options: &ImportOptions,
    ) -> ImportResult<ImportReport> {
        let format = SourceFormat::from_file_name(file_name)?;
        let bytes = self.files.read(file_name).await?;
        let data = parse_bytes(&bytes, format)?;
        let report = self.orchestrator.run(&data, options).await;

        if let Err(error) = self.files.delete(file_name).await {
            warn!(file = %file_name, %error, "failed to delete uploaded file after import");
        }
        Ok(report)
    }

    /// Merge an already-parsed data set (parsing and storage concerns split,
    /// e.g. when the caller validates the parse before committing)
    pub async fn import_data(
        &mut self,
        data: &ParsedDataSet,
        options: &ImportOptions,
    ) -> ImportReport {
        self.orchestrator.run(data, options).await
    }

    /// The underlying store handle
    pub fn store(&self) -> &S {
        self.orchestrator.store()
    }
}

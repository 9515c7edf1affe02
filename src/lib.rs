//! # Accounting Import
//!
//! A multi-format import engine for desktop accounting-package exports,
//! normalizing XML, spreadsheet (.xlsx/.xls) and CSV datasets into one
//! canonical schema and merging them idempotently into an existing
//! accounting store.
//!
//! ## Features
//!
//! - **Three source formats**: one canonical `ParsedDataSet` regardless of
//!   which serialization the upload used
//! - **Encoding normalization**: UTF-8/UTF-16 byte-order marks and stray
//!   leading bytes are handled before parsing
//! - **Heuristic classification**: group natures and voucher types inferred
//!   from free-text names via ordered, auditable rule tables
//! - **Idempotent merge**: create-or-skip by natural key; re-importing the
//!   same file is a no-op
//! - **Partial-failure tolerance**: one bad record becomes a report entry,
//!   never a failed batch
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   repositories
//!
//! ## Quick Start
//!
//! ```rust
//! use accounting_import::{ImportEngine, ImportOptions};
//! use accounting_import::utils::{MemoryFileStore, MemoryImportStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), accounting_import::ImportError> {
//! let files = MemoryFileStore::new();
//! files.insert(
//!     "books.csv",
//!     b"Type,Name\nGroup,Sundry Debtors\n".to_vec(),
//! );
//!
//! let mut engine = ImportEngine::new(MemoryImportStore::new(), files);
//! let report = engine.import_file("books.csv", &ImportOptions::default()).await?;
//! assert_eq!(report.groups.imported, 1);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod import;
pub mod parse;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use classify::{classify_nature, map_voucher_type};
pub use import::{
    EntityReport, ImportEngine, ImportOptions, ImportOrchestrator, ImportReport, ImportSummary,
    RecordIssue,
};
pub use parse::{parse_bytes, SourceFormat};
pub use traits::*;
pub use types::*;

//! Traits for the target-store and upload-store abstractions
//!
//! The import engine never talks to a database or a filesystem directly. The
//! hosting application (web layer, multi-tenant connection resolution, etc.)
//! implements these traits against its own storage; the crate ships in-memory
//! and local-disk implementations under [`crate::utils`] for tests and
//! development.

use async_trait::async_trait;

use crate::types::*;

/// Account-group repository of the target store
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Look up a group by its natural key
    async fn find_by_name(&self, name: &str) -> ImportResult<Option<Group>>;

    /// Create a group; the store assigns any surrogate identity
    async fn create(&mut self, group: &Group) -> ImportResult<()>;
}

/// Ledger repository of the target store
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Look up a ledger by its natural key
    async fn find_by_name(&self, name: &str) -> ImportResult<Option<Ledger>>;

    /// Create a ledger; its group must already exist
    async fn create(&mut self, ledger: &Ledger) -> ImportResult<()>;
}

/// Stock-item repository of the target store
#[async_trait]
pub trait StockItemRepository: Send + Sync {
    /// Look up a stock item by its natural key
    async fn find_by_name(&self, name: &str) -> ImportResult<Option<StockItem>>;

    /// Create a stock item; its group must already exist
    async fn create(&mut self, item: &StockItem) -> ImportResult<()>;
}

/// Voucher-type repository of the target store
///
/// Voucher types are a small, mostly-fixed vocabulary; the orchestrator
/// find-or-creates them by canonical name.
#[async_trait]
pub trait VoucherTypeRepository: Send + Sync {
    /// Look up a voucher type by its canonical name
    async fn find_by_name(&self, name: &str) -> ImportResult<Option<String>>;

    /// Create a voucher type with the given canonical name
    async fn create(&mut self, name: &str) -> ImportResult<()>;
}

/// Voucher repository of the target store
#[async_trait]
pub trait VoucherRepository: Send + Sync {
    /// Look up a voucher by its natural key (the voucher number)
    async fn find_by_name(&self, number: &str) -> ImportResult<Option<Voucher>>;

    /// Create a voucher; its type must already exist
    async fn create(&mut self, voucher: &Voucher) -> ImportResult<()>;
}

/// Everything the orchestrator needs from the target store, as one bound
///
/// Blanket-implemented for any type that implements all five repositories, so
/// a single store handle (one database connection) can back the whole run.
pub trait ImportStore:
    GroupRepository
    + LedgerRepository
    + StockItemRepository
    + VoucherTypeRepository
    + VoucherRepository
{
}

impl<T> ImportStore for T where
    T: GroupRepository
        + LedgerRepository
        + StockItemRepository
        + VoucherTypeRepository
        + VoucherRepository
{
}

/// Store holding uploaded files awaiting import
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Read the raw bytes of an uploaded file
    async fn read(&self, name: &str) -> ImportResult<Vec<u8>>;

    /// Delete an uploaded file
    ///
    /// The engine calls this best-effort after a completed run; failures are
    /// logged by the caller, never surfaced.
    async fn delete(&mut self, name: &str) -> ImportResult<()>;
}

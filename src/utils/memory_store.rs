//! In-memory store implementations for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory target store backing all five repositories
///
/// Clones share the same underlying maps, so a test can keep a handle to
/// inspect the store after handing a clone to the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryImportStore {
    groups: Arc<RwLock<HashMap<String, Group>>>,
    ledgers: Arc<RwLock<HashMap<String, Ledger>>>,
    stock_items: Arc<RwLock<HashMap<String, StockItem>>>,
    voucher_types: Arc<RwLock<HashMap<String, String>>>,
    vouchers: Arc<RwLock<HashMap<String, Voucher>>>,
}

impl MemoryImportStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.groups.write().unwrap().clear();
        self.ledgers.write().unwrap().clear();
        self.stock_items.write().unwrap().clear();
        self.voucher_types.write().unwrap().clear();
        self.vouchers.write().unwrap().clear();
    }

    /// Number of stored groups
    pub fn group_count(&self) -> usize {
        self.groups.read().unwrap().len()
    }

    /// Number of stored ledgers
    pub fn ledger_count(&self) -> usize {
        self.ledgers.read().unwrap().len()
    }

    /// Number of stored vouchers
    pub fn voucher_count(&self) -> usize {
        self.vouchers.read().unwrap().len()
    }
}

#[async_trait]
impl GroupRepository for MemoryImportStore {
    async fn find_by_name(&self, name: &str) -> ImportResult<Option<Group>> {
        Ok(self.groups.read().unwrap().get(name).cloned())
    }

    async fn create(&mut self, group: &Group) -> ImportResult<()> {
        self.groups
            .write()
            .unwrap()
            .insert(group.name.clone(), group.clone());
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for MemoryImportStore {
    async fn find_by_name(&self, name: &str) -> ImportResult<Option<Ledger>> {
        Ok(self.ledgers.read().unwrap().get(name).cloned())
    }

    async fn create(&mut self, ledger: &Ledger) -> ImportResult<()> {
        self.ledgers
            .write()
            .unwrap()
            .insert(ledger.name.clone(), ledger.clone());
        Ok(())
    }
}

#[async_trait]
impl StockItemRepository for MemoryImportStore {
    async fn find_by_name(&self, name: &str) -> ImportResult<Option<StockItem>> {
        Ok(self.stock_items.read().unwrap().get(name).cloned())
    }

    async fn create(&mut self, item: &StockItem) -> ImportResult<()> {
        self.stock_items
            .write()
            .unwrap()
            .insert(item.name.clone(), item.clone());
        Ok(())
    }
}

#[async_trait]
impl VoucherTypeRepository for MemoryImportStore {
    async fn find_by_name(&self, name: &str) -> ImportResult<Option<String>> {
        Ok(self.voucher_types.read().unwrap().get(name).cloned())
    }

    async fn create(&mut self, name: &str) -> ImportResult<()> {
        self.voucher_types
            .write()
            .unwrap()
            .insert(name.to_string(), name.to_string());
        Ok(())
    }
}

#[async_trait]
impl VoucherRepository for MemoryImportStore {
    async fn find_by_name(&self, number: &str) -> ImportResult<Option<Voucher>> {
        Ok(self.vouchers.read().unwrap().get(number).cloned())
    }

    async fn create(&mut self, voucher: &Voucher) -> ImportResult<()> {
        self.vouchers
            .write()
            .unwrap()
            .insert(voucher.number.clone(), voucher.clone());
        Ok(())
    }
}

/// In-memory file store for testing
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryFileStore {
    /// Create a new empty file store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a file for import
    pub fn insert(&self, name: &str, bytes: Vec<u8>) {
        self.files.write().unwrap().insert(name.to_string(), bytes);
    }

    /// Whether a file is still present
    pub fn contains(&self, name: &str) -> bool {
        self.files.read().unwrap().contains_key(name)
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn read(&self, name: &str) -> ImportResult<Vec<u8>> {
        self.files
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ImportError::FatalInput(format!("file not found: {name}")))
    }

    async fn delete(&mut self, name: &str) -> ImportResult<()> {
        match self.files.write().unwrap().remove(name) {
            Some(_) => Ok(()),
            None => Err(ImportError::Storage(format!("file not found: {name}"))),
        }
    }
}

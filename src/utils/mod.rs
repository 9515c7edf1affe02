//! Utility implementations of the collaborator traits

pub mod file_store;
pub mod memory_store;

pub use file_store::LocalFileStore;
pub use memory_store::{MemoryFileStore, MemoryImportStore};

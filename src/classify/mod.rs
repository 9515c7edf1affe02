//! Heuristic classification of free-text names from source exports

pub mod nature;
pub mod voucher_type;

pub use nature::classify_nature;
pub use voucher_type::map_voucher_type;

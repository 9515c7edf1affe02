//! Voucher-type mapping for free-text type names
//!
//! Ordered substring table, first match wins. Anything unrecognized lands on
//! Journal, the catch-all type for manual entries.

use crate::types::VoucherType;

const RULES: &[(&[&str], VoucherType)] = &[
    (&["sales", "invoice"], VoucherType::Sales),
    (&["purchase", "bill"], VoucherType::Purchase),
    (&["payment"], VoucherType::Payment),
    (&["receipt"], VoucherType::Receipt),
    (&["journal"], VoucherType::Journal),
    (&["contra"], VoucherType::Contra),
    (&["debit note"], VoucherType::DebitNote),
    (&["credit note"], VoucherType::CreditNote),
];

/// Map a free-text voucher-type name onto the canonical enum
pub fn map_voucher_type(name: &str) -> VoucherType {
    let lowered = name.to_lowercase();
    for (patterns, voucher_type) in RULES {
        if patterns.iter().any(|pattern| lowered.contains(pattern)) {
            return *voucher_type;
        }
    }
    VoucherType::Journal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_type_names() {
        assert_eq!(map_voucher_type("Sales"), VoucherType::Sales);
        assert_eq!(map_voucher_type("Tax Invoice"), VoucherType::Sales);
        assert_eq!(map_voucher_type("Purchase"), VoucherType::Purchase);
        assert_eq!(map_voucher_type("Purchase Bill"), VoucherType::Purchase);
        assert_eq!(map_voucher_type("Payment"), VoucherType::Payment);
        assert_eq!(map_voucher_type("Receipt"), VoucherType::Receipt);
        assert_eq!(map_voucher_type("Journal"), VoucherType::Journal);
        assert_eq!(map_voucher_type("Contra"), VoucherType::Contra);
        assert_eq!(map_voucher_type("Debit Note"), VoucherType::DebitNote);
        assert_eq!(map_voucher_type("Credit Note"), VoucherType::CreditNote);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(map_voucher_type("SALES"), VoucherType::Sales);
        assert_eq!(map_voucher_type("credit NOTE"), VoucherType::CreditNote);
    }

    #[test]
    fn unknown_types_default_to_journal() {
        assert_eq!(map_voucher_type("Memorandum"), VoucherType::Journal);
        assert_eq!(map_voucher_type(""), VoucherType::Journal);
    }
}

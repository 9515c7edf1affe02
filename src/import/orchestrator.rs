//! Dependency-ordered merge of a parsed data set into the target store
//!
//! Entity kinds are processed strictly sequentially in dependency order
//! (groups, ledgers, stock items, vouchers): a ledger row may reference a
//! group created moments earlier in the same run, and dedup assumes nothing
//! else is mutating the store mid-pass. One bad record never aborts the
//! batch; it becomes an entry on the report and the pass continues.

use tracing::debug;

use crate::import::{EntityReport, ImportOptions, ImportReport, RecordIssue};
use crate::traits::{
    GroupRepository, ImportStore, LedgerRepository, StockItemRepository, VoucherRepository,
    VoucherTypeRepository,
};
use crate::types::{Group, ImportError, Ledger, ParsedDataSet, StockItem, Voucher};

/// What happened to one record
enum Outcome {
    Created,
    Skipped,
}

fn err_text(error: ImportError) -> String {
    error.to_string()
}

/// Walks a [`ParsedDataSet`] and applies create-or-skip semantics against
/// the target store
pub struct ImportOrchestrator<S: ImportStore> {
    store: S,
}

impl<S: ImportStore> ImportOrchestrator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store handle
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Merge one parsed data set; record-level failures accumulate on the
    /// returned report, they are never raised
    pub async fn run(&mut self, data: &ParsedDataSet, options: &ImportOptions) -> ImportReport {
        let mut report = ImportReport::for_data(data);

        if options.import_groups {
            for group in &data.groups {
                let outcome = self.import_group(group).await;
                record(&mut report.groups, &group.name, outcome);
            }
        }

        if options.import_ledgers {
            for ledger in &data.ledgers {
                let outcome = self.import_ledger(ledger).await;
                record(&mut report.ledgers, &ledger.name, outcome);
            }
        }

        if options.import_stock_items {
            for item in &data.stock_items {
                let outcome = self.import_stock_item(item).await;
                record(&mut report.stock_items, &item.name, outcome);
            }
        }

        if options.import_vouchers {
            let cap = options.max_vouchers;
            if data.vouchers.len() > cap {
                report.vouchers.errors.push(RecordIssue {
                    record: "vouchers".to_string(),
                    message: format!(
                        "parsed {} vouchers but import is capped at {}; {} were not imported",
                        data.vouchers.len(),
                        cap,
                        data.vouchers.len() - cap
                    ),
                });
            }
            for voucher in data.vouchers.iter().take(cap) {
                let outcome = self.import_voucher(voucher).await;
                record(&mut report.vouchers, &voucher.number, outcome);
            }
        }

        report
    }

    async fn import_group(&mut self, group: &Group) -> Result<Outcome, String> {
        if GroupRepository::find_by_name(&self.store, &group.name)
            .await
            .map_err(err_text)?
            .is_some()
        {
            return Ok(Outcome::Skipped);
        }
        GroupRepository::create(&mut self.store, group)
            .await
            .map_err(err_text)?;
        Ok(Outcome::Created)
    }

    async fn import_ledger(&mut self, ledger: &Ledger) -> Result<Outcome, String> {
        self.require_group(&ledger.group_name).await?;
        if LedgerRepository::find_by_name(&self.store, &ledger.name)
            .await
            .map_err(err_text)?
            .is_some()
        {
            return Ok(Outcome::Skipped);
        }
        LedgerRepository::create(&mut self.store, ledger)
            .await
            .map_err(err_text)?;
        Ok(Outcome::Created)
    }

    async fn import_stock_item(&mut self, item: &StockItem) -> Result<Outcome, String> {
        self.require_group(&item.group_name).await?;
        if StockItemRepository::find_by_name(&self.store, &item.name)
            .await
            .map_err(err_text)?
            .is_some()
        {
            return Ok(Outcome::Skipped);
        }
        StockItemRepository::create(&mut self.store, item)
            .await
            .map_err(err_text)?;
        Ok(Outcome::Created)
    }

    async fn import_voucher(&mut self, voucher: &Voucher) -> Result<Outcome, String> {
        let type_name = voucher.voucher_type.name();
        if VoucherTypeRepository::find_by_name(&self.store, type_name)
            .await
            .map_err(err_text)?
            .is_none()
        {
            VoucherTypeRepository::create(&mut self.store, type_name)
                .await
                .map_err(err_text)?;
        }

        // An unresolved party degrades to "no party"; unlike a ledger's
        // group it does not block the voucher
        let mut voucher = voucher.clone();
        if let Some(party) = voucher.party_name.clone() {
            if LedgerRepository::find_by_name(&self.store, &party)
                .await
                .map_err(err_text)?
                .is_none()
            {
                debug!(
                    voucher = %voucher.number,
                    party = %party,
                    "party ledger not found, importing voucher without party"
                );
                voucher.party_name = None;
            }
        }

        if VoucherRepository::find_by_name(&self.store, &voucher.number)
            .await
            .map_err(err_text)?
            .is_some()
        {
            return Ok(Outcome::Skipped);
        }
        VoucherRepository::create(&mut self.store, &voucher)
            .await
            .map_err(err_text)?;
        Ok(Outcome::Created)
    }

    /// Hard reference: the named group must already exist in the store
    async fn require_group(&self, name: &str) -> Result<(), String> {
        let found = GroupRepository::find_by_name(&self.store, name)
            .await
            .map_err(err_text)?;
        if found.is_none() {
            return Err(format!("Group \"{name}\" not found"));
        }
        Ok(())
    }
}

fn record(report: &mut EntityReport, name: &str, outcome: Result<Outcome, String>) {
    match outcome {
        Ok(Outcome::Created) => report.imported += 1,
        Ok(Outcome::Skipped) => report.skipped += 1,
        Err(message) => report.errors.push(RecordIssue {
            record: name.to_string(),
            message,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_nature;
    use crate::types::{VoucherEntry, VoucherType};
    use crate::utils::MemoryImportStore;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn group(name: &str) -> Group {
        Group {
            name: name.to_string(),
            parent: None,
            nature: classify_nature(name),
        }
    }

    fn ledger(name: &str, group_name: &str) -> Ledger {
        Ledger::new(
            name.to_string(),
            group_name.to_string(),
            BigDecimal::from(0),
        )
    }

    fn voucher(number: &str) -> Voucher {
        Voucher {
            voucher_type: VoucherType::Sales,
            number: number.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            party_name: None,
            narration: String::new(),
            entries: vec![VoucherEntry::from_signed(
                "Sales".to_string(),
                BigDecimal::from(100),
            )],
            total_amount: BigDecimal::from(100),
        }
    }

    async fn seeded_store(groups: &[&str]) -> MemoryImportStore {
        let mut store = MemoryImportStore::new();
        for name in groups {
            GroupRepository::create(&mut store, &group(name))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn ledgers_import_when_groups_exist() {
        let store = seeded_store(&["Current Assets", "Sundry Creditors"]).await;
        let mut orchestrator = ImportOrchestrator::new(store);

        let mut data = ParsedDataSet::default();
        data.ledgers.push(ledger("Cash", "Current Assets"));
        data.ledgers.push(ledger("ABC Traders", "Sundry Creditors"));

        let report = orchestrator.run(&data, &ImportOptions::default()).await;
        assert_eq!(report.ledgers.imported, 2);
        assert_eq!(report.ledgers.skipped, 0);
        assert!(report.ledgers.errors.is_empty());
    }

    #[tokio::test]
    async fn missing_group_is_a_record_error_not_fatal() {
        let store = seeded_store(&["Current Assets"]).await;
        let mut orchestrator = ImportOrchestrator::new(store);

        let mut data = ParsedDataSet::default();
        data.ledgers.push(ledger("Cash", "Current Assets"));
        data.ledgers.push(ledger("ABC Traders", "Sundry Creditors"));

        let report = orchestrator.run(&data, &ImportOptions::default()).await;
        assert_eq!(report.ledgers.imported, 1);
        assert_eq!(report.ledgers.errors.len(), 1);
        assert_eq!(report.ledgers.errors[0].record, "ABC Traders");
        assert_eq!(
            report.ledgers.errors[0].message,
            "Group \"Sundry Creditors\" not found"
        );
    }

    #[tokio::test]
    async fn second_run_skips_everything() {
        let store = seeded_store(&["Current Assets"]).await;
        let mut orchestrator = ImportOrchestrator::new(store);

        let mut data = ParsedDataSet::default();
        data.groups.push(group("Fixed Assets"));
        data.ledgers.push(ledger("Cash", "Current Assets"));
        data.vouchers.push(voucher("V-1"));

        let first = orchestrator.run(&data, &ImportOptions::default()).await;
        assert_eq!(first.groups.imported, 1);
        assert_eq!(first.ledgers.imported, 1);
        assert_eq!(first.vouchers.imported, 1);

        let second = orchestrator.run(&data, &ImportOptions::default()).await;
        assert_eq!(second.groups.imported, 0);
        assert_eq!(second.ledgers.imported, 0);
        assert_eq!(second.vouchers.imported, 0);
        assert_eq!(second.groups.skipped, first.groups.imported);
        assert_eq!(second.ledgers.skipped, first.ledgers.imported);
        assert_eq!(second.vouchers.skipped, first.vouchers.imported);
    }

    #[tokio::test]
    async fn ledger_created_in_same_run_satisfies_group_reference() {
        let store = MemoryImportStore::new();
        let mut orchestrator = ImportOrchestrator::new(store);

        let mut data = ParsedDataSet::default();
        data.groups.push(group("Current Assets"));
        data.ledgers.push(ledger("Cash", "Current Assets"));

        let report = orchestrator.run(&data, &ImportOptions::default()).await;
        assert_eq!(report.groups.imported, 1);
        assert_eq!(report.ledgers.imported, 1);
        assert!(report.ledgers.errors.is_empty());
    }

    #[tokio::test]
    async fn voucher_cap_truncates_with_one_overflow_entry() {
        let store = MemoryImportStore::new();
        let mut orchestrator = ImportOrchestrator::new(store);

        let mut data = ParsedDataSet::default();
        for i in 0..1500 {
            data.vouchers.push(voucher(&format!("V-{i}")));
        }

        let options = ImportOptions {
            max_vouchers: 1000,
            ..ImportOptions::default()
        };
        let report = orchestrator.run(&data, &options).await;
        assert_eq!(report.vouchers.imported, 1000);
        assert_eq!(report.vouchers.errors.len(), 1);
        assert!(report.vouchers.errors[0].message.contains("1500"));
        assert!(report.vouchers.errors[0].message.contains("1000"));
        assert_eq!(report.summary.total_vouchers, 1500);
    }

    #[tokio::test]
    async fn voucher_types_are_created_on_demand() {
        let store = MemoryImportStore::new();
        let mut orchestrator = ImportOrchestrator::new(store);

        let mut data = ParsedDataSet::default();
        data.vouchers.push(voucher("V-1"));

        let report = orchestrator.run(&data, &ImportOptions::default()).await;
        assert_eq!(report.vouchers.imported, 1);
        let type_name = VoucherTypeRepository::find_by_name(orchestrator.store(), "Sales")
            .await
            .unwrap();
        assert_eq!(type_name.as_deref(), Some("Sales"));
    }

    #[tokio::test]
    async fn unresolved_party_degrades_to_no_party() {
        let store = MemoryImportStore::new();
        let mut orchestrator = ImportOrchestrator::new(store);

        let mut data = ParsedDataSet::default();
        let mut with_party = voucher("V-1");
        with_party.party_name = Some("Nobody & Sons".to_string());
        data.vouchers.push(with_party);

        let report = orchestrator.run(&data, &ImportOptions::default()).await;
        assert_eq!(report.vouchers.imported, 1);
        assert!(report.vouchers.errors.is_empty());

        let stored = VoucherRepository::find_by_name(orchestrator.store(), "V-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.party_name, None);
    }

    #[tokio::test]
    async fn kind_toggles_skip_processing() {
        let store = seeded_store(&["Current Assets"]).await;
        let mut orchestrator = ImportOrchestrator::new(store);

        let mut data = ParsedDataSet::default();
        data.ledgers.push(ledger("Cash", "Current Assets"));

        let options = ImportOptions {
            import_ledgers: false,
            ..ImportOptions::default()
        };
        let report = orchestrator.run(&data, &options).await;
        assert_eq!(report.ledgers.imported, 0);
        assert_eq!(report.ledgers.skipped, 0);
        // Totals still reflect what was parsed
        assert_eq!(report.summary.total_ledgers, 1);
    }
}

use crate::domain::payroll::{NewPayrollEntry, PayrollEntry, PayrollRun, RunId};
use crate::domain::ports::{LedgerStore, RegistryStore};
use crate::domain::records::{
    BonusOverride, BonusRule, Lead, LeadId, LeadStatusChange, PayPeriod, PayPeriodId, RepId,
    Representative, Status, StatusChangeEvent, StatusChangeId, StatusId,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct RegistryTables {
    pay_periods: BTreeMap<PayPeriodId, PayPeriod>,
    representatives: BTreeMap<RepId, Representative>,
    leads: BTreeMap<LeadId, Lead>,
    statuses: BTreeMap<StatusId, Status>,
    status_changes: BTreeMap<StatusChangeId, StatusChangeEvent>,
    bonus_rules: BTreeMap<u32, BonusRule>,
    bonus_overrides: BTreeMap<u32, BonusOverride>,
}

/// A thread-safe in-memory registry.
///
/// All tables live behind one `Arc<RwLock<_>>`, so clones share state.
/// Ideal for tests and one-shot CLI invocations where persistence is not
/// required.
#[derive(Default, Clone)]
pub struct InMemoryRegistryStore {
    tables: Arc<RwLock<RegistryTables>>,
}

impl InMemoryRegistryStore {
    /// Creates a new, empty in-memory registry.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn is_empty(&self) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.pay_periods.is_empty()
            && tables.representatives.is_empty()
            && tables.leads.is_empty()
            && tables.statuses.is_empty()
            && tables.status_changes.is_empty()
            && tables.bonus_rules.is_empty()
            && tables.bonus_overrides.is_empty())
    }

    async fn pay_period(&self, id: PayPeriodId) -> Result<Option<PayPeriod>> {
        let tables = self.tables.read().await;
        Ok(tables.pay_periods.get(&id).cloned())
    }

    async fn store_pay_period(&self, period: PayPeriod) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.pay_periods.insert(period.id, period);
        Ok(())
    }

    async fn representatives(&self) -> Result<Vec<Representative>> {
        let tables = self.tables.read().await;
        Ok(tables.representatives.values().cloned().collect())
    }

    async fn representative(&self, id: RepId) -> Result<Option<Representative>> {
        let tables = self.tables.read().await;
        Ok(tables.representatives.get(&id).cloned())
    }

    async fn store_representative(&self, rep: Representative) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.representatives.insert(rep.id, rep);
        Ok(())
    }

    async fn lead(&self, id: LeadId) -> Result<Option<Lead>> {
        let tables = self.tables.read().await;
        Ok(tables.leads.get(&id).cloned())
    }

    async fn lead_count(&self) -> Result<usize> {
        let tables = self.tables.read().await;
        Ok(tables.leads.len())
    }

    async fn store_lead(&self, lead: Lead) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.leads.insert(lead.id, lead);
        Ok(())
    }

    async fn statuses(&self) -> Result<Vec<Status>> {
        let tables = self.tables.read().await;
        Ok(tables.statuses.values().cloned().collect())
    }

    async fn store_status(&self, status: Status) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.statuses.insert(status.id, status);
        Ok(())
    }

    async fn status_change(&self, id: StatusChangeId) -> Result<Option<StatusChangeEvent>> {
        let tables = self.tables.read().await;
        Ok(tables.status_changes.get(&id).cloned())
    }

    async fn store_status_change(&self, event: StatusChangeEvent) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.status_changes.insert(event.id, event);
        Ok(())
    }

    async fn status_changes_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<LeadStatusChange>> {
        let tables = self.tables.read().await;
        let changes = tables
            .status_changes
            .values()
            .filter(|e| e.changed_at >= start && e.changed_at <= end)
            .filter_map(|e| {
                tables.leads.get(&e.lead_id).map(|lead| LeadStatusChange {
                    event: e.clone(),
                    lead: lead.clone(),
                })
            })
            .collect();
        Ok(changes)
    }

    async fn status_changes_for_status(
        &self,
        status_id: StatusId,
    ) -> Result<Vec<StatusChangeEvent>> {
        let tables = self.tables.read().await;
        Ok(tables
            .status_changes
            .values()
            .filter(|e| e.status_id == status_id)
            .cloned()
            .collect())
    }

    async fn bonus_rules(&self) -> Result<Vec<BonusRule>> {
        let tables = self.tables.read().await;
        Ok(tables.bonus_rules.values().cloned().collect())
    }

    async fn store_bonus_rule(&self, rule: BonusRule) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.bonus_rules.insert(rule.id, rule);
        Ok(())
    }

    async fn bonus_overrides(&self) -> Result<Vec<BonusOverride>> {
        let tables = self.tables.read().await;
        Ok(tables.bonus_overrides.values().cloned().collect())
    }

    async fn store_bonus_override(&self, bonus_override: BonusOverride) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .bonus_overrides
            .insert(bonus_override.id, bonus_override);
        Ok(())
    }
}

#[derive(Default)]
struct LedgerTables {
    runs: BTreeMap<RunId, PayrollRun>,
    entries: Vec<PayrollEntry>,
    last_run_id: RunId,
    last_entry_id: u32,
}

/// A thread-safe in-memory payroll ledger.
///
/// `record_run` takes the write lock once for the run and all its entries,
/// so readers never observe a run without its entries.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    tables: Arc<RwLock<LedgerTables>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn record_run(
        &self,
        pay_period_id: PayPeriodId,
        run_at: NaiveDateTime,
        entries: Vec<NewPayrollEntry>,
    ) -> Result<PayrollRun> {
        let mut tables = self.tables.write().await;

        tables.last_run_id += 1;
        let run = PayrollRun {
            id: tables.last_run_id,
            pay_period_id,
            run_at,
        };

        for entry in entries {
            tables.last_entry_id += 1;
            let id = tables.last_entry_id;
            tables.entries.push(entry.into_entry(id, run.id));
        }
        tables.runs.insert(run.id, run.clone());

        Ok(run)
    }

    async fn latest_run(&self, pay_period_id: PayPeriodId) -> Result<Option<PayrollRun>> {
        let tables = self.tables.read().await;
        Ok(tables
            .runs
            .values()
            .rev()
            .find(|r| r.pay_period_id == pay_period_id)
            .cloned())
    }

    async fn runs_for_period(&self, pay_period_id: PayPeriodId) -> Result<Vec<PayrollRun>> {
        let tables = self.tables.read().await;
        Ok(tables
            .runs
            .values()
            .filter(|r| r.pay_period_id == pay_period_id)
            .cloned()
            .collect())
    }

    async fn entries(&self, run_id: RunId) -> Result<Vec<PayrollEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .entries
            .iter()
            .filter(|e| e.payroll_run_id == run_id)
            .cloned()
            .collect())
    }
}

use super::payroll::{NewPayrollEntry, PayrollEntry, PayrollRun, RunId};
use super::records::{
    BonusOverride, BonusRule, Lead, LeadId, LeadStatusChange, PayPeriod, PayPeriodId, RepId,
    Representative, Status, StatusChangeEvent, StatusChangeId, StatusId,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Read/write access to the records the administrative layer maintains.
///
/// The payroll engine only reads through this port. Writes come from
/// [`crate::application::registry::Registry`], which validates first.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// True when no table holds any record.
    async fn is_empty(&self) -> Result<bool>;

    async fn pay_period(&self, id: PayPeriodId) -> Result<Option<PayPeriod>>;
    /// Inserts or replaces a pay period.
    async fn store_pay_period(&self, period: PayPeriod) -> Result<()>;

    async fn representatives(&self) -> Result<Vec<Representative>>;
    async fn representative(&self, id: RepId) -> Result<Option<Representative>>;
    async fn store_representative(&self, rep: Representative) -> Result<()>;

    async fn lead(&self, id: LeadId) -> Result<Option<Lead>>;
    async fn lead_count(&self) -> Result<usize>;
    async fn store_lead(&self, lead: Lead) -> Result<()>;

    async fn statuses(&self) -> Result<Vec<Status>>;
    async fn store_status(&self, status: Status) -> Result<()>;

    async fn status_change(&self, id: StatusChangeId) -> Result<Option<StatusChangeEvent>>;
    async fn store_status_change(&self, event: StatusChangeEvent) -> Result<()>;
    /// Changes with `start <= changed_at <= end`, joined with their lead.
    async fn status_changes_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<LeadStatusChange>>;
    async fn status_changes_for_status(
        &self,
        status_id: StatusId,
    ) -> Result<Vec<StatusChangeEvent>>;

    async fn bonus_rules(&self) -> Result<Vec<BonusRule>>;
    async fn store_bonus_rule(&self, rule: BonusRule) -> Result<()>;

    async fn bonus_overrides(&self) -> Result<Vec<BonusOverride>>;
    async fn store_bonus_override(&self, bonus_override: BonusOverride) -> Result<()>;
}

/// Durable record of payroll runs.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Writes a run and all of its entries as one atomic unit, assigning ids.
    ///
    /// Either the run and every entry become visible, or nothing does.
    async fn record_run(
        &self,
        pay_period_id: PayPeriodId,
        run_at: NaiveDateTime,
        entries: Vec<NewPayrollEntry>,
    ) -> Result<PayrollRun>;
    /// The run with the highest id for the period.
    async fn latest_run(&self, pay_period_id: PayPeriodId) -> Result<Option<PayrollRun>>;
    async fn runs_for_period(&self, pay_period_id: PayPeriodId) -> Result<Vec<PayrollRun>>;
    async fn entries(&self, run_id: RunId) -> Result<Vec<PayrollEntry>>;
}

pub type RegistryStoreRef = Arc<dyn RegistryStore>;
pub type LedgerStoreRef = Arc<dyn LedgerStore>;

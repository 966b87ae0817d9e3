use crate::domain::conversion::ConversionReport;
use crate::domain::payroll::{BonusTable, PayrollRun, PayrollSummaryRow, calculate_entries};
use crate::domain::ports::{LedgerStoreRef, RegistryStoreRef};
use crate::domain::records::{PayPeriodId, WON_STATUS_CODE};
use crate::error::{PayrollError, Result};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Computes and reads back payroll runs.
///
/// `PayrollEngine` owns handles to both storage ports. Every computation
/// bulk-loads what it needs from the registry, calculates entries in memory
/// and hands the finished run to the ledger in a single atomic write.
pub struct PayrollEngine {
    registry: RegistryStoreRef,
    ledger: LedgerStoreRef,
}

impl PayrollEngine {
    /// Creates a new `PayrollEngine`.
    ///
    /// # Arguments
    ///
    /// * `registry` - Source of periods, representatives, leads, events and bonuses.
    /// * `ledger` - Destination for payroll runs and their entries.
    pub fn new(registry: RegistryStoreRef, ledger: LedgerStoreRef) -> Self {
        Self { registry, ledger }
    }

    /// Computes payroll for a pay period and persists it as a new run.
    ///
    /// Fails with `NotFound` for an unknown period and `PeriodLocked` for a
    /// locked one; neither writes anything. Calling this twice for the same
    /// open period records two independent runs.
    #[instrument(skip(self))]
    pub async fn compute_payroll(&self, pay_period_id: PayPeriodId) -> Result<PayrollRun> {
        let period = self
            .registry
            .pay_period(pay_period_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("Pay period", pay_period_id))?;

        if period.locked {
            warn!("Refusing to compute payroll for a locked period");
            return Err(PayrollError::PeriodLocked(pay_period_id));
        }

        let (start, end) = period.window()?;
        let changes = self.registry.status_changes_between(start, end).await?;

        let active: Vec<_> = self
            .registry
            .representatives()
            .await?
            .into_iter()
            .filter(|rep| rep.is_active)
            .collect();

        let bonuses = BonusTable::new(
            &self.registry.bonus_rules().await?,
            &self.registry.bonus_overrides().await?,
        );
        debug!(
            changes = changes.len(),
            representatives = active.len(),
            "Loaded payroll inputs"
        );

        let entries = calculate_entries(&active, &changes, &bonuses);
        let entry_count = entries.len();

        let run = self
            .ledger
            .record_run(pay_period_id, Utc::now().naive_utc(), entries)
            .await?;

        info!(run = run.id, entries = entry_count, "Recorded payroll run");
        Ok(run)
    }

    /// Returns the entries of the most recent run for a pay period.
    #[instrument(skip(self))]
    pub async fn payroll_summary(
        &self,
        pay_period_id: PayPeriodId,
    ) -> Result<Vec<PayrollSummaryRow>> {
        let run = self
            .ledger
            .latest_run(pay_period_id)
            .await?
            .ok_or_else(|| PayrollError::not_found("Payroll run for pay period", pay_period_id))?;

        let names: HashMap<_, _> = self
            .registry
            .representatives()
            .await?
            .into_iter()
            .map(|rep| (rep.id, rep.name))
            .collect();

        let mut rows = Vec::new();
        for entry in self.ledger.entries(run.id).await? {
            let Some(rep_name) = names.get(&entry.rep_id) else {
                warn!(rep = entry.rep_id, "Dropping entry for unknown representative");
                continue;
            };
            rows.push(PayrollSummaryRow {
                rep_id: entry.rep_id,
                rep_name: rep_name.clone(),
                base_pay: entry.base_pay,
                total_bonus: entry.total_bonus,
                total_compensation: entry.total_compensation,
            });
        }
        Ok(rows)
    }

    /// Counts leads and how many of them ever reached the WON status.
    #[instrument(skip(self))]
    pub async fn conversion_report(&self) -> Result<ConversionReport> {
        let total_leads = self.registry.lead_count().await?;

        let won_status = self
            .registry
            .statuses()
            .await?
            .into_iter()
            .find(|s| s.code == WON_STATUS_CODE);

        let report = match won_status {
            Some(status) => {
                let won = self.registry.status_changes_for_status(status.id).await?;
                ConversionReport::tally(total_leads, &won)
            }
            None => {
                debug!("No {WON_STATUS_CODE} status configured");
                ConversionReport::new(total_leads, 0)
            }
        };
        Ok(report)
    }
}

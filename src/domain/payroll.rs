use super::money::Money;
use super::records::{
    BonusOverride, BonusRule, LeadStatusChange, PayPeriodId, RepId, Representative, StatusId,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub type RunId = u32;

/// One immutable payroll computation for a pay period.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PayrollRun {
    pub id: RunId,
    pub pay_period_id: PayPeriodId,
    pub run_at: NaiveDateTime,
}

/// A persisted line of a payroll run.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PayrollEntry {
    pub id: u32,
    pub payroll_run_id: RunId,
    pub rep_id: RepId,
    pub base_pay: Money,
    pub total_bonus: Money,
    pub total_compensation: Money,
}

/// An entry computed but not yet written; the ledger assigns its ids.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct NewPayrollEntry {
    pub rep_id: RepId,
    pub base_pay: Money,
    pub total_bonus: Money,
    pub total_compensation: Money,
}

impl NewPayrollEntry {
    pub fn new(rep_id: RepId, base_pay: Money, total_bonus: Money) -> Self {
        Self {
            rep_id,
            base_pay,
            total_bonus,
            total_compensation: base_pay + total_bonus,
        }
    }

    pub fn into_entry(self, id: u32, payroll_run_id: RunId) -> PayrollEntry {
        PayrollEntry {
            id,
            payroll_run_id,
            rep_id: self.rep_id,
            base_pay: self.base_pay,
            total_bonus: self.total_bonus,
            total_compensation: self.total_compensation,
        }
    }
}

/// A payroll entry joined with its representative's name.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PayrollSummaryRow {
    pub rep_id: RepId,
    pub rep_name: String,
    pub base_pay: Money,
    pub total_bonus: Money,
    pub total_compensation: Money,
}

/// Two-tier bonus lookup built from one bulk load of rules and overrides.
#[derive(Debug, Default)]
pub struct BonusTable {
    overrides: HashMap<(RepId, StatusId), Money>,
    rules: HashMap<StatusId, HashMap<String, Money>>,
}

impl BonusTable {
    pub fn new(rules: &[BonusRule], overrides: &[BonusOverride]) -> Self {
        let mut by_status: HashMap<StatusId, HashMap<String, Money>> = HashMap::new();
        for rule in rules {
            by_status
                .entry(rule.status_id)
                .or_default()
                .insert(rule.role_type.clone(), rule.bonus_amount);
        }
        Self {
            overrides: overrides
                .iter()
                .map(|o| ((o.rep_id, o.status_id), o.bonus_amount))
                .collect(),
            rules: by_status,
        }
    }

    /// Bonus earned by `rep` for one change to `status_id`.
    ///
    /// An override for (rep, status) wins; otherwise the rule for
    /// (status, role) applies; otherwise the change earns nothing.
    pub fn bonus_for(&self, rep: &Representative, status_id: StatusId) -> Money {
        if let Some(amount) = self.overrides.get(&(rep.id, status_id)) {
            return *amount;
        }
        self.rules
            .get(&status_id)
            .and_then(|by_role| by_role.get(rep.role_type.as_str()))
            .copied()
            .unwrap_or(Money::ZERO)
    }
}

/// Computes one entry per active representative from the period's changes.
///
/// `active` defines who is paid; changes credited to anyone else, or to
/// nobody, are skipped. Entries come back ordered by representative id.
pub fn calculate_entries(
    active: &[Representative],
    changes: &[LeadStatusChange],
    bonuses: &BonusTable,
) -> Vec<NewPayrollEntry> {
    let reps: BTreeMap<RepId, &Representative> = active.iter().map(|r| (r.id, r)).collect();
    let mut totals: BTreeMap<RepId, Money> = reps.keys().map(|id| (*id, Money::ZERO)).collect();

    for change in changes {
        let Some(rep) = change.responsible_rep().and_then(|id| reps.get(&id)) else {
            debug!(
                event = change.event.id,
                lead = change.lead.id,
                "Skipping status change with no active representative"
            );
            continue;
        };
        let bonus = bonuses.bonus_for(rep, change.event.status_id);
        if let Some(total) = totals.get_mut(&rep.id) {
            *total += bonus;
        }
    }

    reps.values()
        .map(|rep| {
            let total_bonus = totals.get(&rep.id).copied().unwrap_or(Money::ZERO);
            NewPayrollEntry::new(rep.id, rep.base_pay, total_bonus)
        })
        .collect()
}

//! Records owned by the administrative registry.
//!
//! The payroll engine only reads these. They are created through
//! [`crate::application::registry::Registry`] and never mutated afterwards,
//! except for a pay period's `locked` flag.

use super::money::Money;
use crate::error::{PayrollError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub type PayPeriodId = u32;
pub type RepId = u32;
pub type LeadId = u32;
pub type StatusId = u32;
pub type StatusChangeId = u32;

/// Code of the status that counts as a converted lead.
pub const WON_STATUS_CODE: &str = "WON";

/// An inclusive calendar range that payroll is computed over.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PayPeriod {
    pub id: PayPeriodId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub locked: bool,
}

impl PayPeriod {
    pub fn new(id: PayPeriodId, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id,
            start_date,
            end_date,
            locked: false,
        }
    }

    /// Returns the closed timestamp interval covered by the period.
    ///
    /// Runs from the first instant of `start_date` to the last representable
    /// instant of `end_date`, so events on either boundary date are included.
    pub fn window(&self) -> Result<(NaiveDateTime, NaiveDateTime)> {
        let start = self.start_date.and_time(NaiveTime::MIN);
        let end = self
            .end_date
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .ok_or_else(|| {
                PayrollError::ValidationError(format!(
                    "Cannot compute end of day for {}",
                    self.end_date
                ))
            })?;
        Ok((start, end))
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Representative {
    pub id: RepId,
    pub name: String,
    /// Category used to resolve default bonus rules.
    pub role_type: String,
    /// Fixed pay per period.
    pub base_pay: Money,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Lead {
    pub id: LeadId,
    pub title: String,
    /// Owner credited for status changes that carry no explicit actor.
    #[serde(default)]
    pub assigned_rep_id: Option<RepId>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Status {
    pub id: StatusId,
    pub code: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct StatusChangeEvent {
    pub id: StatusChangeId,
    pub lead_id: LeadId,
    pub status_id: StatusId,
    #[serde(default)]
    pub changed_by_rep_id: Option<RepId>,
    pub changed_at: NaiveDateTime,
}

/// A status change together with the lead it belongs to.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct LeadStatusChange {
    pub event: StatusChangeEvent,
    pub lead: Lead,
}

impl LeadStatusChange {
    /// The representative credited for this change: the recorded actor, or
    /// the lead's assigned representative when no actor was recorded.
    pub fn responsible_rep(&self) -> Option<RepId> {
        self.event.changed_by_rep_id.or(self.lead.assigned_rep_id)
    }
}

/// Default bonus for any representative of `role_type` reaching `status_id`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct BonusRule {
    pub id: u32,
    pub status_id: StatusId,
    pub role_type: String,
    pub bonus_amount: Money,
}

/// Representative-specific bonus; beats any [`BonusRule`] for the same status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct BonusOverride {
    pub id: u32,
    pub rep_id: RepId,
    pub status_id: StatusId,
    pub bonus_amount: Money,
}

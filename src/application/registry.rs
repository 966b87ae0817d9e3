use crate::domain::money::Money;
use crate::domain::ports::RegistryStoreRef;
use crate::domain::records::{
    BonusOverride, BonusRule, Lead, PayPeriod, PayPeriodId, RepId, Representative, Status,
    StatusChangeEvent, StatusId,
};
use crate::error::{PayrollError, Result};
use tracing::{debug, info};

/// Validating front door for administrative writes.
///
/// Enforces the uniqueness and reference constraints the payroll engine
/// relies on (one rule per status and role, one override per representative
/// and status, no dangling ids) before anything reaches the store.
pub struct Registry {
    store: RegistryStoreRef,
}

fn invalid(message: impl Into<String>) -> PayrollError {
    PayrollError::ValidationError(message.into())
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be blank")));
    }
    Ok(())
}

fn validate_representative(rep: &Representative) -> Result<()> {
    require_text("Representative name", &rep.name)?;
    require_text("Role type", &rep.role_type)?;
    Money::non_negative(rep.base_pay.value())?;
    Ok(())
}

impl Registry {
    pub fn new(store: RegistryStoreRef) -> Self {
        Self { store }
    }

    pub async fn create_pay_period(&self, period: PayPeriod) -> Result<PayPeriod> {
        if period.start_date > period.end_date {
            return Err(invalid(format!(
                "Pay period {} starts after it ends",
                period.id
            )));
        }
        if self.store.pay_period(period.id).await?.is_some() {
            return Err(invalid(format!("Pay period {} already exists", period.id)));
        }
        self.store.store_pay_period(period.clone()).await?;
        debug!(period = period.id, "Created pay period");
        Ok(period)
    }

    /// Locks a period against further payroll runs. Locking twice is a no-op.
    pub async fn lock_pay_period(&self, id: PayPeriodId) -> Result<PayPeriod> {
        let mut period = self
            .store
            .pay_period(id)
            .await?
            .ok_or_else(|| PayrollError::not_found("Pay period", id))?;
        if !period.locked {
            period.locked = true;
            self.store.store_pay_period(period.clone()).await?;
            info!(period = id, "Locked pay period");
        }
        Ok(period)
    }

    /// True when nothing has been registered yet.
    pub async fn is_empty(&self) -> Result<bool> {
        self.store.is_empty().await
    }

    pub async fn create_representative(&self, rep: Representative) -> Result<Representative> {
        validate_representative(&rep)?;
        if self.store.representative(rep.id).await?.is_some() {
            return Err(invalid(format!("Representative {} already exists", rep.id)));
        }
        self.store.store_representative(rep.clone()).await?;
        Ok(rep)
    }

    /// Replaces an existing representative, e.g. to deactivate them or
    /// change their base pay. Later payroll runs see the new values.
    pub async fn update_representative(&self, rep: Representative) -> Result<Representative> {
        validate_representative(&rep)?;
        if self.store.representative(rep.id).await?.is_none() {
            return Err(PayrollError::not_found("Representative", rep.id));
        }
        self.store.store_representative(rep.clone()).await?;
        info!(rep = rep.id, active = rep.is_active, "Updated representative");
        Ok(rep)
    }

    pub async fn create_status(&self, status: Status) -> Result<Status> {
        require_text("Status code", &status.code)?;
        let existing = self.store.statuses().await?;
        if existing.iter().any(|s| s.id == status.id) {
            return Err(invalid(format!("Status {} already exists", status.id)));
        }
        if existing.iter().any(|s| s.code == status.code) {
            return Err(invalid(format!("Status code {} is taken", status.code)));
        }
        self.store.store_status(status.clone()).await?;
        Ok(status)
    }

    pub async fn create_lead(&self, lead: Lead) -> Result<Lead> {
        if self.store.lead(lead.id).await?.is_some() {
            return Err(invalid(format!("Lead {} already exists", lead.id)));
        }
        if let Some(rep_id) = lead.assigned_rep_id {
            self.require_representative(rep_id).await?;
        }
        self.store.store_lead(lead.clone()).await?;
        Ok(lead)
    }

    pub async fn record_status_change(
        &self,
        event: StatusChangeEvent,
    ) -> Result<StatusChangeEvent> {
        if self.store.status_change(event.id).await?.is_some() {
            return Err(invalid(format!("Status change {} already exists", event.id)));
        }
        if self.store.lead(event.lead_id).await?.is_none() {
            return Err(invalid(format!("Lead {} does not exist", event.lead_id)));
        }
        self.require_status(event.status_id).await?;
        if let Some(rep_id) = event.changed_by_rep_id {
            self.require_representative(rep_id).await?;
        }
        self.store.store_status_change(event.clone()).await?;
        Ok(event)
    }

    pub async fn create_bonus_rule(&self, rule: BonusRule) -> Result<BonusRule> {
        require_text("Role type", &rule.role_type)?;
        self.require_status(rule.status_id).await?;
        let existing = self.store.bonus_rules().await?;
        if existing.iter().any(|r| r.id == rule.id) {
            return Err(invalid(format!("Bonus rule {} already exists", rule.id)));
        }
        if existing
            .iter()
            .any(|r| r.status_id == rule.status_id && r.role_type == rule.role_type)
        {
            return Err(invalid(format!(
                "A bonus rule for status {} and role {} already exists",
                rule.status_id, rule.role_type
            )));
        }
        self.store.store_bonus_rule(rule.clone()).await?;
        Ok(rule)
    }

    pub async fn create_bonus_override(
        &self,
        bonus_override: BonusOverride,
    ) -> Result<BonusOverride> {
        self.require_representative(bonus_override.rep_id).await?;
        self.require_status(bonus_override.status_id).await?;
        let existing = self.store.bonus_overrides().await?;
        if existing.iter().any(|o| o.id == bonus_override.id) {
            return Err(invalid(format!(
                "Bonus override {} already exists",
                bonus_override.id
            )));
        }
        if existing
            .iter()
            .any(|o| o.rep_id == bonus_override.rep_id && o.status_id == bonus_override.status_id)
        {
            return Err(invalid(format!(
                "A bonus override for representative {} and status {} already exists",
                bonus_override.rep_id, bonus_override.status_id
            )));
        }
        self.store.store_bonus_override(bonus_override.clone()).await?;
        Ok(bonus_override)
    }

    async fn require_representative(&self, id: RepId) -> Result<()> {
        match self.store.representative(id).await? {
            Some(_) => Ok(()),
            None => Err(invalid(format!("Representative {id} does not exist"))),
        }
    }

    async fn require_status(&self, id: StatusId) -> Result<()> {
        if self.store.statuses().await?.iter().any(|s| s.id == id) {
            Ok(())
        } else {
            Err(invalid(format!("Status {id} does not exist")))
        }
    }
}

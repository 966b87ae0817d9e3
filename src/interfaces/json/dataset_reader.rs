use crate::application::registry::Registry;
use crate::domain::records::{
    BonusOverride, BonusRule, Lead, PayPeriod, Representative, Status, StatusChangeEvent,
};
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;
use tracing::info;

/// A batch of administrative records, as exported by the admin layer.
///
/// Every table is optional so partial fixtures load fine.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub pay_periods: Vec<PayPeriod>,
    pub representatives: Vec<Representative>,
    pub statuses: Vec<Status>,
    pub leads: Vec<Lead>,
    pub status_changes: Vec<StatusChangeEvent>,
    pub bonus_rules: Vec<BonusRule>,
    pub bonus_overrides: Vec<BonusOverride>,
}

impl Dataset {
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    /// Loads the dataset only into an empty registry, so a persistent store
    /// can be pointed at the same seed on every invocation.
    ///
    /// Returns whether anything was loaded.
    pub async fn seed(self, registry: &Registry) -> Result<bool> {
        if !registry.is_empty().await? {
            info!("Registry already populated, skipping seed");
            return Ok(false);
        }
        self.load_into(registry).await?;
        Ok(true)
    }

    /// Loads the records through the registry's validation, parents first.
    ///
    /// Stops at the first rejected record; records loaded before it stay.
    pub async fn load_into(self, registry: &Registry) -> Result<()> {
        let counts = (
            self.representatives.len(),
            self.leads.len(),
            self.status_changes.len(),
        );

        for period in self.pay_periods {
            registry.create_pay_period(period).await?;
        }
        for rep in self.representatives {
            registry.create_representative(rep).await?;
        }
        for status in self.statuses {
            registry.create_status(status).await?;
        }
        for lead in self.leads {
            registry.create_lead(lead).await?;
        }
        for event in self.status_changes {
            registry.record_status_change(event).await?;
        }
        for rule in self.bonus_rules {
            registry.create_bonus_rule(rule).await?;
        }
        for bonus_override in self.bonus_overrides {
            registry.create_bonus_override(bonus_override).await?;
        }

        info!(
            representatives = counts.0,
            leads = counts.1,
            status_changes = counts.2,
            "Loaded dataset"
        );
        Ok(())
    }
}

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use leadpay::application::engine::PayrollEngine;
use leadpay::application::registry::Registry;
use leadpay::domain::money::Money;
use leadpay::domain::records::{
    BonusOverride, BonusRule, Lead, PayPeriod, Representative, Status, StatusChangeEvent,
};
use leadpay::infrastructure::in_memory::{InMemoryLedgerStore, InMemoryRegistryStore};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const WON: u32 = 1;
pub const QUALIFIED: u32 = 2;

/// In-memory stores plus the services wired on top of them.
pub struct World {
    pub registry_store: InMemoryRegistryStore,
    pub ledger: InMemoryLedgerStore,
    pub registry: Registry,
    pub engine: PayrollEngine,
    next_id: u32,
}

impl World {
    /// An empty world with the WON and QUALIFIED statuses configured.
    pub async fn new() -> Self {
        let world = Self::bare();
        world.status(WON, "WON").await;
        world.status(QUALIFIED, "QUALIFIED").await;
        world
    }

    /// An empty world with no statuses at all.
    pub fn bare() -> Self {
        let registry_store = InMemoryRegistryStore::new();
        let ledger = InMemoryLedgerStore::new();
        Self {
            registry: Registry::new(Arc::new(registry_store.clone())),
            engine: PayrollEngine::new(
                Arc::new(registry_store.clone()),
                Arc::new(ledger.clone()),
            ),
            registry_store,
            ledger,
            next_id: 0,
        }
    }

    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub async fn status(&self, id: u32, code: &str) {
        self.registry
            .create_status(Status {
                id,
                code: code.to_string(),
                label: code.to_lowercase(),
            })
            .await
            .unwrap();
    }

    pub async fn period(&self, id: u32, start: NaiveDate, end: NaiveDate) {
        self.registry
            .create_pay_period(PayPeriod::new(id, start, end))
            .await
            .unwrap();
    }

    pub async fn rep(&self, id: u32, role: &str, base_pay: Decimal, is_active: bool) {
        self.registry
            .create_representative(Representative {
                id,
                name: format!("Rep {id}"),
                role_type: role.to_string(),
                base_pay: Money::new(base_pay),
                is_active,
            })
            .await
            .unwrap();
    }

    pub async fn lead(&mut self, assigned_rep_id: Option<u32>) -> u32 {
        let id = self.id();
        self.registry
            .create_lead(Lead {
                id,
                title: format!("Lead {id}"),
                assigned_rep_id,
            })
            .await
            .unwrap();
        id
    }

    pub async fn change(
        &mut self,
        lead_id: u32,
        status_id: u32,
        actor: Option<u32>,
        changed_at: NaiveDateTime,
    ) {
        let id = self.id();
        self.registry
            .record_status_change(StatusChangeEvent {
                id,
                lead_id,
                status_id,
                changed_by_rep_id: actor,
                changed_at,
            })
            .await
            .unwrap();
    }

    pub async fn rule(&mut self, status_id: u32, role: &str, amount: Decimal) {
        let id = self.id();
        self.registry
            .create_bonus_rule(BonusRule {
                id,
                status_id,
                role_type: role.to_string(),
                bonus_amount: Money::new(amount),
            })
            .await
            .unwrap();
    }

    pub async fn bonus_override(&mut self, rep_id: u32, status_id: u32, amount: Decimal) {
        let id = self.id();
        self.registry
            .create_bonus_override(BonusOverride {
                id,
                rep_id,
                status_id,
                bonus_amount: Money::new(amount),
            })
            .await
            .unwrap();
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, s).unwrap()
}

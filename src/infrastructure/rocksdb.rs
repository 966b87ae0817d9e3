use crate::domain::payroll::{NewPayrollEntry, PayrollEntry, PayrollRun, RunId};
use crate::domain::ports::{LedgerStore, RegistryStore};
use crate::domain::records::{
    BonusOverride, BonusRule, Lead, LeadId, LeadStatusChange, PayPeriod, PayPeriodId, RepId,
    Representative, Status, StatusChangeEvent, StatusChangeId, StatusId,
};
use crate::error::{PayrollError, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CF_PAY_PERIODS: &str = "pay_periods";
pub const CF_REPRESENTATIVES: &str = "representatives";
pub const CF_LEADS: &str = "leads";
pub const CF_STATUSES: &str = "statuses";
pub const CF_STATUS_CHANGES: &str = "status_changes";
pub const CF_BONUS_RULES: &str = "bonus_rules";
pub const CF_BONUS_OVERRIDES: &str = "bonus_overrides";
pub const CF_PAYROLL_RUNS: &str = "payroll_runs";
pub const CF_PAYROLL_ENTRIES: &str = "payroll_entries";
/// Id counters for ledger rows.
pub const CF_META: &str = "meta";

const REGISTRY_CFS: [&str; 7] = [
    CF_PAY_PERIODS,
    CF_REPRESENTATIVES,
    CF_LEADS,
    CF_STATUSES,
    CF_STATUS_CHANGES,
    CF_BONUS_RULES,
    CF_BONUS_OVERRIDES,
];

const ALL_CFS: [&str; 10] = [
    CF_PAY_PERIODS,
    CF_REPRESENTATIVES,
    CF_LEADS,
    CF_STATUSES,
    CF_STATUS_CHANGES,
    CF_BONUS_RULES,
    CF_BONUS_OVERRIDES,
    CF_PAYROLL_RUNS,
    CF_PAYROLL_ENTRIES,
    CF_META,
];

const LAST_RUN_ID: &[u8] = b"last_run_id";
const LAST_ENTRY_ID: &[u8] = b"last_entry_id";

/// A persistent store implementation using RocksDB.
///
/// Every table gets its own column family keyed by the big-endian record id,
/// with JSON values. A payroll run, its entries and the updated id counters
/// are written in a single `WriteBatch`, which RocksDB applies atomically.
///
/// `Clone` shares the underlying `Arc<DB>` and the ledger write lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    ledger_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// any missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            ledger_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PayrollError::StorageError(format!("Column family {name} not found")))
    }

    fn put<T: Serialize>(&self, cf_name: &str, id: u32, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = encode(value)?;
        self.db.put_cf(cf, id.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, cf_name: &str, id: u32) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Reads every value of a column family in key (id) order.
    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(decode(&value)?);
        }
        Ok(values)
    }

    fn counter(&self, key: &[u8]) -> Result<u32> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => {
                let raw: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    PayrollError::StorageError(format!(
                        "Corrupt counter {}",
                        String::from_utf8_lossy(key)
                    ))
                })?;
                Ok(u32::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| PayrollError::StorageError(format!("Serialization error: {e}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| PayrollError::StorageError(format!("Deserialization error: {e}")))
}

#[async_trait]
impl RegistryStore for RocksDBStore {
    async fn is_empty(&self) -> Result<bool> {
        for name in REGISTRY_CFS {
            let cf = self.cf(name)?;
            if let Some(item) = self.db.iterator_cf(cf, IteratorMode::Start).next() {
                item?;
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn pay_period(&self, id: PayPeriodId) -> Result<Option<PayPeriod>> {
        self.get(CF_PAY_PERIODS, id)
    }

    async fn store_pay_period(&self, period: PayPeriod) -> Result<()> {
        self.put(CF_PAY_PERIODS, period.id, &period)
    }

    async fn representatives(&self) -> Result<Vec<Representative>> {
        self.scan(CF_REPRESENTATIVES)
    }

    async fn representative(&self, id: RepId) -> Result<Option<Representative>> {
        self.get(CF_REPRESENTATIVES, id)
    }

    async fn store_representative(&self, rep: Representative) -> Result<()> {
        self.put(CF_REPRESENTATIVES, rep.id, &rep)
    }

    async fn lead(&self, id: LeadId) -> Result<Option<Lead>> {
        self.get(CF_LEADS, id)
    }

    async fn lead_count(&self) -> Result<usize> {
        let cf = self.cf(CF_LEADS)?;
        let mut count = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    async fn store_lead(&self, lead: Lead) -> Result<()> {
        self.put(CF_LEADS, lead.id, &lead)
    }

    async fn statuses(&self) -> Result<Vec<Status>> {
        self.scan(CF_STATUSES)
    }

    async fn store_status(&self, status: Status) -> Result<()> {
        self.put(CF_STATUSES, status.id, &status)
    }

    async fn status_change(&self, id: StatusChangeId) -> Result<Option<StatusChangeEvent>> {
        self.get(CF_STATUS_CHANGES, id)
    }

    async fn store_status_change(&self, event: StatusChangeEvent) -> Result<()> {
        self.put(CF_STATUS_CHANGES, event.id, &event)
    }

    async fn status_changes_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<LeadStatusChange>> {
        let leads: HashMap<LeadId, Lead> = self
            .scan::<Lead>(CF_LEADS)?
            .into_iter()
            .map(|lead| (lead.id, lead))
            .collect();

        let changes = self
            .scan::<StatusChangeEvent>(CF_STATUS_CHANGES)?
            .into_iter()
            .filter(|e| e.changed_at >= start && e.changed_at <= end)
            .filter_map(|event| {
                leads
                    .get(&event.lead_id)
                    .cloned()
                    .map(|lead| LeadStatusChange { event, lead })
            })
            .collect();
        Ok(changes)
    }

    async fn status_changes_for_status(
        &self,
        status_id: StatusId,
    ) -> Result<Vec<StatusChangeEvent>> {
        Ok(self
            .scan::<StatusChangeEvent>(CF_STATUS_CHANGES)?
            .into_iter()
            .filter(|e| e.status_id == status_id)
            .collect())
    }

    async fn bonus_rules(&self) -> Result<Vec<BonusRule>> {
        self.scan(CF_BONUS_RULES)
    }

    async fn store_bonus_rule(&self, rule: BonusRule) -> Result<()> {
        self.put(CF_BONUS_RULES, rule.id, &rule)
    }

    async fn bonus_overrides(&self) -> Result<Vec<BonusOverride>> {
        self.scan(CF_BONUS_OVERRIDES)
    }

    async fn store_bonus_override(&self, bonus_override: BonusOverride) -> Result<()> {
        self.put(CF_BONUS_OVERRIDES, bonus_override.id, &bonus_override)
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn record_run(
        &self,
        pay_period_id: PayPeriodId,
        run_at: NaiveDateTime,
        entries: Vec<NewPayrollEntry>,
    ) -> Result<PayrollRun> {
        // Serializes counter read-modify-write between callers sharing this store.
        let _guard = self.ledger_lock.lock().await;

        let runs_cf = self.cf(CF_PAYROLL_RUNS)?;
        let entries_cf = self.cf(CF_PAYROLL_ENTRIES)?;
        let meta_cf = self.cf(CF_META)?;

        let run = PayrollRun {
            id: self.counter(LAST_RUN_ID)? + 1,
            pay_period_id,
            run_at,
        };
        let mut last_entry_id = self.counter(LAST_ENTRY_ID)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(runs_cf, run.id.to_be_bytes(), encode(&run)?);
        for entry in entries {
            last_entry_id += 1;
            let entry = entry.into_entry(last_entry_id, run.id);
            batch.put_cf(entries_cf, entry.id.to_be_bytes(), encode(&entry)?);
        }
        batch.put_cf(meta_cf, LAST_RUN_ID, run.id.to_be_bytes());
        batch.put_cf(meta_cf, LAST_ENTRY_ID, last_entry_id.to_be_bytes());

        self.db.write(batch)?;
        Ok(run)
    }

    async fn latest_run(&self, pay_period_id: PayPeriodId) -> Result<Option<PayrollRun>> {
        Ok(self.runs_for_period(pay_period_id).await?.into_iter().last())
    }

    async fn runs_for_period(&self, pay_period_id: PayPeriodId) -> Result<Vec<PayrollRun>> {
        Ok(self
            .scan::<PayrollRun>(CF_PAYROLL_RUNS)?
            .into_iter()
            .filter(|r| r.pay_period_id == pay_period_id)
            .collect())
    }

    async fn entries(&self, run_id: RunId) -> Result<Vec<PayrollEntry>> {
        Ok(self
            .scan::<PayrollEntry>(CF_PAYROLL_ENTRIES)?
            .into_iter()
            .filter(|e| e.payroll_run_id == run_id)
            .collect())
    }
}

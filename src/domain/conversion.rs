use super::records::StatusChangeEvent;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Share of leads that ever reached the WON status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ConversionReport {
    pub total_leads: usize,
    pub won_leads: usize,
    /// Percentage rounded to two decimal places.
    pub conversion_rate: f64,
}

impl ConversionReport {
    pub fn new(total_leads: usize, won_leads: usize) -> Self {
        Self {
            total_leads,
            won_leads,
            conversion_rate: conversion_rate(total_leads, won_leads),
        }
    }

    /// Builds the report from the lead count and every WON status change.
    ///
    /// A lead that reached WON more than once is counted once.
    pub fn tally(total_leads: usize, won_changes: &[StatusChangeEvent]) -> Self {
        let won: HashSet<_> = won_changes.iter().map(|e| e.lead_id).collect();
        Self::new(total_leads, won.len())
    }
}

fn conversion_rate(total_leads: usize, won_leads: usize) -> f64 {
    if total_leads == 0 {
        return 0.0;
    }
    let rate = Decimal::from(won_leads) / Decimal::from(total_leads) * Decimal::ONE_HUNDRED;
    rate.round_dp(2).to_f64().unwrap_or(0.0)
}

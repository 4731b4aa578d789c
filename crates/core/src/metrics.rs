use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::call::{CallOutcome, CallRecord};

pub const RECENT_CALLS_LIMIT: usize = 10;

/// Aggregate view of the call log served to the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CallMetrics {
    pub total_calls: u64,
    pub successful_bookings: u64,
    /// Percentage of calls that ended booked, one decimal place.
    #[serde(with = "rust_decimal::serde::float")]
    pub success_rate: Decimal,
    /// Averaged over booked calls only.
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_negotiation_rounds: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_booked_value: Decimal,
    pub calls_by_outcome: BTreeMap<String, u64>,
    pub sentiment_breakdown: BTreeMap<String, u64>,
    pub recent_calls: Vec<CallRecord>,
}

impl CallMetrics {
    pub fn from_records(records: &[CallRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let booked: Vec<&CallRecord> =
            records.iter().filter(|record| record.outcome == CallOutcome::Booked).collect();
        let total_calls = records.len() as u64;
        let successful_bookings = booked.len() as u64;

        let success_rate =
            Decimal::from(successful_bookings * 100) / Decimal::from(total_calls);
        let avg_negotiation_rounds = if booked.is_empty() {
            Decimal::ZERO
        } else {
            let rounds: u64 = booked.iter().map(|record| u64::from(record.negotiation_rounds)).sum();
            Decimal::from(rounds) / Decimal::from(successful_bookings)
        };
        let total_booked_value: Decimal =
            booked.iter().filter_map(|record| record.agreed_rate).sum();

        let mut calls_by_outcome = BTreeMap::new();
        let mut sentiment_breakdown = BTreeMap::new();
        for record in records {
            *calls_by_outcome.entry(record.outcome.as_str().to_string()).or_insert(0) += 1;
            *sentiment_breakdown.entry(record.sentiment.as_str().to_string()).or_insert(0) += 1;
        }

        let mut recent_calls = records.to_vec();
        recent_calls.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
        recent_calls.truncate(RECENT_CALLS_LIMIT);

        Self {
            total_calls,
            successful_bookings,
            success_rate: round(success_rate, 1),
            avg_negotiation_rounds: round(avg_negotiation_rounds, 1),
            total_booked_value: round(total_booked_value, 2),
            calls_by_outcome,
            sentiment_breakdown,
            recent_calls,
        }
    }
}

fn round(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven).normalize()
}

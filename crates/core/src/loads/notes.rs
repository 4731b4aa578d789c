use rust_decimal::prelude::ToPrimitive;
use rust_decimal::RoundingStrategy;

use crate::domain::load::Load;

/// One-sentence summary the voice agent reads to the carrier.
pub fn generate_notes(load: &Load) -> String {
    let rate = load
        .loadboard_rate
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i128()
        .unwrap_or_default();

    format!(
        "{equipment} load from {origin} to {destination}, {miles} miles at ${rate}, hauling {weight} lbs of {commodity}",
        equipment = load.equipment_type,
        origin = load.origin,
        destination = load.destination,
        miles = load.miles,
        rate = group_thousands(rate),
        weight = group_thousands(i128::from(load.weight)),
        commodity = load.commodity_type,
    )
}

pub fn group_thousands(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

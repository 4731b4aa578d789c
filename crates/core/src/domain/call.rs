use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::load::LoadId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Booked,
    NotInterested,
    NoAgreement,
    CarrierNotEligible,
    AlreadyBooked,
    /// Accepted from older voice-agent workflows; never produced here.
    OfferMade,
}

impl CallOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::NotInterested => "not_interested",
            Self::NoAgreement => "no_agreement",
            Self::CarrierNotEligible => "carrier_not_eligible",
            Self::AlreadyBooked => "already_booked",
            Self::OfferMade => "offer_made",
        }
    }
}

impl std::str::FromStr for CallOutcome {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "booked" => Ok(Self::Booked),
            "not_interested" => Ok(Self::NotInterested),
            "no_agreement" => Ok(Self::NoAgreement),
            "carrier_not_eligible" => Ok(Self::CarrierNotEligible),
            "already_booked" => Ok(Self::AlreadyBooked),
            "offer_made" => Ok(Self::OfferMade),
            other => Err(format!("unknown call outcome `{other}`")),
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CallSentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl CallSentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl std::str::FromStr for CallSentiment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            other => Err(format!("unknown call sentiment `{other}`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub String);

impl CallId {
    /// `call_<load>_<mc>_<yyyymmddHHMMSS>_<suffix>`; the suffix keeps ids unique
    /// when the same carrier calls twice within one second.
    pub fn generate(load_id: Option<&LoadId>, mc_number: &str, at: DateTime<Utc>) -> Self {
        let load = load_id.map(LoadId::as_str).unwrap_or("none");
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("call_{load}_{mc_number}_{}_{}", at.format("%Y%m%d%H%M%S"), &suffix[..8]))
    }
}

/// One logged carrier interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id: CallId,
    pub mc_number: String,
    pub carrier_name: Option<String>,
    pub load_id: Option<LoadId>,
    pub outcome: CallOutcome,
    pub sentiment: CallSentiment,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub agreed_rate: Option<Decimal>,
    pub negotiation_rounds: u32,
    pub call_duration_seconds: Option<u32>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{CallId, CallOutcome, CallSentiment};
    use crate::domain::load::LoadId;

    #[test]
    fn outcome_wire_names_round_trip_through_from_str() {
        for outcome in [
            CallOutcome::Booked,
            CallOutcome::NotInterested,
            CallOutcome::NoAgreement,
            CallOutcome::CarrierNotEligible,
            CallOutcome::AlreadyBooked,
            CallOutcome::OfferMade,
        ] {
            assert_eq!(outcome.as_str().parse::<CallOutcome>(), Ok(outcome));
            let json = serde_json::to_string(&outcome).expect("serialize outcome");
            assert_eq!(json, format!("\"{}\"", outcome.as_str()));
        }
    }

    #[test]
    fn sentiment_defaults_to_neutral() {
        assert_eq!(CallSentiment::default(), CallSentiment::Neutral);
        assert!("grumpy".parse::<CallSentiment>().is_err());
    }

    #[test]
    fn call_id_embeds_load_carrier_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 5).single().expect("valid timestamp");
        let id = CallId::generate(Some(&LoadId::from("LOAD-7")), "123456", at);

        assert!(id.0.starts_with("call_LOAD-7_123456_20261015093005_"), "got {}", id.0);

        let other = CallId::generate(Some(&LoadId::from("LOAD-7")), "123456", at);
        assert_ne!(id, other);
    }

    #[test]
    fn call_id_without_load_uses_placeholder() {
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 5).single().expect("valid timestamp");
        let id = CallId::generate(None, "999999", at);
        assert!(id.0.starts_with("call_none_999999_"));
    }
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadId(pub String);

impl LoadId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LoadId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for LoadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One posted freight shipment. Field names follow the catalog file layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Load {
    pub load_id: LoadId,
    pub origin: String,
    pub destination: String,
    pub pickup_datetime: String,
    pub delivery_datetime: String,
    pub equipment_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub loadboard_rate: Decimal,
    #[serde(default)]
    pub notes: String,
    pub weight: u32,
    pub commodity_type: String,
    pub num_of_pieces: u32,
    pub miles: u32,
    #[serde(default)]
    pub dimensions: String,
}

/// A `"City, ST"` string split on its first comma.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CityState {
    pub city: String,
    pub state: String,
}

impl CityState {
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(',');
        let city = parts.next().map(str::trim).unwrap_or_default().to_string();
        let state = parts.next().map(str::trim).unwrap_or_default().to_string();
        Self { city, state }
    }
}

/// Calendar-date part of an ISO-8601 timestamp (everything before `T`).
pub fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

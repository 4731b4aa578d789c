//! `GET /api/v1/loads`: load search rendered in the voice-platform layout.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use loadbridge_core::config::BrokerageConfig;
use loadbridge_core::domain::load::{date_part, CityState, Load};
use loadbridge_core::loads::{generate_notes, LoadMatch, SearchCriteria};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::envelope::{plain_error, Envelope};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new().route("/api/v1/loads", get(search_loads)).with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct LoadSearchQuery {
    pub origin_city: Option<String>,
    pub origin_state: Option<String>,
    pub destination_city: Option<String>,
    pub destination_state: Option<String>,
    pub equipment_type: Option<String>,
    pub pickup_date: Option<String>,
    #[serde(default)]
    pub include_booked: bool,
}

impl LoadSearchQuery {
    fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            origin_city: self.origin_city.clone(),
            origin_state: self.origin_state.clone(),
            destination_city: self.destination_city.clone(),
            destination_state: self.destination_state.clone(),
            equipment_type: self.equipment_type.clone(),
            pickup_date: self.pickup_date.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoadsBody {
    pub loads: Vec<LoadView>,
}

#[derive(Debug, Serialize)]
pub struct ContactView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub extension: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LocationView {
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StopView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub location: LocationView,
    pub stop_timestamp_open: String,
    pub stop_timestamp_close: String,
}

#[derive(Debug, Serialize)]
pub struct BridgeView {
    pub status: &'static str,
    pub bridge_load_id: String,
}

/// Flat load record the voice agent reads from.
#[derive(Debug, Serialize)]
pub struct LoadView {
    pub reference_number: String,
    pub load_id: String,
    pub contact: ContactView,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub status: &'static str,
    pub is_partial: bool,
    pub stops: Vec<StopView>,
    pub origin: String,
    pub destination: String,
    pub miles: u32,
    pub equipment_type: String,
    pub weight: u32,
    pub number_of_pieces: u32,
    pub commodity_type: String,
    pub dimensions: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub posted_carrier_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_buy: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_per_mile: Decimal,
    pub pickup_datetime: String,
    pub delivery_datetime: String,
    pub pickup_date: String,
    pub delivery_date: String,
    pub notes: String,
    pub sale_notes: String,
    pub branch: String,
    pub bridge: BridgeView,
}

/// Ceiling a rep may go to when negotiating: posted rate plus five percent.
pub fn max_buy(rate: Decimal) -> Decimal {
    round_cents(rate * Decimal::new(105, 2))
}

pub fn rate_per_mile(rate: Decimal, miles: u32) -> Decimal {
    if miles == 0 {
        return Decimal::ZERO;
    }
    round_cents(rate / Decimal::from(miles))
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven).normalize()
}

fn stop(kind: &'static str, place: &str, timestamp: &str) -> StopView {
    let CityState { city, state } = CityState::parse(place);
    StopView {
        kind,
        location: LocationView { city, state, zip: String::new(), country: "US" },
        stop_timestamp_open: timestamp.to_string(),
        stop_timestamp_close: timestamp.to_string(),
    }
}

impl LoadView {
    pub fn render(found: &LoadMatch, brokerage: &BrokerageConfig) -> Self {
        let load: &Load = &found.load;
        Self {
            reference_number: load.load_id.to_string(),
            load_id: load.load_id.to_string(),
            contact: ContactView {
                name: brokerage.contact_name.clone(),
                email: brokerage.contact_email.clone(),
                phone: brokerage.contact_phone.clone(),
                extension: String::new(),
                kind: "dispatch",
            },
            kind: "can_get",
            status: if found.is_booked { "booked" } else { "available" },
            is_partial: false,
            stops: vec![
                stop("origin", &load.origin, &load.pickup_datetime),
                stop("destination", &load.destination, &load.delivery_datetime),
            ],
            origin: load.origin.clone(),
            destination: load.destination.clone(),
            miles: load.miles,
            equipment_type: load.equipment_type.clone(),
            weight: load.weight,
            number_of_pieces: load.num_of_pieces,
            commodity_type: load.commodity_type.clone(),
            dimensions: load.dimensions.clone(),
            posted_carrier_rate: load.loadboard_rate,
            max_buy: max_buy(load.loadboard_rate),
            rate_per_mile: rate_per_mile(load.loadboard_rate, load.miles),
            pickup_datetime: load.pickup_datetime.clone(),
            delivery_datetime: load.delivery_datetime.clone(),
            pickup_date: date_part(&load.pickup_datetime).to_string(),
            delivery_date: date_part(&load.delivery_datetime).to_string(),
            notes: generate_notes(load),
            sale_notes: load.notes.clone(),
            branch: brokerage.branch.clone(),
            bridge: BridgeView { status: "success", bridge_load_id: format!("BRK-{}", load.load_id) },
        }
    }
}

async fn search_loads(
    State(state): State<AppState>,
    query: Result<Query<LoadSearchQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return plain_error(rejection.status(), rejection.body_text()),
    };

    let cap = if query.include_booked {
        state.search.include_booked_max_results
    } else {
        state.search.max_results
    };
    let criteria = query.criteria();
    let matches = state.board.search(&criteria, cap, query.include_booked);

    info!(
        event_name = "loads.search.completed",
        origin = criteria.origin_city.as_deref().or(criteria.origin_state.as_deref()).unwrap_or("any"),
        destination = criteria
            .destination_city
            .as_deref()
            .or(criteria.destination_state.as_deref())
            .unwrap_or("any"),
        equipment_type = criteria.equipment_type.as_deref().unwrap_or("any"),
        include_booked = query.include_booked,
        result_count = matches.len(),
        "load search completed"
    );

    let loads = matches.iter().map(|found| LoadView::render(found, &state.brokerage)).collect();
    Envelope::new(StatusCode::OK, LoadsBody { loads }).into_response()
}

#[cfg(test)]
mod tests {
    use loadbridge_core::config::AppConfig;
    use loadbridge_core::domain::load::{Load, LoadId};
    use loadbridge_core::loads::LoadMatch;
    use rust_decimal::Decimal;

    use super::{max_buy, rate_per_mile, LoadView};

    fn sample() -> Load {
        Load {
            load_id: LoadId::from("LOAD-001"),
            origin: "Dallas, TX".to_string(),
            destination: "Atlanta, GA".to_string(),
            pickup_datetime: "2026-10-20T08:00:00".to_string(),
            delivery_datetime: "2026-10-21T17:00:00".to_string(),
            equipment_type: "Dry Van".to_string(),
            loadboard_rate: Decimal::from(2500),
            notes: "No touch freight".to_string(),
            weight: 42000,
            commodity_type: "Paper products".to_string(),
            num_of_pieces: 24,
            miles: 781,
            dimensions: "53ft".to_string(),
        }
    }

    #[test]
    fn pricing_helpers_round_to_cents() {
        assert_eq!(max_buy(Decimal::from(2500)), Decimal::from(2625));
        assert_eq!(max_buy(Decimal::new(199999, 2)), Decimal::new(209999, 2));
        assert_eq!(rate_per_mile(Decimal::from(2500), 781), Decimal::new(320, 2));
        assert_eq!(rate_per_mile(Decimal::from(2500), 0), Decimal::ZERO);
    }

    #[test]
    fn render_produces_flat_voice_layout() {
        let config = AppConfig::default();
        let view = LoadView::render(
            &LoadMatch { load: sample(), is_booked: false },
            &config.brokerage,
        );
        let json = serde_json::to_value(&view).expect("serialize view");

        assert_eq!(json["reference_number"], "LOAD-001");
        assert_eq!(json["type"], "can_get");
        assert_eq!(json["status"], "available");
        assert_eq!(json["stops"][0]["location"]["city"], "Dallas");
        assert_eq!(json["stops"][1]["location"]["state"], "GA");
        assert_eq!(json["stops"][1]["stop_timestamp_open"], "2026-10-21T17:00:00");
        assert_eq!(json["posted_carrier_rate"], 2500.0);
        assert_eq!(json["max_buy"], 2625.0);
        assert_eq!(json["rate_per_mile"], 3.2);
        assert_eq!(json["pickup_date"], "2026-10-20");
        assert_eq!(json["number_of_pieces"], 24);
        assert_eq!(json["sale_notes"], "No touch freight");
        assert_eq!(json["branch"], "Main");
        assert_eq!(json["contact"]["type"], "dispatch");
        assert_eq!(json["bridge"]["bridge_load_id"], "BRK-LOAD-001");
        assert_eq!(
            json["notes"],
            "Dry Van load from Dallas, TX to Atlanta, GA, 781 miles at $2,500, hauling 42,000 lbs of Paper products"
        );
    }

    #[test]
    fn booked_loads_render_booked_status() {
        let config = AppConfig::default();
        let view =
            LoadView::render(&LoadMatch { load: sample(), is_booked: true }, &config.brokerage);
        assert_eq!(view.status, "booked");
    }
}

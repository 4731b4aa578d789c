//! `GET /api/v1/carriers/find`: carrier eligibility check.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use loadbridge_core::domain::call::{CallId, CallOutcome, CallRecord, CallSentiment};
use loadbridge_core::domain::carrier::{CarrierIdentifier, CarrierVerdict};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::envelope::{plain_error, Envelope, ErrorBody};
use crate::state::{correlation_id, AppState};

/// Assumed length of a call that ends at the eligibility check.
const REJECTED_CALL_SECONDS: u32 = 30;

pub fn router(state: AppState) -> Router {
    Router::new().route("/api/v1/carriers/find", get(find_carrier)).with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct CarrierQuery {
    pub mc: Option<String>,
    pub dot: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CarrierBridgeView {
    pub status: &'static str,
    pub bridge_carrier_id: String,
}

#[derive(Debug, Serialize)]
pub struct CarrierView {
    pub carrier_id: String,
    pub carrier_name: String,
    pub mc_number: String,
    pub dot_number: String,
    pub eligible: bool,
    pub status: &'static str,
    pub status_code: String,
    pub status_description: String,
    pub allowed_to_operate: String,
    pub out_of_service: String,
    pub carrier_operation: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub zip_code: String,
    pub phone: String,
    pub insurance_on_file: i64,
    pub insurance_required: i64,
    pub message: String,
    pub notes: String,
    pub contacts: Vec<serde_json::Value>,
    pub bridge: CarrierBridgeView,
}

#[derive(Debug, Serialize)]
pub struct CarrierBody {
    pub carrier: CarrierView,
}

impl CarrierView {
    pub fn render(identifier: &CarrierIdentifier, verdict: CarrierVerdict) -> Self {
        let number = identifier.number();
        let (mc_number, dot_number) = match identifier {
            CarrierIdentifier::Mc(mc) => (mc.clone(), verdict.dot_number.clone()),
            CarrierIdentifier::Dot(dot) if verdict.dot_number.is_empty() => {
                (verdict.mc_number.clone(), dot.clone())
            }
            CarrierIdentifier::Dot(_) => (verdict.mc_number.clone(), verdict.dot_number.clone()),
        };
        Self {
            carrier_id: format!("CAR-{number}"),
            status: if verdict.is_active() { "active" } else { "inactive" },
            mc_number,
            dot_number,
            notes: verdict.message.clone(),
            contacts: Vec::new(),
            bridge: CarrierBridgeView { status: "success", bridge_carrier_id: format!("BRK-{number}") },
            carrier_name: verdict.carrier_name,
            eligible: verdict.eligible,
            status_code: verdict.status_code,
            status_description: verdict.status_description,
            allowed_to_operate: verdict.allowed_to_operate,
            out_of_service: verdict.out_of_service,
            carrier_operation: verdict.carrier_operation,
            city: verdict.city,
            state: verdict.state,
            address: verdict.address,
            zip_code: verdict.zip_code,
            phone: verdict.phone,
            insurance_on_file: verdict.insurance_on_file,
            insurance_required: verdict.insurance_required,
            message: verdict.message,
        }
    }
}

async fn find_carrier(
    State(state): State<AppState>,
    query: Result<Query<CarrierQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return plain_error(rejection.status(), rejection.body_text()),
    };

    let Some(identifier) = CarrierIdentifier::from_parts(query.mc.as_deref(), query.dot.as_deref())
    else {
        return Envelope::new(
            StatusCode::BAD_REQUEST,
            ErrorBody::new("Either mc or dot must be provided"),
        )
        .into_response();
    };

    let Some(registry) = state.registry.as_ref() else {
        error!(
            event_name = "carriers.registry.not_configured",
            carrier = %identifier,
            "carrier lookup requested without a registry web key"
        );
        return Envelope::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("FMCSA API key not configured"),
        )
        .into_response();
    };

    let verdict = registry.verify(&identifier).await;

    if verdict.eligible {
        info!(
            event_name = "carriers.lookup.eligible",
            carrier = %identifier,
            carrier_name = %verdict.carrier_name,
            "carrier is eligible"
        );
    } else {
        info!(
            event_name = "carriers.lookup.not_eligible",
            carrier = %identifier,
            reason = %verdict.message,
            "carrier is not eligible"
        );
        record_rejection(&state, &identifier, &verdict).await;
    }

    let carrier = CarrierView::render(&identifier, verdict);
    Envelope::new(StatusCode::OK, CarrierBody { carrier }).into_response()
}

/// A failed log write must not hide the verdict from the caller.
async fn record_rejection(state: &AppState, identifier: &CarrierIdentifier, verdict: &CarrierVerdict) {
    let now = Utc::now();
    let record = CallRecord {
        call_id: CallId::generate(None, identifier.number(), now),
        mc_number: identifier.number().to_string(),
        carrier_name: Some(verdict.carrier_name.clone()),
        load_id: None,
        outcome: CallOutcome::CarrierNotEligible,
        sentiment: CallSentiment::Negative,
        agreed_rate: None,
        negotiation_rounds: 0,
        call_duration_seconds: Some(REJECTED_CALL_SECONDS),
        notes: Some(verdict.message.clone()),
        timestamp: now,
    };

    if let Err(error) = state.call_log.append(record).await {
        error!(
            event_name = "carriers.rejection.log_failed",
            correlation_id = %correlation_id(),
            carrier = %identifier,
            error = %error,
            "could not record carrier rejection"
        );
    }
}

//! `POST /api/v1/offers/log`: record a call outcome and commit bookings.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use loadbridge_core::domain::call::{CallId, CallOutcome, CallRecord, CallSentiment};
use loadbridge_core::domain::load::LoadId;
use loadbridge_core::errors::{ApplicationError, DomainError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::envelope::{envelope_error, plain_error, Envelope, ErrorBody};
use crate::state::{correlation_id, AppState};

const ALREADY_BOOKED_NOTE: &str = "Load was already booked by another carrier";

pub fn router(state: AppState) -> Router {
    Router::new().route("/api/v1/offers/log", post(log_offer)).with_state(state)
}

#[derive(Clone, Debug, Deserialize)]
pub struct OfferLogRequest {
    #[serde(default)]
    pub load_id: Option<String>,
    pub mc_number: String,
    #[serde(default)]
    pub carrier_name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub carrier_offer: Option<Decimal>,
    pub outcome: CallOutcome,
    #[serde(default)]
    pub sentiment: CallSentiment,
    #[serde(default)]
    pub negotiation_rounds: u32,
    #[serde(default)]
    pub call_duration: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OfferLogRequest {
    fn load_id(&self) -> Option<LoadId> {
        self.load_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(LoadId::from)
    }

    fn record(&self, load_id: Option<LoadId>, outcome: CallOutcome) -> CallRecord {
        let now = Utc::now();
        CallRecord {
            call_id: CallId::generate(load_id.as_ref(), &self.mc_number, now),
            mc_number: self.mc_number.clone(),
            carrier_name: self.carrier_name.clone(),
            load_id,
            outcome,
            sentiment: self.sentiment,
            agreed_rate: None,
            negotiation_rounds: self.negotiation_rounds,
            call_duration_seconds: Some(self.call_duration),
            notes: self.notes.clone(),
            timestamp: now,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OfferLoggedBody {
    pub message: &'static str,
    pub call_id: CallId,
}

async fn log_offer(
    State(state): State<AppState>,
    payload: Result<Json<OfferLogRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return plain_error(rejection.status(), rejection.body_text()),
    };
    let correlation_id = correlation_id();

    if request.mc_number.trim().is_empty() {
        return Envelope::new(StatusCode::BAD_REQUEST, ErrorBody::new("mc_number is required"))
            .into_response();
    }

    let load_id = request.load_id();
    info!(
        event_name = "offers.log.received",
        correlation_id = %correlation_id,
        load_id = load_id.as_ref().map(LoadId::as_str).unwrap_or("none"),
        mc_number = %request.mc_number,
        outcome = request.outcome.as_str(),
        "offer log received"
    );

    if let Some(id) = &load_id {
        if state.board.get(id).is_none() {
            let error = ApplicationError::from(DomainError::LoadNotFound(id.clone()))
                .into_interface(correlation_id.as_str());
            return envelope_error(&error).into_response();
        }
    }

    let booking = match (&load_id, request.outcome) {
        (Some(id), CallOutcome::Booked) => match state.board.book(id) {
            Ok(receipt) => Some(receipt),
            Err(conflict @ DomainError::AlreadyBooked(_)) => {
                warn!(
                    event_name = "offers.booking.conflict",
                    correlation_id = %correlation_id,
                    load_id = %id,
                    mc_number = %request.mc_number,
                    "attempt to book a load that is already booked"
                );
                let mut attempt = request.record(load_id.clone(), CallOutcome::AlreadyBooked);
                attempt.sentiment = CallSentiment::Negative;
                attempt.notes = Some(ALREADY_BOOKED_NOTE.to_string());
                if let Err(error) = state.call_log.append(attempt).await {
                    error!(
                        event_name = "offers.conflict.log_failed",
                        correlation_id = %correlation_id,
                        load_id = %id,
                        error = %error,
                        "could not record double-booking attempt"
                    );
                }
                let error = ApplicationError::from(conflict).into_interface(correlation_id.as_str());
                return envelope_error(&error).into_response();
            }
            Err(other) => {
                let error = ApplicationError::from(other).into_interface(correlation_id.as_str());
                return envelope_error(&error).into_response();
            }
        },
        _ => None,
    };

    let mut record = request.record(load_id.clone(), request.outcome);
    if request.outcome == CallOutcome::Booked {
        record.agreed_rate = request.carrier_offer;
    }
    let call_id = record.call_id.clone();

    if let Err(persist_error) = state.call_log.append(record).await {
        if let Some(receipt) = &booking {
            state.board.release(&receipt.load_id);
        }
        error!(
            event_name = "offers.log.persist_failed",
            correlation_id = %correlation_id,
            error = %persist_error,
            booking_released = booking.is_some(),
            "could not persist call record"
        );
        let error = ApplicationError::Persistence(persist_error.to_string())
            .into_interface(correlation_id.as_str());
        return envelope_error(&error).into_response();
    }

    info!(
        event_name = "offers.log.recorded",
        correlation_id = %correlation_id,
        call_id = %call_id.0,
        outcome = request.outcome.as_str(),
        booked = booking.is_some(),
        "call logged"
    );

    Envelope::new(StatusCode::CREATED, OfferLoggedBody { message: "Call logged successfully", call_id })
        .into_response()
}

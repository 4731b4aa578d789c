//! Carrier eligibility against the FMCSA registry.
//!
//! The HTTP client lives in the server crate; this module owns the verdict
//! rules so they can be exercised without a network.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::carrier::{CarrierIdentifier, CarrierVerdict};

pub const ELIGIBLE_MESSAGE: &str = "Carrier is eligible and authorized to operate";

#[async_trait]
pub trait CarrierRegistry: Send + Sync {
    /// Never fails: transport and decode problems come back as a non-eligible
    /// verdict with `status_code == "ERROR"`.
    async fn verify(&self, identifier: &CarrierIdentifier) -> CarrierVerdict;
}

/// Build a verdict from a registry lookup body. The `content` member is a list
/// for docket-number lookups and an object for DOT lookups.
pub fn verdict_from_registry(identifier: &CarrierIdentifier, payload: &Value) -> CarrierVerdict {
    let carrier = match payload.get("content") {
        Some(Value::Array(items)) => items.first().and_then(|item| item.get("carrier")),
        Some(content @ Value::Object(_)) => content.get("carrier"),
        _ => None,
    };
    let Some(carrier) = carrier.filter(|carrier| carrier.is_object()) else {
        return CarrierVerdict::not_found(identifier);
    };

    let carrier_name = text(carrier, "legalName").unwrap_or_else(|| "Unknown".to_string());
    let allowed_to_operate = text(carrier, "allowedToOperate").unwrap_or_else(|| "N".to_string());
    let status_code = text(carrier, "statusCode").unwrap_or_else(|| "N/A".to_string());
    let out_of_service = if text(carrier, "oosDate").is_some() { "Y" } else { "N" };

    let eligible = allowed_to_operate == "Y" && status_code == "A" && out_of_service == "N";
    let message = if eligible {
        ELIGIBLE_MESSAGE.to_string()
    } else {
        let mut reasons = Vec::new();
        if allowed_to_operate != "Y" {
            reasons.push("not authorized to operate".to_string());
        }
        if status_code != "A" {
            reasons.push(format!("status is {status_code} (not Active)"));
        }
        if out_of_service == "Y" {
            reasons.push("currently out of service".to_string());
        }
        format!("Carrier is not eligible: {}", reasons.join(", "))
    };

    let status_description = match status_code.as_str() {
        "A" => "Active",
        "I" => "Inactive",
        _ => "Unknown",
    }
    .to_string();

    let mc_number = match identifier {
        CarrierIdentifier::Mc(mc) => mc.clone(),
        CarrierIdentifier::Dot(_) => String::new(),
    };

    CarrierVerdict {
        eligible,
        carrier_name,
        mc_number,
        dot_number: text(carrier, "dotNumber").unwrap_or_default(),
        allowed_to_operate,
        status_code,
        status_description,
        out_of_service: out_of_service.to_string(),
        insurance_on_file: amount(carrier, "bipdInsuranceOnFile"),
        insurance_required: amount(carrier, "bipdRequiredAmount"),
        carrier_operation: carrier
            .get("carrierOperation")
            .and_then(|operation| text(operation, "carrierOperationDesc"))
            .unwrap_or_default(),
        city: text(carrier, "phyCity").unwrap_or_default(),
        state: text(carrier, "phyState").unwrap_or_default(),
        address: text(carrier, "phyStreet").unwrap_or_default(),
        zip_code: text(carrier, "phyZipcode").unwrap_or_default(),
        phone: text(carrier, "telephone").unwrap_or_default(),
        message,
    }
}

/// Registry fields arrive as strings or numbers depending on the record.
fn text(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(raw) => Some(raw.trim().to_string()).filter(|raw| !raw.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn amount(value: &Value, field: &str) -> i64 {
    match value.get(field) {
        Some(Value::Number(number)) => number.as_i64().unwrap_or_default(),
        Some(Value::String(raw)) => raw.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{verdict_from_registry, ELIGIBLE_MESSAGE};
    use crate::domain::carrier::CarrierIdentifier;

    fn mc(number: &str) -> CarrierIdentifier {
        CarrierIdentifier::Mc(number.to_string())
    }

    #[test]
    fn active_authorized_carrier_is_eligible() {
        let payload = json!({
            "content": [{
                "carrier": {
                    "legalName": "ABC TRUCKING LLC",
                    "allowedToOperate": "Y",
                    "statusCode": "A",
                    "oosDate": null,
                    "dotNumber": 1234567,
                    "bipdInsuranceOnFile": "750",
                    "bipdRequiredAmount": "750",
                    "carrierOperation": { "carrierOperationDesc": "Interstate" },
                    "phyCity": "DALLAS",
                    "phyState": "TX"
                }
            }]
        });

        let verdict = verdict_from_registry(&mc("123456"), &payload);

        assert!(verdict.eligible);
        assert_eq!(verdict.carrier_name, "ABC TRUCKING LLC");
        assert_eq!(verdict.mc_number, "123456");
        assert_eq!(verdict.dot_number, "1234567");
        assert_eq!(verdict.status_description, "Active");
        assert_eq!(verdict.out_of_service, "N");
        assert_eq!(verdict.insurance_on_file, 750);
        assert_eq!(verdict.carrier_operation, "Interstate");
        assert_eq!(verdict.message, ELIGIBLE_MESSAGE);
    }

    #[test]
    fn every_failed_rule_is_listed_in_the_message() {
        let payload = json!({
            "content": [{
                "carrier": {
                    "legalName": "SHADY HAULERS",
                    "allowedToOperate": "N",
                    "statusCode": "I",
                    "oosDate": "2026-01-04"
                }
            }]
        });

        let verdict = verdict_from_registry(&mc("999"), &payload);

        assert!(!verdict.eligible);
        assert_eq!(verdict.out_of_service, "Y");
        assert_eq!(verdict.status_description, "Inactive");
        assert_eq!(
            verdict.message,
            "Carrier is not eligible: not authorized to operate, status is I (not Active), currently out of service"
        );
    }

    #[test]
    fn insurance_shortfall_does_not_block_eligibility() {
        let payload = json!({
            "content": [{
                "carrier": {
                    "legalName": "THIN COVER INC",
                    "allowedToOperate": "Y",
                    "statusCode": "A",
                    "bipdInsuranceOnFile": "0",
                    "bipdRequiredAmount": "750"
                }
            }]
        });

        let verdict = verdict_from_registry(&mc("42"), &payload);

        assert!(verdict.eligible);
        assert_eq!(verdict.insurance_required, 750);
        assert_eq!(verdict.insurance_on_file, 0);
    }

    #[test]
    fn dot_lookup_accepts_object_content() {
        let payload = json!({
            "content": {
                "carrier": {
                    "legalName": "ROAD RUNNER FREIGHT",
                    "allowedToOperate": "Y",
                    "statusCode": "A",
                    "dotNumber": "7654321"
                }
            }
        });

        let verdict =
            verdict_from_registry(&CarrierIdentifier::Dot("7654321".to_string()), &payload);

        assert!(verdict.eligible);
        assert_eq!(verdict.mc_number, "");
        assert_eq!(verdict.dot_number, "7654321");
    }

    #[test]
    fn empty_content_is_not_found() {
        for payload in [json!({ "content": [] }), json!({ "content": null }), json!({})] {
            let verdict = verdict_from_registry(&mc("555"), &payload);
            assert!(!verdict.eligible);
            assert_eq!(verdict.status_code, "N/A");
            assert_eq!(verdict.message, "Carrier MC 555 not found in FMCSA database");
        }
    }
}

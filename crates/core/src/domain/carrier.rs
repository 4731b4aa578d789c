use serde::{Deserialize, Serialize};

/// Government identifier used to look a carrier up in the registry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CarrierIdentifier {
    Mc(String),
    Dot(String),
}

impl CarrierIdentifier {
    /// MC wins when both are supplied; blank values count as absent.
    pub fn from_parts(mc: Option<&str>, dot: Option<&str>) -> Option<Self> {
        let mc = mc.map(str::trim).filter(|value| !value.is_empty());
        let dot = dot.map(str::trim).filter(|value| !value.is_empty());
        match (mc, dot) {
            (Some(mc), _) => Some(Self::Mc(mc.to_string())),
            (None, Some(dot)) => Some(Self::Dot(dot.to_string())),
            (None, None) => None,
        }
    }

    pub fn number(&self) -> &str {
        match self {
            Self::Mc(value) | Self::Dot(value) => value,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mc(_) => "MC",
            Self::Dot(_) => "DOT",
        }
    }
}

impl std::fmt::Display for CarrierIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label(), self.number())
    }
}

/// Eligibility verdict plus the descriptive registry fields the voice agent reads back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierVerdict {
    pub eligible: bool,
    pub carrier_name: String,
    pub mc_number: String,
    pub dot_number: String,
    pub allowed_to_operate: String,
    pub status_code: String,
    pub status_description: String,
    pub out_of_service: String,
    pub insurance_on_file: i64,
    pub insurance_required: i64,
    pub carrier_operation: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub zip_code: String,
    pub phone: String,
    pub message: String,
}

impl CarrierVerdict {
    fn unavailable(identifier: &CarrierIdentifier, status_code: &str, message: String) -> Self {
        let (mc_number, dot_number) = match identifier {
            CarrierIdentifier::Mc(mc) => (mc.clone(), String::new()),
            CarrierIdentifier::Dot(dot) => (String::new(), dot.clone()),
        };
        Self {
            eligible: false,
            carrier_name: "Unknown".to_string(),
            mc_number,
            dot_number,
            allowed_to_operate: "N".to_string(),
            status_code: status_code.to_string(),
            status_description: "Unknown".to_string(),
            out_of_service: "N/A".to_string(),
            insurance_on_file: 0,
            insurance_required: 0,
            carrier_operation: String::new(),
            city: String::new(),
            state: String::new(),
            address: String::new(),
            zip_code: String::new(),
            phone: String::new(),
            message,
        }
    }

    pub fn not_found(identifier: &CarrierIdentifier) -> Self {
        Self::unavailable(
            identifier,
            "N/A",
            format!("Carrier {identifier} not found in FMCSA database"),
        )
    }

    pub fn registry_error(identifier: &CarrierIdentifier, error: impl std::fmt::Display) -> Self {
        Self::unavailable(identifier, "ERROR", format!("FMCSA API error: {error}"))
    }

    pub fn is_active(&self) -> bool {
        self.status_code == "A"
    }
}

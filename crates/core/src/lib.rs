pub mod carriers;
pub mod config;
pub mod domain;
pub mod errors;
pub mod loads;
pub mod metrics;

pub use carriers::{verdict_from_registry, CarrierRegistry};
pub use domain::call::{CallId, CallOutcome, CallRecord, CallSentiment};
pub use domain::carrier::{CarrierIdentifier, CarrierVerdict};
pub use domain::load::{Load, LoadId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use loads::{BookingReceipt, BookingSnapshot, Catalog, LoadBoard, SearchCriteria};
pub use metrics::CallMetrics;

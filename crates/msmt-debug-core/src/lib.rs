//! Privacy gating for attribution debug data.
//!
//! This crate implements the two decision engines that sit between the
//! attribution pipeline and anything observable by ad-techs:
//!
//! - [`resolver::DebugKeyResolver`] decides whether a (source, trigger)
//!   pair may reveal its cleartext debug keys, running the cross-party
//!   identity-matching cascade where the pair spans surfaces or
//!   registrants.
//! - [`report::DebugReportGateway`] gates, assembles, and persists verbose
//!   debug reports for the full anomaly taxonomy in
//!   [`report::ReportType`].
//!
//! Both engines fail closed: any disqualifying condition conceals keys or
//! suppresses the report silently, and the attribution hot path never
//! observes the difference.
//!
//! Storage, telemetry, delivery scheduling, and flag reads are collaborator
//! traits ([`dao::MeasurementDao`], [`telemetry::TelemetryLogger`],
//! [`scheduler::DeliveryScheduler`], [`flags::FlagReader`]); the crate
//! owns only the decisions.

pub mod dao;
pub mod flags;
pub mod identity;
pub mod model;
pub mod report;
pub mod resolver;
pub mod scheduler;
pub mod telemetry;

pub use dao::{DatastoreError, MeasurementDao};
pub use flags::{EnrollmentList, FlagReader, StaticFlags};
pub use model::{Source, SurfaceType, Trigger};
pub use report::{
    AttributionScopeValidationResult, DebugReport, DebugReportGateway, ReportFamily, ReportType,
    ScheduleOutcome,
};
pub use resolver::{DebugKeyPair, DebugKeyResolver};
pub use scheduler::DeliveryScheduler;
pub use telemetry::{AttributionType, MatchOutcome, TelemetryLogger};

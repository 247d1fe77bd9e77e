//! Verbose debug report records and the anomaly taxonomy.
//!
//! [`ReportType`] is a closed enum over every anomaly the pipeline can
//! report; adding a variant forces every dispatch site to handle it before
//! the crate compiles again. The wire string for each variant is the value
//! delivered in the report's `type` field.

mod gateway;

pub use gateway::{AttributionScopeValidationResult, DebugReportGateway, ScheduleOutcome};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body field keys shared across report types.
pub mod body {
    pub const SOURCE_EVENT_ID: &str = "source_event_id";
    pub const ATTRIBUTION_DESTINATION: &str = "attribution_destination";
    pub const SOURCE_SITE: &str = "source_site";
    pub const LIMIT: &str = "limit";
    pub const NAME: &str = "name";
    pub const SOURCE_DEBUG_KEY: &str = "source_debug_key";
    pub const TRIGGER_DEBUG_KEY: &str = "trigger_debug_key";
    pub const CONTEXT_SITE: &str = "context_site";
    pub const HEADER: &str = "header";
    pub const VALUE: &str = "value";
}

/// Which registration the anomaly is attributed to, deciding the sub-flag,
/// opt-in and permission checks that gate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFamily {
    /// Anomalies found while processing a source registration.
    Source,
    /// Anomalies found while attributing a trigger.
    Trigger,
    /// Malformed registration headers; bypasses opt-in and permissions.
    Header,
}

/// The anomaly taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ReportType {
    SourceSuccess,
    SourceNoised,
    SourceStorageLimit,
    SourceUnknownError,
    SourceDestinationLimit,
    SourceDestinationRateLimit,
    SourceDestinationPerDayRateLimit,
    SourceDestinationGlobalRateLimit,
    SourceChannelCapacityLimit,
    SourceTriggerStateCardinalityLimit,
    SourceMaxEventStatesLimit,
    SourceScopesChannelCapacityLimit,
    TriggerNoMatchingSource,
    TriggerUnknownError,
    TriggerNoMatchingFilterData,
    TriggerEventNoMatchingConfigurations,
    TriggerEventLowPriority,
    TriggerEventExcessiveReports,
    TriggerEventDeduplicated,
    TriggerEventNoise,
    TriggerEventStorageLimit,
    TriggerEventReportWindowPassed,
    TriggerEventReportWindowNotStarted,
    TriggerEventNoMatchingTriggerData,
    TriggerAttributionsPerSourceDestinationLimit,
    TriggerReportingOriginLimit,
    TriggerAggregateDeduplicated,
    TriggerAggregateExcessiveReports,
    TriggerAggregateInsufficientBudget,
    TriggerAggregateInsufficientNamedBudget,
    TriggerAggregateNoContributions,
    TriggerAggregateReportWindowPassed,
    TriggerAggregateStorageLimit,
    HeaderParsingError,
}

impl ReportType {
    /// Wire string delivered as the report's `type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceSuccess => "source-success",
            Self::SourceNoised => "source-noised",
            Self::SourceStorageLimit => "source-storage-limit",
            Self::SourceUnknownError => "source-unknown-error",
            Self::SourceDestinationLimit => "source-destination-limit",
            Self::SourceDestinationRateLimit => "source-destination-rate-limit",
            Self::SourceDestinationPerDayRateLimit => "source-destination-per-day-rate-limit",
            Self::SourceDestinationGlobalRateLimit => "source-destination-global-rate-limit",
            Self::SourceChannelCapacityLimit => "source-channel-capacity-limit",
            Self::SourceTriggerStateCardinalityLimit => "source-trigger-state-cardinality-limit",
            Self::SourceMaxEventStatesLimit => "source-max-event-states-limit",
            Self::SourceScopesChannelCapacityLimit => "source-scopes-channel-capacity-limit",
            Self::TriggerNoMatchingSource => "trigger-no-matching-source",
            Self::TriggerUnknownError => "trigger-unknown-error",
            Self::TriggerNoMatchingFilterData => "trigger-no-matching-filter-data",
            Self::TriggerEventNoMatchingConfigurations => {
                "trigger-event-no-matching-configurations"
            }
            Self::TriggerEventLowPriority => "trigger-event-low-priority",
            Self::TriggerEventExcessiveReports => "trigger-event-excessive-reports",
            Self::TriggerEventDeduplicated => "trigger-event-deduplicated",
            Self::TriggerEventNoise => "trigger-event-noise",
            Self::TriggerEventStorageLimit => "trigger-event-storage-limit",
            Self::TriggerEventReportWindowPassed => "trigger-event-report-window-passed",
            Self::TriggerEventReportWindowNotStarted => "trigger-event-report-window-not-started",
            Self::TriggerEventNoMatchingTriggerData => "trigger-event-no-matching-trigger-data",
            Self::TriggerAttributionsPerSourceDestinationLimit => {
                "trigger-attributions-per-source-destination-limit"
            }
            Self::TriggerReportingOriginLimit => "trigger-reporting-origin-limit",
            Self::TriggerAggregateDeduplicated => "trigger-aggregate-deduplicated",
            Self::TriggerAggregateExcessiveReports => "trigger-aggregate-excessive-reports",
            Self::TriggerAggregateInsufficientBudget => "trigger-aggregate-insufficient-budget",
            Self::TriggerAggregateInsufficientNamedBudget => {
                "trigger-aggregate-insufficient-named-budget"
            }
            Self::TriggerAggregateNoContributions => "trigger-aggregate-no-contributions",
            Self::TriggerAggregateReportWindowPassed => "trigger-aggregate-report-window-passed",
            Self::TriggerAggregateStorageLimit => "trigger-aggregate-storage-limit",
            Self::HeaderParsingError => "header-parsing-error",
        }
    }

    /// Which gate applies to this type.
    #[must_use]
    pub const fn family(self) -> ReportFamily {
        match self {
            Self::SourceSuccess
            | Self::SourceNoised
            | Self::SourceStorageLimit
            | Self::SourceUnknownError
            | Self::SourceDestinationLimit
            | Self::SourceDestinationRateLimit
            | Self::SourceDestinationPerDayRateLimit
            | Self::SourceDestinationGlobalRateLimit
            | Self::SourceChannelCapacityLimit
            | Self::SourceTriggerStateCardinalityLimit
            | Self::SourceMaxEventStatesLimit
            | Self::SourceScopesChannelCapacityLimit => ReportFamily::Source,
            Self::TriggerNoMatchingSource
            | Self::TriggerUnknownError
            | Self::TriggerNoMatchingFilterData
            | Self::TriggerEventNoMatchingConfigurations
            | Self::TriggerEventLowPriority
            | Self::TriggerEventExcessiveReports
            | Self::TriggerEventDeduplicated
            | Self::TriggerEventNoise
            | Self::TriggerEventStorageLimit
            | Self::TriggerEventReportWindowPassed
            | Self::TriggerEventReportWindowNotStarted
            | Self::TriggerEventNoMatchingTriggerData
            | Self::TriggerAttributionsPerSourceDestinationLimit
            | Self::TriggerReportingOriginLimit
            | Self::TriggerAggregateDeduplicated
            | Self::TriggerAggregateExcessiveReports
            | Self::TriggerAggregateInsufficientBudget
            | Self::TriggerAggregateInsufficientNamedBudget
            | Self::TriggerAggregateNoContributions
            | Self::TriggerAggregateReportWindowPassed
            | Self::TriggerAggregateStorageLimit => ReportFamily::Trigger,
            Self::HeaderParsingError => ReportFamily::Header,
        }
    }

    /// Destination-limit reports are delivered without a debug key and so
    /// skip the surface-permission check.
    #[must_use]
    pub const fn skips_permission_check(self) -> bool {
        matches!(
            self,
            Self::SourceDestinationLimit
                | Self::SourceDestinationRateLimit
                | Self::SourceDestinationPerDayRateLimit
                | Self::SourceDestinationGlobalRateLimit
        )
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A verbose debug report, ready for transactional insertion.
///
/// Lifecycle ends at persistence; delivery and retry belong to the
/// reporting job pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugReport {
    report_type: ReportType,
    enrollment_id: String,
    registration_origin: String,
    body: Map<String, Value>,
}

impl DebugReport {
    /// Assembles a report record.
    #[must_use]
    pub fn new(
        report_type: ReportType,
        enrollment_id: impl Into<String>,
        registration_origin: impl Into<String>,
        body: Map<String, Value>,
    ) -> Self {
        Self {
            report_type,
            enrollment_id: enrollment_id.into(),
            registration_origin: registration_origin.into(),
            body,
        }
    }

    #[must_use]
    pub const fn report_type(&self) -> ReportType {
        self.report_type
    }

    #[must_use]
    pub fn enrollment_id(&self) -> &str {
        &self.enrollment_id
    }

    #[must_use]
    pub fn registration_origin(&self) -> &str {
        &self.registration_origin
    }

    #[must_use]
    pub const fn report_body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// The logical JSON payload delivered for this report.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "type": self.report_type.as_str(),
            "body": Value::Object(self.body.clone()),
        })
    }
}

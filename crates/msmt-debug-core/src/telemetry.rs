//! Match-outcome telemetry.
//!
//! Every *attempted* identity comparison emits one [`MatchOutcome`] record,
//! matched or not; comparisons that never became attempts emit nothing.
//! Records are write-once values handed to an external [`TelemetryLogger`]
//! and are never persisted by this crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Source-surface/trigger-surface pairing of an attribution, as a
/// telemetry dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributionType {
    /// App source attributed to an app trigger.
    AppApp,
    /// Web source attributed to a web trigger.
    WebWeb,
    /// App source attributed to a web trigger.
    AppWeb,
    /// Web source attributed to an app trigger.
    WebApp,
}

impl AttributionType {
    /// Stable label used in dashboards.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AppApp => "APP_APP",
            Self::WebWeb => "WEB_WEB",
            Self::AppWeb => "APP_WEB",
            Self::WebApp => "WEB_APP",
        }
    }
}

impl fmt::Display for AttributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One attempted identity comparison.
///
/// `value` is overloaded by attempt kind: the hashed join-key bucket for
/// join-key attempts (0 on a non-match), the distinct-ad-id usage count for
/// ad-id attempts. `limit` is the corresponding configured ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Enrollment of the ad-tech whose identities were compared.
    pub ad_tech_enrollment_id: String,
    /// Surface pairing of the attribution under evaluation.
    pub attribution_type: AttributionType,
    /// Whether the comparison succeeded.
    pub matched: bool,
    /// Hashed join-key bucket or ad-id usage count, by attempt kind.
    pub value: u64,
    /// Configured hash modulus or usage ceiling, by attempt kind.
    pub limit: u64,
    /// Registrant of the source side, for per-app breakdowns.
    pub source_registrant: String,
}

/// Fire-and-forget sink for match outcomes.
pub trait TelemetryLogger {
    /// Records a join-key comparison attempt.
    fn log_join_key_match(&self, outcome: MatchOutcome);

    /// Records an ad-id comparison attempt.
    fn log_ad_id_match(&self, outcome: MatchOutcome);
}

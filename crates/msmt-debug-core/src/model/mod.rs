//! Immutable registration records consumed by the gating engines.
//!
//! `Source` and `Trigger` are constructed by upstream registration
//! processing and are read-only here: every field that matters to debug-key
//! resolution or debug reporting is set before either engine sees the
//! record. Both carry builders because the field sets are wide and almost
//! everything is optional.

mod source;
mod trigger;

pub use source::{Source, SourceBuilder};
pub use trigger::{Trigger, TriggerBuilder};

use serde::{Deserialize, Serialize};

/// Surface a registration originated from (source publisher) or is
/// destined for (trigger destination).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    /// Android app surface; debug access is gated by the ad-id permission.
    App,
    /// Web surface; debug access is gated by the AR debug cookie permission.
    Web,
}

impl SurfaceType {
    /// Returns the wire label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Web => "web",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_labels_are_stable() {
        assert_eq!(SurfaceType::App.as_str(), "app");
        assert_eq!(SurfaceType::Web.as_str(), "web");
    }
}

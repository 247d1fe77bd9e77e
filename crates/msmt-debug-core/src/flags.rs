//! Feature flags and enrollment allow/block lists.
//!
//! The gating engines never cache flag values: every decision reads through
//! [`FlagReader`] at call time, so a flag flip takes effect on the next
//! registration processed. [`StaticFlags`] is the shipped implementation,
//! deserializable from TOML the same way the surrounding pipeline loads its
//! configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from flag configuration parsing.
#[derive(Debug, Error)]
pub enum FlagConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid flag configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Synchronous read access to the measurement debug flags.
///
/// List-valued flags are returned as their raw comma-separated string form;
/// callers parse them with [`EnrollmentList`].
pub trait FlagReader {
    /// Master switch for verbose debug reporting.
    fn enable_debug_report(&self) -> bool;

    /// Sub-switch for source-originated report types.
    fn enable_source_debug_report(&self) -> bool;

    /// Sub-switch for trigger-originated report types.
    fn enable_trigger_debug_report(&self) -> bool;

    /// Sub-switch for header-parsing-error reports.
    fn enable_header_error_debug_report(&self) -> bool;

    /// All-or-nothing mode: a debug key pair is only revealed when both
    /// slots could be populated.
    fn enable_both_side_debug_keys(&self) -> bool;

    /// Enrollments allowed to use join-key matching (comma-separated).
    fn debug_join_key_enrollment_allowlist(&self) -> String;

    /// Modulus for the hashed join-key telemetry bucket.
    fn debug_join_key_hash_limit(&self) -> u64;

    /// Enrollments barred from ad-id matching (comma-separated, `"*"` bars
    /// everyone).
    fn debug_ad_id_matching_enrollment_blocklist(&self) -> String;

    /// Maximum distinct debug ad-ids one enrollment may match against.
    fn debug_ad_id_matching_limit(&self) -> u64;

    /// Information-gain ceiling echoed in scopes-channel-capacity reports.
    fn attribution_scope_max_info_gain(&self) -> f32;
}

/// Flag values held in memory; the default set matches the shipped
/// defaults of the attribution pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFlags {
    pub enable_debug_report: bool,
    pub enable_source_debug_report: bool,
    pub enable_trigger_debug_report: bool,
    pub enable_header_error_debug_report: bool,
    pub enable_both_side_debug_keys: bool,
    pub debug_join_key_enrollment_allowlist: String,
    pub debug_join_key_hash_limit: u64,
    pub debug_ad_id_matching_enrollment_blocklist: String,
    pub debug_ad_id_matching_limit: u64,
    pub attribution_scope_max_info_gain: f32,
}

impl Default for StaticFlags {
    fn default() -> Self {
        Self {
            enable_debug_report: true,
            enable_source_debug_report: true,
            enable_trigger_debug_report: true,
            enable_header_error_debug_report: true,
            enable_both_side_debug_keys: false,
            debug_join_key_enrollment_allowlist: String::new(),
            debug_join_key_hash_limit: 100,
            debug_ad_id_matching_enrollment_blocklist: String::new(),
            debug_ad_id_matching_limit: 5,
            attribution_scope_max_info_gain: 11.5,
        }
    }
}

impl StaticFlags {
    /// Parses a flag set from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`FlagConfigError::Parse`] when the document is malformed.
    pub fn from_toml(content: &str) -> Result<Self, FlagConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl FlagReader for StaticFlags {
    fn enable_debug_report(&self) -> bool {
        self.enable_debug_report
    }

    fn enable_source_debug_report(&self) -> bool {
        self.enable_source_debug_report
    }

    fn enable_trigger_debug_report(&self) -> bool {
        self.enable_trigger_debug_report
    }

    fn enable_header_error_debug_report(&self) -> bool {
        self.enable_header_error_debug_report
    }

    fn enable_both_side_debug_keys(&self) -> bool {
        self.enable_both_side_debug_keys
    }

    fn debug_join_key_enrollment_allowlist(&self) -> String {
        self.debug_join_key_enrollment_allowlist.clone()
    }

    fn debug_join_key_hash_limit(&self) -> u64 {
        self.debug_join_key_hash_limit
    }

    fn debug_ad_id_matching_enrollment_blocklist(&self) -> String {
        self.debug_ad_id_matching_enrollment_blocklist.clone()
    }

    fn debug_ad_id_matching_limit(&self) -> u64 {
        self.debug_ad_id_matching_limit
    }

    fn attribution_scope_max_info_gain(&self) -> f32 {
        self.attribution_scope_max_info_gain
    }
}

/// A parsed comma-separated enrollment list.
///
/// An entry of `"*"` matches every enrollment. Whitespace around entries is
/// tolerated; empty entries are dropped, so an empty string parses to the
/// empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentList {
    /// Matches every enrollment id.
    All,
    /// Matches exactly the listed enrollment ids.
    Ids(HashSet<String>),
}

impl EnrollmentList {
    /// Parses the comma-separated flag form.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut ids = HashSet::new();
        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry == "*" {
                return Self::All;
            }
            if !entry.is_empty() {
                ids.insert(entry.to_string());
            }
        }
        Self::Ids(ids)
    }

    /// Whether the enrollment is covered by this list.
    #[must_use]
    pub fn contains(&self, enrollment_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => ids.contains(enrollment_id),
        }
    }

    /// `true` when the list covers nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All => false,
            Self::Ids(ids) => ids.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrollment_list_parses_comma_separated_entries() {
        let list = EnrollmentList::parse("enrollment-a, enrollment-b,,");
        assert!(list.contains("enrollment-a"));
        assert!(list.contains("enrollment-b"));
        assert!(!list.contains("enrollment-c"));
        assert!(!list.is_empty());
    }

    #[test]
    fn star_covers_all_enrollments() {
        let list = EnrollmentList::parse("enrollment-a,*");
        assert_eq!(list, EnrollmentList::All);
        assert!(list.contains("anything"));
    }

    #[test]
    fn empty_string_is_empty_list() {
        let list = EnrollmentList::parse("");
        assert!(list.is_empty());
        assert!(!list.contains("enrollment-a"));
    }

    #[test]
    fn flags_round_trip_through_toml() {
        let flags = StaticFlags::from_toml(
            r#"
            enable_debug_report = false
            debug_ad_id_matching_limit = 7
            debug_join_key_enrollment_allowlist = "e1,e2"
            "#,
        )
        .unwrap();
        assert!(!flags.enable_debug_report());
        assert_eq!(flags.debug_ad_id_matching_limit(), 7);
        // Unspecified fields keep shipped defaults.
        assert!(flags.enable_source_debug_report());
        assert_eq!(flags.debug_join_key_hash_limit(), 100);
    }
}

//! Identity matchers: join keys and platform ad-ids.
//!
//! Both matchers are total functions over closed outcome enums, so the
//! three states the policy cares about stay distinct:
//!
//! - no attempt was possible (disqualified up front, nothing logged),
//! - an attempt was abandoned at the usage ceiling (nothing logged), and
//! - an attempt ran to completion (always logged, matched or not).
//!
//! Callers own telemetry emission; the matchers only report what happened.

use sha2::{Digest, Sha256};

use crate::flags::EnrollmentList;

/// Outcome of a join-key comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKeyMatch {
    /// One or both join keys were missing; no comparison took place.
    NotAttempted,
    /// Both keys were present and were compared.
    Attempted {
        /// Equal strings *and* allow-listed enrollment.
        matched: bool,
        /// Telemetry bucket of the join key on a match, `0` otherwise.
        hashed_value: u64,
    },
}

/// Outcome of an ad-id comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdIdMatch {
    /// Blocklisted enrollment or no ad-id on either side.
    NotAttempted,
    /// The enrollment exhausted its distinct-ad-id budget; the attempt was
    /// abandoned silently.
    LimitReached,
    /// The comparison ran; one-sided values compare unequal.
    Attempted {
        /// Normalized values compared equal.
        matched: bool,
        /// Usage-count snapshot at comparison time.
        count: u64,
    },
}

impl JoinKeyMatch {
    /// `true` only for a completed, successful comparison.
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Attempted { matched: true, .. })
    }
}

impl AdIdMatch {
    /// `true` only for a completed, successful comparison.
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Attempted { matched: true, .. })
    }
}

/// Hashes a plaintext platform ad-id into its enrollment-scoped wire form.
///
/// Ad-techs never see raw ad-ids; they receive and echo back this digest,
/// so equal output here means the ad-tech proved possession of the same
/// device identity for the same enrollment.
#[must_use]
pub fn hash_ad_id(ad_id: &str, enrollment_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ad_id.as_bytes());
    hasher.update(enrollment_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// Deterministic dashboard bucket for a matched join key.
///
/// Not a security boundary: the bucket exists so dashboards can group
/// matches without carrying the raw key.
#[must_use]
pub fn join_key_bucket(join_key: &str, hash_limit: u64) -> u64 {
    if hash_limit == 0 {
        return 0;
    }
    let digest = Sha256::digest(join_key.as_bytes());
    let mut prefix = [0_u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix) % hash_limit
}

/// Compares two cross-party join keys under the enrollment allowlist.
///
/// Equal strings for a non-allow-listed enrollment still count as an
/// attempt and report `matched = false`; the allowlist is a reveal policy,
/// not an attempt gate.
#[must_use]
pub fn match_join_keys(
    source_key: Option<&str>,
    trigger_key: Option<&str>,
    enrollment_id: &str,
    allowlist: &EnrollmentList,
    hash_limit: u64,
) -> JoinKeyMatch {
    let (Some(source_key), Some(trigger_key)) = (source_key, trigger_key) else {
        return JoinKeyMatch::NotAttempted;
    };
    if source_key.is_empty() || trigger_key.is_empty() {
        return JoinKeyMatch::NotAttempted;
    }

    let matched = source_key == trigger_key && allowlist.contains(enrollment_id);
    let hashed_value = if matched {
        join_key_bucket(source_key, hash_limit)
    } else {
        0
    };
    JoinKeyMatch::Attempted {
        matched,
        hashed_value,
    }
}

/// Whether an ad-id comparison could run at all for this pairing.
///
/// Lets callers skip the usage-count read when the attempt is disqualified
/// up front.
#[must_use]
pub fn ad_id_attempt_possible(
    plaintext_ad_id: Option<&str>,
    hashed_ad_id: Option<&str>,
    enrollment_id: &str,
    blocklist: &EnrollmentList,
) -> bool {
    !blocklist.contains(enrollment_id) && (plaintext_ad_id.is_some() || hashed_ad_id.is_some())
}

/// Compares an app-side platform ad-id against a web-side pre-hashed one.
///
/// The platform side normally arrives in plaintext and is hashed here; a
/// value already in hashed form is compared as-is. `usage_count` is the
/// DAO's snapshot of distinct debug ad-ids this enrollment has already
/// matched against; at or past `limit` the attempt is abandoned with no
/// outcome record. A value on only one side is an attempted, failed match.
#[must_use]
pub fn match_ad_ids(
    plaintext_ad_id: Option<&str>,
    hashed_ad_id: Option<&str>,
    enrollment_id: &str,
    blocklist: &EnrollmentList,
    usage_count: u64,
    limit: u64,
) -> AdIdMatch {
    if !ad_id_attempt_possible(plaintext_ad_id, hashed_ad_id, enrollment_id, blocklist) {
        return AdIdMatch::NotAttempted;
    }
    if usage_count >= limit {
        return AdIdMatch::LimitReached;
    }

    let matched = match (plaintext_ad_id, hashed_ad_id) {
        (Some(plaintext), Some(hashed)) => {
            plaintext == hashed || hash_ad_id(plaintext, enrollment_id) == hashed
        }
        _ => false,
    };
    AdIdMatch::Attempted {
        matched,
        count: usage_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENROLLMENT: &str = "enrollment-1";

    fn allow_all() -> EnrollmentList {
        EnrollmentList::parse(ENROLLMENT)
    }

    #[test]
    fn join_keys_missing_side_is_no_attempt() {
        let allowlist = allow_all();
        assert_eq!(
            match_join_keys(None, Some("jk"), ENROLLMENT, &allowlist, 100),
            JoinKeyMatch::NotAttempted
        );
        assert_eq!(
            match_join_keys(Some("jk"), None, ENROLLMENT, &allowlist, 100),
            JoinKeyMatch::NotAttempted
        );
        assert_eq!(
            match_join_keys(Some(""), Some("jk"), ENROLLMENT, &allowlist, 100),
            JoinKeyMatch::NotAttempted
        );
    }

    #[test]
    fn equal_join_keys_allow_listed_match() {
        let outcome = match_join_keys(Some("jk"), Some("jk"), ENROLLMENT, &allow_all(), 100);
        assert!(outcome.is_match());
        let JoinKeyMatch::Attempted { hashed_value, .. } = outcome else {
            panic!("expected an attempt");
        };
        assert_eq!(hashed_value, join_key_bucket("jk", 100));
        assert!(hashed_value < 100);
    }

    #[test]
    fn equal_join_keys_not_allow_listed_is_failed_attempt() {
        let empty = EnrollmentList::parse("");
        let outcome = match_join_keys(Some("jk"), Some("jk"), ENROLLMENT, &empty, 100);
        assert_eq!(
            outcome,
            JoinKeyMatch::Attempted {
                matched: false,
                hashed_value: 0
            }
        );
    }

    #[test]
    fn unequal_join_keys_report_zero_bucket() {
        let outcome = match_join_keys(Some("jk-a"), Some("jk-b"), ENROLLMENT, &allow_all(), 100);
        assert_eq!(
            outcome,
            JoinKeyMatch::Attempted {
                matched: false,
                hashed_value: 0
            }
        );
    }

    #[test]
    fn join_key_bucket_is_deterministic_and_bounded() {
        assert_eq!(join_key_bucket("jk", 100), join_key_bucket("jk", 100));
        assert!(join_key_bucket("another", 7) < 7);
        assert_eq!(join_key_bucket("jk", 0), 0);
    }

    #[test]
    fn ad_id_no_values_is_no_attempt() {
        let blocklist = EnrollmentList::parse("");
        assert_eq!(
            match_ad_ids(None, None, ENROLLMENT, &blocklist, 0, 5),
            AdIdMatch::NotAttempted
        );
    }

    #[test]
    fn ad_id_blocklisted_enrollment_is_no_attempt() {
        let blocklist = EnrollmentList::parse(ENROLLMENT);
        assert_eq!(
            match_ad_ids(Some("ad-id"), None, ENROLLMENT, &blocklist, 0, 5),
            AdIdMatch::NotAttempted
        );
        let star = EnrollmentList::parse("*");
        assert_eq!(
            match_ad_ids(Some("ad-id"), None, ENROLLMENT, &star, 0, 5),
            AdIdMatch::NotAttempted
        );
    }

    #[test]
    fn ad_id_usage_ceiling_abandons_silently() {
        let blocklist = EnrollmentList::parse("");
        let hashed = hash_ad_id("ad-id", ENROLLMENT);
        assert_eq!(
            match_ad_ids(Some("ad-id"), Some(&hashed), ENROLLMENT, &blocklist, 5, 5),
            AdIdMatch::LimitReached
        );
    }

    #[test]
    fn ad_id_one_sided_value_is_failed_attempt() {
        let blocklist = EnrollmentList::parse("");
        let outcome = match_ad_ids(Some("ad-id"), None, ENROLLMENT, &blocklist, 1, 5);
        assert_eq!(
            outcome,
            AdIdMatch::Attempted {
                matched: false,
                count: 1
            }
        );
    }

    #[test]
    fn ad_id_equal_identity_matches_after_normalization() {
        let blocklist = EnrollmentList::parse("");
        let hashed = hash_ad_id("ad-id", ENROLLMENT);
        let outcome = match_ad_ids(Some("ad-id"), Some(&hashed), ENROLLMENT, &blocklist, 2, 5);
        assert!(outcome.is_match());

        let other = hash_ad_id("other-ad-id", ENROLLMENT);
        let outcome = match_ad_ids(Some("ad-id"), Some(&other), ENROLLMENT, &blocklist, 2, 5);
        assert_eq!(
            outcome,
            AdIdMatch::Attempted {
                matched: false,
                count: 2
            }
        );
    }

    #[test]
    fn ad_id_pre_hashed_platform_side_is_compared_as_is() {
        let blocklist = EnrollmentList::parse("");
        let hashed = hash_ad_id("ad-id", ENROLLMENT);
        // The platform side already arrived in hashed form.
        let outcome = match_ad_ids(Some(&hashed), Some(&hashed), ENROLLMENT, &blocklist, 1, 5);
        assert!(outcome.is_match());

        let other = hash_ad_id("other-ad-id", ENROLLMENT);
        let outcome = match_ad_ids(Some(&hashed), Some(&other), ENROLLMENT, &blocklist, 1, 5);
        assert!(!outcome.is_match());
    }

    #[test]
    fn ad_id_hash_is_enrollment_scoped() {
        assert_ne!(
            hash_ad_id("ad-id", "enrollment-1"),
            hash_ad_id("ad-id", "enrollment-2")
        );
    }
}

//! Cross-party debug-key resolution.
//!
//! Decides whether a (source, trigger) pair may reveal its debug keys in
//! outgoing reports. Same-surface, same-registrant pairs reveal each side
//! on its own surface permission. Everything else goes through a two-stage
//! matching cascade:
//!
//! ```text
//! START -> ad-id attempt possible?
//!   yes -> matched? -> yes: REVEAL BOTH
//!                   -> no:  CONCEAL BOTH (terminal; join keys never consulted)
//!   no  -> derived (XNA) source? -> yes: CONCEAL BOTH (join keys disabled)
//!       -> join-key attempt possible?
//!            yes -> matched and allow-listed? -> yes: REVEAL BOTH
//!                                             -> no:  CONCEAL BOTH
//!            no  -> CONCEAL BOTH
//! ```
//!
//! The ad-id stage takes precedence: a failed ad-id comparison conceals the
//! pair even when the join keys would have matched. A derived (XNA) source
//! on the web side never enters the ad-id stage at all. Every completed
//! comparison emits one telemetry record; disqualified and limit-abandoned
//! attempts emit nothing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dao::{DatastoreError, MeasurementDao};
use crate::flags::{EnrollmentList, FlagReader};
use crate::identity::{self, AdIdMatch, JoinKeyMatch};
use crate::model::{Source, SurfaceType, Trigger};
use crate::telemetry::{AttributionType, MatchOutcome, TelemetryLogger};

/// Resolved debug keys for one report. Slots are present-or-absent, never
/// placeholder values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugKeyPair {
    /// Source-side key, if revealable.
    pub source: Option<u64>,
    /// Trigger-side key, if revealable.
    pub trigger: Option<u64>,
}

impl DebugKeyPair {
    /// A pair with both slots concealed.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            source: None,
            trigger: None,
        }
    }

    /// All-or-nothing combinator for both-side mode: any absent slot
    /// collapses the whole pair.
    #[must_use]
    pub const fn all_or_nothing(self) -> Self {
        if self.source.is_some() && self.trigger.is_some() {
            self
        } else {
            Self::empty()
        }
    }
}

/// Surface/registrant pairing of a source and trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pairing {
    AppApp,
    WebWebSameRegistrant,
    WebWebCrossRegistrant,
    AppWeb,
    WebApp,
}

impl Pairing {
    fn classify(source: &Source, trigger: &Trigger) -> Self {
        match (source.publisher_type(), trigger.destination_type()) {
            (SurfaceType::App, SurfaceType::App) => Self::AppApp,
            (SurfaceType::Web, SurfaceType::Web) => {
                if source.registrant() == trigger.registrant() {
                    Self::WebWebSameRegistrant
                } else {
                    Self::WebWebCrossRegistrant
                }
            }
            (SurfaceType::App, SurfaceType::Web) => Self::AppWeb,
            (SurfaceType::Web, SurfaceType::App) => Self::WebApp,
        }
    }

    const fn attribution_type(self) -> AttributionType {
        match self {
            Self::AppApp => AttributionType::AppApp,
            Self::WebWebSameRegistrant | Self::WebWebCrossRegistrant => AttributionType::WebWeb,
            Self::AppWeb => AttributionType::AppWeb,
            Self::WebApp => AttributionType::WebApp,
        }
    }
}

/// Debug-key resolution engine.
///
/// Pure over its inputs apart from telemetry emission and the usage-count
/// snapshot read from the DAO.
pub struct DebugKeyResolver<'a> {
    flags: &'a dyn FlagReader,
    telemetry: &'a dyn TelemetryLogger,
    dao: &'a dyn MeasurementDao,
}

impl<'a> DebugKeyResolver<'a> {
    /// Wires the resolver to its collaborators.
    #[must_use]
    pub fn new(
        flags: &'a dyn FlagReader,
        telemetry: &'a dyn TelemetryLogger,
        dao: &'a dyn MeasurementDao,
    ) -> Self {
        Self {
            flags,
            telemetry,
            dao,
        }
    }

    /// Resolves the key pair embedded in ordinary attribution reports.
    ///
    /// # Errors
    ///
    /// Propagates a DAO failure from the usage-count read.
    pub fn resolve(
        &self,
        source: &Source,
        trigger: &Trigger,
    ) -> Result<DebugKeyPair, DatastoreError> {
        let pair = match Pairing::classify(source, trigger) {
            Pairing::AppApp => DebugKeyPair {
                source: source.debug_key().filter(|_| source.ad_id_permission()),
                trigger: trigger.debug_key().filter(|_| trigger.ad_id_permission()),
            },
            Pairing::WebWebSameRegistrant => DebugKeyPair {
                source: source.debug_key().filter(|_| source.ar_debug_permission()),
                trigger: trigger.debug_key().filter(|_| trigger.ar_debug_permission()),
            },
            pairing => self.resolve_cross_surface(source, trigger, pairing)?,
        };

        if self.flags.enable_both_side_debug_keys() {
            Ok(pair.all_or_nothing())
        } else {
            Ok(pair)
        }
    }

    /// Resolves the key pair embedded in verbose trigger debug reports.
    ///
    /// The trigger's own surface permission is the master gate: without it
    /// nothing is revealed. With it, the trigger key always survives; the
    /// source slot is filled only when the source is present and either
    /// shares the trigger's surface and registrant (own permission) or wins
    /// the cross-surface cascade. `source` is `None` when no source
    /// matched the trigger.
    ///
    /// # Errors
    ///
    /// Propagates a DAO failure from the usage-count read.
    pub fn resolve_for_verbose_trigger_report(
        &self,
        source: Option<&Source>,
        trigger: &Trigger,
    ) -> Result<DebugKeyPair, DatastoreError> {
        if !trigger.surface_permission() {
            return Ok(DebugKeyPair::empty());
        }
        let trigger_key = trigger.debug_key();

        let Some(source) = source else {
            return Ok(DebugKeyPair {
                source: None,
                trigger: trigger_key,
            });
        };

        let source_key = match Pairing::classify(source, trigger) {
            Pairing::AppApp => source.debug_key().filter(|_| source.ad_id_permission()),
            Pairing::WebWebSameRegistrant => {
                source.debug_key().filter(|_| source.ar_debug_permission())
            }
            pairing => {
                self.resolve_cross_surface(source, trigger, pairing)?
                    .source
            }
        };

        Ok(DebugKeyPair {
            source: source_key,
            trigger: trigger_key,
        })
    }

    /// Runs the matching cascade; the result is always both-or-neither.
    fn resolve_cross_surface(
        &self,
        source: &Source,
        trigger: &Trigger,
        pairing: Pairing,
    ) -> Result<DebugKeyPair, DatastoreError> {
        let revealed = DebugKeyPair {
            source: source.debug_key(),
            trigger: trigger.debug_key(),
        };
        let enrollment_id = trigger.enrollment_id();

        // Ad-id matching only exists across the app/web boundary; the app
        // side holds the plaintext platform ad-id, the web side the
        // ad-tech supplied digest. A derived source's inherited digest may
        // not prove identity, so web-side derived sources never enter the
        // ad-id stage.
        let ad_id_sides = match pairing {
            Pairing::AppWeb => Some((source.platform_ad_id(), trigger.debug_ad_id())),
            Pairing::WebApp if !source.is_derived() => {
                Some((trigger.platform_ad_id(), source.debug_ad_id()))
            }
            _ => None,
        };

        if let Some((plaintext, hashed)) = ad_id_sides {
            let blocklist =
                EnrollmentList::parse(&self.flags.debug_ad_id_matching_enrollment_blocklist());
            if identity::ad_id_attempt_possible(plaintext, hashed, enrollment_id, &blocklist) {
                let count = self
                    .dao
                    .count_distinct_debug_ad_ids_used_by_enrollment(enrollment_id)?;
                let limit = self.flags.debug_ad_id_matching_limit();
                return match identity::match_ad_ids(
                    plaintext,
                    hashed,
                    enrollment_id,
                    &blocklist,
                    count,
                    limit,
                ) {
                    AdIdMatch::Attempted { matched, count } => {
                        self.telemetry.log_ad_id_match(MatchOutcome {
                            ad_tech_enrollment_id: enrollment_id.to_string(),
                            attribution_type: pairing.attribution_type(),
                            matched,
                            value: count,
                            limit,
                            source_registrant: source.registrant().to_string(),
                        });
                        if matched {
                            Ok(revealed)
                        } else {
                            Ok(DebugKeyPair::empty())
                        }
                    }
                    AdIdMatch::LimitReached => {
                        debug!(enrollment_id, count, limit, "ad-id matching budget exhausted");
                        Ok(DebugKeyPair::empty())
                    }
                    // Possibility was checked above.
                    AdIdMatch::NotAttempted => Ok(DebugKeyPair::empty()),
                };
            }
        }

        // Derived sources may not be re-identified through join keys.
        if source.is_derived() {
            return Ok(DebugKeyPair::empty());
        }

        let allowlist = EnrollmentList::parse(&self.flags.debug_join_key_enrollment_allowlist());
        let hash_limit = self.flags.debug_join_key_hash_limit();
        match identity::match_join_keys(
            source.debug_join_key(),
            trigger.debug_join_key(),
            enrollment_id,
            &allowlist,
            hash_limit,
        ) {
            JoinKeyMatch::Attempted {
                matched,
                hashed_value,
            } => {
                self.telemetry.log_join_key_match(MatchOutcome {
                    ad_tech_enrollment_id: enrollment_id.to_string(),
                    attribution_type: pairing.attribution_type(),
                    matched,
                    value: hashed_value,
                    limit: hash_limit,
                    source_registrant: source.registrant().to_string(),
                });
                if matched {
                    Ok(revealed)
                } else {
                    Ok(DebugKeyPair::empty())
                }
            }
            JoinKeyMatch::NotAttempted => Ok(DebugKeyPair::empty()),
        }
    }
}

//! Debug-report gateway: eligibility gating, body assembly, persistence.
//!
//! Every `schedule_*` entry point runs the same shape of pipeline: check
//! the gate for the report's family, assemble the JSON body, insert the
//! report through the DAO, then kick the delivery scheduler. An ineligible
//! registration is a silent no-op ([`ScheduleOutcome::Suppressed`]), never
//! an error: callers in the attribution hot path must not branch on
//! debug-report eligibility.
//!
//! Gate order for source- and trigger-family reports:
//!
//! 1. global `enable_debug_report` flag,
//! 2. the family sub-flag,
//! 3. registration opt-in (`is_debug_reporting`, both sides for
//!    trigger-family reports with a matched source),
//! 4. surface permission (both sides likewise; destination-limit types
//!    skip this step),
//! 5. non-empty enrollment id.
//!
//! Header-parsing-error reports check only the global flag, the header
//! sub-flag, and the enrollment id.

use serde_json::{Map, Value};
use tracing::debug;

use crate::dao::{DatastoreError, MeasurementDao};
use crate::flags::FlagReader;
use crate::model::{Source, Trigger};
use crate::report::{body, DebugReport, ReportFamily, ReportType};
use crate::resolver::DebugKeyResolver;
use crate::scheduler::DeliveryScheduler;
use crate::telemetry::TelemetryLogger;

/// Whether a report was persisted or silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// The report was inserted and delivery was kicked.
    Scheduled,
    /// The registration was ineligible; nothing was stored.
    Suppressed,
}

impl ScheduleOutcome {
    #[must_use]
    pub const fn is_scheduled(self) -> bool {
        matches!(self, Self::Scheduled)
    }
}

/// Result of attribution-scope validation, as reported by registration
/// processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributionScopeValidationResult {
    /// Scopes were accepted; no report is owed.
    Valid,
    /// The declared trigger-state cardinality exceeds the ceiling.
    ExceedsMaxEventStatesLimit,
    /// The scope configuration leaks more information than allowed.
    ExceedsInformationGainLimit,
}

/// Entry point for scheduling verbose debug reports.
pub struct DebugReportGateway<'a> {
    flags: &'a dyn FlagReader,
    dao: &'a dyn MeasurementDao,
    scheduler: &'a dyn DeliveryScheduler,
    resolver: DebugKeyResolver<'a>,
}

impl<'a> DebugReportGateway<'a> {
    /// Wires the gateway to its collaborators.
    #[must_use]
    pub fn new(
        flags: &'a dyn FlagReader,
        telemetry: &'a dyn TelemetryLogger,
        dao: &'a dyn MeasurementDao,
        scheduler: &'a dyn DeliveryScheduler,
    ) -> Self {
        Self {
            flags,
            dao,
            scheduler,
            resolver: DebugKeyResolver::new(flags, telemetry, dao),
        }
    }

    /// Schedules a source-family report.
    ///
    /// `additional` entries are appended to the body verbatim; dedicated
    /// wrappers exist for the limit-carrying types.
    ///
    /// # Errors
    ///
    /// Propagates DAO failures from the insert.
    pub fn schedule_source_report(
        &self,
        source: &Source,
        report_type: ReportType,
        additional: &[(&str, &str)],
    ) -> Result<ScheduleOutcome, DatastoreError> {
        debug_assert_eq!(report_type.family(), ReportFamily::Source);
        if !self.source_gate(source, report_type) {
            return Ok(ScheduleOutcome::Suppressed);
        }

        let include_debug_key = !report_type.skips_permission_check();
        let mut report_body = self.source_body(source, include_debug_key);
        for (key, value) in additional {
            report_body.insert((*key).to_string(), Value::String((*value).to_string()));
        }

        self.persist(DebugReport::new(
            report_type,
            source.enrollment_id(),
            source.registration_origin(),
            report_body,
        ))
    }

    /// Schedules a `source-destination-limit` report. Delivered without a
    /// debug key, so the surface permission is not consulted.
    ///
    /// # Errors
    ///
    /// Propagates DAO failures from the insert.
    pub fn schedule_source_destination_limit_report(
        &self,
        source: &Source,
        limit: &str,
    ) -> Result<ScheduleOutcome, DatastoreError> {
        self.schedule_source_report(
            source,
            ReportType::SourceDestinationLimit,
            &[(body::LIMIT, limit)],
        )
    }

    /// Schedules one of the destination rate-limit report types.
    ///
    /// # Errors
    ///
    /// Propagates DAO failures from the insert.
    pub fn schedule_source_destination_rate_limit_report(
        &self,
        source: &Source,
        limit: &str,
        report_type: ReportType,
    ) -> Result<ScheduleOutcome, DatastoreError> {
        debug_assert!(report_type.skips_permission_check());
        self.schedule_source_report(source, report_type, &[(body::LIMIT, limit)])
    }

    /// Schedules the report owed after attribution-scope validation, if
    /// any. [`AttributionScopeValidationResult::Valid`] is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates DAO failures from the insert.
    pub fn schedule_attribution_scope_report(
        &self,
        source: &Source,
        result: AttributionScopeValidationResult,
    ) -> Result<ScheduleOutcome, DatastoreError> {
        match result {
            AttributionScopeValidationResult::Valid => Ok(ScheduleOutcome::Suppressed),
            AttributionScopeValidationResult::ExceedsMaxEventStatesLimit => {
                let limit = source
                    .max_event_states()
                    .map(|states| states.to_string())
                    .unwrap_or_default();
                self.schedule_source_report(
                    source,
                    ReportType::SourceMaxEventStatesLimit,
                    &[(body::LIMIT, &limit)],
                )
            }
            AttributionScopeValidationResult::ExceedsInformationGainLimit => {
                let limit = self.flags.attribution_scope_max_info_gain().to_string();
                self.schedule_source_report(
                    source,
                    ReportType::SourceScopesChannelCapacityLimit,
                    &[(body::LIMIT, &limit)],
                )
            }
        }
    }

    /// Schedules a trigger-family report for an attributed (source,
    /// trigger) pair. `limit` is echoed in the body when the type carries
    /// one.
    ///
    /// # Errors
    ///
    /// Propagates DAO failures from key resolution or the insert.
    pub fn schedule_trigger_report(
        &self,
        source: &Source,
        trigger: &Trigger,
        limit: Option<&str>,
        report_type: ReportType,
    ) -> Result<ScheduleOutcome, DatastoreError> {
        self.schedule_trigger_report_inner(source, trigger, limit, None, report_type)
    }

    /// Schedules a `trigger-aggregate-insufficient-named-budget` report,
    /// naming the exhausted budget.
    ///
    /// # Errors
    ///
    /// Propagates DAO failures from key resolution or the insert.
    pub fn schedule_trigger_named_budget_report(
        &self,
        source: &Source,
        trigger: &Trigger,
        limit: &str,
        budget_name: &str,
    ) -> Result<ScheduleOutcome, DatastoreError> {
        self.schedule_trigger_report_inner(
            source,
            trigger,
            Some(limit),
            Some(budget_name),
            ReportType::TriggerAggregateInsufficientNamedBudget,
        )
    }

    /// Schedules a trigger-family report when no source matched.
    ///
    /// # Errors
    ///
    /// Propagates DAO failures from the insert.
    pub fn schedule_trigger_no_matching_source_report(
        &self,
        trigger: &Trigger,
        report_type: ReportType,
    ) -> Result<ScheduleOutcome, DatastoreError> {
        debug_assert_eq!(report_type.family(), ReportFamily::Trigger);
        if !self.trigger_gate(None, trigger) {
            return Ok(ScheduleOutcome::Suppressed);
        }

        let keys = self
            .resolver
            .resolve_for_verbose_trigger_report(None, trigger)?;
        let mut report_body = Map::new();
        report_body.insert(
            body::ATTRIBUTION_DESTINATION.to_string(),
            Value::String(trigger.attribution_destination().to_string()),
        );
        if let Some(key) = keys.trigger {
            report_body.insert(
                body::TRIGGER_DEBUG_KEY.to_string(),
                Value::String(key.to_string()),
            );
        }

        self.persist(DebugReport::new(
            report_type,
            trigger.enrollment_id(),
            trigger.registration_origin(),
            report_body,
        ))
    }

    /// Schedules a `header-parsing-error` report for a malformed
    /// registration header.
    ///
    /// # Errors
    ///
    /// Propagates DAO failures from the insert.
    pub fn schedule_header_error_report(
        &self,
        registration_origin: &str,
        context_site: &str,
        header_name: &str,
        header_content: &str,
        enrollment_id: &str,
    ) -> Result<ScheduleOutcome, DatastoreError> {
        if !self.flags.enable_debug_report()
            || !self.flags.enable_header_error_debug_report()
            || enrollment_id.is_empty()
        {
            debug!(header = header_name, "header error report suppressed");
            return Ok(ScheduleOutcome::Suppressed);
        }

        let mut report_body = Map::new();
        report_body.insert(
            body::CONTEXT_SITE.to_string(),
            Value::String(context_site.to_string()),
        );
        report_body.insert(
            body::HEADER.to_string(),
            Value::String(header_name.to_string()),
        );
        report_body.insert(
            body::VALUE.to_string(),
            Value::String(header_content.to_string()),
        );

        self.persist(DebugReport::new(
            ReportType::HeaderParsingError,
            enrollment_id,
            registration_origin,
            report_body,
        ))
    }

    fn schedule_trigger_report_inner(
        &self,
        source: &Source,
        trigger: &Trigger,
        limit: Option<&str>,
        budget_name: Option<&str>,
        report_type: ReportType,
    ) -> Result<ScheduleOutcome, DatastoreError> {
        debug_assert_eq!(report_type.family(), ReportFamily::Trigger);
        if !self.trigger_gate(Some(source), trigger) {
            return Ok(ScheduleOutcome::Suppressed);
        }

        let keys = self
            .resolver
            .resolve_for_verbose_trigger_report(Some(source), trigger)?;

        let mut report_body = Map::new();
        report_body.insert(
            body::ATTRIBUTION_DESTINATION.to_string(),
            Value::String(trigger.attribution_destination().to_string()),
        );
        report_body.insert(
            body::SOURCE_EVENT_ID.to_string(),
            Value::String(source.event_id().to_string()),
        );
        report_body.insert(
            body::SOURCE_SITE.to_string(),
            Value::String(source.publisher().to_string()),
        );
        if let Some(limit) = limit {
            report_body.insert(body::LIMIT.to_string(), Value::String(limit.to_string()));
        }
        if let Some(name) = budget_name {
            report_body.insert(body::NAME.to_string(), Value::String(name.to_string()));
        }
        if let Some(key) = keys.source {
            report_body.insert(
                body::SOURCE_DEBUG_KEY.to_string(),
                Value::String(key.to_string()),
            );
        }
        if let Some(key) = keys.trigger {
            report_body.insert(
                body::TRIGGER_DEBUG_KEY.to_string(),
                Value::String(key.to_string()),
            );
        }

        self.persist(DebugReport::new(
            report_type,
            trigger.enrollment_id(),
            trigger.registration_origin(),
            report_body,
        ))
    }

    fn source_gate(&self, source: &Source, report_type: ReportType) -> bool {
        let eligible = self.flags.enable_debug_report()
            && self.flags.enable_source_debug_report()
            && source.is_debug_reporting()
            && (report_type.skips_permission_check() || source.surface_permission())
            && !source.enrollment_id().is_empty();
        if !eligible {
            debug!(report_type = %report_type, "source debug report suppressed");
        }
        eligible
    }

    fn trigger_gate(&self, source: Option<&Source>, trigger: &Trigger) -> bool {
        let source_eligible = source.map_or(true, |source| {
            source.is_debug_reporting() && source.surface_permission()
        });
        let eligible = self.flags.enable_debug_report()
            && self.flags.enable_trigger_debug_report()
            && trigger.is_debug_reporting()
            && source_eligible
            && trigger.surface_permission()
            && !trigger.enrollment_id().is_empty();
        if !eligible {
            debug!("trigger debug report suppressed");
        }
        eligible
    }

    fn source_body(&self, source: &Source, include_debug_key: bool) -> Map<String, Value> {
        let mut report_body = Map::new();
        report_body.insert(
            body::SOURCE_EVENT_ID.to_string(),
            Value::String(source.event_id().to_string()),
        );
        if let Some(destination) = destinations_value(source) {
            report_body.insert(body::ATTRIBUTION_DESTINATION.to_string(), destination);
        }
        report_body.insert(
            body::SOURCE_SITE.to_string(),
            Value::String(source.publisher().to_string()),
        );
        if include_debug_key && source.surface_permission() {
            if let Some(key) = source.debug_key() {
                report_body.insert(
                    body::SOURCE_DEBUG_KEY.to_string(),
                    Value::String(key.to_string()),
                );
            }
        }
        report_body
    }

    fn persist(&self, report: DebugReport) -> Result<ScheduleOutcome, DatastoreError> {
        self.dao.insert_debug_report(&report)?;
        self.scheduler.schedule_if_needed(false);
        Ok(ScheduleOutcome::Scheduled)
    }
}

/// One destination serializes to a bare string, both to a two-element
/// `[app, web]` array.
fn destinations_value(source: &Source) -> Option<Value> {
    match (source.app_destination(), source.web_destination()) {
        (Some(app), Some(web)) => Some(Value::Array(vec![
            Value::String(app.to_string()),
            Value::String(web.to_string()),
        ])),
        (Some(only), None) | (None, Some(only)) => Some(Value::String(only.to_string())),
        (None, None) => None,
    }
}

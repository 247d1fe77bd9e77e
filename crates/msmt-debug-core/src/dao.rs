//! Storage collaborator boundary.
//!
//! The gating layer owns no storage. Report persistence and the distinct
//! ad-id usage counter live behind [`MeasurementDao`]; the insert is
//! expected to participate in the caller's ambient transaction, so a
//! rolled-back attribution run also rolls back any debug report it queued.

use thiserror::Error;

use crate::report::DebugReport;

/// Failure surfaced by the storage collaborator.
///
/// This is the only error this crate propagates: ineligibility and failed
/// matches are ordinary values, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatastoreError {
    /// The underlying datastore rejected the operation.
    #[error("datastore operation failed: {0}")]
    Operation(String),
}

/// Measurement data access, as consumed by this crate.
pub trait MeasurementDao {
    /// Inserts a debug report as part of the enclosing transaction.
    ///
    /// # Errors
    ///
    /// Propagates the datastore failure; the caller owns rollback.
    fn insert_debug_report(&self, report: &DebugReport) -> Result<(), DatastoreError>;

    /// Snapshot of how many distinct debug ad-ids this enrollment has
    /// already matched against. Concurrent updates are the DAO's
    /// consistency problem; this crate treats the value as a point-in-time
    /// read.
    ///
    /// # Errors
    ///
    /// Propagates the datastore failure.
    fn count_distinct_debug_ad_ids_used_by_enrollment(
        &self,
        enrollment_id: &str,
    ) -> Result<u64, DatastoreError>;
}

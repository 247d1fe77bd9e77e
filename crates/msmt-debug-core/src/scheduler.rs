//! Delivery-scheduling collaborator boundary.

/// Kicks the asynchronous delivery pipeline after a report lands in
/// storage.
///
/// The call is fire-and-forget: the gateway never observes scheduling
/// failures, and delivery/retry semantics live entirely on the other side
/// of this trait.
pub trait DeliveryScheduler {
    /// Requests that pending verbose debug reports be delivered.
    /// `immediate` forces a prompt run instead of the next batch window.
    fn schedule_if_needed(&self, immediate: bool);
}

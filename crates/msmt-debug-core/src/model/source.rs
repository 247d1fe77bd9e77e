//! Advertising source (ad click/view) registration record.

use serde::{Deserialize, Serialize};

use super::SurfaceType;

/// A registered advertising source, as handed to the gating layer by
/// registration processing.
///
/// The record is immutable once built. A non-`None` [`Source::parent_id`]
/// marks a derived (cross-network-attributed) source; derived sources are
/// barred from join-key based cross-surface matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    id: String,
    event_id: u64,
    publisher: String,
    publisher_type: SurfaceType,
    app_destination: Option<String>,
    web_destination: Option<String>,
    enrollment_id: String,
    registrant: String,
    registration_origin: String,
    debug_key: Option<u64>,
    debug_join_key: Option<String>,
    platform_ad_id: Option<String>,
    debug_ad_id: Option<String>,
    ad_id_permission: bool,
    ar_debug_permission: bool,
    is_debug_reporting: bool,
    parent_id: Option<String>,
    max_event_states: Option<u64>,
}

impl Source {
    /// Starts building a source record.
    #[must_use]
    pub fn builder() -> SourceBuilder {
        SourceBuilder::default()
    }

    /// Storage identifier of this source row.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Advertiser-assigned event id.
    #[must_use]
    pub const fn event_id(&self) -> u64 {
        self.event_id
    }

    /// Publisher site or app the source was registered on.
    #[must_use]
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// Surface the publisher lives on.
    #[must_use]
    pub const fn publisher_type(&self) -> SurfaceType {
        self.publisher_type
    }

    /// App destination, if the source expects an app conversion.
    #[must_use]
    pub fn app_destination(&self) -> Option<&str> {
        self.app_destination.as_deref()
    }

    /// Web destination, if the source expects a web conversion.
    #[must_use]
    pub fn web_destination(&self) -> Option<&str> {
        self.web_destination.as_deref()
    }

    /// Enrollment of the registering ad-tech.
    #[must_use]
    pub fn enrollment_id(&self) -> &str {
        &self.enrollment_id
    }

    /// Origin that performed the registration call.
    #[must_use]
    pub fn registrant(&self) -> &str {
        &self.registrant
    }

    /// Reporting origin the registration response came from.
    #[must_use]
    pub fn registration_origin(&self) -> &str {
        &self.registration_origin
    }

    /// Cleartext debug key supplied at registration, if any.
    #[must_use]
    pub const fn debug_key(&self) -> Option<u64> {
        self.debug_key
    }

    /// Cross-party join key supplied at registration, if any.
    #[must_use]
    pub fn debug_join_key(&self) -> Option<&str> {
        self.debug_join_key.as_deref()
    }

    /// Plaintext platform ad-id, present only for app-surface registrations
    /// where the device released it.
    #[must_use]
    pub fn platform_ad_id(&self) -> Option<&str> {
        self.platform_ad_id.as_deref()
    }

    /// Ad-tech supplied ad-id, already hashed with the enrollment scope.
    #[must_use]
    pub fn debug_ad_id(&self) -> Option<&str> {
        self.debug_ad_id.as_deref()
    }

    /// Whether the app-surface ad-id permission was granted.
    #[must_use]
    pub const fn ad_id_permission(&self) -> bool {
        self.ad_id_permission
    }

    /// Whether the web-surface AR debug permission was granted.
    #[must_use]
    pub const fn ar_debug_permission(&self) -> bool {
        self.ar_debug_permission
    }

    /// Whether the registration opted into verbose debug reporting.
    #[must_use]
    pub const fn is_debug_reporting(&self) -> bool {
        self.is_debug_reporting
    }

    /// Parent source id; present iff this is a derived (XNA) source.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Returns `true` for derived (cross-network-attributed) sources.
    #[must_use]
    pub const fn is_derived(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Trigger-state cardinality declared for attribution scopes.
    #[must_use]
    pub const fn max_event_states(&self) -> Option<u64> {
        self.max_event_states
    }

    /// Whether the permission matching this source's surface holds.
    #[must_use]
    pub const fn surface_permission(&self) -> bool {
        match self.publisher_type {
            SurfaceType::App => self.ad_id_permission,
            SurfaceType::Web => self.ar_debug_permission,
        }
    }
}

/// Builder for [`Source`].
#[derive(Debug, Clone, Default)]
pub struct SourceBuilder {
    id: String,
    event_id: u64,
    publisher: String,
    publisher_type: Option<SurfaceType>,
    app_destination: Option<String>,
    web_destination: Option<String>,
    enrollment_id: String,
    registrant: String,
    registration_origin: String,
    debug_key: Option<u64>,
    debug_join_key: Option<String>,
    platform_ad_id: Option<String>,
    debug_ad_id: Option<String>,
    ad_id_permission: bool,
    ar_debug_permission: bool,
    is_debug_reporting: bool,
    parent_id: Option<String>,
    max_event_states: Option<u64>,
}

impl SourceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn event_id(mut self, event_id: u64) -> Self {
        self.event_id = event_id;
        self
    }

    #[must_use]
    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    #[must_use]
    pub fn publisher_type(mut self, surface: SurfaceType) -> Self {
        self.publisher_type = Some(surface);
        self
    }

    #[must_use]
    pub fn app_destination(mut self, destination: impl Into<String>) -> Self {
        self.app_destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn web_destination(mut self, destination: impl Into<String>) -> Self {
        self.web_destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn enrollment_id(mut self, enrollment_id: impl Into<String>) -> Self {
        self.enrollment_id = enrollment_id.into();
        self
    }

    #[must_use]
    pub fn registrant(mut self, registrant: impl Into<String>) -> Self {
        self.registrant = registrant.into();
        self
    }

    #[must_use]
    pub fn registration_origin(mut self, origin: impl Into<String>) -> Self {
        self.registration_origin = origin.into();
        self
    }

    #[must_use]
    pub fn debug_key(mut self, key: u64) -> Self {
        self.debug_key = Some(key);
        self
    }

    #[must_use]
    pub fn debug_join_key(mut self, key: impl Into<String>) -> Self {
        self.debug_join_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn platform_ad_id(mut self, ad_id: impl Into<String>) -> Self {
        self.platform_ad_id = Some(ad_id.into());
        self
    }

    #[must_use]
    pub fn debug_ad_id(mut self, ad_id: impl Into<String>) -> Self {
        self.debug_ad_id = Some(ad_id.into());
        self
    }

    #[must_use]
    pub fn ad_id_permission(mut self, granted: bool) -> Self {
        self.ad_id_permission = granted;
        self
    }

    #[must_use]
    pub fn ar_debug_permission(mut self, granted: bool) -> Self {
        self.ar_debug_permission = granted;
        self
    }

    #[must_use]
    pub fn is_debug_reporting(mut self, opted_in: bool) -> Self {
        self.is_debug_reporting = opted_in;
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn max_event_states(mut self, states: u64) -> Self {
        self.max_event_states = Some(states);
        self
    }

    /// Finalizes the record. Publisher surface defaults to app.
    #[must_use]
    pub fn build(self) -> Source {
        Source {
            id: self.id,
            event_id: self.event_id,
            publisher: self.publisher,
            publisher_type: self.publisher_type.unwrap_or(SurfaceType::App),
            app_destination: self.app_destination,
            web_destination: self.web_destination,
            enrollment_id: self.enrollment_id,
            registrant: self.registrant,
            registration_origin: self.registration_origin,
            debug_key: self.debug_key,
            debug_join_key: self.debug_join_key,
            platform_ad_id: self.platform_ad_id,
            debug_ad_id: self.debug_ad_id,
            ad_id_permission: self.ad_id_permission,
            ar_debug_permission: self.ar_debug_permission,
            is_debug_reporting: self.is_debug_reporting,
            parent_id: self.parent_id,
            max_event_states: self.max_event_states,
        }
    }
}

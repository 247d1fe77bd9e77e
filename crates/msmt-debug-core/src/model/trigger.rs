//! Conversion trigger registration record.

use serde::{Deserialize, Serialize};

use super::SurfaceType;

/// A registered conversion trigger.
///
/// Immutable once built; see [`super::Source`] for lifecycle notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    id: String,
    attribution_destination: String,
    destination_type: SurfaceType,
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
}

impl Trigger {
    /// Starts building a trigger record.
    #[must_use]
    pub fn builder() -> TriggerBuilder {
        TriggerBuilder::default()
    }

    /// Storage identifier of this trigger row.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Destination site or app the conversion happened on.
    #[must_use]
    pub fn attribution_destination(&self) -> &str {
        &self.attribution_destination
    }

    /// Surface the conversion destination lives on.
    #[must_use]
    pub const fn destination_type(&self) -> SurfaceType {
        self.destination_type
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

    /// Plaintext platform ad-id, present only for app-destination triggers
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

    /// Whether the permission matching this trigger's surface holds.
    #[must_use]
    pub const fn surface_permission(&self) -> bool {
        match self.destination_type {
            SurfaceType::App => self.ad_id_permission,
            SurfaceType::Web => self.ar_debug_permission,
        }
    }
}

/// Builder for [`Trigger`].
#[derive(Debug, Clone, Default)]
pub struct TriggerBuilder {
    id: String,
    attribution_destination: String,
    destination_type: Option<SurfaceType>,
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
}

impl TriggerBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn attribution_destination(mut self, destination: impl Into<String>) -> Self {
        self.attribution_destination = destination.into();
        self
    }

    #[must_use]
    pub fn destination_type(mut self, surface: SurfaceType) -> Self {
        self.destination_type = Some(surface);
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

    /// Finalizes the record. Destination surface defaults to app.
    #[must_use]
    pub fn build(self) -> Trigger {
        Trigger {
            id: self.id,
            attribution_destination: self.attribution_destination,
            destination_type: self.destination_type.unwrap_or(SurfaceType::App),
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
        }
    }
}

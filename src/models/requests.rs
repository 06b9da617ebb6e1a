//! Request DTOs for the proxy API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::preferences::NotificationPreference;

/// Request body for `POST /api/1/preferences`
///
/// # Fields
/// - `registration_id`: push registration id of the device (older clients
///   send it as `gcm_registration_id`)
/// - `categories`: categories the device wants notifications for
#[derive(Debug, Clone, Deserialize)]
pub struct PreferencesRequest {
    #[serde(alias = "gcm_registration_id")]
    pub registration_id: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl PreferencesRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.registration_id.trim().is_empty() {
            return Some("Registration id cannot be empty".to_string());
        }
        if self.categories.iter().any(|c| c.trim().is_empty()) {
            return Some("Categories cannot be empty strings".to_string());
        }
        None
    }

    pub fn into_preference(self) -> NotificationPreference {
        NotificationPreference {
            registration_id: self.registration_id,
            categories: self.categories,
            last_updated: None,
        }
    }
}

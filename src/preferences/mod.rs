//! Notification Preferences Module
//!
//! Which push categories each registered device wants. The store is keyed by
//! registration id, so writing the same record twice is harmless.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ProxyError, Result};

// == Notification Preference ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreference {
    /// Device registration id of the push gateway
    pub registration_id: String,
    /// Video categories (or `live`) the device subscribes to
    pub categories: Vec<String>,
    /// Set by the store on every upsert
    pub last_updated: Option<DateTime<Utc>>,
}

// == Preference Store Trait ==
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Inserts or replaces the record for its registration id.
    async fn upsert(&self, preference: NotificationPreference) -> Result<()>;

    /// All records subscribed to `category`.
    async fn subscribers(&self, category: &str) -> Result<Vec<NotificationPreference>>;
}

// == In-Memory Preference Store ==
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    records: RwLock<HashMap<String, NotificationPreference>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    #[cfg(test)]
    pub async fn get(&self, registration_id: &str) -> Option<NotificationPreference> {
        self.records.read().await.get(registration_id).cloned()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn upsert(&self, mut preference: NotificationPreference) -> Result<()> {
        if preference.registration_id.is_empty() {
            return Err(ProxyError::PreferenceStore(
                "registration id cannot be empty".to_string(),
            ));
        }

        preference.last_updated = Some(Utc::now());
        self.records
            .write()
            .await
            .insert(preference.registration_id.clone(), preference);
        Ok(())
    }

    async fn subscribers(&self, category: &str) -> Result<Vec<NotificationPreference>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|p| p.categories.iter().any(|c| c == category))
            .cloned()
            .collect())
    }
}

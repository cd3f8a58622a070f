//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the `ProfileStore` port. The core is
//! written against the port trait precisely so tests (and local
//! development without a database) can inject this fake.

use crate::adapters::store::{analysis_slot, DOWNLOADS_SLOT, PROFILE_SLOT};
use async_trait::async_trait;
use gurukul_core::domain::{DownloadSet, LearnerProfile};
use gurukul_core::ports::{PortError, PortResult, ProfileStore};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// A `ProfileStore` backed by a mutex-guarded slot map. Mirrors the
/// database adapter's slot layout so the two stay interchangeable.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock still yields the slot map: the values are plain JSON
    // snapshots, valid regardless of where a panicking holder stopped.
    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, serde_json::Value>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read(&self, slot: &str) -> Option<serde_json::Value> {
        self.lock_slots().get(slot).cloned()
    }

    fn write(&self, slot: &str, value: serde_json::Value) {
        self.lock_slots().insert(slot.to_string(), value);
    }

    /// Seeds a raw value into a slot, bypassing serialization. Lets tests
    /// exercise the malformed-state path.
    #[cfg(test)]
    pub fn seed_raw(&self, slot: &str, value: serde_json::Value) {
        self.write(slot, value);
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load_profile(&self) -> PortResult<Option<LearnerProfile>> {
        let Some(value) = self.read(PROFILE_SLOT) else {
            return Ok(None);
        };
        match serde_json::from_value::<LearnerProfile>(value) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!("Stored profile is malformed, treating as absent: {}", e);
                Ok(None)
            }
        }
    }

    async fn save_profile(&self, profile: &LearnerProfile) -> PortResult<()> {
        let value = serde_json::to_value(profile)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.write(PROFILE_SLOT, value);
        Ok(())
    }

    async fn load_downloads(&self) -> PortResult<DownloadSet> {
        let Some(value) = self.read(DOWNLOADS_SLOT) else {
            return Ok(DownloadSet::new());
        };
        match serde_json::from_value::<DownloadSet>(value) {
            Ok(downloads) => Ok(downloads),
            Err(e) => {
                warn!("Stored downloads are malformed, treating as empty: {}", e);
                Ok(DownloadSet::new())
            }
        }
    }

    async fn save_downloads(&self, downloads: &DownloadSet) -> PortResult<()> {
        let value = serde_json::to_value(downloads)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.write(DOWNLOADS_SLOT, value);
        Ok(())
    }

    async fn load_analysis(&self, learner_name: &str) -> PortResult<Option<String>> {
        let Some(value) = self.read(&analysis_slot(learner_name)) else {
            return Ok(None);
        };
        Ok(value.as_str().map(str::to_string))
    }

    async fn save_analysis(&self, learner_name: &str, text: &str) -> PortResult<()> {
        self.write(
            &analysis_slot(learner_name),
            serde_json::Value::String(text.to_string()),
        );
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        self.lock_slots().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gurukul_core::domain::Board;
    use gurukul_core::progress::{create_profile, OnboardingForm};

    fn sample_profile() -> LearnerProfile {
        create_profile(OnboardingForm {
            name: "Meena".to_string(),
            grade: "Class 6".to_string(),
            preferred_language: "ta".to_string(),
            board: Board::TamilNadu,
            region: "Tamil Nadu".to_string(),
        })
    }

    #[tokio::test]
    async fn profile_round_trips() {
        let store = MemoryStore::new();
        assert!(store.load_profile().await.unwrap().is_none());

        let profile = sample_profile();
        store.save_profile(&profile).await.unwrap();
        assert_eq!(store.load_profile().await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn malformed_profile_reads_as_absent() {
        let store = MemoryStore::new();
        store.seed_raw(PROFILE_SLOT, serde_json::json!({ "points": "fifty" }));
        assert!(store.load_profile().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn downloads_default_to_empty_and_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load_downloads().await.unwrap().is_empty());

        let mut downloads = DownloadSet::new();
        downloads.toggle("g1");
        store.save_downloads(&downloads).await.unwrap();
        assert!(store.load_downloads().await.unwrap().contains("g1"));
    }

    #[tokio::test]
    async fn analysis_cache_is_keyed_by_learner_name() {
        let store = MemoryStore::new();
        store.save_analysis("Meena", "Shabash!").await.unwrap();
        assert_eq!(
            store.load_analysis("Meena").await.unwrap(),
            Some("Shabash!".to_string())
        );
        assert!(store.load_analysis("Ravi").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn poisoned_lock_does_not_panic_later_callers() {
        let store = MemoryStore::new();
        store.save_profile(&sample_profile()).await.unwrap();

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.slots.lock().unwrap();
            panic!("induced holder failure");
        }));

        // The store stays usable after the poisoning panic.
        assert!(store.load_profile().await.unwrap().is_some());
        store.save_analysis("Meena", "still working").await.unwrap();
        assert_eq!(
            store.load_analysis("Meena").await.unwrap(),
            Some("still working".to_string())
        );
    }

    #[tokio::test]
    async fn clear_wipes_every_slot() {
        let store = MemoryStore::new();
        store.save_profile(&sample_profile()).await.unwrap();
        store.save_analysis("Meena", "text").await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load_profile().await.unwrap().is_none());
        assert!(store.load_analysis("Meena").await.unwrap().is_none());
    }
}

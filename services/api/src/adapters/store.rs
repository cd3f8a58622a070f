//! services/api/src/adapters/store.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ProfileStore` port from the `core` crate. Durable state is a handful of
//! JSON slots in a single key-value table, managed with `sqlx` over PostgreSQL.

use async_trait::async_trait;
use gurukul_core::domain::{DownloadSet, LearnerProfile};
use gurukul_core::ports::{PortError, PortResult, ProfileStore};
use sqlx::PgPool;
use tracing::warn;

pub const PROFILE_SLOT: &str = "profile";
pub const DOWNLOADS_SLOT: &str = "downloads";

/// The slot name holding the cached progress analysis for one learner.
pub fn analysis_slot(learner_name: &str) -> String {
    format!("analysis-cache:{}", learner_name)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ProfileStore` port.
#[derive(Clone)]
pub struct DbStore {
    pool: PgPool,
}

impl DbStore {
    /// Creates a new `DbStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn read_slot(&self, slot: &str) -> PortResult<Option<serde_json::Value>> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT value FROM app_state WHERE slot = $1")
                .bind(slot)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(row.map(|(value,)| value))
    }

    async fn write_slot(&self, slot: &str, value: serde_json::Value) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO app_state (slot, value) VALUES ($1, $2) \
             ON CONFLICT (slot) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(slot)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

//=========================================================================================
// `ProfileStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProfileStore for DbStore {
    async fn load_profile(&self) -> PortResult<Option<LearnerProfile>> {
        let Some(value) = self.read_slot(PROFILE_SLOT).await? else {
            return Ok(None);
        };
        // Malformed persisted state reads as absent; the app falls back to
        // onboarding instead of surfacing a parse error.
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
        self.write_slot(PROFILE_SLOT, value).await
    }

    async fn load_downloads(&self) -> PortResult<DownloadSet> {
        let Some(value) = self.read_slot(DOWNLOADS_SLOT).await? else {
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
        self.write_slot(DOWNLOADS_SLOT, value).await
    }

    async fn load_analysis(&self, learner_name: &str) -> PortResult<Option<String>> {
        let Some(value) = self.read_slot(&analysis_slot(learner_name)).await? else {
            return Ok(None);
        };
        match serde_json::from_value::<String>(value) {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                warn!("Cached analysis is malformed, treating as absent: {}", e);
                Ok(None)
            }
        }
    }

    async fn save_analysis(&self, learner_name: &str, text: &str) -> PortResult<()> {
        self.write_slot(
            &analysis_slot(learner_name),
            serde_json::Value::String(text.to_string()),
        )
        .await
    }

    async fn clear(&self) -> PortResult<()> {
        sqlx::query("DELETE FROM app_state")
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

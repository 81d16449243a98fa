//! Partitioned key-value session state.
//!
//! Persisted state lives in three independent partitions, each holding a
//! small number of scalar keys:
//! - `auth`: the access token
//! - `session`: the unseen-reminders flag
//! - `vehicle`: the last selected vehicle id
//!
//! Values are stored as opaque strings; the typed accessors on [`SessionDb`]
//! own the conversions. Reads of a missing key return `None`; a value that
//! fails to parse surfaces as [`AuthError::InvalidValue`] so the caller can
//! decide whether to absorb it.

use chrono::Utc;

use crate::db::SessionDb;
use crate::error::{AuthError, AuthResult};

/// Partition holding the access token.
pub const PARTITION_AUTH: &str = "auth";
/// Partition holding session-derived flags.
pub const PARTITION_SESSION: &str = "session";
/// Partition holding the vehicle-selection cache.
pub const PARTITION_VEHICLE: &str = "vehicle";

const KEY_ACCESS_TOKEN: &str = "access_token";
const KEY_UNSEEN_REMINDERS: &str = "unseen_reminders";
const KEY_SELECTED_VEHICLE: &str = "selected_vehicle_id";

/// Database row for session_state lookups.
#[derive(Debug, sqlx::FromRow)]
struct StateRow {
    value: String,
}

impl SessionDb {
    /// Get a raw value from a partition. Returns `None` if the key is unset.
    pub async fn get_value(&self, partition: &str, key: &str) -> AuthResult<Option<String>> {
        let row: Option<StateRow> =
            sqlx::query_as("SELECT value FROM session_state WHERE partition = ? AND key = ?")
                .bind(partition)
                .bind(key)
                .fetch_optional(self.pool())
                .await?;

        Ok(row.map(|r| r.value))
    }

    /// Store or update a raw value in a partition (upsert).
    pub async fn set_value(&self, partition: &str, key: &str, value: &str) -> AuthResult<()> {
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO session_state (partition, key, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (partition, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(partition)
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Remove a value from a partition. Removing a missing key is a no-op.
    pub async fn delete_value(&self, partition: &str, key: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM session_state WHERE partition = ? AND key = ?")
            .bind(partition)
            .bind(key)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Clear whole partitions in a single transaction, so a logout is atomic
    /// from the consumer's perspective.
    pub async fn clear_partitions(&self, partitions: &[&str]) -> AuthResult<()> {
        let mut tx = self.pool().begin().await?;

        for partition in partitions {
            sqlx::query("DELETE FROM session_state WHERE partition = ?")
                .bind(partition)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // === Typed accessors ===

    /// Get the stored access token, if any.
    pub async fn access_token(&self) -> AuthResult<Option<String>> {
        self.get_value(PARTITION_AUTH, KEY_ACCESS_TOKEN).await
    }

    /// Persist the access token. Tokens are replaced wholesale.
    pub async fn set_access_token(&self, token: &str) -> AuthResult<()> {
        self.set_value(PARTITION_AUTH, KEY_ACCESS_TOKEN, token).await
    }

    /// Remove the access token.
    pub async fn delete_access_token(&self) -> AuthResult<()> {
        self.delete_value(PARTITION_AUTH, KEY_ACCESS_TOKEN).await
    }

    /// Get the last selected vehicle id, if any.
    pub async fn selected_vehicle_id(&self) -> AuthResult<Option<i64>> {
        let raw = self.get_value(PARTITION_VEHICLE, KEY_SELECTED_VEHICLE).await?;

        match raw {
            None => Ok(None),
            Some(value) => value
                .parse::<i64>()
                .map(Some)
                .map_err(|_| AuthError::InvalidValue {
                    partition: PARTITION_VEHICLE.to_string(),
                    key: KEY_SELECTED_VEHICLE.to_string(),
                    value,
                }),
        }
    }

    /// Persist the selected vehicle id.
    pub async fn set_selected_vehicle_id(&self, id: i64) -> AuthResult<()> {
        self.set_value(PARTITION_VEHICLE, KEY_SELECTED_VEHICLE, &id.to_string())
            .await
    }

    /// Clear the selected vehicle id.
    pub async fn clear_selected_vehicle_id(&self) -> AuthResult<()> {
        self.delete_value(PARTITION_VEHICLE, KEY_SELECTED_VEHICLE).await
    }

    /// Get the unseen-reminders flag. Defaults to `false` when unset.
    pub async fn unseen_reminders(&self) -> AuthResult<bool> {
        let raw = self.get_value(PARTITION_SESSION, KEY_UNSEEN_REMINDERS).await?;

        match raw.as_deref() {
            None => Ok(false),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(AuthError::InvalidValue {
                partition: PARTITION_SESSION.to_string(),
                key: KEY_UNSEEN_REMINDERS.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Persist the unseen-reminders flag.
    pub async fn set_unseen_reminders(&self, unseen: bool) -> AuthResult<()> {
        let value = if unseen { "true" } else { "false" };
        self.set_value(PARTITION_SESSION, KEY_UNSEEN_REMINDERS, value)
            .await
    }

    /// Clear every partition (logout).
    pub async fn clear_all(&self) -> AuthResult<()> {
        self.clear_partitions(&[PARTITION_AUTH, PARTITION_SESSION, PARTITION_VEHICLE])
            .await
    }
}

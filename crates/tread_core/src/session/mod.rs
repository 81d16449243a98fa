//! Observable session state.
//!
//! [`SessionStore`] layers typed watch channels over the durable store in
//! `tread-auth`. Every persisted key gets its own channel: subscribers see
//! the current value at subscription time and then every change, in write
//! order. Writes hit the database first and only publish on success, so an
//! observer never sees a value that failed to persist.
//!
//! Read failures at load time are absorbed: the observer starts from the
//! default (absent token, no vehicle, flag false) rather than crashing.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use tread_auth::SessionDb;

use crate::error::Result;

struct SessionStoreInner {
    db: SessionDb,
    token_tx: watch::Sender<Option<String>>,
    vehicle_tx: watch::Sender<Option<i64>>,
    unseen_tx: watch::Sender<bool>,
}

/// Durable, observable storage for the session token, selected vehicle id,
/// and unseen-reminders flag.
///
/// Cheap to clone; all clones share the same state and channels.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_token", &self.inner.token_tx.borrow().is_some())
            .field("selected_vehicle", &*self.inner.vehicle_tx.borrow())
            .field("unseen_reminders", &*self.inner.unseen_tx.borrow())
            .finish()
    }
}

impl SessionStore {
    /// Open the store, seeding observers from persisted state.
    ///
    /// A value that cannot be read is logged and treated as absent/default.
    pub async fn open(db: SessionDb) -> Self {
        let token = match db.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read persisted token, treating as absent: {}", e);
                None
            }
        };

        let vehicle = match db.selected_vehicle_id().await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    "Failed to read persisted vehicle selection, treating as absent: {}",
                    e
                );
                None
            }
        };

        let unseen = match db.unseen_reminders().await {
            Ok(flag) => flag,
            Err(e) => {
                warn!("Failed to read unseen-reminders flag, defaulting false: {}", e);
                false
            }
        };

        let (token_tx, _) = watch::channel(token);
        let (vehicle_tx, _) = watch::channel(vehicle);
        let (unseen_tx, _) = watch::channel(unseen);

        Self {
            inner: Arc::new(SessionStoreInner {
                db,
                token_tx,
                vehicle_tx,
                unseen_tx,
            }),
        }
    }

    /// The underlying database handle.
    pub fn db(&self) -> &SessionDb {
        &self.inner.db
    }

    // === Access token ===

    /// Persist a new access token. The write is durable before observers
    /// are notified; a storage failure propagates and publishes nothing.
    pub async fn save_token(&self, token: &str) -> Result<()> {
        self.inner.db.set_access_token(token).await?;
        self.inner.token_tx.send_replace(Some(token.to_string()));
        Ok(())
    }

    /// Observable token stream. Each receiver replays the current value.
    pub fn current_token(&self) -> watch::Receiver<Option<String>> {
        self.inner.token_tx.subscribe()
    }

    /// Snapshot of the current token.
    pub fn token_now(&self) -> Option<String> {
        self.inner.token_tx.borrow().clone()
    }

    /// Remove the token; subsequent observations emit absent.
    pub async fn delete_token(&self) -> Result<()> {
        self.inner.db.delete_access_token().await?;
        self.inner.token_tx.send_replace(None);
        Ok(())
    }

    // === Selected vehicle ===

    /// Persist the selected vehicle id.
    pub async fn save_selected_vehicle(&self, id: i64) -> Result<()> {
        self.inner.db.set_selected_vehicle_id(id).await?;
        self.inner.vehicle_tx.send_replace(Some(id));
        Ok(())
    }

    /// Observable selected-vehicle stream.
    pub fn selected_vehicle(&self) -> watch::Receiver<Option<i64>> {
        self.inner.vehicle_tx.subscribe()
    }

    /// Snapshot of the current selection.
    pub fn selected_vehicle_now(&self) -> Option<i64> {
        *self.inner.vehicle_tx.borrow()
    }

    /// Clear the selection explicitly.
    pub async fn clear_selected_vehicle(&self) -> Result<()> {
        self.inner.db.clear_selected_vehicle_id().await?;
        self.inner.vehicle_tx.send_replace(None);
        Ok(())
    }

    // === Unseen-reminders flag ===

    /// Set or clear the unseen-reminders flag. Consumers acknowledge by
    /// setting it back to `false`; nothing clears it automatically.
    pub async fn set_unseen_reminders(&self, unseen: bool) -> Result<()> {
        self.inner.db.set_unseen_reminders(unseen).await?;
        self.inner.unseen_tx.send_replace(unseen);
        Ok(())
    }

    /// Observable unseen-reminders stream. Defaults to `false`.
    pub fn unseen_reminders(&self) -> watch::Receiver<bool> {
        self.inner.unseen_tx.subscribe()
    }

    /// Snapshot of the flag.
    pub fn unseen_reminders_now(&self) -> bool {
        *self.inner.unseen_tx.borrow()
    }

    /// The channel manager's write path for a push event.
    ///
    /// A push that races a logout is ignored: the flag is only set while a
    /// token is present, keeping "flag true" tied to an authenticated
    /// session.
    pub async fn flag_unseen_from_push(&self) -> Result<()> {
        if self.token_now().is_none() {
            debug!("Ignoring push event received with no session token");
            return Ok(());
        }
        self.set_unseen_reminders(true).await
    }

    // === Logout ===

    /// Clear all session state atomically and reset every observer to its
    /// default value.
    pub async fn clear_all(&self) -> Result<()> {
        self.inner.db.clear_all().await?;
        self.inner.token_tx.send_replace(None);
        self.inner.vehicle_tx.send_replace(None);
        self.inner.unseen_tx.send_replace(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SessionStore {
        let db = SessionDb::open_in_memory().await.unwrap();
        SessionStore::open(db).await
    }

    #[tokio::test]
    async fn test_subscriber_replays_current_value() {
        let store = store().await;
        store.save_token("abc.def.ghi").await.unwrap();

        // A subscriber arriving after the write still sees the value
        let rx = store.current_token();
        assert_eq!(*rx.borrow(), Some("abc.def.ghi".to_string()));
    }

    #[tokio::test]
    async fn test_observers_see_changes_in_write_order() {
        let store = store().await;
        let mut rx = store.selected_vehicle();
        assert_eq!(*rx.borrow_and_update(), None);

        store.save_selected_vehicle(5).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(5));

        store.save_selected_vehicle(7).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(7));
    }

    #[tokio::test]
    async fn test_delete_token_emits_absent() {
        let store = store().await;
        store.save_token("token").await.unwrap();

        let mut rx = store.current_token();
        assert!(rx.borrow_and_update().is_some());

        store.delete_token().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let db = SessionDb::open_in_memory().await.unwrap();
        let store = SessionStore::open(db.clone()).await;
        store.save_token("persisted").await.unwrap();
        store.save_selected_vehicle(9).await.unwrap();
        drop(store);

        // Same database, fresh store: watch state is rebuilt from disk
        let reopened = SessionStore::open(db).await;
        assert_eq!(reopened.token_now(), Some("persisted".to_string()));
        assert_eq!(reopened.selected_vehicle_now(), Some(9));
    }

    #[tokio::test]
    async fn test_push_flag_requires_token() {
        let store = store().await;

        // No token: the push is ignored
        store.flag_unseen_from_push().await.unwrap();
        assert!(!store.unseen_reminders_now());

        store.save_token("token").await.unwrap();
        store.flag_unseen_from_push().await.unwrap();
        assert!(store.unseen_reminders_now());

        // Repeated pushes are idempotent
        store.flag_unseen_from_push().await.unwrap();
        assert!(store.unseen_reminders_now());

        // Only explicit acknowledgment clears it
        store.set_unseen_reminders(false).await.unwrap();
        assert!(!store.unseen_reminders_now());
    }

    #[tokio::test]
    async fn test_clear_all_resets_observers() {
        let store = store().await;
        store.save_token("token").await.unwrap();
        store.save_selected_vehicle(3).await.unwrap();
        store.set_unseen_reminders(true).await.unwrap();

        let mut token_rx = store.current_token();
        let mut vehicle_rx = store.selected_vehicle();
        let mut unseen_rx = store.unseen_reminders();
        token_rx.borrow_and_update();
        vehicle_rx.borrow_and_update();
        unseen_rx.borrow_and_update();

        store.clear_all().await.unwrap();

        token_rx.changed().await.unwrap();
        assert!(token_rx.borrow_and_update().is_none());
        vehicle_rx.changed().await.unwrap();
        assert!(vehicle_rx.borrow_and_update().is_none());
        unseen_rx.changed().await.unwrap();
        assert!(!*unseen_rx.borrow_and_update());

        // And the database agrees
        assert!(store.db().access_token().await.unwrap().is_none());
    }
}

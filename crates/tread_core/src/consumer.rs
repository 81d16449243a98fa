//! Session-derived consumers.
//!
//! Screens and indicators are external to this crate; what lives here is
//! the reusable reaction to session changes: a background task that keeps
//! some vehicle-scoped data fresh as the selected vehicle changes, and the
//! acknowledgment contract for the unseen-reminders flag (consumers clear
//! it with [`SessionStore::set_unseen_reminders`]; nothing clears it
//! automatically).

use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::session::SessionStore;

/// Handle to a vehicle-scoped fetch task.
///
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct VehicleScopedHandle<T> {
    data_rx: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

impl<T> VehicleScopedHandle<T> {
    /// Observable fetched data. `None` while no vehicle is selected or a
    /// fetch is in flight.
    pub fn data(&self) -> watch::Receiver<Option<T>> {
        self.data_rx.clone()
    }

    /// Stop reacting to selection changes.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl<T> Drop for VehicleScopedHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Keep vehicle-scoped data fresh as the selection changes.
///
/// On every change of the selected vehicle the published state resets to
/// `None`, any fetch still in flight for the previous id is cancelled, and
/// a fresh fetch is issued for the new id (if one is selected). The fetch
/// future is dropped on cancellation, so a late result for a previous
/// vehicle can never overwrite state belonging to the current one.
///
/// Fetch failures are logged and leave the published state at `None`; the
/// next selection change (or a manual re-trigger by re-saving the
/// selection) retries.
pub fn watch_selected_vehicle<T, F, Fut>(
    session: &SessionStore,
    fetch: F,
) -> VehicleScopedHandle<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(i64) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::error::Result<T>> + Send + 'static,
{
    let (data_tx, data_rx) = watch::channel(None);
    let mut vehicle_rx = session.selected_vehicle();

    let task = tokio::spawn(async move {
        loop {
            let current = *vehicle_rx.borrow_and_update();
            data_tx.send_replace(None);

            if let Some(id) = current {
                debug!("Fetching data for vehicle {}", id);
                tokio::select! {
                    changed = vehicle_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        // Selection moved on; the in-flight fetch is
                        // dropped with this select arm losing.
                        continue;
                    }
                    result = fetch(id) => match result {
                        Ok(data) => {
                            data_tx.send_replace(Some(data));
                        }
                        Err(e) => {
                            warn!("Fetch for vehicle {} failed: {}", id, e);
                        }
                    },
                }
            }

            if vehicle_rx.changed().await.is_err() {
                break;
            }
        }
    });

    VehicleScopedHandle { data_rx, task }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tread_auth::SessionDb;

    use super::*;
    use crate::error::CoreError;

    async fn session() -> SessionStore {
        // Establishing the SQLite connection awaits a real worker thread;
        // under the paused clock the pool's acquire timeout would
        // auto-advance and fire first, so run setup in real time.
        tokio::time::resume();
        let db = SessionDb::open_in_memory().await.unwrap();
        let store = SessionStore::open(db).await;
        tokio::time::pause();
        store
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_current_selection() {
        let session = session().await;
        session.save_selected_vehicle(5).await.unwrap();

        let handle = watch_selected_vehicle(&session, |id| async move {
            Ok(format!("data-for-{}", id))
        });

        let mut data = handle.data();
        data.wait_for(|d| d.is_some()).await.unwrap();
        assert_eq!(data.borrow().as_deref(), Some("data-for-5"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_cancels_stale_fetch() {
        let session = session().await;
        session.save_selected_vehicle(5).await.unwrap();

        // The fetch for vehicle 5 never finishes on its own; vehicle 7
        // answers immediately
        let handle = watch_selected_vehicle(&session, |id| async move {
            if id == 5 {
                futures::future::pending::<()>().await;
            }
            Ok(format!("data-for-{}", id))
        });

        // Switch before the id=5 fetch completes
        tokio::task::yield_now().await;
        session.save_selected_vehicle(7).await.unwrap();

        let mut data = handle.data();
        data.wait_for(|d| d.is_some()).await.unwrap();
        assert_eq!(data.borrow().as_deref(), Some("data-for-7"));

        // The cancelled id=5 fetch can never land late
        tokio::time::sleep(Duration::from_secs(200)).await;
        assert_eq!(handle.data().borrow().as_deref(), Some("data-for-7"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_selection_resets_state() {
        let session = session().await;
        session.save_selected_vehicle(5).await.unwrap();

        let handle =
            watch_selected_vehicle(&session, |id| async move { Ok(format!("data-for-{}", id)) });

        let mut data = handle.data();
        data.wait_for(|d| d.is_some()).await.unwrap();

        session.clear_selected_vehicle().await.unwrap();
        data.wait_for(|d| d.is_none()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_leaves_state_empty() {
        let session = session().await;
        session.save_selected_vehicle(5).await.unwrap();

        let handle = watch_selected_vehicle(&session, |_id| async move {
            Err::<String, _>(CoreError::channel("fetch", "boom"))
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(handle.data().borrow().is_none());
    }
}

//! Session-scoped real-time channel to the reminder notification hub.
//!
//! [`ChannelManager`] owns a single live connection per instance,
//! authenticated with the current session token. It establishes the
//! connection, watches for drops, and re-establishes it after a backoff
//! delay without caller intervention. The only observable side effect of a
//! push is the unseen-reminders flag in the [`SessionStore`].
//!
//! All connection state is serialized through one supervisor task; the
//! manager handle only signals it (`start`/`stop`), so concurrent callers
//! cannot race on the connection itself.

mod backoff;
mod inner;
mod transport;


use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{oneshot, watch};
use tracing::debug;

use crate::session::SessionStore;

use inner::ChannelInner;

pub use backoff::BackoffPolicy;
pub use transport::{EventStream, HubEvent, HubTransport, WebSocketTransport};

/// Lifecycle state of the hub connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Not started, stopped, or gave up for lack of a token.
    Idle,
    /// Handshake in progress.
    Connecting,
    /// Live connection, events flowing.
    Connected,
    /// Connection lost; waiting out the backoff delay before retrying.
    ReconnectWait,
}

/// Manager for the real-time reminder channel.
///
/// Cheap to clone; all clones control the same connection.
#[derive(Clone)]
pub struct ChannelManager {
    inner: Arc<ChannelInner>,
}

impl std::fmt::Debug for ChannelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelManager")
            .field("endpoint", &self.inner.endpoint)
            .field("state", &self.state())
            .finish()
    }
}

impl ChannelManager {
    /// Create a manager for the given hub endpoint using the production
    /// WebSocket transport and the default (fixed 5 s) backoff.
    pub fn new(endpoint: impl Into<String>, session: SessionStore) -> Self {
        Self::with_transport(endpoint, session, Arc::new(WebSocketTransport))
    }

    /// Create a manager with a custom transport (used by tests).
    pub fn with_transport(
        endpoint: impl Into<String>,
        session: SessionStore,
        transport: Arc<dyn HubTransport>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ChannelState::Idle);
        Self {
            inner: Arc::new(ChannelInner {
                endpoint: endpoint.into(),
                session,
                transport,
                backoff: BackoffPolicy::default(),
                state_tx,
                shutdown_tx: RwLock::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Replace the backoff policy. Only meaningful before `start()`.
    pub fn with_backoff(self, backoff: BackoffPolicy) -> Self {
        let (state_tx, _) = watch::channel(ChannelState::Idle);
        Self {
            inner: Arc::new(ChannelInner {
                endpoint: self.inner.endpoint.clone(),
                session: self.inner.session.clone(),
                transport: Arc::clone(&self.inner.transport),
                backoff,
                state_tx,
                shutdown_tx: RwLock::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Start the channel. Idempotent: a no-op while the supervisor is
    /// already running (Connecting or Connected). If no token is present
    /// the supervisor exits straight back to Idle without retrying.
    pub fn start(&self) {
        let mut guard = self.inner.shutdown_tx.write();
        if guard.is_some() {
            debug!("Reminder channel already running; start() is a no-op");
            return;
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        *guard = Some((generation, tx));
        drop(guard);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            inner.supervisor_loop(generation, rx).await;
        });
    }

    /// Stop the channel. Cancels any in-flight attempt or backoff wait
    /// cooperatively; no further automatic reconnection happens until
    /// `start()` is called again.
    pub fn stop(&self) {
        if let Some((_, tx)) = self.inner.shutdown_tx.write().take() {
            let _ = tx.send(());
        }
        self.inner.state_tx.send_replace(ChannelState::Idle);
    }

    /// Current connection state.
    pub fn state(&self) -> ChannelState {
        *self.inner.state_tx.borrow()
    }

    /// Observable state stream, mainly for tests and indicators.
    pub fn state_changes(&self) -> watch::Receiver<ChannelState> {
        self.inner.state_tx.subscribe()
    }
}

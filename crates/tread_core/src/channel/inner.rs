//! ChannelInner - shared state and the connect/retry loop.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::RwLock;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};
use url::Url;

use crate::session::SessionStore;

use super::backoff::BackoffPolicy;
use super::transport::{HubEvent, HubTransport};
use super::ChannelState;

/// The one event the hub pushes; receiving it means the reminder list
/// changed server-side.
pub(super) const REMINDERS_UPDATED_EVENT: &str = "UpdateReminders";

/// Inner state shared between the ChannelManager handle and its
/// supervisor task. All connection state is owned by the supervisor; the
/// handle only signals it.
pub(super) struct ChannelInner {
    pub endpoint: String,
    pub session: SessionStore,
    pub transport: Arc<dyn HubTransport>,
    pub backoff: BackoffPolicy,
    pub state_tx: watch::Sender<ChannelState>,
    /// Shutdown sender for the current supervisor, tagged with its
    /// generation so a stale supervisor's cleanup cannot clobber a
    /// successor spawned by a quick stop()/start() sequence.
    pub shutdown_tx: RwLock<Option<(u64, oneshot::Sender<()>)>>,
    pub generation: AtomicU64,
}

impl ChannelInner {
    /// Build the connection URL, carrying the access token as a query
    /// parameter.
    fn hub_url(&self, token: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut().append_pair("access_token", token);
        Ok(url)
    }

    /// Supervisor loop: connect, consume events, back off, retry.
    ///
    /// Exits when `stop()` fires the shutdown channel, or immediately when
    /// no token is available (no retry in that case). Connection failures
    /// are logged and retried; none are surfaced to callers.
    pub(super) async fn supervisor_loop(
        self: Arc<Self>,
        generation: u64,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let mut attempt: u32 = 0;

        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            // Token gates the connection: absent or blank means stay idle,
            // no reconnect scheduled.
            let token = self
                .session
                .token_now()
                .filter(|t| !t.trim().is_empty());
            let Some(token) = token else {
                info!("No session token; reminder channel staying idle");
                break;
            };

            self.state_tx.send_replace(ChannelState::Connecting);

            let url = match self.hub_url(&token) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Invalid hub endpoint {}: {}", self.endpoint, e);
                    break;
                }
            };

            let connected = tokio::select! {
                result = self.transport.connect(&url) => result,
                _ = &mut shutdown_rx => break,
            };

            match connected {
                Ok(mut events) => {
                    info!("Reminder channel connected to {}", self.endpoint);
                    attempt = 0;
                    self.state_tx.send_replace(ChannelState::Connected);

                    // Consume events until the connection drops or stop()
                    // is called.
                    let dropped = loop {
                        tokio::select! {
                            maybe = events.next() => match maybe {
                                Some(Ok(event)) => self.handle_event(&event).await,
                                Some(Err(e)) => {
                                    warn!("Reminder channel lost: {}", e);
                                    break true;
                                }
                                None => {
                                    warn!("Reminder channel stream ended");
                                    break true;
                                }
                            },
                            _ = &mut shutdown_rx => break false,
                        }
                    };

                    if !dropped {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Reminder channel handshake failed: {}", e);
                }
            }

            let delay = self.backoff.delay(attempt);
            attempt = attempt.saturating_add(1);
            self.state_tx.send_replace(ChannelState::ReconnectWait);
            debug!("Reminder channel reconnecting in {:?}", delay);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown_rx => break,
            }
        }

        // Allow a later start() to spawn a fresh supervisor. If stop()
        // already handed the slot to a successor, leave it alone.
        let mut guard = self.shutdown_tx.write();
        let still_owner = matches!(&*guard, Some((g, _)) if *g == generation);
        if still_owner {
            guard.take();
        }
        drop(guard);

        if still_owner {
            self.state_tx.send_replace(ChannelState::Idle);
        }
    }

    /// The only side effect of a push event: mark reminders as unseen.
    /// No payload parsing beyond the event name.
    async fn handle_event(&self, event: &HubEvent) {
        if event.name == REMINDERS_UPDATED_EVENT {
            if let Err(e) = self.session.flag_unseen_from_push().await {
                warn!("Failed to record push event: {}", e);
            }
        } else {
            debug!("Ignoring unknown hub event '{}'", event.name);
        }
    }
}

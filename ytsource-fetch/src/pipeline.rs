//! Client dispatch pipeline.
//!
//! The pipeline tries clients strictly in registration order, one at a time,
//! and stops at the first client that produces an item. Client faults are
//! isolated: they are recorded and the next client is tried, unless the fault
//! says the content can never be played.

use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use ytsource_core::{AudioItem, LoadRequest};

use crate::context::OAUTH_CLIENT_ATTRIBUTE;
use crate::error::{ClientError, ClientFailure, HttpError};
use crate::host::http::HttpInterface;
use crate::strategy::{Client, ClientInfo, ClientResult};

// ============================================================================
// Client Attempt
// ============================================================================

/// What happened when a client was asked to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptStatus {
    /// The client declined the identifier.
    Declined,
    /// The client found nothing.
    Empty,
    /// The client produced an item.
    Loaded,
    /// The client failed; the next client was tried.
    Failed(String),
    /// The client reported permanently unplayable content.
    Unrecoverable(String),
}

impl AttemptStatus {
    /// Returns a short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Declined => "declined",
            Self::Empty => "empty",
            Self::Loaded => "loaded",
            Self::Failed(_) => "failed",
            Self::Unrecoverable(_) => "unrecoverable",
        }
    }

    /// Returns the error message, if the attempt failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(e) | Self::Unrecoverable(e) => Some(e),
            _ => None,
        }
    }
}

/// Record of a single client attempt.
#[derive(Debug, Clone)]
pub struct ClientAttempt {
    /// The client identifier.
    pub client: String,
    /// What happened.
    pub status: AttemptStatus,
    /// How long the attempt took.
    pub duration: Duration,
}

impl ClientAttempt {
    fn new(client: &str, status: AttemptStatus, duration: Duration) -> Self {
        Self {
            client: client.to_string(),
            status,
            duration,
        }
    }
}

// ============================================================================
// Dispatch Error
// ============================================================================

/// Terminal dispatch failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A client reported permanently unplayable content.
    #[error("Client \"{client}\" reported unplayable content")]
    Unrecoverable {
        /// Reporting client.
        client: String,
        /// The unrecoverable error.
        #[source]
        error: ClientError,
    },

    /// No client produced an item and at least one failed.
    #[error("All clients failed, last was \"{}\"", .last.client)]
    AllFailed {
        /// The most recent failure, which is the primary cause.
        #[source]
        last: ClientFailure,
        /// Earlier failures, oldest first.
        suppressed: Vec<ClientFailure>,
    },
}

impl DispatchError {
    /// Returns true if the content can never be played.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::Unrecoverable { .. })
    }

    /// Returns the primary client error.
    pub fn primary(&self) -> &ClientError {
        match self {
            Self::Unrecoverable { error, .. } => error,
            Self::AllFailed { last, .. } => &last.error,
        }
    }

    /// Returns the identifier of the client behind the primary error.
    pub fn client(&self) -> &str {
        match self {
            Self::Unrecoverable { client, .. } => client,
            Self::AllFailed { last, .. } => &last.client,
        }
    }

    /// Returns earlier failures kept as secondary context.
    pub fn suppressed(&self) -> &[ClientFailure] {
        match self {
            Self::Unrecoverable { .. } => &[],
            Self::AllFailed { suppressed, .. } => suppressed,
        }
    }
}

// ============================================================================
// Dispatch Outcome
// ============================================================================

/// The outcome of one dispatch.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// The item, `None` for no match, or the terminal error.
    pub result: Result<Option<AudioItem>, DispatchError>,
    /// Every client consulted, in order.
    pub attempts: Vec<ClientAttempt>,
    /// Faults recorded before a successful client, kept as secondary context.
    pub suppressed: Vec<ClientFailure>,
    /// Total duration.
    pub duration: Duration,
}

impl DispatchOutcome {
    /// Returns true if an item was loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self.result, Ok(Some(_)))
    }

    /// Returns the identifier of the client that loaded the item.
    pub fn loaded_by(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.status == AttemptStatus::Loaded)
            .map(|a| a.client.as_str())
    }

    /// Returns all error messages from the attempts.
    pub fn errors(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter_map(|a| a.status.error())
            .collect()
    }
}

// ============================================================================
// Client Pipeline
// ============================================================================

/// An ordered list of clients tried in turn.
///
/// The order is fixed at construction. Clients are shared read-only between
/// concurrent dispatches.
#[derive(Clone, Default)]
pub struct ClientPipeline {
    clients: Vec<Arc<dyn Client>>,
}

impl ClientPipeline {
    /// Creates a pipeline with the given clients, in order.
    pub fn new(clients: Vec<Arc<dyn Client>>) -> Self {
        Self { clients }
    }

    /// Returns the clients in dispatch order.
    pub fn clients(&self) -> &[Arc<dyn Client>] {
        &self.clients
    }

    /// Returns the number of clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if the pipeline has no clients.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Finds a client by identifier.
    pub fn client(&self, identifier: &str) -> Option<&Arc<dyn Client>> {
        self.clients.iter().find(|c| c.identifier() == identifier)
    }

    /// Returns reporting info for every client.
    pub fn client_info(&self) -> Vec<ClientInfo> {
        self.clients
            .iter()
            .map(|c| ClientInfo::from_client(c.as_ref()))
            .collect()
    }

    /// Returns true if any client accepts OAuth tokens.
    pub fn any_supports_oauth(&self) -> bool {
        self.clients.iter().any(|c| c.supports_oauth())
    }

    /// Forwards the playlist page count to every client.
    pub fn set_playlist_page_count(&self, count: u32) {
        for client in &self.clients {
            client.set_playlist_page_count(count);
        }
    }

    /// Dispatches `request` across the clients.
    ///
    /// For each client in order: skip it if it declines `identifier`, tag the
    /// context with its OAuth capability, then load. The first item wins. An
    /// unrecoverable error stops immediately. Other errors are recorded and
    /// the next client is tried; if none succeeds, the last error is primary.
    #[instrument(skip(self, http), fields(clients = self.clients.len(), operation = request.operation()))]
    pub async fn dispatch(
        &self,
        http: &mut HttpInterface,
        identifier: &str,
        request: &LoadRequest,
    ) -> DispatchOutcome {
        let start = Instant::now();
        let mut attempts = Vec::with_capacity(self.clients.len());
        let mut failures: Vec<ClientFailure> = Vec::new();

        for client in &self.clients {
            let client_id = client.identifier();

            if http.is_cancelled() {
                debug!(client = %client_id, "Interface cancelled, stopping dispatch");
                let error = ClientError::Http(HttpError::Cancelled);
                attempts.push(ClientAttempt::new(
                    client_id,
                    AttemptStatus::Failed(error.to_string()),
                    Duration::ZERO,
                ));
                failures.push(ClientFailure::new(client_id, error));
                break;
            }

            if !client.can_handle_request(identifier) {
                debug!(client = %client_id, "Client declined identifier, skipping");
                attempts.push(ClientAttempt::new(
                    client_id,
                    AttemptStatus::Declined,
                    Duration::ZERO,
                ));
                continue;
            }

            http.context_mut()
                .set_flag(OAUTH_CLIENT_ATTRIBUTE, client.supports_oauth());

            let attempt_start = Instant::now();
            debug!(client = %client_id, %request, "Dispatching to client");

            let result = load(client.as_ref(), http, request).await;
            let duration = attempt_start.elapsed();

            match result {
                Ok(Some(item)) => {
                    info!(
                        client = %client_id,
                        kind = %item.kind(),
                        duration = ?duration,
                        "Client loaded item"
                    );
                    attempts.push(ClientAttempt::new(client_id, AttemptStatus::Loaded, duration));

                    return DispatchOutcome {
                        result: Ok(Some(item)),
                        attempts,
                        suppressed: failures,
                        duration: start.elapsed(),
                    };
                }
                Ok(None) => {
                    debug!(client = %client_id, "Client found nothing");
                    attempts.push(ClientAttempt::new(client_id, AttemptStatus::Empty, duration));
                }
                Err(error) if error.is_unrecoverable() => {
                    warn!(client = %client_id, error = %error, "Content cannot be loaded");
                    attempts.push(ClientAttempt::new(
                        client_id,
                        AttemptStatus::Unrecoverable(error.to_string()),
                        duration,
                    ));

                    return DispatchOutcome {
                        result: Err(DispatchError::Unrecoverable {
                            client: client_id.to_string(),
                            error,
                        }),
                        attempts,
                        suppressed: failures,
                        duration: start.elapsed(),
                    };
                }
                Err(error) => {
                    debug!(
                        client = %client_id,
                        error = %error,
                        duration = ?duration,
                        "Client failed, trying next"
                    );
                    attempts.push(ClientAttempt::new(
                        client_id,
                        AttemptStatus::Failed(error.to_string()),
                        duration,
                    ));
                    failures.push(ClientFailure::new(client_id, error));
                }
            }
        }

        let result = match failures.pop() {
            Some(last) => {
                warn!(client = %last.client, failed = failures.len() + 1, "No client could load the item");
                Err(DispatchError::AllFailed {
                    last,
                    suppressed: std::mem::take(&mut failures),
                })
            }
            None => {
                debug!("No client produced an item");
                Ok(None)
            }
        };

        DispatchOutcome {
            result,
            attempts,
            suppressed: failures,
            duration: start.elapsed(),
        }
    }
}

impl std::fmt::Debug for ClientPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.clients.iter().map(|c| c.identifier()))
            .finish()
    }
}

async fn load(client: &dyn Client, http: &mut HttpInterface, request: &LoadRequest) -> ClientResult {
    match request {
        LoadRequest::Video { video_id } => client.load_video(http, video_id).await,
        LoadRequest::Playlist {
            playlist_id,
            selected_video_id,
        } => {
            client
                .load_playlist(http, playlist_id, selected_video_id.as_deref())
                .await
        }
        LoadRequest::Mix { mix_id, video_id } => client.load_mix(http, mix_id, video_id).await,
        LoadRequest::Search { query } => client.load_search(http, query).await,
        LoadRequest::MusicSearch { query } => client.load_search_music(http, query).await,
    }
}

// ============================================================================
// Tests
// ============================================================================

// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # ytsource Fetch
//!
//! HTTP plumbing, client strategies and the dispatch pipeline.
//!
//! ## Host APIs
//!
//! - [`host::http`] - shared transport and scoped per-resolution interfaces
//! - [`proxy`] - one-time proxy configuration of the transport
//! - [`auth`] - cookie stripping, visitor data and OAuth bearer tokens
//!
//! ## Dispatch
//!
//! - [`strategy::Client`] - trait for upstream API surfaces
//! - [`pipeline::ClientPipeline`] - tries clients in order
//! - [`retry`] - transient network fault classification
//!
//! ## Example
//!
//! ```ignore
//! use ytsource_fetch::{ClientPipeline, HttpInterfaceManager};
//! use ytsource_core::LoadRequest;
//!
//! let manager = HttpInterfaceManager::builder().build()?;
//! let pipeline = ClientPipeline::new(vec![Arc::new(MusicClient::new()), Arc::new(WebClient::new())]);
//!
//! let mut http = manager.interface();
//! let outcome = pipeline
//!     .dispatch(&mut http, "dQw4w9WgXcQ", &LoadRequest::video("dQw4w9WgXcQ"))
//!     .await;
//! ```

pub mod auth;
pub mod context;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod proxy;
pub mod retry;
pub mod strategy;

// Errors
pub use error::{BoxError, ClientError, ClientFailure, HttpError};

// Host APIs
pub use auth::{AccessTokenTracker, OAuth2Handler, YoutubeContextFilter};
pub use context::{AttributeValue, OAUTH_CLIENT_ATTRIBUTE, RequestContext};
pub use host::{
    HttpContextFilter, HttpInterface, HttpInterfaceManager, HttpInterfaceManagerBuilder,
    ResponseExt, TransportConfig,
};
pub use proxy::{PROXY_SCHEMES, ProxyHandler, ProxySettings};

// Strategy & Pipeline
pub use pipeline::{AttemptStatus, ClientAttempt, ClientPipeline, DispatchError, DispatchOutcome};
pub use retry::{TransientCause, classify_network_error, is_retriable_network_error};
pub use strategy::{
    Client, ClientInfo, ClientResult, DEFAULT_PLAYLIST_PAGE_COUNT, PlaylistPageCount,
};

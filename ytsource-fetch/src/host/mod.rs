//! Host APIs for ytsource clients.
//!
//! - [`http`] - Scoped HTTP interfaces with context filters and redirect tracking

pub mod http;

// Re-export key types
pub use http::{
    HttpContextFilter, HttpInterface, HttpInterfaceManager, HttpInterfaceManagerBuilder,
    ResponseExt, TransportConfig,
};

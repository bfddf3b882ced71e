//! Transient network fault classification.
//!
//! Only a fixed set of transport conditions count as transient: the peer
//! resetting or closing the connection before the response completed, and
//! timeouts. Everything else is reported without retry.

use std::error::Error;
use std::fmt;
use std::io;

/// Message fragments emitted by transports that do not expose an `io::Error`.
const TRANSIENT_MESSAGES: &[(&str, TransientCause)] = &[
    ("connection reset", TransientCause::ConnectionReset),
    (
        "connection closed before message completed",
        TransientCause::PrematureClose,
    ),
    ("unexpected end of file", TransientCause::PrematureClose),
    ("broken pipe", TransientCause::ConnectionReset),
];

/// A transport condition worth one more attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientCause {
    /// Peer reset or aborted the connection.
    ConnectionReset,
    /// Connection closed before the response was complete.
    PrematureClose,
    /// Request or read timed out.
    Timeout,
}

impl TransientCause {
    /// Returns a short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConnectionReset => "connection reset",
            Self::PrematureClose => "premature close",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for TransientCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Walks the source chain of `error` and returns the first transient cause.
pub fn classify_network_error(error: &(dyn Error + 'static)) -> Option<TransientCause> {
    let mut current: Option<&(dyn Error + 'static)> = Some(error);

    while let Some(err) = current {
        if let Some(cause) = classify_single(err) {
            return Some(cause);
        }
        current = err.source();
    }

    None
}

/// Returns true if `error` (or anything in its source chain) is transient.
pub fn is_retriable_network_error(error: &(dyn Error + 'static)) -> bool {
    classify_network_error(error).is_some()
}

fn classify_single(err: &(dyn Error + 'static)) -> Option<TransientCause> {
    if let Some(io_err) = err.downcast_ref::<io::Error>() {
        return match io_err.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Some(TransientCause::ConnectionReset),
            io::ErrorKind::UnexpectedEof => Some(TransientCause::PrematureClose),
            io::ErrorKind::TimedOut => Some(TransientCause::Timeout),
            _ => None,
        };
    }

    if let Some(req_err) = err.downcast_ref::<reqwest::Error>() {
        if req_err.is_timeout() {
            return Some(TransientCause::Timeout);
        }
    }

    let message = err.to_string().to_ascii_lowercase();
    TRANSIENT_MESSAGES
        .iter()
        .find(|(fragment, _)| message.contains(fragment))
        .map(|(_, cause)| *cause)
}

//! Net Error Types

use thiserror::Error;

/// Errors raised by the session machinery itself.
///
/// Transport failures are reported separately through
/// [`TransportError`](super::transport::TransportError) and routed to the
/// controller's `on_error` callback rather than returned to callers.
#[derive(Debug, Error)]
pub enum NetError {
    /// `start()` was called on a session whose tasks are already running.
    /// The transport halves are consumed on first start, so this is a
    /// caller precondition violation.
    #[error("session tasks already started")]
    AlreadyStarted,
}

//! Design-level error taxonomy (§7). Kinds, not specific upstream messages.

use thiserror::Error;

/// Errors surfaced by the data-plane's repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from calling the data-plane as a client (worker, manager).
#[derive(Debug, Error)]
pub enum DataPlaneError {
    #[error("data-plane unreachable: {0}")]
    Unreachable(String),

    #[error("not found")]
    NotFound,

    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors from the upstream XMPP-over-WebSocket session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("auth expired (not-authorized)")]
    AuthExpired,

    #[error("transport lost: {0}")]
    TransportLost(String),

    #[error("entity gone: {0}")]
    EntityGone(String),

    #[error("missing chat-session credential")]
    MissingCredential,

    #[error("malformed stanza: {0}")]
    MalformedStanza(String),
}

/// Errors from the upstream admin HTTP API (delete/mute).
#[derive(Debug, Error)]
pub enum AdminApiError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// A config value from the data-plane failed schema validation (§4.3 M3)
/// and a safe default was substituted.
#[derive(Debug, Error)]
#[error("malformed config for {field}: {reason}")]
pub struct ConfigMalformed {
    pub field: String,
    pub reason: String,
}

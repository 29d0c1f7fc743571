use thiserror::Error;

/// Errors from store operations (used by trait definitions in luxchat-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("version conflict: stored transcript changed since read")]
    VersionConflict,
}

/// Errors surfaced by the session service for one request cycle.
///
/// Retry guidance per variant:
/// - `InvalidRequest`, `TargetNotFound`: caller must correct the request.
/// - `StorageUnavailable`, `CompletionFailed`: transient, the whole request
///   is safe to retry (no transcript mutation happened).
/// - `PersistenceFailed`: the reply was already produced; log and reconcile,
///   never retry the gateway call.
/// - `ConflictRetry`: optimistic-concurrency loser after exhausting
///   retries; retry the append with freshly read state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("target not found")]
    TargetNotFound,

    #[error("storage unavailable")]
    StorageUnavailable,

    #[error("persistence failed after reply was generated")]
    PersistenceFailed,

    #[error("completion failed: {0}")]
    CompletionFailed(String),

    #[error("append conflict, retry with fresh state")]
    ConflictRetry,
}

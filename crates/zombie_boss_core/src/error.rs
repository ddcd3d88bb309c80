use thiserror::Error;

use crate::validation::ValidationError;

/// Failure reported by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The request to the backing store did not succeed.
    #[error("{0}")]
    Backend(String),
    /// The item exists but does not have the expected shape.
    #[error("{0}")]
    Malformed(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Refused increment: the counter would leave the `i64` range.
    pub fn count_overflow(delta: i64) -> Self {
        Self::Backend(format!("incrementing count by {delta} would overflow"))
    }
}

/// Error returned by every counter and registration operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("no count found")]
    NotFound,
    #[error("failed to {action}: malformed stored data: {detail}")]
    MalformedData { action: &'static str, detail: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// HTTP status the handler layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Validation(_) => 400,
            Self::MalformedData { .. } | Self::Store { .. } => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// Wraps a store failure with the action that was being attempted.
pub(crate) fn store_failure(action: &'static str) -> impl FnOnce(StoreError) -> ServiceError {
    move |source| match source {
        StoreError::Malformed(detail) => ServiceError::MalformedData { action, detail },
        source => ServiceError::Store { action, source },
    }
}

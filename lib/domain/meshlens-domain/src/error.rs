//! Error taxonomy shared by every layer.
//!
//! Collaborators report [`CollaboratorError`]; request handling wraps it in a
//! [`ServiceError`] variant that records where the failure happened. The
//! variant set is closed so the status table in the application layer stays
//! exhaustive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorErrorKind {
    NotFound,
    Forbidden,
    Unavailable,
    Internal,
}

/// Failure reported by an external collaborator (registry, validations, metrics).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct CollaboratorError {
    pub kind: CollaboratorErrorKind,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(kind: CollaboratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::Forbidden, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::Unavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::Internal, message)
    }
}

/// Fieldless discriminant of [`ServiceError`], used for logging and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Initialization,
    BadRequest,
    NamespaceLookup,
    EntityLookup,
    ValidationFetch,
    MetricsBackend,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::BadRequest => "bad_request",
            Self::NamespaceLookup => "namespace_lookup",
            Self::EntityLookup => "entity_lookup",
            Self::ValidationFetch => "validation_fetch",
            Self::MetricsBackend => "metrics_backend",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Services initialization error: {0}")]
    Initialization(#[source] CollaboratorError),

    #[error("{message}")]
    BadRequest { param: String, message: String },

    #[error("Namespace lookup error: {0}")]
    NamespaceLookup(#[source] CollaboratorError),

    #[error("{0}")]
    EntityLookup(#[source] CollaboratorError),

    #[error("{0}")]
    ValidationFetch(#[source] CollaboratorError),

    #[error("Metrics backend error: {0}")]
    MetricsBackend(#[source] CollaboratorError),
}

impl ServiceError {
    /// Bad request naming the offending query parameter.
    pub fn bad_request(param: impl Into<String>, reason: impl AsRef<str>) -> Self {
        let param = param.into();
        let message = format!(
            "bad request, query parameter '{param}' {}",
            reason.as_ref()
        );
        Self::BadRequest { param, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Initialization(_) => ErrorKind::Initialization,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::NamespaceLookup(_) => ErrorKind::NamespaceLookup,
            Self::EntityLookup(_) => ErrorKind::EntityLookup,
            Self::ValidationFetch(_) => ErrorKind::ValidationFetch,
            Self::MetricsBackend(_) => ErrorKind::MetricsBackend,
        }
    }

    pub fn cause(&self) -> Option<&CollaboratorError> {
        match self {
            Self::BadRequest { .. } => None,
            Self::Initialization(cause)
            | Self::NamespaceLookup(cause)
            | Self::EntityLookup(cause)
            | Self::ValidationFetch(cause)
            | Self::MetricsBackend(cause) => Some(cause),
        }
    }
}

//! Maps request outcomes onto the HTTP response contract.

use serde::Serialize;
use serde_json::{Value, json};

use meshlens_domain::{CollaboratorError, CollaboratorErrorKind, ServiceError};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn project<T: Serialize>(outcome: Result<T, ServiceError>) -> ApiResponse {
    match outcome {
        Ok(value) => match serde_json::to_value(value) {
            Ok(body) => ApiResponse { status: 200, body },
            Err(err) => error_response(500, format!("failed to encode response: {err}")),
        },
        Err(err) => error_response(status_for(&err), err.to_string()),
    }
}

pub fn status_for(err: &ServiceError) -> u16 {
    match err {
        ServiceError::Initialization(_) => 500,
        ServiceError::BadRequest { .. } => 400,
        ServiceError::NamespaceLookup(cause)
        | ServiceError::EntityLookup(cause)
        | ServiceError::ValidationFetch(cause) => collaborator_status(cause),
        ServiceError::MetricsBackend(_) => 500,
    }
}

fn collaborator_status(cause: &CollaboratorError) -> u16 {
    match cause.kind {
        CollaboratorErrorKind::NotFound => 404,
        CollaboratorErrorKind::Forbidden => 403,
        CollaboratorErrorKind::Unavailable => 503,
        CollaboratorErrorKind::Internal => 500,
    }
}

fn error_response(status: u16, message: String) -> ApiResponse {
    ApiResponse {
        status,
        body: json!({ "error": message }),
    }
}

use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid product: body of request contained bad or no data (expected a JSON object)")]
    NotAnObject,
    #[error("invalid product: missing {0}")]
    MissingField(&'static str),
    #[error("invalid type for `{field}`: expected {expected}")]
    InvalidType { field: &'static str, expected: &'static str },
    #[error("invalid product: name must not be empty")]
    EmptyName,
    #[error("invalid product: `{field}` exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("invalid attribute: unknown category `{0}`")]
    UnknownCategory(String),
    #[error("invalid price `{value}`: {reason}")]
    InvalidPrice { value: String, reason: &'static str },
    #[error("update called with empty id field")]
    UnsavedRecord,
    #[error("create called on a product that already has id {0}")]
    AlreadyPersisted(ProductId),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("product with id `{0}` was not found")]
    NotFound(String),
    #[error("content type must be {expected}")]
    UnsupportedMediaType { expected: &'static str },
    #[error("persistence failure: {0}")]
    Persistence(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("unsupported media type: {message}")]
    UnsupportedMediaType { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::UnsupportedMediaType { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::UnsupportedMediaType { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::UnsupportedMediaType { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Validation(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            error @ ApplicationError::NotFound(_) => {
                Self::NotFound { message: error.to_string(), correlation_id }
            }
            error @ ApplicationError::UnsupportedMediaType { .. } => {
                Self::UnsupportedMediaType { message: error.to_string(), correlation_id }
            }
            // Backend detail stays in the logs.
            ApplicationError::Persistence(_) => {
                Self::Internal { message: "an internal error occurred".to_owned(), correlation_id }
            }
        }
    }
}

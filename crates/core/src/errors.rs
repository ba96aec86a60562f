use std::fmt;

use thiserror::Error;

use crate::domain::{catalog::ItemId, quote::QuoteId};
use crate::intake::ValidationErrors;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidQuoteReason {
    EmptySelection,
    ZeroQuantity { item_id: ItemId },
    DuplicateItem { item_id: ItemId },
    InvalidPrice { item_id: ItemId, reason: String },
    Validation(ValidationErrors),
}

impl fmt::Display for InvalidQuoteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySelection => write!(f, "a quote needs at least one selected item"),
            Self::ZeroQuantity { item_id } => {
                write!(f, "item `{item_id}` has quantity zero")
            }
            Self::DuplicateItem { item_id } => {
                write!(f, "item `{item_id}` is listed more than once")
            }
            Self::InvalidPrice { item_id, reason } => {
                write!(f, "item `{item_id}` has an invalid price: {reason}")
            }
            Self::Validation(errors) => {
                write!(f, "client record is incomplete: {}", errors.field_names().join(", "))
            }
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown catalog item `{item_id}`")]
    UnknownItem { item_id: ItemId },
    #[error("quote `{quote_id}` was not found")]
    NotFound { quote_id: QuoteId },
    #[error("invalid quote: {0}")]
    InvalidQuote(InvalidQuoteReason),
    #[error("staff authorization is required for this operation")]
    Unauthorized,
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("catalog failure: {0}")]
    Catalog(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("input failure: {0}")]
    Input(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => "Could not complete the request. Please retry shortly.",
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "bad_request",
            Self::ServiceUnavailable { .. } => "service_unavailable",
            Self::Internal { .. } => "internal",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Input(message) => {
                Self::BadRequest { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Integration(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Catalog(message) | ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

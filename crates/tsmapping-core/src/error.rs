use crate::{ingest::DocumentError, routing::RoutingError};
use serde::Serialize;
use std::fmt;
use thiserror::Error as ThisError;
use tsmapping_schema::{
    error::{MappingError, ValidationError, ValidationErrorKind, ValidationErrors},
    routing::RoutingPathError,
};

///
/// Error
///
/// Request-level failure with a stable classification.
/// `class` decides the reported exception type and status code.
///

#[derive(Clone, Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Set when the failure came from a routing_path rule.
    pub validation: Option<ValidationErrorKind>,
}

impl Error {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            validation: None,
        }
    }

    pub(crate) fn settings(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::IllegalArgument,
            ErrorOrigin::Settings,
            message,
        )
    }

    pub(crate) fn request(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::IllegalArgument, ErrorOrigin::Request, message)
    }

    pub(crate) fn index_not_found(name: &str) -> Self {
        Self::new(
            ErrorClass::IndexNotFound,
            ErrorOrigin::Registry,
            format!("no such index [{name}]"),
        )
    }

    pub(crate) fn index_exists(name: &str) -> Self {
        Self::new(
            ErrorClass::ResourceAlreadyExists,
            ErrorOrigin::Registry,
            format!("index [{name}] already exists"),
        )
    }

    pub(crate) fn lock_poisoned(origin: ErrorOrigin) -> Self {
        Self::new(ErrorClass::Internal, origin, "lock poisoned")
    }

    /// Attach the origin a validation failure surfaced in.
    pub fn from_validation(origin: ErrorOrigin, err: ValidationError) -> Self {
        Self {
            class: ErrorClass::IllegalArgument,
            origin,
            message: err.to_string(),
            validation: Some(err.kind()),
        }
    }

    pub fn from_validation_errors(origin: ErrorOrigin, errs: ValidationErrors) -> Self {
        Self {
            class: ErrorClass::IllegalArgument,
            origin,
            message: errs.to_string(),
            validation: errs.first().map(ValidationError::kind),
        }
    }

    #[must_use]
    pub const fn status(&self) -> u16 {
        self.class.status()
    }

    #[must_use]
    pub fn body(&self) -> ErrorBody<'_> {
        ErrorBody {
            ty: self.class.as_type(),
            reason: &self.message,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<RoutingPathError> for Error {
    fn from(err: RoutingPathError) -> Self {
        Self::settings(err.to_string())
    }
}

impl From<MappingError> for Error {
    fn from(err: MappingError) -> Self {
        let class = match err {
            MappingError::Conflict { .. } => ErrorClass::IllegalArgument,
            _ => ErrorClass::MapperParsing,
        };

        Self::new(class, ErrorOrigin::Mapping, err.to_string())
    }
}

impl From<RoutingError> for Error {
    fn from(err: RoutingError) -> Self {
        Self::new(
            ErrorClass::IllegalArgument,
            ErrorOrigin::Routing,
            err.to_string(),
        )
    }
}

impl From<DocumentError> for Error {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Validation(err) => Self::from_validation(ErrorOrigin::Ingest, err),
            DocumentError::Routing(err) => err.into(),
            DocumentError::Mapping(err) => err.into(),
            other => Self::new(
                ErrorClass::DocumentParsing,
                ErrorOrigin::Ingest,
                other.to_string(),
            ),
        }
    }
}

///
/// ErrorBody
/// Wire shape of an error inside a response.
///

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    #[serde(rename = "type")]
    pub ty: &'static str,
    pub reason: &'a str,
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    IllegalArgument,
    MapperParsing,
    DocumentParsing,
    ResourceAlreadyExists,
    IndexNotFound,
    Internal,
}

impl ErrorClass {
    /// Exception type reported to clients.
    #[must_use]
    pub const fn as_type(self) -> &'static str {
        match self {
            Self::IllegalArgument => "illegal_argument_exception",
            Self::MapperParsing => "mapper_parsing_exception",
            Self::DocumentParsing => "document_parsing_exception",
            Self::ResourceAlreadyExists => "resource_already_exists_exception",
            Self::IndexNotFound => "index_not_found_exception",
            Self::Internal => "internal_error",
        }
    }

    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::IllegalArgument
            | Self::MapperParsing
            | Self::DocumentParsing
            | Self::ResourceAlreadyExists => 400,
            Self::IndexNotFound => 404,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::IllegalArgument => "illegal_argument",
            Self::MapperParsing => "mapper_parsing",
            Self::DocumentParsing => "document_parsing",
            Self::ResourceAlreadyExists => "resource_already_exists",
            Self::IndexNotFound => "index_not_found",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Settings,
    Mapping,
    Ingest,
    Routing,
    Query,
    Registry,
    Request,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Settings => "settings",
            Self::Mapping => "mapping",
            Self::Ingest => "ingest",
            Self::Routing => "routing",
            Self::Query => "query",
            Self::Registry => "registry",
            Self::Request => "request",
        };
        write!(f, "{label}")
    }
}

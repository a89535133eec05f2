//! Core error types for searchy-rs.
//!
//! [`SearchyError`] covers caller bugs in join resolution, lookups of unknown
//! entities or fields, descriptor registration conflicts, and configuration
//! problems. A field for which no join handler applies is *not* an error; it
//! is reported through the resolver chain's `Resolution` type instead.

use thiserror::Error;

/// The primary error type for searchy-rs.
///
/// Every error is local to a single operation (one field resolution, one
/// descriptor registration, one settings load). Nothing here is transient, so
/// callers never retry.
#[derive(Error, Debug)]
pub enum SearchyError {
    // ── Join resolution ──────────────────────────────────────────────

    /// A join handler was asked to handle a field it does not support.
    ///
    /// This always indicates a bug in the caller that drives the handlers.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A join handler name could not be mapped to a known handler.
    #[error("Unknown join handler: {0}")]
    UnknownHandler(String),

    // ── Metadata ─────────────────────────────────────────────────────

    /// The entity type is not present in the entity catalog.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// The entity exists but does not declare the requested field.
    #[error("Unknown field '{field}' on entity '{entity}'")]
    UnknownField {
        /// The owning entity type.
        entity: String,
        /// The missing field name.
        field: String,
    },

    // ── Descriptors ──────────────────────────────────────────────────

    /// A search descriptor with the same id is already registered.
    #[error("Duplicate search descriptor: {0}")]
    DuplicateDescriptor(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchyError {
    /// Returns a short, stable code identifying the kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidState(_) => "invalid_state",
            Self::UnknownHandler(_) => "unknown_handler",
            Self::UnknownEntity(_) => "unknown_entity",
            Self::UnknownField { .. } => "unknown_field",
            Self::DuplicateDescriptor(_) => "duplicate_descriptor",
            Self::ConfigurationError(_) => "configuration",
            Self::SerializationError(_) => "serialization",
            Self::IoError(_) => "io",
        }
    }

    /// Returns `true` if the error points at a programming mistake in the
    /// caller rather than at bad input data.
    pub const fn is_caller_bug(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}

/// A convenience type alias for `Result<T, SearchyError>`.
pub type SearchyResult<T> = Result<T, SearchyError>;

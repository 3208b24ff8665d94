//! Error types for the Shift Dispatch & Billing Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during dispatch and billing
//! computations. These are correctness errors, not transient failures; the
//! engine never retries, the caller decides whether to re-run the outer
//! transaction.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Shift Dispatch & Billing Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use dispatch_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/billing.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/billing.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A required field was missing or carried an inconsistent value.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field or input that failed validation.
        field: String,
        /// A description of what made the input invalid.
        message: String,
    },

    /// An edit or delete was attempted on a schedule that already has a
    /// realized operation result.
    #[error("Schedule '{schedule_id}' is immutable: {message}")]
    ImmutabilityViolation {
        /// The id of the immutable schedule.
        schedule_id: String,
        /// A description of the rejected operation.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up (e.g. "Schedule").
        entity: String,
        /// The id that had no match.
        id: String,
    },

    /// No tax rate is on record for the requested date.
    #[error("No tax rate on record for date {date}")]
    UnresolvedRate {
        /// The query date that precedes the earliest rate entry.
        date: NaiveDate,
    },

    /// The operation is explicitly disabled for this entity.
    #[error("Unsupported operation '{operation}': {message}")]
    UnsupportedOperation {
        /// The name of the disabled operation.
        operation: String,
        /// A description of why the operation is unsupported.
        message: String,
    },

    /// A domain error wrapped with the context of the failed operation.
    ///
    /// Carries the operation name and a detail string describing the inputs
    /// and pre-mutation state, so the failure site can be diagnosed without
    /// a retry.
    #[error("Operation '{operation}' failed ({detail}): {source}")]
    OperationFailed {
        /// The name of the operation that failed (e.g. "update_schedule").
        operation: String,
        /// Input arguments and pre-mutation state, rendered for diagnosis.
        detail: String,
        /// The underlying domain error.
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// Wraps this error with the name and input detail of a failed operation.
    pub fn in_operation(self, operation: &str, detail: impl Into<String>) -> Self {
        EngineError::OperationFailed {
            operation: operation.to_string(),
            detail: detail.into(),
            source: Box::new(self),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

//! Error types for route network processing
//!
//! Central error taxonomy with classification for retry decisions and
//! alerting. Validation failures carry the specific rule that rejected the
//! geometry so operators can correct the edit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named geometry validation rules.
///
/// Each rejected geometry is reported with the rule that failed; the rule
/// name is stable and safe to use as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationRule {
    /// Geometry is not valid (empty, degenerate, or malformed)
    IsValid,
    /// Line intersects itself
    IsSimple,
    /// Line starts and ends in the same coordinate
    IsClosed,
    /// Line endpoints are closer to each other than the tolerance
    EndsCloserToEachOtherThanTolerance,
    /// Snapping the line to itself at the tolerance changes the geometry
    EndsCloserToTheEdgeThanTolerance,
    /// A coordinate is NaN or infinite
    NonFiniteCoordinate,
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValidationRule::IsValid => "IsValid",
            ValidationRule::IsSimple => "IsSimple",
            ValidationRule::IsClosed => "IsClosed",
            ValidationRule::EndsCloserToEachOtherThanTolerance => {
                "EndsCloserToEachOtherThanTolerance"
            }
            ValidationRule::EndsCloserToTheEdgeThanTolerance => {
                "EndsCloserToTheEdgeThanTolerance"
            }
            ValidationRule::NonFiniteCoordinate => "NonFiniteCoordinate",
        };
        write!(f, "{name}")
    }
}

/// Error categories for metrics and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Geometry failed a validation rule
    Validation,
    /// Spatial query or mutation against the geographic database failed
    GeoDatabase,
    /// Optimistic version check failed on append
    Concurrency,
    /// Event store state contradicts itself
    StoreInconsistency,
    /// Dependent service call failed
    ExternalService,
    /// Encoding/decoding errors (WKB, JSON)
    Codec,
    /// Configuration errors
    Configuration,
    /// Other/unknown errors
    Other,
}

/// Route network processing errors
#[derive(Error, Debug)]
pub enum RouteNetError {
    /// Geometry failed a validation rule; never retried
    #[error("validation failed ({rule}): {detail}")]
    Validation {
        /// The rule that rejected the geometry
        rule: ValidationRule,
        /// Human-readable context
        detail: String,
    },

    /// Spatial intersection query failed during planning
    #[error("intersection query failed: {0}")]
    IntersectionQuery(String),

    /// Geographic database mutation failed
    #[error("geo database error: {0}")]
    GeoDatabase(String),

    /// Optimistic concurrency check rejected an append
    #[error("concurrency conflict on stream '{stream}' (expected version {expected})")]
    ConcurrencyConflict {
        /// Stream the append targeted
        stream: String,
        /// Version the append was conditioned on
        expected: u64,
    },

    /// Stream exists but its version could not be determined
    #[error("event store inconsistency: {0}")]
    StoreInconsistency(String),

    /// Dependent service (equipment, work task) call failed
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Binary geometry encoding/decoding error
    #[error("geometry codec error: {0}")]
    Codec(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl RouteNetError {
    /// Create a validation error for a named rule.
    pub fn validation(rule: ValidationRule, detail: impl Into<String>) -> Self {
        Self::Validation {
            rule,
            detail: detail.into(),
        }
    }

    /// Create an intersection query error.
    pub fn intersection_query(msg: impl Into<String>) -> Self {
        Self::IntersectionQuery(msg.into())
    }

    /// Create a geo database error.
    pub fn geo_database(msg: impl Into<String>) -> Self {
        Self::GeoDatabase(msg.into())
    }

    /// Create a concurrency conflict error.
    pub fn concurrency_conflict(stream: impl Into<String>, expected: u64) -> Self {
        Self::ConcurrencyConflict {
            stream: stream.into(),
            expected,
        }
    }

    /// Create a store inconsistency error.
    pub fn store_inconsistency(msg: impl Into<String>) -> Self {
        Self::StoreInconsistency(msg.into())
    }

    /// Create an external service error.
    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    /// Create a codec error.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Check if this error is retriable.
    ///
    /// Intersection query failures are transient infrastructure errors and
    /// succeed on message redelivery. A concurrency conflict is retriable by
    /// re-running the full reconciliation. Validation and inconsistency
    /// errors never succeed on retry.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::IntersectionQuery(_) => true,
            Self::GeoDatabase(_) => true,
            Self::ConcurrencyConflict { .. } => true,

            Self::Io(e) => {
                use std::io::ErrorKind;
                matches!(
                    e.kind(),
                    ErrorKind::ConnectionReset
                        | ErrorKind::ConnectionAborted
                        | ErrorKind::TimedOut
                        | ErrorKind::Interrupted
                )
            }

            Self::Validation { .. }
            | Self::StoreInconsistency(_)
            | Self::ExternalService(_)
            | Self::Codec(_)
            | Self::Config(_)
            | Self::Json(_)
            | Self::Other(_) => false,
        }
    }

    /// Check if this error is fatal for the affected stream.
    ///
    /// A fatal error halts processing for the stream and requires operator
    /// intervention; it must never be masked as a recoverable condition.
    pub fn is_fatal_for_stream(&self) -> bool {
        matches!(self, Self::StoreInconsistency(_))
    }

    /// Get the error category for metrics and alerting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::IntersectionQuery(_) => ErrorCategory::GeoDatabase,
            Self::GeoDatabase(_) => ErrorCategory::GeoDatabase,
            Self::ConcurrencyConflict { .. } => ErrorCategory::Concurrency,
            Self::StoreInconsistency(_) => ErrorCategory::StoreInconsistency,
            Self::ExternalService(_) => ErrorCategory::ExternalService,
            Self::Codec(_) => ErrorCategory::Codec,
            Self::Json(_) => ErrorCategory::Codec,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Other,
            Self::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get a metric-safe error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_failed",
            Self::IntersectionQuery(_) => "intersection_query_failed",
            Self::GeoDatabase(_) => "geo_database_error",
            Self::ConcurrencyConflict { .. } => "concurrency_conflict",
            Self::StoreInconsistency(_) => "store_inconsistency",
            Self::ExternalService(_) => "external_service_error",
            Self::Codec(_) => "codec_error",
            Self::Json(_) => "json_error",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
            Self::Other(_) => "unknown",
        }
    }
}

/// Result type for route network operations
pub type Result<T> = std::result::Result<T, RouteNetError>;

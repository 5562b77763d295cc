//! Error types for observation synthesis.
//!
//! All configuration problems are reported synchronously, before any cube
//! is allocated or any parallel work begins. Per-particle anomalies (for
//! example a non-finite velocity) are never errors; they are skipped and
//! counted during cell assignment.

use thiserror::Error;

use crate::config::FilterId;
use crate::photometry::BandpassError;

/// Errors raised while validating or running an observation.
#[derive(Debug, Error)]
pub enum ObservationError {
    /// A malformed instrument or environment parameter.
    #[error("invalid configuration: {parameter} = {value} must be positive and finite")]
    InvalidConfiguration {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The value that was rejected.
        value: f64,
    },

    /// A photometric filter name that the bandpass table set does not know.
    #[error("unsupported photometric filter {name:?}; known filters: \"r\", \"g\"")]
    UnsupportedFilter { name: String },

    /// SED synthesis was required but no model was supplied.
    #[error(
        "filter {filter} requires SED synthesis for stellar population particles, \
         but no SED model was supplied"
    )]
    MissingSpectralData { filter: FilterId },

    /// Under-specified or out-of-range blur kernel parameters.
    #[error("invalid blur parameters: {reason}")]
    InvalidBlurParameters { reason: String },

    /// A malformed bandpass transmission table.
    #[error(transparent)]
    Bandpass(#[from] BandpassError),

    /// The worker pool could not be constructed.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

//! Numerical helpers shared across pipeline stages.

pub mod stats;

pub use stats::{normal_cdf, GAUSSIAN_FWHM_OVER_SIGMA};

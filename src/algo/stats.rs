//! Gaussian statistics used by the velocity compositor and seeing kernels.

use scilib::math::basic::erf;
use std::f64::consts::SQRT_2;

/// FWHM of a Gaussian divided by its sigma: `2 sqrt(2 ln 2)`.
pub const GAUSSIAN_FWHM_OVER_SIGMA: f64 = 2.354_820_045_030_949_3;

/// Cumulative distribution function of the standard normal distribution.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Probability mass of a Gaussian N(mean, sigma) between `lower` and
/// `upper`.
///
/// For sigma = 0 the distribution degenerates to a point mass at `mean`:
/// the mass is 1 inside `[lower, upper)` and 0 outside. The half-open
/// convention matches the velocity bin edges, so a particle sitting
/// exactly on an interior edge lands in the upper bin.
pub fn gaussian_bin_mass(mean: f64, sigma: f64, lower: f64, upper: f64) -> f64 {
    if sigma <= 0.0 {
        if mean >= lower && mean < upper {
            1.0
        } else {
            0.0
        }
    } else {
        normal_cdf((upper - mean) / sigma) - normal_cdf((lower - mean) / sigma)
    }
}

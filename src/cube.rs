//! Velocity-axis composition.
//!
//! Each particle's flux is spread across the velocity bins as a Gaussian
//! centered on its line-of-sight velocity with the instrument's
//! line-spread sigma. Only instrumental broadening is modeled; intrinsic
//! velocity dispersion must be folded into the sigma by the caller. Bin
//! weights are CDF differences across the bin edges, so the weights for
//! one particle sum to its total flux except for the mass truncated at
//! the velocity range boundary, which is lost by design.

use crate::algo::stats::gaussian_bin_mass;

/// Velocity bin weights for one particle.
///
/// Returns `cdf((edge[i+1] - v) / sigma) - cdf((edge[i] - v) / sigma)` per
/// bin; at sigma = 0 the full weight lands in the single bin containing
/// `v`. Weights sum to at most 1 (truncation at the range boundary).
pub fn bin_weights(los_velocity: f64, sigma: f64, edges: &[f64]) -> Vec<f64> {
    edges
        .windows(2)
        .map(|w| gaussian_bin_mass(los_velocity, sigma, w[0], w[1]))
        .collect()
}

/// Compose the velocity spectrum of one cell.
///
/// `fluxes[i]` and `velocities[i]` describe the cell's i-th particle in
/// catalog order; accumulation is plain addition in that order, keeping
/// the spectrum reproducible bit for bit.
pub fn composite_cell(
    fluxes: &[f64],
    velocities: &[f64],
    edges: &[f64],
    sigma: f64,
) -> Vec<f64> {
    debug_assert_eq!(fluxes.len(), velocities.len());
    let mut spectrum = vec![0.0; edges.len().saturating_sub(1)];
    for (&flux, &velocity) in fluxes.iter().zip(velocities.iter()) {
        for (bin, w) in edges.windows(2).enumerate() {
            spectrum[bin] += flux * gaussian_bin_mass(velocity, sigma, w[0], w[1]);
        }
    }
    spectrum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn edges(n: usize, width: f64) -> Vec<f64> {
        let half = n as f64 * width / 2.0;
        (0..=n).map(|i| -half + i as f64 * width).collect()
    }

    #[test]
    fn test_zero_sigma_places_flux_in_containing_bin() {
        // 11 bins of width 20, bin 5 covers [-10, 10).
        let e = edges(11, 20.0);
        let w = bin_weights(0.0, 0.0, &e);
        assert_eq!(w.iter().filter(|&&x| x > 0.0).count(), 1);
        assert_eq!(w[5], 1.0);
    }

    #[test]
    fn test_tiny_sigma_concentrates_flux() {
        let e = edges(11, 20.0);
        let w = bin_weights(0.0, 1e-6, &e);
        assert_relative_eq!(w[5], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_conserve_flux_when_uncut() {
        let e = edges(64, 10.0);
        let w = bin_weights(37.0, 25.0, &e);
        let total: f64 = w.iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_truncation_loses_flux_at_the_boundary() {
        // Particle at the upper edge of the range: roughly half the mass
        // falls outside.
        let e = edges(10, 10.0);
        let w = bin_weights(50.0, 15.0, &e);
        let total: f64 = w.iter().sum();
        assert!(total < 0.6, "total {total}");
        assert!(total > 0.3, "total {total}");
    }

    #[test]
    fn test_cell_spectrum_sums_to_cell_flux() {
        let e = edges(64, 10.0);
        let fluxes = [1.0, 2.5, 0.25];
        let velocities = [-120.0, 0.0, 80.0];
        let spectrum = composite_cell(&fluxes, &velocities, &e, 30.0);
        let total: f64 = spectrum.iter().sum();
        assert_relative_eq!(total, 3.75, epsilon = 1e-9);
    }

    #[test]
    fn test_symmetric_particles_make_symmetric_spectrum() {
        let e = edges(20, 20.0);
        let spectrum = composite_cell(&[1.0, 1.0], &[-100.0, 100.0], &e, 35.0);
        for i in 0..10 {
            assert_relative_eq!(spectrum[i], spectrum[19 - i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_empty_cell_is_zero_spectrum() {
        let e = edges(8, 10.0);
        let spectrum = composite_cell(&[], &[], &e, 10.0);
        assert!(spectrum.iter().all(|&x| x == 0.0));
    }
}

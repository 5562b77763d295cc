//! Per-particle observed flux generation.
//!
//! Converts physical luminosity into observed flux (erg/s/cm^2) at the
//! observation's luminosity distance. The particle source variant is
//! dispatched exactly once per particle: simple-luminous particles take
//! their luminosity from mass over the mass-to-light ratio, treated as
//! monochromatic within the bandpass; stellar population particles
//! synthesize an SED through
//! the external [`SedModel`] and integrate it against the bandpass.

use std::f64::consts::PI;

use crate::config::{Environment, FilterId};
use crate::error::ObservationError;
use crate::grid::ObservationGrid;
use crate::particle::{Particle, Source};
use crate::photometry::{Bandpass, Cgs, SedModel};

/// Resolved inputs for flux generation, shared read-only across workers.
pub struct FluxContext<'a> {
    filter: Option<(FilterId, &'a Bandpass)>,
    sed: Option<&'a dyn SedModel>,
    /// Luminosity per unit mass for simple particles, erg/s per solar
    /// mass.
    luminosity_per_mass: f64,
    /// Inverse-square dimming factor `1 / (4 pi d_L^2)`, cm^-2.
    dimming: f64,
}

impl<'a> FluxContext<'a> {
    /// Resolve the flux inputs for one observation.
    pub fn new(
        grid: &ObservationGrid,
        environment: &Environment,
        filter: Option<(FilterId, &'a Bandpass)>,
        sed: Option<&'a dyn SedModel>,
    ) -> Self {
        let d_l_cm = grid.luminosity_distance_mpc * 1000.0 * Cgs::KPC_IN_CM;
        Self {
            filter,
            sed,
            luminosity_per_mass: Cgs::SOLAR_LUMINOSITY / environment.mass_to_light,
            dimming: 1.0 / (4.0 * PI * d_l_cm * d_l_cm),
        }
    }

    /// Observed flux of one particle, erg/s/cm^2.
    ///
    /// # Errors
    /// [`ObservationError::MissingSpectralData`] when the particle needs
    /// SED synthesis (stellar population variant with a filter configured)
    /// and no model was supplied. The pipeline pre-checks this condition
    /// before fanning out, so inside a run the error path is not reached.
    pub fn particle_flux(&self, particle: &Particle) -> Result<f64, ObservationError> {
        match (particle.source, self.filter) {
            (
                Source::StellarPopulation {
                    age_gyr,
                    metallicity,
                },
                Some((filter, band)),
            ) => {
                let model = self
                    .sed
                    .ok_or(ObservationError::MissingSpectralData { filter })?;
                let luminosity = band.integrate(|wavelength| {
                    model.luminosity_density(age_gyr, metallicity, particle.mass, wavelength)
                });
                Ok(luminosity * self.dimming)
            }
            _ => Ok(particle.mass * self.luminosity_per_mass * self.dimming),
        }
    }

    /// True when some particle would need SED synthesis without a model.
    ///
    /// Used by the pipeline to fail fast before any parallel work.
    pub fn missing_spectral_data(&self, particles: &[Particle]) -> Option<FilterId> {
        match (self.filter, self.sed) {
            (Some((filter, _)), None) => particles
                .iter()
                .any(|p| matches!(p.source, Source::StellarPopulation { .. }))
                .then_some(filter),
            _ => None,
        }
    }
}

/// Fluxes for the particles of one cell, in catalog (index) order.
pub fn cell_fluxes(
    particles: &[Particle],
    indices: &[usize],
    context: &FluxContext<'_>,
) -> Result<Vec<f64>, ObservationError> {
    indices
        .iter()
        .map(|&i| context.particle_flux(&particles[i]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Instrument;
    use crate::photometry::filters::{sdss_g, sdss_r};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    /// Flat SED: constant luminosity density per unit mass.
    struct FlatSed {
        density_per_msol: f64,
    }

    impl SedModel for FlatSed {
        fn luminosity_density(&self, _age: f64, _z: f64, mass: f64, _wavelength: f64) -> f64 {
            self.density_per_msol * mass
        }
    }

    fn grid() -> ObservationGrid {
        ObservationGrid::build(&Instrument::default(), &Environment::default()).unwrap()
    }

    #[test]
    fn test_simple_flux_scales_with_mass_and_m2l() {
        let grid = grid();
        let env = Environment::default();
        let ctx = FluxContext::new(&grid, &env, None, None);
        let p1 = Particle::simple(1.0, Vector3::zeros(), Vector3::zeros());
        let p2 = Particle::simple(5.0, Vector3::zeros(), Vector3::zeros());
        let f1 = ctx.particle_flux(&p1).unwrap();
        let f2 = ctx.particle_flux(&p2).unwrap();
        assert_relative_eq!(f2, 5.0 * f1, max_relative = 1e-12);

        let heavy_env = Environment {
            mass_to_light: 2.0,
            ..env
        };
        let ctx2 = FluxContext::new(&grid, &heavy_env, None, None);
        assert_relative_eq!(
            ctx2.particle_flux(&p1).unwrap(),
            0.5 * f1,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_dimming_follows_inverse_square() {
        let env = Environment::default();
        let near = grid();
        let far_env = Environment {
            redshift: 0.1,
            ..env.clone()
        };
        let far =
            ObservationGrid::build(&Instrument::default(), &far_env).unwrap();
        let p = Particle::simple(1.0, Vector3::zeros(), Vector3::zeros());
        let f_near = FluxContext::new(&near, &env, None, None)
            .particle_flux(&p)
            .unwrap();
        let f_far = FluxContext::new(&far, &far_env, None, None)
            .particle_flux(&p)
            .unwrap();
        let ratio = (far.luminosity_distance_mpc / near.luminosity_distance_mpc).powi(2);
        assert_relative_eq!(f_near / f_far, ratio, max_relative = 1e-12);
    }

    #[test]
    fn test_stellar_particle_uses_sed_model() {
        let grid = grid();
        let env = Environment::default();
        let band = sdss_r().unwrap();
        let sed = FlatSed {
            density_per_msol: 1e30,
        };
        let ctx = FluxContext::new(
            &grid,
            &env,
            Some((FilterId::SdssR, &band)),
            Some(&sed),
        );
        let p = Particle::stellar(2.0, Vector3::zeros(), Vector3::zeros(), 5.0, 0.02);
        let flux = ctx.particle_flux(&p).unwrap();
        // Flat SED: band-integrated luminosity is density * filter area.
        let expected = 2.0 * 1e30 * band.integrate(|_| 1.0);
        let d_l_cm = grid.luminosity_distance_mpc * 1000.0 * Cgs::KPC_IN_CM;
        assert_relative_eq!(
            flux,
            expected / (4.0 * PI * d_l_cm * d_l_cm),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_simple_particle_ignores_sed_model() {
        let grid = grid();
        let env = Environment::default();
        let band = sdss_r().unwrap();
        let sed = FlatSed {
            density_per_msol: 1e30,
        };
        let ctx_with = FluxContext::new(
            &grid,
            &env,
            Some((FilterId::SdssR, &band)),
            Some(&sed),
        );
        let ctx_without = FluxContext::new(&grid, &env, None, None);
        let p = Particle::simple(1.0, Vector3::zeros(), Vector3::zeros());
        assert_eq!(
            ctx_with.particle_flux(&p).unwrap(),
            ctx_without.particle_flux(&p).unwrap()
        );
    }

    #[test]
    fn test_missing_spectral_data_detection() {
        let grid = grid();
        let env = Environment::default();
        let band = sdss_g().unwrap();
        let ctx = FluxContext::new(&grid, &env, Some((FilterId::SdssG, &band)), None);
        let stars = vec![Particle::stellar(
            1.0,
            Vector3::zeros(),
            Vector3::zeros(),
            1.0,
            0.02,
        )];
        assert_eq!(ctx.missing_spectral_data(&stars), Some(FilterId::SdssG));

        let gas = vec![Particle::simple(1.0, Vector3::zeros(), Vector3::zeros())];
        assert_eq!(ctx.missing_spectral_data(&gas), None);

        match ctx.particle_flux(&stars[0]) {
            Err(ObservationError::MissingSpectralData { filter }) => {
                assert_eq!(filter, FilterId::SdssG);
            }
            other => panic!("expected MissingSpectralData, got {other:?}"),
        }
    }
}

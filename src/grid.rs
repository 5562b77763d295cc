//! Aperture and grid construction.
//!
//! Turns the instrument and environment descriptors into an
//! [`ObservationGrid`]: the per-run summary of derived quantities (angular
//! scale, bin counts, velocity bin edges, line-spread sigma) plus the
//! boolean aperture mask. The grid is built once and shared immutably by
//! every downstream stage, so no stage recomputes scales on its own.

use ndarray::Array2;
use tracing::info;

use crate::algo::stats::GAUSSIAN_FWHM_OVER_SIGMA;
use crate::config::{ApertureShape, Environment, Instrument};
use crate::cosmology;
use crate::error::ObservationError;

/// Half-width of the velocity axis in units of the characteristic
/// dispersion.
const VELOCITY_HALF_SPAN_DISPERSIONS: f64 = 3.0;

/// Velocity bin count clamp. Keeps degenerate configurations (tiny r200,
/// coarse spectral pixels) from producing useless or enormous cubes.
const MIN_VELOCITY_BINS: usize = 8;
const MAX_VELOCITY_BINS: usize = 4096;

/// Derived observation geometry, computed once per run.
#[derive(Debug, Clone)]
pub struct ObservationGrid {
    /// Spatial bins per axis; the cube is `sbin x sbin x vbin`.
    pub sbin: usize,
    /// Velocity bins.
    pub vbin: usize,
    /// Velocity bin edges in km/s, length `vbin + 1`, symmetric about 0.
    pub velocity_edges: Vec<f64>,
    /// Velocity bin width in km/s.
    pub velocity_bin_kms: f64,
    /// Physical size of one spatial pixel in kpc.
    pub spatial_bin_kpc: f64,
    /// Spatial pixel scale in arcseconds (carried for seeing-kernel
    /// conversion).
    pub spatial_scale_arcsec: f64,
    /// Angular scale at the observation redshift, kpc per arcsecond.
    pub angular_scale_kpc_per_arcsec: f64,
    /// Line-spread function standard deviation in km/s.
    pub lsf_sigma_kms: f64,
    /// Luminosity distance in Mpc, for the flux dimming factor.
    pub luminosity_distance_mpc: f64,
    /// Aperture shape the mask was built from.
    pub aperture: ApertureShape,
    /// Boolean aperture mask over the spatial grid, indexed `[x, y]`.
    pub mask: Array2<bool>,
}

impl ObservationGrid {
    /// Build the grid from validated instrument and environment
    /// descriptors.
    ///
    /// # Errors
    /// [`ObservationError::InvalidConfiguration`] for non-positive field of
    /// view, pixel scales, wavelengths, redshift, virial radius or
    /// mass-to-light ratio. Raised before anything is allocated.
    pub fn build(
        instrument: &Instrument,
        environment: &Environment,
    ) -> Result<Self, ObservationError> {
        instrument.validate()?;
        environment.validate()?;

        let angular_scale = cosmology::kpc_per_arcsec(environment.redshift);
        let sbin = (instrument.fov_arcsec / instrument.spatial_scale_arcsec).round() as usize;
        if sbin == 0 {
            // A field narrower than half a pixel rounds to an empty grid.
            return Err(ObservationError::InvalidConfiguration {
                parameter: "fov_arcsec",
                value: instrument.fov_arcsec,
            });
        }
        let spatial_bin_kpc = instrument.spatial_scale_arcsec * angular_scale;

        // Spectral pixel and LSF width, angstroms to km/s at the central
        // wavelength.
        let velocity_bin_kms = cosmology::SPEED_OF_LIGHT_KMS * instrument.spectral_scale_angstrom
            / instrument.central_wavelength_angstrom;
        let lsf_sigma_kms = cosmology::SPEED_OF_LIGHT_KMS * instrument.lsf_fwhm_angstrom
            / instrument.central_wavelength_angstrom
            / GAUSSIAN_FWHM_OVER_SIGMA;

        // Velocity range policy: +/- a fixed multiple of the virial
        // circular velocity v200 = 10 H0 r200, clamped to a sane bin count.
        let v200 =
            10.0 * (cosmology::HUBBLE_KMS_PER_MPC / 1000.0) * environment.virial_radius_kpc;
        let half_span = VELOCITY_HALF_SPAN_DISPERSIONS * v200;
        let vbin = ((2.0 * half_span / velocity_bin_kms).ceil() as usize)
            .clamp(MIN_VELOCITY_BINS, MAX_VELOCITY_BINS);
        let half_extent = vbin as f64 * velocity_bin_kms / 2.0;
        let velocity_edges: Vec<f64> = (0..=vbin)
            .map(|i| -half_extent + i as f64 * velocity_bin_kms)
            .collect();

        let mask = aperture_mask(sbin, instrument.aperture);
        let inside = mask.iter().filter(|&&m| m).count();

        info!(
            sbin,
            vbin,
            inside,
            angular_scale_kpc_per_arcsec = angular_scale,
            spatial_bin_kpc,
            lsf_sigma_kms,
            "built observation grid"
        );

        Ok(Self {
            sbin,
            vbin,
            velocity_edges,
            velocity_bin_kms,
            spatial_bin_kpc,
            spatial_scale_arcsec: instrument.spatial_scale_arcsec,
            angular_scale_kpc_per_arcsec: angular_scale,
            lsf_sigma_kms,
            luminosity_distance_mpc: cosmology::luminosity_distance_mpc(environment.redshift),
            aperture: instrument.aperture,
            mask,
        })
    }

    /// Half-width of the spatial grid in kpc.
    pub fn half_extent_kpc(&self) -> f64 {
        self.sbin as f64 * self.spatial_bin_kpc / 2.0
    }

    /// Velocity range covered by the cube, km/s.
    pub fn velocity_range_kms(&self) -> (f64, f64) {
        (
            self.velocity_edges[0],
            self.velocity_edges[self.velocity_edges.len() - 1],
        )
    }
}

/// Build the aperture mask over an `sbin x sbin` grid of pixel centers.
///
/// Distances are measured in pixels from the grid center; the field radius
/// is `sbin / 2` pixels on every axis, so the mask is independent of the
/// physical scale.
fn aperture_mask(sbin: usize, shape: ApertureShape) -> Array2<bool> {
    let radius = sbin as f64 / 2.0;
    let center = sbin as f64 / 2.0;
    Array2::from_shape_fn((sbin, sbin), |(ix, iy)| {
        let dx = ix as f64 + 0.5 - center;
        let dy = iy as f64 + 0.5 - center;
        match shape {
            ApertureShape::Circular => dx * dx + dy * dy <= radius * radius,
            ApertureShape::Square => dx.abs() <= radius && dy.abs() <= radius,
            ApertureShape::Hexagonal => point_in_hexagon(dx, dy, radius),
        }
    })
}

/// Point-in-polygon test against the six vertices of a regular hexagon
/// with circumradius `radius`, flat sides up and down.
fn point_in_hexagon(x: f64, y: f64, radius: f64) -> bool {
    let vertices: Vec<(f64, f64)> = (0..6)
        .map(|k| {
            let theta = std::f64::consts::FRAC_PI_3 * k as f64;
            (radius * theta.cos(), radius * theta.sin())
        })
        .collect();

    // Ray casting: count edge crossings of a horizontal ray from (x, y).
    let mut inside = false;
    for k in 0..6 {
        let (x0, y0) = vertices[k];
        let (x1, y1) = vertices[(k + 1) % 6];
        if (y0 > y) != (y1 > y) {
            let x_cross = x0 + (y - y0) / (y1 - y0) * (x1 - x0);
            if x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sbin_rounding_ties_up() {
        // 15 / 0.5 = 30 exactly.
        let grid =
            ObservationGrid::build(&Instrument::default(), &Environment::default()).unwrap();
        assert_eq!(grid.sbin, 30);

        // 15.25 / 0.5 = 30.5 rounds up.
        let instrument = Instrument {
            fov_arcsec: 15.25,
            ..Instrument::default()
        };
        let grid = ObservationGrid::build(&instrument, &Environment::default()).unwrap();
        assert_eq!(grid.sbin, 31);
    }

    #[test]
    fn test_velocity_edges_symmetric_about_zero() {
        let grid =
            ObservationGrid::build(&Instrument::default(), &Environment::default()).unwrap();
        assert_eq!(grid.velocity_edges.len(), grid.vbin + 1);
        let (lo, hi) = grid.velocity_range_kms();
        assert_relative_eq!(lo, -hi, epsilon = 1e-9);
        // Mirror symmetry of the whole edge sequence.
        for i in 0..=grid.vbin {
            assert_relative_eq!(
                grid.velocity_edges[i],
                -grid.velocity_edges[grid.vbin - i],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_velocity_range_covers_virial_velocity() {
        let environment = Environment::default();
        let grid = ObservationGrid::build(&Instrument::default(), &environment).unwrap();
        let v200 = 10.0 * (cosmology::HUBBLE_KMS_PER_MPC / 1000.0)
            * environment.virial_radius_kpc;
        let (_, hi) = grid.velocity_range_kms();
        assert!(hi >= VELOCITY_HALF_SPAN_DISPERSIONS * v200);
    }

    #[test]
    fn test_velocity_bin_clamp() {
        let environment = Environment {
            virial_radius_kpc: 1e-3,
            ..Environment::default()
        };
        let grid = ObservationGrid::build(&Instrument::default(), &environment).unwrap();
        assert_eq!(grid.vbin, MIN_VELOCITY_BINS);
    }

    #[test]
    fn test_lsf_sigma_conversion() {
        let grid =
            ObservationGrid::build(&Instrument::default(), &Environment::default()).unwrap();
        // 2.65 A at 4800 A: FWHM = c * 2.65 / 4800 ~ 165.5 km/s.
        let fwhm_kms = cosmology::SPEED_OF_LIGHT_KMS * 2.65 / 4800.0;
        assert_relative_eq!(
            grid.lsf_sigma_kms,
            fwhm_kms / GAUSSIAN_FWHM_OVER_SIGMA,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_circular_mask_golden_count() {
        // Radius 5, cell size 1: 80 cell centers lie within the radius.
        let mask = aperture_mask(10, ApertureShape::Circular);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 80);
    }

    #[test]
    fn test_square_mask_is_full() {
        let mask = aperture_mask(10, ApertureShape::Square);
        assert!(mask.iter().all(|&m| m));
    }

    #[test]
    fn test_hexagonal_mask_between_inscribed_and_circumscribed() {
        let sbin = 40;
        let hex = aperture_mask(sbin, ApertureShape::Hexagonal);
        let circle = aperture_mask(sbin, ApertureShape::Circular);
        let hex_count = hex.iter().filter(|&&m| m).count();
        let circle_count = circle.iter().filter(|&&m| m).count();
        // A hexagon with circumradius R covers 3*sqrt(3)/2 R^2, about 83%
        // of the circle of radius R.
        assert!(hex_count < circle_count);
        assert!((hex_count as f64) > 0.7 * circle_count as f64);
        // Center is always inside.
        assert!(hex[[sbin / 2, sbin / 2]]);
    }

    #[test]
    fn test_hexagon_vertices_orientation() {
        // Vertices on the x axis: points just inside radius along x are in,
        // points along y at the same distance fall on the flat side and are
        // out.
        assert!(point_in_hexagon(0.99, 0.0, 1.0));
        assert!(!point_in_hexagon(0.0, 0.99, 1.0));
        assert!(point_in_hexagon(0.0, 0.86, 1.0)); // below sqrt(3)/2
    }

    #[test]
    fn test_invalid_configuration_contains_parameter() {
        let instrument = Instrument {
            spatial_scale_arcsec: -1.0,
            ..Instrument::default()
        };
        match ObservationGrid::build(&instrument, &Environment::default()) {
            Err(ObservationError::InvalidConfiguration { parameter, value }) => {
                assert_eq!(parameter, "spatial_scale_arcsec");
                assert_eq!(value, -1.0);
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }
}

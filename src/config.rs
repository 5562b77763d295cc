//! Instrument and environment descriptors.
//!
//! Both descriptors are plain configuration values: constructed once per
//! observation (usually from a named preset registry, which lives outside
//! this crate) and never mutated. Defaults reproduce a small-survey IFU
//! setup: a 15 arcsec circular aperture at 0.5 arcsec spatial sampling,
//! a 4800 A central wavelength with 1.04 A spectral pixels and a 2.65 A
//! line-spread FWHM, observed at z = 0.05 and 70 degrees inclination.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algo::stats::GAUSSIAN_FWHM_OVER_SIGMA;
use crate::error::ObservationError;

/// Shape of the IFU field of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApertureShape {
    /// Euclidean distance from the grid center within the field radius.
    Circular,
    /// Both axes within the field half-width.
    Square,
    /// Regular hexagon with circumradius equal to the field radius.
    Hexagonal,
}

/// Photometric filter identifier.
///
/// The supported set matches the bandpass tables in
/// [`crate::photometry::filters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterId {
    /// SDSS r band, ~5500-7300 A.
    SdssR,
    /// SDSS g band, ~3600-5700 A.
    SdssG,
}

impl FilterId {
    /// Parse a filter name as accepted from configuration files.
    ///
    /// # Errors
    /// [`ObservationError::UnsupportedFilter`] for unknown names.
    pub fn parse(name: &str) -> Result<Self, ObservationError> {
        match name {
            "r" | "sdss_r" => Ok(Self::SdssR),
            "g" | "sdss_g" => Ok(Self::SdssG),
            _ => Err(ObservationError::UnsupportedFilter {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SdssR => write!(f, "SDSS r"),
            Self::SdssG => write!(f, "SDSS g"),
        }
    }
}

/// IFU instrument descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Field of view diameter in arcseconds.
    pub fov_arcsec: f64,
    /// Shape of the field of view.
    pub aperture: ApertureShape,
    /// Spatial pixel scale in arcseconds per pixel.
    pub spatial_scale_arcsec: f64,
    /// Spectral pixel scale in angstroms per pixel.
    pub spectral_scale_angstrom: f64,
    /// Central wavelength of the observation in angstroms.
    pub central_wavelength_angstrom: f64,
    /// Line-spread function full width at half maximum in angstroms.
    pub lsf_fwhm_angstrom: f64,
    /// Photometric filter for SED synthesis; `None` observes bolometric
    /// mass-to-light flux.
    pub filter: Option<FilterId>,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            fov_arcsec: 15.0,
            aperture: ApertureShape::Circular,
            spatial_scale_arcsec: 0.5,
            spectral_scale_angstrom: 1.04,
            central_wavelength_angstrom: 4800.0,
            lsf_fwhm_angstrom: 2.65,
            filter: None,
        }
    }
}

impl Instrument {
    /// Check every scale parameter, reporting the first offender.
    pub fn validate(&self) -> Result<(), ObservationError> {
        check_positive("fov_arcsec", self.fov_arcsec)?;
        check_positive("spatial_scale_arcsec", self.spatial_scale_arcsec)?;
        check_positive("spectral_scale_angstrom", self.spectral_scale_angstrom)?;
        check_positive(
            "central_wavelength_angstrom",
            self.central_wavelength_angstrom,
        )?;
        check_positive("lsf_fwhm_angstrom", self.lsf_fwhm_angstrom)?;
        Ok(())
    }
}

/// Observational environment descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Projected redshift of the observation.
    pub redshift: f64,
    /// Inclination of the galaxy in degrees from face-on.
    pub inclination_deg: f64,
    /// Virial radius r200 in kpc; sets the characteristic kinematic scale
    /// of the velocity axis.
    pub virial_radius_kpc: f64,
    /// Mass-to-light ratio in solar units for simple-luminous particles.
    pub mass_to_light: f64,
    /// Optional seeing kernel; `None` skips the spatial blur stage.
    pub blur: Option<BlurKernel>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            redshift: 0.05,
            inclination_deg: 70.0,
            virial_radius_kpc: 200.0,
            mass_to_light: 1.0,
            blur: None,
        }
    }
}

impl Environment {
    /// Check the physical parameters, reporting the first offender.
    ///
    /// Inclination is unrestricted (any angle is observable); redshift must
    /// be strictly positive because the angular scale degenerates at z = 0.
    pub fn validate(&self) -> Result<(), ObservationError> {
        check_positive("redshift", self.redshift)?;
        check_positive("virial_radius_kpc", self.virial_radius_kpc)?;
        check_positive("mass_to_light", self.mass_to_light)?;
        if !self.inclination_deg.is_finite() {
            return Err(ObservationError::InvalidConfiguration {
                parameter: "inclination_deg",
                value: self.inclination_deg,
            });
        }
        Ok(())
    }
}

/// Seeing kernel descriptor with canonical shape parameters in arcseconds.
///
/// Constructed through [`BlurKernel::gaussian`] and [`BlurKernel::moffat`],
/// which encode the precedence rule: the direct shape parameter (sigma or
/// alpha) wins over a supplied FWHM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BlurKernel {
    /// Gaussian point spread function.
    Gaussian { sigma_arcsec: f64 },
    /// Moffat point spread function with power `beta` and core width
    /// `alpha`.
    Moffat { beta: f64, alpha_arcsec: f64 },
}

impl BlurKernel {
    /// Resolve a Gaussian kernel from sigma and/or FWHM (sigma prioritized).
    ///
    /// # Errors
    /// [`ObservationError::InvalidBlurParameters`] when neither parameter is
    /// given or the resolved sigma is not positive and finite.
    pub fn gaussian(
        sigma_arcsec: Option<f64>,
        fwhm_arcsec: Option<f64>,
    ) -> Result<Self, ObservationError> {
        let sigma = match (sigma_arcsec, fwhm_arcsec) {
            (Some(sigma), _) => sigma,
            (None, Some(fwhm)) => fwhm / GAUSSIAN_FWHM_OVER_SIGMA,
            (None, None) => {
                return Err(ObservationError::InvalidBlurParameters {
                    reason: "Gaussian kernel needs sigma or fwhm".to_string(),
                })
            }
        };
        if !(sigma > 0.0 && sigma.is_finite()) {
            return Err(ObservationError::InvalidBlurParameters {
                reason: format!("Gaussian sigma = {sigma} must be positive and finite"),
            });
        }
        Ok(Self::Gaussian {
            sigma_arcsec: sigma,
        })
    }

    /// Resolve a Moffat kernel from beta and alpha and/or FWHM (alpha
    /// prioritized).
    ///
    /// FWHM converts through `fwhm = 2 alpha sqrt(2^(1/beta) - 1)`.
    ///
    /// # Errors
    /// [`ObservationError::InvalidBlurParameters`] when beta is not positive,
    /// or neither alpha nor FWHM is given, or the resolved alpha is not
    /// positive and finite.
    pub fn moffat(
        beta: f64,
        alpha_arcsec: Option<f64>,
        fwhm_arcsec: Option<f64>,
    ) -> Result<Self, ObservationError> {
        if !(beta > 0.0 && beta.is_finite()) {
            return Err(ObservationError::InvalidBlurParameters {
                reason: format!("Moffat beta = {beta} must be positive and finite"),
            });
        }
        let alpha = match (alpha_arcsec, fwhm_arcsec) {
            (Some(alpha), _) => alpha,
            (None, Some(fwhm)) => fwhm / (2.0 * (2.0_f64.powf(1.0 / beta) - 1.0).sqrt()),
            (None, None) => {
                return Err(ObservationError::InvalidBlurParameters {
                    reason: "Moffat kernel needs alpha or fwhm".to_string(),
                })
            }
        };
        if !(alpha > 0.0 && alpha.is_finite()) {
            return Err(ObservationError::InvalidBlurParameters {
                reason: format!("Moffat alpha = {alpha} must be positive and finite"),
            });
        }
        Ok(Self::Moffat {
            beta,
            alpha_arcsec: alpha,
        })
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<(), ObservationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ObservationError::InvalidConfiguration { parameter, value })
    }
}

//! SDSS g and r photometric bandpasses.
//!
//! Transmission tables approximate the SDSS 2.5m response curves (airmass
//! 1.3) at 100 angstrom sampling, which is ample for broadband synthetic
//! photometry. These are the two bands the SED-synthesis path supports.

use crate::config::FilterId;

use super::bandpass::{Bandpass, BandpassError};

/// SDSS g transmission, (wavelength_angstrom, transmission).
const SDSS_G_DATA: [(f64, f64); 22] = [
    (3600.0, 0.0),
    (3700.0, 0.02),
    (3800.0, 0.08),
    (3900.0, 0.14),
    (4000.0, 0.20),
    (4100.0, 0.27),
    (4200.0, 0.33),
    (4300.0, 0.38),
    (4400.0, 0.42),
    (4500.0, 0.45),
    (4600.0, 0.47),
    (4700.0, 0.48),
    (4800.0, 0.49),
    (4900.0, 0.49),
    (5000.0, 0.48),
    (5100.0, 0.47),
    (5200.0, 0.44),
    (5300.0, 0.40),
    (5400.0, 0.33),
    (5500.0, 0.15),
    (5600.0, 0.04),
    (5700.0, 0.0),
];

/// SDSS r transmission, (wavelength_angstrom, transmission).
const SDSS_R_DATA: [(f64, f64); 21] = [
    (5300.0, 0.0),
    (5400.0, 0.04),
    (5500.0, 0.14),
    (5600.0, 0.40),
    (5700.0, 0.53),
    (5800.0, 0.56),
    (5900.0, 0.57),
    (6000.0, 0.57),
    (6100.0, 0.57),
    (6200.0, 0.56),
    (6300.0, 0.56),
    (6400.0, 0.55),
    (6500.0, 0.54),
    (6600.0, 0.52),
    (6700.0, 0.49),
    (6800.0, 0.45),
    (6900.0, 0.38),
    (7000.0, 0.28),
    (7100.0, 0.12),
    (7200.0, 0.04),
    (7300.0, 0.0),
];

fn bandpass_from_data(data: &[(f64, f64)]) -> Result<Bandpass, BandpassError> {
    let wavelengths: Vec<f64> = data.iter().map(|(w, _)| *w).collect();
    let transmission: Vec<f64> = data.iter().map(|(_, t)| *t).collect();
    Bandpass::from_table(wavelengths, transmission)
}

/// SDSS g band, ~3600-5700 A.
pub fn sdss_g() -> Result<Bandpass, BandpassError> {
    bandpass_from_data(&SDSS_G_DATA)
}

/// SDSS r band, ~5300-7300 A.
pub fn sdss_r() -> Result<Bandpass, BandpassError> {
    bandpass_from_data(&SDSS_R_DATA)
}

/// Bandpass for a parsed filter identifier.
pub fn bandpass_for(filter: FilterId) -> Result<Bandpass, BandpassError> {
    match filter {
        FilterId::SdssG => sdss_g(),
        FilterId::SdssR => sdss_r(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_filter_tables_are_valid() {
        assert!(sdss_g().is_ok());
        assert!(sdss_r().is_ok());
    }

    #[test]
    fn test_g_band_peaks_near_4800() {
        let g = sdss_g().unwrap();
        assert_eq!(g.at(4800.0), 0.49);
        assert!(g.at(4800.0) >= g.at(4000.0));
        assert!(g.at(4800.0) >= g.at(5500.0));
    }

    #[test]
    fn test_r_band_coverage() {
        let r = sdss_r().unwrap();
        let (lo, hi) = r.band();
        assert_eq!(lo, 5300.0);
        assert_eq!(hi, 7300.0);
        assert_eq!(r.at(6000.0), 0.57);
        assert_eq!(r.at(5000.0), 0.0);
    }

    #[test]
    fn test_bands_overlap_only_at_the_margin() {
        let g = sdss_g().unwrap();
        let r = sdss_r().unwrap();
        // The g red edge and r blue edge cross near 5500 A with modest
        // transmission on both sides.
        assert!(g.at(5500.0) < 0.2);
        assert!(r.at(5500.0) < 0.2);
        assert_relative_eq!(g.at(6500.0), 0.0);
        assert_relative_eq!(r.at(4500.0), 0.0);
    }

    #[test]
    fn test_bandpass_for_dispatch() {
        let (lo_g, _) = bandpass_for(FilterId::SdssG).unwrap().band();
        let (lo_r, _) = bandpass_for(FilterId::SdssR).unwrap().band();
        assert!(lo_g < lo_r);
    }
}

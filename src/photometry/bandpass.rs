//! Photometric bandpass transmission curves.
//!
//! A bandpass is a piecewise-linear transmission function T(lambda) over a
//! table of (wavelength, transmission) points, T = 0 outside the table.
//! Tables must be strictly ascending in wavelength, bounded by zero
//! transmission at both ends, and hold values in [0, 1].

use thiserror::Error;

/// Errors from malformed transmission tables.
#[derive(Debug, Error)]
pub enum BandpassError {
    #[error("wavelength and transmission vectors must have the same length")]
    LengthMismatch,

    #[error("wavelengths must be finite and strictly ascending")]
    NotAscending,

    #[error("first and last transmission values must be 0.0")]
    BoundaryNotZero,

    #[error("transmission values must be between 0.0 and 1.0")]
    OutOfRange,
}

/// Wavelength-dependent filter transmission curve.
#[derive(Debug, Clone)]
pub struct Bandpass {
    wavelengths_angstrom: Vec<f64>,
    transmission: Vec<f64>,
}

impl Bandpass {
    /// Build a bandpass from a transmission table, wavelengths in
    /// angstroms.
    ///
    /// # Errors
    /// [`BandpassError`] when the table is ragged, unsorted, unbounded by
    /// zeros or out of [0, 1].
    pub fn from_table(
        wavelengths_angstrom: Vec<f64>,
        transmission: Vec<f64>,
    ) -> Result<Self, BandpassError> {
        if wavelengths_angstrom.len() != transmission.len() {
            return Err(BandpassError::LengthMismatch);
        }
        if wavelengths_angstrom.len() < 2 {
            return Err(BandpassError::NotAscending);
        }
        if wavelengths_angstrom.iter().any(|w| !w.is_finite())
            || wavelengths_angstrom.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(BandpassError::NotAscending);
        }
        if transmission[0] != 0.0 || transmission[transmission.len() - 1] != 0.0 {
            return Err(BandpassError::BoundaryNotZero);
        }
        if transmission.iter().any(|&t| !(0.0..=1.0).contains(&t)) {
            return Err(BandpassError::OutOfRange);
        }
        Ok(Self {
            wavelengths_angstrom,
            transmission,
        })
    }

    /// Transmission at `wavelength_angstrom`, linearly interpolated, zero
    /// outside the table.
    pub fn at(&self, wavelength_angstrom: f64) -> f64 {
        let w = &self.wavelengths_angstrom;
        if wavelength_angstrom < w[0] || wavelength_angstrom > w[w.len() - 1] {
            return 0.0;
        }
        let upper = w.partition_point(|&x| x < wavelength_angstrom);
        if upper == 0 {
            return self.transmission[0];
        }
        let (w0, w1) = (w[upper - 1], w[upper.min(w.len() - 1)]);
        if upper == w.len() || w1 == w0 {
            return self.transmission[upper - 1];
        }
        let t = (wavelength_angstrom - w0) / (w1 - w0);
        self.transmission[upper - 1] * (1.0 - t) + self.transmission[upper] * t
    }

    /// Wavelength coverage as (lower, upper) in angstroms.
    pub fn band(&self) -> (f64, f64) {
        (
            self.wavelengths_angstrom[0],
            self.wavelengths_angstrom[self.wavelengths_angstrom.len() - 1],
        )
    }

    /// Integrate `f(lambda) * T(lambda)` over the bandpass.
    ///
    /// Trapezoidal rule on 1 angstrom sub-steps between table nodes, the
    /// resolution SED tables are typically sampled at.
    pub fn integrate<F>(&self, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let (lo, hi) = self.band();
        let steps = ((hi - lo).ceil() as usize).max(1);
        let dw = (hi - lo) / steps as f64;
        let mut total = 0.0;
        let mut prev = f(lo) * self.at(lo);
        for i in 1..=steps {
            let w = lo + i as f64 * dw;
            let current = f(w) * self.at(w);
            total += 0.5 * dw * (prev + current);
            prev = current;
        }
        total
    }
}

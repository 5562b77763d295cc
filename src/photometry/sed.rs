//! Stellar population SED synthesis seam.
//!
//! SED model internals live outside this crate; the pipeline only needs a
//! spectral luminosity density to integrate against a bandpass. The flux
//! generator calls implementations from inside a parallel region, so they
//! must be `Sync` and free of shared mutable state.

/// External stellar-population-synthesis model.
///
/// Implementations map a stellar population (age, metallicity, mass) to a
/// spectral luminosity density. They must be pure: same inputs, same
/// output, with no interior mutation, so concurrent calls from the worker
/// pool are safe.
pub trait SedModel: Send + Sync {
    /// Spectral luminosity density in erg/s/angstrom at the given rest
    /// wavelength, for a population of `mass_msol` solar masses.
    fn luminosity_density(
        &self,
        age_gyr: f64,
        metallicity: f64,
        mass_msol: f64,
        wavelength_angstrom: f64,
    ) -> f64;
}

impl<T: SedModel + ?Sized> SedModel for &T {
    fn luminosity_density(
        &self,
        age_gyr: f64,
        metallicity: f64,
        mass_msol: f64,
        wavelength_angstrom: f64,
    ) -> f64 {
        (**self).luminosity_density(age_gyr, metallicity, mass_msol, wavelength_angstrom)
    }
}

//! Photometric bandpasses and the SED synthesis seam.

pub mod bandpass;
pub mod filters;
pub mod sed;

pub use bandpass::{Bandpass, BandpassError};
pub use filters::bandpass_for;
pub use sed::SedModel;

/// Physical constants in CGS units for flux calculations.
pub struct Cgs {}

impl Cgs {
    /// Solar bolometric luminosity.
    /// Units: 3.828e33 erg/s
    pub const SOLAR_LUMINOSITY: f64 = 3.828e33;

    /// One kiloparsec.
    /// Units: 3.0856775814913673e21 cm
    pub const KPC_IN_CM: f64 = 3.085_677_581_491_367_3e21;
}

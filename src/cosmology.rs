//! Fixed flat-LCDM cosmology for angular and luminosity distances.
//!
//! The pipeline commits to one cosmology (H0 = 70 km/s/Mpc, Omega_m = 0.3,
//! Omega_Lambda = 0.7) so every stage sees the same angular scale for a
//! given redshift. Comoving distance is integrated with the trapezoidal
//! rule over 1/E(z); at the redshifts IFU surveys probe (z < ~1) the fixed
//! 1000-step grid is accurate to well below the spatial pixel scale.

/// Hubble constant, km/s/Mpc.
pub const HUBBLE_KMS_PER_MPC: f64 = 70.0;

/// Matter density parameter.
pub const OMEGA_M: f64 = 0.3;

/// Dark energy density parameter.
pub const OMEGA_LAMBDA: f64 = 0.7;

/// Speed of light, km/s.
pub const SPEED_OF_LIGHT_KMS: f64 = 2.997_924_58e5;

/// One arcsecond in radians.
pub const ARCSEC_IN_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

const INTEGRATION_STEPS: usize = 1000;

/// Dimensionless Hubble parameter E(z) for a flat universe.
fn hubble_e(z: f64) -> f64 {
    (OMEGA_M * (1.0 + z).powi(3) + OMEGA_LAMBDA).sqrt()
}

/// Line-of-sight comoving distance in Mpc.
pub fn comoving_distance_mpc(z: f64) -> f64 {
    let hubble_distance = SPEED_OF_LIGHT_KMS / HUBBLE_KMS_PER_MPC;
    let dz = z / INTEGRATION_STEPS as f64;
    let mut integral = 0.0;
    for i in 0..INTEGRATION_STEPS {
        let z0 = i as f64 * dz;
        let z1 = z0 + dz;
        integral += 0.5 * dz * (1.0 / hubble_e(z0) + 1.0 / hubble_e(z1));
    }
    hubble_distance * integral
}

/// Angular diameter distance in Mpc: `d_C / (1 + z)`.
pub fn angular_diameter_distance_mpc(z: f64) -> f64 {
    comoving_distance_mpc(z) / (1.0 + z)
}

/// Luminosity distance in Mpc: `(1 + z) d_C`.
pub fn luminosity_distance_mpc(z: f64) -> f64 {
    (1.0 + z) * comoving_distance_mpc(z)
}

/// Physical scale at redshift `z` in kpc per arcsecond.
pub fn kpc_per_arcsec(z: f64) -> f64 {
    angular_diameter_distance_mpc(z) * 1000.0 * ARCSEC_IN_RAD
}

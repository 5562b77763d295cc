//! Simulation particle records.
//!
//! A catalog is an ordered slice of [`Particle`] values supplied by an
//! external reader. Positions are in kiloparsecs, velocities in km/s and
//! masses in solar masses. Particles are immutable once read; the frame
//! transformer produces transformed copies rather than mutating in place.

use nalgebra::Vector3;

/// Gadget-style particle type tag.
///
/// Catalog readers group particles as PartType0-4; the tag is carried so
/// observations can select a subset (for example stars + disc + bulge)
/// before entering the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleType {
    Gas,
    DarkMatter,
    Disc,
    Bulge,
    Star,
}

/// How a particle's luminosity is obtained.
///
/// The variant is dispatched exactly once, in the flux generator: simple
/// particles use a fixed mass-to-light ratio, stellar population particles
/// go through SED synthesis when a photometric filter is configured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source {
    /// Fixed mass-to-light conversion.
    Simple,
    /// Stellar population with age and metallicity, eligible for SED
    /// synthesis.
    StellarPopulation { age_gyr: f64, metallicity: f64 },
}

/// One simulation particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Mass in solar masses.
    pub mass: f64,
    /// Position in kpc.
    pub position: Vector3<f64>,
    /// Velocity in km/s.
    pub velocity: Vector3<f64>,
    /// Luminosity source variant.
    pub source: Source,
    /// Optional catalog particle type.
    pub particle_type: Option<ParticleType>,
}

impl Particle {
    /// Create a simple-luminous particle.
    pub fn simple(mass: f64, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self {
            mass,
            position,
            velocity,
            source: Source::Simple,
            particle_type: None,
        }
    }

    /// Create a stellar population particle with age (Gyr) and metallicity.
    pub fn stellar(
        mass: f64,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        age_gyr: f64,
        metallicity: f64,
    ) -> Self {
        Self {
            mass,
            position,
            velocity,
            source: Source::StellarPopulation {
                age_gyr,
                metallicity,
            },
            particle_type: Some(ParticleType::Star),
        }
    }

    /// Attach a catalog particle type tag.
    pub fn with_type(mut self, particle_type: ParticleType) -> Self {
        self.particle_type = Some(particle_type);
        self
    }

    /// Line-of-sight velocity component (km/s) in the observer frame.
    ///
    /// Only meaningful after the frame transformer has rotated the catalog
    /// so the observation axis is +z.
    pub fn los_velocity(&self) -> f64 {
        self.velocity.z
    }

    /// True when mass, position and velocity are all finite.
    pub fn is_finite(&self) -> bool {
        self.mass.is_finite()
            && self.position.iter().all(|c| c.is_finite())
            && self.velocity.iter().all(|c| c.is_finite())
    }
}

/// Select particles whose type tag is in `types`.
///
/// Untagged particles are dropped. Catalog order is preserved, which the
/// cell assignment stage relies on for reproducible summation order.
pub fn select_types(particles: &[Particle], types: &[ParticleType]) -> Vec<Particle> {
    particles
        .iter()
        .filter(|p| p.particle_type.is_some_and(|t| types.contains(&t)))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_check_rejects_nan_velocity() {
        let mut p = Particle::simple(1.0, Vector3::zeros(), Vector3::zeros());
        assert!(p.is_finite());
        p.velocity.y = f64::NAN;
        assert!(!p.is_finite());
    }

    #[test]
    fn test_finite_check_rejects_infinite_position() {
        let mut p = Particle::simple(1.0, Vector3::zeros(), Vector3::zeros());
        p.position.x = f64::INFINITY;
        assert!(!p.is_finite());
    }

    #[test]
    fn test_select_types_preserves_order() {
        let parts = vec![
            Particle::simple(1.0, Vector3::zeros(), Vector3::zeros())
                .with_type(ParticleType::Gas),
            Particle::simple(2.0, Vector3::zeros(), Vector3::zeros())
                .with_type(ParticleType::Disc),
            Particle::simple(3.0, Vector3::zeros(), Vector3::zeros())
                .with_type(ParticleType::Bulge),
            Particle::simple(4.0, Vector3::zeros(), Vector3::zeros())
                .with_type(ParticleType::Disc),
        ];

        let selected = select_types(&parts, &[ParticleType::Disc, ParticleType::Bulge]);
        let masses: Vec<f64> = selected.iter().map(|p| p.mass).collect();
        assert_eq!(masses, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_select_types_drops_untagged() {
        let parts = vec![Particle::simple(1.0, Vector3::zeros(), Vector3::zeros())];
        assert!(select_types(&parts, &[ParticleType::Gas]).is_empty());
    }
}

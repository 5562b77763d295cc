//! Galaxy rest-frame transformation.
//!
//! Recenters a catalog on its mass-weighted centroid (positions and
//! velocities) and rotates it to the requested inclination, so the
//! observation axis is +z and the sky plane is x-y. The transform is pure;
//! callers observing the same catalog repeatedly should cache its output,
//! since recentring walks the whole catalog.

use nalgebra::{Rotation3, Vector3};
use tracing::debug;

use crate::particle::Particle;

/// Transform a catalog into the observer frame.
///
/// The mass-weighted centroid of positions and velocities is subtracted,
/// then the catalog is rotated about the x axis by `inclination_deg`
/// (0 = face-on). After rotation, [`Particle::los_velocity`] is the
/// line-of-sight velocity.
///
/// At inclination 0 the function is idempotent: a catalog that is already
/// centered has a zero centroid, so a second application returns the input
/// unchanged.
pub fn to_observer_frame(particles: &[Particle], inclination_deg: f64) -> Vec<Particle> {
    let (position_centroid, velocity_centroid) = mass_weighted_centroid(particles);
    let rotation = Rotation3::from_axis_angle(&Vector3::x_axis(), inclination_deg.to_radians());

    debug!(
        n = particles.len(),
        inclination_deg, "transforming catalog to observer frame"
    );

    particles
        .iter()
        .map(|p| {
            let mut out = *p;
            out.position = rotation * (p.position - position_centroid);
            out.velocity = rotation * (p.velocity - velocity_centroid);
            out
        })
        .collect()
}

/// Mass-weighted centroid of positions and velocities.
///
/// Falls back to the zero centroid when the catalog is empty or carries no
/// mass, leaving such catalogs untranslated.
fn mass_weighted_centroid(particles: &[Particle]) -> (Vector3<f64>, Vector3<f64>) {
    let mut total_mass = 0.0;
    let mut position_sum = Vector3::zeros();
    let mut velocity_sum = Vector3::zeros();
    for p in particles.iter().filter(|p| p.is_finite()) {
        total_mass += p.mass;
        position_sum += p.mass * p.position;
        velocity_sum += p.mass * p.velocity;
    }
    if total_mass > 0.0 {
        (position_sum / total_mass, velocity_sum / total_mass)
    } else {
        (Vector3::zeros(), Vector3::zeros())
    }
}

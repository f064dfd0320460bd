use serde::{Deserialize, Serialize};

use crate::membrane::particles::Particles;
use crate::{Scalar, Vec3};

/// A user-placed point that pulls the membrane down around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mass {
    pub point: Vec3,
    /// Nominal size of the mass. Only used for display.
    pub radius: Scalar,
}

/// Where a mass currently rests on the membrane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassMarker {
    /// Index of the particle closest to the mass.
    pub closest: usize,
    /// Position of that particle.
    pub surface: Vec3,
    /// Where to draw the mass: above its point, one unit over the closest particle.
    pub position: Vec3,
}

/// Depression of a particle at distance `dist` from a mass. Zero outside `influence_radius`.
pub fn depression(dist: Scalar, influence_radius: Scalar) -> Scalar {
    if dist < influence_radius {
        2. * (-dist * dist / (influence_radius * 1.5)).exp()
    } else {
        0.
    }
}

/// Sinks every free particle near `mass`. Applied on every call with no baseline, so repeated
/// calls keep deepening the well.
pub fn apply_mass(mass: &Mass, particles: &mut Particles, influence_radius: Scalar) {
    for (pos, &fixed) in particles.position.iter_mut().zip(&particles.fixed) {
        if fixed {
            continue;
        }

        let dist = (*pos - mass.point).magnitude();
        pos.z -= depression(dist, influence_radius);
    }
}

/// Locates the particle under `mass`. `None` only when there are no particles at all.
pub fn marker(mass: &Mass, particles: &Particles) -> Option<MassMarker> {
    let (closest, _) = particles.closest_to(&mass.point)?;
    let surface = particles.position[closest];

    Some(MassMarker {
        closest,
        surface,
        position: Vec3::new(mass.point.x, mass.point.y, surface.z + 1.),
    })
}

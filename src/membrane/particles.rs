use crate::{Scalar, Vec3};
use itertools::izip;

/// Contains all of the particle data. A particle's identity is its index into these arrays;
/// indices are never reused or reordered within one build.
#[derive(Debug, Clone, Default)]
pub struct Particles {
    pub position: Vec<Vec3>,
    pub previous: Vec<Vec3>,
    /// Fixed particles anchor the membrane and are never moved by the simulation.
    pub fixed: Vec<bool>,
}

impl Particles {
    /// Adds a particle at rest at `position`, returning its index.
    pub(crate) fn add_particle(&mut self, position: Vec3, fixed: bool) -> usize {
        let index = self.position.len();
        self.position.push(position);
        self.previous.push(position);
        self.fixed.push(fixed);
        index
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn num_fixed(&self) -> usize {
        self.fixed.iter().filter(|&&f| f).count()
    }

    /// Damped Verlet step with no external forces: the velocity is estimated from the last
    /// step's displacement, scaled by `damping`. Fixed particles keep both their position and
    /// their history untouched.
    pub fn integrate(&mut self, damping: Scalar) {
        for (pos, prev, &fixed) in izip!(&mut self.position, &mut self.previous, &self.fixed) {
            if fixed {
                continue;
            }

            let velocity = (*pos - *prev) * damping;
            *prev = *pos;
            *pos += velocity;
        }
    }

    /// Positions flattened to `[x0, y0, z0, x1, ...]` in index order.
    pub fn flat_positions(&self) -> Vec<Scalar> {
        self.position.iter().flat_map(|p| p.iter().copied()).collect()
    }

    /// The first particle (in index order) closest to `point`, with its distance.
    pub fn closest_to(&self, point: &Vec3) -> Option<(usize, Scalar)> {
        self.position
            .iter()
            .map(|p| (p - point).magnitude())
            .enumerate()
            .fold(None, |best, (i, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((i, d)),
            })
    }
}

use crate::membrane::Membrane;
use crate::Scalar;
use itertools::izip;

pub trait MembraneStatistics {
    fn total_ticks(&self) -> usize;
    fn num_free(&self) -> usize;
    fn num_fixed(&self) -> usize;
    /// Depth of the lowest particle below z = 0 (zero for a flat or empty membrane).
    fn max_depth(&self) -> Scalar;
    /// Mean of |length - rest length| / rest length over all springs.
    fn mean_strain(&self) -> Scalar;
    /// Sum of squared per-tick displacements. Proportional to kinetic energy for unit masses.
    fn kinetic_energy(&self) -> Scalar;
    fn spring_energy(&self) -> Scalar;
}

impl MembraneStatistics for Membrane {
    fn total_ticks(&self) -> usize {
        self.ticks()
    }

    fn num_free(&self) -> usize {
        self.particles().len() - self.particles().num_fixed()
    }

    fn num_fixed(&self) -> usize {
        self.particles().num_fixed()
    }

    fn max_depth(&self) -> Scalar {
        self.particles()
            .position
            .iter()
            .map(|p| -p.z)
            .fold(0., Scalar::max)
    }

    fn mean_strain(&self) -> Scalar {
        let springs = self.springs();
        if springs.is_empty() {
            return 0.;
        }

        let position = &self.particles().position;
        let total: Scalar = springs
            .iter()
            .filter(|s| s.rest_length > 0.)
            .map(|s| {
                let length = (position[s.j] - position[s.i]).magnitude();
                (length - s.rest_length).abs() / s.rest_length
            })
            .sum();

        total / springs.len() as Scalar
    }

    fn kinetic_energy(&self) -> Scalar {
        let particles = self.particles();
        izip!(&particles.position, &particles.previous, &particles.fixed)
            .filter(|&(_, _, &fixed)| !fixed)
            .map(|(x, prev, _)| (x - prev).magnitude_squared())
            .sum()
    }

    fn spring_energy(&self) -> Scalar {
        let position = &self.particles().position;
        let stretch: Scalar = self
            .springs()
            .iter()
            .map(|s| {
                let length = (position[s.j] - position[s.i]).magnitude();
                (length - s.rest_length).powi(2)
            })
            .sum();

        0.5 * self.params().stiffness * stretch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MembraneParameters, Vec3};

    #[test]
    fn flat_membrane_is_relaxed() {
        let membrane = Membrane::new(MembraneParameters {
            grid_size: 12,
            ..Default::default()
        });

        assert_eq!(membrane.total_ticks(), 0);
        assert_eq!(
            membrane.num_free() + membrane.num_fixed(),
            membrane.particles().len()
        );
        assert_eq!(membrane.max_depth(), 0.);
        assert!(membrane.mean_strain() < 1e-12);
        assert_eq!(membrane.kinetic_energy(), 0.);
        assert!(membrane.spring_energy() < 1e-20);
    }

    #[test]
    fn masses_stretch_the_membrane() {
        let mut membrane = Membrane::new(MembraneParameters {
            grid_size: 12,
            ..Default::default()
        });
        membrane.add_mass(Vec3::zeros());
        membrane.tick();

        assert_eq!(membrane.total_ticks(), 1);
        assert!(membrane.max_depth() > 0.);
        assert!(membrane.mean_strain() > 0.);
        assert!(membrane.kinetic_energy() > 0.);
        assert!(membrane.spring_energy() > 0.);
    }

    #[test]
    fn empty_membrane() {
        let membrane = Membrane::new(MembraneParameters {
            grid_size: 0,
            ..Default::default()
        });

        assert_eq!(membrane.num_free(), 0);
        assert_eq!(membrane.max_depth(), 0.);
        assert_eq!(membrane.mean_strain(), 0.);
        assert_eq!(membrane.spring_energy(), 0.);
    }
}

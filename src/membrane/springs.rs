use std::collections::HashSet;

use crate::grid::HexGrid;
use crate::membrane::particles::Particles;
use crate::Scalar;

/// An undirected distance constraint between particles `i` and `j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub i: usize,
    pub j: usize,
    /// Distance between the endpoints at build time. Never changes afterwards.
    pub rest_length: Scalar,
}

/// Connects every particle to its hex neighbors, one spring per unordered pair. Springs are
/// stored in discovery order, which is also the order they are relaxed in.
pub fn build_springs(grid: &HexGrid, particles: &Particles) -> Vec<Spring> {
    let mut springs = Vec::new();
    let mut seen = HashSet::new();

    for (coord, i) in grid.occupied() {
        for j in grid.neighbors(coord) {
            if i == j || !seen.insert((i.min(j), i.max(j))) {
                continue;
            }

            springs.push(Spring {
                i,
                j,
                rest_length: (particles.position[j] - particles.position[i]).magnitude(),
            });
        }
    }

    springs
}

/// A single relaxation sweep: each spring moves its free endpoints a fraction `stiffness / 2`
/// of the way towards its rest length. This is deliberately not iterated to convergence.
pub fn relax(springs: &[Spring], particles: &mut Particles, stiffness: Scalar) {
    if stiffness == 0. {
        return;
    }

    for spring in springs {
        let diff = particles.position[spring.j] - particles.position[spring.i];
        let dist = diff.magnitude();

        // Coincident endpoints have no direction to push along.
        if dist <= Scalar::EPSILON {
            continue;
        }

        let offset = diff * ((dist - spring.rest_length) / dist * 0.5 * stiffness);

        if !particles.fixed[spring.i] {
            particles.position[spring.i] += offset;
        }
        if !particles.fixed[spring.j] {
            particles.position[spring.j] -= offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::build_grid;
    use crate::Vec3;
    use proptest::prelude::*;

    #[test]
    fn small_hexagon_springs() {
        let (grid, particles) = build_grid(4, 1.5);
        let springs = build_springs(&grid, &particles);

        // Six spokes and six rim edges.
        assert_eq!(springs.len(), 12);
        for spring in &springs {
            assert!((spring.rest_length - 1.5).abs() < 1e-12);
        }
    }

    #[test]
    fn relax_pulls_stretched_spring() {
        let mut particles = Particles::default();
        particles.add_particle(Vec3::zeros(), false);
        particles.add_particle(Vec3::new(4., 0., 0.), false);
        let springs = [Spring {
            i: 0,
            j: 1,
            rest_length: 2.,
        }];

        relax(&springs, &mut particles, 1.);

        assert_eq!(particles.position[0], Vec3::new(1., 0., 0.));
        assert_eq!(particles.position[1], Vec3::new(3., 0., 0.));
    }

    #[test]
    fn relax_leaves_fixed_endpoint() {
        let mut particles = Particles::default();
        particles.add_particle(Vec3::zeros(), true);
        particles.add_particle(Vec3::new(1., 0., 0.), false);
        let springs = [Spring {
            i: 0,
            j: 1,
            rest_length: 2.,
        }];

        relax(&springs, &mut particles, 1.);

        assert_eq!(particles.position[0], Vec3::zeros());
        assert_eq!(particles.position[1], Vec3::new(1.5, 0., 0.));
    }

    #[test]
    fn coincident_particles_do_not_produce_nans() {
        let mut particles = Particles::default();
        particles.add_particle(Vec3::new(1., 1., 1.), false);
        particles.add_particle(Vec3::new(1., 1., 1.), false);
        let springs = [Spring {
            i: 0,
            j: 1,
            rest_length: 1.,
        }];

        relax(&springs, &mut particles, 1.);

        assert_eq!(particles.position[0], Vec3::new(1., 1., 1.));
        assert_eq!(particles.position[1], Vec3::new(1., 1., 1.));
    }

    #[test]
    fn zero_stiffness_is_a_no_op() {
        let (grid, mut particles) = build_grid(8, 1.);
        let springs = build_springs(&grid, &particles);
        for p in particles.position.iter_mut() {
            p.z += p.x * p.y;
        }
        let before = particles.position.clone();

        relax(&springs, &mut particles, 0.);

        assert_eq!(particles.position, before);
    }

    proptest! {
        #[test]
        fn springs_are_unique_and_measured(size in 0usize..30, spacing in 0.1f64..5.) {
            let (grid, particles) = build_grid(size, spacing);
            let springs = build_springs(&grid, &particles);

            let mut pairs = HashSet::new();
            for s in &springs {
                prop_assert_ne!(s.i, s.j);
                prop_assert!(s.i < particles.len() && s.j < particles.len());
                prop_assert!(pairs.insert((s.i.min(s.j), s.i.max(s.j))));

                let dist = (particles.position[s.j] - particles.position[s.i]).magnitude();
                prop_assert_eq!(s.rest_length, dist);
                prop_assert!((s.rest_length - spacing).abs() < 1e-9 * spacing.max(1.));
            }
        }
    }
}

use crate::{Scalar, Simulation, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A pattern of masses placed on a freshly built (flat) membrane.
pub trait MassLayout {
    fn add_masses<S: Simulation>(&self, s: &mut S);
}

/// Masses evenly spaced on a circle in the z = 0 plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    pub count: usize,
    pub center: Vec3,
    pub radius: Scalar,
}

impl Default for Ring {
    fn default() -> Self {
        Ring {
            count: 6,
            center: Vec3::zeros(),
            radius: 20.,
        }
    }
}

impl MassLayout for Ring {
    fn add_masses<S: Simulation>(&self, s: &mut S) {
        for k in 0..self.count {
            let angle = k as Scalar / self.count as Scalar * std::f64::consts::TAU;
            let offset = Vec3::new(angle.cos(), angle.sin(), 0.) * self.radius;

            s.add_mass(Vec3::new(self.center.x, self.center.y, 0.) + offset);
        }
    }
}

/// Masses scattered uniformly over a disc around the origin. Seeded, so the same layout is
/// produced every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scatter {
    pub count: usize,
    pub radius: Scalar,
    pub seed: u64,
}

impl Default for Scatter {
    fn default() -> Self {
        Scatter {
            count: 4,
            radius: 30.,
            seed: 0,
        }
    }
}

impl MassLayout for Scatter {
    fn add_masses<S: Simulation>(&self, s: &mut S) {
        let mut rng = StdRng::seed_from_u64(self.seed);

        for _ in 0..self.count {
            let point = loop {
                let rand: [Scalar; 2] = rng.gen();
                let x = (2. * rand[0] - 1.) * self.radius;
                let y = (2. * rand[1] - 1.) * self.radius;

                if x * x + y * y <= self.radius * self.radius {
                    break Vec3::new(x, y, 0.);
                }
            };

            s.add_mass(point);
        }
    }
}

/// Either layout, as read from a settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Layout {
    Ring(Ring),
    Scatter(Scatter),
}

impl MassLayout for Layout {
    fn add_masses<S: Simulation>(&self, s: &mut S) {
        match self {
            Layout::Ring(ring) => ring.add_masses(s),
            Layout::Scatter(scatter) => scatter.add_masses(s),
        }
    }
}

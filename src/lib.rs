pub mod grid;
pub mod initial_condition;
pub mod membrane;
pub mod mesh;
pub mod statistics;

extern crate nalgebra as na;

pub use crate::membrane::{BuildOutput, Membrane, MembraneParameters, SinkMode};
pub use crate::mesh::Vertex;

pub type Scalar = f64;
pub type Vec3 = na::Vector3<Scalar>;

/// The interface a host render loop drives: one `simulate_frame` per rendered frame, and
/// `add_mass` whenever the user designates a new point on the surface.
pub trait Simulation {
    type Parameters;

    fn new(params: Self::Parameters) -> Self;

    fn simulate_frame(&mut self) -> Vec<Vertex>;

    fn add_mass(&mut self, point: Vec3);
}

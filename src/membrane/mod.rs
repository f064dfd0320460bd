pub mod influence;
pub mod parameters;
pub mod particles;
pub mod springs;

pub use influence::{Mass, MassMarker};
pub use parameters::{MembraneParameters, SinkMode};

use tracing::{debug, info, trace, warn};

use crate::grid::{build_grid, HexGrid};
use crate::mesh::{triangulate, Triangle, Vertex};
use crate::{Scalar, Simulation, Vec3};
use particles::Particles;
use springs::Spring;

/// Everything derived from one build of the grid. Rebuilding replaces the whole thing at once.
#[derive(Debug, Clone, Default)]
pub struct MembraneState {
    pub particles: Particles,
    pub springs: Vec<Spring>,
    pub grid: HexGrid,
    pub triangles: Vec<Triangle>,
}

impl MembraneState {
    pub fn new(grid_size: usize, spacing: Scalar) -> Self {
        let (grid, particles) = build_grid(grid_size, spacing);
        let springs = springs::build_springs(&grid, &particles);
        let triangles = triangulate(&grid);

        MembraneState {
            particles,
            springs,
            grid,
            triangles,
        }
    }
}

/// What the renderer needs after a rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    /// Flat `[x, y, z, ...]` positions in particle order.
    pub positions: Vec<Scalar>,
    pub triangles: Vec<Triangle>,
}

/// Contains all of the state for the membrane simulation.
pub struct Membrane {
    state: MembraneState,
    masses: Vec<Mass>,
    markers: Vec<Option<MassMarker>>,
    params: MembraneParameters,
    pending_build: Option<(usize, Scalar)>,
    /// Masses below this index have already sunk the current build (`SinkMode::OneShot`).
    settled_masses: usize,
    ticks: usize,
}

impl Membrane {
    /// Creates a membrane and builds its grid from `params`. Out-of-range values are clamped or
    /// replaced by their defaults.
    pub fn new(params: MembraneParameters) -> Self {
        let mut membrane = Membrane {
            state: MembraneState::default(),
            masses: Vec::new(),
            markers: Vec::new(),
            params: MembraneParameters::default(),
            pending_build: None,
            settled_masses: 0,
            ticks: 0,
        };

        membrane.set_stiffness(params.stiffness);
        membrane.set_damping(params.damping);
        membrane.set_influence_radius(params.influence_radius);
        membrane.set_mass_radius(params.mass_radius);
        membrane.set_sink_mode(params.sink_mode);
        membrane.set_grid_size(params.grid_size);
        membrane.set_spacing(params.spacing);
        membrane.build(membrane.params.grid_size, membrane.params.spacing);

        membrane
    }

    /// Throws away the current particles, springs and triangles and lays out a fresh grid.
    /// Masses are kept and will act on the new grid.
    pub fn build(&mut self, grid_size: usize, spacing: Scalar) -> BuildOutput {
        self.set_grid_size(grid_size);
        self.set_spacing(spacing);

        let state = MembraneState::new(self.params.grid_size, self.params.spacing);

        if state.particles.is_empty() {
            warn!(
                grid_size = self.params.grid_size,
                "Grid is too small to hold any particles, the membrane is empty"
            );
        }
        info!(
            grid_size = self.params.grid_size,
            spacing = self.params.spacing,
            particles = state.particles.len(),
            fixed = state.particles.num_fixed(),
            springs = state.springs.len(),
            triangles = state.triangles.len(),
            "Built membrane"
        );

        self.state = state;
        self.pending_build = None;
        self.settled_masses = 0;
        self.refresh_markers();

        BuildOutput {
            positions: self.state.particles.flat_positions(),
            triangles: self.state.triangles.clone(),
        }
    }

    /// Queues a rebuild to run at the start of the next tick. A later request replaces an
    /// earlier one.
    pub fn request_build(&mut self, grid_size: usize, spacing: Scalar) {
        debug!(grid_size, spacing, "Queued rebuild");
        self.pending_build = Some((grid_size, spacing));
    }

    /// Clears every mass and rebuilds the grid from the current parameters.
    pub fn reset(&mut self) -> BuildOutput {
        self.masses.clear();
        self.markers.clear();
        self.build(self.params.grid_size, self.params.spacing)
    }

    /// Advances the simulation by one step: integrate, relax the springs once, then let the
    /// masses sink the membrane.
    pub fn tick(&mut self) {
        if let Some((grid_size, spacing)) = self.pending_build.take() {
            self.build(grid_size, spacing);
        }

        let particles = &mut self.state.particles;
        particles.integrate(self.params.damping);
        springs::relax(&self.state.springs, particles, self.params.stiffness);

        let first = match self.params.sink_mode {
            SinkMode::Cumulative => 0,
            SinkMode::OneShot => self.settled_masses,
        };
        for mass in &self.masses[first..] {
            influence::apply_mass(mass, particles, self.params.influence_radius);
        }
        self.settled_masses = self.masses.len();

        self.refresh_markers();
        self.ticks += 1;
        trace!(tick = self.ticks, "Simulated tick");
    }

    /// Places a new mass at `point`, which should already lie on the membrane surface.
    pub fn add_mass(&mut self, point: Vec3) {
        let mass = Mass {
            point,
            radius: self.params.mass_radius,
        };
        debug!(x = point.x, y = point.y, z = point.z, "Added mass");

        self.markers
            .push(influence::marker(&mass, &self.state.particles));
        self.masses.push(mass);
    }

    fn refresh_markers(&mut self) {
        let particles = &self.state.particles;
        self.markers = self
            .masses
            .iter()
            .map(|mass| influence::marker(mass, particles))
            .collect();
    }

    pub fn set_stiffness(&mut self, stiffness: Scalar) {
        let clamped = parameters::clamp_stiffness(stiffness);
        if clamped != stiffness {
            warn!(stiffness, clamped, "Stiffness must be non-negative, clamping");
        }
        self.params.stiffness = clamped;
    }

    pub fn set_damping(&mut self, damping: Scalar) {
        if damping.is_finite() {
            self.params.damping = damping;
        } else {
            warn!(damping, "Ignoring non-finite damping");
        }
    }

    pub fn set_influence_radius(&mut self, influence_radius: Scalar) {
        match parameters::positive(influence_radius) {
            Some(r) => self.params.influence_radius = r,
            None => warn!(influence_radius, "Ignoring non-positive influence radius"),
        }
    }

    /// Only affects masses placed after the call.
    pub fn set_mass_radius(&mut self, mass_radius: Scalar) {
        match parameters::positive(mass_radius) {
            Some(r) => self.params.mass_radius = r,
            None => warn!(mass_radius, "Ignoring non-positive mass radius"),
        }
    }

    pub fn set_sink_mode(&mut self, sink_mode: SinkMode) {
        if sink_mode != self.params.sink_mode {
            // Masses placed so far have already done their sinking.
            self.settled_masses = self.masses.len();
        }
        self.params.sink_mode = sink_mode;
    }

    /// Takes effect on the next build.
    pub fn set_grid_size(&mut self, grid_size: usize) {
        if grid_size <= parameters::MAX_GRID_SIZE {
            self.params.grid_size = grid_size;
        } else {
            warn!(
                grid_size,
                max = parameters::MAX_GRID_SIZE,
                "Ignoring oversized grid size"
            );
        }
    }

    /// Takes effect on the next build.
    pub fn set_spacing(&mut self, spacing: Scalar) {
        match parameters::positive(spacing) {
            Some(s) => self.params.spacing = s,
            None => warn!(spacing, "Ignoring non-positive spacing"),
        }
    }

    pub fn params(&self) -> &MembraneParameters {
        &self.params
    }

    pub fn particles(&self) -> &Particles {
        &self.state.particles
    }

    pub fn springs(&self) -> &[Spring] {
        &self.state.springs
    }

    pub fn grid(&self) -> &HexGrid {
        &self.state.grid
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.state.triangles
    }

    pub fn masses(&self) -> &[Mass] {
        &self.masses
    }

    /// Per mass, the particle it rests on. `None` while the membrane is empty.
    pub fn markers(&self) -> &[Option<MassMarker>] {
        &self.markers
    }

    /// Number of ticks simulated since the membrane was created.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Flat `[x, y, z, ...]` positions in particle order, for upload to the GPU.
    pub fn position_buffer(&self) -> Vec<Scalar> {
        self.state.particles.flat_positions()
    }

    /// Flat triangle indices, for upload to the GPU.
    pub fn index_buffer(&self) -> Vec<u32> {
        self.state
            .triangles
            .iter()
            .flat_map(|t| t.iter().map(|&i| i as u32))
            .collect()
    }

    /// Returns an array of `Vertex`es, to be passed to the renderer. Vertices are colored by
    /// how deep they have sunk.
    pub fn vertices(&self) -> Vec<Vertex> {
        crate::mesh::vertices(&self.state.particles.position, &self.state.triangles)
    }
}

impl Simulation for Membrane {
    type Parameters = MembraneParameters;

    fn new(params: MembraneParameters) -> Self {
        Membrane::new(params)
    }

    fn simulate_frame(&mut self) -> Vec<Vertex> {
        self.tick();
        self.vertices()
    }

    fn add_mass(&mut self, point: Vec3) {
        Membrane::add_mass(self, point)
    }
}

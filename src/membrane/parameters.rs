use serde::{Deserialize, Serialize};

use crate::Scalar;

/// Largest accepted grid size. The index square holds `MAX_GRID_SIZE²` cells.
pub const MAX_GRID_SIZE: usize = 4096;

/// A struct containing all of the high-level parameters for the membrane simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembraneParameters {
    /// Side length of the square index grid that gets clipped to a hexagon.
    pub grid_size: usize,
    /// Distance between neighboring particles.
    pub spacing: Scalar,
    /// Fraction of each spring's error corrected per tick. Zero disables the springs.
    pub stiffness: Scalar,
    /// Fraction of the previous step's displacement carried into the next one.
    pub damping: Scalar,
    /// Particles further than this from a mass are not affected by it.
    pub influence_radius: Scalar,
    /// Radius given to newly placed masses.
    pub mass_radius: Scalar,
    pub sink_mode: SinkMode,
}

/// How masses deform the membrane over time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SinkMode {
    /// Every mass depresses the membrane again on every tick, so wells deepen without bound.
    Cumulative,
    /// Every mass depresses the membrane once, on the first tick after it is placed (or after
    /// a rebuild).
    OneShot,
}

impl Default for SinkMode {
    fn default() -> Self {
        SinkMode::Cumulative
    }
}

impl Default for MembraneParameters {
    fn default() -> Self {
        Self {
            grid_size: 60,
            spacing: 1.5,
            stiffness: 1.,
            damping: 0.5,
            influence_radius: 10.,
            mass_radius: 5.,
            sink_mode: SinkMode::default(),
        }
    }
}

impl MembraneParameters {
    /// Checks that every value describes a well-defined simulation.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.grid_size > MAX_GRID_SIZE {
            return Err(eyre::eyre!(
                "grid_size must be at most {}, got {}",
                MAX_GRID_SIZE,
                self.grid_size
            ));
        }
        if !(self.stiffness >= 0.) {
            return Err(eyre::eyre!(
                "stiffness must be non-negative, got {}",
                self.stiffness
            ));
        }
        if !self.damping.is_finite() {
            return Err(eyre::eyre!("damping must be finite, got {}", self.damping));
        }
        for (name, value) in [
            ("spacing", self.spacing),
            ("influence_radius", self.influence_radius),
            ("mass_radius", self.mass_radius),
        ] {
            if !(value > 0.) || !value.is_finite() {
                return Err(eyre::eyre!("{} must be positive, got {}", name, value));
            }
        }
        Ok(())
    }

    /// Reads parameters from a JSON document. Missing fields take their default value.
    pub fn from_json(json: &[u8]) -> eyre::Result<Self> {
        use eyre::WrapErr;

        let params: Self =
            serde_json::from_slice(json).wrap_err("Serde failed to deserialize JSON.")?;
        params.validate()?;
        Ok(params)
    }
}

/// Clamps a stiffness to be non-negative. NaN is treated as zero.
pub(crate) fn clamp_stiffness(stiffness: Scalar) -> Scalar {
    if stiffness >= 0. {
        stiffness
    } else {
        0.
    }
}

/// Returns `value` if it is a finite, strictly positive number.
pub(crate) fn positive(value: Scalar) -> Option<Scalar> {
    if value > 0. && value.is_finite() {
        Some(value)
    } else {
        None
    }
}

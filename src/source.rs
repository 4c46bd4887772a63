use serde::{
    Deserialize,
    Serialize,
};

use crate::grid::Grid;

/// The analytic incident wave: a delayed Gaussian travelling in +x.
///
/// Evaluated as a pure function of (time, location), both in grid units.
/// The Courant number relates the two so the waveform can be sampled at
/// half-step offsets from the Ez nodes.
#[derive(Clone, Copy, Debug)]
pub struct GaussianPulse {
    pub delay: f64,
    pub width: f64,
    pub courant_number: f64,
}

impl GaussianPulse {
    pub fn evaluate(&self, time: f64, location: f64) -> f64 {
        let argument = (time - self.delay - location / self.courant_number) / self.width;
        (-argument * argument).exp()
    }
}

/// How the incident wave enters the grid. Selected once at setup.
///
/// The two strategies are not interchangeable: a hard source overwrites its
/// node and reflects returning energy, while the TFSF corrections are purely
/// additive and keep the scattered-field side free of source artifacts.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum SourceKind {
    /// Additive corrections at a total-field/scattered-field boundary.
    ///
    /// Ez indices above `boundary` form the total-field region; the
    /// E-correction lands at `boundary + 1`.
    TotalFieldScatteredField { boundary: usize },

    /// Overwrite a single interior Ez node with the incident value.
    ///
    /// The edge cells belong to the boundary treatment, which runs after the
    /// source correction and would overwrite them each step; setup rejects
    /// them.
    Hard { node: usize },
}

impl SourceKind {
    /// Correction applied between the H-update and the E-update.
    pub(crate) fn correct_h(&self, grid: &mut Grid, pulse: &GaussianPulse, step: usize) {
        match *self {
            SourceKind::TotalFieldScatteredField { boundary } => {
                grid.hy[boundary] -= pulse.evaluate(step as f64, 0.0) * grid.chye[boundary];
            }
            SourceKind::Hard { .. } => {}
        }
    }

    /// Correction applied after the E-update, before the boundary treatment.
    pub(crate) fn correct_e(&self, grid: &mut Grid, pulse: &GaussianPulse, step: usize) {
        match *self {
            SourceKind::TotalFieldScatteredField { boundary } => {
                // half a step later in time, half a cell before the boundary
                grid.ez[boundary + 1] += pulse.evaluate(step as f64 + 0.5, -0.5);
            }
            SourceKind::Hard { node } => {
                grid.ez[node] = pulse.evaluate(step as f64, 0.0);
            }
        }
    }
}

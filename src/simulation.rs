use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    boundary::{
        AbcOrder,
        AnyAbc,
        BoundaryTreatment,
    },
    error::{
        Error,
        Instability,
    },
    grid::Grid,
    material::{
        Region,
        fill_coefficients,
    },
    source::{
        GaussianPulse,
        SourceKind,
    },
};

/// Everything the solver consumes at setup. Validated eagerly by
/// [`Simulation::new`]; nothing is committed on failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// number of Ez nodes, at least 4
    pub size: usize,
    /// time-step-to-space-step ratio, in (0, 1]
    pub courant_number: f64,
    pub regions: Vec<Region>,
    pub source: SourceConfig,
    pub boundary: AbcOrder,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub delay: f64,
    pub width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Stopped,
}

/// Per-step output for an external renderer or recorder.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    /// index of the step that just completed, starting at 0
    pub step: usize,
    pub ez: &'a [f64],
    pub hy: &'a [f64],
}

/// The simulation driver: owns the grid and runs the fixed per-step order
/// H-update → TFSF H-correction → E-update → TFSF E-correction → ABC.
#[derive(Clone, Debug)]
pub struct Simulation {
    grid: Grid,
    pulse: GaussianPulse,
    source: SourceKind,
    boundary: AnyAbc,
    step: usize,
    state: RunState,
}

impl Simulation {
    pub fn new(config: &SimulationConfig) -> Result<Self, Error> {
        if config.size < 4 {
            return Err(Error::GridTooSmall { size: config.size });
        }

        if !(config.courant_number > 0.0 && config.courant_number <= 1.0) {
            return Err(Instability::CourantNumber {
                value: config.courant_number,
            }
            .into());
        }

        let SourceConfig { kind, delay, width } = config.source;
        if !(delay > 0.0 && width > 0.0) {
            return Err(Instability::PulseShape { delay, width }.into());
        }
        match kind {
            SourceKind::TotalFieldScatteredField { boundary } => {
                // the E-correction at boundary + 1 must land in the interior
                if boundary >= config.size - 2 {
                    return Err(Error::OutOfRange {
                        index: boundary,
                        extent: config.size - 2,
                    });
                }
            }
            SourceKind::Hard { node } => {
                // the boundary treatment rewrites both edge cells after the
                // source correction, so an edge node would be overwritten
                // every step; only interior nodes can be hard-sourced
                if node == 0 || node >= config.size - 1 {
                    return Err(Error::OutOfRange {
                        index: node,
                        extent: config.size - 1,
                    });
                }
            }
        }

        let mut grid = Grid::new(config.size);
        fill_coefficients(&mut grid, &config.regions)?;
        let boundary = AnyAbc::new(config.boundary, &grid)?;

        tracing::debug!(
            size = config.size,
            courant_number = config.courant_number,
            regions = config.regions.len(),
            ?kind,
            order = ?config.boundary,
            "simulation ready",
        );

        Ok(Self {
            grid,
            pulse: GaussianPulse {
                delay,
                width,
                courant_number: config.courant_number,
            },
            source: kind,
            boundary,
            step: 0,
            state: RunState::Ready,
        })
    }

    /// Advances the fields by one time step.
    ///
    /// Sources are evaluated at the pre-increment step counter; the counter
    /// advances after the update sequence, so the first call completes
    /// step 0. A non-finite field value is fatal: the driver stops and the
    /// error names the array, cell, and step concerned.
    pub fn step(&mut self) -> Result<Snapshot<'_>, Error> {
        if self.state == RunState::Stopped {
            return Err(Error::Stopped);
        }

        let step = self.step;

        self.grid.update_h();
        self.source.correct_h(&mut self.grid, &self.pulse, step);
        self.grid.update_e();
        self.source.correct_e(&mut self.grid, &self.pulse, step);
        self.boundary.apply(&mut self.grid.ez);

        if let Some((field, index)) = self.grid.find_non_finite() {
            self.state = RunState::Stopped;
            let instability = Instability::NonFinite { field, index, step };
            tracing::error!(%instability, "field diverged; stopping");
            return Err(instability.into());
        }

        self.state = RunState::Running;
        self.step += 1;

        Ok(Snapshot {
            step,
            ez: &self.grid.ez,
            hy: &self.grid.hy,
        })
    }

    /// Explicit stop request; stepping afterwards is an error.
    pub fn stop(&mut self) {
        tracing::debug!(step = self.step, "stop requested");
        self.state = RunState::Stopped;
    }

    /// Zeroes fields and boundary history, keeping the medium.
    pub fn reset(&mut self) {
        self.grid.clear_fields();
        self.boundary.reset();
        self.step = 0;
        self.state = RunState::Ready;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Number of completed steps.
    pub fn step_count(&self) -> usize {
        self.step
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ez(&self) -> &[f64] {
        self.grid.ez()
    }

    pub fn hy(&self) -> &[f64] {
        self.grid.hy()
    }
}

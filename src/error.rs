use crate::boundary::Side;

#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid medium region specification: {0}")]
    InvalidRegion(#[from] RegionError),

    #[error("non-physical wave admittance {admittance} at the {side:?} boundary")]
    InvalidBoundaryMedium { side: Side, admittance: f64 },

    #[error("index {index} out of range for extent {extent}")]
    OutOfRange { index: usize, extent: usize },

    #[error("unstable configuration: {0}")]
    UnstableConfiguration(#[from] Instability),

    #[error("grid size {size} is too small for boundary treatment (minimum 4)")]
    GridTooSmall { size: usize },

    #[error("simulation is stopped")]
    Stopped,
}

/// Ways a medium region list can fail to tile the grid.
#[derive(Clone, Debug, thiserror::Error)]
pub enum RegionError {
    #[error("region list is empty")]
    Empty,

    #[error("first region starts at {start}, leaving cells before it unspecified")]
    DoesNotStartAtZero { start: usize },

    #[error("region starting at {start} overlaps the previous region starting at {previous}")]
    Overlapping { start: usize, previous: usize },

    #[error("region start {start} is beyond the grid extent {extent}")]
    StartBeyondGrid { start: usize, extent: usize },

    #[error("relative permittivity {value} is less than 1")]
    PermittivityBelowUnity { value: f64 },

    #[error("loss factor {value} is negative")]
    NegativeLoss { value: f64 },
}

#[derive(Clone, Copy, Debug, thiserror::Error)]
pub enum Instability {
    #[error("Courant number {value} is outside the stable range (0, 1]")]
    CourantNumber { value: f64 },

    #[error("incident pulse delay {delay} and width {width} must both be positive")]
    PulseShape { delay: f64, width: f64 },

    #[error("non-finite {field:?} value at cell {index} after step {step}")]
    NonFinite {
        field: FieldComponent,
        index: usize,
        step: usize,
    },
}

/// Names one of the two field arrays, for instability reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldComponent {
    Ez,
    Hy,
}

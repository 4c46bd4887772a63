//! One-dimensional FDTD solver on a staggered Yee grid.
//!
//! Ez and Hy leapfrog through time over a heterogeneous (lossless or lossy
//! dielectric) medium; an incident wave enters either through additive
//! total-field/scattered-field corrections or a hard source node, and the
//! grid edges run a first- or second-order absorbing boundary so outgoing
//! energy does not bounce back. Rendering and persistence are external: the
//! driver hands out a plain per-step snapshot of both field arrays.

pub mod boundary;
pub mod error;
pub mod executor;
pub mod grid;
pub mod material;
pub mod simulation;
pub mod source;

pub use crate::{
    boundary::{
        AbcOrder,
        AnyAbc,
        BoundaryTreatment,
        FirstOrderAbc,
        SecondOrderAbc,
    },
    error::Error,
    executor::Executor,
    grid::Grid,
    material::{
        FREE_SPACE_IMPEDANCE,
        Material,
        Region,
    },
    simulation::{
        RunState,
        Simulation,
        SimulationConfig,
        Snapshot,
        SourceConfig,
    },
    source::{
        GaussianPulse,
        SourceKind,
    },
};

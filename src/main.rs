use clap::Parser;
use color_eyre::eyre::{
    Error,
    eyre,
};
use dotenvy::dotenv;
use fdtd1d::{
    AbcOrder,
    Material,
    Region,
    Simulation,
    SimulationConfig,
    SourceConfig,
    SourceKind,
};

fn main() -> Result<(), Error> {
    let _ = dotenv();
    tracing_subscriber::fmt::init();
    color_eyre::install()?;

    let args = Args::parse();
    let config = args.to_config()?;

    let mut simulation = Simulation::new(&config)?;

    for _ in 0..args.steps {
        let snapshot = simulation.step()?;
        let monitored = snapshot.ez.get(args.monitor).ok_or_else(|| {
            eyre!(
                "monitor index {} outside the {}-cell grid",
                args.monitor,
                config.size
            )
        })?;
        println!("{monitored}");
    }

    Ok(())
}

/// Runs the 1D solver and prints one monitored Ez cell per step.
#[derive(Debug, Parser)]
struct Args {
    /// number of Ez nodes
    #[arg(long, default_value_t = 200)]
    size: usize,

    /// number of time steps to run
    #[arg(long, default_value_t = 250)]
    steps: usize,

    /// time-step-to-space-step ratio, in (0, 1]
    #[arg(long, default_value_t = 1.0)]
    courant: f64,

    /// incident pulse delay in steps
    #[arg(long, default_value_t = 30.0)]
    delay: f64,

    /// incident pulse width in steps
    #[arg(long, default_value_t = 10.0)]
    width: f64,

    /// total-field/scattered-field boundary index
    #[arg(long, default_value_t = 49)]
    tfsf_boundary: usize,

    /// overwrite this node instead of using TFSF corrections
    #[arg(long, conflicts_with = "tfsf_boundary")]
    hard_source: Option<usize>,

    /// absorbing boundary order: first or second
    #[arg(long, default_value = "second")]
    abc: String,

    /// start of a dielectric half-space, if any
    #[arg(long, requires = "permittivity")]
    interface: Option<usize>,

    /// relative permittivity of the half-space
    #[arg(long)]
    permittivity: Option<f64>,

    /// loss factor of the half-space
    #[arg(long, default_value_t = 0.0)]
    loss: f64,

    /// Ez index to print each step
    #[arg(long, default_value_t = 50)]
    monitor: usize,
}

impl Args {
    fn to_config(&self) -> Result<SimulationConfig, Error> {
        let boundary = match self.abc.as_str() {
            "first" => AbcOrder::First,
            "second" => AbcOrder::Second,
            other => return Err(eyre!("unknown ABC order {other:?} (first or second)")),
        };

        let mut regions = vec![Region {
            start: 0,
            material: Material::VACUUM,
        }];
        if let Some(interface) = self.interface {
            regions.push(Region {
                start: interface,
                material: Material {
                    // to_config only builds the config; Simulation::new
                    // validates it
                    relative_permittivity: self.permittivity.unwrap_or(1.0),
                    loss: self.loss,
                },
            });
        }

        let kind = match self.hard_source {
            Some(node) => SourceKind::Hard { node },
            None => {
                SourceKind::TotalFieldScatteredField {
                    boundary: self.tfsf_boundary,
                }
            }
        };

        Ok(SimulationConfig {
            size: self.size,
            courant_number: self.courant,
            regions,
            source: SourceConfig {
                kind,
                delay: self.delay,
                width: self.width,
            },
            boundary,
        })
    }
}

//! Junk Accumulation Model (JAM): orbital debris as an SIR-style
//! compartmental system.
//!
//! Intact objects (`S`) collide and shatter into fragments (`I`); both
//! decay out of orbit or are actively removed into `R`. A run integrates the
//! model over a horizon in years and samples it at [`SAMPLE_POINTS`] evenly
//! spaced times, together with the effective reproduction number
//! `Rt = (1 + θ)·β·S / (γ + μ_I)`.
//!
//! ```no_run
//! use jam::{SimulationConfig, Simulation};
//!
//! let output = Simulation::new(SimulationConfig::default())?.run()?;
//! let summary = output.summary().expect("non-empty run");
//! println!("final fragments: {:.0}, max Rt: {:.2}", summary.final_i, summary.max_rt);
//! # Ok::<(), jam::JamError>(())
//! ```

pub mod environment;
pub mod error;
pub mod integrator;
pub mod model;
pub mod output;
pub mod parameters;
pub mod simulation;

pub use environment::RunEnvironment;
pub use error::{JamError, Result};
pub use integrator::{Solution, SolverOptions, SolverStats, integrate};
pub use model::{JamModel, State, reproduction_number, vector_field};
pub use output::{CSV_HEADERS, SimulationOutput, Summary};
pub use parameters::{InitialState, Parameters, SimulationConfig, ValidationMode};
pub use simulation::{SAMPLE_POINTS, Simulation, run_simulation, sample_times};

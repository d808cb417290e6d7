use log::{info, warn};
use ode_solvers::Vector3;

use crate::error::Result;
use crate::integrator;
use crate::model::{JamModel, State, reproduction_number};
use crate::output::SimulationOutput;
use crate::parameters::{InitialState, Parameters, SimulationConfig};

/// Number of evenly spaced output times per run.
pub const SAMPLE_POINTS: usize = 1000;

/// `SAMPLE_POINTS` evenly spaced times from `0` to `horizon`, both included.
pub fn sample_times(horizon: f64) -> Vec<f64> {
    let last = (SAMPLE_POINTS - 1) as f64;
    // Scale by the fraction so horizons near f64::MAX do not overflow.
    (0..SAMPLE_POINTS)
        .map(|k| {
            if k == SAMPLE_POINTS - 1 {
                horizon
            } else {
                horizon * (k as f64 / last)
            }
        })
        .collect()
}

/// A validated configuration, ready to run.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Simulation { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(&self) -> Result<SimulationOutput> {
        let SimulationConfig {
            initial,
            parameters,
            horizon,
            solver,
            ..
        } = self.config;
        info!(
            "simulating {horizon} years from S = {}, I = {}, R = {}",
            initial.s, initial.i, initial.r
        );

        let times = sample_times(horizon);
        let model = JamModel::new(parameters);
        let y0: Vector3<f64> = initial.into();
        let solution = integrator::integrate(model, y0, horizon, SAMPLE_POINTS, &solver)?;
        let trajectory: Vec<State> = solution.states.into_iter().map(State::from).collect();

        let reproduction: Vec<f64> = trajectory
            .iter()
            .map(|state| reproduction_number(state.s, &parameters))
            .collect();
        if reproduction.iter().any(|rt| !rt.is_finite()) {
            warn!(
                "Rt is not finite: removal rate + fragment decay rate = {}",
                parameters.removal_rate + parameters.fragment_decay
            );
        }

        let output = SimulationOutput::new(times, &trajectory, reproduction, solution.stats);
        info!(
            "finished after {} accepted steps: final I = {}",
            solution.stats.accepted,
            output.infectious[SAMPLE_POINTS - 1]
        );
        Ok(output)
    }
}

/// Runs one simulation with default solver settings and permissive checks.
pub fn run_simulation(
    initial: InitialState,
    parameters: Parameters,
    horizon: f64,
) -> Result<SimulationOutput> {
    Simulation::new(SimulationConfig {
        initial,
        parameters,
        horizon,
        ..Default::default()
    })?
    .run()
}

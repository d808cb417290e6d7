//! Adaptive integration on a uniform output grid.
//!
//! Stepping is done by the Dormand–Prince 5(4) solver of `ode_solvers`,
//! whose dense output reports the solution at evenly spaced times
//! independently of its internal step sizes.

use std::cell::Cell;
use std::rc::Rc;

use log::debug;
use ode_solvers::dop_shared::IntegrationError;
use ode_solvers::dopri5::Dopri5;
use ode_solvers::{System, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{JamError, Result};

/// Right-hand side evaluations per attempted Dormand–Prince step.
const STAGES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Relative tolerance (default: 1e-6).
    pub rtol: f64,
    /// Absolute tolerance (default: 1e-6).
    pub atol: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            rtol: 1e-6,
            atol: 1e-6,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> Result<()> {
        let positive = "must be finite and positive";
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(JamError::invalid("solver.rtol", self.rtol, positive));
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return Err(JamError::invalid("solver.atol", self.atol, positive));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    pub accepted: usize,
    pub rejected: usize,
    /// Right-hand side evaluations.
    pub evaluations: usize,
}

/// States at each output time, in time order.
#[derive(Debug, Clone)]
pub struct Solution {
    pub states: Vec<Vector3<f64>>,
    pub stats: SolverStats,
}

/// Counts right-hand side evaluations so a failed run can report progress.
struct Counted<S> {
    inner: S,
    evaluations: Rc<Cell<usize>>,
}

impl<S: System<f64, Vector3<f64>>> System<f64, Vector3<f64>> for Counted<S> {
    fn system(&self, t: f64, y: &Vector3<f64>, dy: &mut Vector3<f64>) {
        self.evaluations.set(self.evaluations.get() + 1);
        self.inner.system(t, y, dy);
    }
}

/// Integrates `system` from `y0` at `t = 0` and returns the state at
/// `samples` evenly spaced times from `0` to `horizon`, both included.
pub fn integrate<S>(
    system: S,
    y0: Vector3<f64>,
    horizon: f64,
    samples: usize,
    options: &SolverOptions,
) -> Result<Solution>
where
    S: System<f64, Vector3<f64>>,
{
    options.validate()?;
    if !(horizon.is_finite() && horizon > 0.0) {
        return Err(JamError::invalid("horizon", horizon, "must be finite and positive"));
    }
    if samples < 2 {
        return Err(JamError::invalid("samples", samples as f64, "must be at least 2"));
    }

    let dx = horizon / (samples - 1) as f64;
    let evaluations = Rc::new(Cell::new(0));
    let counted = Counted {
        inner: system,
        evaluations: Rc::clone(&evaluations),
    };
    // The solver accumulates output times by repeated addition. Running half
    // a sample past the horizon keeps the last sample inside the span.
    let mut stepper = Dopri5::new(
        counted,
        0.0,
        horizon + 0.5 * dx,
        dx,
        y0,
        options.rtol,
        options.atol,
    );

    let stats = match stepper.integrate() {
        Ok(stats) => stats,
        Err(error) => return Err(failure(error, evaluations.get())),
    };
    let stats = SolverStats {
        accepted: stats.accepted_steps as usize,
        rejected: stats.rejected_steps as usize,
        evaluations: evaluations.get(),
    };

    // Drop any repeats of the initial point ahead of the dense output.
    let first = stepper
        .x_out()
        .iter()
        .take_while(|&&x| x <= 0.0)
        .count()
        .saturating_sub(1);
    let mut states = stepper.y_out().get(first..).map(<[_]>::to_vec).unwrap_or_default();
    if states.len() < samples {
        return Err(JamError::NumericalFailure {
            reached: stepper.x_out().last().copied().unwrap_or(0.0),
            steps: stats.accepted + stats.rejected,
            reason: format!("dense output ended after {} of {samples} samples", states.len()),
        });
    }
    states.truncate(samples);
    states[0] = y0;

    debug!(
        "dopri5 reached t = {horizon}: {} accepted, {} rejected, {} evaluations",
        stats.accepted, stats.rejected, stats.evaluations
    );
    Ok(Solution { states, stats })
}

fn failure(error: IntegrationError, evaluations: usize) -> JamError {
    #[allow(unreachable_patterns)]
    let reached = match &error {
        IntegrationError::MaxNumStepReached { x, .. } => *x,
        IntegrationError::StepSizeUnderflow { x, .. } => *x,
        IntegrationError::StiffnessDetected { x, .. } => *x,
        _ => f64::NAN,
    };
    JamError::NumericalFailure {
        reached,
        steps: evaluations / STAGES,
        reason: error.to_string(),
    }
}

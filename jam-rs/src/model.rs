//! The Junk Accumulation Model vector field.
//!
//! Orbital objects are partitioned into three compartments:
//!
//! - `S`: intact objects (satellites, rocket bodies), the "susceptible" pool
//! - `I`: fragments produced by collisions, the "infectious" pool
//! - `R`: objects removed by active removal or natural decay
//!
//! ```text
//! dS/dt = Λ − β·S·I − μ_S·S
//! dI/dt = (1 + θ)·β·S·I − (γ + μ_I)·I
//! dR/dt = γ·I + μ_S·S + μ_I·I
//! ```

use ode_solvers::{System, Vector3};
use serde::{Deserialize, Serialize};

use crate::parameters::Parameters;

/// Population counts in each compartment. Treated as continuous values.
///
/// Missing fields deserialize to the paper baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct State {
    pub s: f64,
    pub i: f64,
    pub r: f64,
}

impl State {
    pub fn new(s: f64, i: f64, r: f64) -> Self {
        State { s, i, r }
    }

    pub fn total(&self) -> f64 {
        self.s + self.i + self.r
    }
}

impl From<State> for Vector3<f64> {
    fn from(state: State) -> Self {
        Vector3::new(state.s, state.i, state.r)
    }
}

impl From<Vector3<f64>> for State {
    fn from(y: Vector3<f64>) -> Self {
        State::new(y[0], y[1], y[2])
    }
}

/// Instantaneous rates of change `(dS/dt, dI/dt, dR/dt)`.
///
/// The system is autonomous; `_t` is only part of the signature so the
/// function can be handed to a time-dependent solver.
pub fn vector_field(_t: f64, y: &Vector3<f64>, p: &Parameters) -> Vector3<f64> {
    let (s, i) = (y[0], y[1]);
    let ds = p.launch_rate - p.collision_rate * s * i - p.intact_decay * s;
    let di = (1.0 + p.fragmentation) * p.collision_rate * s * i
        - (p.removal_rate + p.fragment_decay) * i;
    let dr = p.removal_rate * i + p.intact_decay * s + p.fragment_decay * i;
    Vector3::new(ds, di, dr)
}

/// Effective reproduction number `Rt = (1 + θ)·β·S / (γ + μ_I)`.
///
/// Division follows IEEE semantics: with `γ + μ_I = 0` the result is
/// `±inf`, or `NaN` when the numerator is also zero.
pub fn reproduction_number(s: f64, p: &Parameters) -> f64 {
    ((1.0 + p.fragmentation) * p.collision_rate * s) / (p.removal_rate + p.fragment_decay)
}

/// A parameter set bound to the vector field, ready for integration.
#[derive(Debug, Clone, Copy)]
pub struct JamModel {
    pub parameters: Parameters,
}

impl JamModel {
    pub fn new(parameters: Parameters) -> Self {
        JamModel { parameters }
    }

    pub fn derivative(&self, state: State) -> State {
        vector_field(0.0, &state.into(), &self.parameters).into()
    }
}

impl System<f64, Vector3<f64>> for JamModel {
    fn system(&self, t: f64, y: &Vector3<f64>, dy: &mut Vector3<f64>) {
        *dy = vector_field(t, y, &self.parameters);
    }
}

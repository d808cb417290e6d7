use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JamError, Result};
use crate::integrator::SolverOptions;
use crate::model::State;

pub type InitialState = State;

/// Intact objects in LEO used by the paper baseline.
pub const BASELINE_INTACT: f64 = 6768.0;
/// Tracked fragments in LEO used by the paper baseline.
pub const BASELINE_FRAGMENTS: f64 = 34000.0;
pub const BASELINE_LAUNCH_RATE: f64 = 2262.0;
pub const BASELINE_FRAGMENTATION: f64 = 29.0;
pub const BASELINE_HORIZON: f64 = 50.0;

/// Rate parameters of the model. All rates are per year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Λ, objects launched per year.
    pub launch_rate: f64,
    /// β, collision rate coefficient.
    pub collision_rate: f64,
    /// θ, fragments generated per collision.
    pub fragmentation: f64,
    /// γ, active debris removal rate.
    pub removal_rate: f64,
    /// μ_S, natural decay rate of intact objects.
    pub intact_decay: f64,
    /// μ_I, natural decay rate of fragments.
    pub fragment_decay: f64,
}

impl Parameters {
    /// The published baseline. β, μ_S and μ_I are scaled by the initial
    /// populations: nine collisions, 450 intact decays and 250 fragment
    /// decays per year at `t = 0`.
    pub fn paper_baseline(initial: &InitialState) -> Self {
        Parameters {
            launch_rate: BASELINE_LAUNCH_RATE,
            collision_rate: 9.0 / (initial.s * initial.i),
            fragmentation: BASELINE_FRAGMENTATION,
            removal_rate: 0.0,
            intact_decay: 450.0 / initial.s,
            fragment_decay: 250.0 / initial.i,
        }
    }

    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("launch_rate", self.launch_rate),
            ("collision_rate", self.collision_rate),
            ("fragmentation", self.fragmentation),
            ("removal_rate", self.removal_rate),
            ("intact_decay", self.intact_decay),
            ("fragment_decay", self.fragment_decay),
        ]
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters::paper_baseline(&InitialState::default())
    }
}

impl Default for State {
    fn default() -> Self {
        State::new(BASELINE_INTACT, BASELINE_FRAGMENTS, 0.0)
    }
}

/// How strictly inputs are checked before a run.
///
/// Non-finite values and a non-positive horizon are rejected in both modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Negative rates and populations are simulated as given, and Rt is
    /// reported as `inf`/`NaN` when `γ + μ_I = 0`.
    #[default]
    Permissive,
    /// Negative rates and populations are rejected, as is `γ + μ_I = 0`.
    Strict,
}

/// Everything needed for one simulation run.
///
/// When deserialized, rate parameters that are not given fall back to the
/// baseline derived from the configured initial populations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct SimulationConfig {
    pub initial: InitialState,
    pub parameters: Parameters,
    /// Simulated years.
    pub horizon: f64,
    pub solver: SolverOptions,
    pub mode: ValidationMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial: InitialState::default(),
            parameters: Parameters::default(),
            horizon: BASELINE_HORIZON,
            solver: SolverOptions::default(),
            mode: ValidationMode::default(),
        }
    }
}

impl SimulationConfig {
    /// Discards every edit and returns the paper baseline.
    pub fn reset() -> Self {
        SimulationConfig::default()
    }

    /// Replaces the rate parameters with the baseline derived from the
    /// current initial populations, keeping everything else.
    pub fn reset_parameters(&mut self) {
        self.parameters = Parameters::paper_baseline(&self.initial);
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Merges `overrides` over an unresolved `base` document and resolves
    /// the result. Nested objects are merged key by key, any other value
    /// replaces the existing one.
    pub fn from_layers(
        mut base: Value,
        overrides: &serde_json::Map<String, Value>,
    ) -> Result<Self> {
        merge(&mut base, overrides);
        Ok(serde_json::from_value(base)?)
    }

    pub fn validate(&self) -> Result<()> {
        let initial = [
            ("initial.s", self.initial.s),
            ("initial.i", self.initial.i),
            ("initial.r", self.initial.r),
        ];
        for (name, value) in initial.into_iter().chain(self.parameters.named()) {
            if !value.is_finite() {
                return Err(JamError::invalid(name, value, "must be finite"));
            }
            if self.mode == ValidationMode::Strict && value < 0.0 {
                return Err(JamError::invalid(name, value, "must not be negative"));
            }
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(JamError::invalid(
                "horizon",
                self.horizon,
                "must be finite and positive",
            ));
        }
        self.solver.validate()?;

        let denominator = self.parameters.removal_rate + self.parameters.fragment_decay;
        if self.mode == ValidationMode::Strict && denominator == 0.0 {
            return Err(JamError::DivisionByZero { denominator });
        }
        Ok(())
    }
}

/// A configuration document as written, before baseline resolution.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    initial: InitialState,
    parameters: RawParameters,
    horizon: Option<f64>,
    solver: SolverOptions,
    mode: ValidationMode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawParameters {
    launch_rate: Option<f64>,
    collision_rate: Option<f64>,
    fragmentation: Option<f64>,
    removal_rate: Option<f64>,
    intact_decay: Option<f64>,
    fragment_decay: Option<f64>,
}

impl RawParameters {
    fn resolve(self, initial: &InitialState) -> Parameters {
        let baseline = Parameters::paper_baseline(initial);
        Parameters {
            launch_rate: self.launch_rate.unwrap_or(baseline.launch_rate),
            collision_rate: self.collision_rate.unwrap_or(baseline.collision_rate),
            fragmentation: self.fragmentation.unwrap_or(baseline.fragmentation),
            removal_rate: self.removal_rate.unwrap_or(baseline.removal_rate),
            intact_decay: self.intact_decay.unwrap_or(baseline.intact_decay),
            fragment_decay: self.fragment_decay.unwrap_or(baseline.fragment_decay),
        }
    }
}

impl From<RawConfig> for SimulationConfig {
    fn from(raw: RawConfig) -> Self {
        SimulationConfig {
            parameters: raw.parameters.resolve(&raw.initial),
            initial: raw.initial,
            horizon: raw.horizon.unwrap_or(BASELINE_HORIZON),
            solver: raw.solver,
            mode: raw.mode,
        }
    }
}

fn merge(target: &mut Value, overrides: &serde_json::Map<String, Value>) {
    let map = match target {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(overrides.clone());
            return;
        }
    };
    for (key, value) in overrides {
        match (map.get_mut(key), value) {
            (Some(existing), Value::Object(nested)) if existing.is_object() => {
                merge(existing, nested)
            }
            _ => {
                map.insert(key.clone(), value.clone());
            }
        }
    }
}

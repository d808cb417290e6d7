use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::integrator::SolverStats;
use crate::model::State;

pub const CSV_HEADERS: [&str; 5] = ["t", "S", "I", "R", "Rt"];

/// Sampled trajectory and derived Rt series of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    pub times: Vec<f64>,
    pub susceptible: Vec<f64>,
    pub infectious: Vec<f64>,
    pub removed: Vec<f64>,
    pub reproduction_number: Vec<f64>,
    pub stats: SolverStats,
}

/// End-of-run figures shown next to the charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub final_s: f64,
    pub final_i: f64,
    pub final_r: f64,
    pub max_rt: f64,
    pub final_rt: f64,
}

impl SimulationOutput {
    pub(crate) fn new(
        times: Vec<f64>,
        trajectory: &[State],
        reproduction_number: Vec<f64>,
        stats: SolverStats,
    ) -> Self {
        SimulationOutput {
            times,
            susceptible: trajectory.iter().map(|state| state.s).collect(),
            infectious: trajectory.iter().map(|state| state.i).collect(),
            removed: trajectory.iter().map(|state| state.r).collect(),
            reproduction_number,
            stats,
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<State> {
        Some(State::new(
            *self.susceptible.get(index)?,
            *self.infectious.get(index)?,
            *self.removed.get(index)?,
        ))
    }

    /// `None` for an empty output. A `NaN` anywhere in Rt makes `max_rt` `NaN`.
    pub fn summary(&self) -> Option<Summary> {
        let last = self.state(self.len().checked_sub(1)?)?;
        let max_rt = self.reproduction_number.iter().copied().fold(
            f64::NEG_INFINITY,
            |max, rt| if rt.is_nan() || max.is_nan() { f64::NAN } else { max.max(rt) },
        );
        Some(Summary {
            final_s: last.s,
            final_i: last.i,
            final_r: last.r,
            max_rt,
            final_rt: *self.reproduction_number.last()?,
        })
    }

    /// One row per sample in [`CSV_HEADERS`] order.
    pub fn csv_rows(&self) -> Vec<Vec<String>> {
        (0..self.len())
            .map(|k| {
                vec![
                    self.times[k].to_string(),
                    self.susceptible[k].to_string(),
                    self.infectious[k].to_string(),
                    self.removed[k].to_string(),
                    self.reproduction_number[k].to_string(),
                ]
            })
            .collect()
    }

    /// SHA-256 over every series, hex encoded. Identical runs give identical
    /// digests.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for series in [
            &self.times,
            &self.susceptible,
            &self.infectious,
            &self.removed,
            &self.reproduction_number,
        ] {
            for value in series {
                hasher.update(value.to_le_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }
}

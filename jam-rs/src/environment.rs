//! The run envelope: a JSON document describing one model run.
//!
//! ```json
//! {
//!   "input": { "horizon": 100.0, "parameters": { "removal_rate": 0.02 } },
//!   "model": { "files": { "config": "baseline.toml" } },
//!   "output": { "spec": "filesystem", "dir": "out/" }
//! }
//! ```
//!
//! `input` is merged over the TOML file named by `model.files.config`, or
//! over the paper baseline when there is none. Without a filesystem output
//! everything is written to stdout.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use log::{debug, info};
use serde_json::Value;

use crate::error::{JamError, Result};
use crate::output::{CSV_HEADERS, SimulationOutput};
use crate::parameters::SimulationConfig;

/// Envelope keys that make no difference to a deterministic model.
const IGNORED_INPUT_KEYS: [&str; 2] = ["seed", "replicate"];

pub struct RunEnvironment {
    input_json: serde_json::Map<String, Value>,
    pub files: HashMap<String, PathBuf>,
    output: Value,
}

impl RunEnvironment {
    pub fn from_json(data: Value) -> Self {
        let mut input_json = data
            .get("input")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();
        for key in IGNORED_INPUT_KEYS {
            if input_json.remove(key).is_some() {
                debug!("ignoring `{key}` in run input");
            }
        }

        let files = data
            .get("model")
            .and_then(|m| m.get("files"))
            .and_then(|f| f.as_object())
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), PathBuf::from(s))))
                    .collect()
            })
            .unwrap_or_default();

        let output = data.get("output").cloned().unwrap_or(Value::Null);

        Self {
            input_json,
            files,
            output,
        }
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        if raw.trim().is_empty() {
            return Err(JamError::Config("empty run envelope".to_string()));
        }
        let data: Value = serde_json::from_str(&raw)?;
        Ok(Self::from_json(data))
    }

    pub fn from_stdin() -> Result<Self> {
        Self::from_reader(io::stdin().lock())
    }

    pub fn input_json(&self) -> &serde_json::Map<String, Value> {
        &self.input_json
    }

    /// The TOML file (if any) with `input` merged over it. Anything still
    /// missing afterwards comes from the baseline for the merged initial state.
    pub fn config(&self) -> Result<SimulationConfig> {
        let base = match self.files.get("config") {
            Some(path) => {
                info!("loading configuration from {}", path.display());
                toml::from_str::<Value>(&fs::read_to_string(path)?)?
            }
            None => Value::Object(serde_json::Map::new()),
        };
        SimulationConfig::from_layers(base, &self.input_json)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        let output = &self.output;

        // Flat output
        if output.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return output
                .get("dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from);
        }

        // Profiled output: `default`, else the first profile
        let profile = output
            .get("profile")
            .and_then(|v| v.as_object())
            .and_then(|profiles| profiles.get("default").or_else(|| profiles.values().next()))?;
        if profile.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return profile.get("dir").and_then(|v| v.as_str()).map(PathBuf::from);
        }

        None
    }

    fn open(&self, filename: &str) -> Result<Box<dyn Write>> {
        match self.output_dir() {
            Some(dir) => {
                fs::create_dir_all(&dir)?;
                let path = dir.join(filename);
                debug!("writing {}", path.display());
                Ok(Box::new(fs::File::create(path)?))
            }
            None => Ok(Box::new(io::stdout())),
        }
    }

    pub fn write(&self, filename: &str, data: &[u8]) -> Result<()> {
        let mut out = self.open(filename)?;
        out.write_all(data)?;
        out.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, filename: &str, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(self.open(filename)?);
        wtr.write_record(headers)?;
        for row in rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_trajectory(&self, filename: &str, output: &SimulationOutput) -> Result<()> {
        self.write_csv(filename, &CSV_HEADERS, &output.csv_rows())
    }
}

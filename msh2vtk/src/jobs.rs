//! This module implements batch job files: a TOML file with a series of
//! conversions to run one after the other.

use std::error::Error;
use std::path::Path;

use log::{error, info};
use msh::prelude::*;
use serde::{Deserialize, Serialize};
use toml::de::Error as TomlError;

/// A job file. Each `[[conversion]]` table is one job.
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct JobFile {
  /// The conversions to run, in order.
  #[serde(alias = "conversion")]
  pub(crate) conversions: Vec<Conversion>
}

impl JobFile {
  /// Reads and decodes a job file.
  pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
    let contents = std::fs::read_to_string(path)?;
    let try_jobs: Result<Self, TomlError> = toml::from_str(&contents);
    return Ok(try_jobs?);
  }

  /// Runs every job, even after one fails. Returns how many failed.
  pub(crate) fn run(&self) -> usize {
    let mut failed = 0;
    for job in &self.conversions {
      info!("Converting {}...", job.input.display());
      if let Err(e) = job.run() {
        error!("{}: {}", job.input.display(), e);
        failed += 1;
      }
    }
    return failed;
  }
}

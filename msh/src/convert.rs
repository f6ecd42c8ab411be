//! This module implements the whole conversion: read, resolve, serialize, and
//! write the output in one go. Nothing is written unless every step worked.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::MshError;
use crate::mshfile::MshFile;
use crate::vtk::{CellField, VtkGrid};

/// Extension given to output files.
pub const OUTPUT_EXTENSION: &str = "vtk";

/// Title line written when none is given.
pub const DEFAULT_TITLE: &str = "Converted from Gmsh by msh2vtk";

/// The fields written when none are given.
pub fn default_fields() -> Vec<String> {
  return vec![CellField::MaterialId.name().to_string()];
}

/// A single conversion job.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversion {
  /// Path to the MSH file.
  pub input: PathBuf,
  /// Output path without the extension. Defaults to the input path without
  /// its extension.
  #[serde(default)]
  pub output: Option<PathBuf>,
  /// Names of the cell fields to write.
  #[serde(default = "default_fields")]
  pub fields: Vec<String>,
  /// The title line of the output file.
  #[serde(default)]
  pub title: Option<String>
}

impl Conversion {
  /// A job with default output, fields and title.
  pub fn new<P: Into<PathBuf>>(input: P) -> Self {
    return Self {
      input: input.into(),
      output: None,
      fields: default_fields(),
      title: None
    };
  }

  /// Where the output goes, without the extension.
  pub fn output_base(&self) -> PathBuf {
    return self.output.clone()
      .unwrap_or_else(|| self.input.with_extension(""));
  }

  /// Where the output goes. The extension is appended, never substituted.
  pub fn output_path(&self) -> PathBuf {
    let mut path: OsString = self.output_base().into_os_string();
    path.push(".");
    path.push(OUTPUT_EXTENSION);
    return PathBuf::from(path);
  }

  /// Decodes the requested field names. Repeated names are only written once.
  pub fn requested_fields(&self) -> Result<Vec<CellField>, MshError> {
    return self.fields.iter()
      .unique()
      .map(|name| name.parse::<CellField>())
      .collect();
  }

  /// Renders an already-parsed mesh into the text of the output file.
  pub fn render(&self, msh: &MshFile) -> Result<String, MshError> {
    let fields = self.requested_fields()?;
    let resolved = msh.resolve()?;
    let title = self.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let grid = VtkGrid::build(title, &msh.vertices, &resolved, &fields)?;
    return grid.to_legacy_ascii();
  }

  /// Runs the job and returns the path written to.
  pub fn run(&self) -> Result<PathBuf, MshError> {
    // bail on bad field names before reading anything
    self.requested_fields()?;
    let msh = MshFile::parse_file(&self.input)?;
    let text = self.render(&msh)?;
    let path = self.output_path();
    fs::write(&path, text)?;
    info!("Wrote {}.", path.display());
    return Ok(path);
  }
}

/// Converts the MSH file at `input` and writes `<output_base>.vtk` with the
/// requested cell fields. Returns the path written to.
pub fn convert<P, Q, S>(
  output_base: P,
  input: Q,
  fields: &[S]
) -> Result<PathBuf, MshError>
  where P: AsRef<Path>, Q: AsRef<Path>, S: AsRef<str> {
  let job = Conversion {
    input: input.as_ref().to_path_buf(),
    output: Some(output_base.as_ref().to_path_buf()),
    fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
    title: None
  };
  return job.run();
}

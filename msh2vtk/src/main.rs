//! Converts Gmsh MSH files into legacy VTK files, either one from the command
//! line or a batch of them from a TOML job file.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::needless_return)]

pub(crate) mod jobs;

use std::path::PathBuf;

use clap::Parser;
use log::{LevelFilter, error, info};
use msh::prelude::*;

use crate::jobs::JobFile;

/// Command-line arguments.
#[derive(Parser)]
#[command(author, version)]
struct Cli {
  /// Output extra/debug info while converting.
  #[arg(short, long)]
  verbose: bool,
  /// Cell fields to write, comma-separated.
  #[arg(
    short,
    long,
    value_delimiter = ',',
    default_value = "MaterialID",
    conflicts_with = "jobs"
  )]
  fields: Vec<String>,
  /// Output path, without the ".vtk" extension (default: the input path
  /// without its extension).
  #[arg(short, long, conflicts_with = "jobs")]
  output: Option<PathBuf>,
  /// Title line for the output file.
  #[arg(short, long, conflicts_with = "jobs")]
  title: Option<String>,
  /// Run the conversions listed in a TOML job file instead.
  #[arg(long, conflicts_with = "input")]
  jobs: Option<PathBuf>,
  /// MSH file path.
  #[arg(required_unless_present = "jobs")]
  input: Option<PathBuf>
}

fn main() {
  // init cli stuff
  let args = Cli::parse();
  let log_level = if args.verbose {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };
  env_logger::builder().filter_level(log_level).init();
  if let Some(path) = args.jobs {
    let jobs = match JobFile::load(&path) {
      Ok(j) => j,
      Err(e) => {
        error!("Could not read job file {}: {}", path.display(), e);
        std::process::exit(1);
      }
    };
    if jobs.conversions.is_empty() {
      info!("No conversions in job file.");
      return;
    }
    let failed = jobs.run();
    if failed > 0 {
      error!("{} of {} conversions failed.", failed, jobs.conversions.len());
      std::process::exit(1);
    }
    info!("All {} conversions done.", jobs.conversions.len());
  } else if let Some(input) = args.input {
    if !input.is_file() {
      error!("Provided path either does not exist or is not a file!");
      std::process::exit(1);
    }
    let job = Conversion {
      input,
      output: args.output,
      fields: args.fields,
      title: args.title
    };
    if let Err(e) = job.run() {
      error!("{}", e);
      std::process::exit(1);
    }
  }
}

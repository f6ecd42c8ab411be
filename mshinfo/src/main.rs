//! Dumps information on an MSH file: what's in it and how many cells each
//! physical group would turn into.

#![allow(clippy::needless_return)]

use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, info, error};
use msh::prelude::*;

#[derive(Parser)]
#[command(author, version)]
struct Cli {
  /// Print the parsed file as JSON instead of a summary.
  #[arg(long)]
  json: bool,
  /// Output extra/debug info while parsing.
  #[arg(short, long)]
  verbose: bool,
  /// File path (set to "-" to read from standard input).
  file: PathBuf
}

const INDENT: &str = "  ";

/// Prints the summary.
fn summarize(msh: &MshFile) -> Result<(), MshError> {
  let entity_counts = Dimension::all()
    .iter()
    .map(|d| format!("{} {}s", msh.entities.count(*d), d))
    .join(", ");
  info!("Entities: {}.", entity_counts);
  info!("Vertices: {}.", msh.vertices.len());
  info!("Elements: {}.", msh.elements.len());
  let kinds = msh.elements.iter()
    .map(|e| e.type_code)
    .counts();
  for (code, count) in kinds.into_iter().sorted() {
    let name = ElementKind::from_code(code)
      .map_or("unsupported type", |k| k.name());
    info!("{}- type {} ({}): {}", INDENT, code, name, count);
  }
  if msh.physical_names.is_empty() {
    info!("No physical names found.");
  } else {
    info!("Physical names:");
    for pn in &msh.physical_names {
      info!("{}- {} {}: {}", INDENT, pn.dimension, pn.tag, pn.name);
    }
  }
  let cells = msh.cells_per_group()?;
  if cells.is_empty() {
    info!("No elements belong to a physical group, output would be empty.");
  } else {
    info!("Cells per physical group:");
    for ((dim, tag), count) in cells {
      let name = msh.physical_name(dim, tag).unwrap_or("(unnamed)");
      info!("{}- {} {} {}: {}", INDENT, dim, tag, name, count);
    }
  }
  return Ok(());
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
  // parse the file
  let parsed = if args.file.as_os_str().eq_ignore_ascii_case("-") {
    MshFile::parse_bufread(BufReader::new(io::stdin()))
  } else if args.file.is_file() {
    MshFile::parse_file(&args.file)
  } else {
    error!("Provided path either does not exist or is not a file!");
    std::process::exit(1);
  };
  let msh = match parsed {
    Ok(m) => m,
    Err(e) => {
      error!("{}", e);
      std::process::exit(1);
    }
  };
  if args.json {
    match serde_json::to_string_pretty(&msh) {
      Ok(s) => println!("{}", s),
      Err(e) => {
        error!("{}", e);
        std::process::exit(1);
      }
    }
    return;
  }
  if let Err(e) = summarize(&msh) {
    error!("{}", e);
    std::process::exit(1);
  }
}

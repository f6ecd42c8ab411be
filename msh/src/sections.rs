//! This module implements the section locator: it finds where each of the
//! sections we care about begins and ends within the input lines.

use std::fmt::Display;
use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Marker, MshError};
use crate::util::Record;

/// The sections of an MSH file the converter reads.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialOrd, Ord, PartialEq, Eq
)]
pub enum SectionKind {
  /// Names given to physical groups.
  PhysicalNames,
  /// Geometric entities (points, curves, surfaces, volumes).
  Entities,
  /// Mesh vertices.
  Nodes,
  /// Mesh elements.
  Elements
}

impl SectionKind {
  /// Returns the name of the section as it appears in its markers.
  pub const fn name(&self) -> &'static str {
    return match self {
      Self::PhysicalNames => "PhysicalNames",
      Self::Entities => "Entities",
      Self::Nodes => "Nodes",
      Self::Elements => "Elements"
    };
  }

  /// The line that opens this section.
  pub fn opening(&self) -> String {
    return format!("${}", self.name());
  }

  /// The line that closes this section.
  pub fn closing(&self) -> String {
    return format!("$End{}", self.name());
  }
}

impl Display for SectionKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name());
  }
}

/// Where a section sits in the input: the indices of its marker lines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SectionRange {
  /// 0-based index of the opening marker line.
  pub start: usize,
  /// 0-based index of the closing marker line.
  pub end: usize
}

impl SectionRange {
  /// The indices of the lines strictly between the markers.
  pub fn body(&self) -> Range<usize> {
    return (self.start + 1)..self.end;
  }
}

/// Checks whether a line is exactly a marker, give or take whitespace.
fn is_marker(line: &str, marker: &str) -> bool {
  return line.trim() == marker;
}

/// Finds a single section.
fn locate_one(
  lines: &[&str],
  section: SectionKind
) -> Result<SectionRange, MshError> {
  let opening = section.opening();
  let closing = section.closing();
  let start = lines.iter()
    .position(|l| is_marker(l, &opening))
    .ok_or(MshError::MissingSection { section, marker: Marker::Opening })?;
  let end = lines[start+1..].iter()
    .position(|l| is_marker(l, &closing))
    .map(|i| i + start + 1)
    .ok_or(MshError::MissingSection { section, marker: Marker::Closing })?;
  debug!("Found {} section on lines {}-{}.", section, start + 1, end + 1);
  return Ok(SectionRange { start, end });
}

/// The locations of the four sections.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sections {
  /// The physical names section.
  pub physical_names: SectionRange,
  /// The entities section.
  pub entities: SectionRange,
  /// The nodes section.
  pub nodes: SectionRange,
  /// The elements section.
  pub elements: SectionRange
}

impl Sections {
  /// Locates all four sections. Fails if any marker is missing.
  pub fn locate(lines: &[&str]) -> Result<Self, MshError> {
    return Ok(Self {
      physical_names: locate_one(lines, SectionKind::PhysicalNames)?,
      entities: locate_one(lines, SectionKind::Entities)?,
      nodes: locate_one(lines, SectionKind::Nodes)?,
      elements: locate_one(lines, SectionKind::Elements)?
    });
  }

  /// Gets the range for a section.
  pub const fn get(&self, section: SectionKind) -> SectionRange {
    return match section {
      SectionKind::PhysicalNames => self.physical_names,
      SectionKind::Entities => self.entities,
      SectionKind::Nodes => self.nodes,
      SectionKind::Elements => self.elements
    };
  }

  /// Borrows the body of a section out of the lines it was located in.
  pub fn body<'a>(
    &self,
    section: SectionKind,
    lines: &'a [&'a str]
  ) -> SectionBody<'a> {
    let range = self.get(section).body();
    return SectionBody {
      section,
      offset: range.start,
      lines: &lines[range]
    };
  }
}

/// The lines between a section's markers, plus enough context to point at the
/// right line when something goes wrong.
#[derive(Copy, Clone, Debug)]
pub struct SectionBody<'a> {
  /// Which section this is.
  pub section: SectionKind,
  /// 0-based index of the first body line within the whole input.
  pub offset: usize,
  /// The body lines.
  pub lines: &'a [&'a str]
}

impl<'a> SectionBody<'a> {
  /// Builds a body out of bare lines, as if they started the input.
  pub fn new(section: SectionKind, lines: &'a [&'a str]) -> Self {
    return Self { section, offset: 0, lines };
  }

  /// The 1-based input line number of the i-th body line.
  pub fn line_number(&self, i: usize) -> usize {
    return self.offset + i + 1;
  }

  /// Tokenizes the i-th body line.
  pub(crate) fn record(&self, i: usize) -> Record<'a> {
    return Record::new(self.section, self.line_number(i), self.lines[i]);
  }

  /// Tokenizes the first body line, which always holds the section's counts.
  pub(crate) fn header(&self) -> Result<Record<'a>, MshError> {
    if self.lines.is_empty() {
      return Err(MshError::Malformed {
        section: self.section,
        line: self.line_number(0),
        reason: "section has no header line".to_string()
      });
    }
    return Ok(self.record(0));
  }

  /// Returns the lines after the header.
  pub fn records(&self) -> &'a [&'a str] {
    return self.lines.get(1..).unwrap_or(&[]);
  }
}

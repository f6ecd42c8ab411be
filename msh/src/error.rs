//! This module defines the errors that can come up while reading, resolving or
//! converting a mesh file. Every one of them aborts the conversion.

use std::error::Error;
use std::fmt::Display;
use std::io;

use crate::entities::{Dimension, EntityRef};
use crate::sections::SectionKind;

/// Which of the two markers of a section was not found.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Marker {
  /// The `$Name` line.
  Opening,
  /// The `$EndName` line.
  Closing
}

/// The kinds of records whose amount is declared up-front and then checked.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CountedRecord {
  /// Physical name declarations.
  PhysicalNames,
  /// Geometric entities of a given dimension.
  Entities(Dimension),
  /// Mesh vertices (nodes).
  Vertices
}

impl Display for CountedRecord {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::PhysicalNames => write!(f, "physical names"),
      Self::Entities(dim) => write!(f, "{} entities", dim),
      Self::Vertices => write!(f, "vertices")
    };
  }
}

/// Which end of the vertex tag range failed the check.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagBound {
  /// The declared minimum tag (checked against the first vertex).
  Min,
  /// The declared maximum tag (checked against the last vertex).
  Max
}

/// This is the kind of error that can be returned while handling a mesh.
#[derive(Debug)]
pub enum MshError {
  /// The input could not be read or the output could not be written.
  Io(io::Error),
  /// A section's opening or closing marker is absent.
  MissingSection {
    /// The section we were looking for.
    section: SectionKind,
    /// The marker that wasn't there.
    marker: Marker
  },
  /// A record could not be decoded.
  Malformed {
    /// The section the record is in.
    section: SectionKind,
    /// The 1-based line number in the input.
    line: usize,
    /// What went wrong.
    reason: String
  },
  /// A section declared a different amount of records than it holds.
  CountMismatch {
    /// What was being counted.
    what: CountedRecord,
    /// The amount the section declared.
    declared: usize,
    /// The amount actually parsed.
    parsed: usize
  },
  /// The first or last vertex tag doesn't match the declared range.
  TagRangeMismatch {
    /// Which bound failed.
    bound: TagBound,
    /// The declared tag.
    declared: usize,
    /// The tag found at that end of the vertex list.
    found: usize
  },
  /// An element is owned by an entity that doesn't exist.
  DanglingReference {
    /// The element's tag.
    element: usize,
    /// The entity it claims to belong to.
    owner: EntityRef
  },
  /// An element's type code has no VTK counterpart.
  UnsupportedElementType {
    /// The element's tag.
    element: usize,
    /// The MSH element type code.
    code: usize
  },
  /// A requested output field is not implemented.
  UnsupportedField(String),
  /// A value doesn't fit into the integer type VTK stores it as.
  Overflow {
    /// The offending value.
    value: usize,
    /// What the value was meant to be.
    what: &'static str
  },
  /// The VTK writer failed.
  Vtk(vtkio::Error)
}

impl Display for MshError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return match self {
      Self::Io(e) => write!(f, "i/o error: {}", e),
      Self::MissingSection { section, marker } => {
        let text = match marker {
          Marker::Opening => section.opening(),
          Marker::Closing => section.closing()
        };
        write!(f, "missing \"{}\" marker", text)
      },
      Self::Malformed { section, line, reason } => write!(
        f,
        "malformed {} record on line {}: {}",
        section,
        line,
        reason
      ),
      Self::CountMismatch { what, declared, parsed } => write!(
        f,
        "expected {} {}, but found {}",
        declared,
        what,
        parsed
      ),
      Self::TagRangeMismatch { bound, declared, found } => {
        let name = match bound {
          TagBound::Min => "minimum",
          TagBound::Max => "maximum"
        };
        write!(
          f,
          "expected {} vertex tag to be {}, but found {}",
          name,
          declared,
          found
        )
      },
      Self::DanglingReference { element, owner } => write!(
        f,
        "element {} belongs to {}, which does not exist",
        element,
        owner
      ),
      Self::UnsupportedElementType { element, code } => write!(
        f,
        "element {} has type {}, which has no VTK cell type",
        element,
        code
      ),
      Self::UnsupportedField(name) => write!(
        f,
        "field \"{}\" is not supported",
        name
      ),
      Self::Overflow { value, what } => write!(
        f,
        "{} {} is too large for a VTK file",
        what,
        value
      ),
      Self::Vtk(e) => write!(f, "vtk writer error: {}", e)
    };
  }
}

impl Error for MshError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    return match self {
      Self::Io(e) => Some(e),
      Self::Vtk(e) => Some(e),
      _ => None
    };
  }
}

impl From<io::Error> for MshError {
  fn from(value: io::Error) -> Self {
    return Self::Io(value);
  }
}

impl From<vtkio::Error> for MshError {
  fn from(value: vtkio::Error) -> Self {
    return Self::Vtk(value);
  }
}

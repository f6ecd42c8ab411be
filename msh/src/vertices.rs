//! This module implements the parser for the nodes section, i.e. the mesh
//! vertices.
//!
//! Nodes come in blocks: a 4-field block header, then one tag per line, then
//! one `x y z` triple per line, for the same number of entries. Lines are told
//! apart purely by how many fields they have (one is a tag, three is a
//! coordinate triple, anything else is ignored) and the i-th tag is paired
//! with the i-th coordinate triple. This relies on every block being
//! self-consistent; it is not a general block-aware reader. The scanner keeps
//! track of where in a block it thinks it is, but that never changes what is
//! accepted.

use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{CountedRecord, MshError, TagBound};
use crate::sections::SectionBody;
use crate::util::Record;

/// A mesh vertex.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MeshVertex {
  /// The vertex's tag (1-based, referenced by elements).
  pub tag: usize,
  /// The vertex's coordinates.
  pub coords: Vector3<f64>
}

/// What a line in the nodes section turned out to be.
#[derive(Clone, Debug, PartialEq)]
pub enum VertexLine {
  /// A 4-field line, taken to be a block header.
  Header,
  /// A 1-field line, a vertex tag.
  Tag(usize),
  /// A 3-field line, a coordinate triple.
  Coordinates(Vector3<f64>),
  /// Anything else.
  Ignored
}

/// Where the scanner thinks it is within a block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VertexScanState {
  /// Between blocks: every tag seen so far has its coordinates.
  ExpectHeader,
  /// After a header or a tag.
  ExpectTag,
  /// After a coordinate triple, with tags still waiting for theirs.
  ExpectCoordinate
}

/// Consumes nodes-section lines one at a time.
#[derive(Clone, Debug)]
pub struct VertexScanner {
  /// Current state.
  state: VertexScanState,
  /// Tags seen so far, in file order.
  tags: Vec<usize>,
  /// Coordinate triples seen so far, in file order.
  coords: Vec<Vector3<f64>>
}

impl Default for VertexScanner {
  fn default() -> Self {
    return Self::new();
  }
}

impl VertexScanner {
  /// Instantiates a new scanner, expecting a block header.
  pub fn new() -> Self {
    return Self {
      state: VertexScanState::ExpectHeader,
      tags: Vec::new(),
      coords: Vec::new()
    };
  }

  /// The current state.
  pub fn state(&self) -> VertexScanState {
    return self.state;
  }

  /// Consumes a line.
  pub(crate) fn consume(
    &mut self,
    rec: &Record
  ) -> Result<VertexLine, MshError> {
    let kind = match rec.len() {
      1 => VertexLine::Tag(rec.get(0, "vertex tag")?),
      3 => VertexLine::Coordinates(rec.vector(0, "coordinate")?),
      4 => VertexLine::Header,
      _ => VertexLine::Ignored
    };
    let next = match (&kind, self.state) {
      (VertexLine::Header, VertexScanState::ExpectHeader) => {
        VertexScanState::ExpectTag
      },
      (VertexLine::Header, s) => {
        debug!("Line {}: block header while in state {:?}.", rec.line, s);
        VertexScanState::ExpectTag
      },
      (VertexLine::Tag(_), VertexScanState::ExpectCoordinate) => {
        debug!("Line {}: tag before the block's coordinates ended.", rec.line);
        VertexScanState::ExpectTag
      },
      (VertexLine::Tag(_), _) => VertexScanState::ExpectTag,
      (VertexLine::Coordinates(_), _) => {
        if self.coords.len() + 1 >= self.tags.len() {
          VertexScanState::ExpectHeader
        } else {
          VertexScanState::ExpectCoordinate
        }
      },
      (VertexLine::Ignored, s) => s
    };
    match &kind {
      VertexLine::Tag(t) => self.tags.push(*t),
      VertexLine::Coordinates(c) => self.coords.push(*c),
      _ => {}
    };
    self.state = next;
    return Ok(kind);
  }

  /// Pairs tags with coordinates in file order. Leftovers on either side are
  /// dropped (the count check catches them).
  pub fn finish(self) -> Vec<MeshVertex> {
    return self.tags.into_iter()
      .zip(self.coords)
      .map(|(tag, coords)| MeshVertex { tag, coords })
      .collect();
  }
}

/// Parses the nodes section.
pub fn parse_vertices(body: &SectionBody) -> Result<Vec<MeshVertex>, MshError> {
  let header = body.header()?;
  let num_blocks: usize = header.get(0, "block count")?;
  let declared: usize = header.get(1, "vertex count")?;
  let min_tag: usize = header.get(2, "minimum tag")?;
  let max_tag: usize = header.get(3, "maximum tag")?;
  let mut scanner = VertexScanner::new();
  for i in 1..body.lines.len() {
    scanner.consume(&body.record(i))?;
  }
  let vertices = scanner.finish();
  if vertices.len() != declared {
    return Err(MshError::CountMismatch {
      what: CountedRecord::Vertices,
      declared,
      parsed: vertices.len()
    });
  }
  if let (Some(first), Some(last)) = (vertices.first(), vertices.last()) {
    if first.tag != min_tag {
      return Err(MshError::TagRangeMismatch {
        bound: TagBound::Min,
        declared: min_tag,
        found: first.tag
      });
    }
    if last.tag != max_tag {
      return Err(MshError::TagRangeMismatch {
        bound: TagBound::Max,
        declared: max_tag,
        found: last.tag
      });
    }
  }
  debug!(
    "Parsed {} vertices in {} blocks, tags {}-{}.",
    vertices.len(),
    num_blocks,
    min_tag,
    max_tag
  );
  return Ok(vertices);
}

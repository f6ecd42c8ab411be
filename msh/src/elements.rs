//! This module defines mesh elements, the element types the converter knows
//! how to write out, and the parser for the elements section.

use std::fmt::Display;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use vtkio::model::CellType;

use crate::entities::{Dimension, EntityRef};
use crate::error::MshError;
use crate::sections::SectionBody;
use crate::util::Record;

/// Generates the ElementKind enum and its translation table.
macro_rules! gen_kinds {
  (
    $(($vn:ident, $code:literal, $nm:literal, $nverts:literal, $cell:ident),)*
  ) => {
    /// Element types that have a VTK counterpart.
    #[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
    #[allow(missing_docs)]
    #[non_exhaustive]
    pub enum ElementKind {
      $($vn,)*
    }

    impl ElementKind {
      /// Returns the MSH type code.
      pub const fn code(&self) -> usize {
        return match self {
          $(Self::$vn => $code,)*
        };
      }

      /// Returns a human-readable name.
      pub const fn name(&self) -> &'static str {
        return match self {
          $(Self::$vn => $nm,)*
        };
      }

      /// Returns the number of vertices an element of this kind has.
      pub const fn num_vertices(&self) -> usize {
        return match self {
          $(Self::$vn => $nverts,)*
        };
      }

      /// Returns the VTK cell type.
      pub fn cell_type(&self) -> CellType {
        return match self {
          $(Self::$vn => CellType::$cell,)*
        };
      }

      /// Looks up a kind by its MSH type code.
      pub const fn from_code(code: usize) -> Option<Self> {
        return match code {
          $($code => Some(Self::$vn),)*
          _ => None
        };
      }
    }
  };
}

gen_kinds!(
  (Line, 1, "2-node line", 2, Line),
  (Triangle, 2, "3-node triangle", 3, Triangle),
  (Quadrangle, 3, "4-node quadrangle", 4, Quad),
  (Tetrahedron, 4, "4-node tetrahedron", 4, Tetra),
  (Hexahedron, 5, "8-node hexahedron", 8, Hexahedron),
  (Pyramid, 7, "5-node pyramid", 5, Pyramid),
);

impl Display for ElementKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name());
  }
}

/// A mesh element.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Element {
  /// The element's tag.
  pub tag: usize,
  /// The dimension of the entity it belongs to.
  pub dimension: Dimension,
  /// The MSH element type code.
  pub type_code: usize,
  /// The tag of the entity it belongs to.
  pub owner: usize,
  /// The element's vertex tags, in order.
  pub vertices: Vec<usize>
}

impl Element {
  /// The entity that owns this element.
  pub fn owner_ref(&self) -> EntityRef {
    return EntityRef::from((self.dimension, self.owner));
  }

  /// The element's kind, if it's one we know.
  pub fn kind(&self) -> Option<ElementKind> {
    return ElementKind::from_code(self.type_code);
  }
}

/// The header of an element block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
  /// Dimension of the owning entity.
  pub dimension: Dimension,
  /// Tag of the owning entity.
  pub owner: usize,
  /// Element type code for every element in the block.
  pub type_code: usize,
  /// How many element lines follow.
  pub count: usize
}

impl BlockHeader {
  /// Decodes a 4-field line.
  fn parse(rec: &Record) -> Result<Self, MshError> {
    let dim: usize = rec.get(0, "block dimension")?;
    let dimension = Dimension::try_from(dim)
      .map_err(|_| rec.malformed(format!("bad dimension {}", dim)))?;
    return Ok(Self {
      dimension,
      owner: rec.get(1, "block entity tag")?,
      type_code: rec.get(2, "block element type")?,
      count: rec.get(3, "block element count")?
    });
  }
}

/// What a line in the elements section turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementLine {
  /// A block header.
  Header(BlockHeader),
  /// An element within a block.
  Element,
  /// A line that isn't a header, found outside a block.
  Skipped
}

/// Where the scanner is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementScanState {
  /// Outside a block. Lines with exactly four fields start a block, others
  /// are skipped.
  ExpectHeader,
  /// Inside a block, with some element lines still to come.
  ExpectElement {
    /// The block's header.
    header: BlockHeader,
    /// How many element lines are left.
    remaining: usize
  }
}

/// Consumes elements-section lines (summary line excluded) one at a time.
#[derive(Clone, Debug)]
pub struct ElementScanner {
  /// Current state.
  state: ElementScanState,
  /// Elements decoded so far.
  elements: Vec<Element>,
  /// Lines skipped while looking for a header.
  skipped: usize
}

impl Default for ElementScanner {
  fn default() -> Self {
    return Self::new();
  }
}

impl ElementScanner {
  /// Instantiates a new scanner, expecting a block header.
  pub fn new() -> Self {
    return Self {
      state: ElementScanState::ExpectHeader,
      elements: Vec::new(),
      skipped: 0
    };
  }

  /// The current state.
  pub fn state(&self) -> ElementScanState {
    return self.state;
  }

  /// Lines skipped so far.
  pub fn skipped(&self) -> usize {
    return self.skipped;
  }

  /// Consumes a line.
  pub(crate) fn consume(
    &mut self,
    rec: &Record
  ) -> Result<ElementLine, MshError> {
    match self.state {
      ElementScanState::ExpectHeader => {
        if rec.len() != 4 {
          debug!("Line {}: not a block header, skipping.", rec.line);
          self.skipped += 1;
          return Ok(ElementLine::Skipped);
        }
        let header = BlockHeader::parse(rec)?;
        if header.count > 0 {
          self.state = ElementScanState::ExpectElement {
            header,
            remaining: header.count
          };
        }
        return Ok(ElementLine::Header(header));
      },
      ElementScanState::ExpectElement { header, remaining } => {
        let tag: usize = rec.get(0, "element tag")?;
        let vertices = (1..rec.len())
          .map(|i| rec.get::<usize>(i, "vertex tag"))
          .collect::<Result<Vec<usize>, _>>()?;
        if vertices.contains(&0) {
          return Err(rec.malformed("vertex tags start at 1"));
        }
        self.elements.push(Element {
          tag,
          dimension: header.dimension,
          type_code: header.type_code,
          owner: header.owner,
          vertices
        });
        self.state = match remaining {
          1 => ElementScanState::ExpectHeader,
          _ => ElementScanState::ExpectElement {
            header,
            remaining: remaining - 1
          }
        };
        return Ok(ElementLine::Element);
      }
    }
  }

  /// Returns the decoded elements. A block cut short by the end of the
  /// section keeps the elements it did have.
  pub fn finish(self) -> Vec<Element> {
    if let ElementScanState::ExpectElement { header, remaining } = self.state {
      warn!(
        "Element block for {} {} ended {} elements short.",
        header.dimension,
        header.owner,
        remaining
      );
    }
    return self.elements;
  }
}

/// Parses the elements section. The summary line is not checked against what
/// is found.
pub fn parse_elements(body: &SectionBody) -> Result<Vec<Element>, MshError> {
  let mut scanner = ElementScanner::new();
  for i in 1..body.lines.len() {
    scanner.consume(&body.record(i))?;
  }
  if scanner.skipped() > 0 {
    debug!("Skipped {} stray lines in elements.", scanner.skipped());
  }
  let elements = scanner.finish();
  debug!("Parsed {} elements.", elements.len());
  return Ok(elements);
}

//! This module implements the output side: turning a resolved mesh into an
//! unstructured grid and writing it as a legacy ASCII VTK file.
//!
//! An element that belongs to N physical groups becomes N cells with the same
//! connectivity, one per group, and the material ID of each of those cells is
//! the group that produced it. Elements in no group produce no cells.

use std::fmt::Display;
use std::str::FromStr;

use log::{debug, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use vtkio::model::{
  Attribute, Attributes, ByteOrder, Cells, DataArrayBase, DataSet,
  ElementType, UnstructuredGridPiece, Version, VertexNumbers
};
use vtkio::{IOBuffer, Vtk};

use crate::elements::ElementKind;
use crate::error::MshError;
use crate::mshfile::ResolvedElement;
use crate::vertices::MeshVertex;

/// The per-cell fields that can be written out.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CellField {
  /// The tag of the physical group that produced the cell.
  MaterialId
}

impl CellField {
  /// Returns the field's name, as requested and as written.
  pub const fn name(&self) -> &'static str {
    return match self {
      Self::MaterialId => "MaterialID"
    };
  }

  /// Returns all supported fields.
  pub const fn all() -> &'static [Self] {
    return &[Self::MaterialId];
  }
}

impl FromStr for CellField {
  type Err = MshError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    return Self::all()
      .iter()
      .copied()
      .find(|f| f.name() == s)
      .ok_or_else(|| MshError::UnsupportedField(s.to_string()));
  }
}

impl Display for CellField {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name());
  }
}

/// Converts to the 32-bit integers legacy VTK files use.
fn to_u32(value: usize, what: &'static str) -> Result<u32, MshError> {
  return u32::try_from(value).map_err(|_| MshError::Overflow { value, what });
}

/// Converts to the 32-bit integers legacy VTK files use.
fn to_i32(value: usize, what: &'static str) -> Result<i32, MshError> {
  return i32::try_from(value).map_err(|_| MshError::Overflow { value, what });
}

/// An unstructured grid ready to be written out.
#[derive(Clone, Debug, PartialEq)]
pub struct VtkGrid {
  /// The title line of the file.
  pub title: String,
  /// Point coordinates, in vertex order.
  pub points: Vec<Vector3<f64>>,
  /// Cell connectivity (0-based point indices), one entry per emitted cell.
  pub cells: Vec<Vec<usize>>,
  /// The kind of each emitted cell.
  pub cell_kinds: Vec<ElementKind>,
  /// The physical group that produced each emitted cell.
  pub cell_groups: Vec<usize>,
  /// The fields to write as cell data.
  pub fields: Vec<CellField>
}

impl VtkGrid {
  /// Builds the grid, duplicating each element once per physical group.
  pub fn build(
    title: &str,
    vertices: &[MeshVertex],
    elements: &[ResolvedElement],
    fields: &[CellField]
  ) -> Result<Self, MshError> {
    let mut grid = Self {
      title: title.to_string(),
      points: vertices.iter().map(|v| v.coords).collect(),
      cells: Vec::new(),
      cell_kinds: Vec::new(),
      cell_groups: Vec::new(),
      fields: fields.to_vec()
    };
    let mut dropped = 0;
    for re in elements {
      if re.physical_groups.is_empty() {
        dropped += 1;
        continue;
      }
      let element = re.element;
      let kind = element.kind().ok_or(MshError::UnsupportedElementType {
        element: element.tag,
        code: element.type_code
      })?;
      if element.vertices.len() != kind.num_vertices() {
        warn!(
          "Element {} has {} vertices, but type {} ({}) has {}.",
          element.tag,
          element.vertices.len(),
          kind.code(),
          kind,
          kind.num_vertices()
        );
      }
      // tags are 1-based, validated when parsing
      let connectivity: Vec<usize> = element.vertices.iter()
        .map(|t| t - 1)
        .collect();
      for group in re.physical_groups {
        grid.cells.push(connectivity.clone());
        grid.cell_kinds.push(kind);
        grid.cell_groups.push(*group);
      }
    }
    if dropped > 0 {
      warn!(
        "{} elements belong to no physical group and were left out.",
        dropped
      );
    }
    debug!(
      "Built grid with {} points and {} cells.",
      grid.points.len(),
      grid.num_cells()
    );
    return Ok(grid);
  }

  /// The number of cells.
  pub fn num_cells(&self) -> usize {
    return self.cells.len();
  }

  /// The size of the cell list: every index plus one size prefix per cell.
  pub fn cell_list_size(&self) -> usize {
    return self.cells.iter().map(|c| c.len() + 1).sum();
  }

  /// The values of a field, one per cell.
  pub fn field_values(&self, field: CellField) -> &[usize] {
    return match field {
      CellField::MaterialId => &self.cell_groups
    };
  }

  /// Builds the vtkio model for this grid.
  pub fn to_vtk(&self) -> Result<Vtk, MshError> {
    let points: Vec<f64> = self.points.iter()
      .flat_map(|p| [p.x, p.y, p.z])
      .collect();
    let mut vertices: Vec<u32> = Vec::with_capacity(self.cell_list_size());
    for cell in &self.cells {
      vertices.push(to_u32(cell.len(), "cell size")?);
      for i in cell {
        vertices.push(to_u32(*i, "point index")?);
      }
    }
    let mut cell_data = Vec::with_capacity(self.fields.len());
    for field in &self.fields {
      let values = self.field_values(*field)
        .iter()
        .map(|v| to_i32(*v, "field value"))
        .collect::<Result<Vec<i32>, _>>()?;
      cell_data.push(Attribute::DataArray(DataArrayBase {
        name: field.name().to_string(),
        elem: ElementType::Scalars {
          num_comp: 1,
          lookup_table: None
        },
        data: IOBuffer::I32(values)
      }));
    }
    return Ok(Vtk {
      version: Version { major: 2, minor: 0 },
      title: self.title.clone(),
      byte_order: ByteOrder::BigEndian,
      file_path: None,
      data: DataSet::inline(UnstructuredGridPiece {
        points: IOBuffer::F64(points),
        cells: Cells {
          cell_verts: VertexNumbers::Legacy {
            num_cells: to_u32(self.num_cells(), "cell count")?,
            vertices
          },
          types: self.cell_kinds.iter().map(|k| k.cell_type()).collect()
        },
        data: Attributes {
          point: Vec::new(),
          cell: cell_data
        }
      })
    });
  }

  /// Renders the grid as the full text of a legacy ASCII VTK file.
  pub fn to_legacy_ascii(&self) -> Result<String, MshError> {
    let mut text = String::new();
    self.to_vtk()?.write_legacy_ascii(&mut text)?;
    return Ok(text);
  }
}

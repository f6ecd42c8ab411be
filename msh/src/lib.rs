//! This library implements types and functions to parse Gmsh's ASCII mesh
//! files (MSH 4.x) and convert them into legacy VTK files for visualisation.
//!
//! It was created to turn the meshes produced by a geometry/meshing stage into
//! something ParaView can show with a per-cell material ID, i.e. each cell
//! tagged with the physical group it belongs to.
//!
//! The pipeline is: locate sections, parse each section into its table,
//! resolve every element's physical groups through its owning entity, then
//! serialize points, (duplicated) cells, cell types and cell data.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![allow(clippy::needless_return)]

pub mod convert;
pub mod elements;
pub mod entities;
pub mod error;
pub mod mshfile;
pub mod names;
pub mod sections;
pub(crate) mod util;
pub mod vertices;
pub mod vtk;

pub use convert::convert;

/// Imports the most relevant exports from the library.
pub mod prelude {
  pub use crate::convert::*;
  pub use crate::elements::*;
  pub use crate::entities::*;
  pub use crate::error::*;
  pub use crate::mshfile::*;
  pub use crate::names::*;
  pub use crate::sections::*;
  pub use crate::vertices::*;
  pub use crate::vtk::*;
}

#[cfg(test)]
mod tests;

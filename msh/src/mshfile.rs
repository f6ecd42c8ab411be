//! This module implements the in-memory model of an MSH file as we interpret
//! it, the routines that read one, and the resolution of each element's
//! physical groups through the entity that owns it.

use std::collections::BTreeMap;
use std::fs;
use std::io::BufRead;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::elements::{parse_elements, Element};
use crate::entities::{parse_entities, Dimension, Entities};
use crate::error::MshError;
use crate::names::{parse_physical_names, PhysicalName};
use crate::sections::{SectionKind, Sections};
use crate::vertices::{parse_vertices, MeshVertex};

/// An element together with the physical groups of its owning entity. The
/// group list is borrowed from the entity table and is never modified.
#[derive(Copy, Clone, Debug)]
pub struct ResolvedElement<'m> {
  /// The element.
  pub element: &'m Element,
  /// The physical groups the element belongs to.
  pub physical_groups: &'m [usize]
}

/// This is the output of the MSH parser.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MshFile {
  /// The name of the file this came from, if it came from a file.
  pub filename: Option<String>,
  /// The physical group names.
  pub physical_names: Vec<PhysicalName>,
  /// The geometric entities.
  pub entities: Entities,
  /// The mesh vertices, in file order.
  pub vertices: Vec<MeshVertex>,
  /// The mesh elements, in file order.
  pub elements: Vec<Element>
}

impl MshFile {
  /// Parses the full text of an MSH file.
  pub fn parse_str(text: &str) -> Result<Self, MshError> {
    let lines: Vec<&str> = text.lines().collect();
    let sections = Sections::locate(&lines)?;
    let physical_names = parse_physical_names(
      &sections.body(SectionKind::PhysicalNames, &lines)
    )?;
    let entities = parse_entities(
      &sections.body(SectionKind::Entities, &lines)
    )?;
    let vertices = parse_vertices(&sections.body(SectionKind::Nodes, &lines))?;
    let elements = parse_elements(
      &sections.body(SectionKind::Elements, &lines)
    )?;
    return Ok(Self {
      filename: None,
      physical_names,
      entities,
      vertices,
      elements
    });
  }

  /// Parses from a BufRead instance. The whole input is read first.
  pub fn parse_bufread<R: BufRead>(mut reader: R) -> Result<Self, MshError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    return Self::parse_str(&text);
  }

  /// Utility method -- reads and parses a file.
  pub fn parse_file<P: AsRef<Path>>(p: P) -> Result<Self, MshError> {
    let text = fs::read_to_string(p.as_ref())?;
    let mut msh = Self::parse_str(&text)?;
    msh.filename = p.as_ref().file_name()
      .and_then(|s| s.to_str())
      .map(String::from);
    info!(
      "Read {} vertices and {} elements from {}.",
      msh.vertices.len(),
      msh.elements.len(),
      msh.filename.as_deref().unwrap_or("input")
    );
    return Ok(msh);
  }

  /// Attaches to every element the physical groups of its owning entity.
  /// Fails on the first element whose owner doesn't exist.
  pub fn resolve(&self) -> Result<Vec<ResolvedElement<'_>>, MshError> {
    let index = self.entities.physical_group_index();
    let resolved = self.elements.iter()
      .map(|element| {
        let owner = element.owner_ref();
        return match index.get(&owner) {
          Some(groups) => Ok(ResolvedElement {
            element,
            physical_groups: *groups
          }),
          None => Err(MshError::DanglingReference {
            element: element.tag,
            owner
          })
        };
      })
      .collect::<Result<Vec<_>, _>>()?;
    debug!("Resolved physical groups for {} elements.", resolved.len());
    return Ok(resolved);
  }

  /// Looks up the name of a physical group.
  pub fn physical_name(
    &self,
    dimension: Dimension,
    tag: usize
  ) -> Option<&str> {
    return self.physical_names.iter()
      .find(|pn| pn.dimension == dimension && pn.tag == tag)
      .map(|pn| pn.name.as_str());
  }

  /// Counts how many output cells each physical group will produce, keyed by
  /// (dimension, tag). Elements in several groups count once for each.
  pub fn cells_per_group(
    &self
  ) -> Result<BTreeMap<(Dimension, usize), usize>, MshError> {
    let mut counts: BTreeMap<(Dimension, usize), usize> = BTreeMap::new();
    for re in self.resolve()? {
      for group in re.physical_groups {
        *counts.entry((re.element.dimension, *group)).or_default() += 1;
      }
    }
    return Ok(counts);
  }
}

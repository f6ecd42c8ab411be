//! This module defines the geometric entities of an MSH file (points, curves,
//! surfaces and volumes of the CAD model, not to be confused with mesh
//! vertices) and implements the parser for the entities section.
//!
//! Points and higher-dimensional entities have different record layouts, so
//! each gets its own type and its own parsing routine; the four tables are
//! kept apart and looked up by dimension.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::ops::Range;

use log::{debug, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{CountedRecord, MshError};
use crate::sections::SectionBody;
use crate::util::Record;

/// The four kinds of geometric entity, by dimension.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialOrd, Ord, PartialEq, Eq,
  Hash
)]
pub enum Dimension {
  /// 0D.
  Point,
  /// 1D.
  Curve,
  /// 2D.
  Surface,
  /// 3D.
  Volume
}

impl Dimension {
  /// Returns all dimensions in the order the entities section lists them.
  pub const fn all() -> &'static [Self; 4] {
    return &[Self::Point, Self::Curve, Self::Surface, Self::Volume];
  }

  /// Returns the dimension as a number 0-3.
  pub const fn number(&self) -> usize {
    return match self {
      Self::Point => 0,
      Self::Curve => 1,
      Self::Surface => 2,
      Self::Volume => 3
    };
  }

  /// Returns the lowercase name of the entity kind.
  pub const fn name(&self) -> &'static str {
    return match self {
      Self::Point => "point",
      Self::Curve => "curve",
      Self::Surface => "surface",
      Self::Volume => "volume"
    };
  }
}

impl TryFrom<usize> for Dimension {
  type Error = ();

  fn try_from(value: usize) -> Result<Self, Self::Error> {
    return Ok(match value {
      0 => Self::Point,
      1 => Self::Curve,
      2 => Self::Surface,
      3 => Self::Volume,
      _ => return Err(())
    });
  }
}

impl From<Dimension> for usize {
  fn from(value: Dimension) -> Self {
    return value.number();
  }
}

impl Display for Dimension {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{}", self.name());
  }
}

/// A geometric entity, referenced by its dimension and tag.
#[derive(
  Copy, Clone, Debug, Serialize, Deserialize, PartialOrd, Ord, PartialEq, Eq,
  Hash, derive_more::From
)]
pub struct EntityRef {
  /// The entity's dimension.
  pub dimension: Dimension,
  /// The entity's tag, unique within its dimension.
  pub tag: usize
}

impl Display for EntityRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    return write!(f, "{} {}", self.dimension, self.tag);
  }
}

/// What every entity, regardless of layout, can tell us.
pub trait GeometricEntity {
  /// The entity's dimension.
  fn dimension(&self) -> Dimension;

  /// The entity's tag.
  fn tag(&self) -> usize;

  /// The physical groups the entity belongs to, in file order.
  fn physical_groups(&self) -> &[usize];

  /// The tags (unsigned) of the entities bounding this one.
  fn boundary(&self) -> &[usize];

  /// A reference to this entity.
  fn entity_ref(&self) -> EntityRef {
    return EntityRef::from((self.dimension(), self.tag()));
  }
}

/// Parses `count physical…` starting at field `at`. Returns the groups and the
/// index of the first field after them.
fn parse_physical_groups(
  rec: &Record,
  at: usize
) -> Result<(Vec<usize>, usize), MshError> {
  let count: usize = rec.get(at, "physical group count")?;
  let first = at + 1;
  if rec.len() < first + count {
    return Err(rec.malformed(format!(
      "declares {} physical groups but only has {} fields left",
      count,
      rec.len() - first
    )));
  }
  let groups = (first..first + count)
    .map(|i| rec.get(i, "physical group tag"))
    .collect::<Result<Vec<usize>, _>>()?;
  return Ok((groups, first + count));
}

/// A point entity: `tag x y z numPhysical physical…`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PointEntity {
  /// The point's tag.
  pub tag: usize,
  /// Where the point is.
  pub coords: Vector3<f64>,
  /// Physical groups the point belongs to.
  pub physical_groups: Vec<usize>
}

impl PointEntity {
  /// Field index of the X coordinate.
  const COORDS_AT: usize = 1;
  /// Field index of the physical group count.
  const PHYSICAL_COUNT_AT: usize = 4;

  /// Parses a point record.
  fn parse(rec: &Record) -> Result<Self, MshError> {
    let tag = rec.get(0, "tag")?;
    let coords = rec.vector(Self::COORDS_AT, "coordinate")?;
    let (physical_groups, _) =
      parse_physical_groups(rec, Self::PHYSICAL_COUNT_AT)?;
    return Ok(Self { tag, coords, physical_groups });
  }
}

impl GeometricEntity for PointEntity {
  fn dimension(&self) -> Dimension {
    return Dimension::Point;
  }

  fn tag(&self) -> usize {
    return self.tag;
  }

  fn physical_groups(&self) -> &[usize] {
    return &self.physical_groups;
  }

  fn boundary(&self) -> &[usize] {
    return &[];
  }
}

/// A curve, surface or volume entity: `tag minX minY minZ maxX maxY maxZ
/// numPhysical physical… numBoundary boundary…`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BoundedEntity {
  /// The entity's dimension (never a point).
  pub dimension: Dimension,
  /// The entity's tag.
  pub tag: usize,
  /// Minimum corner of the bounding box.
  pub bbox_min: Vector3<f64>,
  /// Maximum corner of the bounding box.
  pub bbox_max: Vector3<f64>,
  /// Physical groups the entity belongs to.
  pub physical_groups: Vec<usize>,
  /// Bounding entity tags, orientation sign dropped.
  pub boundary: Vec<usize>
}

impl BoundedEntity {
  /// Field index of the bounding box minimum.
  const BBOX_MIN_AT: usize = 1;
  /// Field index of the bounding box maximum.
  const BBOX_MAX_AT: usize = 4;
  /// Field index of the physical group count.
  const PHYSICAL_COUNT_AT: usize = 7;

  /// Parses a curve/surface/volume record.
  fn parse(rec: &Record, dimension: Dimension) -> Result<Self, MshError> {
    let tag = rec.get(0, "tag")?;
    let bbox_min = rec.vector(Self::BBOX_MIN_AT, "bounding box")?;
    let bbox_max = rec.vector(Self::BBOX_MAX_AT, "bounding box")?;
    let (physical_groups, next) =
      parse_physical_groups(rec, Self::PHYSICAL_COUNT_AT)?;
    let declared: usize = rec.get(next, "boundary count")?;
    let boundary = (next + 1..rec.len())
      .map(|i| rec.magnitude(i, "boundary tag"))
      .collect::<Result<Vec<usize>, _>>()?;
    if boundary.len() != declared {
      warn!(
        "Line {}: {} {} declares {} boundary entities but lists {}.",
        rec.line,
        dimension,
        tag,
        declared,
        boundary.len()
      );
    }
    return Ok(Self {
      dimension,
      tag,
      bbox_min,
      bbox_max,
      physical_groups,
      boundary
    });
  }
}

impl GeometricEntity for BoundedEntity {
  fn dimension(&self) -> Dimension {
    return self.dimension;
  }

  fn tag(&self) -> usize {
    return self.tag;
  }

  fn physical_groups(&self) -> &[usize] {
    return &self.physical_groups;
  }

  fn boundary(&self) -> &[usize] {
    return &self.boundary;
  }
}

/// The four entity tables.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Entities {
  /// Point entities.
  pub points: Vec<PointEntity>,
  /// Curve entities.
  pub curves: Vec<BoundedEntity>,
  /// Surface entities.
  pub surfaces: Vec<BoundedEntity>,
  /// Volume entities.
  pub volumes: Vec<BoundedEntity>
}

impl Entities {
  /// Number of entities of a dimension.
  pub fn count(&self, dimension: Dimension) -> usize {
    return match dimension {
      Dimension::Point => self.points.len(),
      Dimension::Curve => self.curves.len(),
      Dimension::Surface => self.surfaces.len(),
      Dimension::Volume => self.volumes.len()
    };
  }

  /// Iterates over the entities of a single dimension.
  pub fn of_dimension(
    &self,
    dimension: Dimension
  ) -> Box<dyn Iterator<Item = &dyn GeometricEntity> + '_> {
    let bounded = match dimension {
      Dimension::Point => {
        return Box::new(
          self.points.iter().map(|e| e as &dyn GeometricEntity)
        );
      },
      Dimension::Curve => &self.curves,
      Dimension::Surface => &self.surfaces,
      Dimension::Volume => &self.volumes
    };
    return Box::new(bounded.iter().map(|e| e as &dyn GeometricEntity));
  }

  /// Iterates over every entity, points first and volumes last.
  pub fn iter(&self) -> impl Iterator<Item = &dyn GeometricEntity> + '_ {
    return Dimension::all().iter().flat_map(|d| self.of_dimension(*d));
  }

  /// Finds an entity. If a tag is repeated within a dimension, the first one
  /// wins.
  pub fn find(&self, entity: EntityRef) -> Option<&dyn GeometricEntity> {
    return self.of_dimension(entity.dimension)
      .find(|e| e.tag() == entity.tag);
  }

  /// Builds a lookup map from entity references to their physical groups.
  /// First occurrence wins, same as `find`.
  pub fn physical_group_index(&self) -> BTreeMap<EntityRef, &[usize]> {
    let mut index: BTreeMap<EntityRef, &[usize]> = BTreeMap::new();
    for entity in self.iter() {
      index.entry(entity.entity_ref()).or_insert(entity.physical_groups());
    }
    return index;
  }
}

/// Splits the record lines (header excluded) into the four per-dimension
/// blocks. The volume block takes whatever is left.
fn entity_blocks(declared: &[usize; 4], available: usize) -> [Range<usize>; 4] {
  let mut start: usize = 0;
  return (*Dimension::all()).map(|dim| {
    let end = match dim {
      Dimension::Volume => available,
      _ => start.saturating_add(declared[dim.number()]).min(available)
    };
    let block = start..end;
    start = end;
    block
  });
}

/// Parses the entities section.
pub fn parse_entities(body: &SectionBody) -> Result<Entities, MshError> {
  let header = body.header()?;
  let mut declared = [0usize; 4];
  for dim in Dimension::all() {
    declared[dim.number()] = header.get(dim.number(), "entity count")?;
  }
  let blocks = entity_blocks(&declared, body.records().len());
  // check counts before decoding anything, records are one per line
  for dim in Dimension::all() {
    let parsed = blocks[dim.number()].len();
    if parsed != declared[dim.number()] {
      return Err(MshError::CountMismatch {
        what: CountedRecord::Entities(*dim),
        declared: declared[dim.number()],
        parsed
      });
    }
  }
  // header is line 0, so record k is body line k+1
  let mut entities = Entities::default();
  for dim in Dimension::all() {
    for k in blocks[dim.number()].clone() {
      let rec = body.record(k + 1);
      match dim {
        Dimension::Point => entities.points.push(PointEntity::parse(&rec)?),
        Dimension::Curve => {
          entities.curves.push(BoundedEntity::parse(&rec, *dim)?);
        },
        Dimension::Surface => {
          entities.surfaces.push(BoundedEntity::parse(&rec, *dim)?);
        },
        Dimension::Volume => {
          entities.volumes.push(BoundedEntity::parse(&rec, *dim)?);
        }
      }
    }
  }
  debug!(
    "Parsed {} points, {} curves, {} surfaces and {} volumes.",
    entities.points.len(),
    entities.curves.len(),
    entities.surfaces.len(),
    entities.volumes.len()
  );
  return Ok(entities);
}

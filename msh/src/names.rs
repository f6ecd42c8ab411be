//! This module implements the parser for the physical names section, which
//! gives human-readable names to physical groups.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::entities::Dimension;
use crate::error::{CountedRecord, MshError};
use crate::sections::SectionBody;

/// A physical group's name declaration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhysicalName {
  /// The dimension of the entities in the group.
  pub dimension: Dimension,
  /// The group's tag.
  pub tag: usize,
  /// The group's name, verbatim (quotes included).
  pub name: String
}

/// Splits off the first whitespace-delimited word of a string.
fn split_word(s: &str) -> Option<(&str, &str)> {
  let s = s.trim_start();
  if s.is_empty() {
    return None;
  }
  return Some(match s.find(char::is_whitespace) {
    Some(end) => (&s[..end], &s[end..]),
    None => (s, "")
  });
}

/// Parses the physical names section.
pub fn parse_physical_names(
  body: &SectionBody
) -> Result<Vec<PhysicalName>, MshError> {
  let declared: usize = body.header()?.get(0, "physical name count")?;
  let mut names = Vec::with_capacity(body.records().len());
  for (i, line) in body.lines.iter().enumerate().skip(1) {
    let rec = body.record(i);
    let (dim_str, rest) = split_word(line)
      .ok_or_else(|| rec.malformed("missing dimension"))?;
    let (tag_str, rest) = split_word(rest)
      .ok_or_else(|| rec.malformed("missing tag"))?;
    let dimension = dim_str.parse::<usize>()
      .ok()
      .and_then(|d| Dimension::try_from(d).ok())
      .ok_or_else(|| rec.malformed(format!("bad dimension \"{}\"", dim_str)))?;
    let tag = tag_str.parse::<usize>()
      .map_err(|_| rec.malformed(format!("bad tag \"{}\"", tag_str)))?;
    let name = rest.trim();
    if name.is_empty() {
      return Err(rec.malformed("missing name"));
    }
    names.push(PhysicalName { dimension, tag, name: name.to_string() });
  }
  if names.len() != declared {
    return Err(MshError::CountMismatch {
      what: CountedRecord::PhysicalNames,
      declared,
      parsed: names.len()
    });
  }
  debug!("Parsed {} physical names.", names.len());
  return Ok(names);
}

//! This module implements utility types without much need for defining context
//! or not enough of it to warrant them having their own modules.

use std::str::FromStr;

use nalgebra::Vector3;

use crate::error::MshError;
use crate::sections::SectionKind;

/// A whitespace-split line, remembering where it came from.
#[derive(Clone, Debug)]
pub(crate) struct Record<'a> {
  /// The section the line belongs to.
  pub(crate) section: SectionKind,
  /// The 1-based line number.
  pub(crate) line: usize,
  /// The fields in the line.
  pub(crate) fields: Vec<&'a str>
}

impl<'a> Record<'a> {
  /// Splits a line into a record.
  pub(crate) fn new(section: SectionKind, line: usize, text: &'a str) -> Self {
    return Self {
      section,
      line,
      fields: text.split_whitespace().collect()
    };
  }

  /// Number of fields.
  pub(crate) fn len(&self) -> usize {
    return self.fields.len();
  }

  /// Builds a malformed-record error pointing at this line.
  pub(crate) fn malformed<S: Into<String>>(&self, reason: S) -> MshError {
    return MshError::Malformed {
      section: self.section,
      line: self.line,
      reason: reason.into()
    };
  }

  /// Parses the i-th field as anything that implements FromStr. `what` names
  /// the field for the error message.
  pub(crate) fn get<T: FromStr>(
    &self,
    i: usize,
    what: &str
  ) -> Result<T, MshError> {
    let field = self.fields.get(i)
      .ok_or_else(|| self.malformed(format!("missing {}", what)))?;
    return field.parse::<T>()
      .map_err(|_| self.malformed(format!("bad {} \"{}\"", what, field)));
  }

  /// Parses three consecutive fields, starting at i, as a vector.
  pub(crate) fn vector(
    &self,
    i: usize,
    what: &str
  ) -> Result<Vector3<f64>, MshError> {
    return Ok(Vector3::new(
      self.get(i, what)?,
      self.get(i + 1, what)?,
      self.get(i + 2, what)?
    ));
  }

  /// Parses a signed integer field and keeps its magnitude.
  pub(crate) fn magnitude(
    &self,
    i: usize,
    what: &str
  ) -> Result<usize, MshError> {
    let signed: i64 = self.get(i, what)?;
    return usize::try_from(signed.unsigned_abs())
      .map_err(|_| self.malformed(format!("{} {} out of range", what, signed)));
  }
}

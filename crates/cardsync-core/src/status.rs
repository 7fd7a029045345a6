//! The lifecycle status shared by clients and cards.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::ValidationError;

/// Lifecycle state of a client or card.
///
/// No transition graph is enforced: any status may be replaced by any other.
/// On the wire the name is accepted in any case and always written
/// upper-case.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Status {
  Inactive,
  Active,
  Pending,
  Approved,
  Rejected,
  Blocked,
}

impl Status {
  /// Parse a status literal, ignoring case and surrounding whitespace.
  pub fn parse(s: &str) -> Result<Self, ValidationError> {
    Status::from_str(s.trim())
      .map_err(|_| ValidationError::UnknownStatus(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

impl TryFrom<String> for Status {
  type Error = ValidationError;

  fn try_from(s: String) -> Result<Self, Self::Error> { Self::parse(&s) }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn parse_is_case_insensitive() {
    assert_eq!(Status::parse("approved").unwrap(), Status::Approved);
    assert_eq!(Status::parse("Approved").unwrap(), Status::Approved);
    assert_eq!(Status::parse(" BLOCKED ").unwrap(), Status::Blocked);
  }

  #[test]
  fn parse_rejects_unknown() {
    assert_eq!(
      Status::parse("archived"),
      Err(ValidationError::UnknownStatus("archived".into()))
    );
    assert!(Status::parse("").is_err());
  }

  #[test]
  fn canonical_form_is_upper_case() {
    let names: Vec<_> = Status::iter().map(Status::as_str).collect();
    assert_eq!(
      names,
      ["INACTIVE", "ACTIVE", "PENDING", "APPROVED", "REJECTED", "BLOCKED"]
    );
    assert_eq!(Status::Pending.to_string(), "PENDING");
  }

  #[test]
  fn serde_canonicalises() {
    let s: Status = serde_json::from_str("\"rejected\"").unwrap();
    assert_eq!(s, Status::Rejected);
    assert_eq!(serde_json::to_string(&s).unwrap(), "\"REJECTED\"");
  }
}

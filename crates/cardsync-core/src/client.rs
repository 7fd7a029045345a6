//! Client: a person identified by OIB.

use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, oib::Oib, status::Status};

const FIRST_NAME_LEN: (usize, usize) = (3, 30);
const LAST_NAME_LEN: (usize, usize) = (3, 50);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
  pub oib:        Oib,
  pub first_name: String,
  pub last_name:  String,
  pub status:     Status,
}

impl Client {
  /// Check the name fields. The OIB is already valid by construction.
  pub fn validate(&self) -> Result<(), ValidationError> {
    check_first_name(&self.first_name)?;
    check_last_name(&self.last_name)
  }
}

/// 3–30 ASCII letters.
pub fn check_first_name(value: &str) -> Result<(), ValidationError> {
  check_name("first name", value, FIRST_NAME_LEN)
}

/// 3–50 ASCII letters.
pub fn check_last_name(value: &str) -> Result<(), ValidationError> {
  check_name("last name", value, LAST_NAME_LEN)
}

fn check_name(
  field: &'static str,
  value: &str,
  (min, max): (usize, usize),
) -> Result<(), ValidationError> {
  if !value.chars().all(|c| c.is_ascii_alphabetic()) {
    return Err(ValidationError::InvalidName {
      field,
      reason: "must contain only letters".into(),
    });
  }
  if !(min..=max).contains(&value.len()) {
    return Err(ValidationError::InvalidName {
      field,
      reason: format!("must be between {min} and {max} letters"),
    });
  }
  Ok(())
}

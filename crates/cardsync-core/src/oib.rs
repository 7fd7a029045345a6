//! OIB: the 11-digit Croatian personal identification number.
//!
//! The last digit is a control digit computed with ISO 7064 MOD 11,10 over
//! the first ten.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const OIB_LEN: usize = 11;

/// Returns `true` if `id` is a well-formed OIB with a correct control digit.
pub fn is_valid(id: &str) -> bool {
  let bytes = id.as_bytes();
  if bytes.len() != OIB_LEN {
    return false;
  }

  let mut checksum: u32 = 10;
  for &b in &bytes[..OIB_LEN - 1] {
    if !b.is_ascii_digit() {
      return false;
    }
    checksum = (checksum + u32::from(b - b'0')) % 10;
    if checksum == 0 {
      checksum = 10;
    }
    checksum = (checksum * 2) % 11;
  }

  let control = (11 - checksum) % 10;
  let last = bytes[OIB_LEN - 1];
  last.is_ascii_digit() && u32::from(last - b'0') == control
}

/// A validated OIB. Construction always goes through [`is_valid`].
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Oib(String);

impl Oib {
  pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
    let s = s.into();
    if is_valid(&s) {
      Ok(Self(s))
    } else {
      Err(ValidationError::InvalidOib(s))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Oib {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for Oib {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl TryFrom<String> for Oib {
  type Error = ValidationError;

  fn try_from(s: String) -> Result<Self, Self::Error> { Self::parse(s) }
}

impl From<Oib> for String {
  fn from(oib: Oib) -> Self { oib.0 }
}

impl AsRef<str> for Oib {
  fn as_ref(&self) -> &str { &self.0 }
}

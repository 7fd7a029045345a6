//! Card numbers and their generator.
//!
//! A card number is 16 ASCII digits matching `[1-9][0-9]{15}`. The generator
//! only guarantees the shape; uniqueness is the card store's job.

use std::{fmt, str::FromStr};

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const CARD_NUMBER_LEN: usize = 16;

// ─── CardNumber ──────────────────────────────────────────────────────────────

/// A structurally valid card number.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct CardNumber(String);

/// Returns `true` if `s` matches `[1-9][0-9]{15}`.
pub fn is_well_formed(s: &str) -> bool {
  let bytes = s.as_bytes();
  bytes.len() == CARD_NUMBER_LEN
    && bytes[0] != b'0'
    && bytes.iter().all(u8::is_ascii_digit)
}

impl CardNumber {
  pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
    let s = s.into();
    if is_well_formed(&s) {
      Ok(Self(s))
    } else {
      Err(ValidationError::InvalidCardNumber(s))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CardNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for CardNumber {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl TryFrom<String> for CardNumber {
  type Error = ValidationError;

  fn try_from(s: String) -> Result<Self, Self::Error> { Self::parse(s) }
}

impl From<CardNumber> for String {
  fn from(n: CardNumber) -> Self { n.0 }
}

// ─── Random digits ───────────────────────────────────────────────────────────

/// A stateless source of uniformly distributed digits.
pub trait DigitSource: Send + Sync {
  /// A uniformly random value in `0..bound`. `bound` is in `1..=10`.
  fn below(&self, bound: u8) -> u8;
}

impl<D: DigitSource + ?Sized> DigitSource for Box<D> {
  fn below(&self, bound: u8) -> u8 { (**self).below(bound) }
}

/// Draws digits from the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsDigits;

impl DigitSource for OsDigits {
  fn below(&self, bound: u8) -> u8 {
    debug_assert!((1..=10).contains(&bound));
    // Reject the top of the byte range so every digit is equally likely.
    let limit = 256 - (256 % u16::from(bound));
    let mut rng = OsRng;
    let mut buf = [0u8; 1];
    loop {
      rng.fill_bytes(&mut buf);
      if u16::from(buf[0]) < limit {
        return buf[0] % bound;
      }
    }
  }
}

// ─── Generator ───────────────────────────────────────────────────────────────

/// Produces random card numbers from an injected [`DigitSource`].
#[derive(Debug, Clone, Default)]
pub struct CardNumberGenerator<D = OsDigits> {
  digits: D,
}

impl<D: DigitSource> CardNumberGenerator<D> {
  pub fn new(digits: D) -> Self { Self { digits } }

  pub fn generate(&self) -> CardNumber {
    let mut s = String::with_capacity(CARD_NUMBER_LEN);
    s.push(char::from(b'1' + self.digits.below(9)));
    for _ in 1..CARD_NUMBER_LEN {
      s.push(char::from(b'0' + self.digits.below(10)));
    }
    CardNumber(s)
  }
}

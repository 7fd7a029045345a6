//! Core types and trait definitions for cardsync.
//!
//! This crate is deliberately free of HTTP, database and runtime
//! dependencies. It holds the domain records, the two pieces of domain logic
//! that gate correctness (OIB checksum validation and card-number
//! generation), the store traits, and the shared error taxonomy.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod card;
pub mod card_number;
pub mod client;
pub mod error;
pub mod message;
pub mod oib;
pub mod status;
pub mod store;

pub use card::Card;
pub use card_number::{CardNumber, CardNumberGenerator, DigitSource, OsDigits};
pub use client::Client;
pub use error::{Entity, Error, Result, ValidationError};
pub use message::StatusChangeMessage;
pub use oib::Oib;
pub use status::Status;

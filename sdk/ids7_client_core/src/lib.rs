#![doc = include_str!("../README.md")]

pub mod auth;
pub mod client;
pub mod error;
pub mod schema;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{Ids7Error, Ids7Result};

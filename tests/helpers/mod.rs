//! Shared test helpers: document fixtures and error assertions.

pub mod error_assertions;

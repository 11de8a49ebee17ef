// Shared fixtures for unit and integration tests
//
// Usage from a test target:
//   #[path = "../helpers/mod.rs"]
//   mod helpers;
//   use helpers::*;

#![allow(dead_code)]

pub mod test_data;

pub use test_data::*;

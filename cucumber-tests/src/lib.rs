//! Cucumber BDD suite for Shibgate
//!
//! Scenarios live in `features/`, step definitions in `tests/steps/`.

pub mod features;

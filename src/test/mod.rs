//! Shared fixtures for the unit tests.

pub mod factories;

pub use factories::SampleIds;

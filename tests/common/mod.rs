//! Shared fixtures and helpers for harness integration tests

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{scripted_factory, ScriptedHost};

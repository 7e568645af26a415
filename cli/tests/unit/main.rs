//! Unit tests for hostkit
//!
//! These tests drive the library against scripted executors and run fast
//! without SSH or a real host.

mod detection;
mod generation_guard;
mod mocks;
mod property_tests;
mod sections;

//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: local process execution,
//! the SSH and local executors, and the configuration file.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod executor;

//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` — never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod actions;
pub mod ports;
pub mod sections;
pub mod services;
pub mod session;
pub mod state_store;

#[cfg(test)]
pub mod test_support;

pub use actions::AdminActions;
pub use ports::{CommandRunner, ConfigStore, Executor, ProgressReporter};
pub use sections::SectionRegistry;
pub use session::{DetectedSoftware, Platform, Session};
pub use state_store::{LoadOutcome, StateStore, load_section};

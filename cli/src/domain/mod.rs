//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod catalog;
pub mod command;
pub mod config;
pub mod detection;
pub mod error;
pub mod package_manager;
pub mod parsers;
pub mod sanitize;
pub mod software;
pub mod systemd;

pub use catalog::{ApplicationDefinition, Capability, Catalog, SectionDefinition, SectionProviderType};
pub use command::{CommandResult, shell_quote, validate_identifier};
pub use config::{HostEntry, HostkitConfig, TimeoutConfig};
pub use detection::{Detection, DetectionState};
pub use error::{AdminError, CommandFailure, ConfigError};
pub use package_manager::PackageManagerKind;
pub use software::{ServiceDescriptor, SoftwareId, SoftwareSpec};
pub use systemd::ServiceAction;

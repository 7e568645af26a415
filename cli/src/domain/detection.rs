//! Install detection expressed as data.
//!
//! A detection plan is an ordered list of probes, cheapest and most reliable
//! first. The detector runs them in order and stops at the first positive
//! one; adding a signal means adding a probe, not another branch.

use serde::Serialize;

use crate::domain::command::{CommandResult, predicates, shell_quote};
use crate::domain::package_manager::{PackageManagerKind, package_query_command};
use crate::domain::sanitize::sanitize_output;
use crate::domain::software::SoftwareSpec;
use crate::domain::systemd;

/// Which kind of signal a probe looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStage {
    Binary,
    ServiceActive,
    ServiceEnabled,
    Path,
    PackageRecord,
}

impl ProbeStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeStage::Binary => "binary",
            ProbeStage::ServiceActive => "service_active",
            ProbeStage::ServiceEnabled => "service_enabled",
            ProbeStage::Path => "path",
            ProbeStage::PackageRecord => "package_record",
        }
    }
}

/// Success predicate applied to a probe's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Exit 0 with something printed (`which`, `grep`).
    NonEmptyOutput,
    /// Sanitized output equals the literal exactly.
    SanitizedEquals(&'static str),
    /// Output is `yes` (`test -e ... && echo yes`).
    EchoedYes,
}

impl Expect {
    #[must_use]
    pub fn matches(self, result: &CommandResult) -> bool {
        match self {
            Expect::NonEmptyOutput => result.is_success() && !result.clean_output().is_empty(),
            Expect::SanitizedEquals(expected) => sanitize_output(&result.output) == expected,
            Expect::EchoedYes => predicates::echoed_yes(result),
        }
    }
}

/// One `{command, successPredicate}` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub stage: ProbeStage,
    pub command: String,
    pub expect: Expect,
}

impl Probe {
    #[must_use]
    pub fn is_positive(&self, result: &CommandResult) -> bool {
        self.expect.matches(result)
    }
}

/// Build the ordered probe chain for `spec`.
///
/// The package-record stage is only included when the package manager is
/// known.
#[must_use]
pub fn detection_plan(spec: &SoftwareSpec, kind: Option<PackageManagerKind>) -> Vec<Probe> {
    let mut plan = Vec::new();
    for binary in spec.binaries {
        plan.push(Probe {
            stage: ProbeStage::Binary,
            command: format!("which {} 2>/dev/null", shell_quote(binary)),
            expect: Expect::NonEmptyOutput,
        });
    }
    for unit in spec.units {
        plan.push(Probe {
            stage: ProbeStage::ServiceActive,
            command: systemd::is_active_command(unit),
            expect: Expect::SanitizedEquals("active"),
        });
    }
    for unit in spec.units {
        plan.push(Probe {
            stage: ProbeStage::ServiceEnabled,
            command: systemd::is_enabled_command(unit),
            expect: Expect::SanitizedEquals("enabled"),
        });
    }
    for path in spec.paths {
        plan.push(Probe {
            stage: ProbeStage::Path,
            command: format!("test -e {} && echo yes", shell_quote(path)),
            expect: Expect::EchoedYes,
        });
    }
    if let Some(kind) = kind {
        plan.push(Probe {
            stage: ProbeStage::PackageRecord,
            command: package_query_command(kind, spec.package_pattern),
            expect: Expect::NonEmptyOutput,
        });
    }
    plan
}

/// Detector state machine: `Unknown → Probing → {Installed, NotInstalled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectionState {
    #[default]
    Unknown,
    Probing,
    Installed,
    NotInstalled,
}

impl DetectionState {
    /// Move to the next state given a probe outcome. Terminal states and
    /// negative outcomes after the last probe settle on `NotInstalled`.
    #[must_use]
    pub fn advance(self, positive: bool, last_probe: bool) -> Self {
        match self {
            DetectionState::Installed | DetectionState::NotInstalled => self,
            DetectionState::Unknown | DetectionState::Probing => {
                if positive {
                    DetectionState::Installed
                } else if last_probe {
                    DetectionState::NotInstalled
                } else {
                    DetectionState::Probing
                }
            }
        }
    }
}

/// Outcome of running a detection plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub state: DetectionState,
    /// Stage of the probe that produced the positive signal.
    pub matched_stage: Option<ProbeStage>,
    pub probes_run: usize,
}

impl Detection {
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.state == DetectionState::Installed
    }

    #[must_use]
    pub fn not_installed(probes_run: usize) -> Self {
        Self {
            state: DetectionState::NotInstalled,
            matched_stage: None,
            probes_run,
        }
    }
}

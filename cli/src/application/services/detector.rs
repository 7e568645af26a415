//! Application service — software detection.
//!
//! Runs the probe chain from [`detection_plan`] in order and stops at the
//! first positive probe. For installed software the canonical unit is then
//! resolved from the candidate list and the version banner decides the
//! flavor. Results are cached on the session until invalidated.

use futures_util::future::join_all;
use tracing::debug;

use crate::application::ports::Executor;
use crate::application::services::service_control;
use crate::application::session::{DetectedSoftware, Session};
use crate::domain::detection::{Detection, DetectionState, Probe, detection_plan};
use crate::domain::software::extract_version;
use crate::domain::sanitize::sanitize_output;
use crate::domain::{ServiceDescriptor, SoftwareId, SoftwareSpec};

/// Detect `id`, answering from the session cache when possible.
pub async fn detect(session: &Session<impl Executor>, id: SoftwareId) -> DetectedSoftware {
    if let Some(cached) = session.cached(id) {
        return cached;
    }
    let detected = detect_uncached(session, id.spec()).await;
    session.store(id, detected.clone());
    detected
}

/// Detect every known software concurrently.
pub async fn detect_all(session: &Session<impl Executor>) -> Vec<(SoftwareId, DetectedSoftware)> {
    // Resolve the package manager up front so the concurrent detectors share
    // one os-release probe.
    session.platform().await;
    let results = join_all(SoftwareId::ALL.map(|id| detect(session, id))).await;
    SoftwareId::ALL.into_iter().zip(results).collect()
}

async fn detect_uncached(session: &Session<impl Executor>, spec: &SoftwareSpec) -> DetectedSoftware {
    let kind = session.package_manager().await;
    let plan = detection_plan(spec, Some(kind));
    let detection = run_plan(session, &plan).await;
    debug!(
        software = %spec.id,
        state = ?detection.state,
        stage = ?detection.matched_stage,
        probes = detection.probes_run,
        "detection finished"
    );

    if !detection.is_installed() {
        return DetectedSoftware {
            detection,
            descriptor: spec.fallback_descriptor(false),
            version: None,
        };
    }

    let banner = session.run(spec.version_command).await;
    let banner = sanitize_output(&banner.output);
    let is_alternate = spec.is_alternate_flavor(&banner);
    let descriptor = resolve_descriptor(session, spec, is_alternate).await;

    DetectedSoftware {
        detection,
        descriptor,
        version: extract_version(&banner),
    }
}

/// Evaluate probes in order, short-circuiting on the first positive one.
pub async fn run_plan(session: &Session<impl Executor>, plan: &[Probe]) -> Detection {
    let mut state = DetectionState::Unknown;
    for (index, probe) in plan.iter().enumerate() {
        let result = session.run(&probe.command).await;
        let positive = probe.is_positive(&result);
        state = state.advance(positive, index + 1 == plan.len());
        if positive {
            return Detection {
                state,
                matched_stage: Some(probe.stage),
                probes_run: index + 1,
            };
        }
    }
    Detection::not_installed(plan.len())
}

/// First candidate unit that exists; the first candidate when none does.
pub async fn resolve_descriptor(
    session: &Session<impl Executor>,
    spec: &SoftwareSpec,
    is_alternate_flavor: bool,
) -> ServiceDescriptor {
    for unit in spec.units {
        if service_control::service_exists(session, unit).await {
            return ServiceDescriptor {
                canonical_name: (*unit).to_string(),
                is_alternate_flavor,
            };
        }
    }
    spec.fallback_descriptor(is_alternate_flavor)
}

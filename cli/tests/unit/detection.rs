//! Detection through the public session API.

#![allow(clippy::expect_used)]

use hostkit_cli::application::services::detector;
use hostkit_cli::domain::detection::ProbeStage;
use hostkit_cli::domain::{PackageManagerKind, SoftwareId};

use crate::mocks::{FakeHost, session};

#[tokio::test]
async fn first_binary_short_circuits_the_chain() {
    let s = session(FakeHost::debian_with("nginx"));
    let detected = detector::detect(&s, SoftwareId::Nginx).await;

    assert!(detected.detection.is_installed());
    assert_eq!(detected.detection.matched_stage, Some(ProbeStage::Binary));
    assert_eq!(detected.detection.probes_run, 1);
    assert_eq!(s.executor().count_matching("is-enabled"), 0);
    assert_eq!(s.executor().count_matching("dpkg -l"), 0);
}

#[tokio::test]
async fn detection_is_cached_per_session() {
    let s = session(FakeHost::debian_with("nginx"));
    let first = detector::detect(&s, SoftwareId::Nginx).await;
    let second = detector::detect(&s, SoftwareId::Nginx).await;

    assert_eq!(first, second);
    assert_eq!(s.executor().count_matching("which 'nginx'"), 1);
}

#[tokio::test]
async fn invalidate_forces_a_fresh_probe() {
    let s = session(FakeHost::debian_with("nginx"));
    detector::detect(&s, SoftwareId::Nginx).await;
    s.invalidate(SoftwareId::Nginx);
    detector::detect(&s, SoftwareId::Nginx).await;

    assert_eq!(s.executor().count_matching("which 'nginx'"), 2);
}

#[tokio::test]
async fn package_record_is_the_last_resort() {
    let s = session(
        FakeHost::new()
            .on("os-release", "ID=fedora\nVERSION_ID=40\n", 0)
            .on("rpm -qa", "redis-7.2.4-1.fc40.x86_64\n", 0),
    );
    let detected = detector::detect(&s, SoftwareId::Redis).await;

    assert!(detected.detection.is_installed());
    assert_eq!(
        detected.detection.matched_stage,
        Some(ProbeStage::PackageRecord)
    );
    let spec = SoftwareId::Redis.spec();
    let expected = spec.binaries.len() + spec.units.len() * 2 + spec.paths.len() + 1;
    assert_eq!(detected.detection.probes_run, expected);
    assert_eq!(detected.descriptor.canonical_name, "redis-server");
}

#[tokio::test]
async fn nothing_positive_means_not_installed() {
    let s = session(FakeHost::new().on("os-release", "ID=ubuntu\n", 0));
    let detected = detector::detect(&s, SoftwareId::Postgresql).await;

    assert!(!detected.detection.is_installed());
    assert_eq!(detected.detection.matched_stage, None);
    assert_eq!(detected.version, None);
    // No version banner or unit lookup for absent software.
    assert_eq!(s.executor().count_matching("--version"), 0);
    assert_eq!(s.executor().count_matching("list-units"), 0);
}

#[tokio::test]
async fn unknown_distribution_falls_back_to_apt() {
    let s = session(FakeHost::new().on("os-release", "ID=plan9\n", 0));
    let platform = s.platform().await;

    assert_eq!(platform.package_manager, PackageManagerKind::Apt);
    assert!(!platform.recognized);
}

#[tokio::test]
async fn id_like_resolves_derivatives() {
    let s = session(FakeHost::new().on(
        "os-release",
        "ID=pop\nID_LIKE=\"ubuntu debian\"\nPRETTY_NAME=\"Pop!_OS 22.04 LTS\"\n",
        0,
    ));
    let platform = s.platform().await;

    assert_eq!(platform.package_manager, PackageManagerKind::Apt);
    assert!(platform.recognized);
    assert_eq!(platform.release.pretty_name.as_deref(), Some("Pop!_OS 22.04 LTS"));
}

#[tokio::test]
async fn valkey_banner_selects_the_alternate_flavor() {
    let s = session(
        FakeHost::debian_with("redis-server")
            .on(
                "redis-server --version",
                "Valkey server v=8.0.1 sha=00000000:0 malloc=jemalloc-5.3.0 bits=64\n",
                0,
            )
            .on("grep -F 'valkey.service'", "valkey.service loaded active running\n", 0),
    );
    let detected = detector::detect(&s, SoftwareId::Redis).await;

    assert!(detected.descriptor.is_alternate_flavor);
    assert_eq!(detected.descriptor.canonical_name, "valkey");
    assert_eq!(SoftwareId::Redis.spec().flavor_name(&detected.descriptor), "Valkey");
}

#[tokio::test]
async fn detect_all_reads_os_release_once() {
    let s = session(FakeHost::debian_with("nginx"));
    let all = detector::detect_all(&s).await;

    assert_eq!(all.len(), SoftwareId::ALL.len());
    assert_eq!(s.executor().count_matching("os-release"), 1);
    let nginx = all
        .iter()
        .find(|(id, _)| *id == SoftwareId::Nginx)
        .map(|(_, d)| d)
        .expect("nginx entry");
    assert!(nginx.detection.is_installed());
}

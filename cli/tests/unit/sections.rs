//! Catalog, providers and renderers working together.

#![allow(clippy::expect_used)]

use hostkit_cli::application::{LoadOutcome, StateStore, load_section};
use hostkit_cli::domain::{Catalog, SectionProviderType};
use hostkit_cli::output::sections::{render_banner, render_section};
use hostkit_cli::output::styles::Styles;
use hostkit_common::ApplicationState;

use crate::mocks::{FakeHost, session};

#[tokio::test]
async fn redis_config_loads_and_renders() {
    let catalog = Catalog::builtin().expect("catalog");
    let redis = catalog.app("redis").expect("redis");
    let section = redis.section("config").expect("config section");
    let s = session(
        FakeHost::debian_with("redis-server")
            .on("'CONFIG' 'GET'", "maxmemory\n0\nappendonly\nno\n", 0),
    );
    let store = StateStore::spawn();

    let outcome = load_section(&store, &s, redis, section, None)
        .await
        .expect("load");
    assert!(matches!(outcome, LoadOutcome::Committed(_)));

    let state = store.snapshot().await.expect("snapshot");
    assert_eq!(state.active_section.as_deref(), Some("config"));
    assert!(state.error_message.is_none());
    let lines = render_section(&Styles::default(), section.provider_type, &state);
    assert_eq!(lines, ["maxmemory   0", "appendonly  no"]);
}

#[tokio::test]
async fn redis_error_reply_becomes_a_banner() {
    let catalog = Catalog::builtin().expect("catalog");
    let redis = catalog.app("redis").expect("redis");
    let section = redis.section("config").expect("config section");
    let s = session(
        FakeHost::debian_with("redis-server")
            .on("'CONFIG' 'GET'", "NOAUTH Authentication required.\n", 0),
    );
    let store = StateStore::spawn();

    let outcome = load_section(&store, &s, redis, section, None)
        .await
        .expect("load");
    assert!(matches!(outcome, LoadOutcome::Committed(_)));

    let state = store.snapshot().await.expect("snapshot");
    assert!(state.config_entries.is_empty());
    let banner = render_banner(&Styles::default(), &state);
    assert_eq!(banner.len(), 1);
    assert!(banner[0].starts_with("✗ Configuration:"), "{banner:?}");
    assert!(banner[0].contains("NOAUTH"), "{banner:?}");
}

#[tokio::test]
async fn stopped_server_skips_the_query() {
    let catalog = Catalog::builtin().expect("catalog");
    let redis = catalog.app("redis").expect("redis");
    let section = redis.section("keyspace").expect("keyspace section");
    let s = session(
        FakeHost::new()
            .on("os-release", "ID=debian\n", 0)
            .on("which 'redis-server'", "/usr/bin/redis-server\n", 0)
            .on("is-active", "inactive\n", 3),
    );
    let store = StateStore::spawn();

    load_section(&store, &s, redis, section, None)
        .await
        .expect("load");

    let state = store.snapshot().await.expect("snapshot");
    assert!(
        state
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("not running")),
        "{:?}",
        state.error_message
    );
    assert_eq!(s.executor().count_matching("redis-cli"), 0);
}

#[test]
fn every_catalog_section_has_its_capability() {
    let catalog = Catalog::builtin().expect("catalog");
    for app in catalog.applications() {
        for section in &app.sections {
            if let Some(capability) = section.provider_type.required_capability() {
                assert!(
                    app.has(capability),
                    "{}/{} needs {}",
                    app.id,
                    section.id,
                    capability.as_str()
                );
            }
        }
    }
}

#[test]
fn every_provider_is_used_by_the_catalog() {
    let catalog = Catalog::builtin().expect("catalog");
    for provider in SectionProviderType::ALL {
        let used = catalog
            .applications()
            .iter()
            .flat_map(|app| &app.sections)
            .any(|section| section.provider_type == provider);
        assert!(used, "no section uses {}", provider.as_str());
    }
}

#[test]
fn every_provider_renders_an_empty_state() {
    let state = ApplicationState::default();
    for provider in SectionProviderType::ALL {
        let lines = render_section(&Styles::default(), provider, &state);
        assert!(!lines.is_empty(), "{} rendered nothing", provider.as_str());
    }
}

#[test]
fn every_application_has_a_default_section() {
    let catalog = Catalog::builtin().expect("catalog");
    for app in catalog.applications() {
        let default = app.default_section().expect("default section");
        assert_eq!(app.sorted_sections()[0].id, default.id, "{}", app.id);
    }
}

//! Overlapping section loads against one state store.

#![allow(clippy::expect_used)]

use std::time::Duration;

use hostkit_cli::application::{LoadOutcome, StateStore, load_section};
use hostkit_cli::domain::{ApplicationDefinition, Catalog};

use crate::mocks::{FakeHost, session};

const SLOW_LISTING: &str = "total 4\n-rw-r--r--  1 root root  10 1700000000 old.txt\n";
const FAST_LISTING: &str = "total 8\n\
    drwxr-xr-x  2 root root     4096 1700000000 bin\n\
    -rw-r--r--  1 root root      220 1700000000 new.txt\n";

fn files_app() -> ApplicationDefinition {
    Catalog::builtin()
        .expect("catalog")
        .app("files")
        .expect("files app")
        .clone()
}

fn browsing_host() -> FakeHost {
    FakeHost::new()
        .on_after("'/slow'", SLOW_LISTING, 0, Duration::from_secs(5))
        .on("'/fast'", FAST_LISTING, 0)
        .on("'/missing'", "ls: cannot access '/missing': No such file or directory\n", 2)
}

#[tokio::test]
async fn newer_load_supersedes_one_in_flight() {
    let app = files_app();
    let section = app.default_section().expect("section");
    let s = session(browsing_host());
    let store = StateStore::spawn();

    let slow = load_section(&store, &s, &app, section, Some("/slow".to_string()));
    let fast = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        load_section(&store, &s, &app, section, Some("/fast".to_string())).await
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.expect("slow"), LoadOutcome::Superseded);
    let LoadOutcome::Committed(generation) = fast.expect("fast") else {
        panic!("fast load should commit");
    };

    let state = store.snapshot().await.expect("snapshot");
    assert_eq!(state.generation, generation);
    assert_eq!(state.current_path.as_deref(), Some("/fast"));
    let names: Vec<&str> = state.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["bin", "new.txt"]);
    assert_eq!(s.executor().count_matching("'/slow'"), 1);
}

#[tokio::test]
async fn reset_cancels_a_load_in_flight() {
    let app = files_app();
    let section = app.default_section().expect("section");
    let s = session(browsing_host());
    let store = StateStore::spawn();

    let slow = load_section(&store, &s, &app, section, Some("/slow".to_string()));
    let reset = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.reset().await
    };
    let (slow, reset) = tokio::join!(slow, reset);

    reset.expect("reset");
    assert_eq!(slow.expect("slow"), LoadOutcome::Superseded);
    let state = store.snapshot().await.expect("snapshot");
    assert!(state.files.is_empty());
    assert_eq!(state.current_path, None);
}

#[tokio::test]
async fn sequential_loads_both_commit() {
    let app = files_app();
    let section = app.default_section().expect("section");
    let s = session(browsing_host());
    let store = StateStore::spawn();

    let first = load_section(&store, &s, &app, section, Some("/fast".to_string()))
        .await
        .expect("first");
    let second = load_section(&store, &s, &app, section, None)
        .await
        .expect("second");

    let (LoadOutcome::Committed(a), LoadOutcome::Committed(b)) = (first, second) else {
        panic!("both loads should commit");
    };
    assert!(b > a);
    // Without an explicit path the second load re-lists the current directory.
    assert_eq!(s.executor().count_matching("'/fast'"), 2);
}

#[tokio::test]
async fn soft_failure_still_commits_with_a_message() {
    let app = files_app();
    let section = app.default_section().expect("section");
    let s = session(browsing_host());
    let store = StateStore::spawn();

    let outcome = load_section(&store, &s, &app, section, Some("/missing".to_string()))
        .await
        .expect("load");

    assert!(matches!(outcome, LoadOutcome::Committed(_)));
    let state = store.snapshot().await.expect("snapshot");
    assert!(
        state
            .error_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Browser:")),
        "{:?}",
        state.error_message
    );
}

#[tokio::test]
async fn missing_capability_is_structural() {
    let catalog = Catalog::builtin().expect("catalog");
    let nginx = catalog.app("nginx").expect("nginx");
    let mut section = nginx.section("sites").expect("sites").clone();
    section.provider_type = hostkit_cli::domain::SectionProviderType::Databases;
    let s = session(FakeHost::debian_with("nginx"));
    let store = StateStore::spawn();

    let outcome = load_section(&store, &s, nginx, &section, None)
        .await
        .expect("load");

    assert!(matches!(outcome, LoadOutcome::Failed(_)));
    let state = store.snapshot().await.expect("snapshot");
    assert_eq!(state.generation, 0);
    assert!(state.error_message.is_none());
}

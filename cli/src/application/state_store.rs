//! Single owner of the [`ApplicationState`] for one session.
//!
//! The state lives inside a tokio task; everything else talks to it through
//! messages. A load first asks for a generation (`Begin`), works on a scratch
//! copy, and hands the scratch back (`Commit`). Only the newest generation is
//! merged, so a slow load that finishes after a newer one started is
//! discarded instead of overwriting what the user switched to.

use anyhow::{Result, anyhow};
use chrono::Utc;
use hostkit_common::{ApplicationState, StateField};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::application::ports::Executor;
use crate::application::sections::SectionRegistry;
use crate::application::session::Session;
use crate::domain::{AdminError, ApplicationDefinition, SectionDefinition};

const CHANNEL_CAPACITY: usize = 32;

enum Message {
    Begin {
        section: String,
        reply: oneshot::Sender<(u64, ApplicationState)>,
    },
    Commit {
        generation: u64,
        section: String,
        scratch: Box<ApplicationState>,
        fields: &'static [StateField],
        reply: oneshot::Sender<bool>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<ApplicationState>,
    },
    Notify {
        outcome: Result<String, String>,
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle to the state-owning task.
#[derive(Clone)]
pub struct StateStore {
    tx: mpsc::Sender<Message>,
    state_rx: watch::Receiver<ApplicationState>,
    latest_rx: watch::Receiver<u64>,
}

fn stopped() -> anyhow::Error {
    anyhow!("application state task stopped")
}

impl StateStore {
    /// Spawn the owning task on the current runtime.
    #[must_use]
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ApplicationState::default());
        let (latest_tx, latest_rx) = watch::channel(0);
        tokio::spawn(run(rx, state_tx, latest_tx));
        Self {
            tx,
            state_rx,
            latest_rx,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Message) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).await.map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())
    }

    /// Start a load: returns its generation and a copy of the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state task has stopped.
    pub async fn begin(&self, section: &str) -> Result<(u64, ApplicationState)> {
        let section = section.to_string();
        self.request(|reply| Message::Begin { section, reply }).await
    }

    /// Merge `fields` from `scratch`. Returns `false` when a newer load has
    /// begun since `generation` and the scratch was discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the state task has stopped.
    pub async fn commit(
        &self,
        generation: u64,
        section: &str,
        scratch: ApplicationState,
        fields: &'static [StateField],
    ) -> Result<bool> {
        let section = section.to_string();
        self.request(|reply| Message::Commit {
            generation,
            section,
            scratch: Box::new(scratch),
            fields,
            reply,
        })
        .await
    }

    /// Clear every field and invalidate loads in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the state task has stopped.
    pub async fn reset(&self) -> Result<()> {
        self.request(|reply| Message::Reset { reply }).await
    }

    /// # Errors
    ///
    /// Returns an error if the state task has stopped.
    pub async fn snapshot(&self) -> Result<ApplicationState> {
        self.request(|reply| Message::Snapshot { reply }).await
    }

    /// Record an action result as the success or error message.
    ///
    /// # Errors
    ///
    /// Returns an error if the state task has stopped.
    pub async fn notify(&self, outcome: Result<String, String>) -> Result<()> {
        self.request(|reply| Message::Notify { outcome, reply }).await
    }

    /// Receiver that sees every published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ApplicationState> {
        self.state_rx.clone()
    }

    /// Resolves once a load newer than `generation` has begun. Never
    /// resolves after the state task is gone.
    pub async fn superseded(&self, generation: u64) {
        let mut latest = self.latest_rx.clone();
        let closed = latest.wait_for(|l| *l > generation).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

async fn run(
    mut rx: mpsc::Receiver<Message>,
    state_tx: watch::Sender<ApplicationState>,
    latest_tx: watch::Sender<u64>,
) {
    let mut state = ApplicationState::default();
    let mut latest: u64 = 0;

    while let Some(message) = rx.recv().await {
        match message {
            Message::Begin { section, reply } => {
                latest += 1;
                latest_tx.send_replace(latest);
                debug!(generation = latest, %section, "section load started");
                let _ = reply.send((latest, state.clone()));
            }
            Message::Commit {
                generation,
                section,
                scratch,
                fields,
                reply,
            } => {
                let accepted = generation == latest;
                if accepted {
                    state.merge_from(*scratch, fields);
                    state.generation = generation;
                    state.active_section = Some(section.clone());
                    state.loaded_at = Some(Utc::now());
                    info!(generation, %section, "section committed");
                    state_tx.send_replace(state.clone());
                } else {
                    warn!(generation, latest, %section, "discarding stale section load");
                }
                let _ = reply.send(accepted);
            }
            Message::Reset { reply } => {
                latest += 1;
                latest_tx.send_replace(latest);
                state.reset();
                state_tx.send_replace(state.clone());
                let _ = reply.send(());
            }
            Message::Snapshot { reply } => {
                let _ = reply.send(state.clone());
            }
            Message::Notify { outcome, reply } => {
                match outcome {
                    Ok(message) => state.set_success(message),
                    Err(message) => state.set_error(message),
                }
                state_tx.send_replace(state.clone());
                let _ = reply.send(());
            }
        }
    }
}

// ── Section loads ─────────────────────────────────────────────────────────────

/// How a section load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Merged into the state under this generation.
    Committed(u64),
    /// A newer load began first; nothing was merged.
    Superseded,
    /// Structural failure; nothing was merged.
    Failed(AdminError),
}

/// Load `section` of `app` and commit it unless a newer load overtakes it.
///
/// `path` overrides `current_path` for the load (file browsing). When a newer
/// load begins while this one is still running, the provider future is
/// dropped, which kills its remote commands.
///
/// # Errors
///
/// Returns an error only if the state task has stopped.
pub async fn load_section<E: Executor>(
    store: &StateStore,
    session: &Session<E>,
    app: &ApplicationDefinition,
    section: &SectionDefinition,
    path: Option<String>,
) -> Result<LoadOutcome> {
    let (generation, mut scratch) = store.begin(&section.id).await?;
    scratch.clear_messages();
    if path.is_some() {
        scratch.current_path = path;
    }

    let load = async move {
        let result = SectionRegistry::load(app, section, &mut scratch, session).await;
        (result, scratch)
    };

    tokio::select! {
        (result, scratch) = load => match result {
            Ok(()) => {
                let fields = section.provider_type.owned_fields();
                if store.commit(generation, &section.id, scratch, fields).await? {
                    Ok(LoadOutcome::Committed(generation))
                } else {
                    Ok(LoadOutcome::Superseded)
                }
            }
            Err(err) => {
                warn!(app = %app.id, section = %section.id, error = %err, "section load aborted");
                Ok(LoadOutcome::Failed(err))
            }
        },
        () = store.superseded(generation) => {
            debug!(generation, section = %section.id, "section load superseded in flight");
            Ok(LoadOutcome::Superseded)
        }
    }
}

#[cfg(test)]
mod tests {
    use hostkit_common::ServiceStatus;

    use super::*;
    use crate::application::test_support::ScriptedExecutor;
    use crate::domain::{Catalog, TimeoutConfig};

    fn with_status(status: ServiceStatus) -> ApplicationState {
        ApplicationState {
            status,
            ..ApplicationState::default()
        }
    }

    #[tokio::test]
    async fn newest_generation_wins() {
        let store = StateStore::spawn();
        let (first, _) = store.begin("overview").await.expect("begin");
        let (second, _) = store.begin("overview").await.expect("begin");
        assert!(second > first);

        let fields = &[StateField::Status];
        assert!(store
            .commit(second, "overview", with_status(ServiceStatus::Running), fields)
            .await
            .expect("commit"));
        assert!(!store
            .commit(first, "overview", with_status(ServiceStatus::Stopped), fields)
            .await
            .expect("commit"));

        let state = store.snapshot().await.expect("snapshot");
        assert_eq!(state.status, ServiceStatus::Running);
        assert_eq!(state.generation, second);
        assert_eq!(state.active_section.as_deref(), Some("overview"));
        assert!(state.loaded_at.is_some());
    }

    #[tokio::test]
    async fn reset_invalidates_loads_in_flight() {
        let store = StateStore::spawn();
        let (generation, _) = store.begin("logs").await.expect("begin");
        store.reset().await.expect("reset");
        let scratch = ApplicationState {
            log_text: "late".to_string(),
            ..ApplicationState::default()
        };
        assert!(!store
            .commit(generation, "logs", scratch, &[StateField::LogText])
            .await
            .expect("commit"));
        assert_eq!(store.snapshot().await.expect("snapshot").log_text, "");
    }

    #[tokio::test]
    async fn notify_sets_banner() {
        let store = StateStore::spawn();
        let mut rx = store.subscribe();
        store
            .notify(Err("restart failed".to_string()))
            .await
            .expect("notify");
        rx.changed().await.expect("published");
        assert_eq!(
            rx.borrow().error_message.as_deref(),
            Some("restart failed")
        );
    }

    #[tokio::test]
    async fn superseded_resolves_after_newer_begin() {
        let store = StateStore::spawn();
        let (generation, _) = store.begin("a").await.expect("begin");
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.superseded(generation).await })
        };
        store.begin("b").await.expect("begin");
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("resolved")
            .expect("joined");
    }

    #[tokio::test]
    async fn load_section_commits_owned_fields_only() {
        let catalog = Catalog::builtin().expect("catalog");
        let app = catalog.app("redis").expect("redis");
        let section = app.section("config").expect("config");
        let session = Session::new(
            ScriptedExecutor::new()
                .on("os-release", "ID=debian\n", 0)
                .on("which 'redis-server'", "/usr/bin/redis-server", 0)
                .on("is-active", "active", 0)
                .on("CONFIG' 'GET", "appendonly\nno\n", 0),
            TimeoutConfig::default(),
        );
        let store = StateStore::spawn();
        let outcome = load_section(&store, &session, app, section, None)
            .await
            .expect("load");
        assert!(matches!(outcome, LoadOutcome::Committed(_)));

        let state = store.snapshot().await.expect("snapshot");
        assert_eq!(state.config_entries.len(), 1);
        assert_eq!(state.status, ServiceStatus::NotInstalled);
        assert!(state.error_message.is_none());
    }
}

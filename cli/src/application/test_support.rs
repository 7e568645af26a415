//! Shared test helpers for application service tests.
//!
//! `ScriptedExecutor` answers commands from a rule table and records every
//! call so tests can assert on what was sent and how often.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::ports::Executor;
use crate::domain::CommandResult;

struct Rule {
    needle: String,
    output: String,
    exit_code: i32,
}

/// First rule whose needle is a substring of the command wins. Commands
/// matching no rule exit 1 with empty output.
pub struct ScriptedExecutor {
    rules: Vec<Rule>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn on(mut self, needle: &str, output: &str, exit_code: i32) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            output: output.to_string(),
            exit_code,
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.calls().iter().filter(|c| c.contains(needle)).count()
    }
}

impl Executor for ScriptedExecutor {
    async fn execute(&self, command: &str, _timeout: Duration) -> CommandResult {
        self.calls.lock().expect("lock").push(command.to_string());
        let (output, code) = self
            .rules
            .iter()
            .find(|r| command.contains(&r.needle))
            .map_or((String::new(), 1), |r| (r.output.clone(), r.exit_code));
        CommandResult::new(output, code, Duration::from_millis(1))
    }

    fn target(&self) -> String {
        "scripted".to_string()
    }
}

/// Collects formatted tracing output for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install a debug-level subscriber writing here until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("lock")).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

//! Shared mock infrastructure for unit tests.
//!
//! [`FakeHost`] answers remote commands from a rule table. Rules can carry a
//! delay so tests can make one load finish after another.

#![allow(clippy::expect_used)]

use std::sync::Mutex;
use std::time::Duration;

use hostkit_cli::application::Session;
use hostkit_cli::application::ports::Executor;
use hostkit_cli::domain::{CommandResult, TimeoutConfig};

struct Rule {
    needle: String,
    output: String,
    exit_code: i32,
    delay: Duration,
}

/// First rule whose needle is a substring of the command wins. Unmatched
/// commands exit 1 with no output.
#[derive(Default)]
pub struct FakeHost {
    rules: Vec<Rule>,
    calls: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on(self, needle: &str, output: &str, exit_code: i32) -> Self {
        self.on_after(needle, output, exit_code, Duration::ZERO)
    }

    #[must_use]
    pub fn on_after(mut self, needle: &str, output: &str, exit_code: i32, delay: Duration) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            output: output.to_string(),
            exit_code,
            delay,
        });
        self
    }

    /// A Debian host with `binary` on the PATH and its unit active.
    #[must_use]
    pub fn debian_with(binary: &str) -> Self {
        Self::new()
            .on("os-release", "ID=debian\nVERSION_ID=\"12\"\n", 0)
            .on(&format!("which '{binary}'"), &format!("/usr/bin/{binary}\n"), 0)
            .on("is-active", "active\n", 0)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.calls().iter().filter(|c| c.contains(needle)).count()
    }
}

impl Executor for FakeHost {
    async fn execute(&self, command: &str, _timeout: Duration) -> CommandResult {
        self.calls.lock().expect("lock").push(command.to_string());
        let rule = self.rules.iter().find(|r| command.contains(&r.needle));
        let Some(rule) = rule else {
            return CommandResult::new("", 1, Duration::ZERO);
        };
        if !rule.delay.is_zero() {
            tokio::time::sleep(rule.delay).await;
        }
        CommandResult::new(rule.output.clone(), rule.exit_code, rule.delay)
    }

    fn target(&self) -> String {
        "fake-host".to_string()
    }
}

pub fn session(host: FakeHost) -> Session<FakeHost> {
    Session::new(host, TimeoutConfig::default())
}

//! Infrastructure implementations of the `Executor` port.
//!
//! Both executors spawn one local process per command through a
//! [`CommandRunner`]: `ssh` for remote hosts, `sh -c` for the local machine.
//! Every call is an independent exec channel, so overlapping commands never
//! share a shell.

use std::process::Output;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::application::ports::{CommandRunner, Executor};
use crate::domain::command::EXIT_CONNECTION_LOST;
use crate::domain::{CommandResult, HostEntry};
use crate::infra::command_runner::{CommandTimedOut, TokioCommandRunner};

/// Seconds `ssh` waits for the TCP connection and handshake.
const SSH_CONNECT_TIMEOUT_SECS: u32 = 10;

/// Fold a runner outcome into a `CommandResult`: stdout then stderr, the
/// process exit code, 124 for a deadline and 255 for anything that kept the
/// command from running.
fn to_result(outcome: Result<Output>, elapsed: Duration) -> CommandResult {
    match outcome {
        Ok(output) => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            // Killed by a signal: no exit code.
            let code = output.status.code().unwrap_or(EXIT_CONNECTION_LOST);
            CommandResult::new(text, code, elapsed)
        }
        Err(err) if err.downcast_ref::<CommandTimedOut>().is_some() => {
            CommandResult::timed_out(String::new(), elapsed)
        }
        Err(err) => CommandResult::connection_lost(format!("{err:#}"), elapsed),
    }
}

// ── SSH ───────────────────────────────────────────────────────────────────────

/// Runs commands on a remote host with the system `ssh` client.
///
/// `BatchMode` makes a missing key or an unknown host key fail fast with
/// exit 255 instead of prompting.
pub struct SshExecutor<R: CommandRunner = TokioCommandRunner> {
    runner: R,
    entry: HostEntry,
}

impl SshExecutor {
    #[must_use]
    pub fn new(entry: HostEntry) -> Self {
        Self::with_runner(entry, TokioCommandRunner::default())
    }
}

impl<R: CommandRunner> SshExecutor<R> {
    pub fn with_runner(entry: HostEntry, runner: R) -> Self {
        Self { runner, entry }
    }

    fn destination(&self) -> String {
        match &self.entry.user {
            Some(user) => format!("{user}@{}", self.entry.host),
            None => self.entry.host.clone(),
        }
    }

    /// Arguments passed to `ssh`, ending with the remote command line.
    #[must_use]
    pub fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={SSH_CONNECT_TIMEOUT_SECS}"),
        ];
        if let Some(port) = self.entry.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(identity) = &self.entry.identity_file {
            args.push("-i".to_string());
            args.push(identity.clone());
        }
        args.push(self.destination());
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }
}

impl<R: CommandRunner> Executor for SshExecutor<R> {
    async fn execute(&self, command: &str, timeout: Duration) -> CommandResult {
        let args = self.ssh_args(command);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let started = Instant::now();
        let outcome = self.runner.run_with_timeout("ssh", &args, timeout).await;
        to_result(outcome, started.elapsed())
    }

    fn target(&self) -> String {
        match self.entry.port {
            Some(port) => format!("{}:{port}", self.destination()),
            None => self.destination(),
        }
    }
}

// ── Local ─────────────────────────────────────────────────────────────────────

/// Runs commands on this machine with `sh -c`.
pub struct LocalExecutor<R: CommandRunner = TokioCommandRunner> {
    runner: R,
}

impl LocalExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(TokioCommandRunner::default())
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> LocalExecutor<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> Executor for LocalExecutor<R> {
    async fn execute(&self, command: &str, timeout: Duration) -> CommandResult {
        let started = Instant::now();
        let outcome = self
            .runner
            .run_with_timeout("sh", &["-c", command], timeout)
            .await;
        to_result(outcome, started.elapsed())
    }

    fn target(&self) -> String {
        "localhost".to_string()
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// Executor chosen from `--host` / `--local` at startup.
pub enum HostExecutor {
    Ssh(SshExecutor),
    Local(LocalExecutor),
}

impl Executor for HostExecutor {
    async fn execute(&self, command: &str, timeout: Duration) -> CommandResult {
        match self {
            HostExecutor::Ssh(ssh) => ssh.execute(command, timeout).await,
            HostExecutor::Local(local) => local.execute(command, timeout).await,
        }
    }

    fn target(&self) -> String {
        match self {
            HostExecutor::Ssh(ssh) => ssh.target(),
            HostExecutor::Local(local) => local.target(),
        }
    }
}

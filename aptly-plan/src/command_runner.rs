//! Abstraction over external command execution for testability.
//!
//! Every process the apply phase starts (guards, commands, package checks)
//! goes through [`CommandRunner`]. [`RealCommandRunner`] delegates to
//! [`std::process::Command`]; [`MockCommandRunner`] records calls and returns
//! canned exit codes so apply logic can be tested without a shell.

use anyhow::{Context, Result};
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Output};
use std::sync::Mutex;

pub trait CommandRunner: Send + Sync {
    /// Run a command and capture stdout, stderr and exit status.
    fn run_output(&self, program: &str, args: &[&str], options: &CommandOptions) -> Result<Output>;
}

/// Options for command execution.
#[derive(Debug, Default, Clone)]
pub struct CommandOptions {
    /// Additional environment variables.
    pub env: Vec<(String, String)>,
}

impl CommandOptions {
    /// Create options with environment variables.
    pub fn with_env(env: Vec<(String, String)>) -> Self {
        Self { env }
    }
}

/// Production implementation that delegates to [`std::process::Command`].
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run_output(&self, program: &str, args: &[&str], options: &CommandOptions) -> Result<Output> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (k, v) in &options.env {
            cmd.env(k, v);
        }
        cmd.output()
            .with_context(|| format!("Failed to run '{program}'"))
    }
}

/// A recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl RecordedCall {
    /// The call as a single shell-quoted line.
    pub fn line(&self) -> String {
        let mut words = vec![self.program.as_str()];
        words.extend(self.args.iter().map(String::as_str));
        shlex::try_join(words).unwrap_or_else(|_| format!("{} {}", self.program, self.args.join(" ")))
    }
}

/// Test double returning canned responses.
///
/// Each response is matched by substring against the joined argument list;
/// the first match wins and unmatched calls succeed with empty output.
#[derive(Default)]
pub struct MockCommandRunner {
    responses: Vec<(String, i32, String)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to calls containing `pattern` with `code` and `stdout`.
    pub fn respond(mut self, pattern: impl Into<String>, code: i32, stdout: impl Into<String>) -> Self {
        self.responses.push((pattern.into(), code, stdout.into()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run_output(&self, program: &str, args: &[&str], options: &CommandOptions) -> Result<Output> {
        let call = RecordedCall {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: options.env.clone(),
        };
        let joined = format!("{} {}", program, args.join(" "));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }

        let (code, stdout) = self
            .responses
            .iter()
            .find(|(pattern, _, _)| joined.contains(pattern.as_str()))
            .map(|(_, code, stdout)| (*code, stdout.clone()))
            .unwrap_or((0, String::new()));

        Ok(Output {
            status: ExitStatus::from_raw(code << 8),
            stdout: stdout.into_bytes(),
            stderr: if code == 0 {
                Vec::new()
            } else {
                format!("exit {}", code).into_bytes()
            },
        })
    }
}

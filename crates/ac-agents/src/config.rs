// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Client configuration shared by every backend

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Per-client configuration, fixed once the client is constructed.
///
/// Every default is a named field here rather than ambient global state.
/// `force` defaults to `true`, which lets the wrapped CLI edit files and run
/// shell commands without asking; callers in untrusted environments should
/// turn it off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Executable name (looked up on PATH) or path
    pub executable: String,

    /// Directory every invocation runs in
    pub workspace: PathBuf,

    /// Default for automatically approving MCP servers / tools
    #[serde(default = "default_true")]
    pub approve_mcps: bool,

    /// Default for the unconditional-approval argument
    #[serde(default = "default_true")]
    pub force: bool,

    /// Default for relaying child output to the console while capturing it
    #[serde(default = "default_true")]
    pub print_output: bool,

    /// Kill the child and fail with `TimedOut` after this long
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

fn default_true() -> bool {
    true
}

impl ClientConfig {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            approve_mcps: true,
            force: true,
            print_output: true,
            timeout: None,
        }
    }

    pub fn workspace(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace = dir.into();
        self
    }

    pub fn approve_mcps(mut self, approve: bool) -> Self {
        self.approve_mcps = approve;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn print_output(mut self, print: bool) -> Self {
        self.print_output = print;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Full path of the executable when it can be found on PATH, the configured
    /// value otherwise.
    pub fn resolved_executable(&self) -> String {
        which::which(&self.executable)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| self.executable.clone())
    }

    pub fn executable_available(&self) -> bool {
        which::which(&self.executable).is_ok()
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Invocation building shared by all backends
//!
//! A request is first resolved against the client configuration (mode parsed,
//! defaults applied, read-only rules enforced). Backends then translate the
//! resolved options into their own flag spellings on top of an [`Invocation`].

use crate::config::ClientConfig;
use crate::mode::AgentMode;
use crate::traits::{AgentResult, InvocationRequest};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tracing::debug;

/// A request with every default applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub mode: AgentMode,
    /// Prompt with the mode marker prepended
    pub prompt: String,
    pub model: Option<String>,
    /// Unconditional approval; always false for read-only modes
    pub force: bool,
    pub approve_mcps: bool,
    pub chat_id: Option<String>,
    pub print_output: bool,
}

impl ResolvedRequest {
    pub fn resolve(request: &InvocationRequest, config: &ClientConfig) -> AgentResult<Self> {
        let mode: AgentMode = request.mode.parse()?;

        let force = if mode.is_read_only() {
            if request.force == Some(true) {
                debug!("Ignoring force for read-only {} mode", mode);
            }
            false
        } else {
            request.force.unwrap_or(config.force)
        };

        Ok(Self {
            mode,
            prompt: mode.wrap_prompt(&request.prompt),
            model: request.model.clone().filter(|m| !m.is_empty()),
            force,
            approve_mcps: request.approve_mcps.unwrap_or(config.approve_mcps),
            chat_id: request.chat_id.clone().filter(|id| !id.is_empty()),
            print_output: request.print_output.unwrap_or(config.print_output),
        })
    }

    /// For CLIs with a single combined bypass switch: force or MCP approval
    /// turns it on, except in read-only modes.
    pub fn combined_bypass(&self) -> bool {
        !self.mode.is_read_only() && (self.force || self.approve_mcps)
    }
}

/// Fully built process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Relay output to the console while capturing it
    pub print_output: bool,
    pub timeout: Option<Duration>,
    /// Marker prepended to the prompt, used to strip an echoed prompt
    pub prompt_prefix: Option<String>,
    /// Final prompt as passed on the command line
    pub prompt: Option<String>,
}

impl Invocation {
    /// Bare invocation: no arguments, output captured silently
    pub fn new(program: impl Into<String>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.as_ref().to_path_buf(),
            print_output: false,
            timeout: None,
            prompt_prefix: None,
            prompt: None,
        }
    }

    /// Invocation for a resolved request, before any backend arguments
    pub fn for_request(config: &ClientConfig, resolved: &ResolvedRequest) -> Self {
        let mut invocation = Self::new(config.resolved_executable(), &config.workspace);
        invocation.print_output = resolved.print_output;
        invocation.timeout = config.timeout;
        invocation.prompt_prefix = resolved.mode.prompt_prefix().map(str::to_string);
        invocation.prompt = Some(resolved.prompt.clone());
        invocation
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    pub fn push_pair(&mut self, flag: &str, value: impl Into<String>) {
        self.args.push(flag.to_string());
        self.args.push(value.into());
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether `flag` appears as a standalone argument
    pub fn has_arg(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Value following `flag`, if present
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd.current_dir(&self.working_dir);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }

    /// Trim captured output and drop a leading echo of the wrapped prompt.
    ///
    /// Best effort: only an echo at the very start of the output is removed.
    pub fn strip_prompt_echo(&self, output: &str) -> String {
        let trimmed = output.trim();
        if let Some(prompt) = &self.prompt {
            if self.prompt_prefix.is_some() {
                if let Some(rest) = trimmed.strip_prefix(prompt.as_str()) {
                    return rest.trim().to_string();
                }
            }
        }
        if let Some(prefix) = &self.prompt_prefix {
            if let Some(rest) = trimmed.strip_prefix(prefix.as_str()) {
                return rest.trim().to_string();
            }
        }
        trimmed.to_string()
    }
}

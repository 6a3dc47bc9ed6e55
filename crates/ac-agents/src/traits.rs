// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

/// Core traits and types shared by every agent backend
use crate::builder::Invocation;
use crate::config::ClientConfig;
use crate::mode::AgentMode;
use crate::runner::ProcessRunner;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// A single request to an agent CLI
///
/// `None` options fall back to the client's [`ClientConfig`] defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Task or question for the agent
    pub prompt: String,

    /// Mode tag as supplied by the caller; validated when the invocation is built
    pub mode: String,

    /// Model to select instead of the CLI default
    pub model: Option<String>,

    /// Override for the unconditional-approval argument
    pub force: Option<bool>,

    /// Override for MCP auto-approval
    pub approve_mcps: Option<bool>,

    /// Chat/session to resume
    pub chat_id: Option<String>,

    /// Override for console streaming
    pub print_output: Option<bool>,
}

impl InvocationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            mode: AgentMode::Agent.into(),
            model: None,
            force: None,
            approve_mcps: None,
            chat_id: None,
            print_output: None,
        }
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn maybe_model(mut self, model: Option<&str>) -> Self {
        self.model = model.map(str::to_string);
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = Some(force);
        self
    }

    pub fn approve_mcps(mut self, approve: bool) -> Self {
        self.approve_mcps = Some(approve);
        self
    }

    pub fn chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    pub fn print_output(mut self, print: bool) -> Self {
        self.print_output = Some(print);
        self
    }
}

/// Agent version information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentVersion {
    /// Version string (e.g., "2025.09.18-39624ef" or "0.46.0")
    pub version: String,
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors that can occur during agent operations
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Agent executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Workspace directory does not exist: {0}")]
    WorkspaceNotFound(PathBuf),

    #[error("Invalid mode: {0} (expected one of: agent, ask, planner, debug)")]
    InvalidMode(String),

    #[error("Agent process failed ({}): {stderr}", describe_exit(.exit_code))]
    ProcessExecution {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Agent process timed out after {timeout:?}")]
    TimedOut { timeout: Duration },

    #[error("Failed to spawn agent process: {0}")]
    ProcessSpawnFailed(#[from] std::io::Error),

    #[error("Chat creation failed: {0}")]
    SessionCreationFailed(String),

    #[error("Output parsing failed: {0}")]
    OutputParsingFailed(String),

    #[error("Version detection failed: {0}")]
    VersionDetectionFailed(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Core trait implemented once per wrapped CLI
///
/// Backends only describe how a request maps onto their argument conventions
/// and how a chat is created; running the process and the mode shortcuts are
/// shared.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Short backend name (e.g., "claude", "cursor-cli")
    fn name(&self) -> &'static str;

    fn config(&self) -> &ClientConfig;

    fn runner(&self) -> &dyn ProcessRunner;

    /// Build the full invocation for a request without running anything
    fn build_invocation(&self, request: &InvocationRequest) -> AgentResult<Invocation>;

    /// Turn captured stdout into the answer returned to the caller
    fn extract_response(&self, invocation: &Invocation, stdout: &str) -> AgentResult<String> {
        Ok(invocation.strip_prompt_echo(stdout))
    }

    /// Rewrite a failed run's error before it reaches the caller
    fn map_failure(&self, error: AgentError) -> AgentError {
        error
    }

    /// Whether the streamed console output is already the answer
    ///
    /// Backends that emit a machine format return `false` so front ends print
    /// the extracted answer after streaming.
    fn streams_answer(&self) -> bool {
        true
    }

    /// Create a new chat and return its opaque id
    async fn create_chat(&self) -> AgentResult<String>;

    /// General entry point; every shortcut reduces to this
    async fn agent(&self, request: InvocationRequest) -> AgentResult<String> {
        let invocation = self.build_invocation(&request)?;
        info!(
            agent = self.name(),
            mode = %request.mode,
            "Running agent with prompt: {:?}",
            request.prompt.chars().take(50).collect::<String>()
        );

        let output = self.runner().run(&invocation).await.map_err(|e| self.map_failure(e))?;
        debug!(agent = self.name(), bytes = output.stdout.len(), "Agent finished");
        self.extract_response(&invocation, &output.stdout)
    }

    /// Answer a question without modifying files; force is always off
    async fn ask(&self, prompt: &str, model: Option<&str>) -> AgentResult<String> {
        let request = InvocationRequest::new(prompt)
            .mode(AgentMode::Ask)
            .maybe_model(model)
            .force(false);
        self.agent(request).await
    }

    /// Produce a plan without executing it
    async fn plan(&self, prompt: &str, model: Option<&str>) -> AgentResult<String> {
        let request = InvocationRequest::new(prompt).mode(AgentMode::Planner).maybe_model(model);
        self.agent(request).await
    }

    /// Focus on finding and fixing bugs
    async fn debug(&self, prompt: &str, model: Option<&str>) -> AgentResult<String> {
        let request = InvocationRequest::new(prompt).mode(AgentMode::Debug).maybe_model(model);
        self.agent(request).await
    }

    /// Agent mode with every other option at its default
    async fn run(&self, prompt: &str, model: Option<&str>) -> AgentResult<String> {
        self.agent(InvocationRequest::new(prompt).maybe_model(model)).await
    }

    /// Whether the executable can be found on PATH
    fn is_available(&self) -> bool {
        self.config().executable_available()
    }

    /// Detect the installed version of the wrapped CLI
    async fn detect_version(&self) -> AgentResult<AgentVersion> {
        debug!(agent = self.name(), "Detecting CLI version");
        let config = self.config();
        let invocation =
            Invocation::new(config.resolved_executable(), &config.workspace).arg("--version");
        let output = self.runner().run(&invocation).await.map_err(|e| match e {
            AgentError::ProcessExecution { stderr, .. } => AgentError::VersionDetectionFailed(stderr),
            other => other,
        })?;

        // Try stdout first, then stderr
        let version_output = if !output.stdout.trim().is_empty() {
            output.stdout
        } else {
            output.stderr
        };

        parse_version(&version_output)
    }
}

/// Parse a version from `<cli> --version` output
///
/// Accepts Cursor's dated builds ("2025.09.18-39624ef") as well as plain
/// semantic versions ("codex 0.46.0").
pub fn parse_version(output: &str) -> AgentResult<AgentVersion> {
    let version_regex = Regex::new(r"(\d{4}\.\d{2}\.\d{2}-[a-f0-9]+|\d+\.\d+\.\d+)").map_err(|e| {
        AgentError::VersionDetectionFailed(format!("Regex compilation failed: {}", e))
    })?;

    if let Some(caps) = version_regex.captures(output) {
        Ok(AgentVersion {
            version: caps[1].to_string(),
        })
    } else {
        Err(AgentError::VersionDetectionFailed(format!(
            "Could not parse version from output: {}",
            output
        )))
    }
}

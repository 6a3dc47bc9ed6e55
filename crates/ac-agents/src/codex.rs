// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

/// Codex CLI client
use crate::builder::{Invocation, ResolvedRequest};
use crate::common::{jsonl_events, SESSION_BOOTSTRAP_PROMPT};
use crate::config::ClientConfig;
use crate::runner::{ProcessRunner, TokioProcessRunner};
use crate::traits::*;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const BYPASS_FLAG: &str = "--dangerously-bypass-approvals-and-sandbox";

/// Client for the `codex` CLI, driven through `codex exec --json`
///
/// Codex has a single approval switch, so either force or MCP approval turns
/// on `--dangerously-bypass-approvals-and-sandbox` (never in ask mode).
/// Resuming a chat uses the `resume <id>` sub-command.
pub struct CodexClient {
    config: ClientConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl CodexClient {
    pub const DEFAULT_EXECUTABLE: &'static str = "codex";

    pub fn new() -> Self {
        Self::with_config(ClientConfig::new(Self::DEFAULT_EXECUTABLE))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        if config.approve_mcps && !config.force {
            warn!("Codex has no separate MCP approval; approve_mcps enables {}", BYPASS_FLAG);
        }
        Self {
            config,
            runner: Arc::new(TokioProcessRunner),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Collect the text of completed `agent_message` items from `exec --json`
    /// output. Returns `None` when the output holds no JSON events at all.
    fn agent_messages(stdout: &str) -> Option<String> {
        let events = jsonl_events(stdout);
        if events.is_empty() {
            return None;
        }

        let messages: Vec<&str> = events
            .iter()
            .filter(|event| event.get("type").and_then(Value::as_str) == Some("item.completed"))
            .filter_map(|event| event.get("item"))
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("agent_message"))
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .filter(|text| !text.is_empty())
            .collect();

        Some(messages.join("\n").trim().to_string())
    }

    fn thread_id(stdout: &str) -> Option<String> {
        jsonl_events(stdout)
            .iter()
            .filter(|event| event.get("type").and_then(Value::as_str) == Some("thread.started"))
            .find_map(|event| event.get("thread_id").and_then(Value::as_str))
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

impl Default for CodexClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentClient for CodexClient {
    fn name(&self) -> &'static str {
        "codex"
    }

    fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }

    fn build_invocation(&self, request: &InvocationRequest) -> AgentResult<Invocation> {
        let resolved = ResolvedRequest::resolve(request, &self.config)?;
        let mut invocation = Invocation::for_request(&self.config, &resolved);

        // Flags go before the resume sub-command and the prompt
        invocation.push("exec");
        invocation.push("--json");

        if resolved.combined_bypass() {
            invocation.push(BYPASS_FLAG);
        }

        if let Some(model) = &resolved.model {
            invocation.push_pair("--model", model.clone());
        }

        invocation.push_pair("-C", self.config.workspace.to_string_lossy());

        if let Some(chat_id) = &resolved.chat_id {
            invocation.push_pair("resume", chat_id.clone());
        }
        invocation.push(resolved.prompt);

        debug!("Codex CLI invocation prepared with {} args", invocation.args.len());
        Ok(invocation)
    }

    fn extract_response(&self, invocation: &Invocation, stdout: &str) -> AgentResult<String> {
        match Self::agent_messages(stdout) {
            Some(text) => Ok(text),
            None => Ok(invocation.strip_prompt_echo(stdout)),
        }
    }

    // Console receives the raw JSONL event stream
    fn streams_answer(&self) -> bool {
        false
    }

    async fn create_chat(&self) -> AgentResult<String> {
        info!("Creating Codex thread");

        let mut invocation =
            Invocation::new(self.config.resolved_executable(), &self.config.workspace)
                .arg("exec")
                .arg("--json")
                .timeout(self.config.timeout);
        if self.config.force || self.config.approve_mcps {
            invocation.push(BYPASS_FLAG);
        }
        invocation.push(SESSION_BOOTSTRAP_PROMPT);
        invocation.push_pair("-C", self.config.workspace.to_string_lossy());

        let output = self.runner.run(&invocation).await?;
        Self::thread_id(&output.stdout).ok_or_else(|| {
            AgentError::SessionCreationFailed("Could not find thread_id in Codex output".to_string())
        })
    }
}

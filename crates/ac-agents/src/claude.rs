// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

/// Claude Code CLI client
use crate::builder::{Invocation, ResolvedRequest};
use crate::common::{session_id_from_json, SESSION_BOOTSTRAP_PROMPT};
use crate::config::ClientConfig;
use crate::runner::{ProcessRunner, TokioProcessRunner};
use crate::traits::*;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for the `claude` CLI
///
/// Argument mapping from the uniform options:
/// - force → `--dangerously-skip-permissions`
/// - MCP approval → `--tools default` (or `--tools ""` to disable tools)
/// - model → `--model <alias>`
/// - chat id → `--resume <id>`
/// - workspace → working directory of the child
pub struct ClaudeClient {
    config: ClientConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl ClaudeClient {
    pub const DEFAULT_EXECUTABLE: &'static str = "claude";

    pub fn new() -> Self {
        Self::with_config(ClientConfig::new(Self::DEFAULT_EXECUTABLE))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            runner: Arc::new(TokioProcessRunner),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Translate Cursor-style model names into Claude CLI aliases
    pub fn convert_model(model: &str) -> String {
        match model.to_lowercase().as_str() {
            "sonnet" | "claude-sonnet" | "claude-3-sonnet" => "sonnet".to_string(),
            "opus" | "claude-opus" | "claude-3-opus" => "opus".to_string(),
            _ => model.to_string(),
        }
    }
}

impl Default for ClaudeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentClient for ClaudeClient {
    fn name(&self) -> &'static str {
        "claude"
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

        invocation.push("--print");

        if resolved.force {
            invocation.push("--dangerously-skip-permissions");
        }

        // --tools only takes effect together with --print
        let tools = if resolved.approve_mcps { "default" } else { "" };
        invocation.push_pair("--tools", tools);

        if let Some(model) = &resolved.model {
            invocation.push_pair("--model", Self::convert_model(model));
        }

        if let Some(chat_id) = &resolved.chat_id {
            invocation.push_pair("--resume", chat_id.clone());
        }

        // Keep prompts that start with a dash from being read as options
        invocation.push("--");
        invocation.push(resolved.prompt);

        debug!("Claude CLI invocation prepared with {} args", invocation.args.len());
        Ok(invocation)
    }

    async fn create_chat(&self) -> AgentResult<String> {
        info!("Creating Claude session");

        let mut invocation =
            Invocation::new(self.config.resolved_executable(), &self.config.workspace)
                .arg("--print")
                .timeout(self.config.timeout);
        invocation.push_pair("--output-format", "json");
        if self.config.force {
            invocation.push("--dangerously-skip-permissions");
        }
        invocation.push("--");
        invocation.push(SESSION_BOOTSTRAP_PROMPT);

        let output = self.runner.run(&invocation).await?;
        session_id_from_json(&output.stdout, "Claude")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::AgentMode;
    use crate::test_support::RecordingRunner;

    fn client(config: ClientConfig) -> (ClaudeClient, Arc<RecordingRunner>) {
        let runner = Arc::new(RecordingRunner::new());
        (ClaudeClient::with_config(config).with_runner(runner.clone()), runner)
    }

    fn config() -> ClientConfig {
        ClientConfig::new("claude").workspace("/tmp/ws")
    }

    #[test]
    fn test_agent_name() {
        assert_eq!(ClaudeClient::new().name(), "claude");
    }

    #[test]
    fn test_convert_model() {
        assert_eq!(ClaudeClient::convert_model("claude-3-opus"), "opus");
        assert_eq!(ClaudeClient::convert_model("Claude-Sonnet"), "sonnet");
        assert_eq!(ClaudeClient::convert_model("claude-opus-4-1"), "claude-opus-4-1");
    }

    #[test]
    fn test_default_invocation() {
        let (client, _) = client(config());
        let invocation = client.build_invocation(&InvocationRequest::new("Explain main.rs")).unwrap();
        assert_eq!(
            invocation.args,
            vec![
                "--print",
                "--dangerously-skip-permissions",
                "--tools",
                "default",
                "--",
                "Explain main.rs"
            ]
        );
    }

    #[test]
    fn test_tools_disabled_and_model_alias() {
        let (client, _) = client(config().approve_mcps(false));
        let request = InvocationRequest::new("x").model("claude-sonnet").chat_id("sess-1");
        let invocation = client.build_invocation(&request).unwrap();

        assert_eq!(invocation.arg_value("--tools"), Some(""));
        assert_eq!(invocation.arg_value("--model"), Some("sonnet"));
        assert_eq!(invocation.arg_value("--resume"), Some("sess-1"));
    }

    #[test]
    fn test_ask_never_skips_permissions() {
        let (client, _) = client(config());
        let request = InvocationRequest::new("Why?").mode(AgentMode::Ask).force(true);
        let invocation = client.build_invocation(&request).unwrap();
        assert!(!invocation.has_arg("--dangerously-skip-permissions"));
    }

    #[tokio::test]
    async fn test_create_chat_reads_session_id() {
        let (client, runner) = client(config());
        runner.push_stdout(r#"{"type":"result","result":"OK","session_id":"9d2a-41"}"#);

        assert_eq!(client.create_chat().await.unwrap(), "9d2a-41");

        let invocation = runner.last_invocation().unwrap();
        assert_eq!(invocation.arg_value("--output-format"), Some("json"));
        assert_eq!(invocation.args.last().map(String::as_str), Some("Say OK"));
    }
}

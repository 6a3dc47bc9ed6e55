// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

/// Gemini CLI client
use crate::builder::{Invocation, ResolvedRequest};
use crate::common::{session_id_from_json, SESSION_BOOTSTRAP_PROMPT};
use crate::config::ClientConfig;
use crate::runner::{ProcessRunner, TokioProcessRunner};
use crate::traits::*;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Marker printed by the Gemini CLI when started on a Node.js older than 20
const OLD_NODE_SIGNATURE: &str = "SyntaxError: Invalid regular expression flags";

/// Client for the `gemini` CLI
///
/// Gemini only has YOLO mode, so force or MCP approval both map to `--yolo`
/// (never in ask mode). The prompt is passed positionally for one-shot runs.
pub struct GeminiClient {
    config: ClientConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl GeminiClient {
    pub const DEFAULT_EXECUTABLE: &'static str = "gemini";

    pub fn new() -> Self {
        Self::with_config(ClientConfig::new(Self::DEFAULT_EXECUTABLE))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        if config.approve_mcps && !config.force {
            warn!("Gemini has no separate MCP approval; approve_mcps enables --yolo");
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

    /// Translate Cursor-style model names into Gemini CLI aliases
    pub fn convert_model(model: &str) -> String {
        match model.to_lowercase().as_str() {
            "gemini-3-flash" | "gemini-3.0-flash" | "gemini-2.0-flash" | "gemini-1.5-flash" => {
                "flash".to_string()
            }
            "gemini-3-pro" | "gemini-3.0-pro" | "gemini-2.0-pro" | "gemini-1.5-pro" => {
                "pro".to_string()
            }
            _ => model.to_string(),
        }
    }

    /// Replace the cryptic startup crash on old Node.js with an actionable message
    fn explain_failure(error: AgentError) -> AgentError {
        match error {
            AgentError::ProcessExecution { exit_code, stderr }
                if stderr.contains(OLD_NODE_SIGNATURE) && stderr.contains("Node.js") =>
            {
                let current = stderr.rsplit("Node.js ").next().unwrap_or_default().trim();
                AgentError::ProcessExecution {
                    exit_code,
                    stderr: format!(
                        "Gemini CLI requires Node.js 20 or higher. Current version: {}\n{}",
                        current, stderr
                    ),
                }
            }
            other => other,
        }
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentClient for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }

    fn map_failure(&self, error: AgentError) -> AgentError {
        Self::explain_failure(error)
    }

    fn build_invocation(&self, request: &InvocationRequest) -> AgentResult<Invocation> {
        let resolved = ResolvedRequest::resolve(request, &self.config)?;
        let mut invocation = Invocation::for_request(&self.config, &resolved);

        if resolved.combined_bypass() {
            invocation.push("--yolo");
        }

        if let Some(model) = &resolved.model {
            invocation.push_pair("--model", Self::convert_model(model));
        }

        if let Some(chat_id) = &resolved.chat_id {
            invocation.push_pair("--resume", chat_id.clone());
        }

        invocation.push(resolved.prompt);

        debug!("Gemini CLI invocation prepared with {} args", invocation.args.len());
        Ok(invocation)
    }

    async fn create_chat(&self) -> AgentResult<String> {
        info!("Creating Gemini session");

        let mut invocation =
            Invocation::new(self.config.resolved_executable(), &self.config.workspace)
                .timeout(self.config.timeout);
        invocation.push_pair("--output-format", "json");
        if self.config.force || self.config.approve_mcps {
            invocation.push("--yolo");
        }
        invocation.push(SESSION_BOOTSTRAP_PROMPT);

        let output = self.runner.run(&invocation).await.map_err(|e| self.map_failure(e))?;
        session_id_from_json(&output.stdout, "Gemini")
    }
}

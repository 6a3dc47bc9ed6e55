// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

/// Cursor Agent CLI client
use crate::builder::{Invocation, ResolvedRequest};
use crate::common::last_token;
use crate::config::ClientConfig;
use crate::runner::{ProcessRunner, TokioProcessRunner};
use crate::traits::*;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Client for the `cursor-agent` CLI
///
/// Argument mapping: force → `--force`, MCP approval → `--approve-mcps`,
/// chat id → `--resume <id>`, workspace → `--workspace <dir>` (and the child's
/// working directory). The prompt follows the `agent` subcommand.
pub struct CursorClient {
    config: ClientConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl CursorClient {
    pub const DEFAULT_EXECUTABLE: &'static str = "cursor-agent";

    pub fn new() -> Self {
        Self::with_config(ClientConfig::new(Self::DEFAULT_EXECUTABLE))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            runner: Arc::new(TokioProcessRunner),
        }
    }

    /// Replace the process runner (e.g., with a recording test double)
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }
}

impl Default for CursorClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentClient for CursorClient {
    fn name(&self) -> &'static str {
        "cursor-cli"
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

        // Non-interactive mode is required to capture the answer
        invocation.push("--print");

        if resolved.force {
            invocation.push("--force");
        }

        if resolved.approve_mcps {
            invocation.push("--approve-mcps");
        }

        if let Some(model) = &resolved.model {
            invocation.push_pair("--model", model.clone());
        }

        if let Some(chat_id) = &resolved.chat_id {
            invocation.push_pair("--resume", chat_id.clone());
        }

        invocation.push_pair("--workspace", self.config.workspace.to_string_lossy());

        invocation.push("agent");
        invocation.push(resolved.prompt);

        debug!("Cursor CLI invocation prepared with {} args", invocation.args.len());
        Ok(invocation)
    }

    async fn create_chat(&self) -> AgentResult<String> {
        info!("Creating Cursor chat");

        let invocation =
            Invocation::new(self.config.resolved_executable(), &self.config.workspace)
                .arg("create-chat")
                .timeout(self.config.timeout);

        let output = self.runner.run(&invocation).await?;

        // Output is either the bare id or "Created chat: <id>"
        last_token(&output.stdout).ok_or_else(|| {
            AgentError::SessionCreationFailed("cursor-agent create-chat printed no id".to_string())
        })
    }
}

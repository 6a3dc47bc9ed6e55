// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use ac_agents::{AgentClient, AgentMode, ClientConfig, InvocationRequest};
use ac_logging::CliLoggingArgs;
use anyhow::{anyhow, Context};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

pub mod status;

pub use clap::Parser;

#[derive(clap::Parser, Debug)]
#[command(
    name = "ac",
    about = "Agent Conduit CLI - drive AI coding agent CLIs through one interface",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientArgs,
    #[command(flatten)]
    pub logging: CliLoggingArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that talks to a backend
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Agent backend: cursor, claude, codex or gemini
    #[arg(long, env = "AC_BACKEND", default_value = "cursor", global = true)]
    pub backend: String,

    /// Directory the agent runs in (default: current directory)
    #[arg(long, env = "AC_WORKSPACE", global = true)]
    pub workspace: Option<PathBuf>,

    /// Agent executable name or path (default: the backend's usual name)
    #[arg(long, env = "AC_EXECUTABLE", global = true)]
    pub executable: Option<String>,

    /// Do not pass the backend's unconditional-approval argument
    #[arg(long, global = true)]
    pub no_force: bool,

    /// Do not auto-approve MCP servers and tools
    #[arg(long, global = true)]
    pub no_approve_mcps: bool,

    /// Do not stream agent output; print only the final answer
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Kill the agent after this many seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,
}

impl ClientArgs {
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let executable = match &self.executable {
            Some(executable) => executable.clone(),
            None => ac_agents::default_executable(&self.backend)
                .ok_or_else(|| self.unknown_backend())?
                .to_string(),
        };

        let mut config = ClientConfig::new(executable)
            .force(!self.no_force)
            .approve_mcps(!self.no_approve_mcps)
            .print_output(!self.quiet);
        if let Some(workspace) = &self.workspace {
            config = config.workspace(workspace);
        }
        if let Some(secs) = self.timeout {
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn client(&self) -> anyhow::Result<Box<dyn AgentClient>> {
        let config = self.client_config()?;
        ac_agents::client_by_name(&self.backend, config).ok_or_else(|| self.unknown_backend())
    }

    fn unknown_backend(&self) -> anyhow::Error {
        anyhow!(
            "Unknown backend '{}'. Available: cursor, {}",
            self.backend,
            ac_agents::available_backends().join(", ")
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the agent with an explicit mode
    Agent(AgentArgs),
    /// Ask a question without modifying files
    Ask(PromptArgs),
    /// Produce a plan without executing it
    Plan(PromptArgs),
    /// Focus on finding and fixing bugs
    Debug(PromptArgs),
    /// Create a new chat and print its id
    CreateChat,
    /// Show whether the backend CLI is installed and its version
    Status(status::StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    /// Task or question for the agent
    pub prompt: String,

    /// Model to use instead of the CLI default
    #[arg(long)]
    pub model: Option<String>,

    /// Chat id to resume
    #[arg(long)]
    pub chat_id: Option<String>,
}

impl PromptArgs {
    pub fn request(&self, mode: impl Into<String>) -> InvocationRequest {
        let mut request = InvocationRequest::new(&self.prompt)
            .mode(mode)
            .maybe_model(self.model.as_deref());
        if let Some(chat_id) = &self.chat_id {
            request = request.chat_id(chat_id);
        }
        request
    }
}

#[derive(Args, Debug, Clone)]
pub struct AgentArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Operation mode: agent, ask, planner (or plan), debug
    #[arg(long, default_value = "agent")]
    pub mode: String,
}

impl Commands {
    /// Build the request for prompt-carrying commands
    pub fn request(&self) -> Option<InvocationRequest> {
        match self {
            Commands::Agent(args) => Some(args.prompt.request(args.mode.as_str())),
            Commands::Ask(args) => Some(args.request(AgentMode::Ask).force(false)),
            Commands::Plan(args) => Some(args.request(AgentMode::Planner)),
            Commands::Debug(args) => Some(args.request(AgentMode::Debug)),
            Commands::CreateChat | Commands::Status(_) => None,
        }
    }
}

/// Execute the parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = cli.client.client()?;

    match &cli.command {
        Commands::CreateChat => {
            let chat_id = client.create_chat().await.context("Failed to create chat")?;
            println!("{}", chat_id);
        }
        Commands::Status(args) => args.run(client.as_ref()).await?,
        command => {
            let request = command
                .request()
                .ok_or_else(|| anyhow!("Command does not carry a prompt"))?;
            tracing::debug!(backend = %cli.client.backend, mode = %request.mode, "Dispatching request");

            let answer = client.agent(request).await?;
            // Plain streamed output already carries the answer
            if cli.client.quiet || !client.streams_answer() {
                println!("{}", answer);
            }
        }
    }

    Ok(())
}

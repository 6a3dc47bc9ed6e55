// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Uniform client for command-line AI coding agents
//!
//! This crate wraps agent CLIs such as Cursor Agent, Claude Code, Codex CLI and
//! Gemini CLI behind one [`AgentClient`] trait. Each call builds an argument
//! vector for the selected backend, runs the CLI in the configured workspace,
//! optionally streams its output to the console, and returns the captured
//! answer as a string.
//!
//! # Features
//!
//! The crate uses feature gates to enable specific agent backends:
//!
//! - `cursor-cli` - Cursor Agent CLI
//! - `claude` - Claude Code CLI
//! - `codex` - OpenAI Codex CLI
//! - `gemini` - Google Gemini CLI
//! - `test-support` - exposes [`test_support::RecordingRunner`]
//!
//! # Example
//!
//! ```no_run
//! use ac_agents::{AgentClient, ClientConfig, InvocationRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     #[cfg(feature = "claude")]
//!     {
//!         let config = ClientConfig::new("claude").workspace("/tmp/project").force(false);
//!         let client = ac_agents::claude(config);
//!
//!         let answer = client.ask("What does main.rs do?", None).await?;
//!         println!("{}", answer);
//!
//!         let chat_id = client.create_chat().await?;
//!         let request = InvocationRequest::new("Add a unit test").chat_id(chat_id);
//!         client.agent(request).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
mod common;
pub mod config;
pub mod mode;
pub mod runner;
pub mod session;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

// Agent implementations (feature-gated)
#[cfg(feature = "claude")]
pub mod claude;

#[cfg(feature = "codex")]
pub mod codex;

#[cfg(feature = "cursor-cli")]
pub mod cursor;

#[cfg(feature = "gemini")]
pub mod gemini;

// Re-export core types
pub use builder::{Invocation, ResolvedRequest};
pub use config::ClientConfig;
pub use mode::AgentMode;
pub use runner::{ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use session::ChatSession;
pub use traits::{
    parse_version, AgentClient, AgentError, AgentResult, AgentVersion, InvocationRequest,
};

// Convenience constructors for each backend
#[cfg(feature = "cursor-cli")]
pub fn cursor(config: ClientConfig) -> cursor::CursorClient {
    cursor::CursorClient::with_config(config)
}

#[cfg(feature = "claude")]
pub fn claude(config: ClientConfig) -> claude::ClaudeClient {
    claude::ClaudeClient::with_config(config)
}

#[cfg(feature = "codex")]
pub fn codex(config: ClientConfig) -> codex::CodexClient {
    codex::CodexClient::with_config(config)
}

#[cfg(feature = "gemini")]
pub fn gemini(config: ClientConfig) -> gemini::GeminiClient {
    gemini::GeminiClient::with_config(config)
}

/// Default executable name for a backend, if the backend is known and enabled
pub fn default_executable(name: &str) -> Option<&'static str> {
    match name {
        #[cfg(feature = "cursor-cli")]
        "cursor" | "cursor-cli" => Some(cursor::CursorClient::DEFAULT_EXECUTABLE),

        #[cfg(feature = "claude")]
        "claude" => Some(claude::ClaudeClient::DEFAULT_EXECUTABLE),

        #[cfg(feature = "codex")]
        "codex" => Some(codex::CodexClient::DEFAULT_EXECUTABLE),

        #[cfg(feature = "gemini")]
        "gemini" => Some(gemini::GeminiClient::DEFAULT_EXECUTABLE),

        _ => None,
    }
}

/// Get a client by backend name
///
/// Returns a boxed trait object for the requested backend, configured with
/// `config`. The backend must be enabled via feature flags.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "codex")]
/// # {
/// use ac_agents::AgentClient;
///
/// let config = ac_agents::ClientConfig::new("codex");
/// let client = ac_agents::client_by_name("codex", config).unwrap();
/// assert_eq!(client.name(), "codex");
/// # }
/// ```
pub fn client_by_name(name: &str, config: ClientConfig) -> Option<Box<dyn AgentClient>> {
    match name {
        #[cfg(feature = "cursor-cli")]
        "cursor" | "cursor-cli" => Some(Box::new(cursor::CursorClient::with_config(config))),

        #[cfg(feature = "claude")]
        "claude" => Some(Box::new(claude::ClaudeClient::with_config(config))),

        #[cfg(feature = "codex")]
        "codex" => Some(Box::new(codex::CodexClient::with_config(config))),

        #[cfg(feature = "gemini")]
        "gemini" => Some(Box::new(gemini::GeminiClient::with_config(config))),

        _ => {
            let _ = config;
            None
        }
    }
}

/// List all available backends (based on enabled features)
pub fn available_backends() -> Vec<&'static str> {
    let mut backends = Vec::new();

    #[cfg(feature = "cursor-cli")]
    backends.push("cursor-cli");

    #[cfg(feature = "claude")]
    backends.push("claude");

    #[cfg(feature = "codex")]
    backends.push("codex");

    #[cfg(feature = "gemini")]
    backends.push("gemini");

    backends
}

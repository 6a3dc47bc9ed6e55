// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Output helpers shared by the JSON-speaking backends

use crate::traits::{AgentError, AgentResult};
use serde_json::Value;

/// Minimal prompt used to open a fresh session on CLIs without a dedicated
/// chat-creation command
pub(crate) const SESSION_BOOTSTRAP_PROMPT: &str = "Say OK";

/// Extract `session_id` from a single JSON document (Claude and Gemini
/// `--output-format json`)
pub(crate) fn session_id_from_json(stdout: &str, backend: &str) -> AgentResult<String> {
    let output: Value = serde_json::from_str(stdout.trim()).map_err(|e| {
        AgentError::OutputParsingFailed(format!("Failed to parse {} output: {}", backend, e))
    })?;

    output
        .get("session_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AgentError::SessionCreationFailed(format!("No session_id found in {} output", backend))
        })
}

/// Parse newline-delimited JSON, skipping lines that are not JSON objects
pub(crate) fn jsonl_events(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line.trim()).ok())
        .filter(Value::is_object)
        .collect()
}

/// Last whitespace-separated token, e.g. "Created chat: abc123" -> "abc123"
pub(crate) fn last_token(stdout: &str) -> Option<String> {
    stdout.split_whitespace().last().map(str::to_string)
}

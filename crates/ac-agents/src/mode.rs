// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Behavioral presets applied through prompt prefixes

use crate::traits::AgentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ASK_PREFIX: &str = "[MODE: ASK - Please answer the question without modifying any files]";
const DEBUG_PREFIX: &str = "[MODE: DEBUG - Focus on finding and fixing bugs in the code]";
const PLANNER_PREFIX: &str =
    "[MODE: PLANNER - Create a detailed plan for the following task but do not execute yet]";

/// Operation mode of a single invocation
///
/// Modes are not native features of the wrapped CLIs. They are expressed by
/// prefixing the prompt with an instruction marker and, for `Ask`, by
/// withholding every auto-approval argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Autonomous default behavior, prompt passed through unmodified
    #[default]
    Agent,
    /// Answer without modifying files
    Ask,
    /// Produce a step-by-step plan without executing it
    Planner,
    /// Focus on root-cause analysis and fixes
    Debug,
}

impl AgentMode {
    pub const ALL: [AgentMode; 4] =
        [AgentMode::Agent, AgentMode::Ask, AgentMode::Planner, AgentMode::Debug];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentMode::Agent => "agent",
            AgentMode::Ask => "ask",
            AgentMode::Planner => "planner",
            AgentMode::Debug => "debug",
        }
    }

    /// Instruction marker prepended to the prompt, if any
    pub fn prompt_prefix(&self) -> Option<&'static str> {
        match self {
            AgentMode::Agent => None,
            AgentMode::Ask => Some(ASK_PREFIX),
            AgentMode::Planner => Some(PLANNER_PREFIX),
            AgentMode::Debug => Some(DEBUG_PREFIX),
        }
    }

    /// Read-only modes never carry force or auto-approve arguments.
    pub fn is_read_only(&self) -> bool {
        matches!(self, AgentMode::Ask)
    }

    pub fn wrap_prompt(&self, prompt: &str) -> String {
        match self.prompt_prefix() {
            Some(prefix) => format!("{} {}", prefix, prompt),
            None => prompt.to_string(),
        }
    }
}

impl fmt::Display for AgentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentMode {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agent" => Ok(AgentMode::Agent),
            "ask" => Ok(AgentMode::Ask),
            "planner" | "plan" => Ok(AgentMode::Planner),
            "debug" => Ok(AgentMode::Debug),
            _ => Err(AgentError::InvalidMode(s.to_string())),
        }
    }
}

impl From<AgentMode> for String {
    fn from(mode: AgentMode) -> Self {
        mode.as_str().to_string()
    }
}

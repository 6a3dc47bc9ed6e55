// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Backend status command

use ac_agents::AgentClient;
use clap::Args;
use serde::Serialize;

/// Arguments for the status command
#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub backend: String,
    pub executable: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendStatus {
    pub async fn probe(client: &dyn AgentClient) -> Self {
        let available = client.is_available();
        let (version, error) = if available {
            match client.detect_version().await {
                Ok(version) => (Some(version.version), None),
                Err(e) => (None, Some(e.to_string())),
            }
        } else {
            (None, Some("executable not found on PATH".to_string()))
        };

        Self {
            backend: client.name().to_string(),
            executable: client.config().executable.clone(),
            available,
            version,
            error,
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("backend:    {}", self.backend),
            format!("executable: {}", self.executable),
            format!("available:  {}", if self.available { "yes" } else { "no" }),
        ];
        if let Some(version) = &self.version {
            lines.push(format!("version:    {}", version));
        }
        if let Some(error) = &self.error {
            lines.push(format!("error:      {}", error));
        }
        lines.join("\n")
    }
}

impl StatusArgs {
    pub async fn run(&self, client: &dyn AgentClient) -> anyhow::Result<()> {
        let status = BackendStatus::probe(client).await;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            println!("{}", status.render());
        }
        Ok(())
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Chat continuity on top of an [`AgentClient`]
//!
//! The wrapped CLIs own all conversation state; a session here is only a chat
//! id that gets threaded into every request. Nothing is persisted locally.

use crate::mode::AgentMode;
use crate::traits::{AgentClient, AgentResult, InvocationRequest};
use tracing::{debug, info};

/// A client bound to one chat id
pub struct ChatSession<'a, C: AgentClient + ?Sized> {
    client: &'a C,
    chat_id: String,
}

impl<'a, C: AgentClient + ?Sized> ChatSession<'a, C> {
    /// Create a new chat through the client and bind to it
    pub async fn start(client: &'a C) -> AgentResult<Self> {
        let chat_id = client.create_chat().await?;
        info!(agent = client.name(), chat_id = %chat_id, "Started chat session");
        Ok(Self { client, chat_id })
    }

    /// Continue an existing chat; the id is used exactly as given
    pub fn resume(client: &'a C, chat_id: impl Into<String>) -> Self {
        let chat_id = chat_id.into();
        debug!(agent = client.name(), chat_id = %chat_id, "Resuming chat session");
        Self { client, chat_id }
    }

    pub fn id(&self) -> &str {
        &self.chat_id
    }

    pub fn client(&self) -> &C {
        self.client
    }

    /// Send a request within this chat. Any chat id already on the request is
    /// replaced by the session's.
    pub async fn send(&self, request: InvocationRequest) -> AgentResult<String> {
        self.client.agent(request.chat_id(self.chat_id.clone())).await
    }

    pub async fn ask(&self, prompt: &str) -> AgentResult<String> {
        self.send(InvocationRequest::new(prompt).mode(AgentMode::Ask).force(false)).await
    }

    pub async fn run(&self, prompt: &str) -> AgentResult<String> {
        self.send(InvocationRequest::new(prompt)).await
    }
}

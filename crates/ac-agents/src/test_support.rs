// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Process runner test double

use crate::builder::Invocation;
use crate::runner::{ProcessOutput, ProcessRunner};
use crate::traits::{AgentError, AgentResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Records every invocation instead of spawning it.
///
/// Queued outcomes are returned in order; once the queue is empty each run
/// succeeds with empty output.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<Invocation>>,
    responses: Mutex<VecDeque<AgentResult<ProcessOutput>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stdout(self, stdout: impl Into<String>) -> Self {
        self.push_stdout(stdout);
        self
    }

    pub fn push_stdout(&self, stdout: impl Into<String>) {
        self.push(Ok(ProcessOutput {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }));
    }

    /// Queue a run that fails the way a non-zero exit does
    pub fn push_failure(&self, exit_code: i32, stderr: impl Into<String>) {
        self.push(Err(AgentError::ProcessExecution {
            exit_code: Some(exit_code),
            stderr: stderr.into(),
        }));
    }

    fn push(&self, outcome: AgentResult<ProcessOutput>) {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).push_back(outcome);
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last_invocation(&self) -> Option<Invocation> {
        self.invocations().pop()
    }

    pub fn spawn_count(&self) -> usize {
        self.invocations.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> AgentResult<ProcessOutput> {
        self.invocations.lock().unwrap_or_else(|e| e.into_inner()).push(invocation.clone());
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).pop_front().unwrap_or_else(|| {
            Ok(ProcessOutput {
                exit_code: Some(0),
                ..ProcessOutput::default()
            })
        })
    }
}

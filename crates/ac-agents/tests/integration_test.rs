// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Process-level tests against stub agent executables

#![cfg(unix)]

use ac_agents::{AgentClient, AgentError, ChatSession, ClientConfig, InvocationRequest};
use ac_test_utils::StubExecutable;
use std::time::Duration;
use tempfile::TempDir;

const ASK_MARKER: &str = "[MODE: ASK - Please answer the question without modifying any files]";

fn config(stub: &StubExecutable, workspace: &TempDir) -> ClientConfig {
    ClientConfig::new(stub.executable()).workspace(workspace.path()).print_output(false)
}

#[cfg(feature = "cursor-cli")]
#[tokio::test]
async fn test_ask_echo_has_marker_and_no_approval_flags() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::echo_args("cursor-agent").unwrap();
    let client = ac_agents::cursor(config(&stub, &workspace).force(false).approve_mcps(false));

    let answer = client.ask("What is 1+1?", None).await.unwrap();

    let expected = format!(
        "--print\n--workspace\n{}\nagent\n{} What is 1+1?",
        workspace.path().display(),
        ASK_MARKER
    );
    assert_eq!(answer, expected);
}

#[cfg(feature = "cursor-cli")]
#[tokio::test]
async fn test_ask_ignores_force_from_config() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::echo_args("cursor-agent").unwrap();
    let client = ac_agents::cursor(config(&stub, &workspace).force(true));

    let request = InvocationRequest::new("Explain").mode("ask").force(true);
    let answer = client.agent(request).await.unwrap();
    assert!(!answer.lines().any(|line| line == "--force"));
}

#[cfg(feature = "claude")]
#[tokio::test]
async fn test_nonzero_exit_reports_code_and_stderr() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::failing("claude", 3, "boom").unwrap();
    let client = ac_agents::claude(config(&stub, &workspace));

    match client.run("do something", None).await {
        Err(AgentError::ProcessExecution { exit_code, stderr }) => {
            assert_eq!(exit_code, Some(3));
            assert_eq!(stderr, "boom");
        }
        other => panic!("expected ProcessExecution, got {:?}", other.map(|_| ())),
    }
}

#[cfg(feature = "cursor-cli")]
#[tokio::test]
async fn test_empty_stderr_falls_back_to_stdout() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::builder("cursor-agent")
        .stdout("Error: not logged in")
        .exit_code(1)
        .build()
        .unwrap();
    let client = ac_agents::cursor(config(&stub, &workspace));

    let err = client.run("x", None).await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::ProcessExecution { exit_code: Some(1), ref stderr } if stderr == "Error: not logged in"
    ));
}

#[cfg(feature = "cursor-cli")]
#[tokio::test]
async fn test_create_chat_returns_distinct_ids() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::unique_chat_ids("cursor-agent").unwrap();
    let client = ac_agents::cursor(config(&stub, &workspace));

    let first = client.create_chat().await.unwrap();
    let second = client.create_chat().await.unwrap();

    assert!(!first.is_empty());
    assert!(!second.is_empty());
    assert_ne!(first, second);
}

#[cfg(feature = "cursor-cli")]
#[tokio::test]
async fn test_invalid_mode_never_spawns() {
    let workspace = TempDir::new().unwrap();
    let marker = workspace.path().join("spawned");
    let stub = StubExecutable::builder("cursor-agent").marker(&marker).build().unwrap();
    let client = ac_agents::cursor(config(&stub, &workspace));

    let err = client.agent(InvocationRequest::new("x").mode("blargh")).await.unwrap_err();

    assert!(matches!(err, AgentError::InvalidMode(ref mode) if mode == "blargh"));
    assert!(!marker.exists());
}

#[cfg(feature = "gemini")]
#[tokio::test]
async fn test_missing_workspace_fails_before_spawn() {
    let workspace = TempDir::new().unwrap();
    let marker = workspace.path().join("spawned");
    let missing = workspace.path().join("gone");
    let stub = StubExecutable::builder("gemini").marker(&marker).build().unwrap();
    let client = ac_agents::gemini(ClientConfig::new(stub.executable()).workspace(&missing));

    let err = client.run("x", None).await.unwrap_err();

    assert!(matches!(err, AgentError::WorkspaceNotFound(ref p) if *p == missing));
    assert!(!marker.exists());
}

#[cfg(feature = "codex")]
#[tokio::test]
async fn test_missing_executable() {
    let workspace = TempDir::new().unwrap();
    let client = ac_agents::codex(
        ClientConfig::new("/nonexistent/bin/codex").workspace(workspace.path()).print_output(false),
    );

    let err = client.run("x", None).await.unwrap_err();
    assert!(matches!(err, AgentError::ExecutableNotFound(_)));
    assert!(!client.is_available());
}

#[cfg(feature = "cursor-cli")]
#[tokio::test]
async fn test_timeout_kills_child() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::builder("cursor-agent").sleep(30).build().unwrap();
    let client = ac_agents::cursor(config(&stub, &workspace).timeout(Duration::from_millis(300)));

    let started = std::time::Instant::now();
    let err = client.run("x", None).await.unwrap_err();

    assert!(matches!(err, AgentError::TimedOut { .. }));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[cfg(feature = "codex")]
#[tokio::test]
async fn test_timeout_covers_inherited_pipes() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::builder("codex").background_sleep(8).stdout("hi").build().unwrap();
    let client = ac_agents::codex(config(&stub, &workspace).timeout(Duration::from_millis(500)));

    let started = std::time::Instant::now();
    let err = client.run("x", None).await.unwrap_err();

    assert!(matches!(err, AgentError::TimedOut { timeout } if timeout == Duration::from_millis(500)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[cfg(feature = "codex")]
#[tokio::test]
async fn test_resume_id_passed_unchanged() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::builder("codex").record_args().build().unwrap();
    let client = ac_agents::codex(config(&stub, &workspace));

    let session = ChatSession::resume(&client, "0199a1b2-thread/with:odd chars");
    session.run("continue").await.unwrap();

    let args = stub.recorded_args().unwrap();
    let resume = args.iter().position(|a| a == "resume").unwrap();
    assert_eq!(args[resume + 1], "0199a1b2-thread/with:odd chars");
    assert_eq!(args.last().map(String::as_str), Some("continue"));
}

#[cfg(feature = "codex")]
#[tokio::test]
async fn test_codex_jsonl_answer() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::builder("codex")
        .stdout(concat!(
            r#"{"type":"thread.started","thread_id":"t-1"}"#,
            "\n",
            r#"{"type":"item.completed","item":{"type":"agent_message","text":"All done."}}"#
        ))
        .build()
        .unwrap();
    let client = ac_agents::codex(config(&stub, &workspace));

    assert_eq!(client.run("x", None).await.unwrap(), "All done.");
    assert_eq!(client.create_chat().await.unwrap(), "t-1");
}

#[cfg(feature = "cursor-cli")]
#[tokio::test]
async fn test_detect_version_from_stub() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::builder("cursor-agent")
        .stdout("2025.09.18-39624ef")
        .build()
        .unwrap();
    let client = ac_agents::cursor(config(&stub, &workspace));

    assert!(client.is_available());
    assert_eq!(client.detect_version().await.unwrap().version, "2025.09.18-39624ef");
}

#[cfg(feature = "claude")]
#[tokio::test]
async fn test_client_by_name_runs_stub() {
    let workspace = TempDir::new().unwrap();
    let stub = StubExecutable::builder("claude")
        .stdout(r#"{"type":"result","session_id":"sess-42"}"#)
        .build()
        .unwrap();
    let client = ac_agents::client_by_name("claude", config(&stub, &workspace)).unwrap();

    let session = ChatSession::start(client.as_ref()).await.unwrap();
    assert_eq!(session.id(), "sess-42");
}

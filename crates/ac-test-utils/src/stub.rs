// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Stub agent executables
//!
//! A stub is a small `/bin/sh` script written into its own temporary
//! directory. Tests point a client's executable at [`StubExecutable::path`]
//! and observe the real spawn, pipe and exit-code handling without any agent
//! CLI installed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEREDOC_DELIMITER: &str = "AC_STUB_EOF";

/// A generated executable; the backing directory is removed on drop
#[derive(Debug)]
pub struct StubExecutable {
    dir: TempDir,
    path: PathBuf,
}

impl StubExecutable {
    pub fn builder(name: &str) -> StubBuilder {
        StubBuilder::new(name)
    }

    /// Prints every argument on its own line
    pub fn echo_args(name: &str) -> io::Result<Self> {
        Self::builder(name).echo_args().build()
    }

    /// Writes `stderr` and exits with `code`
    pub fn failing(name: &str, code: i32, stderr: &str) -> io::Result<Self> {
        Self::builder(name).stderr(stderr).exit_code(code).build()
    }

    /// Prints a different chat id on every run
    pub fn unique_chat_ids(name: &str) -> io::Result<Self> {
        Self::builder(name).unique_id("chat").build()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path as a string, ready for `ClientConfig::new`
    pub fn executable(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// File the stub writes its arguments to when built with `record_args`
    pub fn args_log(&self) -> PathBuf {
        self.dir.path().join("args.log")
    }

    /// Arguments of the most recent run, one entry per argument
    pub fn recorded_args(&self) -> io::Result<Vec<String>> {
        let content = fs::read_to_string(self.args_log())?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

/// Describes what the generated script does, in order: touch marker, sleep,
/// start background sleeper, record args, echo args, stdout, unique id, stderr, exit
#[derive(Debug, Clone, Default)]
pub struct StubBuilder {
    name: String,
    marker: Option<PathBuf>,
    sleep_secs: Option<u32>,
    background_sleep_secs: Option<u32>,
    record_args: bool,
    echo_args: bool,
    stdout: Option<String>,
    unique_id_prefix: Option<String>,
    stderr: Option<String>,
    exit_code: i32,
}

impl StubBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Create `path` when the stub runs, to detect whether it was spawned
    pub fn marker(mut self, path: impl Into<PathBuf>) -> Self {
        self.marker = Some(path.into());
        self
    }

    pub fn sleep(mut self, secs: u32) -> Self {
        self.sleep_secs = Some(secs);
        self
    }

    /// Leave a `sleep` running in the background that inherits stdout and stderr
    pub fn background_sleep(mut self, secs: u32) -> Self {
        self.background_sleep_secs = Some(secs);
        self
    }

    pub fn record_args(mut self) -> Self {
        self.record_args = true;
        self
    }

    pub fn echo_args(mut self) -> Self {
        self.echo_args = true;
        self
    }

    pub fn stdout(mut self, text: &str) -> Self {
        self.stdout = Some(text.to_string());
        self
    }

    /// Print `<prefix>-<pid>-<nanos>` on its own line
    pub fn unique_id(mut self, prefix: &str) -> Self {
        self.unique_id_prefix = Some(prefix.to_string());
        self
    }

    pub fn stderr(mut self, text: &str) -> Self {
        self.stderr = Some(text.to_string());
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn script(&self, dir: &Path) -> String {
        let mut script = String::from("#!/bin/sh\n");

        if let Some(marker) = &self.marker {
            script.push_str(&format!("touch {}\n", quote(&marker.to_string_lossy())));
        }
        if let Some(secs) = self.sleep_secs {
            script.push_str(&format!("sleep {}\n", secs));
        }
        if let Some(secs) = self.background_sleep_secs {
            script.push_str(&format!("sleep {} &\n", secs));
        }
        if self.record_args {
            let log = dir.join("args.log");
            script.push_str(&format!("printf '%s\\n' \"$@\" > {}\n", quote(&log.to_string_lossy())));
        }
        if self.echo_args {
            script.push_str("printf '%s\\n' \"$@\"\n");
        }
        if let Some(stdout) = &self.stdout {
            script.push_str(&heredoc("cat", stdout));
        }
        if let Some(prefix) = &self.unique_id_prefix {
            script.push_str(&format!("echo \"{}-$$-$(date +%s%N)\"\n", prefix));
        }
        if let Some(stderr) = &self.stderr {
            script.push_str(&heredoc("cat >&2", stderr));
        }
        script.push_str(&format!("exit {}\n", self.exit_code));
        script
    }

    pub fn build(self) -> io::Result<StubExecutable> {
        let dir = tempfile::Builder::new().prefix("ac-stub-").tempdir()?;
        let path = dir.path().join(&self.name);

        // Write under a temporary name so the final path is never open for writing
        let staging = dir.path().join(format!(".{}.tmp", self.name));
        fs::write(&staging, self.script(dir.path()))?;
        make_executable(&staging)?;
        fs::rename(&staging, &path)?;

        Ok(StubExecutable { dir, path })
    }
}

fn heredoc(command: &str, body: &str) -> String {
    format!(
        "{} <<'{}'\n{}\n{}\n",
        command,
        HEREDOC_DELIMITER,
        body.trim_end_matches('\n'),
        HEREDOC_DELIMITER
    )
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_echo_args_stub() {
        let stub = StubExecutable::echo_args("cursor-agent").unwrap();
        assert!(stub.path().ends_with("cursor-agent"));

        let output = Command::new(stub.path()).args(["--print", "two words"]).output().unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "--print\ntwo words\n");
    }

    #[test]
    fn test_failing_stub() {
        let stub = StubExecutable::failing("claude", 3, "boom").unwrap();
        let output = Command::new(stub.path()).output().unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stderr), "boom\n");
    }

    #[test]
    fn test_unique_ids_differ() {
        let stub = StubExecutable::unique_chat_ids("cursor-agent").unwrap();
        let first = Command::new(stub.path()).output().unwrap();
        let second = Command::new(stub.path()).output().unwrap();
        assert!(String::from_utf8_lossy(&first.stdout).starts_with("chat-"));
        assert_ne!(first.stdout, second.stdout);
    }

    #[test]
    fn test_canned_stdout_is_literal() {
        let stub = StubExecutable::builder("gemini")
            .stdout(r#"{"session_id":"$HOME"}"#)
            .build()
            .unwrap();
        let output = Command::new(stub.path()).output().unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "{\"session_id\":\"$HOME\"}\n");
    }

    #[test]
    fn test_record_args_and_marker() {
        let marker_dir = tempfile::tempdir().unwrap();
        let marker = marker_dir.path().join("ran");
        let stub = StubExecutable::builder("codex").record_args().marker(&marker).build().unwrap();

        Command::new(stub.path()).args(["exec", "it's quoted"]).output().unwrap();
        assert!(marker.exists());
        assert_eq!(stub.recorded_args().unwrap(), vec!["exec", "it's quoted"]);
    }

    #[test]
    fn test_background_sleep_is_detached() {
        let script =
            StubBuilder::new("codex").background_sleep(8).stdout("hi").script(Path::new("/tmp"));
        assert!(script.contains("sleep 8 &\n"));
        assert!(script.ends_with("exit 0\n"));
    }

    #[test]
    fn test_quote_escapes_single_quotes() {
        assert_eq!(quote("/tmp/a b"), "'/tmp/a b'");
        assert_eq!(quote("it's"), "'it'\\''s'");
    }
}

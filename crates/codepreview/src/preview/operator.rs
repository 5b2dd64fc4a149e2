use std::path::Path;
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::Error;

/// Filesystem access as seen by the tool.
///
/// Implementations decide where paths resolve: on the host, or inside a
/// sandbox container.
#[async_trait]
pub trait FileOperator: Send + Sync {
    async fn exists(&self, path: &Path) -> Result<bool, Error>;

    async fn read_file(&self, path: &Path) -> Result<String, Error>;

    /// Replace the file content entirely.
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), Error>;

    /// Recursive and idempotent.
    async fn create_dir_all(&self, path: &Path) -> Result<(), Error>;
}

/// Host filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalFileOperator;

#[async_trait]
impl FileOperator for LocalFileOperator {
    async fn exists(&self, path: &Path) -> Result<bool, Error> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| Error::io(path, e))
    }

    async fn read_file(&self, path: &Path) -> Result<String, Error> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(path, e))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), Error> {
        tokio::fs::write(path, content)
            .await
            .map_err(|e| Error::io(path, e))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), Error> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| Error::io(path, e))
    }
}

/// Filesystem of a running docker container, reached through `docker exec`.
#[derive(Debug, Clone)]
pub struct SandboxFileOperator {
    container: String,
    docker: String,
}

impl SandboxFileOperator {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            docker: "docker".to_string(),
        }
    }

    /// Use a different docker-compatible binary (e.g. `podman`).
    pub fn with_docker_binary(mut self, docker: impl Into<String>) -> Self {
        self.docker = docker.into();
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    async fn exec(&self, args: &[&str], input: Option<&str>) -> Result<Output, Error> {
        let mut command = Command::new(&self.docker);
        command.arg("exec");
        if input.is_some() {
            command.arg("-i");
        }
        command
            .arg(&self.container)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::debug!("{} exec {} {}", self.docker, self.container, args.join(" "));

        let mut child = command
            .spawn()
            .map_err(|e| Error::Sandbox(format!("Failed to run {}: {e}", self.docker)))?;

        if let Some(input) = input {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(input.as_bytes())
                    .await
                    .map_err(|e| Error::Sandbox(format!("Failed to stream file content: {e}")))?;
                // stdin is dropped here so the remote `cat` sees EOF.
            }
        }

        child
            .wait_with_output()
            .await
            .map_err(|e| Error::Sandbox(format!("Failed to wait for {}: {e}", self.docker)))
    }

    async fn exec_checked(&self, args: &[&str], input: Option<&str>) -> Result<Output, Error> {
        let output = self.exec(args, input).await?;
        if !output.status.success() {
            return Err(Error::Sandbox(failure_message(&output)));
        }
        Ok(output)
    }
}

fn is_silent(output: &Output) -> bool {
    output.stderr.iter().all(u8::is_ascii_whitespace)
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    match output.status.code() {
        Some(code) if stderr.is_empty() => format!("command exited with status {code}"),
        Some(code) => format!("command exited with status {code}: {stderr}"),
        None => "command terminated by signal".to_string(),
    }
}

#[async_trait]
impl FileOperator for SandboxFileOperator {
    async fn exists(&self, path: &Path) -> Result<bool, Error> {
        let path = path.to_string_lossy();
        let output = self.exec(&["test", "-e", &*path], None).await?;

        // `test` answers 0 or 1 without writing anything. docker also exits 1
        // when the daemon or the container is unreachable, but says so on stderr.
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) if is_silent(&output) => Ok(false),
            _ => Err(Error::Sandbox(failure_message(&output))),
        }
    }

    async fn read_file(&self, path: &Path) -> Result<String, Error> {
        let display = path.to_string_lossy();
        let output = self.exec_checked(&["cat", &*display], None).await?;
        String::from_utf8(output.stdout)
            .map_err(|e| Error::Sandbox(format!("{display} is not valid UTF-8: {e}")))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), Error> {
        let path = path.to_string_lossy();
        self.exec_checked(&["sh", "-c", "cat > \"$1\"", "sh", &*path], Some(content))
            .await?;
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), Error> {
        let path = path.to_string_lossy();
        self.exec_checked(&["mkdir", "-p", &*path], None).await?;
        Ok(())
    }
}

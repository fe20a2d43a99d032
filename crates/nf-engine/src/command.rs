//! Builder for executing external tool commands with timeout support.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Command;

/// Default command timeout: 5 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use nf_engine::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> nf_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("audiveris"))
///     .arg("-batch")
///     .arg("-export")
///     .arg("/path/to/page.png")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - Returns [`nf_core::Error::Timeout`] if the process exceeds the
    ///   configured deadline.
    /// - Returns [`nf_core::Error::Engine`] if the process exits with a
    ///   non-zero status (message carries the captured stderr).
    /// - Returns [`nf_core::Error::Engine`] if spawning the process fails.
    pub async fn execute(&self) -> nf_core::Result<ToolOutput> {
        let program_name = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| nf_core::Error::Engine {
            tool: program_name.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        // Wait with timeout. On expiry the future is dropped and
        // kill_on_drop reaps the child.
        let result = tokio::time::timeout(self.timeout, child.wait_with_output()).await;

        match result {
            Ok(Ok(output)) => {
                let tool_output = ToolOutput {
                    status: output.status,
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if !output.status.success() {
                    return Err(nf_core::Error::Engine {
                        tool: program_name,
                        message: tool_output.stderr.trim().to_string(),
                    });
                }

                Ok(tool_output)
            }
            Ok(Err(e)) => Err(nf_core::Error::Engine {
                tool: program_name,
                message: format!("I/O error waiting for process: {e}"),
            }),
            Err(_elapsed) => Err(nf_core::Error::timeout(program_name, self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_echo() {
        // `echo` should be universally available.
        let output = ToolCommand::new(PathBuf::from("echo"))
            .arg("hello")
            .execute()
            .await;

        match output {
            Ok(out) => {
                assert!(out.status.success());
                assert!(out.stdout.trim().contains("hello"));
            }
            Err(_) => {
                // On some minimal environments echo may not exist; skip.
            }
        }
    }

    #[tokio::test]
    async fn execute_nonexistent_tool() {
        let result = ToolCommand::new(PathBuf::from("nonexistent_tool_xyz_12345"))
            .execute()
            .await;
        assert!(matches!(result, Err(nf_core::Error::Engine { .. })));
    }

    #[tokio::test]
    async fn nonzero_exit_carries_stderr() {
        // `sh -c` writes to stderr and exits 1.
        let result = ToolCommand::new(PathBuf::from("sh"))
            .args(["-c", "echo 'unsupported format' >&2; exit 1"])
            .execute()
            .await;

        match result {
            Err(nf_core::Error::Engine { message, .. }) => {
                assert!(message.contains("unsupported format"), "got: {message}");
            }
            other => panic!("expected engine error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timeout_fires() {
        // `sleep 10` should be killed well before 10 seconds.
        let result = ToolCommand::new(PathBuf::from("sleep"))
            .arg("10")
            .timeout(Duration::from_millis(100))
            .execute()
            .await;
        assert!(matches!(result, Err(nf_core::Error::Timeout { .. })));
    }
}

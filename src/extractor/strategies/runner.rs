//! External command execution.

use std::future::Future;
use std::io;
use std::process::Stdio;

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// True if the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run that printed `stdout`.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A run that exited with `code` after printing `stderr`.
    #[must_use]
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Standard output followed by standard error.
    ///
    /// Some programs print their documentation on stderr.
    #[must_use]
    pub fn text(&self) -> String {
        if self.stderr.is_empty() {
            return self.stdout.clone();
        }
        if self.stdout.is_empty() {
            return self.stderr.clone();
        }
        format!("{}\n{}", self.stdout, self.stderr)
    }

    pub(crate) fn describe_failure(&self) -> String {
        let status = self
            .code
            .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit status {c}"));
        match self.stderr.lines().find(|l| !l.trim().is_empty()) {
            Some(line) => format!("{status}: {}", line.trim()),
            None => status,
        }
    }
}

/// Runs external programs for the command-based strategies.
///
/// Implementations must stop the child process when the returned future is
/// dropped, since strategies abandon the future on cancellation.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` and captures its output.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the program cannot be spawned (for example,
    /// it is not installed). A non-zero exit is reported through
    /// [`CommandOutput::success`], not as an error.
    fn run(
        &self,
        program: &str,
        args: &[String],
    ) -> impl Future<Output = io::Result<CommandOutput>> + Send;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_joins_both_streams() {
        let output = CommandOutput {
            stdout: "a".to_string(),
            stderr: "b".to_string(),
            ..CommandOutput::ok("")
        };

        assert_eq!(output.text(), "a\nb");
        assert_eq!(CommandOutput::ok("only").text(), "only");
        assert_eq!(CommandOutput::failed(1, "err").text(), "err");
    }

    #[test]
    fn failure_description_uses_first_stderr_line() {
        let output = CommandOutput::failed(2, "\nunknown option\nusage: ...");

        assert_eq!(output.describe_failure(), "exit status 2: unknown option");
    }

    #[test]
    fn failure_description_without_code() {
        let output = CommandOutput {
            code: None,
            ..CommandOutput::failed(0, "")
        };

        assert_eq!(output.describe_failure(), "terminated by signal");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let result = TokioCommandRunner
            .run("confscout-definitely-not-installed", &[])
            .await;

        assert!(result.is_err());
    }
}

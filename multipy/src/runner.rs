//! External process execution.
//!
//! Everything the provisioner does outside its own process (the macOS
//! `installer` tool, the freshly installed interpreter, `pipx`) goes through
//! the [`CommandRunner`] trait. Production code uses [`SystemRunner`]; tests
//! substitute a fake that records invocations and scripts their results.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ProvisionError, ProvisionResult};

/// A program invocation: executable plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program to execute (looked up on `PATH` if not absolute).
    pub program: PathBuf,
    /// Arguments passed to the program.
    pub args: Vec<OsString>,
}

impl CommandLine {
    /// Create an invocation with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Wrap this invocation in `sudo`.
    pub fn elevated(self) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program.into_os_string());
        args.extend(self.args);
        Self {
            program: PathBuf::from("sudo"),
            args,
        }
    }

    /// The program's file name, for log and error messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Whether the arguments contain `needle` verbatim.
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }

    /// The argument following `flag`, if present.
    pub fn arg_after(&self, flag: &str) -> Option<&Path> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(Path::new)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status and captured output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// A successful result with the given stdout.
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// A failed result with the given exit code and stderr.
    pub fn failure(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with status zero.
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Capability to run an external program to completion.
pub trait CommandRunner {
    /// Run `command`, blocking until it exits.
    ///
    /// Returns `Err` only if the process could not be started; a non-zero
    /// exit is reported through [`CommandOutput::code`].
    fn run(&self, command: &CommandLine) -> ProvisionResult<CommandOutput>;

    /// Run `command` and turn a non-zero exit into [`ProvisionError::CommandFailed`].
    fn run_checked(&self, command: &CommandLine) -> ProvisionResult<CommandOutput> {
        tracing::debug!(command = %command, "running");
        let output = self.run(command)?;
        if !output.is_success() {
            return Err(ProvisionError::CommandFailed {
                command: command.to_string(),
                code: output.code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &CommandLine) -> ProvisionResult<CommandOutput> {
        (**self).run(command)
    }
}

/// Runs commands as real OS processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandLine) -> ProvisionResult<CommandOutput> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .output()
            .map_err(|e| ProvisionError::SpawnFailed {
                program: command.program_name(),
                source: e,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_display() {
        let cmd = CommandLine::new("installer")
            .arg("-pkg")
            .arg("/tmp/python.pkg")
            .args(["-target", "/"]);
        assert_eq!(cmd.to_string(), "installer -pkg /tmp/python.pkg -target /");
    }

    #[test]
    fn test_elevated_prefixes_sudo() {
        let cmd = CommandLine::new("installer").arg("-pkg").elevated();
        assert_eq!(cmd.program, PathBuf::from("sudo"));
        assert_eq!(cmd.to_string(), "sudo installer -pkg");
        assert_eq!(cmd.program_name(), "sudo");
    }

    #[test]
    fn test_arg_after() {
        let cmd = CommandLine::new("installer").args(["-pkg", "a.pkg", "-target"]);
        assert_eq!(cmd.arg_after("-pkg"), Some(Path::new("a.pkg")));
        assert_eq!(cmd.arg_after("-target"), None);
        assert_eq!(cmd.arg_after("-missing"), None);
        assert!(cmd.has_arg("-target"));
    }

    #[test]
    fn test_system_runner_reports_exit_status() {
        let runner = SystemRunner::new();

        let ok = runner.run(&CommandLine::new("true")).unwrap();
        assert!(ok.is_success());

        let fail = runner.run(&CommandLine::new("false")).unwrap();
        assert!(!fail.is_success());
        assert!(runner.run_checked(&CommandLine::new("false")).is_err());
    }

    #[test]
    fn test_system_runner_captures_stdout() {
        let runner = SystemRunner::new();
        let out = runner
            .run_checked(&CommandLine::new("echo").arg("hello"))
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hello");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let runner = SystemRunner::new();
        let result = runner.run(&CommandLine::new("/nonexistent/multipy-test-binary"));
        assert!(matches!(result, Err(ProvisionError::SpawnFailed { .. })));
    }
}

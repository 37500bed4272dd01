//! Companion developer tools, each installed into its own isolated
//! environment by `pipx`.

use std::path::PathBuf;

use crate::error::ProvisionResult;
use crate::runner::{CommandLine, CommandRunner};

/// Default isolated-environment installer.
pub const DEFAULT_TOOL_INSTALLER: &str = "pipx";

/// Tools installed when the configuration does not name any.
pub const DEFAULT_TOOLS: &[&str] = &[
    "black",
    "flake8",
    "hatch",
    "mypy",
    "nox",
    "poetry",
    "pre-commit",
    "ruff",
    "tox",
    "twine",
    "virtualenv",
];

/// Installs a list of tools one after the other.
#[derive(Debug)]
pub struct ToolInstaller<R: CommandRunner> {
    runner: R,
    program: PathBuf,
}

impl<R: CommandRunner> ToolInstaller<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: PathBuf::from(DEFAULT_TOOL_INSTALLER),
        }
    }

    /// Use a different installer executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// The command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Install every tool in order.
    ///
    /// Stops at the first failure; tools before it stay installed. Returns
    /// the names installed.
    pub fn install_all<S: AsRef<str>>(&self, tools: &[S]) -> ProvisionResult<Vec<String>> {
        let mut installed = Vec::with_capacity(tools.len());
        for tool in tools {
            let tool = tool.as_ref();
            self.install(tool)?;
            installed.push(tool.to_string());
        }
        Ok(installed)
    }

    /// Install a single tool.
    pub fn install(&self, tool: &str) -> ProvisionResult<()> {
        tracing::info!(tool, "installing tool");
        let command = CommandLine::new(&self.program).arg("install").arg(tool);
        self.runner.run_checked(&command)?;
        Ok(())
    }
}

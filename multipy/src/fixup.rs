//! Post-install repairs run by the freshly installed interpreter.
//!
//! The silent install skips the GUI package's post-install hook, so the
//! runtime comes up without a usable CA bundle. Two steps put it right:
//!
//! 1. Trust bootstrap: install `certifi` and point OpenSSL's default CA file
//!    at its bundle.
//! 2. Baseline upgrade: bring pip, setuptools and wheel up to date.
//!
//! Both run under the target interpreter, never the host's, so they modify
//! the installation being provisioned.

use std::path::{Path, PathBuf};

use crate::error::ProvisionResult;
use crate::runner::{CommandLine, CommandRunner};

/// Certificate installation routine, equivalent to the installer's
/// "Install Certificates" hook.
pub const INSTALL_CERTIFICATES_SCRIPT: &str = r#"
import importlib, os, os.path, ssl, stat, subprocess, sys

MODE = stat.S_IRUSR | stat.S_IWUSR | stat.S_IXUSR | stat.S_IRGRP | stat.S_IWGRP | stat.S_IXGRP | stat.S_IROTH | stat.S_IXOTH

openssl_dir, openssl_cafile = os.path.split(ssl.get_default_verify_paths().openssl_cafile)
subprocess.check_call([sys.executable, "-E", "-s", "-m", "pip", "install", "--upgrade", "certifi"])
importlib.invalidate_caches()
import certifi

os.makedirs(openssl_dir, exist_ok=True)
os.chdir(openssl_dir)
relpath = os.path.relpath(certifi.where())
try:
    os.remove(openssl_cafile)
except FileNotFoundError:
    pass
os.symlink(relpath, openssl_cafile)
os.chmod(openssl_cafile, MODE)
"#;

/// Packages upgraded in the baseline step.
pub const BASELINE_PACKAGES: [&str; 3] = ["pip", "setuptools", "wheel"];

/// Path of an interpreter inside an installed version tree.
pub fn interpreter_path(install_prefix: &Path, interpreter_name: &str) -> PathBuf {
    install_prefix.join("bin").join(interpreter_name)
}

/// Runs the post-install repair steps.
#[derive(Debug)]
pub struct PostInstallFixup<R: CommandRunner> {
    runner: R,
    elevate: bool,
}

impl<R: CommandRunner> PostInstallFixup<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            elevate: false,
        }
    }

    /// Run both steps through `sudo`.
    pub fn with_elevation(mut self, elevate: bool) -> Self {
        self.elevate = elevate;
        self
    }

    /// The command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Repair the runtime at `install_prefix`.
    ///
    /// Stops at the first failing step; the baseline upgrade never runs on
    /// a runtime whose trust bootstrap failed.
    pub fn repair(&self, install_prefix: &Path, interpreter_name: &str) -> ProvisionResult<()> {
        let python = interpreter_path(install_prefix, interpreter_name);

        tracing::info!(python = %python.display(), "installing certificates");
        self.run(self.trust_bootstrap_command(&python))?;

        tracing::info!(python = %python.display(), "upgrading baseline packages");
        self.run(self.baseline_upgrade_command(&python))?;

        Ok(())
    }

    fn trust_bootstrap_command(&self, python: &Path) -> CommandLine {
        CommandLine::new(python).args(["-E", "-s", "-c", INSTALL_CERTIFICATES_SCRIPT])
    }

    fn baseline_upgrade_command(&self, python: &Path) -> CommandLine {
        CommandLine::new(python)
            .args(["-E", "-s", "-m", "pip", "install", "--upgrade"])
            .args(BASELINE_PACKAGES)
    }

    fn run(&self, command: CommandLine) -> ProvisionResult<()> {
        let command = if self.elevate {
            command.elevated()
        } else {
            command
        };
        self.runner.run_checked(&command).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use crate::runner::CommandOutput;
    use std::cell::RefCell;

    #[derive(Default)]
    struct ScriptedRunner {
        commands: RefCell<Vec<CommandLine>>,
        fail_on_call: Option<usize>,
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, command: &CommandLine) -> ProvisionResult<CommandOutput> {
            let mut commands = self.commands.borrow_mut();
            commands.push(command.clone());
            if self.fail_on_call == Some(commands.len()) {
                return Ok(CommandOutput::failure(2, "boom"));
            }
            Ok(CommandOutput::success(""))
        }
    }

    const PREFIX: &str = "/Library/Frameworks/Python.framework/Versions/3.13";

    #[test]
    fn test_interpreter_path() {
        assert_eq!(
            interpreter_path(Path::new(PREFIX), "python3.13t"),
            PathBuf::from(format!("{}/bin/python3.13t", PREFIX))
        );
    }

    #[test]
    fn test_both_steps_use_target_interpreter() {
        let fixup = PostInstallFixup::new(ScriptedRunner::default());
        fixup.repair(Path::new(PREFIX), "python3.13").unwrap();

        let commands = fixup.runner().commands.borrow();
        assert_eq!(commands.len(), 2);

        let python = PathBuf::from(format!("{}/bin/python3.13", PREFIX));
        assert!(commands.iter().all(|c| c.program == python));

        assert!(commands[0].has_arg("-c"));
        assert!(commands[0].has_arg(INSTALL_CERTIFICATES_SCRIPT));

        assert_eq!(
            commands[1].to_string(),
            format!(
                "{} -E -s -m pip install --upgrade pip setuptools wheel",
                python.display()
            )
        );
    }

    #[test]
    fn test_trust_failure_skips_upgrade() {
        let runner = ScriptedRunner {
            fail_on_call: Some(1),
            ..Default::default()
        };
        let fixup = PostInstallFixup::new(runner);

        let result = fixup.repair(Path::new(PREFIX), "python3.13");
        assert!(matches!(
            result,
            Err(ProvisionError::CommandFailed { code: Some(2), .. })
        ));
        assert_eq!(fixup.runner().commands.borrow().len(), 1);
    }

    #[test]
    fn test_upgrade_failure_is_fatal() {
        let runner = ScriptedRunner {
            fail_on_call: Some(2),
            ..Default::default()
        };
        let fixup = PostInstallFixup::new(runner);
        assert!(fixup.repair(Path::new(PREFIX), "python3.13").is_err());
    }

    #[test]
    fn test_elevation_wraps_both_steps() {
        let fixup = PostInstallFixup::new(ScriptedRunner::default()).with_elevation(true);
        fixup.repair(Path::new(PREFIX), "python3.13").unwrap();

        let commands = fixup.runner().commands.borrow();
        assert!(commands.iter().all(|c| c.program == PathBuf::from("sudo")));
    }
}

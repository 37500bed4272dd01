//! The macOS `installer` tool.
//!
//! Two operations are used: listing a package's choice items and applying a
//! package with a choice-changes document. Both are opaque external calls;
//! only their exit status (and, for listing, their stdout) is interpreted.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::choices::ChoiceDocument;
use crate::error::{ProvisionError, ProvisionResult};
use crate::runner::{CommandLine, CommandRunner};

/// Default path of the installer tool.
pub const DEFAULT_INSTALLER_PROGRAM: &str = "/usr/sbin/installer";

/// Default target volume.
pub const DEFAULT_TARGET: &str = "/";

/// Wrapper around the native package installer.
#[derive(Debug)]
pub struct NativeInstaller<R: CommandRunner> {
    runner: R,
    program: PathBuf,
    target: String,
    elevate: bool,
}

impl<R: CommandRunner> NativeInstaller<R> {
    /// Create an installer that targets `/` without `sudo`.
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            program: PathBuf::from(DEFAULT_INSTALLER_PROGRAM),
            target: DEFAULT_TARGET.to_string(),
            elevate: false,
        }
    }

    /// Use a different installer executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Install onto a different volume.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Run the apply step through `sudo`.
    pub fn with_elevation(mut self, elevate: bool) -> Self {
        self.elevate = elevate;
        self
    }

    /// The command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Ask the installer for the package's selectable choices.
    pub fn list_choices(&self, pkg: &Path) -> ProvisionResult<ChoiceDocument> {
        let command = CommandLine::new(&self.program)
            .arg("-showChoiceChangesXML")
            .arg("-pkg")
            .arg(pkg);

        let output = self.runner.run_checked(&command)?;
        ChoiceDocument::parse(&output.stdout)
    }

    /// Install `pkg` with the given choice changes.
    ///
    /// The document is written to a temporary file that lives until the
    /// installer exits.
    pub fn apply(&self, pkg: &Path, choices: &ChoiceDocument) -> ProvisionResult<()> {
        let xml = choices.to_xml()?;

        let mut file = tempfile::Builder::new()
            .prefix("multipy-choices-")
            .suffix(".plist")
            .tempfile()
            .map_err(|e| ProvisionError::WriteFailed {
                path: std::env::temp_dir(),
                source: e,
            })?;
        write_choices(&mut file, &xml)?;

        let mut command = CommandLine::new(&self.program)
            .arg("-applyChoiceChangesXML")
            .arg(file.path())
            .arg("-pkg")
            .arg(pkg)
            .arg("-target")
            .arg(&self.target);
        if self.elevate {
            command = command.elevated();
        }

        tracing::info!(pkg = %pkg.display(), target = %self.target, "applying installer package");
        self.runner.run_checked(&command)?;
        Ok(())
    }
}

fn write_choices(file: &mut NamedTempFile, xml: &[u8]) -> ProvisionResult<()> {
    file.write_all(xml)
        .and_then(|_| file.flush())
        .map_err(|e| ProvisionError::WriteFailed {
            path: file.path().to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::tests::PYTHON_PKG_CHOICES;
    use crate::choices::{rewrite_choices, DEFAULT_ALLOW_PREFIXES};
    use crate::runner::CommandOutput;
    use std::cell::RefCell;

    /// Records commands; answers listing with a fixture and snapshots the
    /// choice file passed to apply.
    #[derive(Default)]
    struct RecordingRunner {
        commands: RefCell<Vec<CommandLine>>,
        applied_xml: RefCell<Option<Vec<u8>>>,
        fail_apply: bool,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &CommandLine) -> ProvisionResult<CommandOutput> {
            self.commands.borrow_mut().push(command.clone());
            if command.has_arg("-showChoiceChangesXML") {
                return Ok(CommandOutput::success(PYTHON_PKG_CHOICES));
            }
            if let Some(path) = command.arg_after("-applyChoiceChangesXML") {
                *self.applied_xml.borrow_mut() = Some(std::fs::read(path).unwrap());
                if self.fail_apply {
                    return Ok(CommandOutput::failure(1, "installer: must be run as root"));
                }
            }
            Ok(CommandOutput::success(""))
        }
    }

    #[test]
    fn test_list_choices_parses_stdout() {
        let installer = NativeInstaller::new(RecordingRunner::default());
        let doc = installer.list_choices(Path::new("/tmp/python.pkg")).unwrap();
        assert_eq!(doc.len(), 8);

        let commands = installer.runner().commands.borrow();
        assert_eq!(
            commands[0].to_string(),
            "/usr/sbin/installer -showChoiceChangesXML -pkg /tmp/python.pkg"
        );
    }

    #[test]
    fn test_apply_passes_document_and_target() {
        let installer = NativeInstaller::new(RecordingRunner::default()).with_target("/Volumes/Dev");
        let doc = ChoiceDocument::parse(PYTHON_PKG_CHOICES.as_bytes()).unwrap();
        let rewritten = rewrite_choices(&doc, &DEFAULT_ALLOW_PREFIXES);

        installer.apply(Path::new("/tmp/python.pkg"), &rewritten).unwrap();

        let runner = installer.runner();
        let commands = runner.commands.borrow();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].arg_after("-pkg"), Some(Path::new("/tmp/python.pkg")));
        assert_eq!(commands[0].arg_after("-target"), Some(Path::new("/Volumes/Dev")));

        let applied = runner.applied_xml.borrow().clone().unwrap();
        assert_eq!(ChoiceDocument::parse(&applied).unwrap(), rewritten);
    }

    #[test]
    fn test_apply_with_elevation_uses_sudo() {
        let installer = NativeInstaller::new(RecordingRunner::default()).with_elevation(true);
        let doc = ChoiceDocument::parse(PYTHON_PKG_CHOICES.as_bytes()).unwrap();

        installer.apply(Path::new("/tmp/python.pkg"), &doc).unwrap();

        let commands = installer.runner().commands.borrow();
        assert_eq!(commands[0].program, PathBuf::from("sudo"));
        assert_eq!(commands[0].args[0], "/usr/sbin/installer");
    }

    #[test]
    fn test_apply_failure_is_fatal() {
        let runner = RecordingRunner {
            fail_apply: true,
            ..Default::default()
        };
        let installer = NativeInstaller::new(runner);
        let doc = ChoiceDocument::parse(PYTHON_PKG_CHOICES.as_bytes()).unwrap();

        let result = installer.apply(Path::new("/tmp/python.pkg"), &doc);
        match result {
            Err(ProvisionError::CommandFailed { code, stderr, .. }) => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("root"));
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }
}

//! Subprocess execution

use std::process::Command;

use crate::error::ShellError;

/// Runs a command line and hands back its standard output.
pub trait Shell: Send + Sync {
    fn run(&self, command: &str) -> Result<String, ShellError>;
}

/// Runs command lines through the platform shell, the same way a user would
/// type them in a terminal.
#[derive(Clone, Debug, Default)]
pub struct SystemShell {
    /// Value for `PATH` in the child environment, inherited when `None`
    search_path: Option<String>,
}

impl SystemShell {
    pub fn new(search_path: Option<String>) -> Self {
        Self { search_path }
    }

    pub fn search_path(&self) -> Option<&str> {
        self.search_path.as_deref()
    }

    #[cfg(windows)]
    fn command(command: &str) -> Command {
        use std::os::windows::process::CommandExt;

        // cmd.exe does not understand MSVC argument escaping, hand it the
        // line untouched
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").raw_arg(command);
        cmd
    }

    #[cfg(not(windows))]
    fn command(command: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

impl Shell for SystemShell {
    fn run(&self, command: &str) -> Result<String, ShellError> {
        let mut cmd = Self::command(command);
        if let Some(path) = self.search_path.as_ref() {
            cmd.env("PATH", path);
        }

        tracing::debug!(command, "running");
        let output = cmd.output().map_err(|source| ShellError::Spawn {
            command: command.to_owned(),
            source,
        })?;

        if !output.status.success() {
            return Err(ShellError::Failed {
                command: command.to_owned(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout() {
        let shell = SystemShell::default();
        assert_eq!(
            shell.run("echo com.apple.keylayout.ABC").unwrap(),
            "com.apple.keylayout.ABC\n"
        );
    }

    #[test]
    fn reports_exit_status_and_stderr() {
        let shell = SystemShell::default();
        match shell.run("echo nope >&2; exit 3") {
            Err(ShellError::Failed { status, stderr, .. }) => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr, "nope");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn uses_extended_search_path() {
        let shell = SystemShell::new(Some("/nonexistent/im:/usr/bin:/bin".to_owned()));
        assert_eq!(
            shell.run("echo $PATH").unwrap().trim(),
            "/nonexistent/im:/usr/bin:/bin"
        );
    }
}

#[cfg(all(test, windows))]
mod windows_tests {
    use super::*;

    #[test]
    fn passes_quoted_command_verbatim() {
        let shell = SystemShell::default();
        assert_eq!(
            shell.run(r#"echo "C:\Program Files\im-select" 1033"#).unwrap().trim(),
            r#""C:\Program Files\im-select" 1033"#
        );
    }
}

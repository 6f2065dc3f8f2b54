//! Error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("already initialized, ignoring")]
    AlreadyInitialized,
    #[error("unsupported platform '{0}', input method switching is disabled")]
    UnsupportedPlatform(String),
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("could not spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{command}' failed ({}): {stderr}", describe_status(.status))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("no command configured")]
    Disabled,
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_owned(),
    }
}

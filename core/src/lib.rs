//! Editor-agnostic core of im-switch: classify mode changes into insert
//! edges and run the configured input method controller commands.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod log;
pub mod mode;
pub mod platform;
pub mod session;
pub mod shell;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigOverrides, PlatformOverrides};
pub use dispatch::{Notifier, Severity};
pub use error::{InitError, ShellError};
pub use mode::{ModeState, Transition};
pub use platform::{Platform, PlatformCommandSet, IM_TOKEN};
pub use session::Session;

//! Plugin state management
pub mod config;

use std::sync::{Arc, Mutex};

use im_switch_core::{log::LogGuard, Session};

use config::PluginConfig;

// Structure to hold the plugin state
pub struct ImSwitchPlugin {
    pub config: Option<PluginConfig>,
    pub session: Session,
    /// Set while the `ModeChanged` autocommand is registered
    pub augroup_id: Option<u32>,
    pub log_guard: Option<LogGuard>,
    /// Logging is set up at most once, even if that failed
    pub log_attempted: bool,
}

impl ImSwitchPlugin {
    pub fn new() -> Self {
        Self {
            config: None,
            session: Session::new(),
            augroup_id: None,
            log_guard: None,
            log_attempted: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.augroup_id.is_some()
    }
}

pub static PLUGIN_NAME: &str = "im-switch.nvim";

lazy_static::lazy_static! {
    static ref PLUGIN_STATE: Arc<Mutex<ImSwitchPlugin>> = Arc::new(Mutex::new(ImSwitchPlugin::new()));
}

// Get a reference to the global state
pub fn get_state() -> Arc<Mutex<ImSwitchPlugin>> {
    PLUGIN_STATE.clone()
}

//! Command configuration and its merge over built-in defaults

use serde::Deserialize;

use crate::platform::{Platform, PlatformCommandSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub macos: PlatformCommandSet,
    pub windows: PlatformCommandSet,
    pub linux: PlatformCommandSet,
    /// Run command sequences on a background worker instead of blocking
    pub asynchronous: bool,
    /// Show switch results and failures in the editor
    pub status: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            macos: PlatformCommandSet::macos(),
            windows: PlatformCommandSet::windows(),
            linux: PlatformCommandSet::linux(),
            asynchronous: false,
            status: false,
        }
    }
}

impl Config {
    /// The command set for `platform`, `None` when the platform is not
    /// supported.
    pub fn commands_for(&self, platform: Platform) -> Option<&PlatformCommandSet> {
        match platform {
            Platform::MacOS => Some(&self.macos),
            Platform::Windows => Some(&self.windows),
            Platform::Linux => Some(&self.linux),
            Platform::Unsupported => None,
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        overrides.apply(&mut self);
        self
    }
}

/// User supplied values for one platform. Absent fields keep the default.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PlatformOverrides {
    #[serde(default)]
    pub controller_path: Option<String>,
    #[serde(default)]
    pub on_leave: Option<String>,
    #[serde(default)]
    pub on_enter: Option<String>,
    #[serde(default)]
    pub get_current: Option<String>,
}

impl PlatformOverrides {
    pub fn apply(self, set: &mut PlatformCommandSet) {
        if let Some(v) = self.controller_path {
            set.controller_path = v;
        }
        if let Some(v) = self.on_leave {
            set.on_leave = v;
        }
        if let Some(v) = self.on_enter {
            set.on_enter = v;
        }
        if let Some(v) = self.get_current {
            set.get_current = v;
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub macos: Option<PlatformOverrides>,
    #[serde(default)]
    pub windows: Option<PlatformOverrides>,
    #[serde(default)]
    pub linux: Option<PlatformOverrides>,
    #[serde(default, rename = "async")]
    pub asynchronous: Option<bool>,
    #[serde(default)]
    pub status: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut Config) {
        for (overrides, set) in [
            (self.macos, &mut config.macos),
            (self.windows, &mut config.windows),
            (self.linux, &mut config.linux),
        ] {
            if let Some(overrides) = overrides {
                overrides.apply(set);
            }
        }
        if let Some(asynchronous) = self.asynchronous {
            config.asynchronous = asynchronous;
        }
        if let Some(status) = self.status {
            config.status = status;
        }
    }
}

//! Per-platform controller commands

use std::fmt;

/// Literal token in the on-enter template that is replaced by the cached input
/// method.
pub const IM_TOKEN: &str = "{{im}}";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
    Unsupported,
}

impl Platform {
    /// Map an OS identifier, as in [`std::env::consts::OS`].
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Self::MacOS,
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            _ => Self::Unsupported,
        }
    }

    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn path_separator(self) -> char {
        match self {
            Self::Windows => ';',
            Self::MacOS | Self::Linux | Self::Unsupported => ':',
        }
    }

    /// Prepend `controller_path` to `inherited`, the value of `PATH` the
    /// editor was started with. An empty controller path leaves it untouched.
    pub fn extend_search_path(self, controller_path: &str, inherited: &str) -> String {
        match (controller_path.is_empty(), inherited.is_empty()) {
            (true, _) => inherited.to_owned(),
            (false, true) => controller_path.to_owned(),
            (false, false) => {
                format!("{controller_path}{}{inherited}", self.path_separator())
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MacOS => "macOS",
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::Unsupported => "unsupported",
        })
    }
}

/// Shell command strings for one platform.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlatformCommandSet {
    /// Directory holding the controller binary, prepended to `PATH`
    pub controller_path: String,
    /// Run when leaving insert mode
    pub on_leave: String,
    /// Run when entering insert mode, [`IM_TOKEN`] is replaced by the cached IM
    pub on_enter: String,
    /// Prints the active IM on stdout
    pub get_current: String,
}

impl PlatformCommandSet {
    pub fn macos() -> Self {
        Self {
            controller_path: "/usr/local/bin".to_owned(),
            on_leave: "im-select com.apple.keylayout.ABC".to_owned(),
            on_enter: format!("im-select {IM_TOKEN}"),
            get_current: "im-select".to_owned(),
        }
    }

    pub fn windows() -> Self {
        Self {
            controller_path: r"C:\Program Files\im-select".to_owned(),
            on_leave: "im-select.exe 1033".to_owned(),
            on_enter: format!("im-select.exe {IM_TOKEN}"),
            get_current: "im-select.exe".to_owned(),
        }
    }

    pub fn linux() -> Self {
        Self {
            controller_path: "/usr/bin".to_owned(),
            on_leave: "fcitx5-remote -s keyboard-us".to_owned(),
            on_enter: format!("fcitx5-remote -s {IM_TOKEN}"),
            get_current: "fcitx5-remote -n".to_owned(),
        }
    }

    /// Restoring on enter needs both the template and a way to learn what to
    /// restore.
    pub fn enter_enabled(&self) -> bool {
        !self.on_enter.is_empty() && !self.get_current.is_empty()
    }

    pub fn leave_enabled(&self) -> bool {
        !self.on_leave.is_empty()
    }
}

/// Replace the first [`IM_TOKEN`] of `template` with `im`. Nothing is quoted.
pub fn render_template(template: &str, im: &str) -> String {
    template.replacen(IM_TOKEN, im, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_os_identifiers() {
        assert_eq!(Platform::from_os("macos"), Platform::MacOS);
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("freebsd"), Platform::Unsupported);
        assert_eq!(Platform::from_os(""), Platform::Unsupported);
    }

    #[test]
    fn extends_search_path_with_platform_separator() {
        assert_eq!(
            Platform::MacOS.extend_search_path("/usr/local/bin", "/usr/bin:/bin"),
            "/usr/local/bin:/usr/bin:/bin"
        );
        assert_eq!(
            Platform::Windows.extend_search_path(r"C:\im", r"C:\Windows"),
            r"C:\im;C:\Windows"
        );
        assert_eq!(Platform::Linux.extend_search_path("", "/bin"), "/bin");
        assert_eq!(Platform::Linux.extend_search_path("/opt/im", ""), "/opt/im");
    }

    #[test]
    fn renders_first_token_only() {
        assert_eq!(
            render_template("im-select {{im}}", "com.apple.keylayout.ABC"),
            "im-select com.apple.keylayout.ABC"
        );
        assert_eq!(
            render_template("switch {{im}} {{im}}", "pinyin"),
            "switch pinyin {{im}}"
        );
        assert_eq!(render_template("switch {{im}}", ""), "switch ");
        assert_eq!(render_template("switch {{ im }}", "pinyin"), "switch {{ im }}");
    }

    #[test]
    fn enter_needs_template_and_getter() {
        let mut set = PlatformCommandSet::linux();
        assert!(set.enter_enabled());
        set.get_current.clear();
        assert!(!set.enter_enabled());
        assert!(set.leave_enabled());

        let set = PlatformCommandSet {
            on_enter: String::new(),
            ..PlatformCommandSet::macos()
        };
        assert!(!set.enter_enabled());
    }
}

//! Per-editor context: initialization guard, mode tracker and dispatcher

use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::{DispatchOptions, Dispatcher, Notifier};
use crate::error::{InitError, ShellError};
use crate::mode::{ModeState, ModeTracker, Transition};
use crate::platform::Platform;
use crate::shell::{Shell, SystemShell};

#[derive(Default)]
pub struct Session {
    initialized: bool,
    platform: Option<Platform>,
    search_path: Option<String>,
    tracker: ModeTracker,
    /// Whether the host finished subscribing to mode notifications
    subscribed: bool,
    /// `None` until initialized, and forever on unsupported platforms
    dispatcher: Option<Dispatcher>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the command set for `os` and prepare the subprocess search path,
    /// `inherited_path` being the `PATH` the editor runs with.
    pub fn initialize(
        &mut self,
        os: &str,
        config: &Config,
        inherited_path: &str,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Platform, InitError> {
        self.initialize_with(os, config, inherited_path, notifier, |path| {
            Arc::new(SystemShell::new(Some(path.to_owned())))
        })
    }

    /// Like [`Session::initialize`], with the shell built by `make_shell` from
    /// the extended search path.
    pub fn initialize_with<F>(
        &mut self,
        os: &str,
        config: &Config,
        inherited_path: &str,
        notifier: Arc<dyn Notifier>,
        make_shell: F,
    ) -> Result<Platform, InitError>
    where
        F: FnOnce(&str) -> Arc<dyn Shell>,
    {
        if self.initialized {
            return Err(InitError::AlreadyInitialized);
        }
        self.initialized = true;
        self.tracker.reset();

        let platform = Platform::from_os(os);
        self.platform = Some(platform);
        let Some(commands) = config.commands_for(platform) else {
            return Err(InitError::UnsupportedPlatform(os.to_owned()));
        };

        let search_path =
            platform.extend_search_path(&commands.controller_path, inherited_path);
        tracing::info!(%platform, search_path = %search_path, "initialized");
        let shell = make_shell(&search_path);
        self.search_path = Some(search_path);

        self.dispatcher = Some(Dispatcher::new(
            commands.clone(),
            shell,
            notifier,
            DispatchOptions {
                asynchronous: config.asynchronous,
                status: config.status,
            },
        ));
        Ok(platform)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    pub fn search_path(&self) -> Option<&str> {
        self.search_path.as_deref()
    }

    pub fn mode(&self) -> ModeState {
        self.tracker.state()
    }

    pub fn cached_im(&self) -> Option<String> {
        self.dispatcher.as_ref().map(Dispatcher::cached_im)
    }

    /// Forget the last observed mode, the next insert notification counts as
    /// an entry.
    pub fn reset_mode(&mut self) {
        self.tracker.reset();
    }

    /// Start tracking from the editor's current mode, e.g. when notifications
    /// are (re)subscribed while already in insert mode. Never dispatches.
    pub fn sync_mode(&mut self, mode: &str) {
        let state = self.tracker.sync(mode);
        tracing::debug!(mode, ?state, "synced mode");
    }

    /// `true` until [`Session::mark_subscribed`], so a host whose first
    /// subscription attempt failed retries on the next setup.
    pub fn needs_subscription(&self) -> bool {
        !self.subscribed
    }

    pub fn mark_subscribed(&mut self) {
        self.subscribed = true;
    }

    /// Feed a raw mode notification and dispatch on insert edges.
    pub fn handle_mode(&mut self, mode: &str) -> Option<Transition> {
        let transition = self.tracker.observe(mode)?;
        tracing::debug!(mode, ?transition, "insert edge");
        if let Some(dispatcher) = self.dispatcher.as_mut() {
            dispatcher.dispatch(transition);
        }
        Some(transition)
    }

    /// Run the on-enter sequence regardless of the tracked mode.
    pub fn enter(&mut self) {
        if let Some(dispatcher) = self.dispatcher.as_mut() {
            dispatcher.on_enter();
        }
    }

    /// Run the on-leave sequence regardless of the tracked mode.
    pub fn leave(&mut self) {
        if let Some(dispatcher) = self.dispatcher.as_mut() {
            dispatcher.on_leave();
        }
    }

    pub fn current_im(&self) -> Result<String, ShellError> {
        match self.dispatcher.as_ref() {
            Some(dispatcher) => dispatcher.current_im(),
            None => Err(ShellError::Disabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::SilentNotifier;
    use crate::testing::RecordingShell;

    fn session_on(
        os: &str,
        config: &Config,
        shell: &Arc<RecordingShell>,
    ) -> (Session, Result<Platform, InitError>) {
        let mut session = Session::new();
        let result = session.initialize_with(
            os,
            config,
            "/usr/bin:/bin",
            Arc::new(SilentNotifier),
            |_| shell.clone(),
        );
        (session, result)
    }

    #[test]
    fn macos_leave_captures_then_switches() {
        let shell = RecordingShell::new();
        shell.respond("im-select", "com.apple.inputmethod.SCIM.ITABC\n");
        let (mut session, result) = session_on("macos", &Config::default(), &shell);
        assert_eq!(result.unwrap(), Platform::MacOS);
        assert_eq!(session.cached_im().as_deref(), Some(""));

        session.leave();

        assert_eq!(shell.calls(), vec!["im-select", "im-select com.apple.keylayout.ABC"]);
        assert_eq!(session.cached_im().as_deref(), Some("com.apple.inputmethod.SCIM.ITABC"));
    }

    #[test]
    fn mode_notifications_drive_dispatch() {
        let shell = RecordingShell::new();
        shell.respond("fcitx5-remote -n", "rime\n");
        let (mut session, _) = session_on("linux", &Config::default(), &shell);

        assert_eq!(session.handle_mode("n"), None);
        assert_eq!(session.handle_mode("i"), Some(Transition::Enter));
        assert_eq!(session.handle_mode("ic"), None);
        assert_eq!(session.handle_mode("n"), Some(Transition::Leave));
        assert_eq!(session.handle_mode("no"), None);
        assert_eq!(session.handle_mode("i"), Some(Transition::Enter));

        assert_eq!(
            shell.calls(),
            vec![
                "fcitx5-remote -s ",
                "fcitx5-remote -n",
                "fcitx5-remote -s keyboard-us",
                "fcitx5-remote -s rime",
            ]
        );
    }

    #[test]
    fn unsupported_platform_never_runs_commands() {
        let shell = RecordingShell::new();
        let (mut session, result) = session_on("freebsd", &Config::default(), &shell);
        assert!(matches!(result, Err(InitError::UnsupportedPlatform(os)) if os == "freebsd"));
        assert_eq!(session.platform(), Some(Platform::Unsupported));
        assert!(session.is_initialized());

        for mode in ["i", "n", "i", "n"] {
            session.handle_mode(mode);
        }
        session.enter();
        session.leave();

        assert!(shell.calls().is_empty());
        assert!(matches!(session.current_im(), Err(ShellError::Disabled)));
        assert_eq!(session.search_path(), None);

        // still rejected, the degraded state is permanent
        let again = session.initialize_with(
            "linux",
            &Config::default(),
            "",
            Arc::new(SilentNotifier),
            |_| shell.clone(),
        );
        assert!(matches!(again, Err(InitError::AlreadyInitialized)));
        session.leave();
        assert!(shell.calls().is_empty());
    }

    #[test]
    fn second_initialize_keeps_first_search_path() {
        let mut session = Session::new();
        let config = Config::default();
        let platform = session
            .initialize("linux", &config, "/bin", Arc::new(SilentNotifier))
            .unwrap();
        assert_eq!(platform, Platform::Linux);
        assert_eq!(session.search_path(), Some("/usr/bin:/bin"));

        let again = session.initialize("linux", &config, "/opt/bin", Arc::new(SilentNotifier));
        assert!(matches!(again, Err(InitError::AlreadyInitialized)));
        assert_eq!(session.search_path(), Some("/usr/bin:/bin"));
    }

    #[test]
    fn blank_enter_leaves_without_capture() {
        let shell = RecordingShell::new();
        let mut config = Config::default();
        config.macos.on_enter.clear();
        let (mut session, _) = session_on("macos", &config, &shell);

        session.handle_mode("i");
        session.handle_mode("n");

        assert_eq!(shell.calls(), vec!["im-select com.apple.keylayout.ABC"]);
    }

    #[test]
    fn leave_fires_after_resubscribing_in_insert_mode() {
        let shell = RecordingShell::new();
        shell.respond("fcitx5-remote -n", "pinyin\n");
        let (mut session, _) = session_on("linux", &Config::default(), &shell);

        session.handle_mode("i");
        // switching turned off and on again from insert mode
        session.reset_mode();
        session.sync_mode("i");
        assert_eq!(session.mode(), ModeState::Insert);

        assert_eq!(session.handle_mode("n"), Some(Transition::Leave));
        assert_eq!(
            shell.calls(),
            vec![
                "fcitx5-remote -s ",
                "fcitx5-remote -n",
                "fcitx5-remote -s keyboard-us",
            ]
        );
    }

    #[test]
    fn subscription_is_retried_until_marked() {
        let shell = RecordingShell::new();
        let (mut session, _) = session_on("linux", &Config::default(), &shell);
        assert!(session.needs_subscription());

        // first registration failed, a later setup only hits the guard
        let again = session.initialize_with(
            "linux",
            &Config::default(),
            "",
            Arc::new(SilentNotifier),
            |_| shell.clone(),
        );
        assert!(matches!(again, Err(InitError::AlreadyInitialized)));
        assert!(session.needs_subscription());

        session.mark_subscribed();
        assert!(!session.needs_subscription());
    }

    #[test]
    fn reset_mode_rearms_enter() {
        let shell = RecordingShell::new();
        let (mut session, _) = session_on("windows", &Config::default(), &shell);

        session.handle_mode("i");
        session.reset_mode();
        assert_eq!(session.mode(), ModeState::NotInsert);
        assert_eq!(session.handle_mode("i"), Some(Transition::Enter));
        assert_eq!(shell.calls(), vec!["im-select.exe ", "im-select.exe "]);
    }
}

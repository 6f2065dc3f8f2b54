use im_switch_core::InitError;
use nvim_oxi::{
    self as oxi,
    api::{self, opts::SetKeymapOpts},
};

use crate::{
    lock_logged,
    plugin::{config::PluginConfig, get_state, PLUGIN_NAME},
};

use super::{
    autocmds::register_autocommands, commands::toggle_plugin, notify::NvimNotifier,
};

pub fn setup(config: Option<PluginConfig>) -> bool {
    let config = config.unwrap_or_default();
    let state = get_state();
    let mut state_guard = lock_logged!(state, "PLUGIN_STATE");

    if !state_guard.log_attempted {
        state_guard.log_attempted = true;
        match im_switch_core::log::init(None) {
            Ok(guard) => state_guard.log_guard = guard,
            Err(e) => {
                oxi::print!("{PLUGIN_NAME}: could not set up logging: {e}");
            }
        }
    }

    let notifier = match NvimNotifier::new() {
        Ok(notifier) => notifier,
        Err(e) => {
            oxi::print!("{PLUGIN_NAME}: could not set up status messages: {e}");
            return false;
        }
    };

    let inherited_path = std::env::var("PATH").unwrap_or_default();
    match state_guard.session.initialize(
        std::env::consts::OS,
        &config.commands(),
        &inherited_path,
        notifier,
    ) {
        Ok(platform) => tracing::info!(%platform, "{PLUGIN_NAME} set up"),
        Err(e @ InitError::AlreadyInitialized) => {
            if !state_guard.session.needs_subscription() {
                tracing::warn!("setup: {e}");
                return true;
            }
            tracing::warn!("setup: {e}, retrying registration");
        }
        Err(e @ InitError::UnsupportedPlatform(_)) => {
            tracing::error!("setup: {e}");
            oxi::print!("{PLUGIN_NAME}: {e}");
        }
    }
    if state_guard.config.is_none() {
        state_guard.config = Some(config);
    }
    // drop to not block
    drop(state_guard);

    if let Err(e) = crate::neovim::commands::register_commands() {
        oxi::print!("{PLUGIN_NAME}: Could not setup commands: {e}");
        return false;
    }

    if let Err(e) = register_autocommands(state.clone()) {
        oxi::print!("{PLUGIN_NAME}: Could not setup autocommands: {e}");
        return false;
    }

    let on_key = lock_logged!(state, "PLUGIN_STATE")
        .config
        .as_ref()
        .and_then(|config| config.on_key.clone());
    if let Some(on_key) = on_key {
        if let Err(e) = bind_toggle_key(&on_key) {
            oxi::print!(
                "{PLUGIN_NAME}: Could not setup toggle keymap for '{on_key}': {e}"
            );
            return false;
        }
    }

    lock_logged!(state, "PLUGIN_STATE").session.mark_subscribed();
    true
}

fn bind_toggle_key(on_key: &str) -> oxi::Result<()> {
    for mode in [api::types::Mode::Normal, api::types::Mode::Insert] {
        api::set_keymap(
            mode,
            on_key,
            "",
            &SetKeymapOpts::builder()
                .noremap(true)
                .silent(true)
                .callback(move |_| toggle_plugin(get_state()))
                .build(),
        )?;
    }
    Ok(())
}

// must accept 1 parameter, use `()` to let the exported lua function take no parameter
pub fn current_im(_: ()) -> oxi::String {
    let state = get_state();
    let state_guard = lock_logged!(state, "PLUGIN_STATE");
    match state_guard.session.current_im() {
        Ok(im) => im.into(),
        Err(e) => {
            tracing::debug!("current_im: {e}");
            "".into()
        }
    }
}

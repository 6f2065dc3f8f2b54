//! Command definitions for Neovim plugin

use std::sync::{Arc, Mutex};

use nvim_oxi::{
    self as oxi,
    api::{self, opts::CreateCommandOpts},
};

use crate::{
    lock_logged,
    plugin::{get_state, ImSwitchPlugin, PLUGIN_NAME},
};

use super::autocmds::{deregister_autocommands, register_autocommands};

/// Register all plugin commands
pub fn register_commands() -> oxi::Result<()> {
    api::create_user_command(
        "ImSwitchEnable",
        move |_| enable_plugin(get_state()),
        &CreateCommandOpts::builder()
            .desc("Switch input methods on insert mode changes")
            .build(),
    )?;

    api::create_user_command(
        "ImSwitchDisable",
        move |_| disable_plugin(get_state()),
        &CreateCommandOpts::builder()
            .desc("Stop switching input methods")
            .build(),
    )?;

    api::create_user_command(
        "ImSwitchToggle",
        move |_| toggle_plugin(get_state()),
        &CreateCommandOpts::builder()
            .desc("Toggle input method switching")
            .build(),
    )?;

    api::create_user_command(
        "ImSwitchEnter",
        move |_| {
            let state = get_state();
            let mut state_guard = lock_logged!(state, "PLUGIN_STATE");
            state_guard.session.enter();
            Ok::<_, oxi::Error>(())
        },
        &CreateCommandOpts::builder()
            .desc("Restore the input method cached on the last leave")
            .build(),
    )?;

    api::create_user_command(
        "ImSwitchLeave",
        move |_| {
            let state = get_state();
            let mut state_guard = lock_logged!(state, "PLUGIN_STATE");
            state_guard.session.leave();
            Ok::<_, oxi::Error>(())
        },
        &CreateCommandOpts::builder()
            .desc("Cache the current input method and switch to the leave one")
            .build(),
    )?;

    api::create_user_command(
        "ImSwitchInfo",
        move |_| {
            let state = get_state();
            let state_guard = lock_logged!(state, "PLUGIN_STATE");
            oxi::print!("{}", describe(&state_guard));
            Ok::<_, oxi::Error>(())
        },
        &CreateCommandOpts::builder()
            .desc("Show platform, cached and current input method")
            .build(),
    )?;

    Ok(())
}

fn describe(plugin: &ImSwitchPlugin) -> String {
    let session = &plugin.session;
    let platform = session
        .platform()
        .map_or("not initialized".to_owned(), |p| p.to_string());
    let current = session
        .current_im()
        .unwrap_or_else(|e| format!("<{e}>"));
    let mut lines = vec![
        format!("{PLUGIN_NAME}: {}", if plugin.enabled() { "enabled" } else { "disabled" }),
        format!("platform: {platform}"),
        format!("mode: {:?}", session.mode()),
        format!("cached input method: {}", session.cached_im().unwrap_or_default()),
        format!("current input method: {current}"),
    ];
    if let Some(config) = plugin.config.as_ref() {
        let commands = config.commands();
        lines.push(format!(
            "async: {}, status messages: {}",
            commands.asynchronous, commands.status
        ));
        if let Some(on_key) = config.on_key.as_deref() {
            lines.push(format!("toggle key: {on_key}"));
        }
    }
    if let Some(path) = session.search_path() {
        lines.push(format!("search path: {path}"));
    }
    if let Some(guard) = plugin.log_guard.as_ref() {
        lines.push(format!("log file: {}", guard.log_file.display()));
    }
    lines.join("\n")
}

pub fn enable_plugin(state: Arc<Mutex<ImSwitchPlugin>>) -> oxi::Result<()> {
    let state_guard = lock_logged!(state, "PLUGIN_STATE");
    if state_guard.enabled() {
        oxi::print!("{PLUGIN_NAME}: already enabled");
        return Ok(());
    }
    drop(state_guard);
    register_autocommands(state)
}

pub fn disable_plugin(state: Arc<Mutex<ImSwitchPlugin>>) -> oxi::Result<()> {
    let state_guard = lock_logged!(state, "PLUGIN_STATE");
    if !state_guard.enabled() {
        oxi::print!("{PLUGIN_NAME}: already disabled");
        return Ok(());
    }
    drop(state_guard);
    deregister_autocommands(state)
}

pub fn toggle_plugin(state: Arc<Mutex<ImSwitchPlugin>>) -> oxi::Result<()> {
    let state_guard = lock_logged!(state, "PLUGIN_STATE");
    if state_guard.enabled() {
        drop(state_guard);
        disable_plugin(state)
    } else {
        drop(state_guard);
        enable_plugin(state)
    }
}

//! Autocommand setup for Neovim

use std::sync::{Arc, Mutex};

use nvim_oxi::{
    self as oxi,
    api::{
        self,
        opts::{CreateAugroupOpts, CreateAutocmdOpts},
    },
    conversion::FromObject,
    Array, Error as OxiError,
};
use serde::Deserialize;

use crate::{
    lock_logged,
    plugin::{get_state, ImSwitchPlugin},
    utils::as_api_error,
};

pub static AUGROUP_NAME: &str = "im-switch-nvim";

/// The part of `v:event` we need during `ModeChanged`
#[derive(Deserialize)]
struct ModeChangedEvent {
    #[serde(default)]
    new_mode: String,
}

impl FromObject for ModeChangedEvent {
    fn from_object(obj: oxi::Object) -> Result<Self, oxi::conversion::Error> {
        Self::deserialize(oxi::serde::Deserializer::new(obj)).map_err(Into::into)
    }
}

fn new_mode() -> oxi::Result<String> {
    let event: oxi::Object = api::get_vvar("event")?;
    let event = ModeChangedEvent::from_object(event).map_err(as_api_error)?;
    Ok(event.new_mode)
}

/// `mode(1)`, the same identifiers `ModeChanged` reports
fn current_mode() -> oxi::Result<String> {
    Ok(api::call_function::<_, String>("mode", Array::from_iter([1]))?)
}

fn on_mode_changed(state: Arc<Mutex<ImSwitchPlugin>>) {
    let mode = match new_mode() {
        Ok(mode) => mode,
        Err(e) => {
            tracing::error!("could not read v:event: {e}");
            return;
        }
    };
    let mut state_guard = lock_logged!(state, "PLUGIN_STATE");
    state_guard.session.handle_mode(&mode);
}

/// Register the `ModeChanged` autocommand. Re-registering replaces the group.
/// Tracking starts from the current mode, so enabling from insert mode still
/// switches on the next leave.
pub fn register_autocommands(state: Arc<Mutex<ImSwitchPlugin>>) -> oxi::Result<()> {
    let mut state_guard = lock_logged!(state, "PLUGIN_STATE");

    let augroup_id = api::create_augroup(
        AUGROUP_NAME,
        &CreateAugroupOpts::builder().clear(true).build(),
    )?;
    state_guard.augroup_id = Some(augroup_id);
    // the callback locks the state too
    drop(state_guard);

    let opts = CreateAutocmdOpts::builder()
        .group(augroup_id)
        .desc("Switch input method when entering or leaving insert mode")
        .callback(move |_| {
            on_mode_changed(get_state());
            Ok::<_, OxiError>(false) // NB: return false to keep this autocmd
        })
        .build();
    api::create_autocmd(["ModeChanged"], &opts)?;

    match current_mode() {
        Ok(mode) => lock_logged!(state, "PLUGIN_STATE").session.sync_mode(&mode),
        Err(e) => tracing::warn!("could not read the current mode: {e}"),
    }

    Ok(())
}

/// Delete the autocommand group and forget the tracked mode.
pub fn deregister_autocommands(state: Arc<Mutex<ImSwitchPlugin>>) -> oxi::Result<()> {
    let mut state_guard = lock_logged!(state, "PLUGIN_STATE");
    if let Some(augroup_id) = state_guard.augroup_id.take() {
        api::del_augroup_by_id(augroup_id)?;
    }
    state_guard.session.reset_mode();
    Ok(())
}

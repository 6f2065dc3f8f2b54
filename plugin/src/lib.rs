//! Input method switching for Neovim
//!
//! Runs user configured shell commands when entering and leaving insert
//! mode, restoring the input method that was active before leaving.

mod neovim;
mod plugin;
mod utils;

use nvim_oxi::{self as oxi, Dictionary, Function, Object};

#[oxi::plugin]
fn im_switch() -> oxi::Dictionary {
    Dictionary::from_iter([
        ("setup", Object::from(Function::from_fn(neovim::functions::setup))),
        (
            "current_im",
            Object::from(Function::from_fn(neovim::functions::current_im)),
        ),
    ])
}

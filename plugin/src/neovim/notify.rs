//! Status messages from the dispatcher, shown on the main loop

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use im_switch_core::{Notifier, Severity};
use nvim_oxi::{self as oxi, libuv::AsyncHandle};

use crate::{lock_logged, plugin::PLUGIN_NAME};

type Pending = Arc<Mutex<VecDeque<(Severity, String)>>>;

/// Queues messages from any thread and wakes Neovim to print them.
pub struct NvimNotifier {
    pending: Pending,
    trigger: Mutex<AsyncHandle>,
}

impl NvimNotifier {
    /// Must be called on the main thread.
    pub fn new() -> oxi::Result<Arc<Self>> {
        let pending: Pending = Arc::default();
        let trigger = AsyncHandle::new({
            let pending = pending.clone();
            move || {
                let messages: Vec<_> =
                    lock_logged!(pending, "status queue").drain(..).collect();
                // NB: printing from the libuv callback itself is not allowed
                oxi::schedule(move |_| {
                    for (severity, message) in messages {
                        match severity {
                            Severity::Info => {
                                oxi::print!("{PLUGIN_NAME}: {message}");
                            }
                            Severity::Error => {
                                oxi::print!("{PLUGIN_NAME}: error: {message}");
                            }
                        }
                    }
                });
                Ok::<_, oxi::Error>(())
            }
        })?;
        Ok(Arc::new(Self {
            pending,
            trigger: Mutex::new(trigger),
        }))
    }
}

impl Notifier for NvimNotifier {
    fn notify(&self, severity: Severity, message: String) {
        lock_logged!(self.pending, "status queue").push_back((severity, message));
        if let Err(e) = lock_logged!(self.trigger, "status trigger").send() {
            tracing::error!("could not wake the main loop for status messages: {e}");
        }
    }
}

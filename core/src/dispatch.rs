//! Turns insert transitions into controller command sequences

use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use crate::error::ShellError;
use crate::mode::Transition;
use crate::platform::{render_template, PlatformCommandSet};
use crate::shell::Shell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Receives status messages meant for the user. Called from the worker
/// thread in asynchronous mode.
pub trait Notifier: Send + Sync {
    fn notify(&self, severity: Severity, message: String);
}

/// Drops every message.
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _severity: Severity, _message: String) {}
}

/// One subprocess invocation of a sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Run the command and cache its trimmed output as the current IM
    Capture(String),
    /// Render the template with the cached IM when the step runs, then run it
    Enter(String),
    /// Run the command, output is discarded
    Run(String),
}

pub type Sequence = Vec<Step>;

#[derive(Clone, Copy, Debug, Default)]
pub struct DispatchOptions {
    pub asynchronous: bool,
    pub status: bool,
}

/// Runs sequences. Shared with the worker thread.
struct Executor {
    shell: Arc<dyn Shell>,
    notifier: Arc<dyn Notifier>,
    cached_im: Mutex<String>,
    status: bool,
}

impl Executor {
    fn run_sequence(&self, sequence: &[Step]) {
        // each step stands on its own, a failed capture must not keep the
        // leave command from running
        for step in sequence {
            self.run_step(step);
        }
    }

    fn run_step(&self, step: &Step) {
        match step {
            Step::Capture(command) => match self.shell.run(command) {
                Ok(output) => {
                    let im = output.trim().to_owned();
                    tracing::info!(im = %im, "captured input method");
                    *self.lock_cache() = im;
                }
                Err(e) => self.report_failure(e),
            },
            Step::Enter(template) => {
                let command = render_template(template, &self.lock_cache());
                self.run_reported(&command);
            }
            Step::Run(command) => self.run_reported(command),
        }
    }

    fn run_reported(&self, command: &str) {
        match self.shell.run(command) {
            Ok(_) => {
                tracing::info!(command, "switched input method");
                if self.status {
                    self.notifier.notify(Severity::Info, format!("ran `{command}`"));
                }
            }
            Err(e) => self.report_failure(e),
        }
    }

    fn report_failure(&self, e: ShellError) {
        tracing::error!("{e}");
        if self.status {
            self.notifier.notify(Severity::Error, e.to_string());
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, String> {
        self.cached_im
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct Dispatcher {
    commands: PlatformCommandSet,
    executor: Arc<Executor>,
    asynchronous: bool,
    worker: Option<mpsc::Sender<Sequence>>,
}

impl Dispatcher {
    pub fn new(
        commands: PlatformCommandSet,
        shell: Arc<dyn Shell>,
        notifier: Arc<dyn Notifier>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            commands,
            executor: Arc::new(Executor {
                shell,
                notifier,
                cached_im: Mutex::new(String::new()),
                status: options.status,
            }),
            asynchronous: options.asynchronous,
            worker: None,
        }
    }

    pub fn commands(&self) -> &PlatformCommandSet {
        &self.commands
    }

    pub fn cached_im(&self) -> String {
        self.executor.lock_cache().clone()
    }

    /// Steps for entering insert mode, `None` when restoring is disabled.
    pub fn enter_sequence(&self) -> Option<Sequence> {
        self.commands
            .enter_enabled()
            .then(|| vec![Step::Enter(self.commands.on_enter.clone())])
    }

    /// Steps for leaving insert mode, `None` when no leave command is set.
    /// The current IM is captured first when it will be restored later.
    pub fn leave_sequence(&self) -> Option<Sequence> {
        if !self.commands.leave_enabled() {
            return None;
        }
        let mut sequence = Vec::with_capacity(2);
        if self.commands.enter_enabled() {
            sequence.push(Step::Capture(self.commands.get_current.clone()));
        }
        sequence.push(Step::Run(self.commands.on_leave.clone()));
        Some(sequence)
    }

    pub fn on_enter(&mut self) {
        if let Some(sequence) = self.enter_sequence() {
            self.run_sequence(sequence);
        }
    }

    pub fn on_leave(&mut self) {
        if let Some(sequence) = self.leave_sequence() {
            self.run_sequence(sequence);
        }
    }

    pub fn dispatch(&mut self, transition: Transition) {
        match transition {
            Transition::Enter => self.on_enter(),
            Transition::Leave => self.on_leave(),
        }
    }

    /// Ask the controller for the active IM without touching the cache.
    /// Always blocks.
    pub fn current_im(&self) -> Result<String, ShellError> {
        if self.commands.get_current.is_empty() {
            return Err(ShellError::Disabled);
        }
        self.executor
            .shell
            .run(&self.commands.get_current)
            .map(|output| output.trim().to_owned())
    }

    /// Run inline, or queue on the worker. The worker handles one sequence at
    /// a time in submission order.
    pub fn run_sequence(&mut self, sequence: Sequence) {
        if !self.asynchronous {
            self.executor.run_sequence(&sequence);
            return;
        }

        self.ensure_worker();
        if let Some(worker) = &self.worker {
            match worker.send(sequence) {
                Ok(()) => return,
                Err(mpsc::SendError(sequence)) => {
                    tracing::error!("worker is gone, running inline");
                    self.worker = None;
                    self.executor.run_sequence(&sequence);
                    return;
                }
            }
        }
        self.executor.run_sequence(&sequence);
    }

    fn ensure_worker(&mut self) {
        if self.worker.is_none() {
            let (tx, rx) = mpsc::channel::<Sequence>();
            let executor = self.executor.clone();
            let spawned = thread::Builder::new()
                .name("im-switch-worker".to_owned())
                .spawn(move || {
                    for sequence in rx {
                        executor.run_sequence(&sequence);
                    }
                    tracing::debug!("worker stopped");
                });
            match spawned {
                Ok(_) => self.worker = Some(tx),
                Err(e) => tracing::error!("could not start worker thread: {e}"),
            }
        }
    }
}

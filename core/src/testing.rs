//! Fakes for the subprocess and status seams

use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};

use crate::dispatch::{Notifier, Severity};
use crate::error::ShellError;
use crate::shell::Shell;

/// Records every command line. Unknown commands succeed with empty output.
#[derive(Default)]
pub struct RecordingShell {
    outputs: Mutex<HashMap<String, Result<String, i32>>>,
    calls: Mutex<Vec<String>>,
    events: Mutex<Option<mpsc::Sender<String>>>,
}

impl RecordingShell {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, command: &str, output: &str) {
        self.outputs
            .lock()
            .unwrap()
            .insert(command.to_owned(), Ok(output.to_owned()));
    }

    pub fn fail(&self, command: &str, code: i32) {
        self.outputs
            .lock()
            .unwrap()
            .insert(command.to_owned(), Err(code));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Every command run from now on is also sent to the returned receiver.
    pub fn subscribe(&self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel();
        *self.events.lock().unwrap() = Some(tx);
        rx
    }
}

impl Shell for RecordingShell {
    fn run(&self, command: &str) -> Result<String, ShellError> {
        self.calls.lock().unwrap().push(command.to_owned());
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(command.to_owned());
        }
        match self.outputs.lock().unwrap().get(command) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(code)) => Err(ShellError::Failed {
                command: command.to_owned(),
                status: Some(*code),
                stderr: String::new(),
            }),
            None => Ok(String::new()),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, severity: Severity, message: String) {
        self.messages.lock().unwrap().push((severity, message));
    }
}

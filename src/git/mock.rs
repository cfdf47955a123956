use crate::error::{AttributionError, Result};
use crate::git::{Shell, ShellCommand};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

type Responder = Arc<dyn Fn(&ShellCommand) -> Result<String> + Send + Sync>;

#[derive(Default)]
struct MockState {
    calls: Vec<ShellCommand>,
    interactive: Vec<ShellCommand>,
    queued: VecDeque<Result<String>>,
    responder: Option<Responder>,
}

/// Shell double for tests without a real git repository
///
/// Every command is recorded. Output comes from the queue of scripted results
/// first, then from the responder closure, and is empty otherwise. Clones
/// share state, so a test can hand one clone to a `Project` and inspect the
/// recorded calls through another.
#[derive(Clone, Default)]
pub struct MockShell {
    state: Arc<Mutex<MockState>>,
}

impl MockShell {
    /// Create a mock that answers every command with empty output
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers with `responder` once the queue is empty
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&ShellCommand) -> Result<String> + Send + Sync + 'static,
    {
        let shell = Self::new();
        shell.lock().responder = Some(Arc::new(responder));
        shell
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recorded calls
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue the output of the next command
    pub fn push_output(&self, output: impl Into<String>) -> &Self {
        self.lock().queued.push_back(Ok(output.into()));
        self
    }

    /// Queue a non-zero exit for the next command
    pub fn push_failure(&self, exit_code: i32) -> &Self {
        self.lock().queued.push_back(Err(Self::failure("", exit_code)));
        self
    }

    /// Build the error a failing command would produce
    pub fn failure(command: &str, exit_code: i32) -> AttributionError {
        AttributionError::ExternalCommand {
            command: command.to_string(),
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: "mock failure".to_string(),
        }
    }

    /// Every captured command run so far, oldest first
    pub fn calls(&self) -> Vec<ShellCommand> {
        self.lock().calls.clone()
    }

    /// Captured commands as argument vectors, for terse assertions
    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.calls()
            .iter()
            .map(|c| c.argv().into_iter().map(String::from).collect())
            .collect()
    }

    /// The most recent captured command
    pub fn last_call(&self) -> Option<ShellCommand> {
        self.lock().calls.last().cloned()
    }

    /// Commands run through [Shell::run_interactive]
    pub fn interactive_calls(&self) -> Vec<ShellCommand> {
        self.lock().interactive.clone()
    }

    /// Forget recorded calls, keeping queued output and the responder
    pub fn reset_calls(&self) {
        let mut state = self.lock();
        state.calls.clear();
        state.interactive.clear();
    }
}

impl Shell for MockShell {
    fn run(&self, command: &ShellCommand) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(command.clone());

        if let Some(result) = state.queued.pop_front() {
            return result.map_err(|err| match err {
                AttributionError::ExternalCommand {
                    exit_code,
                    stdout,
                    stderr,
                    ..
                } => AttributionError::ExternalCommand {
                    command: command.to_string(),
                    exit_code,
                    stdout,
                    stderr,
                },
                other => other,
            });
        }

        // Released before answering so a responder may use the shell itself
        let responder = state.responder.clone();
        drop(state);

        match responder {
            Some(responder) => responder(command),
            None => Ok(String::new()),
        }
    }

    fn run_interactive(&self, command: &ShellCommand) -> Result<()> {
        self.lock().interactive.push(command.clone());
        Ok(())
    }
}

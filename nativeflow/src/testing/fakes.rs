//! In-memory collaborators for pipeline tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::adapters::{CommandRunner, CommandSpec, DeviceChooser};
use crate::context::Device;
use crate::errors::{NativeflowError, ProcessError};

#[derive(Debug, Clone)]
enum Reply {
    Stdout(String),
    Fail(String),
}

/// A [`CommandRunner`] that records commands instead of running them.
///
/// Replies are keyed by the program and its first argument (`"xcodebuild
/// -list"`), falling back to the program alone. Unknown commands succeed
/// with empty output.
#[derive(Debug, Default)]
pub struct RecordingCommandRunner {
    replies: Mutex<HashMap<String, Reply>>,
    commands: Mutex<Vec<CommandSpec>>,
}

impl RecordingCommandRunner {
    /// Creates a runner where every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers commands matching `key` with `stdout`.
    #[must_use]
    pub fn with_stdout(self, key: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.replies.lock().insert(key.into(), Reply::Stdout(stdout.into()));
        self
    }

    /// Makes commands matching `key` fail to start with `message`.
    #[must_use]
    pub fn with_failure(self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.replies.lock().insert(key.into(), Reply::Fail(message.into()));
        self
    }

    /// Every command run so far.
    #[must_use]
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().clone()
    }

    /// Commands run for `program`.
    #[must_use]
    pub fn commands_for(&self, program: &str) -> Vec<CommandSpec> {
        self.commands
            .lock()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }

    fn reply_for(&self, command: &CommandSpec) -> Option<Reply> {
        let replies = self.replies.lock();
        command
            .args
            .first()
            .and_then(|first| replies.get(&format!("{} {first}", command.program)))
            .or_else(|| replies.get(&command.program))
            .cloned()
    }
}

#[async_trait]
impl CommandRunner for RecordingCommandRunner {
    async fn run(&self, command: &CommandSpec) -> Result<String, ProcessError> {
        self.commands.lock().push(command.clone());
        match self.reply_for(command) {
            Some(Reply::Stdout(stdout)) => Ok(stdout),
            Some(Reply::Fail(message)) => Err(ProcessError::Spawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, message),
            }),
            None => Ok(String::new()),
        }
    }
}

/// A [`DeviceChooser`] that always picks the same index.
#[derive(Debug)]
pub struct ScriptedChooser {
    index: usize,
    prompts: Mutex<Vec<Vec<Device>>>,
}

impl ScriptedChooser {
    /// Creates a chooser answering `index`.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self {
            index,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of prompts shown.
    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Candidate lists shown, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<Vec<Device>> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl DeviceChooser for ScriptedChooser {
    async fn choose(&self, devices: &[Device]) -> Result<usize, NativeflowError> {
        self.prompts.lock().push(devices.to_vec());
        Ok(self.index)
    }
}

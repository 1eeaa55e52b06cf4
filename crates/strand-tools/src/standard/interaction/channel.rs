use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use strand_core::ChannelError;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};

/// Conversation with the person on the other side of a run.
#[async_trait]
pub trait HumanChannel: Send + Sync {
    /// Show `prompt` and wait for one line of answer (trimmed).
    async fn ask(&self, prompt: &str) -> Result<String, ChannelError>;

    /// Show a message that needs no answer.
    async fn notify(&self, message: &str) -> Result<(), ChannelError>;
}

/// Terminal channel over the process's stdin/stdout.
pub struct ConsoleChannel {
    input: tokio::sync::Mutex<BufReader<Stdin>>,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self {
            input: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }

    async fn write(&self, text: &str) -> Result<(), ChannelError> {
        let mut out = tokio::io::stdout();
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HumanChannel for ConsoleChannel {
    async fn ask(&self, prompt: &str) -> Result<String, ChannelError> {
        // One question at a time; concurrent asks would interleave on the terminal.
        let mut input = self.input.lock().await;
        let rule = "=".repeat(50);
        self.write(&format!("\n{rule}\nBot: {prompt}\n{rule}\nYou: "))
            .await?;

        let mut line = String::new();
        if input.read_line(&mut line).await? == 0 {
            return Err(ChannelError::Closed);
        }
        Ok(line.trim().to_string())
    }

    async fn notify(&self, message: &str) -> Result<(), ChannelError> {
        self.write(&format!("{message}\n")).await
    }
}

/// Channel that answers from a fixed script and records what it was shown.
///
/// Running out of answers behaves like a closed terminal.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedChannel {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Queue another answer.
    pub fn push_answer(&self, answer: impl Into<String>) {
        locked(&self.answers).push_back(answer.into());
    }

    /// Every prompt shown so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        locked(&self.prompts).clone()
    }

    /// Every notification shown so far, in order.
    pub fn notices(&self) -> Vec<String> {
        locked(&self.notices).clone()
    }

    pub fn remaining(&self) -> usize {
        locked(&self.answers).len()
    }
}

#[async_trait]
impl HumanChannel for ScriptedChannel {
    async fn ask(&self, prompt: &str) -> Result<String, ChannelError> {
        locked(&self.prompts).push(prompt.to_string());
        locked(&self.answers)
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or(ChannelError::Closed)
    }

    async fn notify(&self, message: &str) -> Result<(), ChannelError> {
        locked(&self.notices).push(message.to_string());
        Ok(())
    }
}

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::{Arc, LazyLock};
use strand_core::{ExecutionResult, FailureReason, Tool};
use tracing::{info, warn};

use super::channel::HumanChannel;

/// Attempts a validated prompt gets before it fails.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@(.+)$").ok());

/// All five interaction tools sharing one channel.
pub fn interaction_tools(channel: Arc<dyn HumanChannel>) -> Vec<Arc<dyn Tool>> {
    interaction_tools_with_retries(channel, DEFAULT_MAX_RETRIES)
}

pub fn interaction_tools_with_retries(
    channel: Arc<dyn HumanChannel>,
    max_retries: u32,
) -> Vec<Arc<dyn Tool>> {
    let asker = Asker::new(channel, max_retries);
    vec![
        Arc::new(AskQuestionTool { asker: asker.clone() }),
        Arc::new(AskChoiceTool { asker: asker.clone() }),
        Arc::new(AskConfirmationTool { asker: asker.clone() }),
        Arc::new(AskNumberTool { asker: asker.clone() }),
        Arc::new(AskEmailTool { asker }),
    ]
}

/// Shared prompting logic.
#[derive(Clone)]
struct Asker {
    channel: Arc<dyn HumanChannel>,
    max_retries: u32,
}

impl Asker {
    fn new(channel: Arc<dyn HumanChannel>, max_retries: u32) -> Self {
        Self {
            channel,
            max_retries: max_retries.max(1),
        }
    }

    async fn ask(&self, prompt: &str) -> Result<String, FailureReason> {
        self.channel
            .ask(prompt)
            .await
            .map_err(|e| FailureReason::IoError {
                message: e.to_string(),
            })
    }

    /// Ask until `parse` accepts the answer or attempts run out.
    async fn ask_validated<T, F>(
        &self,
        prompt: &str,
        hint: &str,
        parse: F,
    ) -> Result<T, FailureReason>
    where
        F: Fn(&str) -> Option<T> + Send,
        T: Send,
    {
        for attempt in 1..=self.max_retries {
            let answer = self.ask(prompt).await?;
            if let Some(value) = parse(&answer) {
                return Ok(value);
            }
            warn!(attempt, max = self.max_retries, answer = %answer, "rejected human answer");
            if attempt < self.max_retries {
                let notice = format!("{hint} ({attempt}/{})", self.max_retries);
                // Best effort; the next ask surfaces a broken channel.
                let _ = self.channel.notify(&notice).await;
            }
        }
        Err(FailureReason::InvalidInput {
            message: format!("no valid answer after {} attempts", self.max_retries),
        })
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, FailureReason> {
    serde_json::from_value(params).map_err(|e| FailureReason::InvalidInput {
        message: format!("invalid parameters: {e}"),
    })
}

fn non_blank(question: &str) -> Result<&str, FailureReason> {
    let question = question.trim();
    if question.is_empty() {
        Err(FailureReason::InvalidInput {
            message: "question must not be empty".into(),
        })
    } else {
        Ok(question)
    }
}

fn finish(result: Result<String, FailureReason>) -> ExecutionResult {
    match result {
        Ok(output) => ExecutionResult::success(output),
        Err(reason) => ExecutionResult::failed(reason),
    }
}

fn question_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "question": { "type": "string" } },
        "required": ["question"]
    })
}

#[derive(Deserialize)]
struct QuestionParams {
    question: String,
}

/// Free-text question.
pub struct AskQuestionTool {
    asker: Asker,
}

impl AskQuestionTool {
    pub fn new(channel: Arc<dyn HumanChannel>) -> Self {
        Self {
            asker: Asker::new(channel, DEFAULT_MAX_RETRIES),
        }
    }

    async fn run(&self, params: Value) -> Result<String, FailureReason> {
        let p: QuestionParams = parse_params(params)?;
        let question = non_blank(&p.question)?;
        info!(question, "asking user");
        let answer = self.asker.ask(question).await?;
        if answer.is_empty() {
            return Err(FailureReason::InvalidInput {
                message: "the user gave an empty answer".into(),
            });
        }
        Ok(answer)
    }
}

#[async_trait]
impl Tool for AskQuestionTool {
    fn name(&self) -> &str {
        "ask_question"
    }

    fn description(&self) -> &str {
        "Ask the user a question and return their text answer. Use when you need information, an opinion or instructions from the user."
    }

    fn parameters(&self) -> Value {
        question_schema()
    }

    async fn invoke(&self, params: Value) -> ExecutionResult {
        finish(self.run(params).await)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceOptions {
    List(Vec<String>),
    /// Comma-separated.
    Csv(String),
}

impl ChoiceOptions {
    fn into_vec(self) -> Vec<String> {
        let raw = match self {
            ChoiceOptions::List(list) => list,
            ChoiceOptions::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect()
    }
}

#[derive(Deserialize)]
struct ChoiceParams {
    question: String,
    options: ChoiceOptions,
}

/// Multiple-choice question; returns the chosen option's text.
pub struct AskChoiceTool {
    asker: Asker,
}

impl AskChoiceTool {
    pub fn new(channel: Arc<dyn HumanChannel>) -> Self {
        Self {
            asker: Asker::new(channel, DEFAULT_MAX_RETRIES),
        }
    }

    async fn run(&self, params: Value) -> Result<String, FailureReason> {
        let p: ChoiceParams = parse_params(params)?;
        let question = non_blank(&p.question)?;
        let options = p.options.into_vec();
        if options.is_empty() {
            return Err(FailureReason::InvalidInput {
                message: "at least one option is required".into(),
            });
        }

        let n = options.len();
        let mut prompt = format!("{question}\n\nOptions:");
        for (i, option) in options.iter().enumerate() {
            prompt.push_str(&format!("\n{}. {option}", i + 1));
        }
        prompt.push_str(&format!("\n\nEnter an option number (1-{n}):"));

        info!(question, options = n, "offering choice");
        let hint = format!("Please enter a valid option number (1-{n})");
        let index = self
            .asker
            .ask_validated(&prompt, &hint, |answer| {
                answer
                    .parse::<usize>()
                    .ok()
                    .filter(|k| (1..=n).contains(k))
                    .map(|k| k - 1)
                    .or_else(|| options.iter().position(|o| o.eq_ignore_ascii_case(answer)))
            })
            .await?;
        Ok(options[index].clone())
    }
}

#[async_trait]
impl Tool for AskChoiceTool {
    fn name(&self) -> &str {
        "ask_choice"
    }

    fn description(&self) -> &str {
        "Offer the user several options and return the text of the option they pick. `options` is a list or a comma-separated string."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": { "type": "string" },
                "options": {
                    "oneOf": [
                        { "type": "array", "items": { "type": "string" } },
                        { "type": "string" }
                    ]
                }
            },
            "required": ["question", "options"]
        })
    }

    async fn invoke(&self, params: Value) -> ExecutionResult {
        finish(self.run(params).await)
    }
}

/// Yes/no question; returns `confirmed` or `declined`.
pub struct AskConfirmationTool {
    asker: Asker,
}

impl AskConfirmationTool {
    pub fn new(channel: Arc<dyn HumanChannel>) -> Self {
        Self {
            asker: Asker::new(channel, DEFAULT_MAX_RETRIES),
        }
    }

    async fn run(&self, params: Value) -> Result<String, FailureReason> {
        let p: QuestionParams = parse_params(params)?;
        let question = non_blank(&p.question)?;
        let prompt = format!("{question} (y/yes to confirm, n/no to decline)");
        let confirmed = self
            .asker
            .ask_validated(
                &prompt,
                "Please answer y/yes or n/no",
                |answer| match answer.to_lowercase().as_str() {
                    "y" | "yes" => Some(true),
                    "n" | "no" => Some(false),
                    _ => None,
                },
            )
            .await?;
        info!(question, confirmed, "user answered confirmation");
        Ok(if confirmed { "confirmed" } else { "declined" }.to_string())
    }
}

#[async_trait]
impl Tool for AskConfirmationTool {
    fn name(&self) -> &str {
        "ask_confirmation"
    }

    fn description(&self) -> &str {
        "Ask the user to confirm an action. Returns 'confirmed' or 'declined'."
    }

    fn parameters(&self) -> Value {
        question_schema()
    }

    async fn invoke(&self, params: Value) -> ExecutionResult {
        finish(self.run(params).await)
    }
}

#[derive(Deserialize)]
struct NumberParams {
    question: String,
    min: i64,
    max: i64,
}

/// Integer within an inclusive range.
pub struct AskNumberTool {
    asker: Asker,
}

impl AskNumberTool {
    pub fn new(channel: Arc<dyn HumanChannel>) -> Self {
        Self {
            asker: Asker::new(channel, DEFAULT_MAX_RETRIES),
        }
    }

    async fn run(&self, params: Value) -> Result<String, FailureReason> {
        let p: NumberParams = parse_params(params)?;
        let question = non_blank(&p.question)?;
        let (min, max) = (p.min, p.max);
        if min > max {
            return Err(FailureReason::InvalidInput {
                message: format!("empty range {min}..={max}"),
            });
        }
        let prompt = format!("{question} (enter a number between {min} and {max})");
        let hint = format!("Please enter a valid number ({min}-{max})");
        let number = self
            .asker
            .ask_validated(&prompt, &hint, |answer| {
                answer
                    .parse::<i64>()
                    .ok()
                    .filter(|n| (min..=max).contains(n))
            })
            .await?;
        Ok(number.to_string())
    }
}

#[async_trait]
impl Tool for AskNumberTool {
    fn name(&self) -> &str {
        "ask_number"
    }

    fn description(&self) -> &str {
        "Ask the user for an integer between `min` and `max` (inclusive)."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": { "type": "string" },
                "min": { "type": "integer" },
                "max": { "type": "integer" }
            },
            "required": ["question", "min", "max"]
        })
    }

    async fn invoke(&self, params: Value) -> ExecutionResult {
        finish(self.run(params).await)
    }
}

/// Email address, format-checked.
pub struct AskEmailTool {
    asker: Asker,
}

impl AskEmailTool {
    pub fn new(channel: Arc<dyn HumanChannel>) -> Self {
        Self {
            asker: Asker::new(channel, DEFAULT_MAX_RETRIES),
        }
    }

    async fn run(&self, params: Value) -> Result<String, FailureReason> {
        let p: QuestionParams = parse_params(params)?;
        let question = non_blank(&p.question)?;
        let prompt = format!("{question} (enter a valid email address)");
        self.asker
            .ask_validated(
                &prompt,
                "Please enter a valid email address",
                |answer| {
                    EMAIL
                        .as_ref()
                        .is_some_and(|re| re.is_match(answer))
                        .then(|| answer.to_string())
                },
            )
            .await
    }
}

#[async_trait]
impl Tool for AskEmailTool {
    fn name(&self) -> &str {
        "ask_email"
    }

    fn description(&self) -> &str {
        "Ask the user for an email address; the format is validated."
    }

    fn parameters(&self) -> Value {
        question_schema()
    }

    async fn invoke(&self, params: Value) -> ExecutionResult {
        finish(self.run(params).await)
    }
}

//! Scripted text generator for tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::GenerationError;

use super::provider::TextGenerator;

static COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"exactly (\d+) questions").expect("valid regex"));

static COLUMN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^- `([^`]+)`").expect("valid regex"));

/// One scripted reply.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Return this text verbatim.
    Text(String),
    /// Fail with a rate limit.
    RateLimited,
    /// Fail with a service error.
    ServiceError(String),
    /// Sleep, then fail with a timeout. Pair with a shorter request timeout.
    Hang(Duration),
    /// Answer with numbered questions built from the columns listed in the prompt.
    Echo,
}

/// Text generator that replays a script, then repeats a default reply.
pub struct MockProvider {
    script: Mutex<VecDeque<MockReply>>,
    default: MockReply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Create a mock that always echoes questions from the prompt.
    pub fn new() -> Self {
        Self::always(MockReply::Echo)
    }

    /// Create a mock that always gives the same reply.
    pub fn always(reply: MockReply) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply ahead of the default.
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    /// Queue a text reply ahead of the default.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_reply(MockReply::Text(text.into()))
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_reply(&self) -> MockReply {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a numbered list of questions from the prompt's column list.
fn echo(prompt: &str) -> String {
    let count = COUNT_PATTERN
        .captures(prompt)
        .and_then(|c| c[1].parse::<usize>().ok())
        .unwrap_or(3);
    let columns: Vec<&str> = COLUMN_PATTERN
        .captures_iter(prompt)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if columns.is_empty() {
        return String::new();
    }

    (0..count)
        .map(|i| {
            let a = columns[i % columns.len()];
            let b = columns[(i + 1) % columns.len()];
            format!(
                "{}. How does the average {} compare with {} across the latest {} periods, and what ratio signals the highest growth?",
                i + 1,
                a,
                b,
                i + 2
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl TextGenerator for MockProvider {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        match self.next_reply() {
            MockReply::Text(text) => Ok(text),
            MockReply::RateLimited => Err(GenerationError::rate_limited("mock rate limit")),
            MockReply::ServiceError(message) => Err(GenerationError::service(message)),
            MockReply::Hang(duration) => {
                tokio::time::sleep(duration).await;
                Err(GenerationError::Timeout {
                    timeout_secs: duration.as_secs(),
                })
            }
            MockReply::Echo => Ok(echo(prompt)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

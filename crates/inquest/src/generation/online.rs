//! Question generation through an external text-generation service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::candidate::{CandidateQuestion, Origin, find_column_refs};
use super::parser::ResponseParser;
use super::strategy::{GenerationRequest, QuestionStrategy};
use crate::error::GenerationError;
use crate::llm::{TextGenerator, prompts};
use crate::pipeline::RequestBudget;

/// Prompts a [`TextGenerator`] and keeps the questions that name real columns.
///
/// Every call first reserves a slot in the shared [`RequestBudget`] and is
/// bounded by `timeout`. Any failure is returned as-is so the fallback
/// controller can switch the run to offline generation.
pub struct OnlineStrategy {
    generator: Arc<dyn TextGenerator>,
    budget: Arc<RequestBudget>,
    timeout: Duration,
    parser: ResponseParser,
}

impl OnlineStrategy {
    pub fn new(generator: Arc<dyn TextGenerator>, budget: Arc<RequestBudget>, timeout: Duration) -> Self {
        Self {
            generator,
            budget,
            timeout,
            parser: ResponseParser::new(),
        }
    }

    /// Name of the underlying generator.
    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    async fn call(&self, prompt: &str) -> Result<String, GenerationError> {
        self.budget.try_acquire()?;
        match tokio::time::timeout(self.timeout, self.generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl QuestionStrategy for OnlineStrategy {
    async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<Vec<CandidateQuestion>, GenerationError> {
        if request.count == 0 || request.scope.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = prompts::question_prompt(request.category, request.count, request.scope, request.context);
        let response = self.call(&prompt).await?;
        let texts = self.parser.parse(&response);
        let parsed = texts.len();

        let required_datasets = if request.is_comparison() { 2 } else { 1 };
        let candidates: Vec<CandidateQuestion> = texts
            .into_iter()
            .filter_map(|text| {
                let referenced_columns = find_column_refs(&text, request.scope);
                let question = CandidateQuestion {
                    text,
                    category: request.category,
                    referenced_columns,
                    origin: Origin::Online,
                    ordinal: 0,
                };
                (question.datasets().len() >= required_datasets).then_some(question)
            })
            .take(request.count)
            .enumerate()
            .map(|(i, mut question)| {
                question.ordinal = request.offset + i;
                question
            })
            .collect();

        debug!(
            category = %request.category,
            generator = self.generator.name(),
            parsed,
            kept = candidates.len(),
            "online candidates"
        );
        Ok(candidates)
    }

    fn origin(&self) -> Origin {
        Origin::Online
    }
}

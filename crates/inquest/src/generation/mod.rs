//! Candidate question generation.
//!
//! Two [`QuestionStrategy`] implementations produce candidates for one
//! category at a time:
//!
//! - [`OnlineStrategy`] prompts a [`TextGenerator`](crate::llm::TextGenerator)
//!   and parses the response with [`ResponseParser`].
//! - [`OfflineStrategy`] instantiates deterministic templates and never
//!   runs out of distinct candidates.

mod candidate;
mod category;
mod offline;
mod online;
mod parser;
mod strategy;

pub use candidate::{
    CandidateQuestion, ColumnRef, DatasetColumns, Origin, find_column_refs, normalize_text,
};
pub use category::QuestionCategory;
pub use offline::OfflineStrategy;
pub use online::OnlineStrategy;
pub use parser::ResponseParser;
pub use strategy::{GenerationRequest, QuestionStrategy, overgeneration_target};

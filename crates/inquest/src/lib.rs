//! Inquest: SMART analytical question generation for tabular datasets.
//!
//! Inquest profiles the columns of a dataset, then produces a fixed-size
//! set of analytical questions balanced across five categories and scored
//! against SMART criteria (Specific, Measurable, Action-oriented, Relevant,
//! Time-bound).
//!
//! # Core Principles
//!
//! - **Exact counts**: a request for N questions returns exactly N
//! - **Always available**: when the text-generation service fails, the run
//!   switches to deterministic offline templates
//! - **Deterministic offline**: identical inputs give identical question sets
//!
//! # Example
//!
//! ```no_run
//! use inquest::{AnalysisContext, Dataset, Orchestrator, Parser};
//!
//! # async fn demo() -> inquest::Result<()> {
//! let (dataset, _) = Dataset::from_path(&Parser::new(), "sales.csv")?;
//! let context = AnalysisContext::default().with_objective("find revenue drivers");
//!
//! let set = Orchestrator::new()
//!     .generate_questions(&dataset, &context, 15)
//!     .await?;
//!
//! for question in &set {
//!     println!("[{}] {}", question.category(), question.text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod input;
pub mod llm;
pub mod pipeline;
pub mod profile;
pub mod scoring;
pub mod selection;

pub use config::{GenerationConfig, InquestConfig};
pub use error::{GenerationError, InquestError, Result};
pub use generation::{CandidateQuestion, ColumnRef, Origin, QuestionCategory};
pub use input::{AnalysisContext, ContextTemplate, DataTable, Dataset, Parser, ParserConfig, TimeSensitivity};
pub use llm::{LlmConfig, TextGenerator};
pub use pipeline::{
    GenerationMode, Orchestrator, QuestionSet, RequestBudget, RunReport, Scope, ScopeReport,
    ScopeState, recommend_question_count,
};
pub use profile::{ColumnKind, ColumnProfile, ColumnStats, SemanticTag, StatValue};
pub use scoring::{QualityReport, ScoredQuestion, ScoringConfig, SmartScores};
pub use selection::{AllocatorConfig, DiversityAllocator, Quota};

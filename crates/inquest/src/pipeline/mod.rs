//! Orchestration: run context, fallback, per-scope state and the public
//! [`Orchestrator`].

mod budget;
mod context;
mod fallback;
mod orchestrator;
mod question_set;
mod report;
mod scope;
mod state;

pub use budget::RequestBudget;
pub use context::{DrawCursor, RunContext};
pub use fallback::{FallbackController, GenerationMode};
pub use orchestrator::{Orchestrator, recommend_question_count};
pub use question_set::{QuestionSet, Scope};
pub use report::{RunReport, ScopeReport};
pub use state::{ScopeMachine, ScopeState};

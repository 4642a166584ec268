//! External text-generation services.
//!
//! Every provider implements [`TextGenerator`]. The pipeline works fully
//! without one: when no generator is configured, or the first call fails,
//! questions come from the offline templates instead.
//!
//! # Supported Providers
//!
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY`)
//! - **OpenAI** - GPT models via API (requires `OPENAI_API_KEY`)
//! - **Ollama** - Local models, no API key needed (honours `OLLAMA_HOST`)
//! - **Mock** - Scripted replies for tests and demos
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use inquest::Orchestrator;
//! use inquest::llm::OllamaProvider;
//!
//! let orchestrator = Orchestrator::new()
//!     .with_generator(Arc::new(OllamaProvider::new().unwrap()));
//! ```

mod anthropic;
mod mock;
mod ollama;
mod openai;
pub mod prompts;
mod provider;

pub use anthropic::AnthropicProvider;
pub use mock::{MockProvider, MockReply};
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use provider::{LlmConfig, TextGenerator};

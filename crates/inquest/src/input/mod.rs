//! Input parsing, dataset handles and analysis context.

mod context;
mod parser;
mod source;

pub use context::{AnalysisContext, ContextTemplate, TimeSensitivity};
pub use parser::{Parser, ParserConfig};
pub use source::{DataTable, Dataset, SourceMetadata};

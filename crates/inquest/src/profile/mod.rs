//! Column intelligence: semantic kinds, statistics and narratives.

mod analyzer;
mod rules;
mod stats;
mod types;

pub use analyzer::{ColumnAnalyzer, ProfileConfig};
pub use rules::{classify_name, tokenize, NameRule, NAME_RULES, RULE_TABLE_VERSION};
pub use stats::{parse_date, parse_number};
pub use types::{ColumnKind, ColumnProfile, ColumnStats, SemanticTag, StatValue};

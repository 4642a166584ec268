//! Versioned name-rule table for column classification.
//!
//! Rules are plain data. A column name is lower-cased, split into tokens and
//! every rule whose keyword matches a token is a candidate. Whole-token
//! matches beat compound-suffix matches; then the lowest priority number
//! wins, then the longer keyword, then table order.

use super::types::SemanticTag;

/// Bumped whenever a rule is added, removed or re-prioritised.
pub const RULE_TABLE_VERSION: u32 = 4;

/// One classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRule {
    /// Lower-case keyword matched against name tokens.
    pub keyword: &'static str,
    /// Tag assigned on match.
    pub tag: SemanticTag,
    /// Lower wins.
    pub priority: u8,
}

const fn rule(keyword: &'static str, tag: SemanticTag, priority: u8) -> NameRule {
    NameRule {
        keyword,
        tag,
        priority,
    }
}

/// Keywords that also match as the tail of a run-together token
/// (`totalrevenue`, `unitprice`). Every other keyword needs a whole token.
const COMPOUND_SUFFIXES: &[&str] = &[
    "timestamp",
    "datetime",
    "revenue",
    "income",
    "sales",
    "expense",
    "expenditure",
    "profit",
    "earnings",
    "price",
    "amount",
    "identifier",
    "quantity",
    "percent",
    "percentage",
    "status",
];

/// How a keyword matched a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Match {
    Token,
    Suffix,
}

/// The rule table, in tie-break order.
pub const NAME_RULES: &[NameRule] = &[
    // Temporal
    rule("year", SemanticTag::Year, 10),
    rule("yr", SemanticTag::Year, 10),
    rule("fy", SemanticTag::Year, 10),
    rule("quarter", SemanticTag::Quarter, 10),
    rule("qtr", SemanticTag::Quarter, 10),
    rule("month", SemanticTag::Month, 10),
    rule("date", SemanticTag::Date, 10),
    rule("day", SemanticTag::Date, 10),
    rule("period", SemanticTag::Date, 12),
    rule("timestamp", SemanticTag::Timestamp, 10),
    rule("datetime", SemanticTag::Timestamp, 10),
    rule("created", SemanticTag::Timestamp, 12),
    rule("updated", SemanticTag::Timestamp, 12),
    // Ratios
    rule("ratio", SemanticTag::Ratio, 20),
    rule("rate", SemanticTag::Ratio, 20),
    rule("yield", SemanticTag::Ratio, 20),
    rule("percent", SemanticTag::Percentage, 20),
    rule("percentage", SemanticTag::Percentage, 20),
    rule("pct", SemanticTag::Percentage, 20),
    rule("share", SemanticTag::Percentage, 25),
    // Financial amounts
    rule("revenue", SemanticTag::Revenue, 30),
    rule("sales", SemanticTag::Revenue, 30),
    rule("income", SemanticTag::Revenue, 30),
    rule("turnover", SemanticTag::Revenue, 30),
    rule("cost", SemanticTag::Cost, 30),
    rule("expense", SemanticTag::Cost, 30),
    rule("expenditure", SemanticTag::Cost, 30),
    rule("spend", SemanticTag::Cost, 30),
    rule("salary", SemanticTag::Cost, 30),
    rule("asset", SemanticTag::BalanceSheet, 30),
    rule("liability", SemanticTag::BalanceSheet, 30),
    rule("liabilities", SemanticTag::BalanceSheet, 30),
    rule("equity", SemanticTag::BalanceSheet, 30),
    rule("debt", SemanticTag::BalanceSheet, 30),
    rule("profit", SemanticTag::Profit, 30),
    rule("margin", SemanticTag::Profit, 30),
    rule("earnings", SemanticTag::Profit, 30),
    rule("ebitda", SemanticTag::Profit, 30),
    rule("price", SemanticTag::Price, 30),
    rule("fare", SemanticTag::Price, 30),
    rule("amount", SemanticTag::Price, 35),
    // Identifiers
    rule("id", SemanticTag::Identifier, 40),
    rule("uuid", SemanticTag::Identifier, 40),
    rule("identifier", SemanticTag::Identifier, 40),
    rule("key", SemanticTag::Identifier, 42),
    rule("code", SemanticTag::Code, 40),
    rule("symbol", SemanticTag::Code, 40),
    rule("ticker", SemanticTag::Ticker, 40),
    rule("carrier", SemanticTag::Carrier, 40),
    rule("airline", SemanticTag::Carrier, 40),
    // Labels and groupings
    rule("name", SemanticTag::Name, 50),
    rule("title", SemanticTag::Name, 50),
    rule("label", SemanticTag::Name, 50),
    rule("category", SemanticTag::Category, 60),
    rule("type", SemanticTag::Category, 60),
    rule("class", SemanticTag::Category, 60),
    rule("group", SemanticTag::Category, 60),
    rule("segment", SemanticTag::Category, 60),
    rule("department", SemanticTag::Category, 60),
    rule("tier", SemanticTag::Category, 60),
    rule("status", SemanticTag::Status, 60),
    rule("state", SemanticTag::Status, 62),
    rule("stage", SemanticTag::Status, 60),
    rule("flag", SemanticTag::Flag, 60),
    rule("is", SemanticTag::Flag, 65),
    rule("has", SemanticTag::Flag, 65),
    // Geography
    rule("location", SemanticTag::Location, 70),
    rule("region", SemanticTag::Location, 70),
    rule("city", SemanticTag::Location, 70),
    rule("address", SemanticTag::Location, 70),
    rule("territory", SemanticTag::Location, 70),
    rule("zip", SemanticTag::Location, 70),
    rule("country", SemanticTag::Country, 70),
    rule("nation", SemanticTag::Country, 70),
    // Measures
    rule("count", SemanticTag::Count, 80),
    rule("quantity", SemanticTag::Count, 80),
    rule("qty", SemanticTag::Count, 80),
    rule("number", SemanticTag::Count, 80),
    rule("num", SemanticTag::Count, 80),
    rule("volume", SemanticTag::Count, 80),
    rule("units", SemanticTag::Count, 80),
    rule("passengers", SemanticTag::Count, 80),
    rule("score", SemanticTag::Score, 80),
    rule("rating", SemanticTag::Score, 80),
    // Free text
    rule("description", SemanticTag::Description, 90),
    rule("comment", SemanticTag::Description, 90),
    rule("note", SemanticTag::Description, 90),
    rule("text", SemanticTag::Description, 90),
];

/// Split a column name into lower-case tokens on `_`, `-`, `.`, whitespace
/// and camelCase boundaries.
pub fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for part in name.split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace()) {
        let chars: Vec<char> = part.chars().collect();
        let mut current = String::new();
        for (i, &ch) in chars.iter().enumerate() {
            let boundary = i > 0 && ch.is_uppercase() && {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
                prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower)
            };
            if boundary && !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            current.extend(ch.to_lowercase());
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }
    tokens
}

/// How `keyword` matches `token`, if at all.
fn keyword_matches(keyword: &str, token: &str) -> Option<Match> {
    if token == keyword {
        return Some(Match::Token);
    }
    let singular = token
        .strip_suffix("es")
        .filter(|s| *s == keyword)
        .or_else(|| token.strip_suffix('s'));
    if singular == Some(keyword) {
        return Some(Match::Token);
    }
    let compound = COMPOUND_SUFFIXES.contains(&keyword)
        && ((token.len() > keyword.len() && token.ends_with(keyword))
            || singular.is_some_and(|s| s.len() > keyword.len() && s.ends_with(keyword)));
    compound.then_some(Match::Suffix)
}

/// Find the winning rule for a column name, if any.
pub fn classify_name(name: &str) -> Option<&'static NameRule> {
    let tokens = tokenize(name);
    NAME_RULES
        .iter()
        .enumerate()
        .filter_map(|(i, rule)| {
            tokens
                .iter()
                .filter_map(|t| keyword_matches(rule.keyword, t))
                .min()
                .map(|kind| (kind, i, rule))
        })
        .min_by(|(ka, ia, a), (kb, ib, b)| {
            ka.cmp(kb)
                .then(a.priority.cmp(&b.priority))
                .then(b.keyword.len().cmp(&a.keyword.len()))
                .then(ia.cmp(ib))
        })
        .map(|(_, _, rule)| rule)
}

//! Business context supplied alongside the datasets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How urgently the audience needs answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for TimeSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeSensitivity::Low => write!(f, "low"),
            TimeSensitivity::Medium => write!(f, "medium"),
            TimeSensitivity::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for TimeSensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TimeSensitivity::Low),
            "medium" | "med" => Ok(TimeSensitivity::Medium),
            "high" => Ok(TimeSensitivity::High),
            _ => Err(format!("Unknown time sensitivity: {}. Use low, medium, or high.", s)),
        }
    }
}

/// Free-text business context for question generation.
///
/// Read-only input to the pipeline; generation and scoring never mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisContext {
    /// Subject area (e.g., "financial analysis").
    pub subject_area: String,

    /// Ordered analysis objectives (e.g., "risk assessment").
    pub analysis_objectives: Vec<String>,

    /// Who will read the questions.
    pub target_audience: String,

    /// Business situation the analysis supports.
    pub business_context: String,

    /// Urgency of the analysis.
    pub time_sensitivity: TimeSensitivity,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self {
            subject_area: "general data analytics".to_string(),
            analysis_objectives: vec!["exploratory analysis".to_string()],
            target_audience: "data analysts".to_string(),
            business_context: "Data-driven insights and decision support".to_string(),
            time_sensitivity: TimeSensitivity::Medium,
        }
    }
}

/// Words that carry no signal for relevance matching.
const STOPWORDS: &[&str] = &[
    "about", "after", "analysis", "analytics", "analysts", "and", "data", "decisions", "during",
    "for", "from", "into", "managers", "over", "that", "their", "the", "this", "with", "within",
];

impl AnalysisContext {
    /// Create a context with only a subject area; other fields stay empty.
    pub fn new(subject_area: impl Into<String>) -> Self {
        Self {
            subject_area: subject_area.into(),
            analysis_objectives: Vec::new(),
            target_audience: String::new(),
            business_context: String::new(),
            time_sensitivity: TimeSensitivity::Medium,
        }
    }

    /// Append an analysis objective.
    pub fn with_objective(mut self, objective: impl Into<String>) -> Self {
        self.analysis_objectives.push(objective.into());
        self
    }

    /// Replace the analysis objectives.
    pub fn with_objectives<I, S>(mut self, objectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.analysis_objectives = objectives.into_iter().map(Into::into).collect();
        self
    }

    /// Set the target audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    /// Set the business context.
    pub fn with_business_context(mut self, context: impl Into<String>) -> Self {
        self.business_context = context.into();
        self
    }

    /// Set the time sensitivity.
    pub fn with_time_sensitivity(mut self, sensitivity: TimeSensitivity) -> Self {
        self.time_sensitivity = sensitivity;
        self
    }

    /// The objective at `index`, cycling; falls back to the subject area.
    pub fn objective(&self, index: usize) -> &str {
        if self.analysis_objectives.is_empty() {
            &self.subject_area
        } else {
            &self.analysis_objectives[index % self.analysis_objectives.len()]
        }
    }

    /// The audience, or a neutral default.
    pub fn audience(&self) -> &str {
        if self.target_audience.trim().is_empty() {
            "decision makers"
        } else {
            &self.target_audience
        }
    }

    /// Lower-cased content words from every context field, in field order
    /// and without duplicates.
    pub fn keywords(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let fields = std::iter::once(self.subject_area.as_str())
            .chain(self.analysis_objectives.iter().map(String::as_str))
            .chain([self.business_context.as_str(), self.target_audience.as_str()]);

        for field in fields {
            for word in field.split(|c: char| !c.is_alphanumeric()) {
                let word = word.to_lowercase();
                if word.len() >= 4 && !STOPWORDS.contains(&word.as_str()) && !out.contains(&word) {
                    out.push(word);
                }
            }
        }
        out
    }

    /// Format the context for LLM prompts.
    pub fn to_prompt_string(&self) -> String {
        let mut parts = Vec::new();

        if !self.subject_area.is_empty() {
            parts.push(format!("Subject area: {}", self.subject_area));
        }
        if !self.analysis_objectives.is_empty() {
            parts.push(format!("Objectives: {}", self.analysis_objectives.join(", ")));
        }
        if !self.target_audience.is_empty() {
            parts.push(format!("Target audience: {}", self.target_audience));
        }
        if !self.business_context.is_empty() {
            parts.push(format!("Business context: {}", self.business_context));
        }
        parts.push(format!("Time sensitivity: {}", self.time_sensitivity));

        parts.join("\n")
    }

    /// Infer a quick context from dataset file names.
    ///
    /// Uses a predefined template when the inferred subject has one.
    pub fn infer_from_dataset_names(names: &[&str]) -> Self {
        let combined = names.join(" ").to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| combined.contains(w));

        let subject = if has_any(&["stock", "price", "financial", "revenue", "profit", "asset", "liabilit", "ratio"]) {
            "financial analysis"
        } else if has_any(&["sales", "customer", "marketing", "campaign"]) {
            "sales and marketing analytics"
        } else if has_any(&["employee", "hr", "payroll", "performance"]) {
            "human resources analytics"
        } else if has_any(&["inventory", "supply", "logistics", "operations"]) {
            "operational analytics"
        } else {
            "general data analytics"
        };

        ContextTemplate::ALL
            .iter()
            .find(|t| t.subject_area == subject)
            .map(ContextTemplate::to_context)
            .unwrap_or_else(|| Self {
                subject_area: subject.to_string(),
                business_context: format!("Analysis of {}", names.join(", ")),
                ..Self::default()
            })
    }
}

/// A predefined context for a common analysis scenario.
#[derive(Debug, Clone, Copy)]
pub struct ContextTemplate {
    pub key: &'static str,
    pub subject_area: &'static str,
    pub objectives: &'static [&'static str],
    pub audience: &'static str,
    pub business_context: &'static str,
    pub time_sensitivity: TimeSensitivity,
}

impl ContextTemplate {
    /// Every built-in template, in display order.
    pub const ALL: &'static [ContextTemplate] = &[
        ContextTemplate {
            key: "financial",
            subject_area: "financial analysis",
            objectives: &["performance evaluation", "risk assessment", "trend analysis", "ROI optimization"],
            audience: "financial analysts",
            business_context: "Investment decisions, portfolio management, and financial planning",
            time_sensitivity: TimeSensitivity::High,
        },
        ContextTemplate {
            key: "marketing",
            subject_area: "marketing analytics",
            objectives: &["campaign effectiveness", "customer segmentation", "ROI analysis", "brand performance"],
            audience: "marketing managers",
            business_context: "Marketing strategy optimization, budget allocation, and customer acquisition",
            time_sensitivity: TimeSensitivity::Medium,
        },
        ContextTemplate {
            key: "operational",
            subject_area: "operational analytics",
            objectives: &["efficiency optimization", "cost reduction", "process improvement", "quality control"],
            audience: "operations managers",
            business_context: "Operational excellence, resource optimization, and process automation",
            time_sensitivity: TimeSensitivity::High,
        },
        ContextTemplate {
            key: "sales",
            subject_area: "sales analytics",
            objectives: &["sales performance", "pipeline analysis", "forecasting", "territory optimization"],
            audience: "sales managers",
            business_context: "Sales strategy, revenue optimization, and performance management",
            time_sensitivity: TimeSensitivity::High,
        },
        ContextTemplate {
            key: "customer",
            subject_area: "customer analytics",
            objectives: &["customer behavior", "retention analysis", "satisfaction measurement", "lifetime value"],
            audience: "customer success managers",
            business_context: "Customer experience improvement, retention strategies, and loyalty programs",
            time_sensitivity: TimeSensitivity::Medium,
        },
        ContextTemplate {
            key: "hr",
            subject_area: "human resources analytics",
            objectives: &["employee performance", "retention analysis", "workforce planning", "diversity metrics"],
            audience: "HR managers",
            business_context: "Talent management, organizational development, and employee engagement",
            time_sensitivity: TimeSensitivity::Medium,
        },
        ContextTemplate {
            key: "supply-chain",
            subject_area: "supply chain analytics",
            objectives: &["inventory optimization", "demand forecasting", "supplier performance", "logistics efficiency"],
            audience: "supply chain managers",
            business_context: "Supply chain optimization, cost reduction, and risk mitigation",
            time_sensitivity: TimeSensitivity::High,
        },
        ContextTemplate {
            key: "healthcare",
            subject_area: "healthcare analytics",
            objectives: &["patient outcomes", "cost analysis", "resource utilization", "quality improvement"],
            audience: "healthcare administrators",
            business_context: "Healthcare delivery optimization, cost management, and patient care improvement",
            time_sensitivity: TimeSensitivity::High,
        },
        ContextTemplate {
            key: "retail",
            subject_area: "retail analytics",
            objectives: &["sales optimization", "inventory management", "customer insights", "pricing strategy"],
            audience: "retail managers",
            business_context: "Retail performance optimization, customer experience, and profitability",
            time_sensitivity: TimeSensitivity::Medium,
        },
        ContextTemplate {
            key: "manufacturing",
            subject_area: "manufacturing analytics",
            objectives: &["production efficiency", "quality control", "equipment maintenance", "cost optimization"],
            audience: "manufacturing managers",
            business_context: "Manufacturing excellence, productivity improvement, and operational efficiency",
            time_sensitivity: TimeSensitivity::High,
        },
        ContextTemplate {
            key: "energy",
            subject_area: "energy analytics",
            objectives: &["consumption optimization", "efficiency analysis", "sustainability metrics", "cost reduction"],
            audience: "energy managers",
            business_context: "Energy management, sustainability initiatives, and operational cost optimization",
            time_sensitivity: TimeSensitivity::Medium,
        },
        ContextTemplate {
            key: "cybersecurity",
            subject_area: "cybersecurity analytics",
            objectives: &["threat detection", "risk assessment", "incident analysis", "security metrics"],
            audience: "security analysts",
            business_context: "Cybersecurity posture improvement, threat mitigation, and risk management",
            time_sensitivity: TimeSensitivity::High,
        },
        ContextTemplate {
            key: "education",
            subject_area: "education analytics",
            objectives: &["student performance", "learning outcomes", "resource allocation", "engagement analysis"],
            audience: "education administrators",
            business_context: "Educational excellence, student success, and institutional effectiveness",
            time_sensitivity: TimeSensitivity::Medium,
        },
        ContextTemplate {
            key: "real-estate",
            subject_area: "real estate analytics",
            objectives: &["market analysis", "price prediction", "investment optimization", "portfolio performance"],
            audience: "real estate analysts",
            business_context: "Real estate investment decisions, market insights, and portfolio optimization",
            time_sensitivity: TimeSensitivity::Medium,
        },
        ContextTemplate {
            key: "transportation",
            subject_area: "transportation analytics",
            objectives: &["route optimization", "fleet management", "safety analysis", "efficiency improvement"],
            audience: "transportation managers",
            business_context: "Transportation efficiency, cost optimization, and safety improvement",
            time_sensitivity: TimeSensitivity::High,
        },
        ContextTemplate {
            key: "telecom",
            subject_area: "telecommunications analytics",
            objectives: &["network performance", "customer churn", "service quality", "capacity planning"],
            audience: "telecom analysts",
            business_context: "Network optimization, customer retention, and service quality improvement",
            time_sensitivity: TimeSensitivity::Medium,
        },
    ];

    /// Look up a template by key (case-insensitive; `_` and `-` are equivalent).
    pub fn find(key: &str) -> Option<&'static ContextTemplate> {
        let wanted = key.trim().to_lowercase().replace('_', "-");
        Self::ALL.iter().find(|t| t.key == wanted)
    }

    /// Materialize the template as an owned context.
    pub fn to_context(&self) -> AnalysisContext {
        AnalysisContext {
            subject_area: self.subject_area.to_string(),
            analysis_objectives: self.objectives.iter().map(|s| s.to_string()).collect(),
            target_audience: self.audience.to_string(),
            business_context: self.business_context.to_string(),
            time_sensitivity: self.time_sensitivity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = AnalysisContext::new("airline financial analysis")
            .with_objectives(["risk assessment", "trend analysis"])
            .with_audience("executives")
            .with_time_sensitivity(TimeSensitivity::High);

        assert_eq!(ctx.analysis_objectives.len(), 2);
        assert_eq!(ctx.objective(3), "trend analysis");
        assert_eq!(ctx.time_sensitivity, TimeSensitivity::High);
    }

    #[test]
    fn test_objective_falls_back_to_subject() {
        let ctx = AnalysisContext::new("fleet safety");
        assert_eq!(ctx.objective(0), "fleet safety");
        assert_eq!(ctx.audience(), "decision makers");
    }

    #[test]
    fn test_keywords_skip_stopwords_and_duplicates() {
        let ctx = AnalysisContext::new("airline financial analysis")
            .with_objective("financial risk assessment");
        let keywords = ctx.keywords();
        assert_eq!(keywords, vec!["airline", "financial", "risk", "assessment"]);
    }

    #[test]
    fn test_prompt_string() {
        let ctx = AnalysisContext::new("retail").with_objective("pricing strategy");
        let prompt = ctx.to_prompt_string();
        assert!(prompt.contains("Subject area: retail"));
        assert!(prompt.contains("Objectives: pricing strategy"));
        assert!(prompt.contains("Time sensitivity: medium"));
    }

    #[test]
    fn test_template_lookup() {
        let template = ContextTemplate::find("Supply_Chain").unwrap();
        let ctx = template.to_context();
        assert_eq!(ctx.subject_area, "supply chain analytics");
        assert_eq!(ctx.analysis_objectives.len(), 4);
        assert!(ContextTemplate::find("astrology").is_none());
        assert_eq!(ContextTemplate::ALL.len(), 16);
    }

    #[test]
    fn test_infer_from_dataset_names() {
        let ctx = AnalysisContext::infer_from_dataset_names(&["Assets.csv", "Liabilities.csv"]);
        assert_eq!(ctx.subject_area, "financial analysis");
        assert_eq!(ctx.target_audience, "financial analysts");

        let ctx = AnalysisContext::infer_from_dataset_names(&["payroll_2024.csv"]);
        assert_eq!(ctx.subject_area, "human resources analytics");

        let ctx = AnalysisContext::infer_from_dataset_names(&["misc.csv"]);
        assert_eq!(ctx.subject_area, "general data analytics");
        assert!(ctx.business_context.contains("misc.csv"));
    }

    #[test]
    fn test_time_sensitivity_parse() {
        assert_eq!("HIGH".parse::<TimeSensitivity>().unwrap(), TimeSensitivity::High);
        assert!("urgent".parse::<TimeSensitivity>().is_err());
    }
}

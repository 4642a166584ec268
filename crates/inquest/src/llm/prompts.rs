//! Prompt templates for question generation.

use crate::generation::{DatasetColumns, QuestionCategory};
use crate::input::AnalysisContext;

/// System prompt shared by all providers.
pub fn system_prompt() -> &'static str {
    r#"You are a senior data analyst who writes analytical questions for business stakeholders.
Every question must be Specific (name the exact columns involved), Measurable (ask for a
quantity, rate, ratio, rank or comparison), Action-oriented (support a decision), Relevant
(to the stated business context) and Time-bound (name a period when the data has one).
Respond with a JSON array of question strings and nothing else."#
}

/// Build the prompt asking for `count` questions of one category.
///
/// A scope with more than one dataset produces a cross-dataset prompt that
/// requires every question to use columns from at least two datasets.
pub fn question_prompt(
    category: QuestionCategory,
    count: usize,
    scope: &[DatasetColumns<'_>],
    context: &AnalysisContext,
) -> String {
    let mut columns = String::new();
    for ds in scope {
        columns.push_str(&format!("\n### Dataset: {}\n", ds.dataset));
        for profile in ds.profiles.iter().filter(|p| p.is_usable()) {
            columns.push_str(&format!(
                "- `{}` ({}): {}\n",
                profile.name, profile.declared_kind, profile.narrative
            ));
        }
    }

    let cross_dataset = if scope.len() > 1 {
        "\nEvery question must compare or connect columns from at least two of the datasets above, \
         naming each dataset and column explicitly.\n"
    } else {
        ""
    };

    format!(
        r#"Generate exactly {count} questions in the "{label}" category.

## Category intent
Questions should {intent}.

## Business context
{context}

## Columns
{columns}{cross_dataset}
## Rules
- Reference column names exactly as written above.
- Prefer concrete metrics (averages, growth rates, ratios, rankings) over vague wording.
- Avoid generic phrases like "the data" or "this dataset".
- Do not repeat a question.

Respond with a JSON array of {count} strings."#,
        count = count,
        label = category.label(),
        intent = category.intent(),
        context = context.to_prompt_string(),
        columns = columns,
        cross_dataset = cross_dataset,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ColumnAnalyzer;

    #[test]
    fn test_question_prompt_lists_usable_columns() {
        let analyzer = ColumnAnalyzer::new();
        let profiles = vec![
            analyzer.analyze_column("revenue", &["10", "20"]),
            analyzer.analyze_column("blank", &["", ""]),
        ];
        let scope = [DatasetColumns {
            dataset: "sales.csv",
            profiles: &profiles,
        }];
        let prompt = question_prompt(
            QuestionCategory::Pattern,
            4,
            &scope,
            &AnalysisContext::new("retail"),
        );

        assert!(prompt.contains("exactly 4 questions"));
        assert!(prompt.contains("- `revenue` (financial)"));
        assert!(!prompt.contains("`blank`"));
        assert!(prompt.contains("Subject area: retail"));
        assert!(!prompt.contains("at least two of the datasets"));
    }

    #[test]
    fn test_comparison_prompt_requires_two_datasets() {
        let analyzer = ColumnAnalyzer::new();
        let a = vec![analyzer.analyze_column("assets", &["1"])];
        let b = vec![analyzer.analyze_column("liabilities", &["2"])];
        let scope = [
            DatasetColumns { dataset: "A", profiles: &a },
            DatasetColumns { dataset: "B", profiles: &b },
        ];
        let prompt = question_prompt(
            QuestionCategory::Comparative,
            5,
            &scope,
            &AnalysisContext::default(),
        );
        assert!(prompt.contains("### Dataset: A"));
        assert!(prompt.contains("### Dataset: B"));
        assert!(prompt.contains("at least two of the datasets"));
    }
}

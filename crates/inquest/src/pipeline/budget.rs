//! Request budget shared by every pipeline of an orchestrator.

use std::sync::Mutex;

use crate::error::GenerationError;

#[derive(Debug, Default)]
struct BudgetState {
    used: usize,
    denied: usize,
}

/// Counts online requests against an optional limit.
///
/// A denied request is reported as [`GenerationError::RateLimited`], which
/// the fallback controller treats like any other rate-limit signal.
#[derive(Debug, Default)]
pub struct RequestBudget {
    limit: Option<usize>,
    state: Mutex<BudgetState>,
}

impl RequestBudget {
    /// A budget with no limit.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// A budget allowing at most `limit` requests.
    pub fn limited(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            state: Mutex::default(),
        }
    }

    /// Build from an optional limit.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            state: Mutex::default(),
        }
    }

    /// Reserve one request.
    pub fn try_acquire(&self) -> Result<(), GenerationError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match self.limit {
            Some(limit) if state.used >= limit => {
                state.denied += 1;
                Err(GenerationError::rate_limited(format!(
                    "request budget of {} exhausted",
                    limit
                )))
            }
            _ => {
                state.used += 1;
                Ok(())
            }
        }
    }

    /// Requests granted so far.
    pub fn used(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).used
    }

    /// Requests refused so far.
    pub fn denied(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).denied
    }

    /// Requests left, if limited.
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.used()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_limited_budget_denies_as_rate_limit() {
        let budget = RequestBudget::limited(2);
        assert!(budget.try_acquire().is_ok());
        assert!(budget.try_acquire().is_ok());
        assert!(matches!(
            budget.try_acquire(),
            Err(GenerationError::RateLimited(_))
        ));
        assert_eq!(budget.used(), 2);
        assert_eq!(budget.denied(), 1);
        assert_eq!(budget.remaining(), Some(0));
    }

    #[test]
    fn test_unlimited_budget() {
        let budget = RequestBudget::unlimited();
        for _ in 0..100 {
            budget.try_acquire().unwrap();
        }
        assert_eq!(budget.remaining(), None);
    }

    #[test]
    fn test_shared_across_threads() {
        let budget = Arc::new(RequestBudget::limited(50));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let budget = Arc::clone(&budget);
                std::thread::spawn(move || (0..20).filter(|_| budget.try_acquire().is_ok()).count())
            })
            .collect();
        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted, 50);
        assert_eq!(budget.denied(), 30);
    }
}

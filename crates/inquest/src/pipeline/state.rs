//! Per-scope pipeline state machine.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::fallback::GenerationMode;
use crate::error::{InquestError, Result};

/// Where a scope's pipeline is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "mode")]
pub enum ScopeState {
    Idle,
    Profiling,
    Generating(GenerationMode),
    Validating,
    Enforcing,
    Done,
    Failed,
}

impl ScopeState {
    /// Whether `self -> next` is allowed.
    ///
    /// Retries and shortfall backfill re-enter generation from validation
    /// and enforcement; the only mode change is online to offline.
    pub fn can_transition_to(&self, next: ScopeState) -> bool {
        use GenerationMode::*;
        use ScopeState::*;
        matches!(
            (*self, next),
            (Idle, Profiling)
                | (Profiling, Generating(_))
                | (Profiling, Failed)
                | (Generating(Online), Generating(Offline))
                | (Generating(_), Validating)
                | (Validating, Generating(_))
                | (Validating, Enforcing)
                | (Enforcing, Generating(Offline))
                | (Enforcing, Done)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScopeState::Done | ScopeState::Failed)
    }
}

impl fmt::Display for ScopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeState::Idle => write!(f, "idle"),
            ScopeState::Profiling => write!(f, "profiling"),
            ScopeState::Generating(mode) => write!(f, "generating({})", mode),
            ScopeState::Validating => write!(f, "validating"),
            ScopeState::Enforcing => write!(f, "enforcing"),
            ScopeState::Done => write!(f, "done"),
            ScopeState::Failed => write!(f, "failed"),
        }
    }
}

/// Tracks one scope's state and the path it took.
#[derive(Debug, Clone)]
pub struct ScopeMachine {
    scope: String,
    history: Vec<ScopeState>,
}

impl ScopeMachine {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            history: vec![ScopeState::Idle],
        }
    }

    pub fn state(&self) -> ScopeState {
        self.history.last().copied().unwrap_or(ScopeState::Idle)
    }

    /// Move to `next`. Re-entering the current generation mode is a no-op.
    pub fn advance(&mut self, next: ScopeState) -> Result<()> {
        let current = self.state();
        if current == next && matches!(next, ScopeState::Generating(_)) {
            return Ok(());
        }
        if !current.can_transition_to(next) {
            return Err(InquestError::StateTransition {
                scope: self.scope.clone(),
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        debug!(scope = %self.scope, from = %current, to = %next, "state transition");
        self.history.push(next);
        Ok(())
    }

    pub fn history(&self) -> &[ScopeState] {
        &self.history
    }

    pub fn into_history(self) -> Vec<ScopeState> {
        self.history
    }
}

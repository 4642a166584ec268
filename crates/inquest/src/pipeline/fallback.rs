//! Run-scoped switch from online to offline generation.

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::generation::QuestionCategory;

/// Which strategy serves generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Online,
    Offline,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::Online => write!(f, "online"),
            GenerationMode::Offline => write!(f, "offline"),
        }
    }
}

/// Holds the run's generation mode.
///
/// The mode starts online when a generator is configured. The first
/// failure flips it to offline for the rest of the run; it never flips
/// back.
#[derive(Debug)]
pub struct FallbackController {
    online_available: bool,
    engaged: AtomicBool,
    failures: AtomicUsize,
    cause: Mutex<Option<GenerationError>>,
}

impl FallbackController {
    pub fn new(online_available: bool) -> Self {
        Self {
            online_available,
            engaged: AtomicBool::new(false),
            failures: AtomicUsize::new(0),
            cause: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> GenerationMode {
        if self.online_available && !self.engaged.load(Ordering::SeqCst) {
            GenerationMode::Online
        } else {
            GenerationMode::Offline
        }
    }

    /// True once a failure has switched the run to offline.
    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::SeqCst)
    }

    /// Online failures seen this run, including ones after engagement.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    /// The failure that engaged fallback.
    pub fn cause(&self) -> Option<GenerationError> {
        self.cause.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Record an online failure. Returns true if this call engaged
    /// fallback.
    pub fn record_failure(&self, scope: &str, category: QuestionCategory, error: &GenerationError) -> bool {
        self.failures.fetch_add(1, Ordering::SeqCst);
        let first = !self.engaged.swap(true, Ordering::SeqCst);
        if first {
            *self.cause.lock().unwrap_or_else(|e| e.into_inner()) = Some(error.clone());
            warn!(
                scope,
                category = %category,
                kind = error.kind(),
                error = %error,
                "online generation failed, switching run to offline templates"
            );
        } else {
            debug!(scope, category = %category, kind = error.kind(), "online failure after fallback");
        }
        first
    }
}

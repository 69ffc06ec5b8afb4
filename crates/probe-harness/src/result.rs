use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::ProbeError;

/// What a single probe produced, before it is merged into the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub ordinal: usize,
    pub passed: bool,
    pub diagnostics: Vec<String>,
}

impl Outcome {
    pub fn pass(ordinal: usize) -> Self {
        Self {
            ordinal,
            passed: true,
            diagnostics: Vec::new(),
        }
    }

    /// A failed outcome whose single diagnostic is tagged with the probe ordinal.
    pub fn fail(ordinal: usize, error: &ProbeError) -> Self {
        Self {
            ordinal,
            passed: false,
            diagnostics: vec![format!("{} Probe number: {}", error, ordinal)],
        }
    }

    pub fn from_result(ordinal: usize, result: Result<(), ProbeError>) -> Self {
        match result {
            Ok(()) => Self::pass(ordinal),
            Err(e) => Self::fail(ordinal, &e),
        }
    }
}

#[derive(Debug, Default)]
struct Collected {
    diagnostics: Vec<String>,
    sealed: bool,
}

/// Shared accumulator written by every probe of one run.
///
/// Once [`ResultSet::seal`] has produced the verdict, further records are
/// rejected so they cannot change what was already reported.
#[derive(Debug, Default)]
pub struct ResultSet {
    failed: AtomicBool,
    collected: Mutex<Collected>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one probe outcome. Returns `false` if the set was already sealed.
    pub fn record(&self, outcome: Outcome) -> bool {
        let mut collected = self
            .collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if collected.sealed {
            tracing::warn!(
                "Dropping outcome of probe {} recorded after the verdict",
                outcome.ordinal
            );
            return false;
        }

        if !outcome.passed {
            self.failed.store(true, Ordering::SeqCst);
        }
        collected.diagnostics.extend(outcome.diagnostics);
        true
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Freeze the set and reduce it into a verdict. Only the first call
    /// sees the diagnostics; the set is consumed once.
    pub fn seal(&self) -> Verdict {
        let mut collected = self
            .collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        collected.sealed = true;

        Verdict {
            failed: self.failed.load(Ordering::SeqCst),
            diagnostics: std::mem::take(&mut collected.diagnostics),
        }
    }
}

/// The single pass/fail result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub failed: bool,
    pub diagnostics: Vec<String>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        !self.failed
    }

    /// All diagnostics, one per line, for human inspection.
    pub fn summary(&self) -> String {
        self.diagnostics.join("\n")
    }
}

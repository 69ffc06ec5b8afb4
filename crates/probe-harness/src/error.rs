use std::time::Duration;
use thiserror::Error;

/// Boxed source error carried by transport and decode faults.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can go wrong inside a single probe.
///
/// These never escape the harness: each one is turned into a diagnostic
/// on the shared result set and marks the run as failed.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Transport fault: {0}")]
    Transport(#[source] BoxError),

    #[error("Decode fault: {0}")]
    Decode(#[source] BoxError),

    #[error("{0}")]
    Check(String),

    #[error("Probe did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("Probe panicked: {0}")]
    Panicked(String),
}

impl ProbeError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ProbeError::Transport(err.into())
    }

    pub fn decode<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ProbeError::Decode(err.into())
    }

    pub fn check(message: impl Into<String>) -> Self {
        ProbeError::Check(message.into())
    }
}

/// Faults in the orchestration itself. These abort the whole run.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("At least one probe must be requested")]
    NoProbes,

    #[error("No async runtime available to launch probes: {0}")]
    NoRuntime(String),

    #[error("A probe task ended without reporting: {0}")]
    WorkerLost(String),
}

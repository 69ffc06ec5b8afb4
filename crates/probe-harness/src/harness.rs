use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};

use crate::error::{HarnessError, ProbeError};
use crate::result::{Outcome, ResultSet, Verdict};

/// Fans out a fixed number of probes, waits for all of them, then reduces
/// their outcomes into one [`Verdict`].
#[derive(Debug, Clone)]
pub struct Harness {
    count: usize,
    timeout: Option<Duration>,
}

impl Harness {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            timeout: None,
        }
    }

    /// Bound every probe by `timeout`. A probe that runs over is recorded
    /// as failed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Launch `count` probes on the current runtime.
    ///
    /// `probe` is called once per ordinal (1-based) to build that probe's
    /// work; every task is spawned before any is awaited. Failures inside a
    /// probe, including panics while building or running it, become
    /// diagnostics. Only orchestration faults are returned as `Err`.
    ///
    /// Dropping the returned future aborts all probes still in flight.
    pub async fn run<F, Fut>(&self, mut probe: F) -> Result<Verdict, HarnessError>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
    {
        if self.count == 0 {
            return Err(HarnessError::NoProbes);
        }

        let runtime = Handle::try_current().map_err(|e| HarnessError::NoRuntime(e.to_string()))?;

        let run_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        let span = tracing::info_span!("probe_run", run_id = %run_id, count = self.count);
        let results = Arc::new(ResultSet::new());

        span.in_scope(|| info!("Launching {} probes", self.count));

        // Dropping the set aborts every probe still running, so no probe
        // outlives this call.
        let mut probes = JoinSet::new();
        for ordinal in 1..=self.count {
            let work = match panic::catch_unwind(AssertUnwindSafe(|| probe(ordinal))) {
                Ok(work) => work,
                Err(payload) => {
                    let error = ProbeError::Panicked(panic_message(payload));
                    span.in_scope(|| warn!("Probe {} failed: {}", ordinal, error));
                    results.record(Outcome::fail(ordinal, &error));
                    continue;
                }
            };
            let results = results.clone();
            let timeout = self.timeout;

            probes.spawn_on(
                async move {
                    let bounded = async move {
                        match timeout {
                            Some(limit) => tokio::time::timeout(limit, work)
                                .await
                                .unwrap_or(Err(ProbeError::TimedOut(limit))),
                            None => work.await,
                        }
                    };
                    let result = AssertUnwindSafe(bounded)
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|payload| {
                            Err(ProbeError::Panicked(panic_message(payload)))
                        });

                    match &result {
                        Ok(()) => debug!("Probe {} passed", ordinal),
                        Err(e) => warn!("Probe {} failed: {}", ordinal, e),
                    }
                    results.record(Outcome::from_result(ordinal, result));
                }
                .instrument(span.clone()),
                &runtime,
            );
        }

        // Join barrier: nothing is reduced until every probe has terminated.
        while let Some(joined) = probes.join_next().await {
            if let Err(e) = joined {
                probes.shutdown().await;
                return Err(HarnessError::WorkerLost(e.to_string()));
            }
        }

        let verdict = results.seal();
        span.in_scope(|| {
            if verdict.failed {
                warn!(
                    "{} of {} probes failed",
                    verdict.diagnostics.len(),
                    self.count
                );
            } else {
                info!("All {} probes passed", self.count);
            }
        });

        Ok(verdict)
    }
}

/// Run `count` probes with no timeout. See [`Harness::run`].
pub async fn run_probes<F, Fut>(count: usize, probe: F) -> Result<Verdict, HarnessError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<(), ProbeError>> + Send + 'static,
{
    Harness::new(count).run(probe).await
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

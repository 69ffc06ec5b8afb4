//! Concurrent probe harness.
//!
//! Launches a fixed number of independent probes as tokio tasks, collects
//! their failures into a shared [`ResultSet`], waits for every probe to
//! finish and reduces the set into a single [`Verdict`].

mod error;
mod harness;
mod result;


pub use error::{BoxError, HarnessError, ProbeError};
pub use harness::{run_probes, Harness};
pub use result::{Outcome, ResultSet, Verdict};

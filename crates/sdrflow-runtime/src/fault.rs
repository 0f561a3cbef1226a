//! Observability sink for window faults.
//!
//! A malformed window or a failing transform costs one scheduling turn. The
//! scheduler drops the window, hands a [`Fault`] to the configured
//! [`FaultSink`] and carries on with the next window. Faults are also counted
//! in [`FlowgraphStats`](crate::FlowgraphStats).

use sdrflow_core::FlowError;

/// One dropped scheduling turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    /// Name of the block that failed.
    pub block: String,
    /// Sequence number of the window (counted from 1 across the run).
    pub window: u64,
    /// What went wrong.
    pub error: FlowError,
}

/// Receiver for scheduler faults.
///
/// Called on the scheduler's own task, so implementations must not block.
pub trait FaultSink: Send + Sync {
    /// Record one fault.
    fn report(&self, fault: &Fault);
}

/// Default sink: one `warn` event per fault.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFaultSink;

impl FaultSink for TracingFaultSink {
    fn report(&self, fault: &Fault) {
        tracing::warn!(
            block = %fault.block,
            window = fault.window,
            error = %fault.error,
            "window dropped"
        );
    }
}

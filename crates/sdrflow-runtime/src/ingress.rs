//! Admission control for inbound samples.
//!
//! The [`IngressGate`] is the only writer into the flowgraph's sample buffer.
//! It admits a chunk whole or not at all:
//!
//! | Situation | [`AdmissionPolicy::Reject`] | [`AdmissionPolicy::Wait`] |
//! |---|---|---|
//! | chunk fits free space | `Ok(true)` | `Ok(true)` |
//! | chunk fits once whole windows drain | `Ok(false)` | suspend, retry on space freed |
//! | chunk never fits beside the partial window | `Ok(false)` | `Ok(false)` |
//! | chunk exceeds capacity | `Ok(false)` | `Ok(false)` |
//! | empty chunk | `Err(InvalidChunk)` | `Err(InvalidChunk)` |
//! | after stop | `Err(ShutdownInProgress)` | `Err(ShutdownInProgress)` |
//!
//! A waiting push only suspends on the scheduler's space-freed signal, so it
//! never blocks the host's executor thread. The scheduler frees space one
//! whole window at a time; samples short of a window stay put until more
//! data arrives, so a push that only fits once they are gone is rejected.

use crate::config::AdmissionPolicy;
use crate::flowgraph::Shared;
use sdrflow_core::{FlowError, Result, SampleWriter};
use std::sync::Arc;

/// Write side of a flowgraph.
pub struct IngressGate {
    writer: SampleWriter,
    shared: Arc<Shared>,
    policy: AdmissionPolicy,
}

impl IngressGate {
    pub(crate) fn new(writer: SampleWriter, shared: Arc<Shared>, policy: AdmissionPolicy) -> Self {
        Self {
            writer,
            shared,
            policy,
        }
    }

    /// Enqueue `samples` for the scheduler.
    ///
    /// Resolves to `Ok(true)` once the whole chunk is buffered and `Ok(false)`
    /// if it was turned away. A rejected chunk leaves the buffer untouched.
    pub async fn push(&mut self, samples: &[i8]) -> Result<bool> {
        loop {
            if self.shared.is_stopping() || self.writer.is_reader_dropped() {
                return Err(FlowError::ShutdownInProgress);
            }

            match self.writer.try_write(samples) {
                Ok(()) => {
                    self.shared.stats.record_accept(samples.len());
                    self.shared.data_ready.notify_one();
                    return Ok(true);
                }
                Err(FlowError::AdmissionRejected { requested, free }) => {
                    if self.policy == AdmissionPolicy::Wait
                        && requested <= free + self.reclaimable(free)
                    {
                        tracing::trace!(requested, free, "push waiting for space");
                        self.shared.space_freed.notified().await;
                        continue;
                    }
                    self.shared.stats.record_reject();
                    tracing::debug!(requested, free, "push rejected");
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Buffered samples the scheduler will drain without further input.
    fn reclaimable(&self, free: usize) -> usize {
        let buffered = self.writer.capacity().saturating_sub(free);
        let window = self.shared.next_window_len().max(1);
        buffered / window * window
    }

    /// Samples that fit right now.
    pub fn free(&self) -> usize {
        self.writer.free()
    }

    /// Total buffer capacity.
    pub fn capacity(&self) -> usize {
        self.writer.capacity()
    }

    /// Active admission policy.
    pub fn policy(&self) -> AdmissionPolicy {
        self.policy
    }
}

impl std::fmt::Debug for IngressGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngressGate")
            .field("free", &self.free())
            .field("capacity", &self.capacity())
            .field("policy", &self.policy)
            .finish()
    }
}

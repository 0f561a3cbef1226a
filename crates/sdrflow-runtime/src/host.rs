//! Host-facing facade.
//!
//! [`HostRuntime`] bundles one flowgraph behind the four entry points a host
//! environment (UI event loop, worker, network service) calls:
//!
//! | Entry point | Behaviour |
//! |---|---|
//! | [`push_samples`](HostRuntime::push_samples) | admit a chunk, `false` if turned away |
//! | [`run_fg`](HostRuntime::run_fg) | drive the scheduler until stopped |
//! | [`return_get_samples`](HostRuntime::return_get_samples) | copy of the latest spectrum |
//! | [`stop`](HostRuntime::stop) | request shutdown |
//!
//! All methods take `&self`, so the runtime can sit in an `Arc` shared by
//! every host task. Concurrent pushes are serialized on an async mutex around
//! the single gate.
//!
//! # Example
//!
//! ```rust
//! use sdrflow_runtime::{FlowgraphConfig, HostRuntime};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut config = FlowgraphConfig::default();
//! config.transform.fft_size = 64;
//! let host = Arc::new(HostRuntime::new(config).unwrap());
//!
//! let runner = Arc::clone(&host);
//! let task = tokio::spawn(async move { runner.run_fg().await });
//!
//! assert!(host.push_samples(vec![0; 128]).await);
//! host.handle().wait_for_generation(1).await;
//! assert_eq!(host.return_get_samples().len(), 64);
//!
//! host.stop();
//! task.await.unwrap().unwrap();
//! assert!(!host.push_samples(vec![1; 8]).await);
//! # });
//! ```

use crate::config::{ConfigError, FlowgraphConfig};
use crate::flowgraph::{Flowgraph, FlowgraphHandle, FlowgraphSummary};
use crate::ingress::IngressGate;
use sdrflow_core::{FlowError, Result};

/// One flowgraph packaged for a host environment.
pub struct HostRuntime {
    gate: tokio::sync::Mutex<IngressGate>,
    flowgraph: parking_lot::Mutex<Option<Flowgraph>>,
    handle: FlowgraphHandle,
}

impl HostRuntime {
    /// Build a flowgraph with the default spectrum block.
    pub fn new(config: FlowgraphConfig) -> std::result::Result<Self, ConfigError> {
        let (flowgraph, gate, handle) = Flowgraph::new(config)?;
        Ok(Self::from_parts(flowgraph, gate, handle))
    }

    /// Wrap an already built flowgraph.
    pub fn from_parts(flowgraph: Flowgraph, gate: IngressGate, handle: FlowgraphHandle) -> Self {
        Self {
            gate: tokio::sync::Mutex::new(gate),
            flowgraph: parking_lot::Mutex::new(Some(flowgraph)),
            handle,
        }
    }

    /// Offer a chunk of interleaved i8 samples.
    ///
    /// `true` means every sample is buffered. Rejection, empty chunks and
    /// calls after [`stop`](Self::stop) all resolve to `false`.
    pub async fn push_samples(&self, samples: Vec<i8>) -> bool {
        let mut gate = self.gate.lock().await;
        match gate.push(&samples).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::debug!(error = %e, len = samples.len(), "push refused");
                false
            }
        }
    }

    /// Run the scheduler until [`stop`](Self::stop).
    ///
    /// Only the first call runs; later calls get [`FlowError::AlreadyRunning`].
    pub async fn run_fg(&self) -> Result<FlowgraphSummary> {
        let flowgraph = self
            .flowgraph
            .lock()
            .take()
            .ok_or(FlowError::AlreadyRunning)?;
        Ok(flowgraph.run().await)
    }

    /// Copy of the latest spectrum; empty before the first computation.
    pub fn return_get_samples(&self) -> Vec<f32> {
        self.handle.read_bins()
    }

    /// Request shutdown. The in-flight window still publishes.
    pub fn stop(&self) {
        self.handle.stop();
    }

    /// Handle for parameter updates, stats and generation-aware reads.
    pub fn handle(&self) -> &FlowgraphHandle {
        &self.handle
    }
}

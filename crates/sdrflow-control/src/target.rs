//! What widgets talk to.
//!
//! The bridge never touches a flowgraph directly. It goes through three
//! small traits so the same widgets can drive an in-process flowgraph, a
//! remote node, or a test double:
//!
//! - [`ParameterSink`] - local block-parameter updates
//! - [`EndpointClient`] - remote parameter calls and data fetches by URL
//! - [`SnapshotSource`] - direct reads of the latest spectrum
//!
//! [`FlowgraphHandle`] implements both local traits.

use sdrflow_core::{BlockId, Snapshot, SnapshotStore};
use sdrflow_runtime::FlowgraphHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Receives block-parameter updates for the local flowgraph.
pub trait ParameterSink: Send + Sync {
    /// Apply `value` to parameter `index` of `block`, returning the stored value.
    fn update_param(&self, block: BlockId, index: usize, value: f64) -> sdrflow_core::Result<f64>;
}

/// Read access to the latest published spectrum.
pub trait SnapshotSource: Send + Sync {
    /// Current snapshot. Must not block.
    fn latest(&self) -> Arc<Snapshot>;
}

/// Kind of data a picker widget requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    /// Spectrum data around a frequency.
    Freq,
    /// Data at a point in time.
    Time,
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchKind::Freq => f.write_str("freq"),
            FetchKind::Time => f.write_str("time"),
        }
    }
}

/// Failure reported by an [`EndpointClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EndpointError(String);

impl EndpointError {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Addressable remote endpoints.
pub trait EndpointClient: Send + Sync {
    /// Forward a parameter change to a remote flowgraph.
    fn call(
        &self,
        url: &str,
        block: BlockId,
        index: usize,
        value: f64,
    ) -> std::result::Result<(), EndpointError>;

    /// Request data of `kind` at `value` from `url`.
    fn fetch(&self, url: &str, kind: FetchKind, value: f64) -> std::result::Result<(), EndpointError>;
}

/// Client for processes with no remote endpoints: every request fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEndpoints;

impl EndpointClient for NoEndpoints {
    fn call(
        &self,
        url: &str,
        _block: BlockId,
        _index: usize,
        _value: f64,
    ) -> std::result::Result<(), EndpointError> {
        Err(EndpointError::new(format!("no endpoint client for '{url}'")))
    }

    fn fetch(&self, url: &str, _kind: FetchKind, _value: f64) -> std::result::Result<(), EndpointError> {
        Err(EndpointError::new(format!("no endpoint client for '{url}'")))
    }
}

impl ParameterSink for FlowgraphHandle {
    fn update_param(&self, block: BlockId, index: usize, value: f64) -> sdrflow_core::Result<f64> {
        FlowgraphHandle::update_param(self, block, index, value)
    }
}

impl SnapshotSource for FlowgraphHandle {
    fn latest(&self) -> Arc<Snapshot> {
        self.snapshot()
    }
}

impl SnapshotSource for SnapshotStore {
    fn latest(&self) -> Arc<Snapshot> {
        self.read()
    }
}

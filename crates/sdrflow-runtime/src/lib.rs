//! sdrflow runtime - the flowgraph engine
//!
//! Turns the leaf primitives of `sdrflow-core` into a running system:
//!
//! - [`flowgraph`] - the cooperative scheduler, its builder and handle
//! - [`ingress`] - admission control in front of the sample buffer
//! - [`host`] - `push_samples` / `run_fg` / `return_get_samples` facade
//! - [`config`] - serde/TOML configuration
//! - [`frontend`] - radio front-end settings as block parameters
//! - [`fault`] - observability sink for dropped windows
//! - [`stats`] - lock-free counters
//!
//! The scheduler is a plain `async fn` meant to be spawned on a tokio
//! runtime; a current-thread runtime is enough. Its only suspension points
//! are `tokio::sync::Notify` waits and `tokio::task::yield_now`.

pub mod config;
pub mod fault;
pub mod flowgraph;
pub mod frontend;
pub mod host;
pub mod ingress;
pub mod stats;

pub use config::{AdmissionPolicy, ConfigError, DEFAULT_BUFFER_CAPACITY, FlowgraphConfig};
pub use fault::{Fault, FaultSink, TracingFaultSink};
pub use flowgraph::{
    BLOCKS, Flowgraph, FlowgraphBuilder, FlowgraphHandle, FlowgraphSummary, TransformFactory,
};
pub use frontend::{FrontendConfig, FrontendSettings};
pub use host::HostRuntime;
pub use ingress::IngressGate;
pub use stats::{FlowgraphStats, StatsSnapshot};

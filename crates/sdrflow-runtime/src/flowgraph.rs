//! Cooperative flowgraph scheduler.
//!
//! A flowgraph is built once and split into three parts:
//!
//! ```text
//!   IngressGate ──push──► SampleBuffer ──window──► Flowgraph::run ──publish──► SnapshotStore
//!        ▲                                              ▲                          │
//!        └── space freed ───────────────────────────────┤                          ▼
//!                                   FlowgraphHandle ── stop / update_param ── read / stats
//! ```
//!
//! - [`Flowgraph`] owns the read half of the sample buffer, the transform and
//!   the snapshot publisher. [`Flowgraph::run`] is the single long-lived task.
//! - [`IngressGate`] owns the write half.
//! - [`FlowgraphHandle`] is cheap to clone and carries everything else: stop
//!   requests, parameter updates, snapshot reads, counters.
//!
//! # Scheduling
//!
//! Each turn of [`run`](Flowgraph::run):
//!
//! 1. Window boundary: apply a staged block configuration, if any.
//! 2. Exit if a stop was requested.
//! 3. Drain exactly one window (FIFO), or park until the gate signals data.
//! 4. Compute, then publish (every N-th window under decimation). A failing
//!    window is reported to the [`FaultSink`] and dropped.
//! 5. Yield to the host runtime.
//!
//! The loop never busy-polls: with less than a window buffered it parks on a
//! [`Notify`] that the gate and [`FlowgraphHandle::stop`] both signal.
//!
//! # Example
//!
//! ```rust
//! use sdrflow_runtime::{Flowgraph, FlowgraphConfig};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut config = FlowgraphConfig::default();
//! config.transform.fft_size = 64;
//! let (flowgraph, mut gate, handle) = Flowgraph::new(config).unwrap();
//!
//! let task = tokio::spawn(flowgraph.run());
//! assert!(gate.push(&[0; 128]).await.unwrap());
//! handle.wait_for_generation(1).await;
//! assert_eq!(handle.read_bins(), vec![0.0; 64]);
//!
//! handle.stop();
//! let summary = task.await.unwrap();
//! assert_eq!(summary.last_generation, 1);
//! # });
//! ```

use crate::config::{ConfigError, FlowgraphConfig};
use crate::fault::{Fault, FaultSink, TracingFaultSink};
use crate::frontend::FrontendSettings;
use crate::ingress::IngressGate;
use crate::stats::{FlowgraphStats, StatsSnapshot};
use arc_swap::{ArcSwap, ArcSwapOption};
use parking_lot::{Mutex, RwLock};
use sdrflow_analysis::{SpectrumConfig, SpectrumTransform};
use sdrflow_core::{
    BlockId, BlockParameter, FlowError, Result, SampleBuffer, SampleReader, Snapshot,
    SnapshotPublisher, SnapshotStore, Transform,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Builds the transform for a block configuration.
///
/// Called once at construction and again for every applied parameter update.
pub type TransformFactory =
    Box<dyn FnMut(&SpectrumConfig) -> Result<Box<dyn Transform>> + Send>;

/// Blocks addressable through [`FlowgraphHandle::update_param`].
pub const BLOCKS: [(BlockId, &str); 2] = [
    (BlockId::SPECTRUM, "spectrum"),
    (BlockId::FRONTEND, "frontend"),
];

fn spectrum_factory(config: &SpectrumConfig) -> Result<Box<dyn Transform>> {
    Ok(Box::new(SpectrumTransform::new(config.clone())?))
}

// ── Shared state ────────────────────────────────────────────────────────────

/// State reachable from the scheduler, the gate and every handle.
pub(crate) struct Shared {
    /// Gate → scheduler: samples were enqueued (or stop was requested).
    pub(crate) data_ready: Notify,
    /// Scheduler → gate: a window was drained (or stop was requested).
    pub(crate) space_freed: Notify,
    /// Scheduler → handles: a snapshot was published or the run ended.
    published: Notify,
    stopping: AtomicBool,
    running: AtomicBool,
    pub(crate) capacity: usize,
    pub(crate) stats: FlowgraphStats,
    /// Latest requested spectrum configuration; updates build on it.
    staged: Mutex<SpectrumConfig>,
    /// Handoff slot read by the scheduler at each window boundary.
    pending: ArcSwapOption<SpectrumConfig>,
    /// Configuration the running transform was built from.
    active: ArcSwap<SpectrumConfig>,
    /// Input length of the running transform.
    window_len: AtomicUsize,
    frontend: RwLock<FrontendSettings>,
    faults: Arc<dyn FaultSink>,
}

impl Shared {
    pub(crate) fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Window length the scheduler drains next. A staged change wins over
    /// the running transform since it is applied before the next read.
    pub(crate) fn next_window_len(&self) -> usize {
        match self.pending.load().as_ref() {
            Some(pending) => pending.window_len(),
            None => self.window_len.load(Ordering::Acquire),
        }
    }

    fn request_stop(&self) {
        if !self.stopping.swap(true, Ordering::AcqRel) {
            tracing::info!("flowgraph stop requested");
        }
        self.data_ready.notify_one();
        self.space_freed.notify_one();
        self.published.notify_waiters();
    }
}

// ── Builder ─────────────────────────────────────────────────────────────────

/// Configures and constructs a [`Flowgraph`].
pub struct FlowgraphBuilder {
    config: FlowgraphConfig,
    factory: Option<TransformFactory>,
    faults: Option<Arc<dyn FaultSink>>,
}

impl FlowgraphBuilder {
    /// Start from a configuration.
    pub fn new(config: FlowgraphConfig) -> Self {
        Self {
            config,
            factory: None,
            faults: None,
        }
    }

    /// Replace the spectrum transform with a custom block.
    pub fn transform_factory<F>(mut self, factory: F) -> Self
    where
        F: FnMut(&SpectrumConfig) -> Result<Box<dyn Transform>> + Send + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Route faults somewhere other than the tracing log.
    pub fn fault_sink(mut self, sink: Arc<dyn FaultSink>) -> Self {
        self.faults = Some(sink);
        self
    }

    /// Validate the configuration and split into scheduler, gate and handle.
    pub fn build(
        self,
    ) -> std::result::Result<(Flowgraph, IngressGate, FlowgraphHandle), ConfigError> {
        let FlowgraphBuilder {
            config,
            factory,
            faults,
        } = self;
        config.validate()?;

        let mut factory: TransformFactory = match factory {
            Some(factory) => factory,
            None => Box::new(spectrum_factory),
        };
        let transform = factory(&config.transform)?;
        let window = transform.input_len();
        if window == 0 {
            return Err(FlowError::TransformFailure(format!(
                "block '{}' declares an empty window",
                transform.name()
            ))
            .into());
        }
        if window > config.buffer_capacity {
            return Err(ConfigError::BufferTooSmall {
                capacity: config.buffer_capacity,
                window,
            });
        }
        let frontend = FrontendSettings::from_config(&config.frontend)?;

        let (writer, reader) = SampleBuffer::with_capacity(config.buffer_capacity);
        let (store, publisher) = SnapshotStore::new();
        let shared = Arc::new(Shared {
            data_ready: Notify::new(),
            space_freed: Notify::new(),
            published: Notify::new(),
            stopping: AtomicBool::new(false),
            running: AtomicBool::new(false),
            capacity: config.buffer_capacity,
            stats: FlowgraphStats::default(),
            staged: Mutex::new(config.transform.clone()),
            pending: ArcSwapOption::empty(),
            active: ArcSwap::from_pointee(config.transform.clone()),
            window_len: AtomicUsize::new(window),
            frontend: RwLock::new(frontend),
            faults: faults.unwrap_or_else(|| Arc::new(TracingFaultSink)),
        });

        tracing::debug!(
            capacity = config.buffer_capacity,
            window_len = window,
            admission = ?config.admission,
            "flowgraph built"
        );

        let flowgraph = Flowgraph {
            reader,
            publisher,
            transform,
            factory,
            decimation: config.transform.decimation.max(1),
            shared: Arc::clone(&shared),
        };
        let gate = IngressGate::new(writer, Arc::clone(&shared), config.admission);
        let handle = FlowgraphHandle { shared, store };
        Ok((flowgraph, gate, handle))
    }
}

// ── Scheduler ───────────────────────────────────────────────────────────────

/// Outcome of a finished [`Flowgraph::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowgraphSummary {
    /// Generation of the last published snapshot (0 if none).
    pub last_generation: u64,
    /// Samples still buffered when the run stopped.
    pub discarded_samples: usize,
    /// Counters at shutdown.
    pub stats: StatsSnapshot,
}

/// The scheduler task. Consumed by [`run`](Self::run).
pub struct Flowgraph {
    reader: SampleReader,
    publisher: SnapshotPublisher,
    transform: Box<dyn Transform>,
    factory: TransformFactory,
    decimation: u32,
    shared: Arc<Shared>,
}

impl Flowgraph {
    /// Build with the default spectrum block and tracing fault sink.
    pub fn new(
        config: FlowgraphConfig,
    ) -> std::result::Result<(Flowgraph, IngressGate, FlowgraphHandle), ConfigError> {
        FlowgraphBuilder::new(config).build()
    }

    /// Start a [`FlowgraphBuilder`].
    pub fn builder(config: FlowgraphConfig) -> FlowgraphBuilder {
        FlowgraphBuilder::new(config)
    }

    /// Run until [`FlowgraphHandle::stop`] is called.
    ///
    /// A window that is already being computed when the stop arrives is
    /// finished and published. Samples still buffered after that are dropped.
    pub async fn run(mut self) -> FlowgraphSummary {
        let shared = Arc::clone(&self.shared);
        shared.running.store(true, Ordering::Release);

        let mut window = vec![0i8; self.transform.input_len()];
        let mut skip = 0u32;
        let mut sequence = 0u64;

        tracing::info!(
            block = self.transform.name(),
            window_len = window.len(),
            capacity = self.reader.capacity(),
            "flowgraph running"
        );

        loop {
            if let Some(next) = shared.pending.swap(None) {
                if self.apply(&next, sequence) {
                    window.resize(self.transform.input_len(), 0);
                    skip = 0;
                }
            }

            if shared.is_stopping() {
                break;
            }

            if !self.reader.read_window(&mut window) {
                shared.data_ready.notified().await;
                continue;
            }
            sequence += 1;
            shared.stats.record_consumed(window.len());
            shared.space_freed.notify_one();

            match self.transform.compute(&window) {
                Ok(bins) => {
                    shared.stats.record_computed();
                    if skip == 0 {
                        let generation = self.publisher.publish(bins);
                        shared.stats.record_published();
                        shared.published.notify_waiters();
                        tracing::trace!(generation, window = sequence, "snapshot published");
                        skip = self.decimation - 1;
                    } else {
                        skip -= 1;
                        shared.stats.record_decimated();
                    }
                }
                Err(error) => self.fault(sequence, error),
            }

            tokio::task::yield_now().await;
        }

        let discarded_samples = self.reader.len();
        let summary = FlowgraphSummary {
            last_generation: self.publisher.last_generation(),
            discarded_samples,
            stats: shared.stats.snapshot(),
        };
        drop(self);

        shared.running.store(false, Ordering::Release);
        shared.published.notify_waiters();
        tracing::info!(
            generation = summary.last_generation,
            discarded = discarded_samples,
            faults = summary.stats.faults,
            "flowgraph stopped"
        );
        summary
    }

    /// Rebuild the transform from a staged configuration.
    fn apply(&mut self, next: &Arc<SpectrumConfig>, sequence: u64) -> bool {
        let transform = match (self.factory)(next.as_ref()) {
            Ok(t) if t.input_len() > 0 && t.input_len() <= self.reader.capacity() => t,
            Ok(t) => {
                let error = FlowError::TransformFailure(format!(
                    "window of {} samples does not fit buffer of {}",
                    t.input_len(),
                    self.reader.capacity()
                ));
                self.fault(sequence, error);
                return false;
            }
            Err(error) => {
                self.fault(sequence, error);
                return false;
            }
        };

        tracing::debug!(
            fft_size = next.fft_size,
            window = %next.window,
            decimation = next.decimation,
            window_len = transform.input_len(),
            "block configuration applied"
        );
        self.transform = transform;
        self.decimation = next.decimation.max(1);
        self.shared.active.store(Arc::clone(next));
        self.shared
            .window_len
            .store(self.transform.input_len(), Ordering::Release);
        // a waiting push sized against the old window must recheck
        self.shared.space_freed.notify_one();
        true
    }

    fn fault(&self, window: u64, error: FlowError) {
        self.shared.stats.record_fault();
        self.shared.faults.report(&Fault {
            block: self.transform.name().to_owned(),
            window,
            error,
        });
    }
}

// ── Handle ──────────────────────────────────────────────────────────────────

/// Control and read access to a flowgraph. Cheap to clone.
#[derive(Clone)]
pub struct FlowgraphHandle {
    shared: Arc<Shared>,
    store: SnapshotStore,
}

impl FlowgraphHandle {
    /// Latest published snapshot. Never blocks.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.read()
    }

    /// Copy of the latest bins (empty before the first publication).
    pub fn read_bins(&self) -> Vec<f32> {
        self.store.read_bins()
    }

    /// Generation of the latest snapshot.
    pub fn generation(&self) -> u64 {
        self.store.generation()
    }

    /// A reader onto the snapshot store.
    pub fn store(&self) -> SnapshotStore {
        self.store.clone()
    }

    /// Wait until `generation` is published or the run ends.
    ///
    /// Returns the generation current at wake-up.
    pub async fn wait_for_generation(&self, generation: u64) -> u64 {
        loop {
            let notified = self.shared.published.notified();
            let current = self.store.generation();
            if current >= generation || (self.is_stopping() && !self.is_running()) {
                return current;
            }
            notified.await;
        }
    }

    /// Ask the scheduler to finish its current window and exit.
    ///
    /// Idempotent. Later pushes fail with [`FlowError::ShutdownInProgress`].
    pub fn stop(&self) {
        self.shared.request_stop();
    }

    /// Whether a stop has been requested.
    pub fn is_stopping(&self) -> bool {
        self.shared.is_stopping()
    }

    /// Whether [`Flowgraph::run`] is currently executing.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Sample-buffer capacity.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Counter snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Most recently requested spectrum configuration.
    pub fn spectrum_config(&self) -> SpectrumConfig {
        self.shared.staged.lock().clone()
    }

    /// Configuration the running transform was built from.
    pub fn active_config(&self) -> Arc<SpectrumConfig> {
        self.shared.active.load_full()
    }

    /// Current front-end settings.
    pub fn frontend(&self) -> FrontendSettings {
        self.shared.frontend.read().clone()
    }

    /// Parameter table of `block`, with current values.
    pub fn parameters(&self, block: BlockId) -> Result<Vec<BlockParameter>> {
        match block {
            BlockId::SPECTRUM => self.shared.staged.lock().parameters(),
            BlockId::FRONTEND => Ok(self.shared.frontend.read().parameters().to_vec()),
            other => Err(FlowError::UnknownBlock(other)),
        }
    }

    /// Change one block parameter without restarting the flowgraph.
    ///
    /// `value` must lie on the parameter's grid. Spectrum changes are staged
    /// and take effect at the next window boundary; buffered samples are kept
    /// and consumed with the new window length. Returns the stored value.
    pub fn update_param(&self, block: BlockId, index: usize, value: f64) -> Result<f64> {
        if self.is_stopping() {
            return Err(FlowError::ShutdownInProgress);
        }
        match block {
            BlockId::SPECTRUM => {
                let mut staged = self.shared.staged.lock();
                let next = staged.with_param(index, value)?;
                let window = next.window_len();
                if window > self.shared.capacity {
                    return Err(FlowError::invalid_parameter(
                        "fft_order",
                        value,
                        format!(
                            "window of {window} samples exceeds buffer capacity {}",
                            self.shared.capacity
                        ),
                    ));
                }
                let applied = next
                    .parameters()?
                    .get(index)
                    .map_or(value, BlockParameter::value);
                *staged = next.clone();
                self.shared.pending.store(Some(Arc::new(next)));
                drop(staged);

                // Wake a parked scheduler so the change lands even without new data,
                // and a waiting push so it rechecks against the new window.
                self.shared.data_ready.notify_one();
                self.shared.space_freed.notify_one();
                tracing::debug!(%block, index, value = applied, "parameter staged");
                Ok(applied)
            }
            BlockId::FRONTEND => {
                let applied = self.shared.frontend.write().set(index, value)?;
                tracing::debug!(%block, index, value = applied, "front-end parameter set");
                Ok(applied)
            }
            other => Err(FlowError::UnknownBlock(other)),
        }
    }
}

impl std::fmt::Debug for FlowgraphHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowgraphHandle")
            .field("generation", &self.generation())
            .field("running", &self.is_running())
            .field("stopping", &self.is_stopping())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> FlowgraphConfig {
        let mut config = FlowgraphConfig::default();
        config.transform.fft_size = 64;
        config.buffer_capacity = 1024;
        config
    }

    #[test]
    fn build_rejects_invalid_config() {
        let mut config = small_config();
        config.buffer_capacity = 100;
        assert!(matches!(
            Flowgraph::new(config),
            Err(ConfigError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn spectrum_update_is_staged() {
        let (_fg, _gate, handle) = Flowgraph::new(small_config()).unwrap();
        assert_eq!(handle.update_param(BlockId::SPECTRUM, 0, 7.0).unwrap(), 7.0);
        assert_eq!(handle.spectrum_config().fft_size, 128);
        // Not applied until the scheduler reaches a window boundary.
        assert_eq!(handle.active_config().fft_size, 64);
    }

    #[test]
    fn updates_build_on_each_other() {
        let (_fg, _gate, handle) = Flowgraph::new(small_config()).unwrap();
        handle.update_param(BlockId::SPECTRUM, 0, 8.0).unwrap();
        handle.update_param(BlockId::SPECTRUM, 3, 4.0).unwrap();
        let staged = handle.spectrum_config();
        assert_eq!(staged.fft_size, 256);
        assert_eq!(staged.decimation, 4);
    }

    #[test]
    fn window_larger_than_buffer_is_refused() {
        let (_fg, _gate, handle) = Flowgraph::new(small_config()).unwrap();
        // 1024-point IQ needs 2048 samples; the buffer holds 1024.
        let err = handle.update_param(BlockId::SPECTRUM, 0, 10.0).unwrap_err();
        assert!(matches!(err, FlowError::InvalidParameter { .. }));
        assert_eq!(handle.spectrum_config().fft_size, 64);
    }

    #[test]
    fn unknown_targets() {
        let (_fg, _gate, handle) = Flowgraph::new(small_config()).unwrap();
        assert_eq!(
            handle.update_param(BlockId(9), 0, 1.0),
            Err(FlowError::UnknownBlock(BlockId(9)))
        );
        assert!(matches!(
            handle.update_param(BlockId::FRONTEND, 12, 1.0),
            Err(FlowError::UnknownParameter { index: 12, .. })
        ));
        assert!(handle.parameters(BlockId(9)).is_err());
    }

    #[test]
    fn frontend_update_applies_immediately() {
        let (_fg, _gate, handle) = Flowgraph::new(small_config()).unwrap();
        handle
            .update_param(BlockId::FRONTEND, crate::frontend::param::VGA, 20.0)
            .unwrap();
        assert_eq!(handle.frontend().to_config().vga, 20);
        assert!(handle
            .update_param(BlockId::FRONTEND, crate::frontend::param::VGA, 21.0)
            .is_err());
    }

    #[test]
    fn updates_refused_after_stop() {
        let (_fg, _gate, handle) = Flowgraph::new(small_config()).unwrap();
        handle.stop();
        assert_eq!(
            handle.update_param(BlockId::FRONTEND, 0, 1e8),
            Err(FlowError::ShutdownInProgress)
        );
    }
}

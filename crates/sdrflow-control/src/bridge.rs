//! Widget registry and dispatch.
//!
//! [`ControlBridge`] owns every widget a host UI has registered. Each widget
//! carries a value range and a step grid; [`ControlBridge::notify`] snaps an
//! incoming value onto that grid, forwards it to the widget's target and,
//! once the target accepts it, tells every registered listener.
//!
//! ```text
//! host UI ──notify(id, v)──▶ ControlBridge ──snap──▶ local?  ── ParameterSink::update_param
//!                                                    remote? ── EndpointClient::call
//!                                                    picker? ── EndpointClient::fetch
//!                                    ◀── ControlEvent to listeners
//! ```
//!
//! Registration and dispatch take `&self`; the bridge can be shared across
//! threads in an `Arc`.

use crate::error::{ControlError, Result};
use crate::target::{EndpointClient, FetchKind, ParameterSink, SnapshotSource};
use crate::widget::{Widget, WidgetKind};
use parking_lot::RwLock;
use sdrflow_core::{BlockId, BlockParameter, ParamUnit, Snapshot};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Grid spacing for frequency pickers (Hz).
pub const FREQ_STEP: f64 = 1.0;

/// Grid spacing for time pickers (seconds).
pub const TIME_STEP: f64 = 1e-3;

/// Opaque listener registration returned by [`ControlBridge::register_callback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackHandle(u64);

/// Delivered to listeners after a widget value is applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlEvent {
    /// Widget that changed.
    pub id: String,
    /// Value the target stored.
    pub value: f64,
}

type Listener = Arc<dyn Fn(&ControlEvent) + Send + Sync>;

/// Maps UI widgets onto flowgraph parameters and remote endpoints.
pub struct ControlBridge {
    params: Arc<dyn ParameterSink>,
    endpoints: Arc<dyn EndpointClient>,
    snapshots: Option<Arc<dyn SnapshotSource>>,
    widgets: RwLock<BTreeMap<String, Widget>>,
    listeners: RwLock<HashMap<CallbackHandle, Listener>>,
    next_handle: AtomicU64,
}

impl ControlBridge {
    /// Bridge with local parameter updates going to `params` and remote
    /// traffic to `endpoints`.
    pub fn new(params: Arc<dyn ParameterSink>, endpoints: Arc<dyn EndpointClient>) -> Self {
        Self {
            params,
            endpoints,
            snapshots: None,
            widgets: RwLock::new(BTreeMap::new()),
            listeners: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Attach a spectrum source for [`spectrum`](Self::spectrum) (builder style).
    pub fn with_snapshots(mut self, source: Arc<dyn SnapshotSource>) -> Self {
        self.snapshots = Some(source);
        self
    }

    // ── Listeners ──

    /// Register a listener for applied widget changes.
    pub fn register_callback<F>(&self, listener: F) -> CallbackHandle
    where
        F: Fn(&ControlEvent) + Send + Sync + 'static,
    {
        let handle = CallbackHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().insert(handle, Arc::new(listener));
        handle
    }

    /// Remove a listener. Returns `false` if the handle was not registered.
    pub fn unregister_callback(&self, handle: CallbackHandle) -> bool {
        self.listeners.write().remove(&handle).is_some()
    }

    // ── Registration ──

    /// Register an integer slider bound to parameter `callback` of `block`.
    ///
    /// `url` selects the target: empty or `"local"` for the in-process
    /// flowgraph, anything else is handed to the endpoint client.
    pub fn add_slider_u32(
        &self,
        id: &str,
        url: &str,
        block: u32,
        callback: usize,
        min: u32,
        max: u32,
        step: u32,
        value: u32,
    ) -> Result<()> {
        let param = BlockParameter::new(id, min.into(), max.into(), step.into(), value.into())
            .map_err(|source| ControlError::InvalidWidget {
                id: id.to_string(),
                source,
            })?;
        let kind = WidgetKind::Slider {
            block: BlockId(block),
            index: callback,
        };
        self.insert(Widget::new(url.to_string(), kind, param))
    }

    /// Register one slider per entry of a block's parameter table.
    ///
    /// Widget ids are the parameter ids; the table position is the index.
    pub fn add_block(&self, url: &str, block: BlockId, params: &[BlockParameter]) -> Result<()> {
        for (index, param) in params.iter().enumerate() {
            self.insert(Widget::new(
                url.to_string(),
                WidgetKind::Slider { block, index },
                param.clone(),
            ))?;
        }
        Ok(())
    }

    /// Register a frequency picker over `[min, max]` Hz.
    pub fn add_freq(&self, id: &str, url: &str, min: f64, max: f64) -> Result<()> {
        self.add_picker(id, url, FetchKind::Freq, min, max, FREQ_STEP, ParamUnit::Hertz)
    }

    /// Register a time picker over `[min, max]` seconds.
    pub fn add_time(&self, id: &str, url: &str, min: f64, max: f64) -> Result<()> {
        self.add_picker(id, url, FetchKind::Time, min, max, TIME_STEP, ParamUnit::Seconds)
    }

    fn add_picker(
        &self,
        id: &str,
        url: &str,
        fetch: FetchKind,
        min: f64,
        max: f64,
        step: f64,
        unit: ParamUnit,
    ) -> Result<()> {
        let param = BlockParameter::new(id, min, max, step, min)
            .map_err(|source| ControlError::InvalidWidget {
                id: id.to_string(),
                source,
            })?
            .with_unit(unit);
        self.insert(Widget::new(url.to_string(), WidgetKind::Picker { fetch }, param))
    }

    fn insert(&self, widget: Widget) -> Result<()> {
        let mut widgets = self.widgets.write();
        if widgets.contains_key(widget.id()) {
            return Err(ControlError::DuplicateWidget(widget.id().to_string()));
        }
        tracing::debug!(id = widget.id(), url = widget.url(), kind = ?widget.kind(), "widget registered");
        widgets.insert(widget.id().to_string(), widget);
        Ok(())
    }

    /// Drop a widget. Returns `false` if it was not registered.
    pub fn remove(&self, id: &str) -> bool {
        self.widgets.write().remove(id).is_some()
    }

    // ── Dispatch ──

    /// A widget moved to `value`.
    ///
    /// The value is snapped to the widget's grid and forwarded to its target.
    /// Values outside the range are refused before anything is sent. On
    /// success the stored value is returned and every listener is told; on
    /// failure the widget keeps its previous value.
    pub fn notify(&self, id: &str, value: f64) -> Result<f64> {
        let (url, kind, snapped) = {
            let widgets = self.widgets.read();
            let widget = widgets
                .get(id)
                .ok_or_else(|| ControlError::UnknownWidget(id.to_string()))?;
            let param = widget.param();
            if !value.is_finite() || value < param.min() || value > param.max() {
                return Err(ControlError::OutOfRange {
                    id: id.to_string(),
                    value,
                    min: param.min(),
                    max: param.max(),
                });
            }
            (widget.url().to_string(), widget.kind(), param.snap(value))
        };

        let applied = self.dispatch(id, &url, kind, snapped)?;

        {
            let mut widgets = self.widgets.write();
            // the widget may have been removed while the target was busy
            if let Some(widget) = widgets.get_mut(id) {
                widget.param_mut().set_clamped(applied);
            }
        }
        tracing::debug!(id, value, applied, "widget applied");

        let event = ControlEvent {
            id: id.to_string(),
            value: applied,
        };
        let listeners: Vec<Listener> = self.listeners.read().values().cloned().collect();
        for listener in listeners {
            listener(&event);
        }
        Ok(applied)
    }

    fn dispatch(&self, id: &str, url: &str, kind: WidgetKind, value: f64) -> Result<f64> {
        let local = crate::widget::is_local(url);
        match kind {
            WidgetKind::Slider { block, index } if local => self
                .params
                .update_param(block, index, value)
                .map_err(|source| ControlError::Target {
                    id: id.to_string(),
                    source,
                }),
            WidgetKind::Slider { block, index } => self
                .endpoints
                .call(url, block, index, value)
                .map(|()| value)
                .map_err(|source| ControlError::Endpoint {
                    url: url.to_string(),
                    source,
                }),
            WidgetKind::Picker { fetch } => self
                .endpoints
                .fetch(url, fetch, value)
                .map(|()| value)
                .map_err(|source| ControlError::Endpoint {
                    url: url.to_string(),
                    source,
                }),
        }
    }

    // ── Queries ──

    /// Every registered widget, ordered by id.
    pub fn widgets(&self) -> Vec<Widget> {
        self.widgets.read().values().cloned().collect()
    }

    /// One widget by id.
    pub fn widget(&self, id: &str) -> Option<Widget> {
        self.widgets.read().get(id).cloned()
    }

    /// Current value of a widget.
    pub fn value(&self, id: &str) -> Option<f64> {
        self.widgets.read().get(id).map(Widget::value)
    }

    /// Latest spectrum from the attached source, if any.
    pub fn spectrum(&self) -> Option<Arc<Snapshot>> {
        self.snapshots.as_ref().map(|source| source.latest())
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for ControlBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlBridge")
            .field("widgets", &self.widgets.read().len())
            .field("listeners", &self.listener_count())
            .field("snapshots", &self.snapshots.is_some())
            .finish()
    }
}

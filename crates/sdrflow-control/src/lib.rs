//! sdrflow Control - widgets bound to flowgraph parameters
//!
//! A host UI registers sliders and pickers with a [`ControlBridge`], then
//! reports every user movement through [`ControlBridge::notify`]. The bridge
//! keeps values on each widget's grid, routes them to the local flowgraph or
//! a remote endpoint, and fans the applied value out to listeners.
//!
//! # Example
//!
//! ```rust
//! use sdrflow_control::{ControlBridge, NoEndpoints};
//! use sdrflow_runtime::{Flowgraph, FlowgraphConfig};
//! use std::sync::Arc;
//!
//! let (_flowgraph, _gate, handle) = Flowgraph::new(FlowgraphConfig::default()).unwrap();
//! let bridge = ControlBridge::new(Arc::new(handle.clone()), Arc::new(NoEndpoints));
//!
//! // front-end block 1, parameter 2 (LNA gain), 8 dB steps
//! bridge.add_slider_u32("lna", "", 1, 2, 0, 40, 8, 32).unwrap();
//! assert_eq!(bridge.notify("lna", 13.0).unwrap(), 16.0);
//! assert_eq!(handle.frontend().to_config().lna, 16);
//! ```

pub mod bridge;
pub mod error;
pub mod target;
pub mod widget;

pub use bridge::{CallbackHandle, ControlBridge, ControlEvent, FREQ_STEP, TIME_STEP};
pub use error::{ControlError, Result};
pub use target::{EndpointClient, EndpointError, FetchKind, NoEndpoints, ParameterSink, SnapshotSource};
pub use widget::{LOCAL_URL, Widget, WidgetKind, is_local};

//! Error types for control-bridge operations.

use crate::target::EndpointError;
use sdrflow_core::FlowError;
use thiserror::Error;

/// Errors raised while registering or driving widgets.
#[derive(Debug, Error)]
pub enum ControlError {
    /// No widget with this id is registered.
    #[error("unknown widget '{0}'")]
    UnknownWidget(String),

    /// A widget with this id already exists.
    #[error("widget '{0}' is already registered")]
    DuplicateWidget(String),

    /// The widget's range or step is unusable.
    #[error("invalid widget '{id}': {source}")]
    InvalidWidget {
        /// Widget id.
        id: String,
        /// Why the range was refused.
        #[source]
        source: FlowError,
    },

    /// The requested value lies outside the widget's range.
    #[error("value {value} for widget '{id}' is outside [{min}, {max}]")]
    OutOfRange {
        /// Widget id.
        id: String,
        /// Rejected value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// The local flowgraph refused the parameter update.
    #[error("widget '{id}' update rejected: {source}")]
    Target {
        /// Widget id.
        id: String,
        /// Flowgraph error.
        #[source]
        source: FlowError,
    },

    /// A remote endpoint failed.
    #[error("endpoint '{url}' failed: {source}")]
    Endpoint {
        /// Endpoint address.
        url: String,
        /// Client error.
        #[source]
        source: EndpointError,
    },
}

/// Convenience result type for bridge operations.
pub type Result<T> = std::result::Result<T, ControlError>;

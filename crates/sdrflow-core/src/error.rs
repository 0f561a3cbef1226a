//! Error kinds shared by every sdrflow crate.
//!
//! Errors fall into three groups:
//!
//! - **Admission** — [`FlowError::AdmissionRejected`] and
//!   [`FlowError::InvalidChunk`]. Recoverable; the caller retries or drops.
//! - **Window faults** — [`FlowError::MalformedWindow`] and
//!   [`FlowError::TransformFailure`]. Fatal to one scheduling turn only; the
//!   scheduler reports them and moves on to the next window.
//! - **Lifecycle / control** — everything else. Returned to the caller with no
//!   side effects.

use crate::block::BlockId;
use thiserror::Error;

/// Errors produced by the streaming core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    /// The sample buffer has less free space than the pushed chunk needs.
    #[error("admission rejected: {requested} samples requested, {free} free")]
    AdmissionRejected {
        /// Length of the rejected chunk.
        requested: usize,
        /// Free slots at the time of the decision.
        free: usize,
    },

    /// A window handed to a transform does not match its declared input size.
    #[error("malformed window: expected {expected} samples, got {actual}")]
    MalformedWindow {
        /// Declared input length of the transform.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Kernel-level computation error.
    #[error("transform failure: {0}")]
    TransformFailure(String),

    /// The operation was invoked after a stop request.
    #[error("flowgraph is shutting down")]
    ShutdownInProgress,

    /// Pushed chunk was empty.
    #[error("sample chunk must not be empty")]
    InvalidChunk,

    /// `run` was called on a flowgraph that is already running or finished.
    #[error("flowgraph is already running")]
    AlreadyRunning,

    /// A parameter value violates its range or step grid.
    #[error("invalid value {value} for parameter '{param}': {reason}")]
    InvalidParameter {
        /// Parameter key.
        param: String,
        /// Rejected value.
        value: f64,
        /// Why the value was rejected.
        reason: String,
    },

    /// No block with this id exists in the flowgraph.
    #[error("unknown block {0}")]
    UnknownBlock(BlockId),

    /// The block has no parameter at this index.
    #[error("unknown parameter {index} on block {block}")]
    UnknownParameter {
        /// Target block.
        block: BlockId,
        /// Requested parameter index.
        index: usize,
    },
}

impl FlowError {
    /// Create an [`InvalidParameter`](Self::InvalidParameter) error.
    pub fn invalid_parameter(param: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        FlowError::InvalidParameter {
            param: param.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Whether the caller can retry the same operation later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FlowError::AdmissionRejected { .. })
    }

    /// Whether this error is confined to a single scheduling turn.
    pub fn is_window_fault(&self) -> bool {
        matches!(
            self,
            FlowError::MalformedWindow { .. } | FlowError::TransformFailure(_)
        )
    }
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_rejected_display() {
        let err = FlowError::AdmissionRejected {
            requested: 4096,
            free: 100,
        };
        assert_eq!(
            err.to_string(),
            "admission rejected: 4096 samples requested, 100 free"
        );
    }

    #[test]
    fn malformed_window_display() {
        let err = FlowError::MalformedWindow {
            expected: 4096,
            actual: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("4096"), "got: {msg}");
        assert!(msg.contains("12"), "got: {msg}");
    }

    #[test]
    fn classification() {
        assert!(FlowError::AdmissionRejected { requested: 1, free: 0 }.is_recoverable());
        assert!(!FlowError::ShutdownInProgress.is_recoverable());

        assert!(FlowError::TransformFailure("nan".into()).is_window_fault());
        assert!(FlowError::MalformedWindow { expected: 2, actual: 1 }.is_window_fault());
        assert!(!FlowError::InvalidChunk.is_window_fault());
    }

    #[test]
    fn unknown_parameter_display() {
        let err = FlowError::UnknownParameter {
            block: BlockId(3),
            index: 9,
        };
        assert_eq!(err.to_string(), "unknown parameter 9 on block 3");
    }
}

//! sdrflow Core - streaming primitives for the sdrflow flowgraph runtime
//!
//! This crate holds the leaf types every other sdrflow crate builds on. None of
//! them know about scheduling or async; they only define ownership and handoff.
//!
//! # Core Abstractions
//!
//! ## Sample Buffer
//!
//! - [`SampleBuffer`] - fixed-capacity SPSC ring of signed 8-bit samples
//! - [`SampleWriter`] - all-or-nothing admission (never overwrites unread data)
//! - [`SampleReader`] - FIFO window drain
//!
//! ## Transform Contract
//!
//! - [`Transform`] - window in, `f32` sequence out, deterministic
//! - [`check_window`] / [`check_magnitudes`] - contract checks for kernels
//!
//! ## Output Snapshots
//!
//! - [`SnapshotStore`] - wait-free reads of the latest complete output
//! - [`SnapshotPublisher`] - the single writer, generation-tagged
//!
//! ## Parameters
//!
//! - [`BlockParameter`] - value constrained to a range and step grid
//! - [`BlockId`] - logical block address used by controls
//!
//! # Example
//!
//! ```rust
//! use sdrflow_core::{SampleBuffer, SnapshotStore};
//!
//! let (mut writer, mut reader) = SampleBuffer::with_capacity(1024);
//! let (store, mut publisher) = SnapshotStore::new();
//!
//! writer.try_write(&[0; 256]).unwrap();
//! let mut window = vec![0i8; 256];
//! if reader.read_window(&mut window) {
//!     publisher.publish(vec![0.0; 128]);
//! }
//! assert_eq!(store.generation(), 1);
//! ```

pub mod block;
pub mod error;
pub mod param;
pub mod sample_buffer;
pub mod snapshot;
pub mod transform;

pub use block::BlockId;
pub use error::{FlowError, Result};
pub use param::{BlockParameter, ParamUnit};
pub use sample_buffer::{SampleBuffer, SampleReader, SampleWriter};
pub use snapshot::{Snapshot, SnapshotPublisher, SnapshotStore};
pub use transform::{Transform, check_magnitudes, check_window};

//! Fixed-capacity sample ring with single-producer/single-consumer handoff.
//!
//! [`SampleBuffer::with_capacity`] splits a lock-free ring into a
//! [`SampleWriter`] (held by the ingress gate) and a [`SampleReader`] (owned by
//! the scheduler). Neither half ever blocks or allocates after construction.
//!
//! # Admission
//!
//! Writes are all-or-nothing: a chunk that does not fit into the current free
//! space is rejected and the buffer is left untouched. Unread samples are
//! never overwritten.
//!
//! ```text
//!   producer ──► [ SampleWriter ] ══ ring (capacity C) ══ [ SampleReader ] ──► scheduler
//!                 try_write(chunk)                         read_window(dst)
//!                 all-or-nothing                           exactly dst.len() or nothing
//! ```
//!
//! # Example
//!
//! ```rust
//! use sdrflow_core::SampleBuffer;
//!
//! let (mut writer, mut reader) = SampleBuffer::with_capacity(8);
//! writer.try_write(&[1, 2, 3]).unwrap();
//! writer.try_write(&[4]).unwrap();
//!
//! let mut window = [0i8; 4];
//! assert!(reader.read_window(&mut window));
//! assert_eq!(window, [1, 2, 3, 4]);
//! ```

use crate::error::{FlowError, Result};
use rtrb::{Consumer, Producer, RingBuffer};

/// Constructor namespace for the split sample ring.
pub struct SampleBuffer;

impl SampleBuffer {
    /// Create a ring holding up to `capacity` signed 8-bit samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> (SampleWriter, SampleReader) {
        assert!(capacity > 0, "sample buffer capacity must be non-zero");
        let (producer, consumer) = RingBuffer::new(capacity);
        (
            SampleWriter { producer, capacity },
            SampleReader { consumer, capacity },
        )
    }
}

/// Write half of the sample ring.
pub struct SampleWriter {
    producer: Producer<i8>,
    capacity: usize,
}

impl SampleWriter {
    /// Enqueue the whole chunk, or nothing.
    ///
    /// Returns [`FlowError::InvalidChunk`] for an empty slice and
    /// [`FlowError::AdmissionRejected`] when fewer than `samples.len()` slots
    /// are free. In both cases the buffer content is unchanged.
    pub fn try_write(&mut self, samples: &[i8]) -> Result<()> {
        if samples.is_empty() {
            return Err(FlowError::InvalidChunk);
        }
        let free = self.producer.slots();
        let rejected = FlowError::AdmissionRejected {
            requested: samples.len(),
            free,
        };
        if samples.len() > free {
            return Err(rejected);
        }

        let mut chunk = self
            .producer
            .write_chunk(samples.len())
            .map_err(|_| rejected)?;
        let (first, second) = chunk.as_mut_slices();
        let split = first.len();
        first.copy_from_slice(&samples[..split]);
        second.copy_from_slice(&samples[split..]);
        chunk.commit_all();
        Ok(())
    }

    /// Number of samples that can be written right now.
    #[inline]
    pub fn free(&self) -> usize {
        self.producer.slots()
    }

    /// Total capacity fixed at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the reader half has been dropped (flowgraph torn down).
    pub fn is_reader_dropped(&self) -> bool {
        self.producer.is_abandoned()
    }
}

/// Read half of the sample ring.
pub struct SampleReader {
    consumer: Consumer<i8>,
    capacity: usize,
}

impl SampleReader {
    /// Current fill level.
    #[inline]
    pub fn len(&self) -> usize {
        self.consumer.slots()
    }

    /// True if no samples are buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total capacity fixed at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drain exactly `dst.len()` samples in FIFO order.
    ///
    /// Returns `false` and leaves the buffer untouched if fewer samples are
    /// available.
    pub fn read_window(&mut self, dst: &mut [i8]) -> bool {
        let Ok(chunk) = self.consumer.read_chunk(dst.len()) else {
            return false;
        };
        let (first, second) = chunk.as_slices();
        dst[..first.len()].copy_from_slice(first);
        dst[first.len()..].copy_from_slice(second);
        chunk.commit_all();
        true
    }

    /// Drop up to `count` of the oldest samples, returning how many were dropped.
    pub fn discard(&mut self, count: usize) -> usize {
        let count = count.min(self.len());
        if let Ok(chunk) = self.consumer.read_chunk(count) {
            chunk.commit_all();
            count
        } else {
            0
        }
    }

    /// Whether the writer half has been dropped (no more input will arrive).
    pub fn is_writer_dropped(&self) -> bool {
        self.consumer.is_abandoned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_preserves_order() {
        let (mut writer, mut reader) = SampleBuffer::with_capacity(16);
        writer.try_write(&[1, -2, 3]).unwrap();
        writer.try_write(&[4, 5]).unwrap();
        assert_eq!(reader.len(), 5);

        let mut window = [0i8; 5];
        assert!(reader.read_window(&mut window));
        assert_eq!(window, [1, -2, 3, 4, 5]);
        assert!(reader.is_empty());
    }

    #[test]
    fn full_buffer_rejects_without_overwrite() {
        let (mut writer, mut reader) = SampleBuffer::with_capacity(4);
        writer.try_write(&[1, 2, 3]).unwrap();

        let err = writer.try_write(&[9, 9]).unwrap_err();
        assert_eq!(
            err,
            FlowError::AdmissionRejected {
                requested: 2,
                free: 1
            }
        );
        assert_eq!(reader.len(), 3);

        let mut window = [0i8; 3];
        assert!(reader.read_window(&mut window));
        assert_eq!(window, [1, 2, 3]);
    }

    #[test]
    fn empty_chunk_is_invalid() {
        let (mut writer, reader) = SampleBuffer::with_capacity(4);
        assert_eq!(writer.try_write(&[]), Err(FlowError::InvalidChunk));
        assert!(reader.is_empty());
    }

    #[test]
    fn short_read_leaves_buffer_untouched() {
        let (mut writer, mut reader) = SampleBuffer::with_capacity(8);
        writer.try_write(&[7, 8]).unwrap();

        let mut window = [0i8; 4];
        assert!(!reader.read_window(&mut window));
        assert_eq!(reader.len(), 2);
        assert_eq!(window, [0; 4]);
    }

    #[test]
    fn wraparound_keeps_fifo() {
        let (mut writer, mut reader) = SampleBuffer::with_capacity(5);
        let mut window = [0i8; 3];

        writer.try_write(&[1, 2, 3]).unwrap();
        assert!(reader.read_window(&mut window));

        // Wraps past the end of the underlying storage.
        writer.try_write(&[4, 5, 6, 7]).unwrap();
        assert_eq!(writer.free(), 1);
        let mut window = [0i8; 4];
        assert!(reader.read_window(&mut window));
        assert_eq!(window, [4, 5, 6, 7]);
    }

    #[test]
    fn discard_drops_oldest() {
        let (mut writer, mut reader) = SampleBuffer::with_capacity(8);
        writer.try_write(&[1, 2, 3, 4]).unwrap();
        assert_eq!(reader.discard(3), 3);
        assert_eq!(reader.discard(10), 1);
        assert!(reader.is_empty());
    }

    #[test]
    fn abandonment_is_visible() {
        let (writer, reader) = SampleBuffer::with_capacity(2);
        assert!(!reader.is_writer_dropped());
        drop(writer);
        assert!(reader.is_writer_dropped());
    }

    #[test]
    #[should_panic]
    fn zero_capacity_panics() {
        let _ = SampleBuffer::with_capacity(0);
    }
}

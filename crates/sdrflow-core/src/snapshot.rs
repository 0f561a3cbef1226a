//! Latest-value cell for computed output buffers.
//!
//! The scheduler publishes each finished spectrum as an immutable
//! [`Snapshot`]; readers load the current one without ever taking a lock.
//!
//! # Publication model
//!
//! - [`SnapshotStore`] — cheap to clone, shared with any number of readers.
//!   `read()` is wait-free and always returns a complete snapshot.
//! - [`SnapshotPublisher`] — the single write handle. It is not `Clone`, so
//!   exactly one publisher (the scheduler) exists per store.
//!
//! A publish builds the new snapshot off to the side and swaps the pointer
//! in one atomic store. A reader sees generation N or N+1, never a buffer that
//! is being filled. The replaced snapshot is freed when its last reader drops
//! its `Arc`.
//!
//! # Example
//!
//! ```rust
//! use sdrflow_core::SnapshotStore;
//!
//! let (store, mut publisher) = SnapshotStore::new();
//! assert_eq!(store.generation(), 0);
//! assert!(store.read_bins().is_empty());
//!
//! publisher.publish(vec![0.5, 1.0]);
//! let snap = store.read();
//! assert_eq!(snap.generation(), 1);
//! assert_eq!(snap.bins(), &[0.5, 1.0]);
//! ```

use arc_swap::ArcSwap;
use std::sync::Arc;

/// An immutable, complete output buffer tagged with its generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    generation: u64,
    bins: Arc<[f32]>,
}

impl Snapshot {
    /// The pre-first-computation snapshot: generation 0, no bins.
    pub fn empty() -> Self {
        Self {
            generation: 0,
            bins: Arc::from(Vec::new()),
        }
    }

    /// Generation counter. 0 means nothing has been published yet.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Magnitude values, one per frequency bin.
    #[inline]
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// Number of bins.
    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True before the first publication.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Copy the bins out.
    pub fn to_vec(&self) -> Vec<f32> {
        self.bins.to_vec()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Read side of the snapshot cell.
#[derive(Clone)]
pub struct SnapshotStore {
    cell: Arc<ArcSwap<Snapshot>>,
}

impl SnapshotStore {
    /// Create an empty store together with its only publisher.
    pub fn new() -> (SnapshotStore, SnapshotPublisher) {
        let cell = Arc::new(ArcSwap::from_pointee(Snapshot::empty()));
        (
            SnapshotStore {
                cell: Arc::clone(&cell),
            },
            SnapshotPublisher {
                cell,
                generation: 0,
            },
        )
    }

    /// Current snapshot. Never blocks.
    pub fn read(&self) -> Arc<Snapshot> {
        self.cell.load_full()
    }

    /// Copy of the current bins (empty before the first publication).
    pub fn read_bins(&self) -> Vec<f32> {
        self.cell.load().to_vec()
    }

    /// Generation of the current snapshot.
    pub fn generation(&self) -> u64 {
        self.cell.load().generation
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snap = self.cell.load();
        f.debug_struct("SnapshotStore")
            .field("generation", &snap.generation)
            .field("bins", &snap.len())
            .finish()
    }
}

/// Write side of the snapshot cell. Owned by the scheduler.
pub struct SnapshotPublisher {
    cell: Arc<ArcSwap<Snapshot>>,
    generation: u64,
}

impl SnapshotPublisher {
    /// Replace the current snapshot wholesale, returning its generation.
    ///
    /// Generations start at 1 and increase by one per call.
    pub fn publish(&mut self, bins: Vec<f32>) -> u64 {
        self.generation += 1;
        self.cell.store(Arc::new(Snapshot {
            generation: self.generation,
            bins: Arc::from(bins),
        }));
        self.generation
    }

    /// Generation of the most recent publication (0 if none).
    pub fn last_generation(&self) -> u64 {
        self.generation
    }

    /// A new reader handle onto this publisher's store.
    pub fn store(&self) -> SnapshotStore {
        SnapshotStore {
            cell: Arc::clone(&self.cell),
        }
    }
}

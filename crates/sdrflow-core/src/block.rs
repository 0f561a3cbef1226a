//! Logical block identities inside a flowgraph.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Stable identifier for a block in a flowgraph.
///
/// Control widgets address blocks by this number, the same way the host
/// addresses them over its control endpoint. Ids are assigned when the
/// flowgraph is built and never reused while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl BlockId {
    /// The spectrum (transform) block.
    pub const SPECTRUM: Self = Self(0);
    /// The radio front-end settings block.
    pub const FRONTEND: Self = Self(1);
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BlockId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

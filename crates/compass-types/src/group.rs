//! Host and group identity keys.
//!
//! Entries are tied back to their navigation host through plain value
//! keys, not owning references: the association is an id lookup, and a
//! journal entry never extends the lifetime of the host it came from.

use serde::{Deserialize, Serialize};

/// Identity of a navigation host (a window or frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostId(pub u64);

/// Ties a cluster of journal entries back to their navigation host and
/// a logical content id. Entries produced by the same content share one
/// key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// The owning navigation host.
    pub host: HostId,
    /// Logical id of the content unit within that host.
    pub content_id: u64,
}

impl GroupKey {
    pub fn new(host: HostId, content_id: u64) -> Self {
        Self { host, content_id }
    }
}

//! TrackStore trait definition.

use super::models::Track;
use anyhow::Result;

/// Read-only access to the track metadata table.
///
/// The store is the source of truth for row ids: `load_all` assigns them
/// contiguously from 0 in rowid order, and every model artifact built from
/// the returned tracks is aligned to that assignment.
pub trait TrackStore: Send + Sync {
    /// Load the whole corpus, row ids assigned 0-based in rowid order.
    ///
    /// Rows with non-finite numeric attributes are rejected here, at build
    /// time, rather than surfacing as NaN distances at query time.
    fn load_all(&self) -> Result<Vec<Track>>;

    /// Number of tracks in the store.
    fn count(&self) -> Result<usize>;
}

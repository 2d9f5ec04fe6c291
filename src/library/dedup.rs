//! Keep the first track seen for each id.

use crate::models::Track;
use std::collections::HashSet;

/// Distinct tracks in first-seen order.
pub fn unique_by_id<I>(tracks: I) -> Vec<Track>
where
    I: IntoIterator<Item = Track>,
{
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}

/// Append `incoming` to `existing`, skipping ids `existing` already has.
pub fn merge(existing: Vec<Track>, incoming: Vec<Track>) -> Vec<Track> {
    unique_by_id(existing.into_iter().chain(incoming))
}

//! Request-scoped deduplication of stream URLs

use std::collections::HashSet;

/// URLs already claimed during one resolution
///
/// Source URLs and emitted video URLs are tracked separately: a playlist that
/// falls back to its own master URL must still be emitted once.
#[derive(Debug, Default)]
pub struct DedupSet {
    sources: HashSet<String>,
    videos: HashSet<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a source URL; false if another server already exposed it
    pub fn claim_source(&mut self, url: &str) -> bool {
        self.sources.insert(url.to_string())
    }

    /// Claim a final video URL; false if it was already emitted
    pub fn claim_video(&mut self, url: &str) -> bool {
        self.videos.insert(url.to_string())
    }
}

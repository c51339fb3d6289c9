//! Stream resolution pipeline
//!
//! - Playlist: HLS master playlist expansion into quality variants
//! - Subtitles: caption track aggregation across servers
//! - Dedup: request-scoped source/video URL claims
//! - Assembler: orchestration into the final ranked video list

pub mod assembler;
pub mod dedup;
pub mod playlist;
pub mod subtitles;

pub use assembler::VideoAssembler;
pub use dedup::DedupSet;
pub use playlist::PlaylistResolver;
pub use subtitles::SubtitleAggregator;

//! aniresolve - resolve anime episodes into playable streams
//!
//! Queries a provider's AJAX endpoints for an episode's playback servers,
//! fetches each server's sources, expands HLS master playlists into quality
//! variants and returns one ranked, deduplicated list of videos with the
//! combined subtitle tracks attached.
//!
//! # Modules
//!
//! - `models` - Data structures for episodes, servers, sources and videos
//! - `api` - Provider client (server discovery, sources, episode lists)
//! - `stream` - Playlist resolution, subtitle aggregation, video assembly
//! - `error` - Error taxonomy
//! - `config` - Configuration file handling
//! - `cli` - Command line definitions and output helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod stream;

// Re-export commonly used types
pub use models::{
    AudioKind, Diagnostic, DiagnosticKind, EpisodeEntry, EpisodeRef, MediaType, PlaylistVariant,
    Resolution, Server, SourceDescriptor, SourceFile, Track, Video,
};

pub use api::ProviderClient;
pub use config::Config;
pub use error::{ErrorKind, ResolveError};
pub use stream::{PlaylistResolver, SubtitleAggregator, VideoAssembler};

/// Resolve one episode with the given configuration
pub async fn resolve_episode(
    config: &Config,
    episode: &EpisodeRef,
) -> error::Result<Resolution> {
    VideoAssembler::new(config).assemble(episode).await
}

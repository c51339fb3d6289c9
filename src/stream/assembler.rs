//! Video assembly
//!
//! Orchestrates discovery, source fetching, playlist expansion and subtitle
//! aggregation into one ranked list of videos.
//!
//! Network work runs with bounded parallelism; every merge step (claiming
//! source URLs, collecting videos and tracks) runs sequentially in discovery
//! order, so the output matches a sequential run exactly.

use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

use super::dedup::DedupSet;
use super::playlist::PlaylistResolver;
use super::subtitles::SubtitleAggregator;
use crate::api::ProviderClient;
use crate::config::Config;
use crate::error::{ResolveError, Result};
use crate::models::{
    Diagnostic, DiagnosticKind, EpisodeRef, MediaType, Resolution, Server, SourceDescriptor,
    Video,
};

/// Resolves an episode into playable videos
#[derive(Debug, Clone)]
pub struct VideoAssembler {
    provider: ProviderClient,
    playlists: PlaylistResolver,
    include_dub: bool,
    concurrency: usize,
    deadline: Duration,
}

/// Work left after a source descriptor has been claimed
enum Candidate {
    Direct(Video),
    Playlist { server: Server, url: String },
}

impl VideoAssembler {
    /// Create an assembler from configuration
    pub fn new(config: &Config) -> Self {
        Self::with_provider(ProviderClient::new(config))
            .include_dub(config.include_dub)
            .concurrency(config.concurrency())
            .deadline(config.deadline())
    }

    /// Create an assembler around an existing provider client
    pub fn with_provider(provider: ProviderClient) -> Self {
        let defaults = Config::default();
        Self {
            playlists: PlaylistResolver::new(provider.http().clone()),
            provider,
            include_dub: defaults.include_dub,
            concurrency: defaults.concurrency(),
            deadline: defaults.deadline(),
        }
    }

    /// Also process DUB servers (after SUB)
    pub fn include_dub(mut self, include_dub: bool) -> Self {
        self.include_dub = include_dub;
        self
    }

    /// Number of servers processed in parallel
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Deadline for the whole assembly
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Resolve an episode into videos with the aggregated subtitle set
    ///
    /// Fails with `NotFound` when the server list is unavailable and with
    /// `NoPlayableSource` when no server produced a video.
    pub async fn assemble(&self, episode: &EpisodeRef) -> Result<Resolution> {
        let list = self
            .provider
            .discover_servers(episode, self.include_dub)
            .await?;
        tracing::info!(episode = %episode, servers = list.servers.len(), "resolving episode");

        self.assemble_servers(list.servers, list.skipped).await
    }

    /// Resolve an already discovered server list
    pub async fn assemble_servers(
        &self,
        servers: Vec<Server>,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Result<Resolution> {
        let deadline = Instant::now() + self.deadline;
        let attempted = servers.len();

        // Fetch every descriptor concurrently, results in discovery order
        let fetched: Vec<(Server, std::result::Result<SourceDescriptor, Diagnostic>)> =
            stream::iter(servers)
                .map(|server| async move {
                    let fetch = timeout_at(deadline, self.provider.fetch_source(&server));
                    let result = match fetch.await {
                        Ok(Ok(descriptor)) => Ok(descriptor),
                        Ok(Err(e)) => Err(e.to_diagnostic().for_server(&server)),
                        Err(_) => Err(deadline_diagnostic(&server, "source fetch")),
                    };
                    (server, result)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut dedup = DedupSet::new();
        let mut subtitles = SubtitleAggregator::new();
        let mut candidates = Vec::new();

        for (server, result) in fetched {
            let descriptor = match result {
                Ok(descriptor) => descriptor,
                Err(diag) => {
                    record(&mut diagnostics, diag);
                    continue;
                }
            };

            subtitles.add(&descriptor);
            match claim(&server, &descriptor, &mut dedup) {
                Ok(candidate) => candidates.push(candidate),
                Err(diag) => record(&mut diagnostics, diag),
            }
        }

        // Expand playlists concurrently, merge in claim order
        let expanded: Vec<std::result::Result<Vec<Video>, Diagnostic>> = stream::iter(candidates)
            .map(|candidate| async move {
                match candidate {
                    Candidate::Direct(video) => Ok(vec![video]),
                    Candidate::Playlist { server, url } => {
                        self.expand_playlist(&server, &url, deadline).await
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut videos = Vec::new();
        for result in expanded {
            match result {
                Ok(batch) => {
                    for video in batch {
                        if dedup.claim_video(&video.url) {
                            videos.push(video);
                        } else {
                            tracing::debug!(url = %video.url, "dropping duplicate variant");
                        }
                    }
                }
                Err(diag) => record(&mut diagnostics, diag),
            }
        }

        if videos.is_empty() {
            tracing::warn!(servers = attempted, "no playable source");
            return Err(ResolveError::NoPlayableSource { diagnostics });
        }

        let subtitles = subtitles.into_tracks();
        for video in &mut videos {
            video.subtitle_tracks = subtitles.clone();
        }

        tracing::info!(
            videos = videos.len(),
            subtitles = subtitles.len(),
            skipped = diagnostics.len(),
            "episode resolved"
        );
        Ok(Resolution {
            videos,
            subtitles,
            diagnostics,
        })
    }

    async fn expand_playlist(
        &self,
        server: &Server,
        url: &str,
        deadline: Instant,
    ) -> std::result::Result<Vec<Video>, Diagnostic> {
        let resolved = timeout_at(deadline, self.playlists.resolve(url, self.provider.headers()));
        let variants = match resolved.await {
            Ok(Ok(variants)) => variants,
            Ok(Err(e)) => return Err(e.to_diagnostic().for_server(server)),
            Err(_) => return Err(deadline_diagnostic(server, "playlist fetch")),
        };

        let prefix = server.label_prefix();
        Ok(variants
            .into_iter()
            .map(|v| Video {
                label: format!("{} - {}", prefix, v.quality_label),
                url: v.url,
                subtitle_tracks: Vec::new(),
            })
            .collect())
    }
}

/// Decide what a fetched descriptor contributes, claiming its source URL
fn claim(
    server: &Server,
    descriptor: &SourceDescriptor,
    dedup: &mut DedupSet,
) -> std::result::Result<Candidate, Diagnostic> {
    if descriptor.encrypted {
        return Err(
            Diagnostic::new(DiagnosticKind::Encrypted, "source is encrypted").for_server(server),
        );
    }

    let file = match descriptor.primary() {
        Some(file) if !file.url.is_empty() => file,
        _ => {
            return Err(
                Diagnostic::new(DiagnosticKind::EmptySource, "no source file").for_server(server),
            )
        }
    };

    if !dedup.claim_source(&file.url) {
        return Err(Diagnostic::new(
            DiagnosticKind::DuplicateSource,
            format!("{} already provided by another server", file.url),
        )
        .for_server(server));
    }

    match file.media_type {
        MediaType::Hls if file.is_playlist() => Ok(Candidate::Playlist {
            server: server.clone(),
            url: file.url.clone(),
        }),
        MediaType::Mp4 => Ok(Candidate::Direct(Video {
            url: file.url.clone(),
            label: format!("{} - MP4", server.label_prefix()),
            subtitle_tracks: Vec::new(),
        })),
        other => Err(Diagnostic::new(
            DiagnosticKind::UnsupportedMedia,
            format!("unsupported {} source {}", other, file.url),
        )
        .for_server(server)),
    }
}

fn deadline_diagnostic(server: &Server, stage: &str) -> Diagnostic {
    Diagnostic::new(
        DiagnosticKind::DeadlineExceeded,
        format!("{} did not finish before the deadline", stage),
    )
    .for_server(server)
}

/// Log and keep a diagnostic
fn record(diagnostics: &mut Vec<Diagnostic>, diag: Diagnostic) {
    match diag.kind {
        DiagnosticKind::DuplicateSource | DiagnosticKind::Encrypted => {
            tracing::debug!(
                server_id = diag.server_id.as_deref().unwrap_or(""),
                kind = ?diag.kind,
                "{}",
                diag.message
            )
        }
        _ => tracing::warn!(
            server_id = diag.server_id.as_deref().unwrap_or(""),
            kind = ?diag.kind,
            "{}",
            diag.message
        ),
    }
    diagnostics.push(diag);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudioKind, SourceFile};

    fn server(id: &str, name: &str) -> Server {
        Server {
            id: id.to_string(),
            display_name: name.to_string(),
            kind: AudioKind::Sub,
        }
    }

    fn descriptor(url: &str, media_type: MediaType) -> SourceDescriptor {
        SourceDescriptor {
            source_files: vec![SourceFile {
                url: url.to_string(),
                media_type,
            }],
            ..SourceDescriptor::default()
        }
    }

    #[test]
    fn test_claim_mp4_is_direct() {
        let mut dedup = DedupSet::new();
        let candidate = claim(
            &server("1", "VidStream"),
            &descriptor("https://cdn/v.mp4", MediaType::Mp4),
            &mut dedup,
        );
        match candidate {
            Ok(Candidate::Direct(video)) => assert_eq!(video.label, "VidStream SUB - MP4"),
            _ => panic!("expected a direct video"),
        }
    }

    #[test]
    fn test_claim_duplicate_source() {
        let mut dedup = DedupSet::new();
        let d = descriptor("https://cdn/master.m3u8", MediaType::Hls);
        assert!(claim(&server("1", "A"), &d, &mut dedup).is_ok());
        let diag = claim(&server("2", "B"), &d, &mut dedup).err().unwrap();
        assert_eq!(diag.kind, DiagnosticKind::DuplicateSource);
        assert_eq!(diag.server_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_claim_encrypted_and_empty() {
        let mut dedup = DedupSet::new();
        let mut d = descriptor("https://cdn/master.m3u8", MediaType::Hls);
        d.encrypted = true;
        let diag = claim(&server("1", "A"), &d, &mut dedup).err().unwrap();
        assert_eq!(diag.kind, DiagnosticKind::Encrypted);

        // Encrypted sources never claim their URL
        d.encrypted = false;
        assert!(claim(&server("2", "B"), &d, &mut dedup).is_ok());

        let diag = claim(&server("3", "C"), &SourceDescriptor::default(), &mut dedup)
            .err()
            .unwrap();
        assert_eq!(diag.kind, DiagnosticKind::EmptySource);
    }

    #[test]
    fn test_claim_unsupported() {
        let mut dedup = DedupSet::new();
        let diag = claim(
            &server("1", "A"),
            &descriptor("https://cdn/stream.mpd", MediaType::Other),
            &mut dedup,
        )
        .err()
        .unwrap();
        assert_eq!(diag.kind, DiagnosticKind::UnsupportedMedia);

        // HLS that is not a playlist reference is ignored too
        let diag = claim(
            &server("2", "B"),
            &descriptor("https://cdn/embed/xyz", MediaType::Hls),
            &mut dedup,
        )
        .err()
        .unwrap();
        assert_eq!(diag.kind, DiagnosticKind::UnsupportedMedia);
    }
}

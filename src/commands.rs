//! CLI Command Handlers
//!
//! Implements all CLI commands by calling the resolver library.
//! Each handler takes CLI args, config and Output, returns ExitCode.

use serde::Serialize;

use aniresolve::api::ProviderClient;
use aniresolve::cli::{
    EpisodesCmd, ExitCode, Output, PlaylistCmd, ResolveCmd, ServersCmd, SourcesCmd,
};
use aniresolve::config::Config;
use aniresolve::models::{AudioKind, EpisodeRef, Server};
use aniresolve::stream::PlaylistResolver;

// =============================================================================
// Resolve Command
// =============================================================================

pub async fn resolve_cmd(cmd: ResolveCmd, config: &Config, output: &Output) -> ExitCode {
    let mut config = config.clone();
    config.include_dub |= cmd.dub;
    if let Some(concurrency) = cmd.concurrency {
        config.concurrency = concurrency;
    }

    let episode = EpisodeRef::new(cmd.episode);
    output.info(format!("Resolving episode: {}", episode));

    match aniresolve::resolve_episode(&config, &episode).await {
        Ok(mut resolution) => {
            if let Some(limit) = cmd.limit {
                resolution.videos.truncate(limit);
            }

            let mut lines: Vec<String> = resolution
                .videos
                .iter()
                .enumerate()
                .map(|(i, v)| format!("[{}] {}\n    {}", i, v.label, v.url))
                .collect();
            lines.extend(
                resolution
                    .subtitles
                    .iter()
                    .map(|t| format!("sub: {}", t)),
            );
            for diag in &resolution.diagnostics {
                output.info(format!("skipped: {}", diag));
            }

            if let Err(e) = output.print_lines(&resolution, &lines) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.failure("Resolve failed", &e),
    }
}

// =============================================================================
// Servers Command
// =============================================================================

pub async fn servers_cmd(cmd: ServersCmd, config: &Config, output: &Output) -> ExitCode {
    let client = ProviderClient::new(config);
    let episode = EpisodeRef::new(cmd.episode);

    output.info(format!("Listing servers for: {}", episode));

    match client
        .discover_servers(&episode, cmd.dub || config.include_dub)
        .await
    {
        Ok(list) => {
            if list.servers.is_empty() {
                return output.error("No servers found", ExitCode::NoStreams);
            }
            let lines: Vec<String> = list.servers.iter().map(|s| s.to_string()).collect();
            if let Err(e) = output.print_lines(&list, &lines) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.failure("Server discovery failed", &e),
    }
}

// =============================================================================
// Sources Command
// =============================================================================

pub async fn sources_cmd(cmd: SourcesCmd, config: &Config, output: &Output) -> ExitCode {
    let client = ProviderClient::new(config);
    let server = Server {
        display_name: format!("Server {}", cmd.server_id),
        id: cmd.server_id,
        kind: AudioKind::Sub,
    };

    output.info(format!("Fetching sources for server: {}", server.id));

    match client.fetch_source(&server).await {
        Ok(descriptor) => {
            if let Err(e) = output.print(&descriptor) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.failure("Source fetch failed", &e),
    }
}

// =============================================================================
// Playlist Command
// =============================================================================

pub async fn playlist_cmd(cmd: PlaylistCmd, config: &Config, output: &Output) -> ExitCode {
    let client = ProviderClient::new(config);
    let resolver = PlaylistResolver::new(client.http().clone());

    output.info(format!("Expanding playlist: {}", cmd.url));

    match resolver.resolve(&cmd.url, client.headers()).await {
        Ok(variants) => {
            let indexed: Vec<IndexedVariant> = variants
                .into_iter()
                .enumerate()
                .map(|(index, v)| IndexedVariant {
                    index,
                    quality: v.quality_label,
                    url: v.url,
                })
                .collect();
            let lines: Vec<String> = indexed
                .iter()
                .map(|v| format!("[{}] {:>10}  {}", v.index, v.quality, v.url))
                .collect();

            if let Err(e) = output.print_lines(&indexed, &lines) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.failure("Playlist resolution failed", &e),
    }
}

#[derive(Serialize)]
struct IndexedVariant {
    index: usize,
    quality: String,
    url: String,
}

// =============================================================================
// Episodes Command
// =============================================================================

pub async fn episodes_cmd(cmd: EpisodesCmd, config: &Config, output: &Output) -> ExitCode {
    let client = ProviderClient::new(config);

    output.info(format!("Listing episodes for: {}", cmd.anime));

    match client.list_episodes(&cmd.anime).await {
        Ok(mut episodes) => {
            if let Some(limit) = cmd.limit {
                episodes.truncate(limit);
            }
            let lines: Vec<String> = episodes
                .iter()
                .map(|e| format!("{}  {}", e, e.href))
                .collect();
            if let Err(e) = output.print_lines(&episodes, &lines) {
                return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
            }
            ExitCode::Success
        }
        Err(e) => output.failure("Episode listing failed", &e),
    }
}

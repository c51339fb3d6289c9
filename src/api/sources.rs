//! Source fetching
//!
//! Retrieves one server's source descriptor. The upstream schema is observed,
//! not documented: unknown fields are ignored and missing ones default.

use serde::Deserialize;

use super::client::ProviderClient;
use crate::error::Result;
use crate::models::{MediaType, RawTrack, Server, SourceDescriptor, SourceFile};

/// Source endpoint response
#[derive(Debug, Deserialize)]
struct SourcesResponse {
    sources: Option<RawSources>,
    tracks: Option<Vec<TrackItem>>,
    encrypted: Option<bool>,
}

/// `sources` is a list in the clear, or an opaque string when encrypted
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSources {
    Files(Vec<SourceItem>),
    Opaque(String),
}

#[derive(Debug, Deserialize)]
struct SourceItem {
    #[serde(default)]
    file: String,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    file: Option<String>,
    #[serde(default)]
    kind: String,
    label: Option<String>,
}

impl SourcesResponse {
    fn into_descriptor(self) -> SourceDescriptor {
        let source_files = match self.sources {
            Some(RawSources::Files(items)) => items
                .into_iter()
                .map(|s| SourceFile {
                    media_type: MediaType::from_type(&s.kind),
                    url: s.file,
                })
                .collect(),
            Some(RawSources::Opaque(_)) | None => Vec::new(),
        };

        let tracks = self
            .tracks
            .unwrap_or_default()
            .into_iter()
            .map(|t| RawTrack {
                url: t.file,
                kind: t.kind,
                label: t.label,
            })
            .collect();

        SourceDescriptor {
            source_files,
            tracks,
            encrypted: self.encrypted.unwrap_or(false),
        }
    }
}

/// Decode a source endpoint body
pub fn parse_source_descriptor(body: &str) -> Result<SourceDescriptor> {
    let response: SourcesResponse = serde_json::from_str(body)?;
    Ok(response.into_descriptor())
}

impl ProviderClient {
    /// Retrieve the raw source descriptor for one server
    pub async fn fetch_source(&self, server: &Server) -> Result<SourceDescriptor> {
        let url = self.url(&format!(
            "/ajax/v2/episode/sources?id={}",
            urlencoding::encode(&server.id)
        ));
        let response: SourcesResponse = self.get_json(&url).await?;
        let descriptor = response.into_descriptor();

        tracing::debug!(
            server_id = %server.id,
            files = descriptor.source_files.len(),
            tracks = descriptor.tracks.len(),
            encrypted = descriptor.encrypted,
            "fetched source descriptor"
        );
        Ok(descriptor)
    }
}

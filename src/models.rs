//! Data structures and types for aniresolve
//!
//! Contains all shared models used across the resolution pipeline organized by stage:
//! - **Episodes**: caller-supplied episode references and episode list entries
//! - **Servers**: playback mirrors grouped by audio kind
//! - **Sources**: per-server source descriptors (files, caption tracks)
//! - **Playback**: playlist variants, final videos and subtitle tracks
//! - **Diagnostics**: structured records of skipped or failed work

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Episode Models
// =============================================================================

/// Reference to a single episode, as supplied by the caller.
///
/// Accepts a bare episode id (`2142`) or any URL/path carrying an `ep=` query
/// parameter (`/watch/one-piece-100?ep=2142`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef(String);

impl EpisodeRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw reference as supplied
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the provider episode id, if the reference carries one
    pub fn episode_id(&self) -> Option<String> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return None;
        }

        let re = regex::Regex::new(r"ep=([^&?#]*)").ok()?;
        let id = match re.captures_iter(raw).last() {
            Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
            None if is_bare_id(raw) => raw,
            None => return None,
        };

        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}

/// A bare id has no URL punctuation in it
fn is_bare_id(s: &str) -> bool {
    !s.contains(['/', '?', '&', '=', '#', ' '])
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EpisodeRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EpisodeRef {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One entry of an anime's episode list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeEntry {
    pub id: String,
    pub number: f32,
    pub title: String,
    /// Site-relative watch link; usable as an [`EpisodeRef`]
    pub href: String,
}

impl EpisodeEntry {
    pub fn episode_ref(&self) -> EpisodeRef {
        EpisodeRef::new(self.href.clone())
    }
}

impl fmt::Display for EpisodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{} - {}", self.number, self.title)
    }
}

// =============================================================================
// Server Models
// =============================================================================

/// Audio kind grouping of playback servers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AudioKind {
    Sub,
    Dub,
}

impl fmt::Display for AudioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioKind::Sub => write!(f, "SUB"),
            AudioKind::Dub => write!(f, "DUB"),
        }
    }
}

/// One playback mirror for an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub display_name: String,
    pub kind: AudioKind,
}

impl Server {
    /// Prefix used for every video label this server produces
    pub fn label_prefix(&self) -> String {
        format!("{} {}", self.display_name, self.kind)
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] #{}", self.display_name, self.kind, self.id)
    }
}

// =============================================================================
// Source Models
// =============================================================================

/// Media type of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Hls,
    Mp4,
    Other,
}

impl MediaType {
    /// Map the provider's `type` field
    pub fn from_type(s: &str) -> Self {
        match s {
            "hls" => MediaType::Hls,
            "mp4" => MediaType::Mp4,
            _ => MediaType::Other,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Hls => write!(f, "HLS"),
            MediaType::Mp4 => write!(f, "MP4"),
            MediaType::Other => write!(f, "OTHER"),
        }
    }
}

/// A single source file offered by a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub url: String,
    pub media_type: MediaType,
}

impl SourceFile {
    /// True when the URL path names an `.m3u8` playlist
    pub fn is_playlist(&self) -> bool {
        match url::Url::parse(&self.url) {
            Ok(url) => url.path().ends_with(".m3u8"),
            Err(_) => self.url.ends_with(".m3u8"),
        }
    }
}

/// A caption or thumbnail track as the provider describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrack {
    pub url: Option<String>,
    pub kind: String,
    pub label: Option<String>,
}

/// Everything one server reports for an episode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Ordered; only index 0 is authoritative
    pub source_files: Vec<SourceFile>,
    pub tracks: Vec<RawTrack>,
    pub encrypted: bool,
}

impl SourceDescriptor {
    /// The authoritative source file, if any
    pub fn primary(&self) -> Option<&SourceFile> {
        self.source_files.first()
    }
}

// =============================================================================
// Playback Models
// =============================================================================

/// One quality-specific stream referenced by a master playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistVariant {
    pub url: String,
    pub quality_label: String,
}

impl PlaylistVariant {
    /// Numeric rank used for ordering (higher = better)
    pub fn rank(&self) -> u32 {
        quality_rank(&self.quality_label)
    }
}

/// Parse the leading integer before "p" ("1080p" -> 1080); anything else ranks 0
pub fn quality_rank(label: &str) -> u32 {
    let digits: String = label.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || !label[digits.len()..].starts_with('p') {
        return 0;
    }
    digits.parse().unwrap_or(0)
}

/// A subtitle track attached to videos; identity is the URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    pub url: String,
    pub label: String,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.url)
    }
}

/// Final output unit: one playable stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub url: String,
    pub label: String,
    pub subtitle_tracks: Vec<Track>,
}

impl fmt::Display for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} subs)", self.label, self.subtitle_tracks.len())
    }
}

/// Result of resolving one episode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resolution {
    pub videos: Vec<Video>,
    pub subtitles: Vec<Track>,
    pub diagnostics: Vec<Diagnostic>,
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Why a server (or part of one) contributed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingServerId,
    Network,
    Remote,
    Decode,
    Format,
    Encrypted,
    DuplicateSource,
    EmptySource,
    UnsupportedMedia,
    DeadlineExceeded,
}

/// A structured warning returned alongside a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            server_id: None,
            server_name: None,
            kind,
            message: message.into(),
        }
    }

    /// Attach the server this diagnostic is about
    pub fn for_server(mut self, server: &Server) -> Self {
        self.server_id = Some(server.id.clone());
        self.server_name = Some(server.display_name.clone());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.server_name, &self.server_id) {
            (Some(name), Some(id)) => {
                write!(f, "[{:?}] {} ({}): {}", self.kind, name, id, self.message)
            }
            _ => write!(f, "[{:?}] {}", self.kind, self.message),
        }
    }
}

//! Subtitle aggregation
//!
//! Collects caption tracks from every source descriptor, whether or not that
//! server produced a playable video. Tracks are deduplicated by URL; the first
//! label seen wins.

use std::collections::HashSet;

use crate::models::{SourceDescriptor, Track};

/// Track kind that carries captions
pub const CAPTION_KIND: &str = "captions";

/// Caption files must end with this suffix (case-sensitive)
pub const CAPTION_EXTENSION: &str = ".vtt";

/// Label for caption tracks the provider left unnamed
pub const DEFAULT_TRACK_LABEL: &str = "Subtitle";

/// Accumulates unique caption tracks in first-seen order
#[derive(Debug, Clone, Default)]
pub struct SubtitleAggregator {
    seen: HashSet<String>,
    tracks: Vec<Track>,
}

impl SubtitleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the caption tracks of one descriptor
    pub fn add(&mut self, descriptor: &SourceDescriptor) {
        for raw in &descriptor.tracks {
            if raw.kind != CAPTION_KIND {
                continue;
            }
            let Some(url) = raw.url.as_deref().filter(|u| u.ends_with(CAPTION_EXTENSION)) else {
                continue;
            };
            if !self.seen.insert(url.to_string()) {
                continue;
            }

            self.tracks.push(Track {
                url: url.to_string(),
                label: raw
                    .label
                    .clone()
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_TRACK_LABEL.to_string()),
            });
        }
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

/// Collect the unique caption tracks of a set of descriptors
pub fn collect<'a>(descriptors: impl IntoIterator<Item = &'a SourceDescriptor>) -> Vec<Track> {
    let mut aggregator = SubtitleAggregator::new();
    for descriptor in descriptors {
        aggregator.add(descriptor);
    }
    aggregator.into_tracks()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTrack;

    fn track(url: Option<&str>, kind: &str, label: Option<&str>) -> RawTrack {
        RawTrack {
            url: url.map(String::from),
            kind: kind.to_string(),
            label: label.map(String::from),
        }
    }

    fn descriptor(tracks: Vec<RawTrack>) -> SourceDescriptor {
        SourceDescriptor {
            tracks,
            ..SourceDescriptor::default()
        }
    }

    #[test]
    fn test_filters_kind_and_extension() {
        let d = descriptor(vec![
            track(Some("https://s/eng.vtt"), "captions", Some("English")),
            track(Some("https://s/thumbs.vtt"), "thumbnails", None),
            track(Some("https://s/spa.srt"), "captions", Some("Spanish")),
            track(Some("https://s/FRE.VTT"), "captions", Some("French")),
            track(None, "captions", Some("Ghost")),
        ]);

        let tracks = collect([&d]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].label, "English");
    }

    #[test]
    fn test_dedup_keeps_first_label() {
        let a = descriptor(vec![track(Some("https://s/eng.vtt"), "captions", Some("English"))]);
        let b = descriptor(vec![
            track(Some("https://s/eng.vtt"), "captions", Some("English (CC)")),
            track(Some("https://s/por.vtt"), "captions", None),
        ]);

        let tracks = collect([&a, &b]);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].label, "English");
        assert_eq!(tracks[1].label, DEFAULT_TRACK_LABEL);
    }

    #[test]
    fn test_idempotent() {
        let a = descriptor(vec![
            track(Some("https://s/eng.vtt"), "captions", Some("English")),
            track(Some("https://s/eng.vtt"), "captions", Some("Dup")),
        ]);
        let once = collect([&a]);
        let twice = collect([&a, &a]);
        assert_eq!(once, twice);
    }
}

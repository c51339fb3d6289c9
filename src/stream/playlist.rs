//! HLS master playlist resolution
//!
//! Expands a master playlist into its quality variants. Only one level of
//! nesting is followed (master → variant); a playlist without stream-info tags
//! resolves to itself.
//!
//! Quality labels come from `RESOLUTION` when present, otherwise from a
//! bandwidth heuristic. The thresholds are an approximation, not a contract
//! with the provider.

use reqwest::header::HeaderMap;
use url::Url;

use crate::error::{ResolveError, Result};
use crate::models::PlaylistVariant;

const STREAM_INF: &str = "#EXT-X-STREAM-INF:";

/// Label used when a playlist yields no variants
pub const DEFAULT_LABEL: &str = "Default";

/// Fetches and expands master playlists
#[derive(Debug, Clone, Default)]
pub struct PlaylistResolver {
    client: reqwest::Client,
}

impl PlaylistResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch a master playlist and enumerate its variants, best quality first
    pub async fn resolve(
        &self,
        master_url: &str,
        headers: &HeaderMap,
    ) -> Result<Vec<PlaylistVariant>> {
        let master = Url::parse(master_url).map_err(|e| {
            ResolveError::Format(format!("invalid playlist URL {}: {}", master_url, e))
        })?;

        let response = self
            .client
            .get(master_url)
            .headers(headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Remote {
                status: status.as_u16(),
                url: master_url.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| {
            ResolveError::Format(format!("unreadable playlist {}: {}", master_url, e))
        })?;

        let variants = parse_master_playlist(&text, master_url, &master);
        tracing::debug!(url = %master_url, variants = variants.len(), "resolved playlist");
        Ok(variants)
    }
}

/// Master URL with its last path segment, query and fragment removed
pub fn base_uri(master: &Url) -> Url {
    let mut base = master.clone();
    base.set_query(None);
    base.set_fragment(None);
    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop().push("");
    }
    base
}

/// Parse master playlist text into variants sorted by quality rank, descending
///
/// Never returns an empty list: a playlist without usable variants yields
/// `master_url` itself, unchanged, labelled "Default". `master` is the parsed
/// form of the same URL and only serves as the base for relative URIs.
pub fn parse_master_playlist(text: &str, master_url: &str, master: &Url) -> Vec<PlaylistVariant> {
    let base = base_uri(master);
    let mut variants: Vec<PlaylistVariant> = Vec::new();
    let mut pending: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(attrs) = line.strip_prefix(STREAM_INF) {
            pending = Some(quality_label(attrs, variants.len() + 1));
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // URI line
        let Some(label) = pending.take() else {
            continue;
        };
        match base.join(line) {
            Ok(url) => variants.push(PlaylistVariant {
                url: url.to_string(),
                quality_label: label,
            }),
            Err(e) => {
                tracing::warn!(
                    uri = line,
                    base = %base,
                    error = %e,
                    "skipping unresolvable variant"
                );
            }
        }
    }

    if variants.is_empty() {
        return vec![PlaylistVariant {
            url: master_url.to_string(),
            quality_label: DEFAULT_LABEL.to_string(),
        }];
    }

    variants.sort_by_key(|v| std::cmp::Reverse(v.rank()));
    variants
}

/// Derive a quality label from a stream-info attribute list
///
/// `position` is the 1-based index used for the "Quality N" fallback.
pub fn quality_label(attrs: &str, position: usize) -> String {
    let attrs = parse_attributes(attrs);
    let get = |key: &str| {
        attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    if let Some(height) = get("RESOLUTION").and_then(resolution_height) {
        return format!("{}p", height);
    }
    if let Some(bandwidth) = get("BANDWIDTH").and_then(|b| b.trim().parse::<u64>().ok()) {
        return bandwidth_label(bandwidth).to_string();
    }
    format!("Quality {}", position)
}

/// Approximate quality for a bandwidth in bits/second
pub fn bandwidth_label(bandwidth: u64) -> &'static str {
    match bandwidth {
        b if b >= 1_500_000 => "1080p",
        b if b >= 800_000 => "720p",
        b if b >= 350_000 => "480p",
        _ => "360p",
    }
}

/// Height component of a `WxH` resolution
fn resolution_height(value: &str) -> Option<u32> {
    let (_, height) = value.trim().split_once(['x', 'X'])?;
    height.trim().parse().ok()
}

/// Parse an HLS attribute list (`KEY=value,KEY="quoted,value"`)
pub fn parse_attributes(input: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' if in_value => in_quotes = !in_quotes,
            '=' if !in_value => in_value = true,
            ',' if !in_quotes => {
                push_attribute(&mut attrs, &mut key, &mut value);
                in_value = false;
            }
            _ if in_value => value.push(c),
            _ => key.push(c),
        }
    }
    push_attribute(&mut attrs, &mut key, &mut value);

    attrs
}

fn push_attribute(attrs: &mut Vec<(String, String)>, key: &mut String, value: &mut String) {
    let k = key.trim();
    if !k.is_empty() {
        attrs.push((k.to_string(), value.clone()));
    }
    key.clear();
    value.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "https://cdn.example/hls/ep1/master.m3u8?token=abc";

    fn master() -> Url {
        Url::parse(MASTER).unwrap()
    }

    fn parse(text: &str) -> Vec<PlaylistVariant> {
        parse_master_playlist(text, MASTER, &master())
    }

    #[test]
    fn test_base_uri() {
        assert_eq!(base_uri(&master()).as_str(), "https://cdn.example/hls/ep1/");

        let root = Url::parse("https://cdn.example/master.m3u8").unwrap();
        assert_eq!(base_uri(&root).as_str(), "https://cdn.example/");
    }

    #[test]
    fn test_parse_attributes_quoted() {
        let attrs = parse_attributes(
            r#"PROGRAM-ID=1,BANDWIDTH=2149280,CODECS="mp4a.40.2,avc1.64001f",RESOLUTION=1280x720,NAME="720""#,
        );
        assert_eq!(attrs.len(), 5);
        assert_eq!(attrs[1], ("BANDWIDTH".to_string(), "2149280".to_string()));
        assert_eq!(attrs[2].1, "mp4a.40.2,avc1.64001f");
        assert_eq!(attrs[3].1, "1280x720");
        assert_eq!(attrs[4].1, "720");
    }

    #[test]
    fn test_average_bandwidth_not_confused() {
        let label = quality_label("AVERAGE-BANDWIDTH=2000000,BANDWIDTH=400000", 1);
        assert_eq!(label, "480p");
    }

    #[test]
    fn test_quality_label_priority() {
        assert_eq!(quality_label("BANDWIDTH=100,RESOLUTION=1920x1080", 1), "1080p");
        assert_eq!(quality_label("BANDWIDTH=1500000", 1), "1080p");
        assert_eq!(quality_label("BANDWIDTH=1499999", 1), "720p");
        assert_eq!(quality_label("BANDWIDTH=800000", 1), "720p");
        assert_eq!(quality_label("BANDWIDTH=350000", 1), "480p");
        assert_eq!(quality_label("BANDWIDTH=349999", 1), "360p");
        assert_eq!(quality_label("PROGRAM-ID=1", 3), "Quality 3");
        assert_eq!(quality_label("BANDWIDTH=abc", 2), "Quality 2");
    }

    #[test]
    fn test_relative_and_absolute_variants() {
        let text = "#EXTM3U\n\
                    #EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360\n\
                    index-360.m3u8\n\
                    #EXT-X-STREAM-INF:BANDWIDTH=2800000,RESOLUTION=1920x1080\n\
                    https://other.example/abs/index-1080.m3u8\n";
        let variants = parse(text);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].quality_label, "1080p");
        assert_eq!(variants[0].url, "https://other.example/abs/index-1080.m3u8");
        assert_eq!(variants[1].quality_label, "360p");
        assert_eq!(variants[1].url, "https://cdn.example/hls/ep1/index-360.m3u8");
    }

    #[test]
    fn test_comment_lines_between_header_and_uri() {
        let text = "#EXTM3U\n\
                    #EXT-X-STREAM-INF:RESOLUTION=1280x720\n\
                    \n\
                    # some comment\n\
                    v720.m3u8\n";
        let variants = parse(text);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].url, "https://cdn.example/hls/ep1/v720.m3u8");
    }

    #[test]
    fn test_media_playlist_falls_back_to_master() {
        let text = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:10,\nseg0.ts\n#EXT-X-ENDLIST\n";
        let variants = parse(text);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].url, MASTER);
        assert_eq!(variants[0].quality_label, DEFAULT_LABEL);
    }

    #[test]
    fn test_fallback_keeps_master_url_verbatim() {
        let raw = "HTTP://CDN.Example:80/hls/./ep1/../ep1/master.m3u8?sig=a%2Fb+c";
        let parsed = Url::parse(raw).unwrap();
        assert_ne!(parsed.as_str(), raw);

        let variants = parse_master_playlist("#EXTM3U\n", raw, &parsed);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].url, raw);
    }

    #[test]
    fn test_unresolvable_variant_is_skipped() {
        let text = "#EXT-X-STREAM-INF:RESOLUTION=1920x1080\n\
                    http://[::1\n\
                    #EXT-X-STREAM-INF:RESOLUTION=1280x720\n\
                    ok.m3u8\n";
        let variants = parse(text);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].quality_label, "720p");
    }

    #[test]
    fn test_positional_labels_sink_to_bottom() {
        let text = "#EXT-X-STREAM-INF:PROGRAM-ID=1\n\
                    a.m3u8\n\
                    #EXT-X-STREAM-INF:RESOLUTION=854x480\n\
                    b.m3u8\n\
                    #EXT-X-STREAM-INF:PROGRAM-ID=1\n\
                    c.m3u8\n";
        let variants = parse(text);
        let labels: Vec<&str> = variants.iter().map(|v| v.quality_label.as_str()).collect();
        assert_eq!(labels, vec!["480p", "Quality 1", "Quality 3"]);
    }
}

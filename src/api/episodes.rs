//! Episode listing
//!
//! Turns an anime page reference into episode references that the resolver
//! accepts.

use scraper::Html;

use super::client::{selector, AjaxHtml, ProviderClient};
use crate::error::{ResolveError, Result};
use crate::models::{EpisodeEntry, EpisodeRef};

const EPISODE_ITEMS: &str = "div.ss-list > a.ssl-item.ep-item";
const EPISODE_NUMBER: &str = "div.ssli-order";

impl ProviderClient {
    /// List the episodes of an anime, newest first
    pub async fn list_episodes(&self, anime_ref: &str) -> Result<Vec<EpisodeEntry>> {
        let anime_id = anime_id(anime_ref).ok_or_else(|| {
            ResolveError::NotFound(format!("could not get anime id from {:?}", anime_ref))
        })?;

        let url = self.url(&format!(
            "/ajax/v2/episode/list/{}",
            urlencoding::encode(&anime_id)
        ));
        let envelope: AjaxHtml = self.get_json(&url).await?;

        if !envelope.status {
            return Err(ResolveError::NotFound(format!(
                "episode list for anime {} returned status false",
                anime_id
            )));
        }

        let episodes = parse_episode_list(&envelope.html)?;
        if episodes.is_empty() {
            tracing::warn!(anime_id = %anime_id, "episode list is empty");
        }
        Ok(episodes)
    }
}

/// Anime id: text after the last `-` of the path, before any query.
/// A reference without a dash is taken as a bare id.
pub fn anime_id(anime_ref: &str) -> Option<String> {
    let path = anime_ref.trim().split(['?', '#']).next().unwrap_or("");
    let id = match path.rsplit_once('-') {
        Some((_, id)) => id,
        None if !path.contains('/') => path,
        None => "",
    };

    let id = id.trim_end_matches('/');
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Parse the episode-list HTML; items missing href, title or number are skipped
pub fn parse_episode_list(html: &str) -> Result<Vec<EpisodeEntry>> {
    let document = Html::parse_fragment(html);
    let item_selector = selector(EPISODE_ITEMS)?;
    let number_selector = selector(EPISODE_NUMBER)?;

    let mut episodes = Vec::new();
    for item in document.select(&item_selector) {
        let href = item.value().attr("href").unwrap_or("").trim();
        let title = item.value().attr("title").unwrap_or("").trim();
        let number = item
            .select(&number_selector)
            .next()
            .map(|n| n.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        if href.is_empty() || title.is_empty() || number.is_empty() {
            tracing::debug!(href, title, number = %number, "skipping incomplete episode item");
            continue;
        }

        let id = item
            .value()
            .attr("data-id")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| EpisodeRef::new(href).episode_id());
        let Some(id) = id else {
            tracing::debug!(href, "skipping episode item without id");
            continue;
        };

        episodes.push(EpisodeEntry {
            id,
            number: number.parse().unwrap_or(0.0),
            title: title.to_string(),
            href: href.to_string(),
        });
    }

    // Provider lists oldest first
    episodes.reverse();
    Ok(episodes)
}

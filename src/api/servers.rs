//! Server discovery
//!
//! Lists the playback mirrors for an episode. The provider answers with a JSON
//! envelope whose `html` field holds two groups of server items (SUB and DUB).

use scraper::{ElementRef, Html};
use serde::Serialize;

use super::client::{selector, AjaxHtml, ProviderClient};
use crate::error::{ResolveError, Result};
use crate::models::{AudioKind, Diagnostic, DiagnosticKind, EpisodeRef, Server};

const SUB_SERVERS: &str = "div.servers-sub div.item";
const DUB_SERVERS: &str = "div.servers-dub div.item";

/// Servers discovered for an episode, SUB before DUB
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerList {
    pub servers: Vec<Server>,
    /// Entries dropped during parsing (missing ids)
    pub skipped: Vec<Diagnostic>,
}

impl ProviderClient {
    /// Enumerate candidate playback servers for an episode
    pub async fn discover_servers(
        &self,
        episode: &EpisodeRef,
        include_dub: bool,
    ) -> Result<ServerList> {
        let episode_id = episode.episode_id().ok_or_else(|| {
            ResolveError::NotFound(format!("could not get episode id from {:?}", episode.as_str()))
        })?;

        let url = self.url(&format!(
            "/ajax/v2/episode/servers?episodeId={}",
            urlencoding::encode(&episode_id)
        ));
        let envelope: AjaxHtml = self.get_json(&url).await?;

        if !envelope.status {
            return Err(ResolveError::NotFound(format!(
                "server list for episode {} returned status false",
                episode_id
            )));
        }

        let list = parse_server_list(&envelope.html, include_dub)?;
        tracing::debug!(
            episode_id = %episode_id,
            servers = list.servers.len(),
            skipped = list.skipped.len(),
            "discovered servers"
        );
        Ok(list)
    }
}

/// Extract SUB (and optionally DUB) servers from the server-list HTML
pub fn parse_server_list(html: &str, include_dub: bool) -> Result<ServerList> {
    let document = Html::parse_fragment(html);
    let mut list = ServerList::default();

    let mut groups = vec![(SUB_SERVERS, AudioKind::Sub)];
    if include_dub {
        groups.push((DUB_SERVERS, AudioKind::Dub));
    }

    let name_selector = selector("a")?;
    for (css, kind) in groups {
        let item_selector = selector(css)?;
        for item in document.select(&item_selector) {
            match parse_server_item(item, kind, &name_selector) {
                Some(server) => list.servers.push(server),
                None => list.skipped.push(Diagnostic::new(
                    DiagnosticKind::MissingServerId,
                    format!("{} server entry without data-id", kind),
                )),
            }
        }
    }

    Ok(list)
}

fn parse_server_item(
    item: ElementRef<'_>,
    kind: AudioKind,
    name_selector: &scraper::Selector,
) -> Option<Server> {
    let id = item.value().attr("data-id").unwrap_or("").trim();
    if id.is_empty() {
        return None;
    }

    let display_name = item
        .select(name_selector)
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("Server {}", id));

    Some(Server {
        id: id.to_string(),
        display_name,
        kind,
    })
}

//! Provider API client
//!
//! - client: shared HTTP plumbing and request headers
//! - servers: playback server discovery per episode
//! - sources: per-server source descriptors
//! - episodes: episode listing for an anime

pub mod client;
pub mod episodes;
pub mod servers;
pub mod sources;

pub use client::ProviderClient;
pub use servers::{parse_server_list, ServerList};
pub use sources::parse_source_descriptor;

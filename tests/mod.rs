//! Integration tests for aniresolve
//!
//! Tests are organized by component:
//! - servers_test: Server discovery against a mock provider
//! - sources_test: Source descriptor fetching
//! - episodes_test: Episode listing
//! - playlist_test: Master playlist expansion
//! - assembler_test: End-to-end flow (Servers -> Sources -> Playlists -> Videos)
//! - cli_test: Argument parsing, JSON output and exit codes

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs

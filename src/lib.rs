//! A terminal bulk editor for podcast episode metadata.
//!
//! podbean-editor fetches every episode of a Podbean podcast through the
//! paginated list endpoint, presents them in an editable table, tracks
//! per-field edits locally, and pushes the changed episodes back one update
//! request at a time before re-fetching the authoritative list.
//!
//! # Features
//!
//! - OAuth token acquisition (client credentials or authorization code)
//! - Sequential offset/limit pagination until the list is exhausted
//! - Per-episode, per-field change tracking with dirty indicators
//! - Batch save with per-episode failure isolation and an aggregate tally
//! - Required fields (`status`, `episode_type`) always preserved on update
//!
//! # Usage
//!
//! ```bash
//! # Edit your podcast with app credentials from the config file
//! cargo run
//!
//! # Print the browser authorization URL for the code flow
//! cargo run -- --print-auth-url
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod tracker;
pub mod tui;
pub mod types;

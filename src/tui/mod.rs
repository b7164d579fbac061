//! Terminal User Interface for podbean-editor using ratatui.
//!
//! This module provides a full-screen table editor for browsing and
//! editing podcast episode metadata.

mod render;
mod state;
mod types;

pub use render::draw;
pub use state::App;
pub use types::{Action, Column, Screen};

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

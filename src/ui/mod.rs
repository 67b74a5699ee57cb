//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - Layout and render dispatch
//! - `key_entry` - API key field and key guidance
//! - `summary` - Status, ping and error line
//! - `listings` - Listings table
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay

mod help;
mod input;
mod key_entry;
mod listings;
mod loop_runner;
mod render;
mod status;
mod summary;

pub use loop_runner::{run, Action};
pub use render::render;

//! Utility functions shared by the UI.
//!
//! - **Text**: stripping terminal control sequences from feed text and
//!   width-aware truncation
//! - **URLs**: building purchase links and vetting URLs before they are
//!   opened in the browser

mod links;
mod text;

pub use links::{purchase_url, validate_url_for_open, UrlValidationError};
pub use text::{sanitize, truncate_to_width};

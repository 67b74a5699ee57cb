//! listwatch: a terminal dashboard for live marketplace listings.
//!
//! Enter an API key, and the app keeps one feed connection open for it,
//! showing connection status, latency, the last feed error and the 51 most
//! recent listings.

pub mod app;
pub mod config;
pub mod controller;
pub mod credential;
pub mod feed;
pub mod theme;
pub mod ui;
pub mod util;
pub mod view;

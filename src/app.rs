use crate::config::Config;
use crate::controller::FeedController;
use crate::credential::Credential;
use crate::feed::{FeedEnvelope, Listing};
use crate::theme::{StyleMap, ThemeVariant};
use crate::util::{purchase_url, UrlValidationError};
use crate::view::FeedView;
use ratatui::style::Style;
use std::borrow::Cow;
use tokio::time::Instant;
use url::Url;

/// How long a status bar message stays visible.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// Focus
// ============================================================================

/// Which panel receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Typing into the API key field.
    KeyEntry,
    /// Navigating the listings table.
    Listings,
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    // Key entry
    /// Current contents of the key field. Kept after confirming.
    pub key_input: String,
    pub focus: Focus,

    // Feed
    /// Owns the live connection; scoped to the active credential.
    pub controller: FeedController,
    pub view: FeedView,

    // Listings table
    pub selected: usize,
    pub purchase_url_base: String,

    // Chrome
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub show_help: bool,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,
}

impl App {
    pub fn new(config: &Config, controller: FeedController) -> Self {
        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, falling back to dark");
            ThemeVariant::Dark
        });

        Self {
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            key_input: String::new(),
            focus: Focus::KeyEntry,
            controller,
            view: FeedView::new(),
            selected: 0,
            purchase_url_base: config.purchase_url_base.clone(),
            status_message: None,
            show_help: false,
            needs_redraw: true,
        }
    }

    /// Resolve a theme role to a style.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Switch to the next theme variant and return its name.
    pub fn cycle_theme(&mut self) -> &'static str {
        self.theme_variant = self.theme_variant.next();
        self.theme = StyleMap::from_palette(&self.theme_variant.palette());
        self.theme_variant.name()
    }

    /// The credential the feed is connected with, if one has been confirmed.
    pub fn credential(&self) -> Option<&Credential> {
        self.controller.credential()
    }

    /// Confirm the key field.
    ///
    /// Blank input is ignored without any message. Otherwise the trimmed key
    /// becomes the active credential and focus moves to the table. Returns
    /// true if a new connection was opened, in which case the status and
    /// ping of the previous connection are cleared.
    pub fn submit_key(&mut self) -> bool {
        let Some(credential) = Credential::from_input(&self.key_input) else {
            tracing::debug!("Ignoring blank API key");
            return false;
        };

        self.focus = Focus::Listings;
        if !self.controller.set_credential(credential) {
            return false;
        }
        self.view.reset_connection();
        true
    }

    /// Apply an event from the feed channel.
    ///
    /// Events from a connection that has since been replaced or closed are
    /// dropped. Returns true if the view changed.
    pub fn handle_feed_event(&mut self, envelope: FeedEnvelope) -> bool {
        if !self.controller.accepts(&envelope) {
            tracing::debug!(
                generation = envelope.generation,
                current = self.controller.generation(),
                kind = envelope.event.kind().name(),
                "Dropping event from stale connection"
            );
            return false;
        }

        tracing::trace!(kind = envelope.event.kind().name(), "Feed event");
        self.view.apply(envelope.event);
        self.clamp_selection();
        true
    }

    pub fn selected_listing(&self) -> Option<&Listing> {
        self.view.listings().get(self.selected)
    }

    /// Purchase page for the selected row.
    pub fn selected_purchase_url(&self) -> Option<Result<Url, UrlValidationError>> {
        self.selected_listing()
            .map(|listing| purchase_url(&self.purchase_url_base, &listing.moment.external_id))
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        let len = self.view.listings().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    /// Keep the selection on a valid row after the table shrinks.
    pub fn clamp_selection(&mut self) {
        let len = self.view.listings().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

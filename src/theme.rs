//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Key entry --
    pub key_input: Style,
    pub key_label: Style,
    pub guidance: Style,

    // -- Summary bar --
    pub status_connected: Style,
    pub status_disconnected: Style,
    pub ping: Style,
    pub feed_error: Style,

    // -- Listings table --
    pub table_header: Style,
    pub row_even: Style,
    pub row_odd: Style,
    pub row_selected: Style,
    pub buy_link: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            key_input: Style::default().fg(Color::White),
            key_label: Style::default().add_modifier(Modifier::BOLD),
            guidance: Style::default().fg(Color::Gray),

            status_connected: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            status_disconnected: Style::default().fg(Color::Yellow),
            ping: Style::default().fg(Color::Cyan),
            feed_error: Style::default().fg(Color::Red),

            table_header: Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
            row_even: Style::default().bg(Color::Rgb(38, 38, 38)),
            row_odd: Style::default(),
            row_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            buy_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
        }
    }

    /// Light palette, for light terminal backgrounds.
    fn light() -> Self {
        Self {
            key_input: Style::default().fg(Color::Black),
            key_label: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            guidance: Style::default().fg(Color::DarkGray),

            status_connected: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            status_disconnected: Style::default().fg(Color::Magenta),
            ping: Style::default().fg(Color::Blue),
            feed_error: Style::default().fg(Color::Red),

            table_header: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
            // #eee / #fff striping
            row_even: Style::default().bg(Color::Rgb(238, 238, 238)).fg(Color::Black),
            row_odd: Style::default().bg(Color::White).fg(Color::Black),
            row_selected: Style::default().bg(Color::Blue).fg(Color::White),
            buy_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// Resolves role names (e.g. `"row_even"`) to their concrete `Style`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 15] = [
    "key_input",
    "key_label",
    "guidance",
    "status_connected",
    "status_disconnected",
    "ping",
    "feed_error",
    "table_header",
    "row_even",
    "row_odd",
    "row_selected",
    "buy_link",
    "status_bar",
    "panel_border",
    "panel_border_focused",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 15] = [
            p.key_input,
            p.key_label,
            p.guidance,
            p.status_connected,
            p.status_disconnected,
            p.ping,
            p.feed_error,
            p.table_header,
            p.row_even,
            p.row_odd,
            p.row_selected,
            p.buy_link,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

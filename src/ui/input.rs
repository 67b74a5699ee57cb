//! Input handling for the TUI.
//!
//! Keys are routed by overlay first, then by the focused panel.

use crate::app::{App, Focus};
use crate::util::validate_url_for_open;
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Longest key the input field accepts. Guards against held keys and pastes.
pub(super) const MAX_KEY_LENGTH: usize = 512;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    // Help overlay captures all keys when visible
    if app.show_help {
        if matches!(
            code,
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
        ) {
            app.show_help = false;
        }
        return Action::Continue;
    }

    match app.focus {
        Focus::KeyEntry => handle_key_entry_input(app, code, modifiers),
        Focus::Listings => handle_listings_input(app, code),
    }
}

/// Editing the API key field.
///
/// Every printable key is text here, so only Enter, Esc, Backspace and Tab
/// act as commands.
fn handle_key_entry_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match code {
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
            if app.key_input.len() < MAX_KEY_LENGTH {
                app.key_input.push(c);
            }
        }
        KeyCode::Char('u') => app.key_input.clear(),
        KeyCode::Backspace => {
            app.key_input.pop();
        }
        KeyCode::Enter => {
            if app.submit_key() {
                app.set_status("Connecting...");
            }
        }
        KeyCode::Esc | KeyCode::Tab => {
            if app.credential().is_some() {
                app.focus = Focus::Listings;
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Navigating the listings table.
fn handle_listings_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('g') | KeyCode::Home => app.selected = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.selected = app.view.listings().len().saturating_sub(1);
        }
        KeyCode::Char('o') | KeyCode::Enter => open_selected(app),
        KeyCode::Char('e') | KeyCode::Tab => app.focus = Focus::KeyEntry,
        KeyCode::Char('t') => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
    Action::Continue
}

/// Open the purchase page of the selected listing in the browser.
fn open_selected(app: &mut App) {
    let url = match app.selected_purchase_url() {
        Some(Ok(url)) => url,
        Some(Err(e)) => {
            app.set_status(e.to_string());
            return;
        }
        None => return,
    };

    // SEC: Validate URL before open::that() to prevent command injection
    if let Err(e) = validate_url_for_open(&url) {
        app.set_status(e.to_string());
    } else if let Err(e) = open::that(url.as_str()) {
        tracing::warn!(error = %e, url = %url, "Failed to open browser");
        app.set_status(format!("Failed to open browser: {}", e));
    } else {
        app.set_status("Opening purchase page...");
    }
}

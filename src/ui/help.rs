//! Help overlay: keybinding table grouped by panel.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const SECTIONS: [(&str, &[(&str, &str)]); 3] = [
    (
        "General",
        &[("Ctrl+C", "Quit"), ("?", "Toggle this help")],
    ),
    (
        "API Key",
        &[
            ("Enter", "Confirm key and connect"),
            ("Backspace", "Delete character"),
            ("Ctrl+U", "Clear field"),
            ("Esc / Tab", "Back to listings"),
        ],
    ),
    (
        "Listings",
        &[
            ("j / Down", "Next listing"),
            ("k / Up", "Previous listing"),
            ("g / G", "First / last listing"),
            ("o / Enter", "Open BUY link"),
            ("e / Tab", "Edit API key"),
            ("t", "Cycle theme"),
            ("q", "Quit"),
        ],
    ),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(70, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut rows: Vec<Row> = Vec::new();
    for (label, bindings) in SECTIONS {
        rows.push(Row::new(vec![
            Line::from(Span::styled(
                format!("-- {} --", label),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ]));
        for (key, description) in bindings {
            rows.push(Row::new(vec![format!("  {}", key), description.to_string()]));
        }
        rows.push(Row::new(vec![String::new(), String::new()]));
    }
    rows.pop();

    let widths = [Constraint::Length(14), Constraint::Min(20)];
    let table = Table::new(rows, widths).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(" Help (? to close) "),
    );

    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

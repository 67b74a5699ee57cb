use crate::app::{App, Focus};
use crate::util::{sanitize, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const PROMPT: &str = "Enter your Rayvin Connect API Key: ";
const KEY_SOURCE_URL: &str = "https://rayvin.io/";

/// Render the key input line, with the active key to its right.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::KeyEntry;
    let border_style = if focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" API Key ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = match app.credential() {
        Some(_) => Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(inner),
        None => Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(inner),
    };

    // Show the tail of long input so the cursor stays visible
    let field_width = (columns[0].width as usize).saturating_sub(PROMPT.len() + 1);
    let input = sanitize(&app.key_input);
    let skip = input.chars().count().saturating_sub(field_width);
    let visible: String = input.chars().skip(skip).collect();

    let mut spans = vec![
        Span::styled(PROMPT, app.style("key_label")),
        Span::styled(visible, app.style("key_input")),
    ];
    if focused {
        spans.push(Span::styled("_", app.style("key_input")));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), columns[0]);

    if let Some(credential) = app.credential() {
        let width = columns[1].width as usize;
        let text = format!("Using API Key: {}", sanitize(credential.expose()));
        f.render_widget(
            Paragraph::new(truncate_to_width(&text, width).into_owned())
                .style(app.style("guidance")),
            columns[1],
        );
    }
}

/// Render where to get a key. Shown until a key is confirmed.
pub fn render_guidance(f: &mut Frame, app: &App, area: Rect) {
    let text = Line::from(vec![
        Span::raw("If you do not have a Rayvin Connect API Key, visit "),
        Span::styled(KEY_SOURCE_URL, app.style("buy_link")),
        Span::raw(
            " and log in. Check out the \"Rayvin Connect\" page from the main header navigation.",
        ),
    ]);
    let paragraph = Paragraph::new(text)
        .style(app.style("guidance"))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

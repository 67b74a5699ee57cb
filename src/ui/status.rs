use crate::app::{App, Focus};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // EDGE-001: Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.focus {
            Focus::KeyEntry if app.credential().is_some() => {
                Cow::Borrowed("Type key | ENTER confirm | ESC back | Ctrl+U clear | Ctrl+C quit")
            }
            Focus::KeyEntry => Cow::Borrowed("Type key | ENTER confirm | Ctrl+C quit"),
            Focus::Listings => Cow::Borrowed(
                "[j/k]select [o]pen BUY [e]dit key [t]heme [?]help [q]uit",
            ),
        }
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}

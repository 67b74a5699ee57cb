use crate::app::App;
use crate::util::sanitize;
use crate::view::ConnectionStatus;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the status, ping and error line.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22),
            Constraint::Length(16),
            Constraint::Min(0),
        ])
        .split(area);

    let status = app.view.status();
    let status_style = match status {
        ConnectionStatus::Connected => app.style("status_connected"),
        ConnectionStatus::Disconnected => app.style("status_disconnected"),
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Status: "),
            Span::styled(status.label(), status_style),
        ])),
        columns[0],
    );

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("Ping: "),
            Span::styled(app.view.ping_label(), app.style("ping")),
        ])),
        columns[1],
    );

    if let Some(error) = app.view.error_label() {
        f.render_widget(
            Paragraph::new(sanitize(&error).into_owned())
                .style(app.style("feed_error"))
                .alignment(Alignment::Right),
            columns[2],
        );
    }
}

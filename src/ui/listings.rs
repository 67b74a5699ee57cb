use crate::app::{App, Focus};
use crate::feed::Listing;
use crate::util::{sanitize, truncate_to_width};
use chrono::{DateTime, Local, TimeZone};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    text::{Line, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use std::fmt::Display;

const DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

const HEADERS: [&str; 7] = ["Date", "Player", "Play Category", "Serial", "Price", "Seller", ""];

const WIDTHS: [Constraint; 7] = [
    Constraint::Length(19),
    Constraint::Min(12),
    Constraint::Min(10),
    Constraint::Length(7),
    Constraint::Length(10),
    Constraint::Min(10),
    Constraint::Length(3),
];

/// Longest seller name drawn before truncation. Flow addresses are long.
const MAX_SELLER_WIDTH: usize = 20;

/// Format a unix timestamp (seconds) as `MM/DD/YYYY HH:mm:ss` in `tz`.
pub fn format_date<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(tz).format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// `$<price>` with no forced decimals: 100 → `$100`, 12.5 → `$12.5`.
pub fn format_price(price: f64) -> String {
    format!("${}", price)
}

fn listing_row<'a>(listing: &'a Listing, index: usize, app: &App) -> Row<'a> {
    let stripe = if index % 2 == 0 {
        app.style("row_even")
    } else {
        app.style("row_odd")
    };
    let seller = sanitize(listing.seller_name());

    Row::new(vec![
        Cell::from(format_date(listing.timestamp, &Local)),
        Cell::from(sanitize(&listing.play.player_name)),
        Cell::from(sanitize(&listing.play.play_category)),
        Cell::from(listing.moment.serial_number.to_string()),
        Cell::from(Text::from(
            Line::from(format_price(listing.listing.price)).alignment(Alignment::Right),
        )),
        Cell::from(truncate_to_width(&seller, MAX_SELLER_WIDTH).into_owned()),
        Cell::from("BUY").style(app.style("buy_link")),
    ])
    .style(stripe)
}

/// Render the listings table
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let border_style = if app.focus == Focus::Listings {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let listings = app.view.listings();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" Listings ({}) ", listings.len()));

    if listings.is_empty() {
        let paragraph = Paragraph::new("Waiting for listings...")
            .style(app.style("guidance"))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let rows: Vec<Row> = listings
        .iter()
        .enumerate()
        .map(|(i, listing)| listing_row(listing, i, app))
        .collect();

    let header = Row::new(HEADERS.to_vec()).style(app.style("table_header"));
    let table = Table::new(rows, WIDTHS)
        .header(header)
        .block(block)
        .row_highlight_style(app.style("row_selected"));

    let mut state = TableState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(table, area, &mut state);
}

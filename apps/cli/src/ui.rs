use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use radiolog_feed::{ConnectionStatus, LoadState, Transcription};
use radiolog_relative_time::from_now;

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App) {
    let [header_area, list_area, status_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, app, header_area);
    render_list(frame, app, list_area);
    render_status(frame, app, status_area);
    render_hints(frame, hint_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let text = format!(" radiolog | {} ", app.base_url());
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let items = app.feed.items();
    if items.is_empty() {
        let placeholder = match app.feed.load() {
            LoadState::Loading => "loading recent transcriptions…",
            LoadState::Failed => "could not load recent transcriptions",
            LoadState::Ready => "nothing on air yet",
        };
        frame.render_widget(
            Paragraph::new(placeholder).style(Style::default().fg(Color::DarkGray)),
            area,
        );
        return;
    }

    let rows = area.height as usize;
    let len = items.len();
    let cursor = app.cursor_from_bottom.min(len - 1);

    // Bottom-anchored window; once the cursor climbs past it, the cursor
    // pins to the top row and the window follows.
    let end = len - cursor.saturating_sub(rows.saturating_sub(1));
    let start = end.saturating_sub(rows);
    let cursor_index = len - 1 - cursor;

    let lines: Vec<Line> = items[start..end]
        .iter()
        .enumerate()
        .map(|(offset, item)| {
            let index = start + offset;
            render_row(app, item, index == cursor_index, index == len - 1)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_row<'a>(app: &App, item: &'a Transcription, selected: bool, newest: bool) -> Line<'a> {
    let marker = if selected { "› " } else { "  " };
    let playing = app.playing.as_deref() == Some(item.audio_hash.as_str());

    let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("{:>22}  ", from_now(item.timestamp)),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let mut text_style = Style::default();
    if playing {
        spans.push(Span::styled("▶ ", Style::default().fg(Color::Yellow)));
        text_style = text_style.fg(Color::Yellow);
    }
    if selected {
        text_style = text_style.add_modifier(Modifier::BOLD);
    }
    spans.push(Span::styled(item.text.as_str(), text_style));

    if app.show_translation
        && let Some(translation) = &item.translation
    {
        spans.push(Span::styled(
            format!("  ({translation})"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    // Live cursor on the newest item only.
    if newest && app.feed.connection() == ConnectionStatus::Live {
        spans.push(Span::styled(" ▏", Style::default().fg(Color::DarkGray)));
    }

    Line::from(spans)
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![match app.feed.connection() {
        ConnectionStatus::Establishing => {
            Span::styled(" ○ connecting ", Style::default().fg(Color::DarkGray))
        }
        ConnectionStatus::Live => Span::styled(" ● live ", Style::default().fg(Color::Green)),
    }];

    match app.feed.load() {
        LoadState::Loading => spans.push(Span::styled(
            " loading history… ",
            Style::default().fg(Color::DarkGray),
        )),
        LoadState::Failed => spans.push(Span::styled(
            " history failed - [r] retry ",
            Style::default().fg(Color::Red),
        )),
        LoadState::Ready => {}
    }

    if app.older_in_flight {
        spans.push(Span::styled(
            " loading older… ",
            Style::default().fg(Color::DarkGray),
        ));
    }

    if app.feed.show_scroll_button() {
        spans.push(Span::styled(
            format!(" ↓ {} new - [G] jump ", app.feed.unread_count()),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    if let Some(error) = &app.last_error {
        spans.push(Span::styled(
            format!(" {error} "),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_hints(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(" [↑/↓] move  [Enter] play/stop  [G] newest  [r] retry  [q] quit ")
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

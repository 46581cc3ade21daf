//! Transcript widget: user turns, assistant replies and sentiment cards.

use proto::{ChatMessage, MessageContent, MessageState, Role, SentimentSummary};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::app::{SPINNER, Surface, TuiApp};
use super::theme::THEME;

const INDENT: &str = "  ";

/// Lines for one message, starting with a blank separator.
pub fn message_lines(message: &ChatMessage, spinner: char) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    let (label, color) = match message.role {
        Role::User => ("You", THEME.user_label),
        Role::Assistant => ("Assistant", THEME.assistant_label),
        Role::System => ("System", THEME.fg_dim),
    };
    lines.push(Line::from(Span::styled(
        format!("{label}:"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));

    match &message.state {
        MessageState::Pending => lines.push(Line::from(Span::styled(
            format!("{INDENT}{spinner} Generating response..."),
            Style::default().fg(THEME.pending),
        ))),
        MessageState::Failed(error) => lines.push(Line::from(Span::styled(
            format!("{INDENT}{error}"),
            Style::default().fg(THEME.error),
        ))),
        MessageState::Resolved(MessageContent::Text(text)) => {
            lines.extend(text.lines().map(|l| Line::from(format!("{INDENT}{l}"))));
        }
        MessageState::Resolved(MessageContent::Markdown(text)) => {
            lines.extend(text.lines().map(markdown_line));
        }
        MessageState::Resolved(MessageContent::Sentiment(summary)) => {
            lines.extend(sentiment_lines(summary));
        }
    }
    lines
}

/// Headings become bold; everything else is shown as written.
fn markdown_line(raw: &str) -> Line<'static> {
    let trimmed = raw.trim_start();
    let heading = trimmed.trim_start_matches('#');
    if heading.len() < trimmed.len() && heading.starts_with(' ') {
        return Line::from(Span::styled(
            format!("{INDENT}{}", heading.trim()),
            Style::default()
                .fg(THEME.accent_bright)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(format!("{INDENT}{raw}"))
}

fn sentiment_lines(summary: &SentimentSummary) -> Vec<Line<'static>> {
    let primary = &summary.primary_sentiment;
    let mut lines = vec![Line::from(vec![
        Span::raw(format!("{INDENT}Sentiment: ")),
        Span::styled(
            primary.label.clone(),
            Style::default()
                .fg(THEME.sentiment(&primary.label))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({})", primary.confidence),
            Style::default().fg(THEME.fg_dim),
        ),
    ])];
    for score in &summary.all_sentiments {
        lines.push(Line::from(vec![
            Span::styled(format!("{INDENT}  ▸ "), Style::default().fg(THEME.fg_muted)),
            Span::styled(
                format!("{:<12}", score.label),
                Style::default().fg(THEME.sentiment(&score.label)),
            ),
            Span::styled(score.confidence.clone(), Style::default().fg(THEME.fg_dim)),
        ]));
    }
    lines.push(Line::from(Span::styled(
        format!("{INDENT}{}", summary.interpretation),
        Style::default().fg(THEME.fg),
    )));
    lines
}

/// Rows `lines` occupy once wrapped to `width` columns.
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines
        .iter()
        .map(|line| {
            let cols: usize = line.spans.iter().map(|s| s.content.width()).sum();
            cols.div_ceil(width).max(1)
        })
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

/// Renders the transcript and clamps `history_scroll` to the content.
pub fn render(app: &mut TuiApp, frame: &mut Frame<'_>, area: Rect) {
    let spinner = SPINNER[(app.spinner_tick as usize) % SPINNER.len()];
    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in app.surface.transcript() {
        lines.extend(message_lines(message, spinner));
    }

    let title = match &app.surface {
        Surface::Dashboard(dash) => dash.active_chat().map(|c| format!(" {} ", c.title())),
        Surface::Demo(_) => None,
    }
    .unwrap_or_else(|| " Chat ".to_string());

    if lines.is_empty() {
        let hint = if app.surface.is_key_valid() {
            "Select a model and start chatting."
        } else {
            "Enter your API key to start chatting."
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(THEME.fg_muted))));
    }

    let inner_width = area.width.saturating_sub(2);
    let visible_height = area.height.saturating_sub(2);
    let max_scroll = wrapped_height(&lines, inner_width).saturating_sub(visible_height);
    app.history_scroll = app.history_scroll.min(max_scroll);

    let history = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(THEME.border))
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.history_scroll, 0));
    frame.render_widget(history, area);
}

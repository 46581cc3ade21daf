//! Dashboard chat list with relative timestamps.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::app::{Focus, Surface, TuiApp};
use super::theme::THEME;

const SIDEBAR_WIDTH: u16 = 30;

pub fn sidebar_width() -> u16 {
    SIDEBAR_WIDTH
}

pub fn render(app: &TuiApp, frame: &mut Frame<'_>, area: Rect) {
    let Surface::Dashboard(dash) = &app.surface else {
        return;
    };
    let focused = app.focus == Focus::Sidebar;
    let header = Line::from(vec![
        Span::styled(
            " Chats ",
            Style::default()
                .fg(THEME.sidebar_active_indicator)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("({})", dash.sessions().len()),
            Style::default().fg(THEME.fg_muted),
        ),
    ]);
    let border_style = if focused {
        Style::default().fg(THEME.border_focused)
    } else {
        Style::default().fg(THEME.sidebar_border)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(header);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let max_name_width = usize::from(inner.width.saturating_sub(2));
    let active = dash.active_chat_id();
    let mut lines: Vec<Line<'_>> = Vec::new();
    for (idx, chat) in dash.sessions().iter().enumerate() {
        let is_active = Some(chat.id()) == active;
        let is_hovered = focused && idx == app.sidebar_cursor;

        let indicator = if is_active || is_hovered {
            Span::styled(
                "▌",
                Style::default().fg(if is_active {
                    THEME.sidebar_active_indicator
                } else {
                    THEME.sidebar_hover
                }),
            )
        } else {
            Span::raw(" ")
        };
        let name_style = if is_active {
            Style::default().fg(THEME.fg).add_modifier(Modifier::BOLD)
        } else if is_hovered {
            Style::default().fg(THEME.fg)
        } else {
            Style::default().fg(THEME.sidebar_text)
        };
        lines.push(Line::from(vec![
            indicator,
            Span::styled(
                format!(" {}", truncate_str(chat.title(), max_name_width.saturating_sub(1))),
                name_style,
            ),
        ]));

        let model = chat.model().map(|m| m.name).unwrap_or("no model");
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format_relative_time(&chat.created_at()),
                Style::default().fg(THEME.sidebar_time),
            ),
            Span::styled(
                format!(" · {}", truncate_str(model, 14)),
                Style::default().fg(THEME.fg_muted),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            "─".repeat(max_name_width),
            Style::default().fg(THEME.sidebar_divider),
        )));
    }

    // Keep the cursor row on screen; each entry takes three rows.
    let cursor_row = u16::try_from(app.sidebar_cursor * 3).unwrap_or(u16::MAX);
    let scroll = cursor_row.saturating_sub(inner.height.saturating_sub(3));
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

/// First line of `s`, cut to `max_len` characters with a trailing `…`.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    let first_line = s.lines().next().unwrap_or(s);
    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

/// Chat age as "just now", "5m ago", "3h ago", "2d ago" or a short date.
pub fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let diff = chrono::Utc::now().signed_duration_since(*dt);
    if diff.num_seconds() < 60 {
        "just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 7 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%b %d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_str_keeps_short_titles() {
        assert_eq!(truncate_str("New Chat", 20), "New Chat");
        assert_eq!(truncate_str("anything", 0), "");
    }

    #[test]
    fn truncate_str_truncates_long_titles() {
        let result = truncate_str("Plan a two week trip across Portugal", 15);
        assert!(result.ends_with('…'));
        assert_eq!(result.chars().count(), 15);
    }

    #[test]
    fn format_relative_time_buckets() {
        let now = chrono::Utc::now();
        assert_eq!(format_relative_time(&now), "just now");
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::minutes(5))),
            "5m ago"
        );
        assert_eq!(
            format_relative_time(&(now - chrono::Duration::hours(3))),
            "3h ago"
        );
        assert!(!format_relative_time(&(now - chrono::Duration::days(10))).contains("ago"));
    }
}

//! Left-hand controls: API key field, category selector and model list.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use session::ChatPhase;

use super::app::{Focus, TuiApp};
use super::theme::THEME;

fn panel(title: &'static str, focused: bool) -> Block<'static> {
    let border = if focused { THEME.border_focused } else { THEME.border };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

/// The key is never drawn in clear text.
fn masked(key: &str) -> String {
    "•".repeat(key.chars().count())
}

fn phase_label(phase: ChatPhase) -> (&'static str, Color) {
    match phase {
        ChatPhase::Idle => ("waiting for API key", THEME.fg_muted),
        ChatPhase::KeyPending => ("key not validated", THEME.warning),
        ChatPhase::KeyValidated => ("choose a model", THEME.info),
        ChatPhase::ModelSelected => ("ready", THEME.success),
        ChatPhase::Sending | ChatPhase::AwaitingResponse => ("waiting for reply", THEME.pending),
        ChatPhase::Settled => ("ready", THEME.success),
        ChatPhase::Failed => ("last reply failed", THEME.error),
    }
}

pub fn render(app: &TuiApp, frame: &mut Frame<'_>, area: Rect) {
    let rows = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .split(area);

    // ── API key ──────────────────────────────────────────────
    let key_focused = app.focus == Focus::ApiKey;
    let status = if app.surface.is_key_valid() {
        Span::styled("✓ validated", Style::default().fg(THEME.success))
    } else {
        Span::styled("Enter to validate", Style::default().fg(THEME.fg_muted))
    };
    let (phase, phase_color) = phase_label(app.surface.phase());
    let key_lines = vec![
        Line::from(masked(&app.key_field.text)),
        Line::from(vec![
            status,
            Span::styled(format!("  · {phase}"), Style::default().fg(phase_color)),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(key_lines).block(panel(" API Key ", key_focused)),
        rows[0],
    );
    if key_focused {
        let col = u16::try_from(app.key_field.text[..app.key_field.cursor].chars().count())
            .unwrap_or(u16::MAX);
        frame.set_cursor_position((
            rows[0].x + 1 + col.min(rows[0].width.saturating_sub(3)),
            rows[0].y + 1,
        ));
    }

    // ── Category ─────────────────────────────────────────────
    let locked = app.surface.is_locked();
    let label = app
        .surface
        .category()
        .map(|c| c.label())
        .unwrap_or("Select a category");
    let mut category = vec![
        Span::styled("← ", Style::default().fg(THEME.fg_muted)),
        Span::styled(
            label,
            Style::default()
                .fg(if locked { THEME.locked } else { THEME.fg })
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" →", Style::default().fg(THEME.fg_muted)),
    ];
    if locked {
        category.push(Span::styled(" (locked)", Style::default().fg(THEME.locked)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(category))
            .block(panel(" Category ", app.focus == Focus::Category)),
        rows[1],
    );

    // ── Models ───────────────────────────────────────────────
    let model_focused = app.focus == Focus::Model;
    let selected = app.surface.selected_model().map(|m| m.id);
    let mut lines: Vec<Line<'_>> = Vec::new();
    for (idx, model) in app.surface.filtered_models().into_iter().enumerate() {
        let marker = if Some(model.id) == selected {
            Span::styled("● ", Style::default().fg(THEME.selected_marker))
        } else {
            Span::raw("  ")
        };
        let mut name_style = Style::default().fg(if locked { THEME.locked } else { THEME.fg });
        if model_focused && idx == app.model_cursor {
            name_style = name_style.fg(THEME.accent_bright).add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(vec![marker, Span::styled(model.name, name_style)]));
        lines.push(Line::from(Span::styled(
            format!("  {}", model.description),
            Style::default().fg(THEME.fg_dim),
        )));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Choose a category first.",
            Style::default().fg(THEME.fg_muted),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel(" Models ", model_focused)),
        rows[2],
    );
}

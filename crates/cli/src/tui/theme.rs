//! Centralized TUI theme built on ratatui's Tailwind CSS palette.

use ratatui::style::Color;
use ratatui::style::palette::tailwind;

/// Every visual token the TUI draws with.
pub struct Theme {
    // ── Base ──
    pub fg: Color,
    pub fg_dim: Color,
    pub fg_muted: Color,
    pub border: Color,
    /// Border color for the focused panel.
    pub border_focused: Color,

    // ── Accent / Brand ──
    pub accent: Color,
    pub accent_bright: Color,

    // ── Semantic ──
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // ── Chat roles ──
    pub user_label: Color,
    pub assistant_label: Color,
    /// Placeholder line while a reply is pending.
    pub pending: Color,

    // ── Sentiment ──
    pub sentiment_positive: Color,
    pub sentiment_negative: Color,
    pub sentiment_neutral: Color,

    // ── Sidebar ──
    pub sidebar_border: Color,
    pub sidebar_active_indicator: Color,
    pub sidebar_hover: Color,
    pub sidebar_text: Color,
    pub sidebar_time: Color,
    pub sidebar_divider: Color,

    // ── Controls / Tour ──
    /// Marker next to the selected model.
    pub selected_marker: Color,
    /// Locked selector text in the dashboard.
    pub locked: Color,
    pub tour_border: Color,
    pub tour_title: Color,
}

impl Theme {
    /// The default dark theme using Tailwind palette.
    pub const fn default_dark() -> Self {
        Self {
            fg: tailwind::SLATE.c100,
            fg_dim: tailwind::SLATE.c400,
            fg_muted: tailwind::SLATE.c500,
            border: tailwind::SLATE.c700,
            border_focused: tailwind::PURPLE.c400,

            accent: tailwind::PURPLE.c500,
            accent_bright: tailwind::PINK.c400,

            success: tailwind::EMERALD.c500,
            warning: tailwind::AMBER.c500,
            error: tailwind::RED.c500,
            info: tailwind::SKY.c500,

            user_label: tailwind::CYAN.c400,
            assistant_label: tailwind::PURPLE.c300,
            pending: tailwind::AMBER.c400,

            sentiment_positive: tailwind::EMERALD.c400,
            sentiment_negative: tailwind::RED.c400,
            sentiment_neutral: tailwind::SLATE.c300,

            sidebar_border: tailwind::SLATE.c700,
            sidebar_active_indicator: tailwind::PINK.c400,
            sidebar_hover: tailwind::SLATE.c600,
            sidebar_text: tailwind::SLATE.c300,
            sidebar_time: tailwind::SLATE.c500,
            sidebar_divider: tailwind::SLATE.c800,

            selected_marker: tailwind::PINK.c400,
            locked: tailwind::SLATE.c600,
            tour_border: tailwind::PINK.c400,
            tour_title: tailwind::PURPLE.c300,
        }
    }

    /// Color for a sentiment label such as `POSITIVE` or `1 star`.
    pub fn sentiment(&self, label: &str) -> Color {
        let label = label.to_ascii_lowercase();
        if label.contains("pos") || label.starts_with('4') || label.starts_with('5') {
            self.sentiment_positive
        } else if label.contains("neg") || label.starts_with('1') || label.starts_with('2') {
            self.sentiment_negative
        } else {
            self.sentiment_neutral
        }
    }
}

/// Global theme instance.
pub const THEME: Theme = Theme::default_dark();

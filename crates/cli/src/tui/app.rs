//! TUI application state, rendering, and input handling.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proto::{ChatMessage, InferenceError, MessageId, ModelCategory, ModelDescriptor, SessionId};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use serde_json::Value;
use session::{
    ChatPhase, DashboardController, DemoController, PendingSend, SendBlocked, SendSettled,
    TOUR_STEPS, TourGuide,
};
use tracing::debug;

use super::theme::THEME;
use super::{chat, controls, sidebar};

/// Spinner animation frames (Braille pattern).
pub const SPINNER: &[char] = &['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

/// How long an alert stays on screen.
pub const ALERT_TTL: Duration = Duration::from_secs(5);

const HELP_TEXT: &str =
    "/clear  /new  /rename <title>  /delete  /tour  /quit   Tab: next panel   Esc: quit";

// ─── Data types ──────────────────────────────────────────────

/// Panel receiving key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    ApiKey,
    Category,
    Model,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Success,
    Error,
}

/// Transient banner. `id` lets a dismiss timer tell whether it is still the
/// alert it was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: u64,
    pub kind: AlertKind,
    pub text: String,
}

/// Single-line editable text with a byte-offset cursor.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    pub text: String,
    pub cursor: usize,
}

impl TextField {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.text.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.take();
    }

    /// Shared editing keys. Returns whether the key was consumed.
    fn edit(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            _ => return false,
        }
        true
    }
}

/// Which controller drives the screen.
pub enum Surface {
    Demo(DemoController),
    Dashboard(DashboardController),
}

impl Surface {
    pub fn is_demo(&self) -> bool {
        match self {
            Surface::Demo(demo) => demo.is_demo(),
            Surface::Dashboard(dash) => dash.is_demo(),
        }
    }

    pub fn api_key(&self) -> &str {
        match self {
            Surface::Demo(demo) => demo.api_key(),
            Surface::Dashboard(dash) => dash.api_key(),
        }
    }

    pub fn is_key_valid(&self) -> bool {
        match self {
            Surface::Demo(demo) => demo.is_key_valid(),
            Surface::Dashboard(dash) => dash.is_key_valid(),
        }
    }

    fn active_id(&self) -> Option<SessionId> {
        match self {
            Surface::Demo(_) => None,
            Surface::Dashboard(dash) => dash.active_chat_id().cloned(),
        }
    }

    pub fn category(&self) -> Option<ModelCategory> {
        match self {
            Surface::Demo(demo) => Some(demo.category()),
            Surface::Dashboard(dash) => dash.active_chat().and_then(|c| c.category()),
        }
    }

    pub fn filtered_models(&self) -> Vec<&'static ModelDescriptor> {
        match self {
            Surface::Demo(demo) => demo.filtered_models(),
            Surface::Dashboard(dash) => dash
                .active_chat_id()
                .map(|id| dash.filtered_models(id))
                .unwrap_or_default(),
        }
    }

    pub fn selected_model(&self) -> Option<&'static ModelDescriptor> {
        match self {
            Surface::Demo(demo) => demo.selected_model(),
            Surface::Dashboard(dash) => dash.active_chat().and_then(|c| c.model()),
        }
    }

    /// Messages to draw, greeting included.
    pub fn transcript(&self) -> Vec<&ChatMessage> {
        match self {
            Surface::Demo(demo) => demo.messages().iter().collect(),
            Surface::Dashboard(dash) => dash
                .active_chat()
                .map(|c| c.transcript().collect())
                .unwrap_or_default(),
        }
    }

    pub fn is_locked(&self) -> bool {
        match self {
            Surface::Demo(_) => false,
            Surface::Dashboard(dash) => dash
                .active_chat()
                .is_some_and(|c| c.is_model_selection_locked()),
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            Surface::Demo(demo) => demo.is_loading(),
            Surface::Dashboard(dash) => dash.active_chat().is_some_and(|c| c.is_loading()),
        }
    }

    pub fn is_generating(&self) -> bool {
        match self {
            Surface::Demo(demo) => demo.is_generating(),
            Surface::Dashboard(dash) => dash.active_chat().is_some_and(|c| c.is_generating()),
        }
    }

    pub fn phase(&self) -> ChatPhase {
        match self {
            Surface::Demo(demo) => demo.phase(),
            Surface::Dashboard(dash) => match dash.active_chat_id() {
                Some(id) => dash.phase(id),
                None => ChatPhase::Idle,
            },
        }
    }
}

pub(crate) fn blocked_message(reason: SendBlocked) -> Option<&'static str> {
    match reason {
        SendBlocked::EmptyMessage => None,
        SendBlocked::KeyNotValidated => Some("Please enter and validate your API key first."),
        SendBlocked::NoModelSelected => Some("Please select a model first."),
        SendBlocked::RequestInFlight => Some("Please wait for the current response to finish."),
        SendBlocked::LoginRequired => Some(
            "You have used all free demo messages. Sign in with `genai auth login` to keep chatting.",
        ),
        SendBlocked::UnknownChat => Some("No active chat. Use /new to start one."),
    }
}

// ─── TuiApp ──────────────────────────────────────────────────

/// Full state for the TUI session.
pub struct TuiApp {
    pub surface: Surface,
    /// First-run walkthrough; demo only.
    pub tour: Option<TourGuide>,
    pub focus: Focus,
    pub key_field: TextField,
    pub input: TextField,
    pub model_cursor: usize,
    pub sidebar_cursor: usize,
    /// Vertical scroll offset for the transcript; clamped while rendering.
    pub history_scroll: u16,
    pub alert: Option<Alert>,
    alert_seq: u64,
    alert_timer: Option<u64>,
    outbox: Option<PendingSend>,
    /// Display name of the signed-in portal user.
    pub signed_in_as: Option<String>,
    pub spinner_tick: u8,
    pub should_quit: bool,
}

impl TuiApp {
    pub fn new(surface: Surface, tour: Option<TourGuide>, signed_in_as: Option<String>) -> Self {
        let mut surface = surface;
        if let Surface::Dashboard(dash) = &mut surface
            && dash.sessions().is_empty()
        {
            dash.create_new_chat();
        }
        if let (Surface::Demo(demo), Some(_)) = (&mut surface, &signed_in_as) {
            demo.set_authenticated(true);
        }
        let key_field = TextField::with_text(surface.api_key());
        let focus = if !surface.is_key_valid() {
            Focus::ApiKey
        } else if surface.selected_model().is_none() {
            Focus::Model
        } else {
            Focus::Input
        };
        Self {
            surface,
            tour,
            focus,
            key_field,
            input: TextField::default(),
            model_cursor: 0,
            sidebar_cursor: 0,
            history_scroll: u16::MAX,
            alert: None,
            alert_seq: 0,
            alert_timer: None,
            outbox: None,
            signed_in_as,
            spinner_tick: 0,
            should_quit: false,
        }
    }

    // ── Alerts ───────────────────────────────────────────────

    pub fn show_alert(&mut self, kind: AlertKind, text: impl Into<String>) {
        self.alert_seq += 1;
        self.alert = Some(Alert {
            id: self.alert_seq,
            kind,
            text: text.into(),
        });
        self.alert_timer = Some(self.alert_seq);
    }

    /// Id of an alert whose dismiss timer still has to be started.
    pub fn take_alert_timer(&mut self) -> Option<u64> {
        self.alert_timer.take()
    }

    /// Dismisses the alert if it is still the one with `id`.
    pub fn dismiss_alert(&mut self, id: u64) {
        if self.alert.as_ref().is_some_and(|a| a.id == id) {
            self.alert = None;
        }
    }

    // ── Sends ────────────────────────────────────────────────

    /// Request the event loop still has to dispatch.
    pub fn take_pending_send(&mut self) -> Option<PendingSend> {
        self.outbox.take()
    }

    pub fn mark_dispatched(&mut self, pending: &PendingSend) {
        match (&mut self.surface, &pending.chat) {
            (Surface::Demo(demo), _) => demo.mark_dispatched(pending.placeholder),
            (Surface::Dashboard(dash), Some(id)) => dash.mark_dispatched(id, pending.placeholder),
            (Surface::Dashboard(_), None) => {}
        }
    }

    /// Applies a proxy result to the conversation that asked for it.
    pub fn apply_reply(
        &mut self,
        chat: Option<SessionId>,
        placeholder: MessageId,
        result: Result<Value, InferenceError>,
    ) -> SendSettled {
        let settled = match (&mut self.surface, chat) {
            (Surface::Demo(demo), _) => demo.complete_send(placeholder, result),
            (Surface::Dashboard(dash), Some(id)) => dash.complete_send(&id, placeholder, result),
            (Surface::Dashboard(_), None) => SendSettled::Stale,
        };
        debug!(outcome = ?settled, "Reply applied");
        if settled == SendSettled::Failed {
            self.show_alert(AlertKind::Error, "The model could not respond. Please try again.");
        }
        self.scroll_to_bottom();
        settled
    }

    /// Spinner shown while a reply is outstanding or still "generating".
    pub fn is_busy(&self) -> bool {
        self.surface.is_loading() || self.surface.is_generating()
    }

    fn submit_input(&mut self) {
        // Messages go out as typed; only slash commands are trimmed.
        let message = self.input.text.clone();
        if message.trim_start().starts_with('/') {
            self.input.clear();
            self.handle_slash_command(message.trim());
            return;
        }
        let started = match &mut self.surface {
            Surface::Demo(demo) => {
                let result = demo.begin_send(&message);
                if demo.take_login_request() {
                    debug!("Demo send ceiling reached");
                }
                result
            }
            Surface::Dashboard(dash) => match dash.active_chat_id().cloned() {
                Some(id) => dash.begin_send(&id, &message),
                None => Err(SendBlocked::UnknownChat),
            },
        };
        match started {
            Ok(pending) => {
                self.input.clear();
                self.outbox = Some(pending);
                self.scroll_to_bottom();
            }
            Err(reason) => {
                if let Some(text) = blocked_message(reason) {
                    self.show_alert(AlertKind::Error, text);
                }
            }
        }
    }

    // ── Controls ─────────────────────────────────────────────

    fn submit_api_key(&mut self) {
        let typed = self.key_field.text.trim().to_string();
        let valid = match &mut self.surface {
            Surface::Demo(demo) => {
                demo.set_api_key(typed.clone());
                demo.validate_api_key(None)
            }
            Surface::Dashboard(dash) => {
                dash.set_api_key(typed.clone());
                dash.validate_api_key(None)
            }
        };
        if valid {
            self.show_alert(
                AlertKind::Success,
                "API key validated. Choose a category and a model to start chatting.",
            );
            self.advance_tour(0);
            self.focus = Focus::Category;
        } else {
            self.show_alert(
                AlertKind::Error,
                "Please enter a valid API key (more than 10 characters).",
            );
        }
    }

    fn forget_api_key(&mut self) {
        match &mut self.surface {
            Surface::Demo(demo) => demo.forget_api_key(),
            Surface::Dashboard(dash) => dash.forget_api_key(),
        }
        self.key_field.clear();
        self.show_alert(AlertKind::Info, "Stored API key removed.");
    }

    fn change_category(&mut self, forward: bool) {
        let target = match self.surface.category() {
            Some(current) if forward => current.next(),
            Some(current) => current.prev(),
            None => ModelCategory::default(),
        };
        if self.surface.is_locked() {
            self.show_locked_alert();
            return;
        }
        let changed = match &mut self.surface {
            Surface::Demo(demo) => demo.set_model_category(target),
            Surface::Dashboard(dash) => match dash.active_chat_id().cloned() {
                Some(id) => dash.set_model_category(&id, target).unwrap_or(false),
                None => false,
            },
        };
        if changed {
            self.model_cursor = 0;
            self.advance_tour(1);
        }
    }

    fn move_model_cursor(&mut self, down: bool) {
        let count = self.surface.filtered_models().len();
        if count == 0 {
            return;
        }
        self.model_cursor = if down {
            (self.model_cursor + 1) % count
        } else {
            (self.model_cursor + count - 1) % count
        };
    }

    fn select_model_at_cursor(&mut self) {
        if self.surface.is_locked() {
            self.show_locked_alert();
            return;
        }
        let models = self.surface.filtered_models();
        let Some(model) = models.get(self.model_cursor).copied() else {
            return;
        };
        let result = match &mut self.surface {
            Surface::Demo(demo) => demo.set_model(model.id),
            Surface::Dashboard(dash) => match dash.active_chat_id().cloned() {
                Some(id) => dash.set_model(&id, model.id),
                None => Ok(false),
            },
        };
        match result {
            Ok(_) => {
                self.advance_tour(2);
                self.focus = Focus::Input;
            }
            Err(e) => self.show_alert(AlertKind::Error, e.to_string()),
        }
    }

    fn show_locked_alert(&mut self) {
        self.show_alert(
            AlertKind::Info,
            "Model selection is locked once a chat has started. Use /new for another model.",
        );
    }

    /// Moves the tour forward when the user completes the step it describes.
    fn advance_tour(&mut self, completed_step: usize) {
        if let Some(tour) = &mut self.tour
            && tour.current().is_some_and(|(i, _)| i == completed_step)
        {
            tour.next();
        }
    }

    // ── Sidebar ──────────────────────────────────────────────

    fn sidebar_ids(&self) -> Vec<SessionId> {
        match &self.surface {
            Surface::Dashboard(dash) => dash.sessions().iter().map(|c| c.id().clone()).collect(),
            Surface::Demo(_) => Vec::new(),
        }
    }

    fn select_chat_at_cursor(&mut self) {
        let ids = self.sidebar_ids();
        if let (Surface::Dashboard(dash), Some(id)) = (&mut self.surface, ids.get(self.sidebar_cursor))
            && dash.select_chat(id).is_ok()
        {
            self.model_cursor = 0;
            self.scroll_to_bottom();
        }
    }

    fn sync_sidebar_cursor(&mut self) {
        let ids = self.sidebar_ids();
        let active = self.surface.active_id();
        self.sidebar_cursor = active
            .and_then(|a| ids.iter().position(|id| *id == a))
            .unwrap_or(0);
    }

    // ── Slash commands ───────────────────────────────────────

    /// Runs a `/command`. Returns `false` when `raw` is not one.
    pub fn handle_slash_command(&mut self, raw: &str) -> bool {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return false;
        }
        let (command, arg) = raw
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((raw, ""));
        debug!(command = %command, "Slash command dispatched");

        match command {
            "/clear" => {
                match &mut self.surface {
                    Surface::Demo(demo) => demo.clear_chat(),
                    Surface::Dashboard(dash) => {
                        if let Some(id) = dash.active_chat_id().cloned() {
                            let _ = dash.clear_chat(&id);
                        }
                    }
                }
                self.show_alert(AlertKind::Info, "Chat cleared.");
            }
            "/new" => match &mut self.surface {
                Surface::Dashboard(dash) => {
                    dash.create_new_chat();
                    self.model_cursor = 0;
                    self.sync_sidebar_cursor();
                    self.focus = Focus::Category;
                }
                Surface::Demo(_) => self.dashboard_only(command),
            },
            "/rename" => match &mut self.surface {
                Surface::Dashboard(dash) => {
                    if arg.is_empty() {
                        self.show_alert(AlertKind::Error, "Usage: /rename <title>");
                    } else if let Some(id) = dash.active_chat_id().cloned() {
                        let _ = dash.rename_chat(&id, arg);
                    }
                }
                Surface::Demo(_) => self.dashboard_only(command),
            },
            "/delete" => match &mut self.surface {
                Surface::Dashboard(dash) => {
                    if let Some(id) = dash.active_chat_id().cloned() {
                        let _ = dash.delete_chat(&id);
                    }
                    if dash.sessions().is_empty() {
                        dash.create_new_chat();
                    }
                    self.model_cursor = 0;
                    self.sync_sidebar_cursor();
                }
                Surface::Demo(_) => self.dashboard_only(command),
            },
            "/tour" => match &mut self.tour {
                Some(tour) => tour.restart(),
                None => self.show_alert(AlertKind::Info, "The tour is only available in the demo."),
            },
            "/help" => self.show_alert(AlertKind::Info, HELP_TEXT),
            "/quit" | "/exit" => self.should_quit = true,
            other => self.show_alert(
                AlertKind::Error,
                format!("Unknown command: {other}. Type /help for commands."),
            ),
        }
        self.scroll_to_bottom();
        true
    }

    fn dashboard_only(&mut self, command: &str) {
        self.show_alert(
            AlertKind::Info,
            format!("{command} is only available in the dashboard (`genai dashboard`)."),
        );
    }

    // ── Input handling ───────────────────────────────────────

    fn focus_order(&self) -> &'static [Focus] {
        if self.surface.is_demo() {
            &[Focus::ApiKey, Focus::Category, Focus::Model, Focus::Input]
        } else {
            &[
                Focus::Sidebar,
                Focus::ApiKey,
                Focus::Category,
                Focus::Model,
                Focus::Input,
            ]
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let index = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (index + 1) % order.len()
        } else {
            (index + order.len() - 1) % order.len()
        };
        self.focus = order[next];
        if self.focus == Focus::Model
            && let Some(selected) = self.surface.selected_model()
        {
            self.model_cursor = self
                .surface
                .filtered_models()
                .iter()
                .position(|m| m.id == selected.id)
                .unwrap_or(0);
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.history_scroll = u16::MAX;
    }

    /// Handle a keyboard event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                self.should_quit = true;
                return;
            }
            (_, KeyCode::Esc) => {
                if let Some(tour) = self.tour.as_mut().filter(|t| t.is_open()) {
                    tour.close();
                } else if self.alert.is_some() {
                    self.alert = None;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            (_, KeyCode::F(2)) => {
                if let Some(tour) = &mut self.tour {
                    tour.next();
                }
                return;
            }
            (_, KeyCode::F(1)) => {
                if let Some(tour) = &mut self.tour {
                    tour.prev();
                }
                return;
            }
            (_, KeyCode::Tab) => {
                self.cycle_focus(true);
                return;
            }
            (_, KeyCode::BackTab) => {
                self.cycle_focus(false);
                return;
            }
            (_, KeyCode::PageUp) => {
                self.history_scroll = self.history_scroll.saturating_sub(10);
                return;
            }
            (_, KeyCode::PageDown) => {
                self.history_scroll = self.history_scroll.saturating_add(10);
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::ApiKey => match (key.modifiers, key.code) {
                (_, KeyCode::Enter) => self.submit_api_key(),
                (KeyModifiers::CONTROL, KeyCode::Char('d')) => self.forget_api_key(),
                _ => {
                    self.key_field.edit(key);
                }
            },
            Focus::Category => match key.code {
                KeyCode::Left | KeyCode::Up => self.change_category(false),
                KeyCode::Right | KeyCode::Down | KeyCode::Enter => self.change_category(true),
                _ => {}
            },
            Focus::Model => match key.code {
                KeyCode::Up => self.move_model_cursor(false),
                KeyCode::Down => self.move_model_cursor(true),
                KeyCode::Enter => self.select_model_at_cursor(),
                _ => {}
            },
            Focus::Input => match key.code {
                KeyCode::Enter => self.submit_input(),
                KeyCode::Up => self.history_scroll = self.history_scroll.saturating_sub(1),
                KeyCode::Down => self.history_scroll = self.history_scroll.saturating_add(1),
                _ => {
                    self.input.edit(key);
                }
            },
            Focus::Sidebar => {
                let count = self.sidebar_ids().len();
                match key.code {
                    KeyCode::Up if count > 0 => {
                        self.sidebar_cursor = (self.sidebar_cursor + count - 1) % count;
                    }
                    KeyCode::Down if count > 0 => {
                        self.sidebar_cursor = (self.sidebar_cursor + 1) % count;
                    }
                    KeyCode::Enter => self.select_chat_at_cursor(),
                    KeyCode::Char('n') => {
                        self.handle_slash_command("/new");
                        self.focus = Focus::Sidebar;
                    }
                    KeyCode::Char('d') | KeyCode::Delete => {
                        self.select_chat_at_cursor();
                        self.handle_slash_command("/delete");
                    }
                    _ => {}
                }
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────

    /// Render the entire TUI into the given frame.
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let alert_height = u16::from(self.alert.is_some());
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(alert_height),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_title(frame, rows[0]);

        let body = if self.surface.is_demo() {
            Layout::horizontal([Constraint::Length(0), Constraint::Length(38), Constraint::Min(0)])
                .split(rows[1])
        } else {
            Layout::horizontal([
                Constraint::Length(sidebar::sidebar_width()),
                Constraint::Length(38),
                Constraint::Min(0),
            ])
            .split(rows[1])
        };
        if !self.surface.is_demo() {
            sidebar::render(self, frame, body[0]);
        }
        controls::render(self, frame, body[1]);
        chat::render(self, frame, body[2]);

        self.render_alert(frame, rows[2]);
        self.render_input(frame, rows[3]);
        self.render_status(frame, rows[4]);
        self.render_tour(frame, area);
    }

    fn render_title(&self, frame: &mut Frame<'_>, area: Rect) {
        let mode = if self.surface.is_demo() { "demo" } else { "dashboard" };
        let mut spans = vec![
            Span::styled(
                " genai ",
                Style::default()
                    .fg(THEME.accent_bright)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {mode} "), Style::default().fg(THEME.fg_dim)),
        ];
        if let Some(model) = self.surface.selected_model() {
            spans.push(Span::styled(
                format!(" {} ", model.name),
                Style::default().fg(THEME.success),
            ));
        }
        if let Surface::Demo(demo) = &self.surface
            && let Some(left) = demo.remaining_free_messages()
        {
            spans.push(Span::styled(
                format!(" free messages left: {left} "),
                Style::default().fg(if left == 0 { THEME.warning } else { THEME.fg_muted }),
            ));
        }
        if let Some(name) = &self.signed_in_as {
            spans.push(Span::styled(
                format!(" signed in as {name} "),
                Style::default().fg(THEME.info),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_alert(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some(alert) = &self.alert else {
            return;
        };
        let (icon, color) = match alert.kind {
            AlertKind::Info => ("ℹ", THEME.info),
            AlertKind::Success => ("✓", THEME.success),
            AlertKind::Error => ("✗", THEME.error),
        };
        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(alert.text.as_str(), Style::default().fg(color)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_input(&self, frame: &mut Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Input;
        let placeholder = if self.surface.is_key_valid() {
            "Type your message..."
        } else {
            "Enter API key to start..."
        };
        let text = if self.input.text.is_empty() && !focused {
            Line::from(Span::styled(placeholder, Style::default().fg(THEME.fg_muted)))
        } else {
            Line::from(self.input.text.as_str())
        };
        let border = if focused { THEME.border_focused } else { THEME.border };
        let widget = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" Message "),
        );
        frame.render_widget(widget, area);
        if focused {
            let prefix = &self.input.text[..self.input.cursor];
            let col = unicode_width::UnicodeWidthStr::width(prefix) as u16;
            frame.set_cursor_position((area.x + 1 + col.min(area.width.saturating_sub(3)), area.y + 1));
        }
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let spinner = SPINNER[(self.spinner_tick as usize) % SPINNER.len()];
        let line = if self.surface.is_loading() {
            Line::from(Span::styled(
                format!(" {spinner} Waiting for the model..."),
                Style::default().fg(THEME.pending),
            ))
        } else if self.surface.is_generating() {
            Line::from(Span::styled(
                format!(" {spinner} Generating..."),
                Style::default().fg(THEME.pending),
            ))
        } else {
            let hint = match self.focus {
                Focus::ApiKey => " Enter:validate  Ctrl+D:forget key  Tab:next  Esc:quit",
                Focus::Category => " ←/→:change category  Tab:next  Esc:quit",
                Focus::Model => " ↑/↓:browse  Enter:select  Tab:next  Esc:quit",
                Focus::Input => " Enter:send  /help:commands  PgUp/PgDn:scroll  Esc:quit",
                Focus::Sidebar => " ↑/↓:browse  Enter:open  n:new  d:delete  Tab:next",
            };
            Line::from(Span::styled(hint, Style::default().fg(THEME.fg_muted)))
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_tour(&self, frame: &mut Frame<'_>, area: Rect) {
        let Some((index, step)) = self.tour.as_ref().and_then(TourGuide::current) else {
            return;
        };
        let width = area.width.min(56);
        let height = 7.min(area.height);
        let popup = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        };
        let lines = vec![
            Line::from(Span::styled(
                step.title,
                Style::default()
                    .fg(THEME.tour_title)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(step.body),
            Line::from(Span::styled(
                format!("Step {} of {}   F2:next  F1:back  Esc:skip", index + 1, TOUR_STEPS.len()),
                Style::default().fg(THEME.fg_muted),
            )),
        ];
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(THEME.tour_border))
                    .title(" Tour "),
            ),
            popup,
        );
    }
}

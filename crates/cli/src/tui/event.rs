//! Async event loop for the TUI: interleaves crossterm input, inference replies and alert timers.

use std::sync::Arc;

use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use inference::InferenceBackend;
use proto::{InferenceError, MessageId, SessionId};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde_json::Value;
use session::TaskScope;
use tokio::sync::mpsc;
use tracing::debug;

use super::app::{ALERT_TTL, TuiApp};

/// Work finished in the background, delivered back to the loop.
#[derive(Debug)]
pub enum UiEvent {
    Reply {
        chat: Option<SessionId>,
        placeholder: MessageId,
        result: Result<Value, InferenceError>,
    },
    DismissAlert(u64),
}

/// RAII guard that restores the terminal on drop (even on panic).
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}

/// Starts whatever the last state change asked for: at most one inference
/// request and one alert timer.
fn dispatch(
    app: &mut TuiApp,
    backend: &Arc<dyn InferenceBackend>,
    scope: &mut TaskScope,
    tx: &mpsc::UnboundedSender<UiEvent>,
) {
    if let Some(pending) = app.take_pending_send() {
        app.mark_dispatched(&pending);
        debug!(placeholder = %pending.placeholder, "Dispatching inference request");
        let backend = Arc::clone(backend);
        let tx = tx.clone();
        scope.spawn(async move {
            let result = backend.infer(pending.request).await;
            let _ = tx.send(UiEvent::Reply {
                chat: pending.chat,
                placeholder: pending.placeholder,
                result,
            });
        });
    }
    if let Some(id) = app.take_alert_timer() {
        let tx = tx.clone();
        scope.spawn_after(ALERT_TTL, move || {
            let _ = tx.send(UiEvent::DismissAlert(id));
        });
    }
}

fn apply(app: &mut TuiApp, event: UiEvent) {
    match event {
        UiEvent::Reply {
            chat,
            placeholder,
            result,
        } => {
            app.apply_reply(chat, placeholder, result);
        }
        UiEvent::DismissAlert(id) => app.dismiss_alert(id),
    }
}

/// Run the full-screen TUI until the user quits.
pub async fn run_tui(mut app: TuiApp, backend: Arc<dyn InferenceBackend>) -> anyhow::Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let _guard = TerminalGuard; // Drop restores terminal

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    debug!(demo = %app.surface.is_demo(), "TUI started");

    let mut crossterm_stream = EventStream::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<UiEvent>();
    // Dropped on exit, which aborts outstanding requests and timers.
    let mut scope = TaskScope::new();

    // Spinner tick interval (100ms)
    let mut spinner_interval = tokio::time::interval(std::time::Duration::from_millis(100));
    spinner_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        tokio::select! {
            maybe_event = crossterm_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(error = %e, "Terminal event error");
                    }
                    None => break,
                }
            }

            Some(event) = rx.recv() => {
                apply(&mut app, event);
            }

            _ = spinner_interval.tick(), if app.is_busy() => {
                app.spinner_tick = app.spinner_tick.wrapping_add(1);
            }
        }

        dispatch(&mut app, &backend, &mut scope, &tx);

        if app.should_quit {
            break;
        }
    }

    scope.cancel_all();
    debug!("TUI exited");
    // TerminalGuard::drop handles cleanup
    Ok(())
}

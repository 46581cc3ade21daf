//! Full-screen ratatui interface for the demo and the dashboard.

pub mod app;
mod chat;
mod controls;
pub mod event;
mod sidebar;
mod theme;

pub use event::run_tui;

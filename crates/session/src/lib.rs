//! Chat session state for the demo and dashboard surfaces.
//!
//! The controllers here own every collection they touch. Network calls are
//! made by the caller with the [`PendingSend`] a controller hands out, and the
//! result is fed back through `complete_send`. `send_message` does all three
//! steps in one call.

pub mod conversation;
pub mod dashboard;
pub mod demo;
pub mod key_store;
pub mod storage;
pub mod timers;
pub mod tour;

use std::time::Duration;

use inference::GenerationParams;

pub use conversation::{
    ChatPhase, Conversation, PendingSend, SERVER_BUSY_MESSAGE, SendBlocked, SendSettled,
    is_plausible_api_key, welcome_text,
};
pub use dashboard::{ChatSession, DashboardController, NEW_CHAT_TITLE};
pub use demo::DemoController;
pub use key_store::{API_KEY_STORAGE_KEY, ApiKeyStore};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
pub use timers::TaskScope;
pub use tour::{TOUR_SEEN_STORAGE_KEY, TOUR_STEPS, TourGuide, TourStep};

/// Free demo sends before login is required.
pub const DEFAULT_DEMO_MESSAGE_LIMIT: usize = 3;
/// How long "generating" stays up after a reply lands.
pub const DEFAULT_GENERATION_DELAY: Duration = Duration::from_millis(1500);

/// Tunables shared by both controllers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatSettings {
    pub demo_message_limit: usize,
    pub generation_delay: Duration,
    pub params: GenerationParams,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            demo_message_limit: DEFAULT_DEMO_MESSAGE_LIMIT,
            generation_delay: DEFAULT_GENERATION_DELAY,
            params: GenerationParams::default(),
        }
    }
}

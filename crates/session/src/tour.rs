//! First-run walkthrough of the demo controls.

use std::sync::Arc;

use tracing::warn;

use crate::storage::LocalStorage;

/// Storage key marking the walkthrough as seen.
pub const TOUR_SEEN_STORAGE_KEY: &str = "genai-demo-tour-seen";

/// One walkthrough step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourStep {
    pub title: &'static str,
    pub body: &'static str,
}

pub const TOUR_STEPS: [TourStep; 3] = [
    TourStep {
        title: "Enter your API key",
        body: "Paste your Hugging Face API key and press Enter to validate it. The key is stored on this machine only.",
    },
    TourStep {
        title: "Choose a category",
        body: "Pick conversation, creative writing or sentiment analysis. Each category has its own models.",
    },
    TourStep {
        title: "Select a model",
        body: "Choose a model from the list, then type a message and press Enter to chat.",
    },
];

/// Walkthrough position; `None` once closed.
pub struct TourGuide {
    storage: Arc<dyn LocalStorage>,
    step: Option<usize>,
}

impl TourGuide {
    /// Opens at the first step unless the tour was already seen.
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        let seen = match storage.get_item(TOUR_SEEN_STORAGE_KEY) {
            Ok(value) => value.is_some(),
            Err(e) => {
                warn!(error = %e, "Tour state unreadable, showing tour");
                false
            }
        };
        Self {
            storage,
            step: (!seen).then_some(0),
        }
    }

    pub fn current(&self) -> Option<(usize, TourStep)> {
        self.step.map(|i| (i, TOUR_STEPS[i]))
    }

    pub fn is_open(&self) -> bool {
        self.step.is_some()
    }

    /// Advances; moving past the last step closes the tour.
    pub fn next(&mut self) {
        match self.step {
            Some(i) if i + 1 < TOUR_STEPS.len() => self.step = Some(i + 1),
            Some(_) => self.close(),
            None => {}
        }
    }

    pub fn prev(&mut self) {
        if let Some(i) = self.step {
            self.step = Some(i.saturating_sub(1));
        }
    }

    /// Closes the tour and remembers that it was seen.
    pub fn close(&mut self) {
        self.step = None;
        if let Err(e) = self.storage.set_item(TOUR_SEEN_STORAGE_KEY, "true") {
            warn!(error = %e, "Could not persist tour state");
        }
    }

    /// Reopens at the first step.
    pub fn restart(&mut self) {
        self.step = Some(0);
    }
}

use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

use crate::alarm::model::PopupContent;
use crate::alarm::settings::PopupStyle;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PopupPhase {
    Hidden,
    Visible,
    Terminated,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DismissReason {
    Click,
    Escape,
    DismissShortcut,
    WindowClosed,
}

/// Text and lifecycle of the ring popup, independent of the GUI toolkit.
#[derive(Debug)]
pub struct PopupState {
    phase: PopupPhase,
    content: PopupContent,
    text: String,
    refresh_interval: Option<Duration>,
    next_refresh: Option<Instant>,
    dismissed_by: Option<DismissReason>,
}

impl PopupState {
    pub fn new(content: PopupContent, style: PopupStyle, refresh_interval: Duration) -> Self {
        let refresh_interval = match style {
            PopupStyle::Clock if content.is_clock() => Some(refresh_interval),
            _ => None,
        };
        Self {
            phase: PopupPhase::Hidden,
            content,
            text: String::new(),
            refresh_interval,
            next_refresh: None,
            dismissed_by: None,
        }
    }

    pub fn open(&mut self, at: Instant, now: NaiveDateTime) {
        if self.phase != PopupPhase::Hidden {
            return;
        }
        self.text = self.content.render(now);
        self.next_refresh = self.refresh_interval.map(|interval| at + interval);
        self.phase = PopupPhase::Visible;
    }

    /// Re-renders the clock text once the refresh deadline has passed and
    /// re-arms the deadline. Returns whether the text was refreshed.
    pub fn tick(&mut self, at: Instant, now: NaiveDateTime) -> bool {
        if self.phase != PopupPhase::Visible {
            return false;
        }
        let (Some(interval), Some(due)) = (self.refresh_interval, self.next_refresh) else {
            return false;
        };
        if at < due {
            return false;
        }
        self.text = self.content.render(now);
        self.next_refresh = Some(at + interval);
        log::debug!("popup refreshed: {}", self.text);
        true
    }

    pub fn until_next_refresh(&self, at: Instant) -> Option<Duration> {
        if self.phase != PopupPhase::Visible {
            return None;
        }
        self.next_refresh
            .map(|due| due.saturating_duration_since(at))
    }

    pub fn dismiss(&mut self, reason: DismissReason) {
        if self.phase == PopupPhase::Terminated {
            return;
        }
        log::info!("popup dismissed: {reason:?}");
        self.phase = PopupPhase::Terminated;
        self.next_refresh = None;
        self.dismissed_by = Some(reason);
    }

    pub fn phase(&self) -> PopupPhase {
        self.phase
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dismissed_by(&self) -> Option<DismissReason> {
        self.dismissed_by
    }

    pub fn refreshes(&self) -> bool {
        self.refresh_interval.is_some()
    }
}

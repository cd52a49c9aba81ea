use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

use crate::config::AppConfig;
use crate::timer::{Countdown, Scheduler, TickHandle, TickOutcome};

/// Status messages clear after this many seconds
const STATUS_TIMEOUT_SECS: u64 = 3;

/// Focusable controls, in Tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Set,
    Start,
    Pause,
    Reset,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Input => Focus::Set,
            Focus::Set => Focus::Start,
            Focus::Start => Focus::Pause,
            Focus::Pause => Focus::Reset,
            Focus::Reset => Focus::Input,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Input => Focus::Reset,
            Focus::Set => Focus::Input,
            Focus::Start => Focus::Set,
            Focus::Pause => Focus::Start,
            Focus::Reset => Focus::Pause,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App<S: Scheduler> {
    pub countdown: Countdown<S>,
    pub focus: Focus,
    pub popup: Popup,

    // Raw text of the duration field
    pub input_buffer: String,

    // Status message (shown in status line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    notifications: bool,
}

impl<S: Scheduler> App<S> {
    pub fn new(config: &AppConfig, scheduler: S) -> Self {
        let mut app = Self {
            countdown: Countdown::new(scheduler),
            focus: Focus::Input,
            popup: Popup::None,
            input_buffer: String::new(),
            status_message: None,
            status_message_time: None,
            notifications: config.notifications,
        };

        if let Some(secs) = config.default_duration {
            app.commit_initial_duration(secs);
        }

        app
    }

    /// Pre-fill the input with `secs` and commit it, as if typed and Set
    pub fn commit_initial_duration(&mut self, secs: u64) -> bool {
        self.input_buffer = secs.to_string();
        self.countdown.set_duration_input(&self.input_buffer);
        let committed = self.countdown.set_duration();
        if committed {
            self.focus = Focus::Start;
        }
        committed
    }

    /// Whether keystrokes currently go into the duration field
    pub fn is_editing(&self) -> bool {
        self.popup == Popup::None && self.focus == Focus::Input
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup != Popup::None {
            self.handle_popup_key(key);
            return;
        }

        match key.code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            _ if self.focus == Focus::Input => self.handle_input_key(key),
            _ => self.handle_control_key(key),
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Enter | KeyCode::Char('q')
        ) {
            self.popup = Popup::None;
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.activate(Focus::Set),
            KeyCode::Esc => self.focus = Focus::Set,
            KeyCode::Backspace => {
                if self.input_buffer.pop().is_some() {
                    self.countdown.set_duration_input(&self.input_buffer);
                }
            }
            KeyCode::Char(c)
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.input_buffer.push(c);
                self.countdown.set_duration_input(&self.input_buffer);
            }
            _ => {}
        }
    }

    fn handle_control_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(self.focus),

            // Horizontal navigation between buttons
            KeyCode::Right => {
                if self.focus != Focus::Reset {
                    self.focus = self.focus.next();
                }
            }
            KeyCode::Left => {
                if self.focus != Focus::Set {
                    self.focus = self.focus.prev();
                }
            }

            // Shortcuts
            KeyCode::Char('s') => self.activate(Focus::Start),
            KeyCode::Char('p') => self.activate(Focus::Pause),
            KeyCode::Char('r') => self.activate(Focus::Reset),
            KeyCode::Char('i') | KeyCode::Char('e') => self.focus = Focus::Input,

            // Help (? or h)
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
    }

    /// Press a control
    pub fn activate(&mut self, control: Focus) {
        match control {
            Focus::Input => self.focus = Focus::Input,
            Focus::Set => {
                // Invalid input is rejected silently
                self.countdown.set_duration();
            }
            Focus::Start => {
                self.countdown.start();
            }
            Focus::Pause => {
                self.countdown.pause();
            }
            Focus::Reset => self.countdown.reset(),
        }
    }

    /// Apply a tick delivered by the scheduler
    pub fn on_tick(&mut self, handle: TickHandle) {
        match self.countdown.on_tick(handle) {
            TickOutcome::Finished => {
                self.set_status("Time's up!");
                if self.notifications {
                    notify("kaunto", "Time's up!");
                }
            }
            TickOutcome::Stale => tracing::trace!(?handle, "ignored stale tick"),
            TickOutcome::Decremented(left) => tracing::trace!(left, "tick"),
        }
    }

    /// Periodic housekeeping, called once per loop iteration
    pub fn tick(&mut self) {
        // Clear status message after timeout
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_TIMEOUT_SECS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

fn notify(summary: &str, body: &str) {
    let result = notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("alarm-symbolic")
        .show();
    if let Err(e) = result {
        tracing::warn!("Failed to send notification: {}", e);
    }
}

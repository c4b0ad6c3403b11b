use std::fmt;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;
use crate::api::Gateway;
use crate::commands::Command;
use crate::core::RetryPolicy;
use crate::ui::{EventResult, Keybinding};

pub enum PageMsg {
    /// No action needed
    Idle,
    /// Run one or more commands
    Run(Vec<Box<dyn Command>>),
}

impl<T: Command> From<T> for PageMsg {
    fn from(value: T) -> Self {
        Self::Run(vec![Box::new(value)])
    }
}

/// Shared dependencies handed to every page when it is built.
#[derive(Clone)]
pub struct PageContext {
    pub gateway: Arc<dyn Gateway>,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Home,
    Dashboard,
    Comments,
}

impl PageId {
    pub const ALL: [Self; 3] = [Self::Home, Self::Dashboard, Self::Comments];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Dashboard => "Dashboard",
            Self::Comments => "Comments",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Home => Self::Dashboard,
            Self::Dashboard => Self::Comments,
            Self::Comments => Self::Home,
        }
    }

    /// Page for a number key, `1` being the first page.
    pub const fn from_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Home),
            '2' => Some(Self::Dashboard),
            '3' => Some(Self::Comments),
            _ => None,
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A full-screen page.
///
/// Pages manage their own internal state and message queue. The App calls
/// methods in this order:
///
/// 1. `init()` - once when the page becomes active
/// 2. `update()` - immediately after init to process startup messages
/// 3. For each event:
///    - `handle_tick()` then `update()` on tick events
///    - `handle_key()` on key events, then `update()` if consumed
/// 4. When a command completes: `update()`
/// 5. `destroy()` - when the user switches away; the page is dropped after
pub trait Page {
    /// Initialize the page by queuing startup message(s).
    fn init(&mut self) {}

    /// Clean up when the page is closing.
    fn destroy(&mut self) {}

    /// Handle a tick event for animations.
    fn handle_tick(&mut self) {}

    /// Handle a key event.
    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()>;

    /// Handle bracketed paste. Only pages with an open input use it.
    fn handle_paste(&mut self, text: &str) {
        _ = text;
    }

    /// Process all queued messages and return the result.
    ///
    /// # Errors
    /// Returns an error if message processing fails. The App displays it and
    /// keeps the page running.
    fn update(&mut self) -> Result<PageMsg>;

    /// Render the page to the frame.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Whether the page is capturing text, so global keys must not fire.
    fn is_editing(&self) -> bool {
        false
    }

    /// Returns the keybindings for the current state of this page.
    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}

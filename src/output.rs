//! Output banners
//!
//! An [`Output`] is the element a paginator or form writes its error
//! and success messages into. It carries the message text and a display
//! state, the same two things a `<p class="output">` carries in a page.
//! Handles are cheap to clone and share the underlying banner.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Display state of an output banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    /// No explicit display set; the banner is visible-capable but untouched
    #[default]
    Default,
    /// Explicitly shown
    Block,
    /// Explicitly hidden
    None,
}

#[derive(Debug, Default)]
struct Banner {
    text: String,
    display: Display,
}

/// A shared message banner
#[derive(Clone, Default)]
pub struct Output {
    inner: Arc<Mutex<Banner>>,
}

impl Output {
    /// Create an empty banner with default display
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hidden banner
    pub fn hidden() -> Self {
        let output = Self::new();
        output.hide();
        output
    }

    fn banner(&self) -> MutexGuard<'_, Banner> {
        // A poisoned banner still holds a usable string.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Replace the text and make the banner visible
    pub fn show(&self, message: impl Into<String>) {
        let mut banner = self.banner();
        banner.text = message.into();
        banner.display = Display::Block;
    }

    /// Hide the banner, keeping its text
    pub fn hide(&self) {
        self.banner().display = Display::None;
    }

    /// Reset the display state to its default
    pub fn reset_display(&self) {
        self.banner().display = Display::Default;
    }

    /// Current text
    pub fn text(&self) -> String {
        self.banner().text.clone()
    }

    /// Current display state
    pub fn display(&self) -> Display {
        self.banner().display
    }

    /// Whether the banner has been explicitly shown
    pub fn is_visible(&self) -> bool {
        self.display() == Display::Block
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let banner = self.banner();
        f.debug_struct("Output")
            .field("text", &banner.text)
            .field("display", &banner.display)
            .finish()
    }
}

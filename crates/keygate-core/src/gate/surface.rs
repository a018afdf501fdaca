//! Visual surfaces and the presentation seam.
//!
//! The gate addresses surfaces by kind only. Window handles live in a
//! [`SurfaceRegistry`] owned by the presentation layer.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

/// One of the mutually exclusive visible surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Login,
    Main,
}

impl Surface {
    pub const ALL: [Surface; 2] = [Surface::Login, Surface::Main];

    pub fn title(&self) -> &'static str {
        match self {
            Surface::Login => "Sign in",
            Surface::Main => "Keygate",
        }
    }
}

/// What the gate needs from the windowing system.
///
/// `show` and `close` are idempotent: showing a visible surface or closing
/// a closed one does nothing beyond focusing.
pub trait Presentation: Send + Sync {
    fn show(&self, surface: Surface);

    fn close(&self, surface: Surface);

    fn is_visible(&self, surface: Surface) -> bool;

    fn any_visible(&self) -> bool {
        Surface::ALL.iter().any(|s| self.is_visible(*s))
    }
}

/// A platform window backing one surface.
pub trait SurfaceWindow: Send {
    fn open(surface: Surface) -> Self
    where
        Self: Sized;

    /// Bring an already open window to the front.
    fn focus(&self) {}

    fn close(self);
}

/// Open windows keyed by surface kind.
pub struct SurfaceRegistry<W: SurfaceWindow> {
    windows: Mutex<HashMap<Surface, W>>,
}

impl<W: SurfaceWindow> SurfaceRegistry<W> {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn windows(&self) -> std::sync::MutexGuard<'_, HashMap<Surface, W>> {
        // A panic while holding the lock leaves the map itself consistent
        self.windows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: SurfaceWindow> Default for SurfaceRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: SurfaceWindow> Presentation for SurfaceRegistry<W> {
    fn show(&self, surface: Surface) {
        let mut windows = self.windows();
        match windows.get(&surface) {
            Some(window) => window.focus(),
            None => {
                debug!(?surface, "Opening surface");
                windows.insert(surface, W::open(surface));
            }
        }
    }

    fn close(&self, surface: Surface) {
        let window = self.windows().remove(&surface);
        if let Some(window) = window {
            debug!(?surface, "Closing surface");
            window.close();
        }
    }

    fn is_visible(&self, surface: Surface) -> bool {
        self.windows().contains_key(&surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    thread_local! {
        static OPENED: Cell<usize> = const { Cell::new(0) };
    }

    struct CountingWindow;

    impl SurfaceWindow for CountingWindow {
        fn open(_surface: Surface) -> Self {
            OPENED.with(|n| n.set(n.get() + 1));
            CountingWindow
        }

        fn close(self) {}
    }

    #[test]
    fn test_show_is_idempotent() {
        let registry = SurfaceRegistry::<CountingWindow>::new();
        let before = OPENED.with(Cell::get);

        registry.show(Surface::Login);
        registry.show(Surface::Login);

        assert_eq!(OPENED.with(Cell::get) - before, 1);
        assert!(registry.is_visible(Surface::Login));
        assert!(!registry.is_visible(Surface::Main));
    }

    #[test]
    fn test_close_is_idempotent() {
        let registry = SurfaceRegistry::<CountingWindow>::new();
        registry.show(Surface::Main);
        registry.close(Surface::Main);
        registry.close(Surface::Main);
        assert!(!registry.any_visible());
    }

    #[test]
    fn test_empty_registry_shows_nothing() {
        let registry = SurfaceRegistry::<CountingWindow>::default();
        assert!(!registry.any_visible());
    }
}

//! Adapters for running a session without a browser (native binary, tests)

use crate::sim::gate::{LockError, PointerCapture, PresentationPort};

/// What the overlay currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayView {
    #[default]
    Instructions,
    Paused,
    Hidden,
}

/// Overlay that only remembers its state
#[derive(Debug, Default)]
pub struct HeadlessOverlay {
    pub view: OverlayView,
}

impl PresentationPort for HeadlessOverlay {
    fn show_instructions(&mut self) {
        self.view = OverlayView::Instructions;
    }

    fn show_paused(&mut self) {
        self.view = OverlayView::Paused;
    }

    fn hide_overlay(&mut self) {
        self.view = OverlayView::Hidden;
    }
}

/// Pointer capture that always succeeds. Like the browser, the outcome is
/// reported later: the driver polls [`InstantLock::take_event`] and forwards
/// it to the session.
#[derive(Debug, Default)]
pub struct InstantLock {
    locked: bool,
    event: Option<bool>,
}

impl InstantLock {
    /// `Some(true)` for a pending lock-acquired event, `Some(false)` for lock-lost
    pub fn take_event(&mut self) -> Option<bool> {
        self.event.take()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl PointerCapture for InstantLock {
    fn request_lock(&mut self) -> Result<(), LockError> {
        if !self.locked {
            self.locked = true;
            self.event = Some(true);
        }
        Ok(())
    }

    fn release_lock(&mut self) {
        if self.locked {
            self.locked = false;
            self.event = Some(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::gate::PauseGate;

    #[test]
    fn test_lock_roundtrip_through_gate() {
        let mut gate = PauseGate::new();
        let mut overlay = HeadlessOverlay::default();
        let mut lock = InstantLock::default();

        gate.mount(&mut overlay);
        gate.overlay_clicked(&mut overlay, &mut lock);
        assert_eq!(lock.take_event(), Some(true));
        gate.lock_acquired(&mut overlay);
        assert_eq!(overlay.view, OverlayView::Hidden);

        gate.toggle_pause(&mut overlay, &mut lock);
        assert_eq!(lock.take_event(), Some(false));
        gate.lock_lost(&mut overlay);
        assert_eq!(overlay.view, OverlayView::Paused);
        assert!(!lock.is_locked());
    }
}

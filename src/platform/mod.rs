//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time: frame deltas and the coarse 1 Hz tick (`time`)
//! - Overlay visibility and pointer lock (`dom` on web, `headless` elsewhere)

pub mod headless;
pub mod time;

#[cfg(target_arch = "wasm32")]
pub mod dom;

use thiserror::Error;

pub use headless::{HeadlessOverlay, InstantLock, OverlayView};
pub use time::{CoarseTicker, FrameClock};

/// Browser environment problems found while mounting
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("missing DOM element #{0}")]
    MissingElement(String),
}

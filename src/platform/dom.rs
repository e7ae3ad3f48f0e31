//! Browser adapters: overlay visibility and the Pointer Lock API

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use super::PlatformError;
use crate::sim::gate::{LockError, PointerCapture, PresentationPort};

// JS binding for pointer lock
#[wasm_bindgen(inline_js = "
    export function pointer_lock_supported() {
        return 'pointerLockElement' in document;
    }

    export function request_pointer_lock(id) {
        const el = document.getElementById(id);
        if (!el || !el.requestPointerLock) {
            return false;
        }
        const result = el.requestPointerLock();
        if (result && result.catch) {
            // Rejections also fire pointerlockerror
            result.catch(() => {});
        }
        return true;
    }

    export function exit_pointer_lock() {
        if (document.exitPointerLock) {
            document.exitPointerLock();
        }
    }

    export function is_pointer_locked() {
        return document.pointerLockElement !== null && document.pointerLockElement !== undefined;
    }
")]
extern "C" {
    fn pointer_lock_supported() -> bool;
    fn request_pointer_lock(id: &str) -> bool;
    fn exit_pointer_lock();
    pub fn is_pointer_locked() -> bool;
}

pub const BLOCKER_ID: &str = "blocker";
pub const INSTRUCTIONS_ID: &str = "instructions";
pub const PAUSED_ID: &str = "paused-message";

fn element(document: &Document, id: &str) -> Result<HtmlElement, PlatformError> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| PlatformError::MissingElement(id.to_string()))
}

/// Set one inline style property, logging instead of failing
pub fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = el.style().set_property(property, value) {
        log::warn!("Could not set {} on #{}: {:?}", property, el.id(), e);
    }
}

/// Show (`""`) or hide (`"none"`) an element
pub fn set_display(el: &HtmlElement, value: &str) {
    set_style(el, "display", value);
}

/// The page's blocker/instructions/paused-message elements
pub struct DomOverlay {
    blocker: HtmlElement,
    instructions: HtmlElement,
    paused: HtmlElement,
}

impl DomOverlay {
    pub fn from_document(document: &Document) -> Result<Self, PlatformError> {
        Ok(Self {
            blocker: element(document, BLOCKER_ID)?,
            instructions: element(document, INSTRUCTIONS_ID)?,
            paused: element(document, PAUSED_ID)?,
        })
    }

    /// Element that takes the click-to-play click
    pub fn instructions(&self) -> &HtmlElement {
        &self.instructions
    }
}

impl PresentationPort for DomOverlay {
    fn show_instructions(&mut self) {
        set_display(&self.blocker, "grid");
        set_display(&self.instructions, "");
        set_display(&self.paused, "none");
    }

    fn show_paused(&mut self) {
        set_display(&self.blocker, "grid");
        set_display(&self.instructions, "none");
        set_display(&self.paused, "");
    }

    fn hide_overlay(&mut self) {
        set_display(&self.blocker, "none");
        set_display(&self.instructions, "none");
        set_display(&self.paused, "none");
    }
}

/// Pointer lock on the canvas element with the given id
pub struct DomPointerLock {
    target_id: String,
}

impl DomPointerLock {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
        }
    }
}

impl PointerCapture for DomPointerLock {
    fn request_lock(&mut self) -> Result<(), LockError> {
        if !pointer_lock_supported() {
            return Err(LockError::Unsupported);
        }
        if request_pointer_lock(&self.target_id) {
            Ok(())
        } else {
            Err(LockError::Rejected(format!("#{} cannot take pointer lock", self.target_id)))
        }
    }

    fn release_lock(&mut self) {
        exit_pointer_lock();
    }
}

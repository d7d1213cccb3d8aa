//! Clipboard snapshot / write / restore backed by the `arboard` crate.
//!
//! Every function opens a short-lived [`arboard::Clipboard`] handle rather
//! than sharing one across calls, because `arboard::Clipboard` is not `Send`
//! on all platforms and the handle is cheap to create.

use arboard::Clipboard;

use super::InjectError;

/// The clipboard's plain-text content before an injection, if any.
///
/// `None` means the clipboard was empty or held non-text data (an image,
/// say); [`restore`] treats that as "leave the clipboard alone".
pub type ClipboardSnapshot = Option<String>;

/// Capture the current clipboard plain-text content.
///
/// An empty or non-text clipboard is `Ok(None)`, never an error.
///
/// # Errors
///
/// [`InjectError::ClipboardAccess`] if the OS clipboard cannot be opened.
pub fn snapshot() -> Result<ClipboardSnapshot, InjectError> {
    let mut clipboard = open()?;
    // get_text errors on empty and on non-text alike — both map to None.
    Ok(clipboard.get_text().ok())
}

/// Replace the clipboard content with `text`.
///
/// # Errors
///
/// [`InjectError::ClipboardAccess`] if the clipboard cannot be opened,
/// [`InjectError::ClipboardSet`] if writing fails.
pub fn write_text(text: &str) -> Result<(), InjectError> {
    let mut clipboard = open()?;
    clipboard
        .set_text(text)
        .map_err(|e| InjectError::ClipboardSet(e.to_string()))
}

/// Put a previously captured snapshot back.
///
/// A `None` snapshot restores nothing and succeeds immediately.
pub fn restore(saved: ClipboardSnapshot) -> Result<(), InjectError> {
    match saved {
        Some(text) => write_text(&text),
        None => Ok(()),
    }
}

fn open() -> Result<Clipboard, InjectError> {
    Clipboard::new().map_err(|e| InjectError::ClipboardAccess(e.to_string()))
}

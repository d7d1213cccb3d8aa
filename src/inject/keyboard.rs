//! Keyboard simulation helpers backed by the `enigo` crate.
//!
//! [`simulate_paste`] sends the OS-appropriate paste shortcut to the focused
//! window (⌘V on macOS, Ctrl+V elsewhere); [`simulate_enter`] follows a
//! paste with Return for the auto-send delivery mode.
//!
//! A new [`Enigo`] instance is created per call because `Enigo` is not
//! `Send` and the handle is cheap to construct.

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::InjectError;

/// Simulate the system paste shortcut in the currently focused window.
///
/// # Errors
///
/// [`InjectError::KeySimulation`] if the enigo backend cannot be initialised
/// or a key event fails to be delivered.
pub fn simulate_paste() -> Result<(), InjectError> {
    let mut enigo = new_enigo()?;

    #[cfg(target_os = "macos")]
    let modifier = Key::Meta;
    #[cfg(not(target_os = "macos"))]
    let modifier = Key::Control;

    enigo
        .key(modifier, Direction::Press)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
    enigo
        .key(Key::Unicode('v'), Direction::Click)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
    enigo
        .key(modifier, Direction::Release)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))?;

    Ok(())
}

/// Simulate a Return key press in the currently focused window.
///
/// # Errors
///
/// [`InjectError::KeySimulation`] on backend or delivery failure.
pub fn simulate_enter() -> Result<(), InjectError> {
    let mut enigo = new_enigo()?;
    enigo
        .key(Key::Return, Direction::Click)
        .map_err(|e| InjectError::KeySimulation(e.to_string()))
}

fn new_enigo() -> Result<Enigo, InjectError> {
    Enigo::new(&Settings::default()).map_err(|e| InjectError::KeySimulation(e.to_string()))
}

//! Global hotkey chords — parsing, raw event capture, and arming.
//!
//! # Design
//!
//! Three layers between the OS and the coordinator:
//!
//! 1. [`listener::KeyListener`] — a dedicated OS thread running
//!    `rdev::listen`, forwarding raw press/release events for the watched
//!    keys.
//! 2. [`arming::ArmingMonitor`] — turns raw events into at most one logical
//!    [`Command`](crate::coordinator::Command) per physical event, with
//!    protection against a multi-key chord firing its sub-chords.
//! 3. The coordinator — decides what each command means in the current
//!    state.
//!
//! Chords are configured as `+`-separated key names (`"Ctrl+Win"`,
//! `"Escape"`, `"Ctrl+Alt+1"`). Right-hand modifier variants are folded
//! onto their left-hand siblings before matching, so a chord named `Ctrl`
//! responds to either control key.

pub mod arming;
pub mod listener;

pub use arming::{ArmingMonitor, TriggerSpec};
pub use listener::KeyListener;

use std::collections::HashSet;

use thiserror::Error;

// ---------------------------------------------------------------------------
// KeyInput
// ---------------------------------------------------------------------------

/// A raw key transition forwarded by the listener thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    /// The key that changed (not yet normalized).
    pub key: rdev::Key,
    /// `true` for press, `false` for release.
    pub is_down: bool,
}

// ---------------------------------------------------------------------------
// HotkeyError
// ---------------------------------------------------------------------------

/// Errors from chord parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HotkeyError {
    /// A chord string contained a key name the parser does not know.
    #[error("unknown key name {name:?} in chord {chord:?}")]
    UnknownKey { name: String, chord: String },

    /// A chord string contained no key names at all.
    #[error("empty chord string {0:?}")]
    EmptyChord(String),
}

// ---------------------------------------------------------------------------
// Key parsing
// ---------------------------------------------------------------------------

/// Fold right-hand modifier variants onto their left-hand siblings so chord
/// matching does not care which physical modifier was pressed.
pub fn normalize_key(key: rdev::Key) -> rdev::Key {
    match key {
        rdev::Key::ControlRight => rdev::Key::ControlLeft,
        rdev::Key::ShiftRight => rdev::Key::ShiftLeft,
        rdev::Key::MetaRight => rdev::Key::MetaLeft,
        other => other,
    }
}

/// Parse one key name from a chord string into an [`rdev::Key`].
///
/// Accepts modifier aliases (`Ctrl`, `Shift`, `Alt`, `Win`/`Super`/`Meta`),
/// F1–F12, common named keys, digits and ASCII letters. Returns `None` for
/// unrecognised names so callers can surface a configuration error.
pub fn parse_key(name: &str) -> Option<rdev::Key> {
    use rdev::Key;

    // Single letters and digits first; everything else is named.
    if name.len() == 1 {
        let c = name.chars().next()?;
        return match c.to_ascii_lowercase() {
            'a' => Some(Key::KeyA),
            'b' => Some(Key::KeyB),
            'c' => Some(Key::KeyC),
            'd' => Some(Key::KeyD),
            'e' => Some(Key::KeyE),
            'f' => Some(Key::KeyF),
            'g' => Some(Key::KeyG),
            'h' => Some(Key::KeyH),
            'i' => Some(Key::KeyI),
            'j' => Some(Key::KeyJ),
            'k' => Some(Key::KeyK),
            'l' => Some(Key::KeyL),
            'm' => Some(Key::KeyM),
            'n' => Some(Key::KeyN),
            'o' => Some(Key::KeyO),
            'p' => Some(Key::KeyP),
            'q' => Some(Key::KeyQ),
            'r' => Some(Key::KeyR),
            's' => Some(Key::KeyS),
            't' => Some(Key::KeyT),
            'u' => Some(Key::KeyU),
            'v' => Some(Key::KeyV),
            'w' => Some(Key::KeyW),
            'x' => Some(Key::KeyX),
            'y' => Some(Key::KeyY),
            'z' => Some(Key::KeyZ),
            '0' => Some(Key::Num0),
            '1' => Some(Key::Num1),
            '2' => Some(Key::Num2),
            '3' => Some(Key::Num3),
            '4' => Some(Key::Num4),
            '5' => Some(Key::Num5),
            '6' => Some(Key::Num6),
            '7' => Some(Key::Num7),
            '8' => Some(Key::Num8),
            '9' => Some(Key::Num9),
            _ => None,
        };
    }

    match name {
        // Modifiers (left-hand variants; normalize_key folds the rest)
        "Ctrl" | "Control" => Some(Key::ControlLeft),
        "Shift" => Some(Key::ShiftLeft),
        "Alt" => Some(Key::Alt),
        "AltGr" => Some(Key::AltGr),
        "Win" | "Super" | "Meta" | "Cmd" => Some(Key::MetaLeft),

        // Function keys
        "F1" => Some(Key::F1),
        "F2" => Some(Key::F2),
        "F3" => Some(Key::F3),
        "F4" => Some(Key::F4),
        "F5" => Some(Key::F5),
        "F6" => Some(Key::F6),
        "F7" => Some(Key::F7),
        "F8" => Some(Key::F8),
        "F9" => Some(Key::F9),
        "F10" => Some(Key::F10),
        "F11" => Some(Key::F11),
        "F12" => Some(Key::F12),

        // Navigation / control
        "Escape" | "Esc" => Some(Key::Escape),
        "Space" => Some(Key::Space),
        "Return" | "Enter" => Some(Key::Return),
        "Tab" => Some(Key::Tab),
        "Backspace" => Some(Key::Backspace),
        "Delete" | "Del" => Some(Key::Delete),
        "Home" => Some(Key::Home),
        "End" => Some(Key::End),
        "PageUp" => Some(Key::PageUp),
        "PageDown" => Some(Key::PageDown),
        "Up" => Some(Key::UpArrow),
        "Down" => Some(Key::DownArrow),
        "Left" => Some(Key::LeftArrow),
        "Right" => Some(Key::RightArrow),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Chord
// ---------------------------------------------------------------------------

/// A set of keys that fire together.
///
/// Order-insensitive, duplicate-free, and always non-empty once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    keys: Vec<rdev::Key>,
}

impl Chord {
    /// Parse a `+`-separated chord string (e.g. `"Ctrl+Alt+1"`).
    pub fn parse(spec: &str) -> Result<Self, HotkeyError> {
        let mut keys = Vec::new();
        for name in spec.split('+') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let key = parse_key(name).ok_or_else(|| HotkeyError::UnknownKey {
                name: name.to_string(),
                chord: spec.to_string(),
            })?;
            let key = normalize_key(key);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        if keys.is_empty() {
            return Err(HotkeyError::EmptyChord(spec.to_string()));
        }
        Ok(Self { keys })
    }

    /// The chord's keys (normalized).
    pub fn keys(&self) -> &[rdev::Key] {
        &self.keys
    }

    /// Number of keys in the chord.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always `false` for a parsed chord; present for completeness.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `true` when `key` is part of this chord.
    pub fn contains(&self, key: rdev::Key) -> bool {
        self.keys.contains(&key)
    }

    /// `true` when every key of the chord is in `pressed`.
    pub fn satisfied_by(&self, pressed: &HashSet<rdev::Key>) -> bool {
        self.keys.iter().all(|k| pressed.contains(k))
    }

    /// `true` when every key of this chord is also in `other`.
    pub fn subset_of(&self, other: &Chord) -> bool {
        self.keys.iter().all(|k| other.contains(*k))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modifier_aliases() {
        assert_eq!(parse_key("Ctrl"), Some(rdev::Key::ControlLeft));
        assert_eq!(parse_key("Control"), Some(rdev::Key::ControlLeft));
        assert_eq!(parse_key("Win"), Some(rdev::Key::MetaLeft));
        assert_eq!(parse_key("Super"), Some(rdev::Key::MetaLeft));
        assert_eq!(parse_key("Shift"), Some(rdev::Key::ShiftLeft));
    }

    #[test]
    fn parse_letters_digits_and_named_keys() {
        assert_eq!(parse_key("a"), Some(rdev::Key::KeyA));
        assert_eq!(parse_key("A"), Some(rdev::Key::KeyA));
        assert_eq!(parse_key("1"), Some(rdev::Key::Num1));
        assert_eq!(parse_key("F9"), Some(rdev::Key::F9));
        assert_eq!(parse_key("Escape"), Some(rdev::Key::Escape));
        assert_eq!(parse_key("Esc"), Some(rdev::Key::Escape));
    }

    #[test]
    fn parse_unknown_key_is_none() {
        assert_eq!(parse_key("Hyper"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn normalize_folds_right_variants() {
        assert_eq!(
            normalize_key(rdev::Key::ControlRight),
            rdev::Key::ControlLeft
        );
        assert_eq!(normalize_key(rdev::Key::ShiftRight), rdev::Key::ShiftLeft);
        assert_eq!(normalize_key(rdev::Key::MetaRight), rdev::Key::MetaLeft);
        assert_eq!(normalize_key(rdev::Key::KeyA), rdev::Key::KeyA);
    }

    #[test]
    fn chord_parse_two_keys() {
        let chord = Chord::parse("Ctrl+Win").unwrap();
        assert_eq!(chord.len(), 2);
        assert!(chord.contains(rdev::Key::ControlLeft));
        assert!(chord.contains(rdev::Key::MetaLeft));
    }

    #[test]
    fn chord_parse_dedups_and_trims() {
        let chord = Chord::parse(" Ctrl + Control ").unwrap();
        assert_eq!(chord.len(), 1);
    }

    #[test]
    fn chord_parse_unknown_key_errors() {
        let err = Chord::parse("Ctrl+Bogus").unwrap_err();
        assert!(matches!(err, HotkeyError::UnknownKey { .. }));
    }

    #[test]
    fn chord_parse_empty_errors() {
        assert!(matches!(
            Chord::parse(""),
            Err(HotkeyError::EmptyChord(_))
        ));
        assert!(matches!(
            Chord::parse("+"),
            Err(HotkeyError::EmptyChord(_))
        ));
    }

    #[test]
    fn chord_subset_relation() {
        let small = Chord::parse("Ctrl").unwrap();
        let big = Chord::parse("Ctrl+Win").unwrap();
        let other = Chord::parse("Escape").unwrap();

        assert!(small.subset_of(&big));
        assert!(big.subset_of(&big));
        assert!(!big.subset_of(&small));
        assert!(!other.subset_of(&big));
    }

    #[test]
    fn chord_satisfied_by_pressed_superset() {
        let chord = Chord::parse("Ctrl+Win").unwrap();
        let mut pressed = HashSet::new();
        pressed.insert(rdev::Key::ControlLeft);
        assert!(!chord.satisfied_by(&pressed));
        pressed.insert(rdev::Key::MetaLeft);
        assert!(chord.satisfied_by(&pressed));
        pressed.insert(rdev::Key::KeyA);
        assert!(chord.satisfied_by(&pressed));
    }
}

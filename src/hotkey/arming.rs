//! Input arming — raw key events in, debounced logical commands out.
//!
//! A physical chord like Ctrl+Win contains smaller chords (Ctrl alone, Win
//! alone) that may themselves be bound to commands. Without protection,
//! pressing or re-gripping the start chord would fire those sub-chords as
//! stop or auto-send commands.
//!
//! [`ArmingMonitor`] therefore keeps one boolean per trigger:
//!
//! * **Armed → Disarmed** the instant a start command fires, for every
//!   trigger whose key set is a subset of the fired chord (the start trigger
//!   itself included).
//! * **Disarmed → Armed** only once every key of the fired chord has been
//!   released.
//!
//! There are no other transitions, and the flags are independent of the
//! coordinator's own state. A disarmed trigger simply cannot fire; everything
//! else flows through unchanged, at most one command per physical event.

use std::collections::HashSet;

use crate::config::HotkeyConfig;
use crate::coordinator::Command;

use super::{normalize_key, Chord, HotkeyError};

// ---------------------------------------------------------------------------
// TriggerSpec
// ---------------------------------------------------------------------------

/// One configured chord and the command it fires.
#[derive(Debug, Clone)]
pub struct TriggerSpec {
    /// The chord that fires the command.
    pub chord: Chord,
    /// The command to emit when the chord completes.
    pub command: Command,
}

impl TriggerSpec {
    pub fn new(chord: Chord, command: Command) -> Self {
        Self { chord, command }
    }
}

// ---------------------------------------------------------------------------
// ArmingMonitor
// ---------------------------------------------------------------------------

struct Trigger {
    chord: Chord,
    command: Command,
    armed: bool,
    /// Keys of the chord that disarmed this trigger; all of them must be
    /// released before the trigger re-arms.
    hold: Vec<rdev::Key>,
}

/// Converts raw key transitions into logical commands.
///
/// Feed every watched press/release into [`on_key`]; it returns at most one
/// command per event. When a single press completes several chords at once,
/// the largest chord wins (configuration order breaks ties), so completing
/// Ctrl+Win fires the start command rather than a one-modifier sub-chord.
///
/// [`on_key`]: ArmingMonitor::on_key
pub struct ArmingMonitor {
    triggers: Vec<Trigger>,
    pressed: HashSet<rdev::Key>,
}

impl ArmingMonitor {
    /// Build a monitor from explicit trigger specs.
    pub fn new(specs: Vec<TriggerSpec>) -> Self {
        Self {
            triggers: specs
                .into_iter()
                .map(|spec| Trigger {
                    chord: spec.chord,
                    command: spec.command,
                    armed: true,
                    hold: Vec::new(),
                })
                .collect(),
            pressed: HashSet::new(),
        }
    }

    /// Build a monitor from the hotkey section of the application config.
    ///
    /// # Errors
    ///
    /// [`HotkeyError`] when any chord string fails to parse.
    pub fn from_config(cfg: &HotkeyConfig) -> Result<Self, HotkeyError> {
        let mut specs = vec![
            TriggerSpec::new(Chord::parse(&cfg.start_chord)?, Command::StartRecording),
            TriggerSpec::new(Chord::parse(&cfg.stop_chord)?, Command::StopRecording),
            TriggerSpec::new(Chord::parse(&cfg.auto_send_chord)?, Command::AutoSend),
            TriggerSpec::new(Chord::parse(&cfg.cancel_chord)?, Command::CancelRecording),
        ];
        for binding in &cfg.model_bindings {
            specs.push(TriggerSpec::new(
                Chord::parse(&binding.chord)?,
                Command::ChangeModel(binding.model.clone()),
            ));
        }
        Ok(Self::new(specs))
    }

    /// Every key that participates in some configured chord.
    ///
    /// The listener thread uses this to filter the raw event stream.
    pub fn watched_keys(&self) -> HashSet<rdev::Key> {
        self.triggers
            .iter()
            .flat_map(|t| t.chord.keys().iter().copied())
            .collect()
    }

    /// Process one raw key transition; returns the logical command it fires,
    /// if any.
    ///
    /// OS auto-repeat (a press for a key that is already down) is ignored.
    /// Releases never fire commands; they only update the pressed set and
    /// re-arm triggers whose hold keys are all up.
    pub fn on_key(&mut self, key: rdev::Key, is_down: bool) -> Option<Command> {
        let key = normalize_key(key);

        if !is_down {
            self.pressed.remove(&key);
            for t in &mut self.triggers {
                if !t.armed && t.hold.iter().all(|k| !self.pressed.contains(k)) {
                    t.armed = true;
                    t.hold.clear();
                }
            }
            return None;
        }

        if !self.pressed.insert(key) {
            // Auto-repeat while held.
            return None;
        }

        // The newly pressed key must be part of the chord it completes, so a
        // chord held from earlier cannot refire on an unrelated press.
        let mut winner: Option<usize> = None;
        for (i, t) in self.triggers.iter().enumerate() {
            if t.armed && t.chord.contains(key) && t.chord.satisfied_by(&self.pressed) {
                let better = match winner {
                    Some(w) => t.chord.len() > self.triggers[w].chord.len(),
                    None => true,
                };
                if better {
                    winner = Some(i);
                }
            }
        }
        let i = winner?;

        let fired_chord = self.triggers[i].chord.clone();
        let command = self.triggers[i].command.clone();

        if command == Command::StartRecording {
            for t in &mut self.triggers {
                if t.chord.subset_of(&fired_chord) {
                    t.armed = false;
                    t.hold = fired_chord.keys().to_vec();
                }
            }
        }

        log::debug!("arming: chord fired {command:?}");
        Some(command)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::Key;

    /// The default binding set: start Ctrl+Win, stop Ctrl, auto-send Win,
    /// cancel Escape, model chords Ctrl+Alt+1 / Ctrl+Alt+2.
    fn monitor() -> ArmingMonitor {
        ArmingMonitor::from_config(&HotkeyConfig::default()).unwrap()
    }

    #[test]
    fn completing_the_start_chord_fires_start() {
        let mut m = monitor();

        // Pressing Ctrl alone completes the one-key stop chord first; the
        // coordinator rejects it when nothing is recording.
        assert_eq!(m.on_key(Key::ControlLeft, true), Some(Command::StopRecording));
        // Win completes Ctrl+Win; the larger chord outranks auto-send's Win.
        assert_eq!(m.on_key(Key::MetaLeft, true), Some(Command::StartRecording));
    }

    #[test]
    fn start_fires_regardless_of_press_order() {
        let mut m = monitor();
        assert_eq!(m.on_key(Key::MetaLeft, true), Some(Command::AutoSend));
        assert_eq!(m.on_key(Key::ControlLeft, true), Some(Command::StartRecording));
    }

    /// Releasing one modifier of the start chord must not let the one-key
    /// stop chord fire until the whole chord was released and re-pressed.
    #[test]
    fn subset_stop_stays_disarmed_until_full_release() {
        let mut m = monitor();
        m.on_key(Key::ControlLeft, true);
        assert_eq!(m.on_key(Key::MetaLeft, true), Some(Command::StartRecording));

        // Release Win only; Ctrl is still held.
        assert_eq!(m.on_key(Key::MetaLeft, false), None);

        // Re-pressing Win completes both Ctrl+Win and Win, but both triggers
        // are disarmed.
        assert_eq!(m.on_key(Key::MetaLeft, true), None);
        assert_eq!(m.on_key(Key::MetaLeft, false), None);

        // Full release re-arms everything.
        assert_eq!(m.on_key(Key::ControlLeft, false), None);

        // Now the stop chord fires again.
        assert_eq!(m.on_key(Key::ControlLeft, true), Some(Command::StopRecording));
    }

    #[test]
    fn auto_repeat_is_suppressed() {
        let mut m = monitor();
        assert_eq!(m.on_key(Key::ControlLeft, true), Some(Command::StopRecording));
        // OS auto-repeat delivers more presses while held.
        assert_eq!(m.on_key(Key::ControlLeft, true), None);
        assert_eq!(m.on_key(Key::ControlLeft, true), None);
    }

    #[test]
    fn cancel_chord_is_unaffected_by_the_start_chord() {
        let mut m = monitor();
        m.on_key(Key::ControlLeft, true);
        m.on_key(Key::MetaLeft, true); // start fired, subsets disarmed

        // Escape shares no keys with the start chord, so it stays armed.
        assert_eq!(m.on_key(Key::Escape, true), Some(Command::CancelRecording));
    }

    #[test]
    fn model_chord_fires_while_start_chord_is_held() {
        let mut m = monitor();
        m.on_key(Key::ControlLeft, true);
        m.on_key(Key::MetaLeft, true); // start fired

        // Ctrl+Alt+1 is not a subset of Ctrl+Win; with Ctrl already down,
        // adding Alt and 1 completes it.
        assert_eq!(m.on_key(Key::Alt, true), None);
        assert_eq!(
            m.on_key(Key::Num1, true),
            Some(Command::ChangeModel("base".into()))
        );
    }

    #[test]
    fn model_chords_carry_their_bound_model() {
        let mut m = monitor();
        m.on_key(Key::ControlLeft, true);
        m.on_key(Key::Alt, true);
        assert_eq!(
            m.on_key(Key::Num2, true),
            Some(Command::ChangeModel("small".into()))
        );
    }

    #[test]
    fn right_hand_modifiers_are_folded() {
        let mut m = monitor();
        assert_eq!(
            m.on_key(Key::ControlRight, true),
            Some(Command::StopRecording)
        );
    }

    #[test]
    fn releases_never_fire_commands() {
        let mut m = monitor();
        m.on_key(Key::ControlLeft, true);
        assert_eq!(m.on_key(Key::ControlLeft, false), None);
        assert_eq!(m.on_key(Key::Escape, false), None);
    }

    #[test]
    fn watched_keys_cover_every_configured_chord() {
        let m = monitor();
        let keys = m.watched_keys();
        for key in [
            Key::ControlLeft,
            Key::MetaLeft,
            Key::Escape,
            Key::Alt,
            Key::Num1,
            Key::Num2,
        ] {
            assert!(keys.contains(&key), "missing {key:?}");
        }
    }

    #[test]
    fn unparseable_config_chord_is_an_error() {
        let mut cfg = HotkeyConfig::default();
        cfg.start_chord = "Ctrl+Nope".into();
        assert!(ArmingMonitor::from_config(&cfg).is_err());
    }
}

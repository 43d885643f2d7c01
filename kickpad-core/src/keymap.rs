//! Mode table and the registry holding the active mode.
//!
//! Each mode button selects one entry; each jack emits one half of the
//! active entry. Mode buttons, left to right:
//!   Red: mode 0 (default), Blue: mode 1, Yellow: mode 2, Green: mode 3.

use core::ops::Index;

use crate::keycode::Keycode;

/// Number of modes (one per mode button).
pub const MODES: usize = 4;

/// Which half of a keymap entry a jack emits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Left = 0,
    Right = 1,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Left, Slot::Right];
}

/// Pair of output codes for one mode, indexed by [`Slot`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeymapEntry(pub Keycode, pub Keycode);

impl KeymapEntry {
    pub fn code(self, slot: Slot) -> Keycode {
        match slot {
            Slot::Left => self.0,
            Slot::Right => self.1,
        }
    }
}

impl Index<Slot> for KeymapEntry {
    type Output = Keycode;

    fn index(&self, slot: Slot) -> &Keycode {
        match slot {
            Slot::Left => &self.0,
            Slot::Right => &self.1,
        }
    }
}

/// Mode button names, in mode order.
pub static MODE_NAMES: [&str; MODES] = ["Red", "Blue", "Yellow", "Green"];

/// Keymap table. Changing codes here changes behavior but not structure.
pub static KEYMAP: [KeymapEntry; MODES] = [
    KeymapEntry(Keycode::F17, Keycode::F18), // Red, mode 0 (default)
    KeymapEntry(Keycode::F19, Keycode::F20), // Blue, mode 1
    KeymapEntry(Keycode::F21, Keycode::F22), // Yellow, mode 2
    KeymapEntry(Keycode::F23, Keycode::F24), // Green, mode 3
];

/// Fixed list of entries plus the active mode.
///
/// `active_mode` is always a valid index into `entries`.
#[derive(Clone, Debug)]
pub struct KeymapRegistry {
    entries: [KeymapEntry; MODES],
    active_mode: usize,
}

impl KeymapRegistry {
    pub const fn new(entries: [KeymapEntry; MODES]) -> Self {
        Self {
            entries,
            active_mode: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_mode(&self) -> usize {
        self.active_mode
    }

    pub fn get_entry(&self, mode: usize) -> Option<KeymapEntry> {
        self.entries.get(mode).copied()
    }

    /// Select `mode` if it exists. Out-of-range requests leave the active
    /// mode alone and return `false`; nothing else is reported.
    pub fn set_active_mode(&mut self, mode: usize) -> bool {
        if mode < self.entries.len() {
            self.active_mode = mode;
            true
        } else {
            false
        }
    }

    pub fn get_active_entry(&self) -> KeymapEntry {
        self.entries[self.active_mode]
    }
}

impl Default for KeymapRegistry {
    fn default() -> Self {
        Self::new(KEYMAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_mode() {
        let registry = KeymapRegistry::default();
        assert_eq!(registry.active_mode(), 0);
        assert_eq!(
            registry.get_active_entry(),
            KeymapEntry(Keycode::F17, Keycode::F18)
        );
    }

    #[test]
    fn set_active_mode_in_range() {
        let mut registry = KeymapRegistry::default();
        assert!(registry.set_active_mode(3));
        assert_eq!(registry.active_mode(), 3);
        assert_eq!(registry.get_active_entry()[Slot::Right], Keycode::F24);
    }

    #[test]
    fn out_of_range_mode_is_ignored() {
        let mut registry = KeymapRegistry::default();
        registry.set_active_mode(2);
        assert!(!registry.set_active_mode(7));
        assert!(!registry.set_active_mode(MODES));
        assert_eq!(registry.active_mode(), 2);
    }

    #[test]
    fn get_entry_bounds() {
        let registry = KeymapRegistry::default();
        assert_eq!(registry.get_entry(1), Some(KeymapEntry(Keycode::F19, Keycode::F20)));
        assert_eq!(registry.get_entry(4), None);
        assert_eq!(registry.len(), MODES);
    }

    #[test]
    fn slot_selects_half() {
        let entry = KeymapEntry(Keycode::F21, Keycode::F22);
        assert_eq!(entry.code(Slot::Left), Keycode::F21);
        assert_eq!(entry.code(Slot::Right), Keycode::F22);
        assert_eq!(entry[Slot::Right], entry.code(Slot::Right));
    }
}

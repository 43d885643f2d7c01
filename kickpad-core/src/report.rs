//! HID keyboard report bookkeeping.
//!
//! The report is the key-injection backend: `press`/`release` edit it in
//! place, and the transport sends it whenever it differs from the last one
//! sent.

use crate::dispatch::KeyInjector;
use crate::keycode::Keycode;

/// Standard USB HID keyboard report (8 bytes).
/// Byte 0: modifier keys bitmask
/// Byte 1: reserved (0x00)
/// Bytes 2-7: up to 6 simultaneous keycodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; 6],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; 6],
        }
    }

    pub fn is_pressed(&self, code: Keycode) -> bool {
        if code.is_modifier() {
            self.modifiers & code.modifier_bit() != 0
        } else {
            self.keys.contains(&(code as u8))
        }
    }

    pub fn as_bytes(&self) -> [u8; 8] {
        let k = self.keys;
        [self.modifiers, self.reserved, k[0], k[1], k[2], k[3], k[4], k[5]]
    }
}

impl Default for KeyboardReport {
    fn default() -> Self {
        Self::empty()
    }
}

impl KeyInjector for KeyboardReport {
    fn press(&mut self, code: Keycode) {
        if code.is_modifier() {
            self.modifiers |= code.modifier_bit();
            return;
        }
        if self.is_pressed(code) {
            return;
        }
        // More than 6 keys are silently dropped (no rollover error).
        if let Some(slot) = self.keys.iter_mut().find(|k| **k == 0) {
            *slot = code as u8;
        }
    }

    fn release(&mut self, code: Keycode) {
        if code.is_modifier() {
            self.modifiers &= !code.modifier_bit();
            return;
        }
        for slot in self.keys.iter_mut().filter(|k| **k == code as u8) {
            *slot = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_key() {
        let mut report = KeyboardReport::empty();
        report.press(Keycode::F17);
        assert_eq!(report.as_bytes(), [0, 0, 0x6C, 0, 0, 0, 0, 0]);

        report.press(Keycode::F17);
        assert_eq!(report.keys.iter().filter(|k| **k != 0).count(), 1);

        report.release(Keycode::F17);
        assert_eq!(report, KeyboardReport::empty());
    }

    #[test]
    fn modifiers_use_bitmask() {
        let mut report = KeyboardReport::empty();
        report.press(Keycode::LShift);
        report.press(Keycode::RAlt);
        assert_eq!(report.modifiers, 0x02 | 0x40);
        assert!(report.keys.iter().all(|k| *k == 0));

        report.release(Keycode::LShift);
        assert_eq!(report.modifiers, 0x40);
    }

    #[test]
    fn seventh_key_is_dropped_and_freed_slot_is_reused() {
        let mut report = KeyboardReport::empty();
        let codes = [
            Keycode::F13,
            Keycode::F14,
            Keycode::F15,
            Keycode::F16,
            Keycode::F17,
            Keycode::F18,
        ];
        for code in codes {
            report.press(code);
        }
        report.press(Keycode::F19);
        assert!(!report.is_pressed(Keycode::F19));

        report.release(Keycode::F15);
        report.press(Keycode::F19);
        assert_eq!(report.keys[2], Keycode::F19 as u8);
    }

    #[test]
    fn releasing_absent_key_is_noop() {
        let mut report = KeyboardReport::empty();
        report.press(Keycode::F20);
        report.release(Keycode::F21);
        assert!(report.is_pressed(Keycode::F20));
    }
}

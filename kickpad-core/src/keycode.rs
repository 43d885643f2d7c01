//! USB HID keycodes the pad can emit.
//! See USB HID Usage Tables, Section 10 (Keyboard/Keypad Page 0x07).

/// Output code sent to the host. The engine treats these as opaque; only the
/// HID report cares about modifiers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Keycode {
    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,

    // Function keys
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,
    // Extended function keys: no physical key on most keyboards, which is
    // what makes them safe hotkeys for streaming/recording software.
    F13 = 0x68,
    F14 = 0x69,
    F15 = 0x6A,
    F16 = 0x6B,
    F17 = 0x6C,
    F18 = 0x6D,
    F19 = 0x6E,
    F20 = 0x6F,
    F21 = 0x70,
    F22 = 0x71,
    F23 = 0x72,
    F24 = 0x73,

    // Navigation
    PageUp = 0x4B,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,

    // Modifiers (used in the modifier byte, not in keycode array)
    LCtrl = 0xE0,
    LShift = 0xE1,
    LAlt = 0xE2,
    LGui = 0xE3,
    RCtrl = 0xE4,
    RShift = 0xE5,
    RAlt = 0xE6,
    RGui = 0xE7,
}

impl Keycode {
    /// Check if this keycode is a modifier (LCtrl..RGui).
    pub fn is_modifier(self) -> bool {
        (0xE0..=0xE7).contains(&(self as u8))
    }

    /// Get the modifier bit mask (bit 0 = LCtrl, bit 7 = RGui).
    pub fn modifier_bit(self) -> u8 {
        if self.is_modifier() {
            1 << (self as u8 - 0xE0)
        } else {
            0
        }
    }

    /// Short label used in status text and keymap listings.
    pub fn display_name(self) -> &'static str {
        match self {
            Keycode::Enter => "Ent",
            Keycode::Escape => "Esc",
            Keycode::Backspace => "Bksp",
            Keycode::Tab => "Tab",
            Keycode::Space => "Spc",
            Keycode::F1 => "F1",
            Keycode::F2 => "F2",
            Keycode::F3 => "F3",
            Keycode::F4 => "F4",
            Keycode::F5 => "F5",
            Keycode::F6 => "F6",
            Keycode::F7 => "F7",
            Keycode::F8 => "F8",
            Keycode::F9 => "F9",
            Keycode::F10 => "F10",
            Keycode::F11 => "F11",
            Keycode::F12 => "F12",
            Keycode::F13 => "F13",
            Keycode::F14 => "F14",
            Keycode::F15 => "F15",
            Keycode::F16 => "F16",
            Keycode::F17 => "F17",
            Keycode::F18 => "F18",
            Keycode::F19 => "F19",
            Keycode::F20 => "F20",
            Keycode::F21 => "F21",
            Keycode::F22 => "F22",
            Keycode::F23 => "F23",
            Keycode::F24 => "F24",
            Keycode::PageUp => "PgUp",
            Keycode::PageDown => "PgDn",
            Keycode::Right => "\u{2192}",
            Keycode::Left => "\u{2190}",
            Keycode::Down => "\u{2193}",
            Keycode::Up => "\u{2191}",
            Keycode::LCtrl => "Ctrl",
            Keycode::LShift => "Shft",
            Keycode::LAlt => "Alt",
            Keycode::LGui => "Gui",
            Keycode::RCtrl => "RCtl",
            Keycode::RShift => "RSft",
            Keycode::RAlt => "RAlt",
            Keycode::RGui => "RGui",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Keycode;

    #[test]
    fn extended_function_keys_follow_f12_gap() {
        assert_eq!(Keycode::F13 as u8, 0x68);
        assert_eq!(Keycode::F24 as u8, 0x73);
    }

    #[test]
    fn modifier_bits() {
        assert_eq!(Keycode::LCtrl.modifier_bit(), 0x01);
        assert_eq!(Keycode::RGui.modifier_bit(), 0x80);
        assert_eq!(Keycode::F17.modifier_bit(), 0);
        assert!(!Keycode::F24.is_modifier());
    }
}

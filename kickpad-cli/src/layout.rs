//! Plain-text listing of the keymap table.

use kickpad_core::{KeymapEntry, Slot, MODE_NAMES};

/// One row per mode: button, index, and the code each jack sends.
pub fn render(keymap: &[KeymapEntry]) -> String {
    let mut out = String::from("Mode  Button   Left jack  Right jack\n");

    for (mode, entry) in keymap.iter().enumerate() {
        let button = MODE_NAMES.get(mode).copied().unwrap_or("?");
        let default = if mode == 0 { "  (default)" } else { "" };
        out.push_str(&format!(
            "{:<5} {:<8} {:<10} {:<10}{}\n",
            mode,
            button,
            entry[Slot::Left].display_name(),
            entry[Slot::Right].display_name(),
            default
        ));
    }

    out
}

//! Per-input debounce state machine.
//!
//! Each input walks through four logical states. There are no timers: every
//! poll advances the machine by at most one edge, so a press always shows up
//! as `Pressing` for exactly one poll before it can become `Held`.

use core::fmt;

/// Logical state of a single input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LogicalState {
    #[default]
    Released = 0,
    Pressing = 1,
    Held = 2,
    Releasing = 3,
}

impl LogicalState {
    /// All states, in encoding order.
    pub const ALL: [LogicalState; 4] = [
        LogicalState::Released,
        LogicalState::Pressing,
        LogicalState::Held,
        LogicalState::Releasing,
    ];

    /// Advance the machine with one `pressed` sample.
    ///
    /// Returns the next state and whether it differs from `self`.
    /// A `Releasing` input that still reads as pressed goes back to
    /// `Pressing`, not `Held`.
    pub fn step(self, pressed: bool) -> (LogicalState, bool) {
        use LogicalState::*;

        match (self, pressed) {
            (Released, true) => (Pressing, true),
            (Released, false) => (Released, false),
            (Pressing, true) => (Held, true),
            (Pressing, false) => (Releasing, true),
            (Held, true) => (Held, false),
            (Held, false) => (Releasing, true),
            (Releasing, true) => (Pressing, true),
            (Releasing, false) => (Released, true),
        }
    }

    /// Decode a raw state byte.
    ///
    /// # Panics
    ///
    /// Anything outside `0..=3` means memory corruption or a logic defect and
    /// is treated as a fatal fault.
    pub fn from_raw(raw: u8) -> LogicalState {
        match raw {
            0 => LogicalState::Released,
            1 => LogicalState::Pressing,
            2 => LogicalState::Held,
            3 => LogicalState::Releasing,
            _ => panic!("invalid input state {}", raw),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogicalState::Released => "RELEASED",
            LogicalState::Pressing => "PRESSING",
            LogicalState::Held => "HELD",
            LogicalState::Releasing => "RELEASING",
        }
    }
}

impl fmt::Display for LogicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

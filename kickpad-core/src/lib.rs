//! Input dispatch engine for the Kickpad macro pad.
//!
//! Mode buttons and dual-contact jack switches are sampled, classified into
//! transitions by a small debounce state machine, and routed either to a
//! mode change or to a key press/release on the HID backend.
//!
//! This crate is `no_std` so the AVR firmware and the host CLI share the
//! exact same engine.

#![cfg_attr(not(test), no_std)]

pub mod debounce;
pub mod dispatch;
pub mod engine;
pub mod input;
pub mod keycode;
pub mod keymap;
pub mod report;

pub use debounce::LogicalState;
pub use dispatch::{Action, Dispatcher, KeyInjector, ModeStatus, StatusDisplay, TransitionHandler};
pub use engine::{Engine, JACKS};
pub use input::{DigitalInput, InputName, JackSwitch};
pub use keycode::Keycode;
pub use keymap::{KeymapEntry, KeymapRegistry, Slot, KEYMAP, MODES, MODE_NAMES};
pub use report::KeyboardReport;

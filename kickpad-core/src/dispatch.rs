//! Routing of input transitions to mode changes and key injection.

use core::fmt;

use log::{debug, info};

use crate::debounce::LogicalState;
use crate::input::InputName;
use crate::keycode::Keycode;
use crate::keymap::{KeymapEntry, KeymapRegistry, Slot};

/// What an input does when it transitions. Bound once at startup.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Select a mode when the input is released.
    SetMode(usize),
    /// Press/release one half of the active keymap entry.
    InjectKey(Slot),
}

/// Key-injection backend. Fire-and-forget: failures stay on the backend side.
pub trait KeyInjector {
    fn press(&mut self, code: Keycode);
    fn release(&mut self, code: Keycode);
}

/// Receives a status update on every mode change. Purely observational.
pub trait StatusDisplay {
    fn show(&mut self, status: &ModeStatus);
}

/// Snapshot published after a mode selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ModeStatus {
    pub selector: InputName,
    pub mode: usize,
    pub entry: KeymapEntry,
}

impl fmt::Display for ModeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Active Mode:\n{}\nKeymap:\n({}, {})",
            self.selector,
            self.entry.0.display_name(),
            self.entry.1.display_name()
        )
    }
}

/// Called by inputs whenever their logical state changes.
pub trait TransitionHandler {
    fn on_transition(&mut self, source: InputName, action: Action, state: LogicalState);
}

/// Applies bound actions against the registry and the collaborators.
pub struct Dispatcher<'a, K, S> {
    registry: &'a mut KeymapRegistry,
    injector: &'a mut K,
    display: &'a mut S,
}

impl<'a, K: KeyInjector, S: StatusDisplay> Dispatcher<'a, K, S> {
    pub fn new(registry: &'a mut KeymapRegistry, injector: &'a mut K, display: &'a mut S) -> Self {
        Self {
            registry,
            injector,
            display,
        }
    }

    /// Select `mode` and publish the resulting status under `selector`.
    ///
    /// The status is published even when `mode` is out of range, in which
    /// case it reflects the unchanged active mode.
    pub fn set_mode(&mut self, selector: InputName, mode: usize) {
        self.registry.set_active_mode(mode);

        let status = ModeStatus {
            selector,
            mode: self.registry.active_mode(),
            entry: self.registry.get_active_entry(),
        };
        info!(
            "Switching to mode {} ({}). Keymap: {:?}",
            selector, mode, status.entry
        );
        self.display.show(&status);
    }

    fn inject(&mut self, slot: Slot, state: LogicalState) {
        let code = self.registry.get_active_entry().code(slot);
        match state {
            LogicalState::Pressing => {
                self.injector.press(code);
                debug!("Injecting key {:?} press.", code);
            }
            LogicalState::Releasing => {
                self.injector.release(code);
                debug!("Injecting key {:?} release.", code);
            }
            LogicalState::Held | LogicalState::Released => {}
        }
    }
}

impl<K: KeyInjector, S: StatusDisplay> TransitionHandler for Dispatcher<'_, K, S> {
    fn on_transition(&mut self, source: InputName, action: Action, state: LogicalState) {
        match action {
            // Modes only commit on release.
            Action::SetMode(mode) => {
                if state == LogicalState::Releasing {
                    self.set_mode(source, mode);
                }
            }
            Action::InjectKey(slot) => self.inject(slot, state),
        }
    }
}

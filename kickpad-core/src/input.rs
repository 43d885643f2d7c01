//! Physical inputs: single switches and dual-contact jack switches.

use core::fmt;

use embedded_hal::digital::{InputPin, StatefulOutputPin};
use log::trace;

use crate::debounce::LogicalState;
use crate::dispatch::{Action, TransitionHandler};

/// Name of an input, optionally qualified by a jack contact number.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InputName {
    base: &'static str,
    contact: Option<u8>,
}

impl InputName {
    pub const fn new(base: &'static str) -> Self {
        Self {
            base,
            contact: None,
        }
    }

    pub const fn contact(base: &'static str, contact: u8) -> Self {
        Self {
            base,
            contact: Some(contact),
        }
    }

    pub fn base(&self) -> &'static str {
        self.base
    }
}

impl fmt::Display for InputName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.contact {
            Some(n) => write!(f, "{} {}", self.base, n),
            None => f.write_str(self.base),
        }
    }
}

/// One digital line plus its debounce state.
pub struct DigitalInput<P> {
    name: InputName,
    line: P,
    /// Line level that counts as pressed.
    active_level: bool,
    state: LogicalState,
    action: Option<Action>,
}

impl<P: InputPin> DigitalInput<P> {
    /// The caller configures the line's pull in the opposite direction of
    /// `active_level`.
    pub fn new(name: InputName, line: P, active_level: bool) -> Self {
        Self {
            name,
            line,
            active_level,
            state: LogicalState::Released,
            action: None,
        }
    }

    pub fn name(&self) -> InputName {
        self.name
    }

    pub fn state(&self) -> LogicalState {
        self.state
    }

    pub fn active_level(&self) -> bool {
        self.active_level
    }

    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// Bind `action`, returning whatever was bound before.
    pub fn set_action(&mut self, action: Action) -> Option<Action> {
        self.action.replace(action)
    }

    pub fn pressed(&mut self) -> Result<bool, P::Error> {
        Ok(self.line.is_high()? == self.active_level)
    }

    /// Sample the line and advance the state machine.
    ///
    /// Returns the new state if it changed.
    pub fn sample(&mut self) -> Result<Option<LogicalState>, P::Error> {
        let pressed = self.pressed()?;
        let (next, changed) = self.state.step(pressed);
        self.state = next;

        if changed {
            trace!("{} -> {}", self.name, next);
            Ok(Some(next))
        } else {
            Ok(None)
        }
    }

    /// Sample the line and hand any transition to `handler` along with the
    /// bound action. Unbound inputs still track state.
    pub fn update<H: TransitionHandler>(&mut self, handler: &mut H) -> Result<(), P::Error> {
        if let Some(state) = self.sample()? {
            if let Some(action) = self.action {
                handler.on_transition(self.name, action, state);
            }
        }
        Ok(())
    }
}

/// Jack with a driven common line and two contacts.
///
/// Both contacts share one bound action, so either contact produces the
/// same dispatch; only the reported state tells them apart.
pub struct JackSwitch<D, P> {
    drive: D,
    contacts: [DigitalInput<P>; 2],
    action: Option<Action>,
}

impl<D, P> JackSwitch<D, P>
where
    D: StatefulOutputPin,
    P: InputPin,
{
    /// Assert `drive` and build both contacts with the drive's read-back
    /// level as their active level. `drive` stays asserted for the lifetime
    /// of the switch.
    pub fn new(
        name: &'static str,
        mut drive: D,
        contact0: P,
        contact1: P,
    ) -> Result<Self, D::Error> {
        drive.set_high()?;
        let active_level = drive.is_set_high()?;

        Ok(Self {
            drive,
            contacts: [
                DigitalInput::new(InputName::contact(name, 0), contact0, active_level),
                DigitalInput::new(InputName::contact(name, 1), contact1, active_level),
            ],
            action: None,
        })
    }

    pub fn contacts(&self) -> &[DigitalInput<P>; 2] {
        &self.contacts
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// Bind `action` for both contacts, returning the previous binding.
    pub fn set_action(&mut self, action: Action) -> Option<Action> {
        self.action.replace(action)
    }

    /// Update contact 0, then contact 1.
    pub fn update<H: TransitionHandler>(&mut self, handler: &mut H) -> Result<(), P::Error> {
        for contact in &mut self.contacts {
            if let Some(state) = contact.sample()? {
                if let Some(action) = self.action {
                    handler.on_transition(contact.name(), action, state);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    use embedded_hal::digital::{ErrorType, OutputPin};

    use super::*;
    use crate::debounce::LogicalState::*;
    use crate::keymap::Slot;

    /// Shared-level line: the test holds one handle, the input the other.
    #[derive(Clone, Default)]
    pub struct MockLine(pub Rc<Cell<bool>>);

    impl MockLine {
        pub fn set(&self, level: bool) {
            self.0.set(level);
        }
    }

    impl ErrorType for MockLine {
        type Error = Infallible;
    }

    impl InputPin for MockLine {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.get())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0.get())
        }
    }

    impl OutputPin for MockLine {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.set(true);
            Ok(())
        }
    }

    impl StatefulOutputPin for MockLine {
        fn is_set_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.get())
        }

        fn is_set_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0.get())
        }
    }

    #[derive(Default)]
    pub struct Recorder(pub Vec<(String, Action, LogicalState)>);

    impl TransitionHandler for Recorder {
        fn on_transition(&mut self, source: InputName, action: Action, state: LogicalState) {
            self.0.push((source.to_string(), action, state));
        }
    }

    #[test]
    fn active_low_press_and_release_fires_four_transitions() {
        let line = MockLine::default();
        line.set(true);
        let mut input = DigitalInput::new(InputName::new("Red"), line.clone(), false);
        input.set_action(Action::SetMode(0));
        let mut recorder = Recorder::default();

        for level in [false, false, true, true] {
            line.set(level);
            input.update(&mut recorder).unwrap();
        }

        let states: Vec<_> = recorder.0.iter().map(|(_, _, s)| *s).collect();
        assert_eq!(states, [Pressing, Held, Releasing, Released]);
        assert!(recorder.0.iter().all(|(n, a, _)| n == "Red" && *a == Action::SetMode(0)));
    }

    #[test]
    fn unchanged_samples_are_silent() {
        let line = MockLine::default();
        let mut input = DigitalInput::new(InputName::new("Blue"), line.clone(), true);
        input.set_action(Action::SetMode(1));
        let mut recorder = Recorder::default();

        for _ in 0..5 {
            input.update(&mut recorder).unwrap();
        }
        assert_eq!(input.state(), Released);

        line.set(true);
        input.update(&mut recorder).unwrap();
        input.update(&mut recorder).unwrap();
        recorder.0.clear();
        for _ in 0..5 {
            input.update(&mut recorder).unwrap();
        }
        assert_eq!(input.state(), Held);
        assert!(recorder.0.is_empty());
    }

    #[test]
    fn set_action_replaces_previous() {
        let mut input = DigitalInput::new(InputName::new("Green"), MockLine::default(), true);
        assert_eq!(input.set_action(Action::SetMode(3)), None);
        assert_eq!(
            input.set_action(Action::InjectKey(Slot::Left)),
            Some(Action::SetMode(3))
        );
        assert_eq!(input.action(), Some(Action::InjectKey(Slot::Left)));
    }

    #[test]
    fn unbound_input_tracks_state_without_dispatch() {
        let line = MockLine::default();
        let mut input = DigitalInput::new(InputName::new("Yellow"), line.clone(), true);
        let mut recorder = Recorder::default();

        line.set(true);
        input.update(&mut recorder).unwrap();
        assert_eq!(input.state(), Pressing);
        assert!(recorder.0.is_empty());
    }

    #[test]
    fn jack_contacts_take_drive_level() {
        let drive = MockLine::default();
        let jack = JackSwitch::new("Left", drive.clone(), MockLine::default(), MockLine::default())
            .unwrap();

        assert!(drive.0.get());
        assert!(jack.contacts().iter().all(|c| c.active_level()));
        assert_eq!(jack.contacts()[0].name().to_string(), "Left 0");
        assert_eq!(jack.contacts()[1].name().to_string(), "Left 1");
    }

    #[test]
    fn jack_contacts_share_one_action_in_fixed_order() {
        let c0 = MockLine::default();
        let c1 = MockLine::default();
        let mut jack =
            JackSwitch::new("Right", MockLine::default(), c0.clone(), c1.clone()).unwrap();
        jack.set_action(Action::InjectKey(Slot::Right));
        let mut recorder = Recorder::default();

        c0.set(true);
        c1.set(true);
        jack.update(&mut recorder).unwrap();

        assert_eq!(
            recorder.0,
            [
                ("Right 0".to_string(), Action::InjectKey(Slot::Right), Pressing),
                ("Right 1".to_string(), Action::InjectKey(Slot::Right), Pressing),
            ]
        );
    }
}

//! Poll loop tying inputs, keymap and collaborators together.

use core::convert::Infallible;

use embedded_hal::digital::{InputPin, StatefulOutputPin};

use crate::dispatch::{Action, Dispatcher, KeyInjector, StatusDisplay};
use crate::input::{DigitalInput, JackSwitch};
use crate::keymap::{KeymapRegistry, Slot, MODES};

/// Number of jacks (left, right).
pub const JACKS: usize = 2;

/// Owns every input and the only mutable shared state, the keymap registry.
pub struct Engine<D, P, K, S> {
    selectors: [DigitalInput<P>; MODES],
    jacks: [JackSwitch<D, P>; JACKS],
    registry: KeymapRegistry,
    injector: K,
    display: S,
}

impl<D, P, K, S> Engine<D, P, K, S>
where
    D: StatefulOutputPin,
    P: InputPin,
    K: KeyInjector,
    S: StatusDisplay,
{
    /// Bind selector `i` to mode `i` and jack `i` to slot `i`, then activate
    /// mode 0 and publish its status under the first selector's name.
    pub fn new(
        mut selectors: [DigitalInput<P>; MODES],
        mut jacks: [JackSwitch<D, P>; JACKS],
        registry: KeymapRegistry,
        injector: K,
        display: S,
    ) -> Self {
        for (mode, selector) in selectors.iter_mut().enumerate() {
            selector.set_action(Action::SetMode(mode));
        }
        for (jack, slot) in jacks.iter_mut().zip(Slot::ALL) {
            jack.set_action(Action::InjectKey(slot));
        }

        let mut engine = Self {
            selectors,
            jacks,
            registry,
            injector,
            display,
        };

        let default_selector = engine.selectors[0].name();
        engine.dispatcher().set_mode(default_selector, 0);

        engine
    }

    fn dispatcher(&mut self) -> Dispatcher<'_, K, S> {
        Dispatcher::new(&mut self.registry, &mut self.injector, &mut self.display)
    }

    /// One iteration: every selector in order, then left and right jack.
    ///
    /// Mode changes made by a selector are visible to the jacks polled in
    /// the same iteration.
    pub fn poll(&mut self) -> Result<(), P::Error> {
        let mut dispatcher =
            Dispatcher::new(&mut self.registry, &mut self.injector, &mut self.display);

        for selector in &mut self.selectors {
            selector.update(&mut dispatcher)?;
        }
        for jack in &mut self.jacks {
            jack.update(&mut dispatcher)?;
        }

        Ok(())
    }

    /// Poll forever with no delay between iterations. Only returns if a line
    /// read fails.
    pub fn run(&mut self) -> Result<Infallible, P::Error> {
        loop {
            self.poll()?;
        }
    }

    pub fn registry(&self) -> &KeymapRegistry {
        &self.registry
    }

    pub fn injector(&self) -> &K {
        &self.injector
    }

    pub fn display(&self) -> &S {
        &self.display
    }

    pub fn selectors(&self) -> &[DigitalInput<P>; MODES] {
        &self.selectors
    }

    pub fn jacks(&self) -> &[JackSwitch<D, P>; JACKS] {
        &self.jacks
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use embedded_hal::digital::{Error, ErrorKind, ErrorType};

    use super::*;
    use crate::dispatch::tests::{KeyEvent, RecordingDisplay, RecordingInjector};
    use crate::input::tests::MockLine;
    use crate::input::InputName;
    use crate::keycode::Keycode;
    use crate::keymap::{KEYMAP, MODE_NAMES};

    type TestEngine = Engine<MockLine, MockLine, RecordingInjector, RecordingDisplay>;

    struct Rig {
        selectors: [MockLine; MODES],
        left: [MockLine; 2],
        engine: TestEngine,
    }

    fn rig() -> Rig {
        let selector_lines: [MockLine; MODES] = Default::default();
        // Active-low selectors idle high on their pull-ups.
        for line in &selector_lines {
            line.set(true);
        }
        let selectors = core::array::from_fn(|i| {
            DigitalInput::new(InputName::new(MODE_NAMES[i]), selector_lines[i].clone(), false)
        });

        let left: [MockLine; 2] = Default::default();
        let right: [MockLine; 2] = Default::default();
        let jacks = [
            JackSwitch::new("Left", MockLine::default(), left[0].clone(), left[1].clone())
                .unwrap(),
            JackSwitch::new("Right", MockLine::default(), right[0].clone(), right[1].clone())
                .unwrap(),
        ];

        Rig {
            selectors: selector_lines,
            left,
            engine: Engine::new(
                selectors,
                jacks,
                KeymapRegistry::new(KEYMAP),
                RecordingInjector::default(),
                RecordingDisplay::default(),
            ),
        }
    }

    #[test]
    fn startup_binds_inputs_and_publishes_default_mode() {
        let rig = rig();
        let engine = &rig.engine;

        assert_eq!(engine.registry().active_mode(), 0);
        assert_eq!(engine.display().0, ["Active Mode:\nRed\nKeymap:\n(F17, F18)"]);
        for (mode, selector) in engine.selectors().iter().enumerate() {
            assert_eq!(selector.action(), Some(Action::SetMode(mode)));
        }
        assert_eq!(engine.jacks()[0].action(), Some(Action::InjectKey(Slot::Left)));
        assert_eq!(engine.jacks()[1].action(), Some(Action::InjectKey(Slot::Right)));
    }

    #[test]
    fn jack_sees_mode_change_from_same_iteration() {
        let mut rig = rig();

        // Press Green for two polls, then release it while plugging the left jack.
        rig.selectors[3].set(false);
        rig.engine.poll().unwrap();
        rig.engine.poll().unwrap();
        rig.selectors[3].set(true);
        rig.left[1].set(true);
        rig.engine.poll().unwrap();

        assert_eq!(rig.engine.registry().active_mode(), 3);
        assert_eq!(rig.engine.injector().0, [KeyEvent::Press(Keycode::F23)]);
    }

    #[test]
    fn idle_polls_do_nothing() {
        let mut rig = rig();
        for _ in 0..10 {
            rig.engine.poll().unwrap();
        }
        assert!(rig.engine.injector().0.is_empty());
        assert_eq!(rig.engine.display().0.len(), 1);
    }

    #[derive(Debug, PartialEq)]
    struct ReadFault;

    impl Error for ReadFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Line that fails once the shared read budget runs out.
    #[derive(Clone)]
    struct FlakyLine(Rc<Cell<u32>>);

    impl ErrorType for FlakyLine {
        type Error = ReadFault;
    }

    impl InputPin for FlakyLine {
        fn is_high(&mut self) -> Result<bool, ReadFault> {
            match self.0.get() {
                0 => Err(ReadFault),
                left => {
                    self.0.set(left - 1);
                    Ok(false)
                }
            }
        }

        fn is_low(&mut self) -> Result<bool, ReadFault> {
            self.is_high().map(|high| !high)
        }
    }

    #[test]
    fn run_stops_on_line_fault() {
        let budget = Rc::new(Cell::new(20));
        let line = FlakyLine(Rc::clone(&budget));
        let selectors = core::array::from_fn(|i| {
            DigitalInput::new(InputName::new(MODE_NAMES[i]), line.clone(), true)
        });
        let jack = |name| {
            JackSwitch::new(name, MockLine::default(), line.clone(), line.clone()).unwrap()
        };
        let mut engine = Engine::new(
            selectors,
            [jack("Left"), jack("Right")],
            KeymapRegistry::new(KEYMAP),
            RecordingInjector::default(),
            RecordingDisplay::default(),
        );

        assert_eq!(engine.run().err(), Some(ReadFault));
        assert_eq!(budget.get(), 0);
        assert!(engine.injector().0.is_empty());
    }
}

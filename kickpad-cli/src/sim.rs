//! Host-side board simulation: scripted line levels fed through the real
//! engine, with every key event and status update recorded.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::fmt;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use kickpad_core::input::InputName;
use kickpad_core::{
    DigitalInput, Engine, JackSwitch, KeyInjector, Keycode, KeymapEntry, KeymapRegistry,
    ModeStatus, StatusDisplay, KEYMAP, MODES, MODE_NAMES,
};
use log::debug;
use serde::Deserialize;

/// Scenario file: a list of polls, each naming the inputs held down.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(rename = "poll", default)]
    pub polls: Vec<Poll>,
}

#[derive(Debug, Deserialize)]
pub struct Poll {
    /// Inputs physically active during this poll, e.g. `"Blue"`, `"Left 0"`.
    #[serde(default)]
    pub active: Vec<String>,
    /// Number of consecutive polls with this input set.
    #[serde(default = "default_repeat")]
    pub repeat: usize,
}

fn default_repeat() -> usize {
    1
}

impl Scenario {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("parsing scenario TOML")
    }
}

/// Something the engine did, stamped with the poll it happened in
/// (poll 0 is startup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub poll: usize,
    pub output: Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Press(Keycode),
    Release(Keycode),
    Status { selector: String, mode: usize, entry: KeymapEntry },
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Press(code) => write!(f, "press   {}", code.display_name()),
            Output::Release(code) => write!(f, "release {}", code.display_name()),
            Output::Status {
                selector,
                mode,
                entry,
            } => write!(
                f,
                "mode    {} ({}) -> ({}, {})",
                selector,
                mode,
                entry.0.display_name(),
                entry.1.display_name()
            ),
        }
    }
}

/// Line whose level is shared with the simulated board.
#[derive(Clone, Default)]
struct SimLine(Rc<Cell<bool>>);

impl ErrorType for SimLine {
    type Error = Infallible;
}

impl InputPin for SimLine {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

impl OutputPin for SimLine {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

impl StatefulOutputPin for SimLine {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

type Log = Rc<RefCell<Vec<Output>>>;

struct LogInjector(Log);

impl KeyInjector for LogInjector {
    fn press(&mut self, code: Keycode) {
        self.0.borrow_mut().push(Output::Press(code));
    }

    fn release(&mut self, code: Keycode) {
        self.0.borrow_mut().push(Output::Release(code));
    }
}

struct LogDisplay(Log);

impl StatusDisplay for LogDisplay {
    fn show(&mut self, status: &ModeStatus) {
        self.0.borrow_mut().push(Output::Status {
            selector: status.selector.to_string(),
            mode: status.mode,
            entry: status.entry,
        });
    }
}

/// A named input line and the level that means "pressed".
struct Probe {
    name: String,
    line: SimLine,
    active_level: bool,
}

/// The pad with simulated lines, wired like the real board.
pub struct Board {
    probes: Vec<Probe>,
    log: Log,
    engine: Engine<SimLine, SimLine, LogInjector, LogDisplay>,
    polls: usize,
    records: Vec<Record>,
}

impl Board {
    pub fn new() -> Self {
        let log = Log::default();
        let mut probes = Vec::new();

        // Mode buttons are active low on pull-ups.
        let selectors: [DigitalInput<SimLine>; MODES] = std::array::from_fn(|i| {
            let line = SimLine::default();
            line.0.set(true);
            probes.push(Probe {
                name: MODE_NAMES[i].to_string(),
                line: line.clone(),
                active_level: false,
            });
            DigitalInput::new(InputName::new(MODE_NAMES[i]), line, false)
        });

        let jacks = ["Left", "Right"].map(|name| {
            let contacts = [SimLine::default(), SimLine::default()];
            let jack = match JackSwitch::new(
                name,
                SimLine::default(),
                contacts[0].clone(),
                contacts[1].clone(),
            ) {
                Ok(jack) => jack,
                Err(never) => match never {},
            };
            for (contact, line) in jack.contacts().iter().zip(contacts) {
                probes.push(Probe {
                    name: contact.name().to_string(),
                    line,
                    active_level: contact.active_level(),
                });
            }
            jack
        });

        let engine = Engine::new(
            selectors,
            jacks,
            KeymapRegistry::new(KEYMAP),
            LogInjector(Rc::clone(&log)),
            LogDisplay(Rc::clone(&log)),
        );

        let mut board = Self {
            probes,
            log,
            engine,
            polls: 0,
            records: Vec::new(),
        };
        board.collect();
        board
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.probes.iter().map(|p| p.name.as_str())
    }

    /// Set every line so exactly the named inputs read as pressed.
    pub fn set_active(&mut self, active: &[String]) -> Result<()> {
        for name in active {
            if !self.probes.iter().any(|p| p.name == *name) {
                bail!(
                    "unknown input `{}` (expected one of: {})",
                    name,
                    self.input_names().collect::<Vec<_>>().join(", ")
                );
            }
        }
        for probe in &self.probes {
            let pressed = active.iter().any(|n| *n == probe.name);
            probe.line.0.set(pressed == probe.active_level);
        }
        Ok(())
    }

    pub fn poll(&mut self) {
        self.polls += 1;
        match self.engine.poll() {
            Ok(()) => {}
            Err(never) => match never {},
        }
        self.collect();
    }

    pub fn active_mode(&self) -> usize {
        self.engine.registry().active_mode()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn collect(&mut self) {
        let poll = self.polls;
        for output in self.log.borrow_mut().drain(..) {
            debug!("poll {}: {}", poll, output);
            self.records.push(Record { poll, output });
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `scenario` on a fresh board.
pub fn run(scenario: &Scenario) -> Result<Board> {
    let mut board = Board::new();
    for (index, step) in scenario.polls.iter().enumerate() {
        board
            .set_active(&step.active)
            .with_context(|| format!("poll entry {}", index + 1))?;
        for _ in 0..step.repeat {
            board.poll();
        }
    }
    Ok(board)
}

//! Mode indicator on the Teensy's on-board LED.

use embedded_hal::digital::OutputPin;
use kickpad_core::{ModeStatus, StatusDisplay};

use crate::gpio::{infallible, Line};

/// LED lit while any mode other than the default is active.
pub struct LedStatus<'a> {
    led: Line<'a>,
}

impl<'a> LedStatus<'a> {
    pub fn new(led: Line<'a>) -> Self {
        Self { led }
    }
}

impl StatusDisplay for LedStatus<'_> {
    fn show(&mut self, status: &ModeStatus) {
        if status.mode == 0 {
            infallible(self.led.set_low());
        } else {
            infallible(self.led.set_high());
        }
    }
}

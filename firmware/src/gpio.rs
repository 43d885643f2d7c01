//! Single GPIO lines on the ATmega32U4, exposed through `embedded-hal`.
//!
//! Pin map on Teensy 2.0:
//!   Mode buttons (inputs w/ pull-up, active low): PB0 Red, PB1 Blue,
//!     PB2 Yellow, PB3 Green
//!   Left jack:  drive PF0, contacts PF1, PF4
//!   Right jack: drive PF5, contacts PF6, PF7
//!   (jack contacts need external pull-downs; the AVR only has pull-ups)
//!   Status LED: PD6

use core::convert::Infallible;

use avr_device::atmega32u4::Peripherals;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

#[derive(Copy, Clone)]
pub enum Port {
    B,
    D,
    F,
}

#[derive(Copy, Clone)]
pub enum Pull {
    Up,
    Floating,
}

/// One bit of one port.
pub struct Line<'a> {
    dp: &'a Peripherals,
    port: Port,
    mask: u8,
}

impl<'a> Line<'a> {
    pub fn input(dp: &'a Peripherals, port: Port, bit: u8, pull: Pull) -> Self {
        let line = Self {
            dp,
            port,
            mask: 1 << bit,
        };
        line.write_ddr(false);
        // With DDR cleared, PORT selects the pull-up.
        line.write_port(matches!(pull, Pull::Up));
        line
    }

    /// Output, initially driven low.
    pub fn output(dp: &'a Peripherals, port: Port, bit: u8) -> Self {
        let line = Self {
            dp,
            port,
            mask: 1 << bit,
        };
        line.write_port(false);
        line.write_ddr(true);
        line
    }

    fn write_ddr(&self, set: bool) {
        let mask = self.mask;
        match self.port {
            Port::B => self
                .dp
                .PORTB
                .ddrb
                .modify(|r, w| unsafe { w.bits(apply(r.bits(), mask, set)) }),
            Port::D => self
                .dp
                .PORTD
                .ddrd
                .modify(|r, w| unsafe { w.bits(apply(r.bits(), mask, set)) }),
            Port::F => self
                .dp
                .PORTF
                .ddrf
                .modify(|r, w| unsafe { w.bits(apply(r.bits(), mask, set)) }),
        }
    }

    fn write_port(&self, set: bool) {
        let mask = self.mask;
        match self.port {
            Port::B => self
                .dp
                .PORTB
                .portb
                .modify(|r, w| unsafe { w.bits(apply(r.bits(), mask, set)) }),
            Port::D => self
                .dp
                .PORTD
                .portd
                .modify(|r, w| unsafe { w.bits(apply(r.bits(), mask, set)) }),
            Port::F => self
                .dp
                .PORTF
                .portf
                .modify(|r, w| unsafe { w.bits(apply(r.bits(), mask, set)) }),
        }
    }

    fn pin_bits(&self) -> u8 {
        match self.port {
            Port::B => self.dp.PORTB.pinb.read().bits(),
            Port::D => self.dp.PORTD.pind.read().bits(),
            Port::F => self.dp.PORTF.pinf.read().bits(),
        }
    }

    fn port_bits(&self) -> u8 {
        match self.port {
            Port::B => self.dp.PORTB.portb.read().bits(),
            Port::D => self.dp.PORTD.portd.read().bits(),
            Port::F => self.dp.PORTF.portf.read().bits(),
        }
    }
}

fn apply(bits: u8, mask: u8, set: bool) -> u8 {
    if set {
        bits | mask
    } else {
        bits & !mask
    }
}

/// Unwrap a result that cannot fail.
pub fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

impl ErrorType for Line<'_> {
    type Error = Infallible;
}

impl InputPin for Line<'_> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.pin_bits() & self.mask != 0)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.pin_bits() & self.mask == 0)
    }
}

impl OutputPin for Line<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.write_port(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.write_port(true);
        Ok(())
    }
}

impl StatefulOutputPin for Line<'_> {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.port_bits() & self.mask != 0)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.port_bits() & self.mask == 0)
    }
}

//! Kickpad firmware for ATmega32U4 (Teensy 2.0).
//!
//! Four mode buttons pick one of the keymap entries; two dual-contact jacks
//! press and release the left/right code of the active entry over USB HID.
//! All input handling lives in `kickpad-core`; this crate wires it to the
//! board's pins, the USB controller and the on-board LED.

#![no_std]
#![no_main]

mod gpio;
mod hid;
mod status;

use avr_device::atmega32u4::Peripherals;
use kickpad_core::input::InputName;
use kickpad_core::{
    DigitalInput, Engine, JackSwitch, KeyboardReport, KeymapRegistry, KEYMAP, MODES, MODE_NAMES,
};

use gpio::{infallible, Line, Port, Pull};
use hid::UsbKeyboard;
use status::LedStatus;

/// Mode button pins, in mode order.
const SELECTOR_PINS: [(Port, u8); MODES] =
    [(Port::B, 0), (Port::B, 1), (Port::B, 2), (Port::B, 3)];

/// (drive, contact 0, contact 1) per jack.
const LEFT_JACK_PINS: [(Port, u8); 3] = [(Port::F, 0), (Port::F, 1), (Port::F, 4)];
const RIGHT_JACK_PINS: [(Port, u8); 3] = [(Port::F, 5), (Port::F, 6), (Port::F, 7)];

const LED_PIN: (Port, u8) = (Port::D, 6);

/// Panic handler: invalid input state or any other fault halts here.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

fn jack<'a>(
    dp: &'a Peripherals,
    name: &'static str,
    pins: [(Port, u8); 3],
) -> JackSwitch<Line<'a>, Line<'a>> {
    let [(drive_port, drive_bit), (c0_port, c0_bit), (c1_port, c1_bit)] = pins;
    infallible(JackSwitch::new(
        name,
        Line::output(dp, drive_port, drive_bit),
        Line::input(dp, c0_port, c0_bit, Pull::Floating),
        Line::input(dp, c1_port, c1_bit, Pull::Floating),
    ))
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Disable clock prescaler (CLKPR): run at the full 16MHz
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    let led = Line::output(&dp, LED_PIN.0, LED_PIN.1);

    // Active low: pull-ups hold the buttons high until pressed.
    let selectors = core::array::from_fn(|i| {
        let (port, bit) = SELECTOR_PINS[i];
        DigitalInput::new(
            InputName::new(MODE_NAMES[i]),
            Line::input(&dp, port, bit, Pull::Up),
            false,
        )
    });
    let jacks = [
        jack(&dp, "Left", LEFT_JACK_PINS),
        jack(&dp, "Right", RIGHT_JACK_PINS),
    ];

    let mut usb = UsbKeyboard::new();
    usb.init(&dp);

    let mut engine = Engine::new(
        selectors,
        jacks,
        KeymapRegistry::new(KEYMAP),
        KeyboardReport::empty(),
        LedStatus::new(led),
    );

    // No delay between iterations: debounce timing is the poll rate.
    loop {
        usb.poll(&dp);
        infallible(engine.poll());
        usb.send_report(&dp, engine.injector());
    }
}

//! USB HID keyboard transport for the ATmega32U4.
//!
//! The engine edits a [`KeyboardReport`]; this driver enumerates as a boot
//! keyboard and pushes the report on EP1 whenever it changes. Direct register
//! access via avr-device.

use avr_device::atmega32u4::Peripherals;
use kickpad_core::KeyboardReport;

const EP0_SIZE: u8 = 64; // Control endpoint size
const EP1_SIZE: u8 = 8; // Interrupt IN endpoint size (one report)

/// Boot-protocol keyboard report descriptor.
static HID_REPORT_DESCRIPTOR: [u8; 64] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    // Modifier keys (8 bits)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224) - LCtrl
    0x29, 0xE7, //   Usage Maximum (231) - RGui
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    // Reserved byte
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    // LEDs (5 bits)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x05, //   Usage Maximum (5)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    // LED padding (3 bits)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    // Keycodes (6 bytes); F13-F24 live above 0x65, so the range is full
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
];

static DEVICE_DESCRIPTOR: [u8; 18] = [
    18,         // bLength
    1,          // bDescriptorType (Device)
    0x00, 0x02, // bcdUSB (2.0)
    0,          // bDeviceClass (per interface)
    0,          // bDeviceSubClass
    0,          // bDeviceProtocol
    EP0_SIZE,   // bMaxPacketSize0
    0xC0, 0x16, // idVendor (0x16C0, shared V-USB range)
    0xDB, 0x27, // idProduct (0x27DB, shared HID keyboard)
    0x01, 0x00, // bcdDevice (1.0)
    1,          // iManufacturer
    2,          // iProduct
    0,          // iSerialNumber
    1,          // bNumConfigurations
];

static CONFIG_DESCRIPTOR: [u8; 34] = [
    // Configuration
    9, 2, // bLength, bDescriptorType
    34, 0, // wTotalLength
    1,    // bNumInterfaces
    1,    // bConfigurationValue
    0,    // iConfiguration
    0x80, // bmAttributes (bus powered)
    50,   // bMaxPower (100mA)
    // Interface: HID, boot keyboard
    9, 4, // bLength, bDescriptorType
    0,    // bInterfaceNumber
    0,    // bAlternateSetting
    1,    // bNumEndpoints
    3,    // bInterfaceClass (HID)
    1,    // bInterfaceSubClass (Boot)
    1,    // bInterfaceProtocol (Keyboard)
    0,    // iInterface
    // HID
    9, 0x21, // bLength, bDescriptorType
    0x11, 0x01, // bcdHID (1.11)
    0,    // bCountryCode
    1,    // bNumDescriptors
    0x22, // bDescriptorType (Report)
    HID_REPORT_DESCRIPTOR.len() as u8, 0, // wDescriptorLength
    // Endpoint: EP1 IN, interrupt
    7, 5, // bLength, bDescriptorType
    0x81, // bEndpointAddress
    0x03, // bmAttributes (Interrupt)
    EP1_SIZE, 0, // wMaxPacketSize
    1,    // bInterval (1ms; the pad polls without delay)
];

/// String descriptor 0: English (US)
static STRING_LANG: [u8; 4] = [4, 3, 0x09, 0x04];

/// String descriptor 1 (manufacturer): "Kickpad"
static STRING_MANUFACTURER: [u8; 16] = [
    16, 3, // bLength, bDescriptorType
    b'K', 0, b'i', 0, b'c', 0, b'k', 0, b'p', 0, b'a', 0, b'd', 0,
];

/// String descriptor 2 (product): "Pedal"
static STRING_PRODUCT: [u8; 12] = [
    12, 3, // bLength, bDescriptorType
    b'P', 0, b'e', 0, b'd', 0, b'a', 0, b'l', 0,
];

// Standard and HID class requests, keyed by (bmRequestType, bRequest).
const GET_DESCRIPTOR: (u8, u8) = (0x80, 0x06);
const SET_ADDRESS: (u8, u8) = (0x00, 0x05);
const SET_CONFIGURATION: (u8, u8) = (0x00, 0x09);
const GET_CONFIGURATION: (u8, u8) = (0x80, 0x08);
const GET_INTERFACE_DESCRIPTOR: (u8, u8) = (0x81, 0x06);
const HID_SET_IDLE: (u8, u8) = (0x21, 0x0A);
const HID_SET_PROTOCOL: (u8, u8) = (0x21, 0x0B);

/// USB device state.
pub struct UsbKeyboard {
    configured: bool,
    last_report: KeyboardReport,
}

impl UsbKeyboard {
    pub const fn new() -> Self {
        Self {
            configured: false,
            last_report: KeyboardReport::empty(),
        }
    }

    /// Bring up the PLL and USB controller and attach to the bus.
    pub fn init(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        usb.uhwcon.write(|w| w.uvrege().set_bit());
        usb.usbcon.write(|w| w.usbe().set_bit().otgpade().set_bit());

        // 16MHz crystal -> 96MHz PLL -> 48MHz USB clock
        dp.PLL.pllcsr.write(|w| w.pindiv().set_bit().plle().set_bit());
        while dp.PLL.pllcsr.read().plock().bit_is_clear() {}

        usb.usbcon.modify(|_, w| w.frzclk().clear_bit());
        usb.udcon.modify(|_, w| w.detach().clear_bit());
        usb.udien.write(|w| w.eorste().set_bit());

        self.configured = false;
    }

    /// Service bus resets and control transfers. Call every loop iteration.
    pub fn poll(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        if usb.udint.read().eorsti().bit_is_set() {
            usb.udint.modify(|_, w| w.eorsti().clear_bit());
            self.configure_ep0(dp);
            self.configured = false;
        }

        select_endpoint(dp, 0);
        if usb.ueintx.read().rxstpi().bit_is_set() {
            self.handle_setup(dp);
        }
    }

    /// Queue `report` on EP1 if it differs from the last one sent.
    ///
    /// Reports are dropped while unconfigured or if the endpoint stays busy.
    pub fn send_report(&mut self, dp: &Peripherals, report: &KeyboardReport) {
        if !self.configured || *report == self.last_report {
            return;
        }

        let usb = &dp.USB_DEVICE;
        select_endpoint(dp, 1);

        let mut timeout: u16 = 0xFFFF;
        while usb.ueintx.read().rwal().bit_is_clear() {
            timeout = timeout.wrapping_sub(1);
            if timeout == 0 {
                return;
            }
        }

        for byte in report.as_bytes() {
            usb.uedatx.write(|w| w.bits(byte));
        }
        usb.ueintx
            .modify(|_, w| w.fifocon().clear_bit().txini().clear_bit());

        self.last_report = *report;
    }

    fn configure_ep0(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        select_endpoint(dp, 0);
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b00));
        usb.uecfg1x.write(|w| w.epsize().bits(0b011).alloc().set_bit());
    }

    fn configure_ep1(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        select_endpoint(dp, 1);
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b11).epdir().set_bit());
        usb.uecfg1x.write(|w| w.epsize().bits(0b000).alloc().set_bit());
    }

    fn handle_setup(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        let mut setup = [0u8; 8];
        for byte in &mut setup {
            *byte = usb.uedatx.read().bits();
        }
        usb.ueintx.modify(|_, w| w.rxstpi().clear_bit());

        let request = (setup[0], setup[1]);
        let (value_l, value_h) = (setup[2], setup[3]);
        let length = u16::from_le_bytes([setup[6], setup[7]]);

        match request {
            GET_DESCRIPTOR => {
                let descriptor: Option<&[u8]> = match (value_h, value_l) {
                    (1, _) => Some(&DEVICE_DESCRIPTOR),
                    (2, _) => Some(&CONFIG_DESCRIPTOR),
                    (3, 0) => Some(&STRING_LANG),
                    (3, 1) => Some(&STRING_MANUFACTURER),
                    (3, 2) => Some(&STRING_PRODUCT),
                    _ => None,
                };
                match descriptor {
                    Some(desc) => send_descriptor(dp, desc, length),
                    None => stall(dp),
                }
            }
            SET_ADDRESS => {
                // Status stage must finish before the new address applies.
                send_zlp(dp);
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.udaddr
                    .write(|w| w.uadd().bits(value_l & 0x7F).adden().set_bit());
            }
            SET_CONFIGURATION => {
                send_zlp(dp);
                self.configure_ep1(dp);
                self.configured = true;
            }
            GET_CONFIGURATION => {
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.uedatx.write(|w| w.bits(self.configured as u8));
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }
            GET_INTERFACE_DESCRIPTOR if value_h == 0x22 => {
                send_descriptor(dp, &HID_REPORT_DESCRIPTOR, length)
            }
            HID_SET_IDLE | HID_SET_PROTOCOL => send_zlp(dp),
            _ => stall(dp),
        }
    }
}

fn select_endpoint(dp: &Peripherals, ep: u8) {
    dp.USB_DEVICE.uenum.write(|w| w.bits(ep & 0x07));
}

fn send_zlp(dp: &Peripherals) {
    dp.USB_DEVICE.ueintx.modify(|_, w| w.txini().clear_bit());
}

fn send_descriptor(dp: &Peripherals, desc: &[u8], max_length: u16) {
    let usb = &dp.USB_DEVICE;
    let len = core::cmp::min(desc.len(), max_length as usize);

    for chunk in desc[..len].chunks(EP0_SIZE as usize) {
        while usb.ueintx.read().txini().bit_is_clear() {}
        for &byte in chunk {
            usb.uedatx.write(|w| w.bits(byte));
        }
        usb.ueintx.modify(|_, w| w.txini().clear_bit());
    }

    // Status stage: host answers with a ZLP.
    while usb.ueintx.read().rxouti().bit_is_clear() {}
    usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
}

fn stall(dp: &Peripherals) {
    dp.USB_DEVICE.ueconx.modify(|_, w| w.stallrq().set_bit());
}

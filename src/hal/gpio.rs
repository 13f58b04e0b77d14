//! PORTx pins used by the bootloader: status LED, operator switch, and the
//! receive-line start-bit detector.

use core::convert::Infallible;

use avr_device::atmega4809::porta::RegisterBlock;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use super::LineActivity;

// PINnCTRL
const PINCTRL_OFFSET: usize = 0x10;
const PULLUPEN: u8 = 0x08;
const ISC_FALLING: u8 = 0x03;

/// One pin of a PORTx block
pub struct PortPin {
    port: *const RegisterBlock,
    mask: u8,
    pin: u8,
}

impl PortPin {
    pub const fn new(port: *const RegisterBlock, pin: u8) -> Self {
        Self {
            port,
            mask: 1 << pin,
            pin,
        }
    }

    fn regs(&self) -> &RegisterBlock {
        unsafe { &*self.port }
    }

    fn set_pinctrl(&self, value: u8) {
        let pinctrl = (self.port as *mut u8).wrapping_add(PINCTRL_OFFSET + self.pin as usize);
        unsafe { core::ptr::write_volatile(pinctrl, value) };
    }

    pub fn make_output(&self) {
        self.regs().dirset.write(|w| unsafe { w.bits(self.mask) });
    }

    fn is_high(&self) -> bool {
        self.regs().in_.read().bits() & self.mask != 0
    }
}

pub struct Led(PortPin);

impl Led {
    pub fn new(port: *const RegisterBlock, pin: u8) -> Self {
        let pin = PortPin::new(port, pin);
        pin.make_output();
        Self(pin)
    }
}

impl OutputPin for Led {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.regs().outclr.write(|w| unsafe { w.bits(self.0.mask) });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.regs().outset.write(|w| unsafe { w.bits(self.0.mask) });
        Ok(())
    }
}

/// Input with pull-up; pressed pulls the line low.
pub struct Switch(PortPin);

impl Switch {
    pub fn new(port: *const RegisterBlock, pin: u8) -> Self {
        let pin = PortPin::new(port, pin);
        pin.set_pinctrl(PULLUPEN);
        Self(pin)
    }
}

impl InputPin for Switch {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.0.is_high())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.0.is_high())
    }
}

/// Falling-edge sense on the RX pin. The USART keeps the data; this only
/// latches that a start bit went by.
pub struct RxSense(PortPin);

impl RxSense {
    pub fn new(port: *const RegisterBlock, pin: u8) -> Self {
        let pin = PortPin::new(port, pin);
        pin.set_pinctrl(PULLUPEN | ISC_FALLING);
        Self(pin)
    }
}

impl LineActivity for RxSense {
    fn take_activity(&mut self) -> bool {
        let regs = self.0.regs();
        let seen = regs.intflags.read().bits() & self.0.mask != 0;
        regs.intflags.write(|w| unsafe { w.bits(self.0.mask) });
        seen
    }
}

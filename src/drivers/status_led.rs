//! Operator status LED

use embedded_hal::digital::v2::OutputPin;

/// Active-low status LED: blinks while waiting for a sender, solid during
/// the transfer.
pub struct StatusLed<P: OutputPin> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Takes the pin and switches the LED off, whatever state it powered up in.
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, lit: true };
        led.set(false);
        led
    }

    pub fn on(&mut self) {
        self.set(true);
    }

    pub fn toggle(&mut self) {
        self.set(!self.lit);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn set(&mut self, lit: bool) {
        // A failed pin write only costs the operator a blink.
        let _ = if lit {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
        self.lit = lit;
    }

    pub fn release(self) -> P {
        self.pin
    }
}

//! Ping the host with 'C' until it starts sending.

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial::{Read, Write};

use crate::drivers::StatusLed;
use crate::hal::LineActivity;
use crate::protocol::{Control, Error, Result, Transport};

/// The sender may not be listening yet when we come up, so the ping is
/// repeated about once a second (spin count derived from the CPU clock)
/// until a start bit shows up on the receive line. The ping only wakes the
/// sender; the byte that tripped the detector stays in the UART for the
/// frame reader.
pub struct Handshake {
    spins: u32,
}

impl Handshake {
    pub const fn new(spins: u32) -> Self {
        Self { spins }
    }

    /// Returns the number of pings sent. Without a sender this never
    /// returns unless `cancel` says so.
    pub fn run<S, E, P, A, C>(
        &self,
        transport: &mut Transport<S>,
        led: &mut StatusLed<P>,
        activity: &mut A,
        cancel: &mut C,
    ) -> Result<u32, E>
    where
        S: Read<u8, Error = E> + Write<u8, Error = E>,
        P: OutputPin,
        A: LineActivity,
        C: FnMut() -> bool,
    {
        let mut pings = 0u32;
        loop {
            if cancel() {
                return Err(Error::Cancelled);
            }

            led.toggle();
            transport.send(Control::Ping)?;
            pings = pings.wrapping_add(1);

            let mut spins = self.spins;
            loop {
                if activity.take_activity() {
                    return Ok(pings);
                }
                if spins == 0 {
                    break;
                }
                spins -= 1;
            }
        }
    }
}

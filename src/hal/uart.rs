//! Polled USART driver (no interrupts, no buffering)

use core::ops::Deref;

use avr_device::atmega4809::usart0::RegisterBlock;
use embedded_hal::serial;

// STATUS
const RXCIF: u8 = 0x80;
const DREIF: u8 = 0x20;
// CTRLB
const RXEN: u8 = 0x80;
const TXEN: u8 = 0x40;
// RXDATAH
const BUFOVF: u8 = 0x40;
const FERR: u8 = 0x04;
const PERR: u8 = 0x02;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    Overrun,
    Framing,
    Parity,
}

/// Works for every USART instance; they share one register layout.
pub struct Usart<U> {
    regs: U,
}

impl<U: Deref<Target = RegisterBlock>> Usart<U> {
    /// 8N1, receiver and transmitter enabled. The TX pin direction is the
    /// caller's job.
    pub fn new(regs: U, baud_reg: u16) -> Self {
        regs.baud.write(|w| unsafe { w.bits(baud_reg) });
        regs.ctrlb.write(|w| unsafe { w.bits(RXEN | TXEN) });
        Self { regs }
    }
}

impl<U: Deref<Target = RegisterBlock>> serial::Read<u8> for Usart<U> {
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Error> {
        if self.regs.status.read().bits() & RXCIF == 0 {
            return Err(nb::Error::WouldBlock);
        }
        // RXDATAH has to be read before RXDATAL pops the FIFO.
        let flags = self.regs.rxdatah.read().bits();
        let byte = self.regs.rxdatal.read().bits();

        if flags & BUFOVF != 0 {
            Err(nb::Error::Other(Error::Overrun))
        } else if flags & FERR != 0 {
            Err(nb::Error::Other(Error::Framing))
        } else if flags & PERR != 0 {
            Err(nb::Error::Other(Error::Parity))
        } else {
            Ok(byte)
        }
    }
}

impl<U: Deref<Target = RegisterBlock>> serial::Write<u8> for Usart<U> {
    type Error = Error;

    fn write(&mut self, byte: u8) -> nb::Result<(), Error> {
        if self.regs.status.read().bits() & DREIF == 0 {
            return Err(nb::Error::WouldBlock);
        }
        self.regs.txdatal.write(|w| unsafe { w.bits(byte) });
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Error> {
        if self.regs.status.read().bits() & DREIF == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    }
}

impl<U: Deref<Target = RegisterBlock>> ufmt::uWrite for Usart<U> {
    type Error = Error;

    fn write_str(&mut self, s: &str) -> Result<(), Error> {
        for byte in s.bytes() {
            nb::block!(serial::Write::write(self, byte))?;
        }
        Ok(())
    }
}

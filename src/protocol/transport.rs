//! Blocking byte transport over an `embedded-hal` serial port

use embedded_hal::serial::{Read, Write};

use super::{Control, Error, Result};

pub struct Transport<S> {
    serial: S,
}

impl<S, E> Transport<S>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
{
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    /// Spin until a byte arrives. Line errors are handed back raw so the
    /// frame reader can decide what they mean.
    pub fn read_byte(&mut self) -> core::result::Result<u8, E> {
        nb::block!(self.serial.read())
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), E> {
        nb::block!(self.serial.write(byte)).map_err(Error::Transport)
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), E> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    pub fn send(&mut self, control: Control) -> Result<(), E> {
        self.write_byte(control.byte())
    }

    pub fn release(self) -> S {
        self.serial
    }
}

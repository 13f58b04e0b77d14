//! Host-side stand-ins for the hardware, used by the unit tests

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;

use crate::config::PROGMEM_START;
use crate::hal::{LineActivity, Nvm, NvmCommand};
use crate::protocol::crc;
use crate::protocol::{BLOCK_SIZE, FRAME_SIZE};

/// Data space with flash-like commit behaviour: erase sets bytes to 0xFF,
/// writing can only clear bits. Program memory erases whole pages, EEPROM
/// erases just the loaded bytes (AVR0 semantics).
pub struct SimNvm<const PAGE: u16> {
    mem: Vec<u8>,
    buffer: Vec<(u16, u8)>,
    commits: Vec<(NvmCommand, u16)>,
    corrupt: Option<u16>,
    fail_next: bool,
    error: bool,
}

impl<const PAGE: u16> SimNvm<PAGE> {
    pub fn new() -> Self {
        Self {
            mem: vec![0xFF; 0x1_0000],
            buffer: Vec::new(),
            commits: Vec::new(),
            corrupt: None,
            fail_next: false,
            error: false,
        }
    }

    /// Set memory directly, bypassing the controller.
    pub fn poke(&mut self, address: u16, data: &[u8]) {
        let start = address as usize;
        self.mem[start..start + data.len()].copy_from_slice(data);
    }

    pub fn slice(&self, address: u16, len: usize) -> &[u8] {
        let start = address as usize;
        &self.mem[start..start + len]
    }

    /// Successful page commits as (command, first buffered address)
    pub fn commits(&self) -> &[(NvmCommand, u16)] {
        &self.commits
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Flip a bit at `address` the next time a commit writes it.
    pub fn corrupt_once(&mut self, address: u16) {
        self.corrupt = Some(address);
    }

    pub fn fail_next_commit(&mut self) {
        self.fail_next = true;
    }

    fn program(&mut self, erase: bool) {
        if erase {
            for &(address, _) in &self.buffer {
                if address >= PROGMEM_START {
                    let page = (address - PROGMEM_START) / PAGE * PAGE + PROGMEM_START;
                    let start = page as usize;
                    self.mem[start..start + PAGE as usize].fill(0xFF);
                } else {
                    self.mem[address as usize] = 0xFF;
                }
            }
        }
        for &(address, byte) in &self.buffer {
            self.mem[address as usize] &= byte;
        }
        if let Some(address) = self.corrupt {
            if self.buffer.iter().any(|&(at, _)| at == address) {
                self.mem[address as usize] ^= 0x01;
                self.corrupt = None;
            }
        }
    }
}

impl<const PAGE: u16> Default for SimNvm<PAGE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PAGE: u16> Nvm for SimNvm<PAGE> {
    const PAGE_SIZE: u16 = PAGE;

    fn read(&self, address: u16) -> u8 {
        self.mem[address as usize]
    }

    fn load(&mut self, address: u16, byte: u8) {
        self.buffer.retain(|&(at, _)| at != address);
        self.buffer.push((address, byte));
    }

    fn execute(&mut self, command: NvmCommand) {
        self.error = false;
        if command == NvmCommand::ClearBuffer {
            self.buffer.clear();
            return;
        }
        if self.fail_next {
            self.fail_next = false;
            self.error = true;
            return;
        }

        let first = self.buffer.first().map(|&(at, _)| at).unwrap_or(0);
        self.program(command == NvmCommand::EraseWrite);
        self.commits.push((command, first));
        self.buffer.clear();
    }

    fn is_busy(&self) -> bool {
        false
    }

    fn write_error(&self) -> bool {
        self.error
    }
}

/// Scripted serial line. Reading past the script is a test bug and panics
/// rather than spinning forever.
pub struct Wire {
    incoming: VecDeque<u8>,
    pub sent: Vec<u8>,
}

impl Wire {
    pub fn new(incoming: &[u8]) -> Self {
        Self {
            incoming: incoming.iter().copied().collect(),
            sent: Vec::new(),
        }
    }
}

impl serial::Read<u8> for Wire {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        match self.incoming.pop_front() {
            Some(byte) => Ok(byte),
            None => panic!("wire script exhausted"),
        }
    }
}

impl serial::Write<u8> for Wire {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        self.sent.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        Ok(())
    }
}

/// Receive-line detector that fires on the n-th poll.
pub struct ActivityAfter {
    fire_at: Option<u32>,
    pub polls: u32,
}

impl ActivityAfter {
    pub fn new(polls: u32) -> Self {
        Self {
            fire_at: Some(polls),
            polls: 0,
        }
    }

    pub fn never() -> Self {
        Self {
            fire_at: None,
            polls: 0,
        }
    }
}

impl LineActivity for ActivityAfter {
    fn take_activity(&mut self) -> bool {
        self.polls += 1;
        self.fire_at == Some(self.polls)
    }
}

pub struct NullPin;

impl OutputPin for NullPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Default)]
pub struct Capture(pub String);

impl ufmt::uWrite for Capture {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        self.0.push_str(s);
        Ok(())
    }
}

/// 128 bytes counting up from `seed`
pub fn ramp(seed: u8) -> [u8; BLOCK_SIZE] {
    let mut payload = [0u8; BLOCK_SIZE];
    for (i, byte) in payload.iter_mut().enumerate() {
        *byte = seed.wrapping_add(i as u8);
    }
    payload
}

/// Encode a well-formed XMODEM-CRC frame.
pub fn frame(number: u8, payload: &[u8; BLOCK_SIZE]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_SIZE);
    out.extend_from_slice(&[0x01, number, 0xFF - number]);
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc::checksum(payload).to_be_bytes());
    out
}

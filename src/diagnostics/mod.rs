//! Post-update memory dump
//!
//! Each region goes out as one burst: address (LE16), length (LE16), then
//! the raw bytes. The host side uses it to check the flash image and to read
//! the device signature and fuses. Nothing is acknowledged.

use embedded_hal::serial::{Read, Write};

use crate::hal::Nvm;
use crate::protocol::{Result, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub start: u16,
    pub len: u16,
}

impl Region {
    pub const fn new(start: u16, len: u16) -> Self {
        Self { start, len }
    }

    pub fn header(&self) -> [u8; 4] {
        let [a0, a1] = self.start.to_le_bytes();
        let [l0, l1] = self.len.to_le_bytes();
        [a0, a1, l0, l1]
    }
}

pub fn dump<S, E, M>(transport: &mut Transport<S>, nvm: &M, region: Region) -> Result<(), E>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
    M: Nvm,
{
    transport.write_all(&region.header())?;
    for offset in 0..region.len {
        transport.write_byte(nvm.read(region.start.wrapping_add(offset)))?;
    }
    Ok(())
}

/// Dump every region in order. A failed region is skipped; the caller is
/// about to reset and must get there regardless.
pub fn dump_all<S, E, M>(transport: &mut Transport<S>, nvm: &M, regions: &[Region]) -> usize
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
    M: Nvm,
{
    regions
        .iter()
        .filter(|region| dump(transport, nvm, **region).is_ok())
        .count()
}

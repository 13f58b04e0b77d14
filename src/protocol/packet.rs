//! XMODEM-CRC block framing
//!
//! A block on the wire is `SOH, n, 255 - n, payload[128], crc_hi, crc_lo`.
//! Only one block is ever held in memory; a bad one is answered with NAK and
//! forgotten, and the sender is trusted to repeat it.

use embedded_hal::serial::{Read, Write};
use ufmt::uWrite;

use super::{crc, Control, Error, FrameError, Result, Transport};
use crate::logger::{Event, Logger};

pub const BLOCK_SIZE: usize = 128;
pub const FRAME_SIZE: usize = 3 + BLOCK_SIZE + 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub number: u8,
    pub payload: [u8; BLOCK_SIZE],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Block(Block),
    EndOfTransmission,
}

impl Block {
    /// Accept a frame body only if the number pair and the CRC trailer agree.
    pub fn validate(
        number: u8,
        complement: u8,
        payload: [u8; BLOCK_SIZE],
        trailer: u16,
    ) -> core::result::Result<Self, FrameError> {
        if number.wrapping_add(complement) != 0xFF {
            return Err(FrameError::Complement);
        }
        if crc::checksum(&payload) != trailer {
            return Err(FrameError::Crc);
        }
        Ok(Self { number, payload })
    }
}

/// Wait for the next valid block or the end-of-transmission marker.
///
/// Anything other than SOH or EOT in front of a frame is line noise and is
/// skipped. A block that fails validation is answered with a single NAK and
/// reception starts over; there is no retry limit. The caller owns the
/// ACK/NAK for blocks returned from here.
pub fn read_frame<S, E, W, C>(
    transport: &mut Transport<S>,
    log: &mut Logger<W>,
    cancel: &mut C,
) -> Result<Frame, E>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
    W: uWrite,
    C: FnMut() -> bool,
{
    loop {
        if cancel() {
            return Err(Error::Cancelled);
        }

        match transport.read_byte() {
            Ok(byte) if byte == Control::Eot.byte() => return Ok(Frame::EndOfTransmission),
            Ok(byte) if byte == Control::Soh.byte() => {}
            _ => continue,
        }

        match read_body(transport) {
            Ok(block) => return Ok(Frame::Block(block)),
            Err(err) => {
                log.error(Event::FrameRejected(err));
                transport.send(Control::Nak)?;
            }
        }
    }
}

// Everything after SOH. Always consumes the full frame length so a rejected
// block leaves the stream positioned at the sender's next byte.
fn read_body<S, E>(transport: &mut Transport<S>) -> core::result::Result<Block, FrameError>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
{
    let mut line_fault = false;
    let mut next = || match transport.read_byte() {
        Ok(byte) => byte,
        Err(_) => {
            line_fault = true;
            0
        }
    };

    let number = next();
    let complement = next();
    let mut payload = [0u8; BLOCK_SIZE];
    for byte in payload.iter_mut() {
        *byte = next();
    }
    let trailer = u16::from_be_bytes([next(), next()]);

    if line_fault {
        return Err(FrameError::Line);
    }
    Block::validate(number, complement, payload, trailer)
}

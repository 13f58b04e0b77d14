//! XMODEM-CRC receive side

pub mod crc;
pub mod packet;
pub mod transport;

pub use packet::{Block, Frame, BLOCK_SIZE, FRAME_SIZE};
pub use transport::Transport;

use crate::hal::NvmError;
use ufmt::derive::uDebug;

/// XMODEM control characters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Control {
    Soh = 0x01,
    Eot = 0x04,
    Ack = 0x06,
    Nak = 0x15,
    /// Receiver ready, CRC-16 mode ('C')
    Ping = 0x43,
}

impl Control {
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

/// Why a received block was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum FrameError {
    /// Block number and its complement do not sum to 255
    Complement,
    /// Trailer does not match the payload CRC
    Crc,
    /// The UART flagged an error inside the frame
    Line,
}

#[derive(Debug, PartialEq)]
pub enum Error<E> {
    Transport(E),
    Nvm(NvmError),
    /// The injected halt check asked the session to stop
    Cancelled,
    /// Completion was requested before end-of-transmission
    SessionIncomplete,
}

impl<E> From<NvmError> for Error<E> {
    fn from(err: NvmError) -> Self {
        Error::Nvm(err)
    }
}

pub type Result<T, E> = core::result::Result<T, Error<E>>;

//! Event log over any `ufmt` writer

use core::convert::Infallible;

use ufmt::derive::uDebug;
use ufmt::{uWrite, uwriteln};

use crate::bootloader::EntryReason;
use crate::drivers::flash::Reject;
use crate::protocol::FrameError;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Level {
    System,
    Error,
    Debug,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::System => "SYS",
            Level::Error => "ERR",
            Level::Debug => "DBG",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum Event {
    Entry(EntryReason),
    Connected { pings: u32 },
    BlockAccepted { address: u16 },
    FrameRejected(FrameError),
    BlockRejected(Reject),
    TransferComplete { blocks: u16 },
    MarkedValid,
    Dumped { regions: u8 },
}

pub struct Logger<W: uWrite> {
    sink: W,
}

impl<W: uWrite> Logger<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn log(&mut self, level: Level, event: Event) {
        // Losing a log line must never stall the update.
        let _ = uwriteln!(self.sink, "[{}] {:?}", level.tag(), event);
    }

    pub fn system(&mut self, event: Event) {
        self.log(Level::System, event)
    }

    pub fn error(&mut self, event: Event) {
        self.log(Level::Error, event)
    }

    pub fn debug(&mut self, event: Event) {
        self.log(Level::Debug, event)
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Sink for builds without a spare UART
pub struct Discard;

impl uWrite for Discard {
    type Error = Infallible;

    fn write_str(&mut self, _: &str) -> Result<(), Infallible> {
        Ok(())
    }
}

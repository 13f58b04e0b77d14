//! Update session: handshake, block reception, completion

pub mod entry;
pub mod handshake;

pub use entry::{entry_reason, mark_complete, should_run_bootloader, EntryReason};
pub use handshake::Handshake;

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial::{Read, Write};
use ufmt::uWrite;

use crate::config::{Layout, DUMP_REGIONS, LAYOUT, PING_SPINS};
use crate::diagnostics;
use crate::drivers::{FlashWriter, StatusLed};
use crate::hal::{LineActivity, Nvm};
use crate::logger::{Event, Logger};
use crate::protocol::packet::read_frame;
use crate::protocol::{Control, Error, Frame, Result, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Handshaking,
    Receiving,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    pub blocks: u16,
    pub bytes: u16,
}

pub struct Bootloader<S, M, A, P, W>
where
    M: Nvm,
    P: OutputPin,
    W: uWrite,
{
    transport: Transport<S>,
    nvm: M,
    activity: A,
    led: StatusLed<P>,
    log: Logger<W>,
    layout: Layout,
    handshake: Handshake,
    state: SessionState,
}

impl<S, E, M, A, P, W> Bootloader<S, M, A, P, W>
where
    S: Read<u8, Error = E> + Write<u8, Error = E>,
    M: Nvm,
    A: LineActivity,
    P: OutputPin,
    W: uWrite,
{
    pub fn new(serial: S, nvm: M, activity: A, led: P, log: Logger<W>) -> Self {
        Self {
            transport: Transport::new(serial),
            nvm,
            activity,
            led: StatusLed::new(led),
            log,
            layout: LAYOUT,
            handshake: Handshake::new(PING_SPINS),
            state: SessionState::Idle,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_ping_spins(mut self, spins: u32) -> Self {
        self.handshake = Handshake::new(spins);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn nvm(&self) -> &M {
        &self.nvm
    }

    pub fn log(&mut self) -> &mut Logger<W> {
        &mut self.log
    }

    /// Full update: session, validity flag, diagnostic dump.
    pub fn update<C: FnMut() -> bool>(&mut self, cancel: &mut C) -> Result<Summary, E> {
        let summary = self.run_session(cancel)?;
        self.finish()?;
        Ok(summary)
    }

    /// Drive Idle -> Handshaking -> Receiving -> Completed.
    ///
    /// Bad frames and failed writes are answered with NAK and retried for as
    /// long as the sender keeps trying; only `cancel` or a transmit error
    /// ends the session early.
    pub fn run_session<C: FnMut() -> bool>(&mut self, cancel: &mut C) -> Result<Summary, E> {
        self.state = SessionState::Handshaking;
        let pings = self.handshake.run(
            &mut self.transport,
            &mut self.led,
            &mut self.activity,
            cancel,
        )?;
        self.log.system(Event::Connected { pings });
        self.led.on();

        self.state = SessionState::Receiving;
        let summary = self.receive(cancel)?;
        self.state = SessionState::Completed;
        Ok(summary)
    }

    fn receive<C: FnMut() -> bool>(&mut self, cancel: &mut C) -> Result<Summary, E> {
        let mut writer = FlashWriter::new(&mut self.nvm, &self.layout);
        let mut blocks = 0u16;

        loop {
            match read_frame(&mut self.transport, &mut self.log, cancel)? {
                Frame::EndOfTransmission => {
                    self.transport.send(Control::Ack)?;
                    self.log.system(Event::TransferComplete { blocks });
                    return Ok(Summary {
                        blocks,
                        bytes: writer.programmed(),
                    });
                }
                Frame::Block(block) => match writer.program_block(&block.payload) {
                    Ok(address) => {
                        self.transport.send(Control::Ack)?;
                        self.log.debug(Event::BlockAccepted { address });
                        blocks = blocks.wrapping_add(1);
                    }
                    Err(reject) => {
                        self.log.error(Event::BlockRejected(reject));
                        self.transport.send(Control::Nak)?;
                    }
                },
            }
        }
    }

    /// Mark the application valid, then dump memory for the host.
    pub fn finish(&mut self) -> Result<(), E> {
        if self.state != SessionState::Completed {
            return Err(Error::SessionIncomplete);
        }

        entry::mark_complete(&mut self.nvm, &self.layout)?;
        self.log.system(Event::MarkedValid);

        let sent = diagnostics::dump_all(&mut self.transport, &self.nvm, &DUMP_REGIONS);
        self.log.debug(Event::Dumped { regions: sent as u8 });
        Ok(())
    }

    pub fn release(self) -> (S, M, P) {
        (self.transport.release(), self.nvm, self.led.release())
    }
}

//! Application flash programming through the NVM page buffer

use ufmt::derive::uDebug;

use crate::config::Layout;
use crate::hal::{Nvm, NvmCommand, NvmError};
use crate::protocol::BLOCK_SIZE;

const BLOCK: u16 = BLOCK_SIZE as u16;

/// Why a block was not programmed. Every variant is answered with NAK.
#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum Reject {
    /// The block would run past the end of the application region
    OutOfSpace,
    Nvm(NvmError),
    /// Read-back differs from the payload at `address`
    Verify { address: u16 },
}

impl From<NvmError> for Reject {
    fn from(err: NvmError) -> Self {
        Reject::Nvm(err)
    }
}

/// Writes accepted blocks one after another from the start of the
/// application region. The cursor only moves once a block has been
/// written and read back intact; a refused block is rewritten in place on
/// the sender's next attempt.
pub struct FlashWriter<'a, M: Nvm> {
    nvm: &'a mut M,
    base: u16,
    capacity: u16,
    offset: u16,
}

impl<'a, M: Nvm> FlashWriter<'a, M> {
    pub fn new(nvm: &'a mut M, layout: &Layout) -> Self {
        Self {
            nvm,
            base: layout.app_start,
            capacity: layout.app_size,
            offset: 0,
        }
    }

    /// Address the next block will be written to
    pub fn cursor(&self) -> u16 {
        self.base.wrapping_add(self.offset)
    }

    /// Bytes accepted so far
    pub fn programmed(&self) -> u16 {
        self.offset
    }

    /// Program and verify one block, returning the address it landed at.
    pub fn program_block(&mut self, payload: &[u8; BLOCK_SIZE]) -> Result<u16, Reject> {
        if self.capacity - self.offset < BLOCK {
            return Err(Reject::OutOfSpace);
        }
        let address = self.cursor();

        if let Err(err) = self.write(address, payload) {
            // Leave nothing of this attempt behind for the next one.
            let _ = self.nvm.commit(NvmCommand::ClearBuffer);
            return Err(err.into());
        }

        for (i, &expected) in payload.iter().enumerate() {
            let at = address.wrapping_add(i as u16);
            if self.nvm.read(at) != expected {
                return Err(Reject::Verify { address: at });
            }
        }

        self.offset += BLOCK;
        Ok(address)
    }

    // Fill the page buffer and commit at every page boundary, then commit
    // whatever is left at the end of the block so no block's bytes share a
    // commit with the next one's.
    fn write(&mut self, address: u16, payload: &[u8; BLOCK_SIZE]) -> Result<(), NvmError> {
        let mut run_start = address;
        let mut pending = 0u16;

        for (i, &byte) in payload.iter().enumerate() {
            let at = address.wrapping_add(i as u16);
            if pending == 0 {
                run_start = at;
            }
            self.nvm.load(at, byte);
            pending += 1;

            if at.wrapping_add(1) % M::PAGE_SIZE == 0 {
                self.nvm.commit(commit_for(run_start, M::PAGE_SIZE))?;
                pending = 0;
            }
        }

        if pending != 0 {
            self.nvm.commit(commit_for(run_start, M::PAGE_SIZE))?;
        }
        Ok(())
    }
}

// Erase only when the run owns the start of its page; a run that continues
// a page committed earlier must not wipe the first part.
fn commit_for(run_start: u16, page_size: u16) -> NvmCommand {
    if run_start % page_size == 0 {
        NvmCommand::EraseWrite
    } else {
        NvmCommand::Write
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LAYOUT;
    use crate::testing::{ramp, SimNvm};

    #[test]
    fn accepted_block_advances_cursor() {
        let mut nvm = SimNvm::<128>::new();
        let mut writer = FlashWriter::new(&mut nvm, &LAYOUT);
        let payload = ramp(1);

        assert_eq!(writer.program_block(&payload), Ok(LAYOUT.app_start));
        assert_eq!(writer.cursor(), LAYOUT.app_start + 128);
        assert_eq!(writer.programmed(), 128);
        assert_eq!(nvm.slice(LAYOUT.app_start, 128), &payload[..]);
    }

    #[test]
    fn small_pages_commit_per_page() {
        let mut nvm = SimNvm::<64>::new();
        let mut writer = FlashWriter::new(&mut nvm, &LAYOUT);

        writer.program_block(&ramp(0)).unwrap();

        assert_eq!(
            nvm.commits(),
            &[
                (NvmCommand::EraseWrite, LAYOUT.app_start),
                (NvmCommand::EraseWrite, LAYOUT.app_start + 64),
            ]
        );
    }

    #[test]
    fn large_pages_commit_at_block_boundary_without_erasing_twice() {
        let mut nvm = SimNvm::<256>::new();
        let mut writer = FlashWriter::new(&mut nvm, &LAYOUT);
        let first = ramp(0);
        let second = ramp(0x80);

        writer.program_block(&first).unwrap();
        writer.program_block(&second).unwrap();

        assert_eq!(
            nvm.commits(),
            &[
                (NvmCommand::EraseWrite, LAYOUT.app_start),
                (NvmCommand::Write, LAYOUT.app_start + 128),
            ]
        );
        assert_eq!(nvm.slice(LAYOUT.app_start, 128), &first[..]);
        assert_eq!(nvm.slice(LAYOUT.app_start + 128, 128), &second[..]);
    }

    #[test]
    fn corrupted_write_is_refused_and_cursor_holds() {
        let mut nvm = SimNvm::<128>::new();
        nvm.corrupt_once(LAYOUT.app_start + 77);
        let mut writer = FlashWriter::new(&mut nvm, &LAYOUT);
        let payload = ramp(5);

        assert_eq!(
            writer.program_block(&payload),
            Err(Reject::Verify { address: LAYOUT.app_start + 77 })
        );
        assert_eq!(writer.cursor(), LAYOUT.app_start);

        // Resend of the same block lands on the same place.
        assert_eq!(writer.program_block(&payload), Ok(LAYOUT.app_start));
        assert_eq!(writer.programmed(), 128);
    }

    #[test]
    fn resend_after_refusal_matches_single_write() {
        let payload = ramp(0x33);

        let mut once = SimNvm::<128>::new();
        FlashWriter::new(&mut once, &LAYOUT)
            .program_block(&payload)
            .unwrap();

        let mut twice = SimNvm::<128>::new();
        twice.corrupt_once(LAYOUT.app_start);
        let mut writer = FlashWriter::new(&mut twice, &LAYOUT);
        assert!(writer.program_block(&payload).is_err());
        writer.program_block(&payload).unwrap();
        assert_eq!(writer.programmed(), 128);

        assert_eq!(
            once.slice(LAYOUT.app_start, 256),
            twice.slice(LAYOUT.app_start, 256)
        );
    }

    #[test]
    fn commit_failure_clears_page_buffer() {
        let mut nvm = SimNvm::<128>::new();
        nvm.fail_next_commit();
        let mut writer = FlashWriter::new(&mut nvm, &LAYOUT);

        assert_eq!(
            writer.program_block(&ramp(0)),
            Err(Reject::Nvm(NvmError::WriteError))
        );
        assert_eq!(writer.programmed(), 0);
        assert_eq!(nvm.buffered(), 0);
    }

    #[test]
    fn refuses_to_run_past_application_region() {
        let mut nvm = SimNvm::<128>::new();
        let layout = Layout {
            app_size: 128,
            ..LAYOUT
        };
        let mut writer = FlashWriter::new(&mut nvm, &layout);

        writer.program_block(&ramp(0)).unwrap();
        assert_eq!(writer.program_block(&ramp(0)), Err(Reject::OutOfSpace));
        assert_eq!(writer.programmed(), 128);
    }
}

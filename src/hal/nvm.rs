//! NVMCTRL driver. Flash, EEPROM, fuses and the signature row are all
//! mapped into data space, so reads and page-buffer loads are plain
//! volatile accesses.

use avr_device::atmega4809::NVMCTRL;

use super::system::{protected_write, CCP_SPM};
use super::{Nvm, NvmCommand};
use crate::config::PROGMEM_PAGE_SIZE;

// STATUS
const FBUSY: u8 = 0x01;
const EEBUSY: u8 = 0x02;
const WRERROR: u8 = 0x04;

pub struct Nvmctrl {
    regs: NVMCTRL,
}

impl Nvmctrl {
    pub fn new(regs: NVMCTRL) -> Self {
        Self { regs }
    }
}

impl Nvm for Nvmctrl {
    const PAGE_SIZE: u16 = PROGMEM_PAGE_SIZE;

    fn read(&self, address: u16) -> u8 {
        unsafe { core::ptr::read_volatile(address as usize as *const u8) }
    }

    fn load(&mut self, address: u16, byte: u8) {
        unsafe { core::ptr::write_volatile(address as usize as *mut u8, byte) }
    }

    fn execute(&mut self, command: NvmCommand) {
        // CTRLA sits at offset 0 and is SPM-protected.
        unsafe { protected_write(NVMCTRL::ptr() as *mut u8, CCP_SPM, command as u8) }
    }

    fn is_busy(&self) -> bool {
        self.regs.status.read().bits() & (FBUSY | EEBUSY) != 0
    }

    fn write_error(&self) -> bool {
        self.regs.status.read().bits() & WRERROR != 0
    }
}

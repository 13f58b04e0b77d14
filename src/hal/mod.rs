//! Hardware capabilities the update engine is written against.
//!
//! The protocol and programming logic only see these traits; the ATmega4809
//! register implementations live in the target-gated submodules.

#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod nvm;
#[cfg(target_arch = "avr")]
pub mod system;
#[cfg(target_arch = "avr")]
pub mod uart;

#[cfg(target_arch = "avr")]
pub use gpio::{Led, RxSense, Switch};
#[cfg(target_arch = "avr")]
pub use nvm::Nvmctrl;
#[cfg(target_arch = "avr")]
pub use uart::Usart;

use ufmt::derive::uDebug;

/// Page buffer commands (AVR0 NVMCTRL.CTRLA: ERWP, WP, PBC)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum NvmCommand {
    Write = 0x01,
    EraseWrite = 0x03,
    ClearBuffer = 0x04,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum NvmError {
    WriteError,
}

/// Nonvolatile memory controller plus the data-space view of the mapped
/// memories (flash, EEPROM, fuses, signature row).
pub trait Nvm {
    /// Flash page size in bytes
    const PAGE_SIZE: u16;

    fn read(&self, address: u16) -> u8;

    /// Store one byte into the page buffer for `address`.
    fn load(&mut self, address: u16, byte: u8);

    fn execute(&mut self, command: NvmCommand);

    fn is_busy(&self) -> bool;

    /// Write error status of the last command
    fn write_error(&self) -> bool;

    /// Run `command` to completion.
    fn commit(&mut self, command: NvmCommand) -> Result<(), NvmError> {
        self.execute(command);
        while self.is_busy() {}
        if self.write_error() {
            return Err(NvmError::WriteError);
        }
        Ok(())
    }
}

/// Start-bit detector on the receive line.
pub trait LineActivity {
    /// Read and clear the edge flag.
    fn take_activity(&mut self) -> bool;
}

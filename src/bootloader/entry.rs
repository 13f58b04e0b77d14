//! Boot-time entry decision and the completion marker

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::InputPin;
use ufmt::derive::uDebug;

use crate::config::{Layout, SWITCH_SETTLE_MS};
use crate::hal::{Nvm, NvmCommand, NvmError};

/// Erased flash/EEPROM reads back as all ones
pub const ERASED: u8 = 0xFF;
/// Value written to the validity flag after a successful update
pub const PROGRAMMED: u8 = 0x00;

#[derive(Clone, Copy, Debug, PartialEq, Eq, uDebug)]
pub enum EntryReason {
    /// Validity flag was never written
    Unprogrammed,
    /// Operator is holding the switch
    SwitchPressed,
    /// First application byte is erased, so there is nothing to jump to
    ApplicationErased,
}

/// Why the bootloader has to run, or `None` to start the application.
///
/// Checked in order, first hit wins: the switch is not sampled when the
/// flag already decides it.
pub fn entry_reason<M, P, D>(
    nvm: &M,
    layout: &Layout,
    switch: &mut P,
    delay: &mut D,
) -> Option<EntryReason>
where
    M: Nvm,
    P: InputPin,
    D: DelayMs<u8>,
{
    if nvm.read(layout.flag) == ERASED {
        return Some(EntryReason::Unprogrammed);
    }
    if switch_pressed(switch, delay) {
        return Some(EntryReason::SwitchPressed);
    }
    if nvm.read(layout.app_start) == ERASED {
        return Some(EntryReason::ApplicationErased);
    }
    None
}

pub fn should_run_bootloader<M, P, D>(nvm: &M, layout: &Layout, switch: &mut P, delay: &mut D) -> bool
where
    M: Nvm,
    P: InputPin,
    D: DelayMs<u8>,
{
    entry_reason(nvm, layout, switch, delay).is_some()
}

/// Switch is active low. The pull-up was just enabled, give it time.
pub fn switch_pressed<P: InputPin, D: DelayMs<u8>>(switch: &mut P, delay: &mut D) -> bool {
    delay.delay_ms(SWITCH_SETTLE_MS);
    switch.is_low().unwrap_or(false)
}

/// Hold off the reset until the operator lets go of the switch.
pub fn wait_for_release<P: InputPin>(switch: &mut P) {
    while switch.is_low().unwrap_or(false) {}
}

/// Record that every block was written and verified. Must only run after
/// the sender's EOT has been acknowledged.
pub fn mark_complete<M: Nvm>(nvm: &mut M, layout: &Layout) -> Result<(), NvmError> {
    nvm.load(layout.flag, PROGRAMMED);
    nvm.commit(NvmCommand::EraseWrite)
}

pub fn is_marked<M: Nvm>(nvm: &M, layout: &Layout) -> bool {
    nvm.read(layout.flag) != ERASED
}

//! Clock, reset and control transfer

use avr_device::atmega4809::{CLKCTRL, RSTCTRL};
use embedded_hal::blocking::delay::DelayMs;

use crate::config::CPU_FREQ_HZ;

// CPU.CCP
const CCP: *mut u8 = 0x0034 as *mut u8;
pub const CCP_IOREG: u8 = 0xD8;
pub const CCP_SPM: u8 = 0x9D;

// CLKCTRL.MCLKCTRLB: PEN, PDIV = 2
const MCLKCTRLB_OFFSET: usize = 1;
const PRESCALE_DIV2: u8 = 0x01;
// RSTCTRL.SWRR
const SWRR_OFFSET: usize = 1;
const SWRE: u8 = 0x01;

/// Unlock with `key` and write `value` to a protected register. The store
/// has to follow the CCP write within four instructions.
#[inline(always)]
pub unsafe fn protected_write(reg: *mut u8, key: u8, value: u8) {
    core::ptr::write_volatile(CCP, key);
    core::ptr::write_volatile(reg, value);
}

/// Main clock = oscillator / 2 (8 or 10 MHz), inside the 3.3 V limits.
pub fn init_clock() {
    unsafe {
        protected_write(
            (CLKCTRL::ptr() as *mut u8).add(MCLKCTRLB_OFFSET),
            CCP_IOREG,
            PRESCALE_DIV2,
        )
    }
}

/// Move USART0 to its alternate TX/RX pair.
#[cfg(feature = "alt-pins")]
pub fn route_alt_pins() {
    use avr_device::atmega4809::PORTMUX;
    unsafe { (*PORTMUX::ptr()).usartroutea.write(|w| w.bits(0x01)) }
}

pub fn soft_reset() -> ! {
    unsafe {
        protected_write(
            (RSTCTRL::ptr() as *mut u8).add(SWRR_OFFSET),
            CCP_IOREG,
            SWRE,
        )
    }
    loop {}
}

/// Jump to the application vector table at the end of the boot section.
pub fn jump_to_application(boot_size: u16) -> ! {
    // Function pointers hold word addresses.
    let entry: extern "C" fn() -> ! =
        unsafe { core::mem::transmute((boot_size / 2) as usize) };
    entry()
}

/// Busy-wait delay, about four cycles per spin
pub struct Delay;

impl DelayMs<u8> for Delay {
    fn delay_ms(&mut self, ms: u8) {
        for _ in 0..ms {
            for _ in 0..CPU_FREQ_HZ / 4_000 {
                avr_device::asm::nop();
            }
        }
    }
}

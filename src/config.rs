//! Build-time configuration for the ATmega4809 bootloader

use crate::diagnostics::Region;

/// OSC20M frequency select fuse: 1 = 16 MHz, 2 = 20 MHz
pub const FREQSEL: u8 = 2;

/// CPU frequency in Hz (main clock prescaler fixed at /2)
pub const CPU_FREQ_HZ: u32 = if FREQSEL == 2 { 10_000_000 } else { 8_000_000 };

/// USART0 baud rate
pub const UART_BAUD: u32 = 230_400;

/// Size of the boot section in bytes
pub const BOOT_SIZE: u16 = 2048;

/// USART BAUD register value for normal (16x) mode
pub const UART_BAUD_REG: u16 = (CPU_FREQ_HZ * 4 / UART_BAUD) as u16;

const _: () = assert!(FREQSEL == 1 || FREQSEL == 2, "FREQSEL must be 1 or 2");
const _: () = assert!(BOOT_SIZE % 256 == 0, "BOOT_SIZE must be a multiple of 256");
const _: () = assert!(UART_BAUD_REG >= 64, "UART_BAUD too high for the CPU clock");

// Data-space memory map
pub const SIGROW_START: u16 = 0x1100;
pub const SIGROW_SIZE: u16 = 0x40;
pub const FUSES_START: u16 = 0x1280;
pub const FUSES_SIZE: u16 = 10;
pub const EEPROM_START: u16 = 0x1400;
pub const EEPROM_SIZE: u16 = 0x100;
pub const PROGMEM_START: u16 = 0x4000;
pub const PROGMEM_SIZE: u16 = 0xC000;
pub const PROGMEM_PAGE_SIZE: u16 = 128;

/// Handshake spin count between pings, roughly 10 clocks per spin
pub const PING_SPINS: u32 = CPU_FREQ_HZ / 10;

/// Pull-up settling time before the switch is sampled
pub const SWITCH_SETTLE_MS: u8 = 1;

/// Where the application and its validity flag live
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// First mapped address of the application region
    pub app_start: u16,
    /// Bytes available to the application
    pub app_size: u16,
    /// Persistent validity flag (0xFF = nothing programmed)
    pub flag: u16,
}

pub const LAYOUT: Layout = Layout {
    app_start: PROGMEM_START + BOOT_SIZE,
    app_size: PROGMEM_SIZE - BOOT_SIZE,
    flag: EEPROM_START + EEPROM_SIZE - 1,
};

/// Regions sent after a completed update, in wire order
pub const DUMP_REGIONS: [Region; 4] = [
    Region::new(SIGROW_START, SIGROW_SIZE),
    Region::new(FUSES_START, FUSES_SIZE),
    Region::new(PROGMEM_START, PROGMEM_SIZE),
    Region::new(EEPROM_START, EEPROM_SIZE),
];

/// Fuse image for the `.fuse` section:
/// WDTCFG, BODCFG, OSCCFG, reserved x2, SYSCFG0, SYSCFG1, APPEND, BOOTEND
pub const FUSES: [u8; 9] = [
    0x00,
    0x00,
    FREQSEL,
    0x00,
    0x00,
    0xF6,
    0xFF,
    0x00,
    (BOOT_SIZE / 256) as u8,
];

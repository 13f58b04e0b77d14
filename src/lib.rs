//! XMODEM-CRC serial bootloader for AVR 0/1-series parts.
//!
//! On reset the entry check decides between jumping to the application and
//! running an update session. A session pings the host with 'C', receives
//! 128-byte blocks, programs and verifies each one in application flash,
//! acknowledges end-of-transmission and only then marks the image valid in
//! EEPROM. Everything here runs on the host as well; the register-level
//! pieces live in `hal` behind `target_arch = "avr"`.

#![cfg_attr(not(test), no_std)]

pub mod bootloader;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod hal;
pub mod logger;
pub mod protocol;

#[cfg(test)]
pub mod testing;

pub use bootloader::{Bootloader, SessionState, Summary};

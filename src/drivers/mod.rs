//! Flash programming and status indication on top of the HAL traits

pub mod flash;
pub mod status_led;

pub use flash::{FlashWriter, Reject};
pub use status_led::StatusLed;

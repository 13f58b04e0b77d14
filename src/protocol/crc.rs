//! CRC-16/XMODEM (poly 0x1021, MSB first, seed 0)

const POLY: u16 = 0x1021;

/// Fold one byte into the running CRC.
#[inline]
pub const fn crc16(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ ((byte as u16) << 8);
    let mut i = 0;
    while i < 8 {
        crc = if crc & 0x8000 != 0 {
            (crc << 1) ^ POLY
        } else {
            crc << 1
        };
        i += 1;
    }
    crc
}

/// CRC of a whole buffer starting from seed 0.
pub fn checksum(data: &[u8]) -> u16 {
    data.iter().fold(0, |crc, &byte| crc16(crc, byte))
}

//! CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF, no reflection)

pub const CRC16_SEED: u16 = 0xFFFF;
const CRC16_POLY: u16 = 0x1021;

/// Fold `bytes` into a running CRC
pub fn crc16_update(mut crc: u16, bytes: &[u8]) -> u16 {
    for &byte in bytes {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CRC16_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

pub fn crc16(bytes: &[u8]) -> u16 {
    crc16_update(CRC16_SEED, bytes)
}

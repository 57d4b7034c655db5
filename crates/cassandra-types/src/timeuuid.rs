//! Version-1 (time-based) UUIDs.
//!
//! A time-UUID stores a count of 100ns intervals since the Gregorian
//! calendar reform (1582-10-15). Only the millisecond part is meaningful
//! to the sync engine; the clock sequence and node bytes are ignored when
//! reading and fixed when writing.

use sync_core::LogicalTimestamp;
use uuid::Uuid;

/// 100ns intervals between 1582-10-15 and 1970-01-01.
const GREGORIAN_EPOCH_OFFSET: i64 = 0x01B2_1DD2_1381_4000;

const TICKS_PER_MILLI: i64 = 10_000;

/// Clock-sequence and node bytes of the smallest time-UUID for an instant,
/// as produced by CQL's `minTimeuuid()`.
const MIN_CLOCK_SEQ_AND_NODE: [u8; 8] = [0x80; 8];

/// Extracts the instant of a version-1 UUID.
pub fn to_timestamp(uuid: &Uuid) -> Option<LogicalTimestamp> {
    if uuid.get_version_num() != 1 {
        return None;
    }
    let b = uuid.as_bytes();
    let time_low = u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as i64;
    let time_mid = u16::from_be_bytes([b[4], b[5]]) as i64;
    let time_hi = (u16::from_be_bytes([b[6], b[7]]) & 0x0FFF) as i64;
    let ticks = (time_hi << 48) | (time_mid << 32) | time_low;
    let millis = (ticks - GREGORIAN_EPOCH_OFFSET).div_euclid(TICKS_PER_MILLI);
    LogicalTimestamp::from_millis(millis)
}

/// The smallest time-UUID of the millisecond `ts` falls in.
///
/// The same instant always yields the same UUID, so writing a record twice
/// addresses the same row. Returns `None` for instants before 1582.
pub fn min_timeuuid(ts: LogicalTimestamp) -> Option<Uuid> {
    let ticks = ts
        .as_millis()
        .checked_mul(TICKS_PER_MILLI)?
        .checked_add(GREGORIAN_EPOCH_OFFSET)?;
    if !(0..1 << 60).contains(&ticks) {
        return None;
    }
    let time_low = (ticks & 0xFFFF_FFFF) as u32;
    let time_mid = ((ticks >> 32) & 0xFFFF) as u16;
    let time_hi_and_version = (((ticks >> 48) & 0x0FFF) as u16) | 0x1000;

    let mut bytes = [0u8; 16];
    bytes[0..4].copy_from_slice(&time_low.to_be_bytes());
    bytes[4..6].copy_from_slice(&time_mid.to_be_bytes());
    bytes[6..8].copy_from_slice(&time_hi_and_version.to_be_bytes());
    bytes[8..16].copy_from_slice(&MIN_CLOCK_SEQ_AND_NODE);
    Some(Uuid::from_bytes(bytes))
}

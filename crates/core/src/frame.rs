//! Telemetry frame encoding and decoding.
//!
//! The firmware consumes a fixed 15-byte frame at a fixed cadence:
//!
//! ```text
//! offset 0       sync = 0xAA
//! offset 1..12   6 x (dx: i8, dy: i8), slots 0..5 in order
//! offset 13      buttons = OR of every slot's low 3 bits
//! offset 14      wheel = 8-bit wraparound sum of every slot's clamped wheel
//! ```
//!
//! The button byte is OR-combined because the firmware treats the three
//! button lines as shared across all slots; per-slot button routing is not
//! representable in this frame. The single wheel byte is likewise a
//! deliberately lossy sum of all slots.

use crate::error::{Error, Result};

/// Telemetry frame sync byte.
pub const SYNC: u8 = 0xAA;
/// Telemetry frame length in bytes.
pub const FRAME_LEN: usize = 15;
/// Number of slots carried in every frame, bound or not.
pub const NUM_SLOTS: usize = 6;

/// Button mask width: left, right, middle.
pub const BUTTON_MASK: u8 = 0b111;

/// One slot's contribution to a frame, already clamped to signed-byte range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub dx: i8,
    pub dy: i8,
    /// Low 3 bits: left=bit0, right=bit1, middle=bit2.
    pub buttons: u8,
    pub wheel: i8,
}

/// Encode a 6-slot snapshot into the 15-byte telemetry frame.
///
/// Pure function of the snapshot; always produces exactly [`FRAME_LEN`] bytes.
/// Inputs are expected to be pre-clamped by the aggregator.
pub fn encode(slots: &[SlotSnapshot; NUM_SLOTS]) -> [u8; FRAME_LEN] {
    let mut buf = [0u8; FRAME_LEN];
    buf[0] = SYNC;

    for (i, slot) in slots.iter().enumerate() {
        buf[1 + i * 2] = slot.dx as u8;
        buf[2 + i * 2] = slot.dy as u8;
    }

    let mut buttons = 0u8;
    for slot in slots {
        buttons |= slot.buttons & BUTTON_MASK;
    }
    buf[13] = buttons;

    // Accumulate modulo 256; the receiver reinterprets >=128 as negative.
    let mut wheel = 0u8;
    for slot in slots {
        wheel = wheel.wrapping_add(slot.wheel as u8);
    }
    buf[14] = wheel;

    buf
}

/// Decode a telemetry frame back into a 6-slot snapshot.
///
/// Per-slot dx/dy recover exactly. The button and wheel bytes carry no
/// per-slot identity on the wire, so both are surfaced on slot 0.
pub fn decode(data: &[u8]) -> Result<[SlotSnapshot; NUM_SLOTS]> {
    if data.len() != FRAME_LEN {
        return Err(Error::Frame(format!(
            "bad length: {} bytes (expected {})",
            data.len(),
            FRAME_LEN
        )));
    }
    if data[0] != SYNC {
        return Err(Error::Frame(format!(
            "bad sync byte: 0x{:02X} (expected 0x{SYNC:02X})",
            data[0]
        )));
    }

    let mut slots = [SlotSnapshot::default(); NUM_SLOTS];
    for (i, slot) in slots.iter_mut().enumerate() {
        slot.dx = data[1 + i * 2] as i8;
        slot.dy = data[2 + i * 2] as i8;
    }
    slots[0].buttons = data[13] & BUTTON_MASK;
    slots[0].wheel = data[14] as i8;

    Ok(slots)
}

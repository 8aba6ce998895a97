//! Control frame encoding: the one-shot configuration packet.
//!
//! Structurally distinct from the telemetry frame — a two-byte sync pattern
//! that shares no byte value with the telemetry sync (0xAA):
//!
//! ```text
//! offset 0   sync1 = 0x55
//! offset 1   sync2 = 0xCF
//! offset 2   command = 0x01 (set config)
//! offset 3   num_devices (2..6)
//! offset 4   logic mode wire code (0..9)
//! offset 5   input mode wire code (0..2)
//! offset 6   output mode wire code (0..1)
//! offset 7   amplify x100, u8
//! offset 8   quad_scale low byte
//! offset 9   quad_scale high byte
//! offset 10  persist flag (0 or 1)
//! ```
//!
//! The amplify field is validated up to 1000 (factor 10.00) but carried in a
//! single byte; values above 255 saturate the wire field and are logged. The
//! layout is kept byte-compatible with the firmware's settings parser, so the
//! field cannot be widened without a firmware change.

use crate::settings::Settings;
use tracing::warn;

/// First control-frame sync byte.
pub const SYNC1: u8 = 0x55;
/// Second control-frame sync byte.
pub const SYNC2: u8 = 0xCF;
/// Command code: set configuration.
pub const CMD_SET_CONFIG: u8 = 0x01;
/// Control frame length in bytes.
pub const CONTROL_LEN: usize = 11;

/// Fixed-point conversion bounds for the amplify field.
const AMPLIFY_X100_MIN: i32 = 10;
const AMPLIFY_X100_MAX: i32 = 1000;

/// Encode a validated settings record into the 11-byte control frame.
///
/// Pure and total for records that passed [`crate::validate::validate`]; the
/// only conversion done here is the amplify fixed-point scaling.
pub fn encode(settings: &Settings) -> [u8; CONTROL_LEN] {
    let amplify_x100 = ((settings.amplify * 100.0).round() as i32)
        .clamp(AMPLIFY_X100_MIN, AMPLIFY_X100_MAX);
    if amplify_x100 > u8::MAX as i32 {
        warn!(
            amplify_x100,
            "amplify exceeds the 8-bit wire field; saturating at 255"
        );
    }

    [
        SYNC1,
        SYNC2,
        CMD_SET_CONFIG,
        settings.num_devices,
        settings.logic_mode.wire(),
        settings.input_mode.wire(),
        settings.output_mode.wire(),
        amplify_x100.min(u8::MAX as i32) as u8,
        (settings.quad_scale & 0xFF) as u8,
        (settings.quad_scale >> 8) as u8,
        u8::from(settings.persist),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{InputMode, LogicMode, OutputMode};

    #[test]
    fn encode_known_record() {
        let settings = Settings {
            num_devices: 6,
            logic_mode: LogicMode::Xor,
            input_mode: InputMode::Both,
            output_mode: OutputMode::Separate,
            amplify: 2.5,
            quad_scale: 4,
            persist: true,
        };
        assert_eq!(
            encode(&settings),
            [0x55, 0xCF, 0x01, 0x06, 0x06, 0x02, 0x01, 0xFA, 0x04, 0x00, 0x01]
        );
    }

    #[test]
    fn encode_defaults() {
        let frame = encode(&Settings::default());
        assert_eq!(frame[0], SYNC1);
        assert_eq!(frame[1], SYNC2);
        assert_eq!(frame[2], CMD_SET_CONFIG);
        assert_eq!(frame[3], 6); // num_devices
        assert_eq!(frame[4], 0); // sum
        assert_eq!(frame[5], 0); // uart
        assert_eq!(frame[6], 0); // combined
        assert_eq!(frame[7], 100); // amplify 1.0
        assert_eq!(frame[8], 2); // quad_scale low
        assert_eq!(frame[9], 0); // quad_scale high
        assert_eq!(frame[10], 1); // persist
    }

    #[test]
    fn amplify_low_boundary_clamps_to_10() {
        let mut settings = Settings::default();
        settings.amplify = 0.01;
        assert_eq!(encode(&settings)[7], 10);
    }

    #[test]
    fn amplify_high_boundary_saturates_wire_byte() {
        // 12.0 clamps to x100 = 1000, which the 8-bit field saturates at 255.
        let mut settings = Settings::default();
        settings.amplify = 12.0;
        assert_eq!(encode(&settings)[7], 255);
    }

    #[test]
    fn amplify_rounds_to_nearest() {
        let mut settings = Settings::default();
        settings.amplify = 1.004;
        assert_eq!(encode(&settings)[7], 100);
        settings.amplify = 1.006;
        assert_eq!(encode(&settings)[7], 101);
    }

    #[test]
    fn quad_scale_little_endian() {
        let mut settings = Settings::default();
        settings.quad_scale = 0x0304;
        let frame = encode(&settings);
        assert_eq!(frame[8], 0x04);
        assert_eq!(frame[9], 0x03);
    }

    #[test]
    fn persist_flag_encodes_both_ways() {
        let mut settings = Settings::default();
        settings.persist = false;
        assert_eq!(encode(&settings)[10], 0);
        settings.persist = true;
        assert_eq!(encode(&settings)[10], 1);
    }

    #[test]
    fn sync_bytes_disjoint_from_telemetry() {
        assert_ne!(SYNC1, crate::frame::SYNC);
        assert_ne!(SYNC2, crate::frame::SYNC);
    }
}

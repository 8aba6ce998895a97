//! Validation layer: every configuration record is checked and clamped here
//! before it may reach the control-frame encoder.
//!
//! # Bounds
//!
//! - `num_devices`: 2..=6 — hard error, the firmware combines at least two
//!   slots and carries at most six.
//! - `amplify`: clamped to [0.10, 10.00]; the firmware clamps the same way
//!   on receipt.
//! - `quad_scale`: clamped to [1, 1000], matching the firmware's own bounds.
//!
//! Mode names are parsed into closed enums at the configuration boundary
//! ([`crate::settings`]); by the time a record arrives here its modes are
//! already well-formed, so only numeric fields need checking.

use crate::error::{Error, Result};
use crate::settings::Settings;

pub const NUM_DEVICES_MIN: u8 = 2;
pub const NUM_DEVICES_MAX: u8 = 6;
pub const AMPLIFY_MIN: f32 = 0.10;
pub const AMPLIFY_MAX: f32 = 10.0;
pub const QUAD_SCALE_MIN: u16 = 1;
pub const QUAD_SCALE_MAX: u16 = 1000;

/// Validate a settings record, returning a normalized copy.
///
/// Out-of-range `num_devices` is an error; `amplify` and `quad_scale` are
/// clamped silently, mirroring what the firmware would do anyway.
pub fn validate(settings: &Settings) -> Result<Settings> {
    if !(NUM_DEVICES_MIN..=NUM_DEVICES_MAX).contains(&settings.num_devices) {
        return Err(Error::OutOfRange {
            field: "num_devices",
            value: settings.num_devices as i64,
            min: NUM_DEVICES_MIN as i64,
            max: NUM_DEVICES_MAX as i64,
        });
    }

    if !settings.amplify.is_finite() {
        return Err(Error::OutOfRange {
            field: "amplify",
            value: 0,
            min: (AMPLIFY_MIN * 100.0) as i64,
            max: (AMPLIFY_MAX * 100.0) as i64,
        });
    }

    let mut normalized = settings.clone();
    normalized.amplify = settings.amplify.clamp(AMPLIFY_MIN, AMPLIFY_MAX);
    normalized.quad_scale = settings.quad_scale.clamp(QUAD_SCALE_MIN, QUAD_SCALE_MAX);
    Ok(normalized)
}

/// Clamp a synthetic-source magnitude to [1, 127].
pub fn clamp_magnitude(magnitude: i32) -> i32 {
    magnitude.clamp(1, 127)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_defaults() {
        let s = validate(&Settings::default()).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn validate_rejects_num_devices_out_of_range() {
        let mut s = Settings::default();
        s.num_devices = 1;
        assert!(validate(&s).is_err());
        s.num_devices = 7;
        assert!(validate(&s).is_err());
        s.num_devices = 0;
        assert!(validate(&s).is_err());
    }

    #[test]
    fn validate_accepts_num_devices_bounds() {
        let mut s = Settings::default();
        s.num_devices = 2;
        assert!(validate(&s).is_ok());
        s.num_devices = 6;
        assert!(validate(&s).is_ok());
    }

    #[test]
    fn validate_clamps_amplify() {
        let mut s = Settings::default();
        s.amplify = 0.01;
        assert_eq!(validate(&s).unwrap().amplify, AMPLIFY_MIN);
        s.amplify = 50.0;
        assert_eq!(validate(&s).unwrap().amplify, AMPLIFY_MAX);
        s.amplify = 2.5;
        assert_eq!(validate(&s).unwrap().amplify, 2.5);
    }

    #[test]
    fn validate_rejects_non_finite_amplify() {
        let mut s = Settings::default();
        s.amplify = f32::NAN;
        assert!(validate(&s).is_err());
        s.amplify = f32::INFINITY;
        assert!(validate(&s).is_err());
    }

    #[test]
    fn validate_clamps_quad_scale() {
        let mut s = Settings::default();
        s.quad_scale = 0;
        assert_eq!(validate(&s).unwrap().quad_scale, 1);
        s.quad_scale = 5000;
        assert_eq!(validate(&s).unwrap().quad_scale, 1000);
        s.quad_scale = 4;
        assert_eq!(validate(&s).unwrap().quad_scale, 4);
    }

    #[test]
    fn clamp_magnitude_bounds() {
        assert_eq!(clamp_magnitude(0), 1);
        assert_eq!(clamp_magnitude(-5), 1);
        assert_eq!(clamp_magnitude(4), 4);
        assert_eq!(clamp_magnitude(127), 127);
        assert_eq!(clamp_magnitude(1000), 127);
    }
}

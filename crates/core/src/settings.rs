//! Device settings: the configuration record pushed to the firmware.
//!
//! Mode names map to closed wire-code tables; the firmware interprets the
//! codes, the host only validates and transmits them. Configuration sources
//! (config files, CLI flags) supply raw key/value strings via [`Settings::apply_kv`];
//! unrecognized or malformed entries are ignored with a warning rather than
//! rejected.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Receiver-side rule for combining slots into one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicMode {
    Sum,
    Average,
    Max,
    Min,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

impl LogicMode {
    /// All modes, in wire-code order.
    pub const ALL: &'static [LogicMode] = &[
        LogicMode::Sum,
        LogicMode::Average,
        LogicMode::Max,
        LogicMode::Min,
        LogicMode::And,
        LogicMode::Or,
        LogicMode::Xor,
        LogicMode::Nand,
        LogicMode::Nor,
        LogicMode::Xnor,
    ];

    /// Wire code transmitted in the control frame.
    pub fn wire(self) -> u8 {
        match self {
            Self::Sum => 0,
            Self::Average => 1,
            Self::Max => 2,
            Self::Min => 3,
            Self::And => 4,
            Self::Or => 5,
            Self::Xor => 6,
            Self::Nand => 7,
            Self::Nor => 8,
            Self::Xnor => 9,
        }
    }

    pub fn from_wire(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Parse a mode name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sum" => Some(Self::Sum),
            "average" => Some(Self::Average),
            "max" => Some(Self::Max),
            "min" => Some(Self::Min),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "xor" => Some(Self::Xor),
            "nand" => Some(Self::Nand),
            "nor" => Some(Self::Nor),
            "xnor" => Some(Self::Xnor),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Max => "max",
            Self::Min => "min",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Nand => "nand",
            Self::Nor => "nor",
            Self::Xnor => "xnor",
        }
    }
}

impl std::fmt::Display for LogicMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where the firmware takes its motion input from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Uart,
    Quadrature,
    Both,
}

impl InputMode {
    pub const ALL: &'static [InputMode] = &[InputMode::Uart, InputMode::Quadrature, InputMode::Both];

    pub fn wire(self) -> u8 {
        match self {
            Self::Uart => 0,
            Self::Quadrature => 1,
            Self::Both => 2,
        }
    }

    pub fn from_wire(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "uart" => Some(Self::Uart),
            "quadrature" => Some(Self::Quadrature),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Uart => "uart",
            Self::Quadrature => "quadrature",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Whether the firmware presents one combined mouse or six separate ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Combined,
    Separate,
}

impl OutputMode {
    pub const ALL: &'static [OutputMode] = &[OutputMode::Combined, OutputMode::Separate];

    pub fn wire(self) -> u8 {
        match self {
            Self::Combined => 0,
            Self::Separate => 1,
        }
    }

    pub fn from_wire(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "combined" => Some(Self::Combined),
            "separate" => Some(Self::Separate),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Separate => "separate",
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The configuration record sent to the firmware as a control frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Number of active devices on the receiver (2..=6).
    pub num_devices: u8,
    pub logic_mode: LogicMode,
    pub input_mode: InputMode,
    pub output_mode: OutputMode,
    /// Amplification factor, transmitted as fixed-point x100.
    pub amplify: f32,
    /// Quadrature scale divider (>= 1).
    pub quad_scale: u16,
    /// Whether the receiver should persist the record to flash.
    pub persist: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            num_devices: 6,
            logic_mode: LogicMode::Sum,
            input_mode: InputMode::Uart,
            output_mode: OutputMode::Combined,
            amplify: 1.0,
            quad_scale: 2,
            persist: true,
        }
    }
}

impl Settings {
    /// Apply one raw key/value pair from a configuration source.
    ///
    /// Recognized keys update the record; unknown keys and malformed values
    /// are ignored with a warning. Returns whether the pair was applied.
    pub fn apply_kv(&mut self, key: &str, value: &str) -> bool {
        let value = value.trim();
        match key {
            "num_mice" | "num_devices" => match value.parse::<u8>() {
                Ok(n) => {
                    self.num_devices = n;
                    true
                }
                Err(_) => {
                    warn!(key, value, "ignoring malformed config value");
                    false
                }
            },
            "logic_mode" => match LogicMode::from_name(value) {
                Some(mode) => {
                    self.logic_mode = mode;
                    true
                }
                None => {
                    warn!(key, value, "ignoring unknown logic mode");
                    false
                }
            },
            "input_mode" => match InputMode::from_name(value) {
                Some(mode) => {
                    self.input_mode = mode;
                    true
                }
                None => {
                    warn!(key, value, "ignoring unknown input mode");
                    false
                }
            },
            "output_mode" => match OutputMode::from_name(value) {
                Some(mode) => {
                    self.output_mode = mode;
                    true
                }
                None => {
                    warn!(key, value, "ignoring unknown output mode");
                    false
                }
            },
            "amplify" => match value.parse::<f32>() {
                Ok(a) => {
                    self.amplify = a;
                    true
                }
                Err(_) => {
                    warn!(key, value, "ignoring malformed config value");
                    false
                }
            },
            "quad_scale" => match value.parse::<u16>() {
                Ok(q) => {
                    self.quad_scale = q;
                    true
                }
                Err(_) => {
                    warn!(key, value, "ignoring malformed config value");
                    false
                }
            },
            _ => {
                warn!(key, "ignoring unrecognized config key");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logic_mode_wire_table() {
        assert_eq!(LogicMode::Sum.wire(), 0);
        assert_eq!(LogicMode::Average.wire(), 1);
        assert_eq!(LogicMode::Xor.wire(), 6);
        assert_eq!(LogicMode::Xnor.wire(), 9);
    }

    #[test]
    fn logic_mode_wire_roundtrip() {
        for mode in LogicMode::ALL {
            assert_eq!(LogicMode::from_wire(mode.wire()), Some(*mode));
        }
        assert_eq!(LogicMode::from_wire(10), None);
    }

    #[test]
    fn mode_names_parse_case_insensitive() {
        assert_eq!(LogicMode::from_name("XOR"), Some(LogicMode::Xor));
        assert_eq!(InputMode::from_name("Quadrature"), Some(InputMode::Quadrature));
        assert_eq!(OutputMode::from_name("SEPARATE"), Some(OutputMode::Separate));
    }

    #[test]
    fn mode_names_reject_unknown() {
        assert_eq!(LogicMode::from_name("multiply"), None);
        assert_eq!(InputMode::from_name(""), None);
        assert_eq!(OutputMode::from_name("split"), None);
    }

    #[test]
    fn input_output_wire_codes() {
        assert_eq!(InputMode::Uart.wire(), 0);
        assert_eq!(InputMode::Quadrature.wire(), 1);
        assert_eq!(InputMode::Both.wire(), 2);
        assert_eq!(OutputMode::Combined.wire(), 0);
        assert_eq!(OutputMode::Separate.wire(), 1);
    }

    #[test]
    fn defaults_match_firmware() {
        let s = Settings::default();
        assert_eq!(s.num_devices, 6);
        assert_eq!(s.logic_mode, LogicMode::Sum);
        assert_eq!(s.input_mode, InputMode::Uart);
        assert_eq!(s.output_mode, OutputMode::Combined);
        assert_eq!(s.quad_scale, 2);
        assert!(s.persist);
    }

    #[test]
    fn apply_kv_updates_known_keys() {
        let mut s = Settings::default();
        assert!(s.apply_kv("num_mice", "4"));
        assert!(s.apply_kv("logic_mode", "average"));
        assert!(s.apply_kv("amplify", "2.5"));
        assert!(s.apply_kv("quad_scale", "8"));
        assert_eq!(s.num_devices, 4);
        assert_eq!(s.logic_mode, LogicMode::Average);
        assert_eq!(s.amplify, 2.5);
        assert_eq!(s.quad_scale, 8);
    }

    #[test]
    fn apply_kv_ignores_unknown_and_malformed() {
        let mut s = Settings::default();
        let before = s.clone();
        assert!(!s.apply_kv("baud", "115200"));
        assert!(!s.apply_kv("num_mice", "lots"));
        assert!(!s.apply_kv("logic_mode", "multiply"));
        assert_eq!(s, before);
    }

    #[test]
    fn settings_json_roundtrip() {
        let mut s = Settings::default();
        s.logic_mode = LogicMode::Xor;
        s.output_mode = OutputMode::Separate;
        let json = serde_json::to_string(&s).expect("serialize settings");
        let back: Settings = serde_json::from_str(&json).expect("deserialize settings");
        assert_eq!(back, s);
    }
}

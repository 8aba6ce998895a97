//! Serial-port frame sink.
//!
//! Writes are fire-and-forget with a short write timeout: a stalled link
//! fails the write and the loop drops that frame instead of delaying the
//! next tick.

use multimouse_core::error::{Error, Result};
use multimouse_core::transport::FrameSink;
use std::io::Write;
use std::time::Duration;
use tracing::info;

/// Default UART baud rate, matching the firmware.
pub const DEFAULT_BAUD: u32 = 115_200;

const WRITE_TIMEOUT: Duration = Duration::from_millis(5);

pub struct SerialSink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialSink {
    /// Open a serial port for frame output.
    pub fn open(path: &str, baud: u32) -> anyhow::Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| anyhow::anyhow!("open serial port {path}: {e}"))?;
        info!(path, baud, "serial port open");
        Ok(Self { port })
    }
}

impl FrameSink for SerialSink {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.port
            .write_all(frame)
            .map_err(|e| Error::Sink(format!("write: {e}")))
    }
}

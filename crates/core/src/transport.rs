//! Output sink abstraction for frame delivery.
//!
//! The serial link is fire-and-forget: there is no acknowledgment channel,
//! and the aggregator's policy on write failure is to drop the frame rather
//! than delay the next tick. The trait keeps that policy explicit and lets
//! tests substitute a recording sink.

use crate::error::Result;

/// An ordered byte-stream writer for whole frames.
///
/// Implementations must either accept the full frame or fail; a frame is
/// never written partially.
pub trait FrameSink {
    /// Write one complete frame, best-effort.
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;
}

/// A recording sink for tests.
#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::error::Error;

    /// Mock sink that stores every frame and can fail on demand.
    #[derive(Default)]
    pub struct MockSink {
        frames: Vec<Vec<u8>>,
        fail_next: bool,
    }

    impl MockSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next write fail with a sink error.
        pub fn fail_next(&mut self) {
            self.fail_next = true;
        }

        /// All frames written so far.
        pub fn frames(&self) -> &[Vec<u8>] {
            &self.frames
        }
    }

    impl FrameSink for MockSink {
        fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
            if self.fail_next {
                self.fail_next = false;
                return Err(Error::Sink("mock: injected write failure".to_string()));
            }
            self.frames.push(frame.to_vec());
            Ok(())
        }
    }
}

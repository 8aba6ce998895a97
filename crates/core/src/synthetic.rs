//! Synthetic event source: generates randomized slot deltas for protocol
//! testing without physical mice.
//!
//! Bypasses accumulation entirely — every generated sample becomes one
//! telemetry frame, emitted at a caller-chosen rate independent of the
//! aggregator's tick cadence.

use crate::error::{Error, Result};
use crate::frame::{self, SlotSnapshot, NUM_SLOTS};
use crate::transport::FrameSink;
use crate::validate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

/// Which slots receive generated motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenMode {
    /// Random deltas on every slot.
    AllSlots,
    /// Random deltas on one slot; all others stay exactly zero.
    Single(usize),
}

/// Randomized frame generator.
pub struct SyntheticSource {
    mode: GenMode,
    magnitude: i8,
    rng: StdRng,
}

impl SyntheticSource {
    /// Create a generator. `magnitude` is clamped to [1, 127]; a `Single`
    /// slot index outside 0..5 is rejected.
    pub fn new(mode: GenMode, magnitude: i32) -> Result<Self> {
        if let GenMode::Single(slot) = mode {
            if slot >= NUM_SLOTS {
                return Err(Error::OutOfRange {
                    field: "slot",
                    value: slot as i64,
                    min: 0,
                    max: (NUM_SLOTS - 1) as i64,
                });
            }
        }
        Ok(Self {
            mode,
            magnitude: validate::clamp_magnitude(magnitude) as i8,
            rng: StdRng::from_entropy(),
        })
    }

    /// Deterministic variant for tests.
    pub fn with_seed(mode: GenMode, magnitude: i32, seed: u64) -> Result<Self> {
        let mut source = Self::new(mode, magnitude)?;
        source.rng = StdRng::seed_from_u64(seed);
        Ok(source)
    }

    /// Generate one sample: per-slot dx/dy drawn uniformly from
    /// [-magnitude, magnitude]; buttons and wheel stay zero.
    pub fn generate(&mut self) -> [SlotSnapshot; NUM_SLOTS] {
        let mut slots = [SlotSnapshot::default(); NUM_SLOTS];
        let m = self.magnitude;
        match self.mode {
            GenMode::AllSlots => {
                for slot in &mut slots {
                    slot.dx = self.rng.gen_range(-m..=m);
                    slot.dy = self.rng.gen_range(-m..=m);
                }
            }
            GenMode::Single(i) => {
                slots[i].dx = self.rng.gen_range(-m..=m);
                slots[i].dy = self.rng.gen_range(-m..=m);
            }
        }
        slots
    }

    /// Emit frames at `rate_pps` packets per second until `stop` is set or
    /// `duration` elapses. Returns the number of frames written.
    ///
    /// The schedule is drift-free: frame n is due at `start + (n+1)/rate`.
    /// Write failures drop the frame and continue, same policy as the
    /// aggregator loop.
    pub fn run(
        &mut self,
        sink: &mut dyn FrameSink,
        rate_pps: f64,
        duration: Option<Duration>,
        stop: &AtomicBool,
    ) -> Result<u64> {
        if !(rate_pps > 0.0) {
            return Err(Error::OutOfRange {
                field: "rate_pps",
                value: rate_pps as i64,
                min: 1,
                max: i64::MAX,
            });
        }
        let interval = Duration::from_secs_f64(1.0 / rate_pps);
        let start = Instant::now();
        let mut sent: u64 = 0;

        while !stop.load(Ordering::Relaxed) {
            let slots = self.generate();
            if let Err(e) = sink.write_frame(&frame::encode(&slots)) {
                warn!(error = %e, "synthetic frame dropped");
            }
            sent += 1;

            if let Some(limit) = duration {
                if start.elapsed() >= limit {
                    break;
                }
            }

            let next_due = start + interval * (sent as u32 + 1);
            let now = Instant::now();
            if next_due > now {
                std::thread::sleep(next_due - now);
            }
        }

        Ok(sent)
    }
}

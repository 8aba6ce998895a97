//! Aggregator loop: multiplexes raw event sources into slot state and emits
//! telemetry frames at a fixed cadence.
//!
//! Single thread of control. The only blocking point is [`EventMux::wait`],
//! whose timeout is the time remaining until the next tick deadline, so event
//! handling jitter cannot accumulate into cadence drift (deadlines are
//! computed as `start + (n+1)*period`, never `now + period`). Within a tick,
//! all pending events are drained before the frame is built, so a frame
//! reflects exactly the events that arrived before its deadline.

use crate::error::{Error, Result};
use crate::frame::{self, SlotSnapshot, NUM_SLOTS};
use crate::slots::{SlotEvent, SlotState};
use crate::transport::FrameSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Default tick period (~50 Hz), matching the reference cadence.
pub const DEFAULT_TICK: Duration = Duration::from_millis(20);

/// Multiplexed wait over all bound event sources.
///
/// `wait` blocks until at least one event is available or the timeout
/// elapses, returning `(slot_index, event)` pairs. Events from the same slot
/// must be returned in arrival order; there is no ordering requirement
/// between slots.
pub trait EventMux {
    fn wait(&mut self, timeout: Duration) -> Result<Vec<(usize, SlotEvent)>>;
}

/// Owns the six slot accumulators and drives frame emission.
///
/// All state is instance-local; independent aggregators never interfere.
#[derive(Debug, Default)]
pub struct Aggregator {
    slots: [SlotState; NUM_SLOTS],
    bound: [bool; NUM_SLOTS],
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a slot as bound to a source. Unbound slots stay zero for the
    /// process lifetime.
    pub fn bind(&mut self, slot: usize) -> Result<()> {
        if slot >= NUM_SLOTS {
            return Err(Error::OutOfRange {
                field: "slot",
                value: slot as i64,
                min: 0,
                max: (NUM_SLOTS - 1) as i64,
            });
        }
        self.bound[slot] = true;
        Ok(())
    }

    /// Number of slots with a bound source.
    pub fn bound_count(&self) -> usize {
        self.bound.iter().filter(|b| **b).count()
    }

    /// Apply one raw event to its slot. Events for out-of-range or unbound
    /// slots are dropped with a log, never applied.
    pub fn on_event(&mut self, slot: usize, event: &SlotEvent) {
        if slot >= NUM_SLOTS {
            warn!(slot, "dropping event for out-of-range slot");
            return;
        }
        if !self.bound[slot] {
            debug!(slot, "dropping event for unbound slot");
            return;
        }
        self.slots[slot].apply(event);
    }

    /// Emit one frame: clamp all slots, encode, write, reset motion.
    ///
    /// Motion accumulators are reset even when the write fails — a dropped
    /// frame is preferable to emitting stale motion on the next tick.
    /// Button state persists.
    pub fn tick(&mut self, sink: &mut dyn FrameSink) -> Result<()> {
        let mut snapshot = [SlotSnapshot::default(); NUM_SLOTS];
        for (snap, slot) in snapshot.iter_mut().zip(self.slots.iter()) {
            *snap = slot.snapshot();
        }
        let frame = frame::encode(&snapshot);

        let result = sink.write_frame(&frame);
        for slot in &mut self.slots {
            slot.reset_motion();
        }
        result
    }

    /// Run the aggregation loop until `stop` is set.
    ///
    /// Fatal if no slot is bound. Source read errors and sink write failures
    /// degrade to warnings; the loop keeps ticking. The stop flag is sampled
    /// once per iteration, between frames, so no partial frame is ever
    /// written on shutdown.
    pub fn run(
        &mut self,
        mux: &mut dyn EventMux,
        sink: &mut dyn FrameSink,
        period: Duration,
        stop: &AtomicBool,
    ) -> Result<()> {
        if self.bound_count() == 0 {
            return Err(Error::NoSources);
        }

        debug!(
            bound = self.bound_count(),
            period_ms = period.as_millis() as u64,
            "aggregator loop starting"
        );

        let start = Instant::now();
        let mut ticks: u32 = 0;
        while !stop.load(Ordering::Relaxed) {
            let deadline = start + period * (ticks + 1);

            // Drain events until the tick deadline.
            loop {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                match mux.wait(deadline - now) {
                    Ok(events) => {
                        for (slot, event) in &events {
                            self.on_event(*slot, event);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "event source read failed; continuing");
                    }
                }
            }

            if let Err(e) = self.tick(sink) {
                warn!(error = %e, "frame dropped on sink write failure");
            } else {
                trace!(tick = ticks, "frame emitted");
            }
            ticks += 1;
        }

        debug!(ticks, "aggregator loop stopped");
        Ok(())
    }
}

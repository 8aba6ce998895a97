//! Per-slot accumulator state.
//!
//! Each slot accumulates raw motion between ticks: dx/dy/wheel are summed
//! unbounded and clamped to signed-byte range only when a snapshot is taken.
//! Buttons are level state, not accumulated — the last transition before a
//! snapshot wins, and ticks never reset them.

use crate::frame::SlotSnapshot;

/// A mouse button line shared across all slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Middle,
}

impl Button {
    /// Bit mask within the 3-bit button field (left=bit0, right=bit1, middle=bit2).
    pub fn mask(self) -> u8 {
        match self {
            Self::Left => 1 << 0,
            Self::Right => 1 << 1,
            Self::Middle => 1 << 2,
        }
    }
}

/// One raw input event routed to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEvent {
    /// Relative X motion.
    MotionX(i32),
    /// Relative Y motion.
    MotionY(i32),
    /// Wheel motion.
    Wheel(i32),
    /// Button transition: pressed (true) or released (false).
    Button(Button, bool),
}

/// Accumulator state for one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotState {
    pub dx_accum: i32,
    pub dy_accum: i32,
    pub buttons: u8,
    pub wheel_accum: i32,
}

/// Saturating clamp into signed-byte range.
fn clamp_s8(v: i32) -> i8 {
    v.clamp(-128, 127) as i8
}

impl SlotState {
    /// Apply one event. Motion adds; button transitions set level state.
    pub fn apply(&mut self, event: &SlotEvent) {
        match *event {
            SlotEvent::MotionX(d) => self.dx_accum = self.dx_accum.saturating_add(d),
            SlotEvent::MotionY(d) => self.dy_accum = self.dy_accum.saturating_add(d),
            SlotEvent::Wheel(d) => self.wheel_accum = self.wheel_accum.saturating_add(d),
            SlotEvent::Button(btn, pressed) => {
                if pressed {
                    self.buttons |= btn.mask();
                } else {
                    self.buttons &= !btn.mask();
                }
            }
        }
    }

    /// Clamped view of the current state for frame encoding.
    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            dx: clamp_s8(self.dx_accum),
            dy: clamp_s8(self.dy_accum),
            buttons: self.buttons,
            wheel: clamp_s8(self.wheel_accum),
        }
    }

    /// Zero the motion accumulators after a frame is emitted. Buttons persist.
    pub fn reset_motion(&mut self) {
        self.dx_accum = 0;
        self.dy_accum = 0;
        self.wheel_accum = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_accumulates_across_events() {
        let mut slot = SlotState::default();
        slot.apply(&SlotEvent::MotionX(5));
        slot.apply(&SlotEvent::MotionX(-2));
        slot.apply(&SlotEvent::MotionY(10));
        assert_eq!(slot.dx_accum, 3);
        assert_eq!(slot.dy_accum, 10);
    }

    #[test]
    fn snapshot_clamps_saturating() {
        let mut slot = SlotState::default();
        slot.apply(&SlotEvent::MotionX(300));
        slot.apply(&SlotEvent::MotionY(-300));
        slot.apply(&SlotEvent::Wheel(-1000));
        let snap = slot.snapshot();
        assert_eq!(snap.dx, 127);
        assert_eq!(snap.dy, -128);
        assert_eq!(snap.wheel, -128);
    }

    #[test]
    fn snapshot_in_range_passes_through() {
        let mut slot = SlotState::default();
        slot.apply(&SlotEvent::MotionX(-128));
        slot.apply(&SlotEvent::MotionY(127));
        let snap = slot.snapshot();
        assert_eq!(snap.dx, -128);
        assert_eq!(snap.dy, 127);
    }

    #[test]
    fn button_press_and_release() {
        let mut slot = SlotState::default();
        slot.apply(&SlotEvent::Button(Button::Left, true));
        slot.apply(&SlotEvent::Button(Button::Middle, true));
        assert_eq!(slot.buttons, 0b101);

        slot.apply(&SlotEvent::Button(Button::Left, false));
        assert_eq!(slot.buttons, 0b100);
    }

    #[test]
    fn button_last_state_wins() {
        let mut slot = SlotState::default();
        slot.apply(&SlotEvent::Button(Button::Right, true));
        slot.apply(&SlotEvent::Button(Button::Right, false));
        slot.apply(&SlotEvent::Button(Button::Right, true));
        assert_eq!(slot.buttons, Button::Right.mask());
    }

    #[test]
    fn reset_motion_preserves_buttons() {
        let mut slot = SlotState::default();
        slot.apply(&SlotEvent::MotionX(9));
        slot.apply(&SlotEvent::Wheel(2));
        slot.apply(&SlotEvent::Button(Button::Left, true));

        slot.reset_motion();
        assert_eq!(slot.dx_accum, 0);
        assert_eq!(slot.wheel_accum, 0);
        assert_eq!(slot.buttons, Button::Left.mask());
    }

    #[test]
    fn accumulator_does_not_wrap_on_extreme_floods() {
        let mut slot = SlotState::default();
        for _ in 0..1000 {
            slot.apply(&SlotEvent::MotionX(i32::MAX / 2));
        }
        assert_eq!(slot.snapshot().dx, 127);
    }
}

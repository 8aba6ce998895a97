//! Mouse discovery and event multiplexing over /dev/input.
//!
//! A device qualifies as a mouse when it reports relative events with both
//! REL_X and REL_Y plus key events. Up to six qualifying devices are bound
//! to slots in enumeration order; fds are switched to non-blocking and
//! multiplexed with poll(2) so the bridge loop has a single blocking point
//! with a deadline-bounded timeout.

use evdev::{Device, InputEventKind, Key, RelativeAxisType};
use multimouse_core::aggregator::EventMux;
use multimouse_core::error::{Error, Result};
use multimouse_core::slots::{Button, SlotEvent};
use multimouse_core::NUM_SLOTS;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// A discovered mouse candidate.
pub struct DiscoveredMouse {
    pub path: PathBuf,
    pub name: String,
    pub device: Device,
}

/// Enumerate qualifying mice, at most [`NUM_SLOTS`].
pub fn discover() -> Vec<DiscoveredMouse> {
    let mut mice = Vec::new();
    for (path, device) in evdev::enumerate() {
        if !is_mouse(&device) {
            continue;
        }
        let name = device.name().unwrap_or("unknown").to_string();
        debug!(path = %path.display(), name, "found mouse");
        mice.push(DiscoveredMouse { path, name, device });
        if mice.len() >= NUM_SLOTS {
            break;
        }
    }
    mice
}

fn is_mouse(device: &Device) -> bool {
    let events = device.supported_events();
    if !events.contains(evdev::EventType::RELATIVE) || !events.contains(evdev::EventType::KEY) {
        return false;
    }
    device.supported_relative_axes().is_some_and(|axes| {
        axes.contains(RelativeAxisType::REL_X) && axes.contains(RelativeAxisType::REL_Y)
    })
}

/// poll(2)-based multiplexer over bound mice, slot index = vec index.
pub struct EvdevMux {
    devices: Vec<Device>,
}

impl EvdevMux {
    /// Take ownership of the devices and switch their fds to non-blocking.
    pub fn new(devices: Vec<Device>) -> Result<Self> {
        for device in &devices {
            set_nonblocking(device.as_raw_fd())
                .map_err(|e| Error::Source(format!("set O_NONBLOCK: {e}")))?;
        }
        Ok(Self { devices })
    }

    fn drain_device(slot: usize, device: &mut Device, out: &mut Vec<(usize, SlotEvent)>) {
        loop {
            match device.fetch_events() {
                Ok(events) => {
                    for event in events {
                        if let Some(slot_event) = translate(event.kind(), event.value()) {
                            out.push((slot, slot_event));
                        }
                    }
                    // fetch_events drains the kernel buffer in one call.
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!(slot, error = %e, "mouse read failed");
                    break;
                }
            }
        }
    }
}

impl EventMux for EvdevMux {
    fn wait(&mut self, timeout: Duration) -> Result<Vec<(usize, SlotEvent)>> {
        let mut fds: Vec<libc::pollfd> = self
            .devices
            .iter()
            .map(|d| libc::pollfd {
                fd: d.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();

        // Round the timeout up to whole milliseconds; poll(2) has no finer
        // granularity and rounding down would busy-spin near the deadline.
        let timeout_ms = timeout
            .as_micros()
            .div_ceil(1000)
            .min(i32::MAX as u128) as i32;

        let ret = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new()); // signal; caller re-checks its stop flag
            }
            return Err(Error::Source(format!("poll: {err}")));
        }
        if ret == 0 {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for (slot, fd) in fds.iter().enumerate() {
            if fd.revents & libc::POLLIN != 0 {
                Self::drain_device(slot, &mut self.devices[slot], &mut out);
            }
        }
        Ok(out)
    }
}

fn set_nonblocking(fd: i32) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Map a kernel input event to a slot event; anything else is ignored.
fn translate(kind: InputEventKind, value: i32) -> Option<SlotEvent> {
    match kind {
        InputEventKind::RelAxis(RelativeAxisType::REL_X) => Some(SlotEvent::MotionX(value)),
        InputEventKind::RelAxis(RelativeAxisType::REL_Y) => Some(SlotEvent::MotionY(value)),
        InputEventKind::RelAxis(RelativeAxisType::REL_WHEEL) => Some(SlotEvent::Wheel(value)),
        InputEventKind::Key(Key::BTN_LEFT) => Some(SlotEvent::Button(Button::Left, value != 0)),
        InputEventKind::Key(Key::BTN_RIGHT) => Some(SlotEvent::Button(Button::Right, value != 0)),
        InputEventKind::Key(Key::BTN_MIDDLE) => Some(SlotEvent::Button(Button::Middle, value != 0)),
        _ => None,
    }
}

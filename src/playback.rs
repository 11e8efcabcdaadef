//! Playback state machine for a frame sequence
//!
//! Mirrors the browser-side controls embedded in the player page: the page
//! script holds one of these per tab, the server never does. The script's
//! guards are the [`script`] constants, each paired with the method that
//! implements the same condition here.
//!
//! # Rules
//!
//! - `next` / `prev` clamp at the sequence bounds (no wraparound)
//! - `tick` (timer-driven advance) restarts at ordinal 0 after the last frame
//! - `seek` ignores out-of-range ordinals
//! - at most one timer is live; changing the interval while playing replaces it
//! - toggling twice restores the original state with no timer left behind

use log::trace;

/// Interval used when nothing else is configured
pub const DEFAULT_INTERVAL_MS: u32 = 500;

/// Interval choices offered by the speed select
pub const INTERVAL_PRESETS: &[(u32, &str)] = &[
    (1000, "Slow (1 sec/frame)"),
    (500, "Normal (0.5 sec/frame)"),
    (250, "Fast (0.25 sec/frame)"),
    (100, "Very Fast (0.1 sec/frame)"),
];

/// Script spelling of the rules, spliced into the player page
pub mod script {
    /// Ordinal [`super::Playback::tick`] moves to
    pub const TICK_TARGET: &str = "current >= FRAMES.length - 1 ? 0 : current + 1";
    /// [`super::Playback::next`] moves only when this holds
    pub const CAN_NEXT: &str = "current < FRAMES.length - 1";
    /// [`super::Playback::prev`] moves only when this holds
    pub const CAN_PREV: &str = "current > 0";
    /// [`super::Playback::seek`] ignores ordinals failing this
    pub const SEEK_IN_RANGE: &str = "index >= 0 && index < FRAMES.length";
    /// [`super::Playback::play`] and `toggle` do nothing on an empty sequence
    pub const CAN_PLAY: &str = "FRAMES.length > 0";
    /// [`super::Playback::set_interval`] ignores anything else
    pub const INTERVAL_VALID: &str = "ms > 0";
}

/// Handle of a running advance timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct Playback {
    len: usize,
    current: usize,
    interval_ms: u32,
    timer: Option<TimerId>,
    next_timer: u64,
}

impl Playback {
    pub fn new(len: usize, interval_ms: u32) -> Self {
        Self {
            len,
            current: 0,
            interval_ms: interval_ms.max(1),
            timer: None,
            next_timer: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn is_playing(&self) -> bool {
        self.timer.is_some()
    }

    /// Currently live timer, if playing
    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Readout text, e.g. `Frame 1 / 12`
    pub fn position_label(&self) -> String {
        if self.is_empty() {
            return "No frames".to_string();
        }
        format!("Frame {} / {}", self.current + 1, self.len)
    }

    /// Step forward; no-op on the last frame. Returns true if moved.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.len {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Step backward; no-op on the first frame. Returns true if moved.
    pub fn prev(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `ordinal`; ignored when out of range.
    pub fn seek(&mut self, ordinal: usize) -> bool {
        if ordinal < self.len {
            self.current = ordinal;
            true
        } else {
            trace!("Ignoring seek to {} (len {})", ordinal, self.len);
            false
        }
    }

    /// Timer-driven advance, restarting at 0 after the last frame.
    pub fn tick(&mut self) -> Option<usize> {
        if !self.is_playing() || self.is_empty() {
            return None;
        }
        self.current = if self.current >= self.len - 1 {
            0
        } else {
            self.current + 1
        };
        Some(self.current)
    }

    /// Switch between playing and paused. Returns the new playing flag.
    pub fn toggle(&mut self) -> bool {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.is_playing()
    }

    pub fn play(&mut self) {
        if self.is_empty() {
            return;
        }
        self.restart_timer();
    }

    pub fn pause(&mut self) {
        if let Some(id) = self.timer.take() {
            trace!("Timer {:?} stopped", id);
        }
    }

    /// Change the advance interval; a running timer is replaced, not added to.
    pub fn set_interval(&mut self, interval_ms: u32) {
        if interval_ms == 0 {
            return;
        }
        self.interval_ms = interval_ms;
        if self.is_playing() {
            self.restart_timer();
        }
    }

    fn restart_timer(&mut self) {
        self.pause();
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        trace!("Timer {:?} started ({} ms)", id, self.interval_ms);
        self.timer = Some(id);
    }
}

//! Long-press recognition.
//!
//! The viewer's long-press action (delete, share, ...) must fire only once a
//! press is *confirmed* — held long enough without drifting — never on the
//! initial touch-down, or it would trigger constantly during ordinary
//! scrolling and panning.
//!
//! Hosts with a platform recognizer feed [`GesturePhase`]s straight to
//! [`crate::viewer::PhotoView::long_press`]. Hosts with only raw touch events
//! drive a [`LongPressRecognizer`] and forward the phases it emits.

use crate::zoom::Point;
use std::time::Duration;

/// Minimum hold before a press confirms. Matches the common platform default.
pub const LONG_PRESS_DURATION: Duration = Duration::from_millis(500);

/// Movement allowance in logical pixels. Within this radius a press is still
/// a press; beyond it the finger is scrolling. 8 px is the conventional
/// touch slop (Android's `TOUCH_SLOP` is ~8 dp).
pub const TOUCH_SLOP: f32 = 8.0;

/// Lifecycle of a press, mirroring platform gesture-recognizer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// Touch is down but nothing is confirmed yet.
    Possible,
    /// The press held long enough: the long-press action fires now.
    Began,
    /// A confirmed press lifted.
    Ended,
    /// The press failed — moved beyond the slop or lifted too early.
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct LongPressConfig {
    pub min_duration: Duration,
    pub touch_slop: f32,
}

impl Default for LongPressConfig {
    fn default() -> Self {
        Self {
            min_duration: LONG_PRESS_DURATION,
            touch_slop: TOUCH_SLOP,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    /// Touch down, timer running.
    Pending { origin: Point, pressed_at: Duration },
    /// Held past the threshold; `Began` has been emitted.
    Confirmed,
    /// Moved too far; dead until the touch lifts.
    Failed,
}

/// Recognizes long presses from raw touch events.
///
/// Timestamps are host-supplied durations from any fixed origin (frame clock,
/// touch-event timestamps) — the recognizer only ever subtracts them, which
/// also keeps tests free of real sleeps.
#[derive(Debug)]
pub struct LongPressRecognizer {
    config: LongPressConfig,
    state: State,
}

impl Default for LongPressRecognizer {
    fn default() -> Self {
        Self::new(LongPressConfig::default())
    }
}

impl LongPressRecognizer {
    pub fn new(config: LongPressConfig) -> Self {
        Self {
            config,
            state: State::Idle,
        }
    }

    /// Finger down. Never confirms immediately.
    pub fn touch_down(&mut self, at: Point, timestamp: Duration) -> GesturePhase {
        self.state = State::Pending {
            origin: at,
            pressed_at: timestamp,
        };
        GesturePhase::Possible
    }

    /// Finger moved. Movement beyond the slop fails the press; after
    /// confirmation, movement is the host's pan-during-press to handle.
    pub fn touch_move(&mut self, at: Point, timestamp: Duration) -> GesturePhase {
        match self.state {
            State::Pending { origin, .. } => {
                let dx = at.x - origin.x;
                let dy = at.y - origin.y;
                if (dx * dx + dy * dy).sqrt() > self.config.touch_slop {
                    self.state = State::Failed;
                    GesturePhase::Cancelled
                } else {
                    // Still within the slop; the timer keeps running.
                    self.tick(timestamp).unwrap_or(GesturePhase::Possible)
                }
            }
            State::Confirmed => GesturePhase::Began,
            State::Idle | State::Failed => GesturePhase::Cancelled,
        }
    }

    /// Clock tick (or repeated touch event). Returns `Some(Began)` exactly
    /// once, at the moment the press confirms.
    pub fn tick(&mut self, timestamp: Duration) -> Option<GesturePhase> {
        if let State::Pending { pressed_at, .. } = self.state {
            if timestamp.saturating_sub(pressed_at) >= self.config.min_duration {
                self.state = State::Confirmed;
                return Some(GesturePhase::Began);
            }
        }
        None
    }

    /// Finger up. Ends a confirmed press, cancels an unconfirmed one.
    pub fn touch_up(&mut self, _timestamp: Duration) -> GesturePhase {
        let phase = match self.state {
            State::Confirmed => GesturePhase::Ended,
            _ => GesturePhase::Cancelled,
        };
        self.state = State::Idle;
        phase
    }
}

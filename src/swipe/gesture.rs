//! Pan and tap recognition over one pointer stream.
//!
//! Both recognizers watch every event of a press. Neither claims the press
//! until the pointer has travelled more than the activation offset:
//! horizontal travel activates the pan, vertical travel hands the press to
//! whatever scrolls the list, and a press that stays inside the offset and
//! is released in time is a tap.

use std::collections::VecDeque;
use std::time::Duration;

/// Samples older than this (relative to the newest) are ignored for the
/// release velocity.
const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

/// Raw pointer input in row-local units. `time` is measured from any fixed
/// origin, as long as it is the same for a whole press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32, time: Duration },
    Move { x: f32, y: f32, time: Duration },
    Up { x: f32, y: f32, time: Duration },
    Cancel,
}

/// What the recognizers made of one pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    None,
    /// The pan just activated; `translation_x` is the travel since the press.
    PanStart { translation_x: f32 },
    PanUpdate { translation_x: f32 },
    /// The pan ended; velocity in units per second, negative is leftward.
    PanEnd { velocity_x: f32 },
    Tap,
}

#[derive(Debug)]
struct Press {
    origin_x: f32,
    origin_y: f32,
    started: Duration,
    samples: VecDeque<(Duration, f32)>,
    panning: bool,
    /// Vertical travel won; the press belongs to the scroll container.
    yielded: bool,
}

impl Press {
    fn record(&mut self, time: Duration, x: f32) {
        self.samples.push_back((time, x));
        // Two samples always survive so a press that rested before release
        // still yields a (small) velocity.
        while self.samples.len() > 2 {
            match self.samples.front() {
                Some(&(t, _)) if time.saturating_sub(t) > VELOCITY_WINDOW => {
                    self.samples.pop_front();
                }
                _ => break,
            }
        }
    }

    /// Velocity across the retained samples, in units per second.
    fn velocity(&self) -> f32 {
        let (Some(&(t0, x0)), Some(&(t1, x1))) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        let dt = t1.saturating_sub(t0).as_secs_f32();
        if dt <= 0.0 {
            return 0.0;
        }
        (x1 - x0) / dt
    }
}

/// Tracks one press at a time and classifies it as pan, tap or neither.
#[derive(Debug)]
pub struct GestureTracker {
    activation_offset: f32,
    tap_max_duration: Duration,
    press: Option<Press>,
}

impl GestureTracker {
    pub fn new(activation_offset: f32, tap_max_duration: Duration) -> GestureTracker {
        GestureTracker {
            activation_offset,
            tap_max_duration,
            press: None,
        }
    }

    /// Whether a pan is currently active.
    pub fn is_panning(&self) -> bool {
        self.press.as_ref().is_some_and(|p| p.panning)
    }

    /// Whether a press is in progress.
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn handle(&mut self, event: PointerEvent) -> GestureOutcome {
        match event {
            PointerEvent::Down { x, y, time } => {
                // A Down without a matching Up still has to finish the old pan.
                let dangling = self.press.take().is_some_and(|p| p.panning);
                let mut press = Press {
                    origin_x: x,
                    origin_y: y,
                    started: time,
                    samples: VecDeque::new(),
                    panning: false,
                    yielded: false,
                };
                press.record(time, x);
                self.press = Some(press);
                if dangling {
                    GestureOutcome::PanEnd { velocity_x: 0.0 }
                } else {
                    GestureOutcome::None
                }
            }
            PointerEvent::Move { x, y, time } => {
                let activation = self.activation_offset;
                let Some(press) = self.press.as_mut() else {
                    return GestureOutcome::None;
                };
                press.record(time, x);
                let dx = x - press.origin_x;
                let dy = y - press.origin_y;
                if press.yielded {
                    GestureOutcome::None
                } else if press.panning {
                    GestureOutcome::PanUpdate { translation_x: dx }
                } else if dx.abs() > activation {
                    press.panning = true;
                    GestureOutcome::PanStart { translation_x: dx }
                } else if dy.abs() > activation {
                    press.yielded = true;
                    GestureOutcome::None
                } else {
                    GestureOutcome::None
                }
            }
            PointerEvent::Up { x, y, time } => {
                let Some(mut press) = self.press.take() else {
                    return GestureOutcome::None;
                };
                press.record(time, x);
                if press.panning {
                    return GestureOutcome::PanEnd {
                        velocity_x: press.velocity(),
                    };
                }
                let within_slop = (x - press.origin_x).abs() <= self.activation_offset
                    && (y - press.origin_y).abs() <= self.activation_offset;
                let quick = time.saturating_sub(press.started) <= self.tap_max_duration;
                if !press.yielded && within_slop && quick {
                    GestureOutcome::Tap
                } else {
                    GestureOutcome::None
                }
            }
            PointerEvent::Cancel => match self.press.take() {
                Some(press) if press.panning => GestureOutcome::PanEnd { velocity_x: 0.0 },
                _ => GestureOutcome::None,
            },
        }
    }
}

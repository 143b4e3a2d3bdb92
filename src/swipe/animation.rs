//! Time-driven interpolation behind the swipe row's snap.
//!
//! The row never touches a real timer. It asks an [`Animator`] to move a value
//! and reads the interpolated value back, so the state machine can be driven
//! by a [`ManualClock`] in tests and by [`SystemClock`] in the terminal UI.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time, expressed as the duration since the clock's
/// own origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]. Copies share the same origin.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock. Clones observe the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> ManualClock {
        ManualClock::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// The representation of an easing curve for snap animations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    Linear,
    /// Quadratic ease in, ease out.
    #[default]
    EaseInOutQuad,
}

impl Easing {
    /// Maps progress in `[0, 1]` to eased progress in `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Moves a single scalar toward a target over time.
pub trait Animator {
    /// Starts interpolating from `from` to `to`, replacing any animation in
    /// flight.
    fn animate(&mut self, from: f32, to: f32, duration: Duration);
    /// The interpolated value, or `None` once the animation has settled.
    fn current(&self) -> Option<f32>;
    /// Abandons the animation in flight.
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy)]
struct Run {
    from: f32,
    to: f32,
    started: Duration,
    duration: Duration,
}

/// Interpolates against a [`Clock`] with an [`Easing`] curve.
#[derive(Debug, Clone)]
pub struct TimedAnimator<C: Clock = SystemClock> {
    clock: C,
    easing: Easing,
    run: Option<Run>,
}

impl<C: Clock> TimedAnimator<C> {
    pub fn new(clock: C) -> TimedAnimator<C> {
        TimedAnimator {
            clock,
            easing: Easing::default(),
            run: None,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> TimedAnimator<C> {
        self.easing = easing;
        self
    }
}

impl<C: Clock> Animator for TimedAnimator<C> {
    fn animate(&mut self, from: f32, to: f32, duration: Duration) {
        self.run = if duration.is_zero() || from == to {
            None
        } else {
            Some(Run {
                from,
                to,
                started: self.clock.now(),
                duration,
            })
        };
    }

    fn current(&self) -> Option<f32> {
        let run = self.run.as_ref()?;
        let elapsed = self.clock.now().saturating_sub(run.started);
        if elapsed >= run.duration {
            return None;
        }
        let progress = elapsed.as_secs_f32() / run.duration.as_secs_f32();
        Some(run.from + (run.to - run.from) * self.easing.apply(progress))
    }

    fn stop(&mut self) {
        self.run = None;
    }
}

/// Settles every animation instantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateAnimator;

impl Animator for ImmediateAnimator {
    fn animate(&mut self, _from: f32, _to: f32, _duration: Duration) {}

    fn current(&self) -> Option<f32> {
        None
    }

    fn stop(&mut self) {}
}

//! Swipe-to-reveal rows.
//!
//! A row's content can be dragged left to uncover an action area of fixed
//! width on its right. On release the row snaps fully open or fully closed;
//! it never rests in between. [`SwipeState`] is the state machine over the
//! offset, [`SwipeRow`] adds pointer handling and the open/close callbacks,
//! and [`widget::SwipeRowView`] draws a row at its current offset.
//!
//! # Invariants
//! - `offset()` always lies in `[-action_width, 0]`.
//! - `Opened` is reported only on a closed to open crossing, `Closed` only on
//!   an open to closed crossing.
//! - A drag that starts mid-animation picks up the interpolated offset.

pub mod animation;
pub mod gesture;
pub mod widget;

use std::time::Duration;

use log::{trace, warn};

pub use animation::{Animator, Clock, ImmediateAnimator, ManualClock, SystemClock, TimedAnimator};
pub use gesture::{GestureOutcome, GestureTracker, PointerEvent};
pub use widget::SwipeRowView;

/// Width of the revealed action area, in units.
pub const ACTION_WIDTH: f32 = 80.0;
/// Release velocity beyond which a leftward flick opens the row, in units/s.
pub const VELOCITY_THRESHOLD: f32 = 500.0;
/// Horizontal travel needed before the pan claims a press, in units.
pub const ACTIVATION_OFFSET: f32 = 10.0;
pub const SNAP_DURATION: Duration = Duration::from_millis(200);
/// Presses held longer than this are not taps.
pub const TAP_MAX_DURATION: Duration = Duration::from_millis(500);
/// Units covered by one terminal column.
pub const UNITS_PER_COLUMN: f32 = 8.0;

/// Converts a (non-positive) offset in units to the number of columns the
/// content is shifted left by.
pub fn units_to_columns(offset: f32) -> u16 {
    let cols = (-offset / UNITS_PER_COLUMN).round();
    if cols.is_nan() || cols <= 0.0 {
        0
    } else {
        cols.min(u16::MAX as f32) as u16
    }
}

pub fn columns_to_units(columns: u16) -> f32 {
    columns as f32 * UNITS_PER_COLUMN
}

/// Tunables of a swipe row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    pub action_width: f32,
    pub velocity_threshold: f32,
    pub activation_offset: f32,
    pub snap_duration: Duration,
    pub tap_max_duration: Duration,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        SwipeConfig {
            action_width: ACTION_WIDTH,
            velocity_threshold: VELOCITY_THRESHOLD,
            activation_offset: ACTIVATION_OFFSET,
            snap_duration: SNAP_DURATION,
            tap_max_duration: TAP_MAX_DURATION,
        }
    }
}

impl SwipeConfig {
    /// Half the action width: released further left than this, the row opens.
    pub fn snap_threshold(&self) -> f32 {
        self.action_width / 2.0
    }

    /// The snap decision taken on release. Either condition alone opens.
    pub fn should_open(&self, offset: f32, velocity_x: f32) -> bool {
        offset < -self.snap_threshold() || velocity_x < -self.velocity_threshold
    }
}

/// A discrete open/close crossing, handed back so the host can react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeEvent {
    Opened,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Closed,
    Dragging,
    /// Snapping toward `target` (either `0` or `-action_width`).
    Animating { target: f32 },
    Open,
}

/// Offset state of one row.
#[derive(Debug)]
pub struct SwipeState<A: Animator = ImmediateAnimator> {
    config: SwipeConfig,
    animator: A,
    /// Live offset while dragging, snap target otherwise.
    offset: f32,
    is_open: bool,
    drag_origin: Option<f32>,
}

impl Default for SwipeState<ImmediateAnimator> {
    fn default() -> Self {
        SwipeState::new(SwipeConfig::default(), ImmediateAnimator)
    }
}

impl<A: Animator> SwipeState<A> {
    /// A closed row at rest. An `action_width` that is not a positive finite
    /// number falls back to [`ACTION_WIDTH`].
    pub fn new(mut config: SwipeConfig, animator: A) -> SwipeState<A> {
        if !(config.action_width.is_finite() && config.action_width > 0.0) {
            warn!(
                "event=swipe_config module=swipe status=rejected action_width={}",
                config.action_width
            );
            config.action_width = ACTION_WIDTH;
        }
        SwipeState {
            config,
            animator,
            offset: 0.0,
            is_open: false,
            drag_origin: None,
        }
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    /// The offset as it should be drawn right now.
    pub fn offset(&self) -> f32 {
        if self.drag_origin.is_some() {
            return self.offset;
        }
        self.animator.current().unwrap_or(self.offset)
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.drag_origin.is_none() && self.animator.current().is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.is_dragging() {
            Phase::Dragging
        } else if self.is_animating() {
            Phase::Animating {
                target: self.offset,
            }
        } else if self.is_open {
            Phase::Open
        } else {
            Phase::Closed
        }
    }

    /// Begins a drag from wherever the row is drawn now, superseding any
    /// snap in flight.
    pub fn start_drag(&mut self) -> Option<SwipeEvent> {
        let origin = self.offset();
        self.animator.stop();
        self.offset = origin;
        self.drag_origin = Some(origin);
        trace!("event=swipe_drag_start module=swipe origin={origin}");
        None
    }

    /// Moves the row to `origin + translation_x`, clamped to the action range.
    pub fn update_drag(&mut self, translation_x: f32) -> Option<SwipeEvent> {
        if translation_x.is_nan() {
            return None;
        }
        if self.drag_origin.is_none() {
            self.start_drag();
        }
        let origin = self.drag_origin.unwrap_or(self.offset);
        self.offset = (origin + translation_x)
            .max(-self.config.action_width)
            .min(0.0);
        None
    }

    /// Releases the drag and snaps open or closed.
    ///
    /// Returns `None` when there is no drag to release.
    pub fn end_drag(&mut self, velocity_x: f32) -> Option<SwipeEvent> {
        self.drag_origin.take()?;
        let velocity_x = if velocity_x.is_nan() { 0.0 } else { velocity_x };
        let open = self.config.should_open(self.offset, velocity_x);
        trace!(
            "event=swipe_release module=swipe offset={} velocity={} open={}",
            self.offset,
            velocity_x,
            open
        );
        if open {
            self.snap_to(-self.config.action_width);
            if !self.is_open {
                self.is_open = true;
                return Some(SwipeEvent::Opened);
            }
        } else {
            self.snap_to(0.0);
            if self.is_open {
                self.is_open = false;
                return Some(SwipeEvent::Closed);
            }
        }
        None
    }

    /// A tap on the row: closes it when open, does nothing otherwise.
    pub fn tap(&mut self) -> Option<SwipeEvent> {
        if self.is_open {
            self.close()
        } else {
            None
        }
    }

    /// Snaps an open row closed. A row that is not open is left alone.
    pub fn close(&mut self) -> Option<SwipeEvent> {
        if !self.is_open {
            return None;
        }
        self.drag_origin = None;
        self.snap_to(0.0);
        self.is_open = false;
        Some(SwipeEvent::Closed)
    }

    /// Snaps a closed row open. A row that is already open is left alone.
    pub fn open(&mut self) -> Option<SwipeEvent> {
        if self.is_open {
            return None;
        }
        self.drag_origin = None;
        self.snap_to(-self.config.action_width);
        self.is_open = true;
        Some(SwipeEvent::Opened)
    }

    fn snap_to(&mut self, target: f32) {
        let from = self.offset();
        self.animator.animate(from, target, self.config.snap_duration);
        self.offset = target;
    }
}

type Callback = Box<dyn FnMut()>;

/// A swipeable row: offset state, pointer recognition, and the host's
/// open/close callbacks.
///
/// Callbacks run synchronously, before the triggering call returns, and
/// the same crossing is also returned to the caller.
pub struct SwipeRow<A: Animator = TimedAnimator> {
    state: SwipeState<A>,
    gestures: GestureTracker,
    on_open: Option<Callback>,
    on_close: Option<Callback>,
}

impl<A: Animator> SwipeRow<A> {
    pub fn new(config: SwipeConfig, animator: A) -> SwipeRow<A> {
        SwipeRow {
            state: SwipeState::new(config, animator),
            gestures: GestureTracker::new(config.activation_offset, config.tap_max_duration),
            on_open: None,
            on_close: None,
        }
    }

    pub fn with_on_open(mut self, callback: impl FnMut() + 'static) -> SwipeRow<A> {
        self.on_open = Some(Box::new(callback));
        self
    }

    pub fn with_on_close(mut self, callback: impl FnMut() + 'static) -> SwipeRow<A> {
        self.on_close = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> &SwipeState<A> {
        &self.state
    }

    pub fn gestures(&self) -> &GestureTracker {
        &self.gestures
    }

    /// Feeds one pointer event through the pan and tap recognizers.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<SwipeEvent> {
        match self.gestures.handle(event) {
            GestureOutcome::None => None,
            GestureOutcome::PanStart { translation_x } => {
                self.state.start_drag();
                self.state.update_drag(translation_x)
            }
            GestureOutcome::PanUpdate { translation_x } => self.state.update_drag(translation_x),
            GestureOutcome::PanEnd { velocity_x } => self.end_drag(velocity_x),
            GestureOutcome::Tap => self.tap(),
        }
    }

    pub fn start_drag(&mut self) -> Option<SwipeEvent> {
        self.state.start_drag()
    }

    pub fn update_drag(&mut self, translation_x: f32) -> Option<SwipeEvent> {
        self.state.update_drag(translation_x)
    }

    pub fn end_drag(&mut self, velocity_x: f32) -> Option<SwipeEvent> {
        let event = self.state.end_drag(velocity_x);
        self.dispatch(event)
    }

    pub fn tap(&mut self) -> Option<SwipeEvent> {
        let event = self.state.tap();
        self.dispatch(event)
    }

    pub fn close(&mut self) -> Option<SwipeEvent> {
        let event = self.state.close();
        self.dispatch(event)
    }

    pub fn open(&mut self) -> Option<SwipeEvent> {
        let event = self.state.open();
        self.dispatch(event)
    }

    fn dispatch(&mut self, event: Option<SwipeEvent>) -> Option<SwipeEvent> {
        let callback = match event? {
            SwipeEvent::Opened => self.on_open.as_mut(),
            SwipeEvent::Closed => self.on_close.as_mut(),
        };
        if let Some(callback) = callback {
            callback();
        }
        event
    }
}

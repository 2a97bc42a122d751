//! Time-based property animation.
//!
//! A tween moves one node property from a snapshot of its value at the time
//! the tween was started towards a target, over a fixed duration, shaped by an
//! easing curve. Tweens are advanced by [`Tree::update`](crate::tree::Tree::update).

use std::{fmt, time::Duration};

use crate::{geom::Point, hooks::Deferred};

/// Callback fired once when a tween completes.
pub type TweenCallback = Box<dyn FnOnce(&mut Deferred)>;

/// An animatable property and its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenValue {
    /// Node opacity.
    Opacity(f32),
    /// Declared node position, as `(left, top)`.
    Position(Point),
}

/// How a tween's target value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenMode {
    /// The target is the final value.
    #[default]
    Absolute,
    /// The target is added to the starting value.
    Relative,
}

/// Easing curves, mapping linear progress in `[0, 1]` to an interpolation
/// factor.
#[derive(Debug, Clone, Copy, Default)]
pub enum Easing {
    /// `t`
    #[default]
    Linear,
    /// `t²`
    EaseIn,
    /// `t(2 - t)`
    EaseOut,
    /// Quadratic in, then quadratic out.
    EaseInOut,
    /// A caller-supplied curve.
    Custom(fn(f64) -> f64),
}

impl Easing {
    /// Apply the curve.
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::Custom(f) => f(t),
        }
    }
}

/// A request to animate a node, passed to
/// [`Tree::animate`](crate::tree::Tree::animate).
pub struct TweenSpec {
    /// Target value. The variant selects the property.
    pub(crate) target: TweenValue,
    /// Total running time.
    pub(crate) duration: Duration,
    /// Curve.
    pub(crate) easing: Easing,
    /// Absolute or relative target.
    pub(crate) mode: TweenMode,
    /// Completion callback.
    pub(crate) callback: Option<TweenCallback>,
}

impl TweenSpec {
    /// Animate towards `target` over `duration`, linearly and absolutely.
    pub fn new(target: TweenValue, duration: Duration) -> Self {
        Self {
            target,
            duration,
            easing: Easing::Linear,
            mode: TweenMode::Absolute,
            callback: None,
        }
    }

    /// Animate opacity.
    pub fn opacity(target: f32, duration: Duration) -> Self {
        Self::new(TweenValue::Opacity(target), duration)
    }

    /// Animate the declared position.
    pub fn position(left: i32, top: i32, duration: Duration) -> Self {
        Self::new(TweenValue::Position(Point::new(left, top)), duration)
    }

    /// Set the easing curve.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Treat the target as an offset from the starting value.
    pub fn relative(mut self) -> Self {
        self.mode = TweenMode::Relative;
        self
    }

    /// Set the target mode.
    pub fn mode(mut self, mode: TweenMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run `f` once when the tween completes.
    pub fn on_complete(mut self, f: impl FnOnce(&mut Deferred) + 'static) -> Self {
        self.callback = Some(Box::new(f));
        self
    }
}

/// A running tween.
pub struct Tween {
    /// Property value when the tween started.
    from: TweenValue,
    /// Target as requested.
    to: TweenValue,
    /// Total running time.
    duration: Duration,
    /// Time advanced so far.
    elapsed: Duration,
    /// Curve.
    easing: Easing,
    /// Absolute or relative target.
    mode: TweenMode,
    /// Completion callback, taken when it fires.
    callback: Option<TweenCallback>,
    /// Set once progress reaches one.
    complete: bool,
}

impl Tween {
    /// Start a tween from `from`. The caller guarantees that `from` and the
    /// `spec.target` name the same property.
    pub(crate) fn start(from: TweenValue, spec: TweenSpec) -> Self {
        Self {
            from,
            to: spec.target,
            duration: spec.duration,
            elapsed: Duration::ZERO,
            easing: spec.easing,
            mode: spec.mode,
            callback: spec.callback,
            complete: false,
        }
    }

    /// Has this tween finished?
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Linear progress in `[0, 1]`. A zero duration is complete at once.
    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_nanos() as f64 / self.duration.as_nanos() as f64).min(1.0)
    }

    /// Advance by `dt` and return the property value to apply. On the step
    /// that reaches the end, the completion callback is returned as well.
    pub(crate) fn advance(&mut self, dt: Duration) -> (TweenValue, Option<TweenCallback>) {
        self.elapsed += dt;
        let t = self.progress();
        let factor = self.easing.apply(t);
        let relative = self.mode == TweenMode::Relative;
        let value = match (self.from, self.to) {
            (TweenValue::Opacity(old), TweenValue::Opacity(new)) => {
                let diff = if relative { new } else { new - old };
                TweenValue::Opacity(old + diff * factor as f32)
            }
            (TweenValue::Position(old), TweenValue::Position(new)) => {
                let (dx, dy) = if relative {
                    (new.x, new.y)
                } else {
                    (new.x - old.x, new.y - old.y)
                };
                let lerp = |o: i32, d: i32| (f64::from(o) + f64::from(d) * factor).floor() as i32;
                TweenValue::Position(Point::new(lerp(old.x, dx), lerp(old.y, dy)))
            }
            // Mismatched pairs cannot be constructed through `Tree::animate`.
            (from, _) => from,
        };
        let mut callback = None;
        if t >= 1.0 {
            self.complete = true;
            callback = self.callback.take();
        }
        (value, callback)
    }
}

impl fmt::Debug for Tween {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("complete", &self.complete)
            .finish_non_exhaustive()
    }
}

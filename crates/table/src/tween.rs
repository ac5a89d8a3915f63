//! Time-based animation of a single scalar
//!
//! [`Tween`] moves a value from a start to a target over a fixed duration
//! along an [`Ease`] curve. [`Animated`] owns a value together with at most
//! one in-flight tween, and starting a new animation replaces the old one
//! from wherever the value currently is.

/// Easing curve applied to normalised progress
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Quadratic ease-in-out
    #[default]
    Power1InOut,
}

impl Ease {
    /// Map progress `t` in `[0, 1]` onto the curve.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
        }
    }
}

/// Result of one tick
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TweenStep {
    pub value: f32,
    /// Set on the tick that reached the target, and every tick after
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    ease: Ease,
}

impl Tween {
    #[must_use]
    pub fn new(from: f32, to: f32, duration: f32, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            ease,
        }
    }

    #[must_use]
    pub fn target(&self) -> f32 {
        self.to
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Current value; exactly the target once complete.
    #[must_use]
    pub fn value(&self) -> f32 {
        if self.is_complete() {
            return self.to;
        }
        let t = self.ease.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * t
    }

    pub fn advance(&mut self, dt: f32) -> TweenStep {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        TweenStep {
            value: self.value(),
            completed: self.is_complete(),
        }
    }
}

/// A scalar that may be animating towards a target
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animated {
    value: f32,
    tween: Option<Tween>,
}

impl Animated {
    #[must_use]
    pub fn new(value: f32) -> Self {
        Self { value, tween: None }
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Target of the in-flight animation, if any
    #[must_use]
    pub fn target(&self) -> Option<f32> {
        self.tween.as_ref().map(Tween::target)
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Kill any in-flight animation and head for `target` from the current
    /// value.
    pub fn animate_to(&mut self, target: f32, duration: f32, ease: Ease) {
        self.tween = Some(Tween::new(self.value, target, duration, ease));
    }

    /// Stop animating and jump straight to `value`.
    pub fn snap(&mut self, value: f32) {
        self.tween = None;
        self.value = value;
    }

    /// Tick the in-flight animation. Returns `None` when idle. The tween is
    /// dropped on the tick that completes it.
    pub fn advance(&mut self, dt: f32) -> Option<TweenStep> {
        let step = self.tween.as_mut()?.advance(dt);
        self.value = step.value;
        if step.completed {
            self.tween = None;
        }
        Some(step)
    }
}

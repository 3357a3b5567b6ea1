//! Fixed-duration interpolation between two values
//!
//! A tween never overshoots: once `elapsed >= duration` it reports the target
//! exactly. An interrupted transition continues from where it was by starting
//! a fresh tween at the live value.

use crate::easing::Easing;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    /// Seconds
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Linear progress in `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        if self.duration <= f32::EPSILON {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn value(&self) -> f32 {
        if self.is_finished() {
            return self.to;
        }
        let t = self.easing.apply(self.progress());
        self.from + (self.to - self.from) * t
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt` seconds and return the new value
    pub fn step(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }
}

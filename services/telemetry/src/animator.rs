//! Linear value animation in fixed frame steps.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnimationState {
    Idle,
    Running,
    Cancelled,
}

/// Animates a displayed value toward a target, one frame at a time.
///
/// The path is `from + (target - from) * k / n` for frame `k` of `n`, so
/// the value is monotonic toward the target and the last frame lands on
/// `target` exactly. Retargeting restarts the path from whatever is currently
/// displayed.
#[derive(Debug, Clone)]
pub struct ValueAnimator {
    displayed: f64,
    from: f64,
    target: f64,
    frame: u32,
    total_frames: u32,
    frame_interval: Duration,
    duration: Duration,
    state: AnimationState,
}

impl ValueAnimator {
    pub fn new(duration: Duration, frame_interval: Duration) -> Self {
        Self {
            displayed: 0.0,
            from: 0.0,
            target: 0.0,
            frame: 0,
            total_frames: frames_for(duration, frame_interval),
            frame_interval,
            duration,
            state: AnimationState::Idle,
        }
    }

    pub fn value(&self) -> f64 {
        self.displayed
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_animating(&self) -> bool {
        self.state == AnimationState::Running
    }

    /// Fraction of the current animation already played, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        match self.state {
            AnimationState::Running => f64::from(self.frame) / f64::from(self.total_frames),
            _ => 1.0,
        }
    }

    /// Start animating toward `target` from the current displayed value.
    pub fn retarget(&mut self, target: f64) {
        if !target.is_finite() {
            tracing::warn!(target, "Ignoring non-finite animation target");
            return;
        }
        self.from = self.displayed;
        self.target = target;
        self.frame = 0;
        self.state = AnimationState::Running;
    }

    /// Jump straight to `value` without animating.
    pub fn set_immediate(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.displayed = value;
        self.from = value;
        self.target = value;
        self.frame = 0;
        self.state = AnimationState::Idle;
    }

    /// Advance one frame. Returns the emitted value, or `None` when idle or
    /// cancelled.
    pub fn advance(&mut self) -> Option<f64> {
        if self.state != AnimationState::Running {
            return None;
        }

        self.frame += 1;
        if self.frame >= self.total_frames {
            self.displayed = self.target;
            self.state = AnimationState::Idle;
        } else {
            let t = f64::from(self.frame) / f64::from(self.total_frames);
            let raw = self.from + (self.target - self.from) * t;
            // Float error must never carry the value past either end.
            let (lo, hi) = if self.from <= self.target {
                (self.displayed, self.target)
            } else {
                (self.target, self.displayed)
            };
            self.displayed = raw.max(lo).min(hi);
        }
        Some(self.displayed)
    }

    /// Stop the in-flight animation; the displayed value stays where it is.
    pub fn cancel(&mut self) {
        if self.state == AnimationState::Running {
            self.state = AnimationState::Cancelled;
        }
    }
}

fn frames_for(duration: Duration, frame_interval: Duration) -> u32 {
    if frame_interval.is_zero() {
        return 1;
    }
    let frames = duration.as_nanos().div_ceil(frame_interval.as_nanos());
    frames.clamp(1, u128::from(u32::MAX)) as u32
}

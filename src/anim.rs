use crate::{anim_ease::Ease, core::TimeMs};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (*a as f64 + ((*b as f64 - *a as f64) * t)) as f32
    }
}

impl Lerp for kurbo::Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        kurbo::Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// One interruptible tween. Unlike an authored keyframe track, a transition
/// only ever knows "where I was when last retargeted" and "where I am going";
/// retargeting mid-flight samples the current rendered value and restarts
/// from there, so overlapping updates compose instead of racing.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Transition<T> {
    from: T,
    target: T,
    started: TimeMs,
    duration_ms: f64,
    ease: Ease,
}

impl<T> Transition<T>
where
    T: Lerp + Clone + PartialEq,
{
    /// A transition already at rest at `value`.
    pub fn settled(value: T) -> Self {
        Self {
            from: value.clone(),
            target: value,
            started: TimeMs::ZERO,
            duration_ms: 0.0,
            ease: Ease::Linear,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn progress(&self, now: TimeMs) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (now.since(self.started) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self, now: TimeMs) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn value_at(&self, now: TimeMs) -> T {
        let t = self.ease.apply(self.progress(now));
        T::lerp(&self.from, &self.target, t)
    }

    /// Starts animating toward `target` from the currently rendered value.
    /// A no-op (returns false) when the transition is already heading to the
    /// same target, which keeps repeated identical updates from producing
    /// spurious restarts.
    pub fn retarget(&mut self, target: T, now: TimeMs, duration_ms: f64, ease: Ease) -> bool {
        if self.target == target {
            return false;
        }
        self.from = self.value_at(now);
        self.target = target;
        self.started = now;
        self.duration_ms = duration_ms.max(0.0);
        self.ease = ease;
        true
    }

    /// Freezes the transition at its current rendered value.
    pub fn cancel(&mut self, now: TimeMs) {
        let value = self.value_at(now);
        self.from = value.clone();
        self.target = value;
        self.started = now;
        self.duration_ms = 0.0;
    }

    /// Snaps to `value` with no animation.
    pub fn jump_to(&mut self, value: T, now: TimeMs) {
        self.from = value.clone();
        self.target = value;
        self.started = now;
        self.duration_ms = 0.0;
    }
}

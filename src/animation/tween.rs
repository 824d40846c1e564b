use super::{Animatable, SpringState, Transition};

/// Position/velocity threshold below which a spring counts as settled.
const SETTLE_THRESHOLD: f32 = 0.001;

/// Result of advancing an animation, indicating whether the value changed
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceResult<T> {
    /// Value did not change (animation not running or same value)
    NoChange,
    /// Value changed to a new value
    Changed(T),
}

impl<T> AdvanceResult<T> {
    /// Returns true if the value changed
    pub fn is_changed(&self) -> bool {
        matches!(self, AdvanceResult::Changed(_))
    }
}

/// A value animating from a start toward a target on an externally driven clock.
///
/// Time only moves when [`advance`](Tween::advance) is called, so the owner
/// decides what a frame is.
pub struct Tween<T: Animatable> {
    current: T,
    start: T,
    target: T,
    /// Seconds since the current animation started
    elapsed: f32,
    running: bool,
    transition: Transition,
    spring_state: Option<SpringState>,
    /// Whether the tween has received its first real value
    initialized: bool,
}

impl<T: Animatable> Tween<T> {
    pub fn new(initial_value: T, transition: Transition) -> Self {
        Self {
            current: initial_value.clone(),
            start: initial_value.clone(),
            target: initial_value,
            elapsed: 0.0,
            running: false,
            transition,
            spring_state: None,
            initialized: false,
        }
    }

    /// Start animating from the current value to `new_target`.
    pub fn animate_to(&mut self, new_target: T) {
        // Don't restart if we're already heading there
        if new_target == self.target {
            return;
        }

        self.start = self.current.clone();
        self.target = new_target;
        self.elapsed = 0.0;
        self.running = true;
        self.initialized = true;
        self.spring_state = self.transition.timing.spring_config().map(SpringState::new);
    }

    /// Advance by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> AdvanceResult<T> {
        if !self.running {
            return AdvanceResult::NoChange;
        }
        self.elapsed += dt.max(0.0);

        let progress = match (&mut self.spring_state, self.transition.timing.spring_config()) {
            (Some(spring), Some(config)) => {
                spring.step(dt, config);
                if spring.is_settled(SETTLE_THRESHOLD) {
                    1.0
                } else {
                    spring.position
                }
            }
            _ => {
                let t = if self.transition.duration > 0.0 {
                    self.elapsed / self.transition.duration
                } else {
                    1.0
                };
                self.transition.timing.evaluate(t)
            }
        };

        let settled = self
            .spring_state
            .as_ref()
            .map_or(false, |s| s.is_settled(SETTLE_THRESHOLD));
        let new_value = if settled || self.elapsed >= self.transition.duration {
            self.running = false;
            self.target.clone()
        } else {
            T::lerp(&self.start, &self.target, progress)
        };

        if new_value == self.current {
            AdvanceResult::NoChange
        } else {
            self.current = new_value.clone();
            AdvanceResult::Changed(new_value)
        }
    }

    /// Jump to the target and stop.
    pub fn finish(&mut self) {
        self.current = self.target.clone();
        self.running = false;
    }

    pub fn is_animating(&self) -> bool {
        self.running
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Set value immediately without animation
    pub fn set_immediate(&mut self, value: T) {
        self.current = value.clone();
        self.start = value.clone();
        self.target = value;
        self.running = false;
        self.spring_state = None;
        self.initialized = true;
    }

    /// True until the first `set_immediate` or `animate_to`
    pub fn is_initial(&self) -> bool {
        !self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{SpringConfig, TimingFunction};
    use crate::geometry::Frame;

    #[test]
    fn test_tween_starts_idle() {
        let tween = Tween::new(0.0f32, Transition::new(0.3, TimingFunction::Linear));
        assert!(!tween.is_animating());
        assert!(tween.is_initial());
    }

    #[test]
    fn test_linear_tween_reaches_target_at_duration() {
        let mut tween = Tween::new(0.0f32, Transition::new(1.0, TimingFunction::Linear));
        tween.animate_to(10.0);

        assert_eq!(tween.advance(0.5), AdvanceResult::Changed(5.0));
        assert!(tween.is_animating());
        assert_eq!(tween.advance(0.5), AdvanceResult::Changed(10.0));
        assert!(!tween.is_animating());
        assert_eq!(tween.advance(0.5), AdvanceResult::NoChange);
    }

    #[test]
    fn test_animate_to_same_target_does_not_restart() {
        let mut tween = Tween::new(0.0f32, Transition::new(1.0, TimingFunction::Linear));
        tween.animate_to(10.0);
        tween.advance(0.25);
        tween.animate_to(10.0);
        assert_eq!(tween.elapsed(), 0.25);
    }

    #[test]
    fn test_retarget_starts_from_current_value() {
        let mut tween = Tween::new(0.0f32, Transition::new(1.0, TimingFunction::Linear));
        tween.animate_to(10.0);
        tween.advance(0.5);
        tween.animate_to(0.0);
        assert_eq!(tween.advance(0.5), AdvanceResult::Changed(2.5));
    }

    #[test]
    fn test_spring_frame_tween_interpolates_then_snaps() {
        let small = Frame::new(0.0, 0.0, 100.0, 100.0);
        let large = Frame::new(0.0, 0.0, 400.0, 400.0);
        let mut tween = Tween::new(small, Transition::spring(SpringConfig::HERO, 1.0));
        tween.set_immediate(small);
        tween.animate_to(large);

        for _ in 0..6 {
            tween.advance(1.0 / 60.0);
        }
        let mid = *tween.current();
        assert!(mid.width > 100.0 && mid.width < 400.0, "mid was {:?}", mid);

        for _ in 0..60 {
            tween.advance(1.0 / 60.0);
        }
        assert_eq!(*tween.current(), large);
        assert!(!tween.is_animating());
    }

    #[test]
    fn test_finish_jumps_to_target() {
        let mut tween = Tween::new(0.0f32, Transition::default());
        tween.animate_to(1.0);
        tween.finish();
        assert_eq!(*tween.current(), 1.0);
        assert!(!tween.is_animating());
    }
}

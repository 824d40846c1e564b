mod animatable;
mod spring;
mod timing;
mod tween;

pub use animatable::Animatable;
pub use spring::{SpringConfig, SpringState};
pub use timing::TimingFunction;
pub use tween::{AdvanceResult, Tween};

/// Configuration for how a property should animate when it changes
#[derive(Clone, Debug)]
pub struct Transition {
    /// Duration of the animation in seconds. For springs this is the
    /// upper bound: an unsettled spring is snapped to its target here.
    pub duration: f32,
    /// Timing function controlling the animation curve
    pub timing: TimingFunction,
}

impl Transition {
    /// Create a new transition with the given duration and timing function
    pub fn new(duration: f32, timing: TimingFunction) -> Self {
        Self { duration, timing }
    }

    /// Create a spring-based transition bounded by `duration` seconds
    pub fn spring(config: SpringConfig, duration: f32) -> Self {
        Self {
            duration,
            timing: TimingFunction::Spring(config),
        }
    }

    /// Set the duration of the animation
    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Set the timing function
    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::spring(SpringConfig::HERO, 1.0)
    }
}

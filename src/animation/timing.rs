//! Timing functions (easing curves) for animations.
//!
//! A timing function maps normalized time (0.0 to 1.0) onto animation
//! progress. Springs are the exception: they are integrated over real
//! elapsed time by [`Tween`](super::Tween) and only carry their
//! configuration here.

use super::spring::SpringConfig;
use std::sync::Arc;

/// Timing function that controls the animation curve
#[derive(Clone)]
pub enum TimingFunction {
    /// Linear interpolation (constant speed)
    Linear,
    /// Starts slow, ends fast
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    /// Starts slow, speeds up, then slows down
    EaseInOut,
    /// Spring physics simulation (can overshoot)
    Spring(SpringConfig),
    /// Custom timing function
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl TimingFunction {
    /// Evaluate the timing function at normalized time `t`.
    ///
    /// Springs return `t` unchanged; they are stepped with real time instead.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            TimingFunction::Linear => t,
            TimingFunction::EaseIn => t * t,
            TimingFunction::EaseOut => t * (2.0 - t),
            TimingFunction::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            TimingFunction::Spring(_) => t,
            TimingFunction::Custom(f) => f(t),
        }
    }

    pub fn spring_config(&self) -> Option<&SpringConfig> {
        match self {
            TimingFunction::Spring(config) => Some(config),
            _ => None,
        }
    }

    /// Create a custom timing function from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        TimingFunction::Custom(Arc::new(f))
    }
}

impl std::fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingFunction::Linear => write!(f, "Linear"),
            TimingFunction::EaseIn => write!(f, "EaseIn"),
            TimingFunction::EaseOut => write!(f, "EaseOut"),
            TimingFunction::EaseInOut => write!(f, "EaseInOut"),
            TimingFunction::Spring(config) => write!(f, "Spring({:?})", config),
            TimingFunction::Custom(_) => write!(f, "Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        assert_eq!(TimingFunction::Linear.evaluate(0.0), 0.0);
        assert_eq!(TimingFunction::Linear.evaluate(0.5), 0.5);
        assert_eq!(TimingFunction::Linear.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_easing_endpoints() {
        for timing in [
            TimingFunction::EaseIn,
            TimingFunction::EaseOut,
            TimingFunction::EaseInOut,
        ] {
            assert_eq!(timing.evaluate(0.0), 0.0, "{:?}", timing);
            assert_eq!(timing.evaluate(1.0), 1.0, "{:?}", timing);
        }
        assert!(TimingFunction::EaseIn.evaluate(0.5) < 0.5);
        assert!(TimingFunction::EaseOut.evaluate(0.5) > 0.5);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(TimingFunction::Linear.evaluate(1.5), 1.0);
        assert_eq!(TimingFunction::custom(|t| t * 0.5).evaluate(-1.0), 0.0);
    }
}

use crate::animation::{SpringConfig, Transition};

/// Timing and policy knobs for one coordinator.
///
/// ```
/// use hero::config::TransitionConfig;
///
/// let config = TransitionConfig::new()
///     .duration(0.6)
///     .readiness_timeout(2.0);
/// assert_eq!(config.readiness_timeout, Some(2.0));
/// ```
#[derive(Clone, Debug)]
pub struct TransitionConfig {
    /// Length of the content cross-fade, in seconds.
    pub duration: f32,
    /// Spring driving the content cross-fade.
    pub spring: SpringConfig,
    /// Spring the overlay uses to chase each new frame.
    pub overlay_spring: SpringConfig,
    /// Give up waiting for destinations after this many seconds and snap to
    /// the final state. `None` waits forever.
    pub readiness_timeout: Option<f32>,
    /// Log a warning once when destinations are still missing after this long.
    pub stall_warning_after: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration: 1.0,
            spring: SpringConfig::HERO,
            overlay_spring: SpringConfig::HERO,
            readiness_timeout: None,
            stall_warning_after: 2.0,
        }
    }
}

impl TransitionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn spring(mut self, spring: SpringConfig) -> Self {
        self.spring = spring;
        self
    }

    pub fn overlay_spring(mut self, spring: SpringConfig) -> Self {
        self.overlay_spring = spring;
        self
    }

    pub fn readiness_timeout(mut self, secs: f32) -> Self {
        self.readiness_timeout = Some(secs);
        self
    }

    pub fn stall_warning_after(mut self, secs: f32) -> Self {
        self.stall_warning_after = secs;
        self
    }

    pub(crate) fn content_transition(&self) -> Transition {
        Transition::spring(self.spring, self.duration)
    }

    pub(crate) fn overlay_transition(&self) -> Transition {
        Transition::spring(self.overlay_spring, self.duration)
    }
}

/// Configuration for spring physics animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    /// Mass of the spring
    pub mass: f32,
    /// Stiffness of the spring
    pub stiffness: f32,
    /// Damping coefficient
    pub damping: f32,
    /// Velocity at the start of the animation, in normalized units per second
    pub initial_velocity: f32,
}

impl SpringConfig {
    /// Spring used by matched-geometry transitions: slightly underdamped,
    /// visually settled after about one second.
    pub const HERO: Self = Self {
        mass: 1.0,
        stiffness: 150.0,
        damping: 15.0,
        initial_velocity: 0.0,
    };

    pub const fn new(mass: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            mass,
            stiffness,
            damping,
            initial_velocity: 0.0,
        }
    }

    /// Damping ratio (zeta). Below 1.0 the spring overshoots.
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::HERO
    }
}

/// Largest integration step; longer frame gaps are split into sub-steps.
const MAX_STEP_SECS: f32 = 1.0 / 120.0;

/// State for spring physics simulation, normalized so that 0.0 is the
/// start value and 1.0 the target.
#[derive(Clone, Debug)]
pub struct SpringState {
    /// Current position (can overshoot 1.0)
    pub position: f32,
    /// Current velocity
    pub velocity: f32,
}

impl SpringState {
    pub fn new(config: &SpringConfig) -> Self {
        Self {
            position: 0.0,
            velocity: config.initial_velocity,
        }
    }

    /// Advance the simulation by `dt` seconds and return the new position.
    pub fn step(&mut self, dt: f32, config: &SpringConfig) -> f32 {
        if dt <= 0.0 {
            return self.position;
        }

        let steps = (dt / MAX_STEP_SECS).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        for _ in 0..steps {
            let displacement = self.position - 1.0;
            let force = -config.stiffness * displacement - config.damping * self.velocity;
            let acceleration = force / config.mass;

            // Semi-implicit Euler
            self.velocity += acceleration * h;
            self.position += self.velocity * h;
        }
        self.position
    }

    /// Check if the spring has settled (position near target, velocity near zero)
    pub fn is_settled(&self, threshold: f32) -> bool {
        (self.position - 1.0).abs() < threshold && self.velocity.abs() < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(config: &SpringConfig, secs: f32, fps: f32) -> (SpringState, f32) {
        let mut state = SpringState::new(config);
        let mut max_position: f32 = 0.0;
        let frames = (secs * fps).round() as usize;
        for _ in 0..frames {
            max_position = max_position.max(state.step(1.0 / fps, config));
        }
        (state, max_position)
    }

    #[test]
    fn test_hero_spring_settles_within_one_second() {
        let (state, _) = run(&SpringConfig::HERO, 1.0, 60.0);
        assert!(
            (state.position - 1.0).abs() < 0.01,
            "Spring should settle near target, got {}",
            state.position
        );
    }

    #[test]
    fn test_hero_spring_overshoots_slightly() {
        assert!(SpringConfig::HERO.damping_ratio() < 1.0);
        let (_, max_position) = run(&SpringConfig::HERO, 1.0, 60.0);
        assert!(
            max_position > 1.02 && max_position < 1.2,
            "max was {}",
            max_position
        );
    }

    #[test]
    fn test_large_frame_gaps_do_not_slow_the_spring() {
        let (smooth, _) = run(&SpringConfig::HERO, 0.5, 120.0);
        let (choppy, _) = run(&SpringConfig::HERO, 0.5, 10.0);
        assert!((smooth.position - choppy.position).abs() < 0.01);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut state = SpringState::new(&SpringConfig::HERO);
        assert_eq!(state.step(0.0, &SpringConfig::HERO), 0.0);
        assert_eq!(state.velocity, 0.0);
    }
}

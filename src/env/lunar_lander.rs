//! Powered descent onto a flat landing pad.
//!
//! A 2-D rigid body under gravity with one main engine and two orientation
//! engines. The pad is centred at x = 0 on the ground line y = 0. Observations
//! are scaled so that a lander resting level on the pad reads roughly zero in
//! its first six components.

use crate::env::{Environment, EnvironmentFactory};
use crate::error::{NeuroLanderError, Result};
use crate::types::{Action, Observation, RenderMode, StepResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

const FPS: f64 = 50.0;
const DT: f64 = 1.0 / FPS;
const GRAVITY: f64 = -10.0;

const VIEWPORT_W: f64 = 20.0;
const VIEWPORT_H: f64 = 40.0 / 3.0;
const START_Y: f64 = VIEWPORT_H * 0.75;

const MAIN_ENGINE_ACCEL: f64 = 15.0;
const SIDE_ENGINE_ACCEL: f64 = 1.2;
const SIDE_ENGINE_ANGULAR_ACCEL: f64 = 3.0;
const ENGINE_DISPERSION: f64 = 0.1;

const LEG_SPREAD: f64 = 0.67;
const LEG_DROP: f64 = 0.6;
const HULL_HALF_WIDTH: f64 = 0.5;
const HULL_DROP: f64 = 0.25;

/// Touchdown faster than this breaks the legs.
const CRASH_SPEED: f64 = 4.0;
const CONTACT_TOLERANCE: f64 = 1e-6;
const GROUND_FRICTION: f64 = 0.8;
const REST_SPEED: f64 = 0.05;

const INITIAL_SPEED: f64 = 2.0;
const INITIAL_SPIN: f64 = 0.1;

const MAIN_FUEL_COST: f64 = 0.30;
const SIDE_FUEL_COST: f64 = 0.03;
const TERMINAL_REWARD: f64 = 100.0;

pub const OBSERVATION_SIZE: usize = 8;
pub const ACTION_COUNT: usize = 4;
pub const MAX_EPISODE_STEPS: usize = 1000;

#[derive(Debug, Clone, Copy, Default)]
struct LanderState {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    angle: f64,
    angular_velocity: f64,
    left_contact: bool,
    right_contact: bool,
}

impl LanderState {
    /// World position of a body-frame offset.
    fn to_world(&self, dx: f64, dy: f64) -> (f64, f64) {
        let (sin, cos) = self.angle.sin_cos();
        (self.x + dx * cos - dy * sin, self.y + dx * sin + dy * cos)
    }

    fn observation(&self) -> Observation {
        vec![
            self.x / (VIEWPORT_W / 2.0),
            (self.y - LEG_DROP) / (VIEWPORT_H / 2.0),
            self.vx * (VIEWPORT_W / 2.0) / FPS,
            self.vy * (VIEWPORT_H / 2.0) / FPS,
            self.angle,
            20.0 * self.angular_velocity / FPS,
            if self.left_contact { 1.0 } else { 0.0 },
            if self.right_contact { 1.0 } else { 0.0 },
        ]
    }
}

/// Distance, speed and tilt penalties plus a bonus per grounded leg.
fn potential(obs: &[f64]) -> f64 {
    -100.0 * obs[0].hypot(obs[1]) - 100.0 * obs[2].hypot(obs[3]) - 100.0 * obs[4].abs()
        + 10.0 * obs[6]
        + 10.0 * obs[7]
}

#[derive(Debug)]
pub struct LunarLander {
    state: LanderState,
    rng: StdRng,
    render_mode: RenderMode,
    prev_shaping: Option<f64>,
    steps: usize,
    max_steps: usize,
    active: bool,
    closed: bool,
}

impl LunarLander {
    pub fn new(seed: Option<u64>, render_mode: RenderMode) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: LanderState::default(),
            rng,
            render_mode,
            prev_shaping: None,
            steps: 0,
            max_steps: MAX_EPISODE_STEPS,
            active: false,
            closed: false,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn apply_engines(&mut self, action: Action) -> (f64, f64) {
        let (sin, cos) = self.state.angle.sin_cos();
        let (up_x, up_y) = (-sin, cos);
        let (side_x, side_y) = (cos, sin);

        let mut ax = 0.0;
        let mut ay = GRAVITY;
        let mut alpha = 0.0;
        let mut main_power = 0.0;
        let mut side_power = 0.0;

        match action {
            2 => {
                let thrust = MAIN_ENGINE_ACCEL * (1.0 + self.dispersion());
                ax += up_x * thrust;
                ay += up_y * thrust;
                main_power = 1.0;
            }
            1 | 3 => {
                // Left engine pushes the lander right and spins it clockwise.
                let direction = if action == 1 { 1.0 } else { -1.0 };
                let thrust = SIDE_ENGINE_ACCEL * (1.0 + self.dispersion());
                ax += direction * side_x * thrust;
                ay += direction * side_y * thrust;
                alpha -= direction * SIDE_ENGINE_ANGULAR_ACCEL;
                side_power = 1.0;
            }
            _ => {}
        }

        let s = &mut self.state;
        s.vx += ax * DT;
        s.vy += ay * DT;
        s.angular_velocity += alpha * DT;
        s.x += s.vx * DT;
        s.y += s.vy * DT;
        s.angle += s.angular_velocity * DT;

        (main_power, side_power)
    }

    fn dispersion(&mut self) -> f64 {
        self.rng.gen_range(-ENGINE_DISPERSION..=ENGINE_DISPERSION)
    }

    /// Resolve ground contact. Returns true if the hull hit the ground or the
    /// legs gave way.
    fn resolve_ground(&mut self) -> bool {
        let left = self.state.to_world(-LEG_SPREAD, -LEG_DROP);
        let right = self.state.to_world(LEG_SPREAD, -LEG_DROP);
        let lowest = left.1.min(right.1);

        let mut crashed = false;
        if lowest < 0.0 {
            if -self.state.vy > CRASH_SPEED {
                crashed = true;
            }
            self.state.y -= lowest;
            self.state.vy = self.state.vy.max(0.0);
            self.state.vx *= GROUND_FRICTION;

            // Single-leg contact tips the body toward level.
            let tilt_restore = -self.state.angle * 5.0;
            self.state.angular_velocity = (self.state.angular_velocity + tilt_restore * DT) * GROUND_FRICTION;
        }

        let left = self.state.to_world(-LEG_SPREAD, -LEG_DROP);
        let right = self.state.to_world(LEG_SPREAD, -LEG_DROP);
        self.state.left_contact = left.1 <= CONTACT_TOLERANCE;
        self.state.right_contact = right.1 <= CONTACT_TOLERANCE;

        let hull_left = self.state.to_world(-HULL_HALF_WIDTH, -HULL_DROP);
        let hull_right = self.state.to_world(HULL_HALF_WIDTH, -HULL_DROP);
        if hull_left.1 <= 0.0 || hull_right.1 <= 0.0 {
            crashed = true;
        }

        crashed
    }

    fn at_rest(&self) -> bool {
        let s = &self.state;
        s.left_contact
            && s.right_contact
            && s.vx.hypot(s.vy) < REST_SPEED
            && s.angular_velocity.abs() < REST_SPEED
    }

    fn render(&self, observation: &[f64], reward: f64, done: bool) {
        if self.render_mode != RenderMode::Human {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = write!(
            stdout,
            "\rstep {:>4} | x {:+.2} y {:+.2} | vx {:+.2} vy {:+.2} | angle {:+.2} | legs {}{} | reward {:+.2}",
            self.steps,
            observation[0],
            observation[1],
            observation[2],
            observation[3],
            observation[4],
            observation[6] as u8,
            observation[7] as u8,
            reward,
        );
        if done {
            let _ = writeln!(stdout);
        }
        let _ = stdout.flush();
    }
}

impl Environment for LunarLander {
    fn reset(&mut self) -> Result<Observation> {
        if self.closed {
            return Err(NeuroLanderError::Environment("reset called on a closed environment".to_string()));
        }

        self.state = LanderState {
            x: 0.0,
            y: START_Y,
            vx: self.rng.gen_range(-INITIAL_SPEED..=INITIAL_SPEED),
            vy: self.rng.gen_range(-INITIAL_SPEED..=0.0),
            angle: 0.0,
            angular_velocity: self.rng.gen_range(-INITIAL_SPIN..=INITIAL_SPIN),
            left_contact: false,
            right_contact: false,
        };
        let observation = self.state.observation();
        self.prev_shaping = Some(potential(&observation));
        self.steps = 0;
        self.active = true;

        Ok(observation)
    }

    fn step(&mut self, action: Action) -> Result<StepResult> {
        if !self.active {
            return Err(NeuroLanderError::Environment(
                "step called before reset or after the episode ended".to_string(),
            ));
        }
        if action >= ACTION_COUNT {
            return Err(NeuroLanderError::Environment(format!(
                "action {} out of range 0..{}",
                action, ACTION_COUNT
            )));
        }

        let (main_power, side_power) = self.apply_engines(action);
        let crashed = self.resolve_ground();
        self.steps += 1;

        let observation = self.state.observation();

        let shaping = potential(&observation);
        let mut reward = self.prev_shaping.map_or(0.0, |prev| shaping - prev);
        self.prev_shaping = Some(shaping);
        reward -= main_power * MAIN_FUEL_COST;
        reward -= side_power * SIDE_FUEL_COST;

        let mut terminated = false;
        if crashed || observation[0].abs() >= 1.0 {
            terminated = true;
            reward = -TERMINAL_REWARD;
        } else if self.at_rest() {
            terminated = true;
            reward = TERMINAL_REWARD;
        }
        let truncated = !terminated && self.steps >= self.max_steps;

        if terminated || truncated {
            self.active = false;
            log::trace!(
                "Episode finished after {} steps (crashed: {}, truncated: {})",
                self.steps,
                crashed,
                truncated
            );
        }

        self.render(&observation, reward, terminated || truncated);

        Ok(StepResult {
            observation,
            reward,
            terminated,
            truncated,
        })
    }

    fn close(&mut self) {
        self.active = false;
        self.closed = true;
    }

    fn action_count(&self) -> usize {
        ACTION_COUNT
    }
}

/// Builds landers with a shared render mode. A base seed gives each lander its
/// own deterministic seed, derived from a counter.
#[derive(Debug, Default)]
pub struct LunarLanderFactory {
    render_mode: RenderMode,
    seed: Option<u64>,
    counter: std::sync::atomic::AtomicU64,
}

impl LunarLanderFactory {
    pub fn new(render_mode: RenderMode, seed: Option<u64>) -> Self {
        Self {
            render_mode,
            seed,
            counter: std::sync::atomic::AtomicU64::new(0),
        }
    }
}

impl EnvironmentFactory for LunarLanderFactory {
    type Env = LunarLander;

    fn make(&self) -> Result<LunarLander> {
        let seed = self.seed.map(|base| {
            let n = self.counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            base.wrapping_add(n)
        });
        Ok(LunarLander::new(seed, self.render_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_observation_shape() {
        let mut env = LunarLander::new(Some(1), RenderMode::None);
        let obs = env.reset().unwrap();
        assert_eq!(obs.len(), OBSERVATION_SIZE);
        assert_eq!(obs[6], 0.0);
        assert_eq!(obs[7], 0.0);
        assert!(obs[1] > 0.0);
    }

    #[test]
    fn test_first_step_reward_is_shaping_difference() {
        let mut env = LunarLander::new(Some(17), RenderMode::None);
        let start = env.reset().unwrap();
        let result = env.step(0).unwrap();

        assert!(!result.terminated);
        let expected = potential(&result.observation) - potential(&start);
        assert!((result.reward - expected).abs() < 1e-12);
        assert!(result.reward != 0.0);
    }

    #[test]
    fn test_step_requires_reset() {
        let mut env = LunarLander::new(Some(1), RenderMode::None);
        assert!(env.step(0).is_err());
    }

    #[test]
    fn test_invalid_action_rejected() {
        let mut env = LunarLander::new(Some(1), RenderMode::None);
        env.reset().unwrap();
        assert!(env.step(ACTION_COUNT).is_err());
    }

    #[test]
    fn test_free_fall_ends_in_crash() {
        let mut env = LunarLander::new(Some(3), RenderMode::None);
        env.reset().unwrap();

        let mut last = None;
        for _ in 0..MAX_EPISODE_STEPS {
            let result = env.step(0).unwrap();
            let done = result.terminated || result.truncated;
            last = Some(result);
            if done {
                break;
            }
        }

        let last = last.unwrap();
        assert!(last.terminated);
        assert_eq!(last.reward, -TERMINAL_REWARD);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let run = |seed| {
            let mut env = LunarLander::new(Some(seed), RenderMode::None);
            let mut obs = env.reset().unwrap();
            for i in 0..50 {
                obs = env.step(i % ACTION_COUNT).unwrap().observation;
            }
            obs
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_truncates_at_max_steps() {
        let mut env = LunarLander::new(Some(5), RenderMode::None).with_max_steps(3);
        env.reset().unwrap();
        assert!(!env.step(2).unwrap().truncated);
        assert!(!env.step(2).unwrap().truncated);
        assert!(env.step(2).unwrap().truncated);
    }

    #[test]
    fn test_closed_env_cannot_reset() {
        let mut env = LunarLander::new(None, RenderMode::None);
        env.close();
        env.close();
        assert!(env.is_closed());
        assert!(env.reset().is_err());
    }
}

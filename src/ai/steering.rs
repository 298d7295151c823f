//! Steering force library
//!
//! Pure functions that turn an agent's kinematic state and a target point
//! into a steering force. Every behavior ends up in
//! [`desired_velocity_to_force`]; the mode only decides the desired velocity.
//!
//! All forces assume unit mass and are expressed per second; the vehicle
//! divides by its own mass when the force is applied.

use glam::Vec3;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::vehicle::Vehicle;

/// Distance ahead of the agent at which the wander circle is centred
pub const WANDER_FORWARD_OFFSET: f32 = 3.0;

/// Closed set of steering behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SteeringMode {
    Seeking,
    Fleeing,
    Evading,
    Wandering,
}

impl SteeringMode {
    /// Every mode, in declaration order
    pub const ALL: [Self; 4] = [Self::Seeking, Self::Fleeing, Self::Evading, Self::Wandering];
}

/// Tuning for a single behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorParams {
    /// Magnitude of the desired velocity
    pub max_speed: f32,
    /// Multiplier applied to the raw force
    pub force_scale: f32,
    /// Squared detection radius, for behaviors that react to nearby agents
    pub threshold_squared: f32,
}

impl BehaviorParams {
    /// Create params with no detection radius
    #[must_use]
    pub const fn new(max_speed: f32, force_scale: f32) -> Self {
        Self {
            max_speed,
            force_scale,
            threshold_squared: 0.0,
        }
    }

    /// Set the detection radius (given unsquared)
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.threshold_squared = radius * radius;
        self
    }

    /// Check that every value is finite and non-negative
    pub fn is_valid(&self) -> bool {
        [self.max_speed, self.force_scale, self.threshold_squared]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self::new(1.0, 2.0)
    }
}

/// Per-behavior tuning for one agent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    pub seeking: BehaviorParams,
    pub fleeing: BehaviorParams,
    pub evading: BehaviorParams,
    pub wandering: BehaviorParams,
}

impl SteeringParams {
    /// Look up the params a mode reads
    pub fn params(&self, mode: SteeringMode) -> &BehaviorParams {
        match mode {
            SteeringMode::Seeking => &self.seeking,
            SteeringMode::Fleeing => &self.fleeing,
            SteeringMode::Evading => &self.evading,
            SteeringMode::Wandering => &self.wandering,
        }
    }
}

/// Compute the steering force for `mode`.
///
/// A missing target (`None`) yields zero force for every mode.
pub fn compute_force(
    mode: SteeringMode,
    vehicle: &Vehicle,
    target: Option<Vec3>,
    rng: &mut dyn RngCore,
) -> Vec3 {
    let Some(target) = target else {
        return Vec3::ZERO;
    };

    match mode {
        SteeringMode::Seeking => seek_force(vehicle, target),
        SteeringMode::Fleeing => flee_force(vehicle, target),
        SteeringMode::Evading => evade_force(vehicle, target),
        SteeringMode::Wandering => wander_force(vehicle, rng),
    }
}

/// Force needed to turn the current velocity into `desired_velocity`
#[inline]
pub fn desired_velocity_to_force(vehicle: &Vehicle, desired_velocity: Vec3) -> Vec3 {
    desired_velocity - vehicle.velocity()
}

/// Head straight for the target
pub fn seek_force(vehicle: &Vehicle, target: Vec3) -> Vec3 {
    let max_speed = vehicle.steering().seeking.max_speed;
    let desired = (target - vehicle.position()).normalize_or_zero() * max_speed;
    desired_velocity_to_force(vehicle, desired)
}

/// Head straight away from the target
pub fn flee_force(vehicle: &Vehicle, target: Vec3) -> Vec3 {
    let max_speed = vehicle.steering().fleeing.max_speed;
    let desired = (vehicle.position() - target).normalize_or_zero() * max_speed;
    desired_velocity_to_force(vehicle, desired)
}

/// Sidestep a target that lies ahead.
///
/// Targets behind the agent produce no force. Otherwise the agent turns
/// away from the side the target is on: right-hand targets steer left and
/// everything else steers right.
pub fn evade_force(vehicle: &Vehicle, target: Vec3) -> Vec3 {
    let offset = target - vehicle.position();
    let transform = vehicle.transform();

    if offset.dot(transform.forward()) < 0.0 {
        return Vec3::ZERO;
    }

    let right = transform.right();
    let desired_direction = if offset.dot(right) > 0.0 { -right } else { right };

    let desired = desired_direction * vehicle.steering().evading.max_speed;
    desired_velocity_to_force(vehicle, desired)
}

/// Seek a jittered point just ahead of the agent.
///
/// The point is sought exactly like [`seek_force`], so the desired speed is
/// the seeking max speed. Callers weight the result with the wandering
/// force scale.
pub fn wander_force(vehicle: &Vehicle, rng: &mut dyn RngCore) -> Vec3 {
    seek_force(vehicle, wander_target(vehicle, rng))
}

/// The point [`wander_force`] seeks: [`WANDER_FORWARD_OFFSET`] ahead of the
/// agent plus a random offset inside the unit disk of the horizontal plane.
pub fn wander_target(vehicle: &Vehicle, rng: &mut dyn RngCore) -> Vec3 {
    let ahead = vehicle.transform().forward().normalize_or_zero() * WANDER_FORWARD_OFFSET;
    vehicle.position() + ahead + random_in_unit_disk(rng)
}

/// Uniform sample inside the unit disk, lying in the XZ plane
fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    let radius = rng.gen_range(0.0f32..=1.0).sqrt();
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::vehicle::VehicleConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn vehicle_at(position: Vec3) -> Vehicle {
        let mut config = VehicleConfig::default();
        config.steering.seeking.max_speed = 3.0;
        config.steering.fleeing.max_speed = 3.0;
        config.steering.evading.max_speed = 2.0;
        config.steering.wandering.max_speed = 1.5;
        Vehicle::new(position, config)
    }

    #[test]
    fn test_desired_velocity_to_force_is_exact() {
        let mut vehicle = vehicle_at(Vec3::ZERO);
        vehicle.set_velocity(Vec3::new(1.0, 0.5, -2.0));

        let desired = Vec3::new(4.0, 0.0, 3.0);
        let force = desired_velocity_to_force(&vehicle, desired);
        assert_eq!(force, desired - Vec3::new(1.0, 0.5, -2.0));
    }

    #[test]
    fn test_seek() {
        let vehicle = vehicle_at(Vec3::ZERO);
        let force = seek_force(&vehicle, Vec3::new(10.0, 0.0, 0.0));

        assert!(force.x > 0.0);
        assert!((force.length() - 3.0).abs() < 1e-5);
        assert!((force.normalize() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_flee_mirrors_seek() {
        let mut vehicle = vehicle_at(Vec3::new(1.0, 0.0, 2.0));
        let target = Vec3::new(-4.0, 0.0, 7.0);

        let seek = seek_force(&vehicle, target);
        let flee = flee_force(&vehicle, target);
        assert!((seek + flee).length() < 1e-5);

        // With a velocity the desired velocities still mirror each other
        vehicle.set_velocity(Vec3::new(0.3, 0.0, 0.1));
        let seek = seek_force(&vehicle, target) + vehicle.velocity();
        let flee = flee_force(&vehicle, target) + vehicle.velocity();
        assert!((seek + flee).length() < 1e-5);
    }

    #[test]
    fn test_target_on_agent_is_zero_desired_velocity() {
        let vehicle = vehicle_at(Vec3::ONE);
        assert_eq!(seek_force(&vehicle, Vec3::ONE), Vec3::ZERO);
        assert_eq!(flee_force(&vehicle, Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn test_evade_ignores_target_behind() {
        let vehicle = vehicle_at(Vec3::ZERO);
        // Default heading is -Z, so +Z is behind
        let force = evade_force(&vehicle, Vec3::new(1.0, 0.0, 5.0));
        assert_eq!(force, Vec3::ZERO);
    }

    #[test]
    fn test_evade_turns_away_from_side() {
        let vehicle = vehicle_at(Vec3::ZERO);

        // Ahead and to the right: steer left
        let force = evade_force(&vehicle, Vec3::new(1.0, 0.0, -5.0));
        assert!((force - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);

        // Ahead and to the left: steer right
        let force = evade_force(&vehicle, Vec3::new(-1.0, 0.0, -5.0));
        assert!((force - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);

        // Dead ahead counts as left
        let force = evade_force(&vehicle, Vec3::new(0.0, 0.0, -5.0));
        assert!(force.x > 0.0);
    }

    #[test]
    fn test_wander_target_stays_near_agent() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut vehicle = vehicle_at(Vec3::new(2.0, 0.0, -3.0));
        vehicle.set_velocity(Vec3::new(1.0, 0.0, 1.0));

        for _ in 0..1000 {
            let target = wander_target(&vehicle, &mut rng);
            let distance = target.distance(vehicle.position());
            assert!(distance <= WANDER_FORWARD_OFFSET + 1.0 + 1e-4);
            assert!(distance >= WANDER_FORWARD_OFFSET - 1.0 - 1e-4);
            assert_eq!(target.y, vehicle.position().y);
        }
    }

    #[test]
    fn test_wander_varies() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let vehicle = vehicle_at(Vec3::ZERO);

        let a = wander_force(&vehicle, &mut rng);
        let b = wander_force(&vehicle, &mut rng);
        assert!((a.length() - 3.0).abs() < 1e-4);
        assert!((a - b).length() > 1e-6);
    }

    #[test]
    fn test_wander_seeks_its_target() {
        let mut vehicle = vehicle_at(Vec3::new(1.0, 0.0, 1.0));
        vehicle.set_velocity(Vec3::new(0.0, 0.0, 0.5));

        // Same seed gives the same jitter for the target and the force
        let target = wander_target(&vehicle, &mut ChaCha8Rng::seed_from_u64(21));
        let force = wander_force(&vehicle, &mut ChaCha8Rng::seed_from_u64(21));
        assert_eq!(force, seek_force(&vehicle, target));
    }

    #[test]
    fn test_compute_force_dispatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let vehicle = vehicle_at(Vec3::ZERO);
        let target = Vec3::new(0.0, 0.0, -4.0);

        assert_eq!(
            compute_force(SteeringMode::Seeking, &vehicle, Some(target), &mut rng),
            seek_force(&vehicle, target)
        );
        assert_eq!(
            compute_force(SteeringMode::Fleeing, &vehicle, Some(target), &mut rng),
            flee_force(&vehicle, target)
        );
        assert_eq!(
            compute_force(SteeringMode::Evading, &vehicle, Some(target), &mut rng),
            evade_force(&vehicle, target)
        );
        let wander = compute_force(SteeringMode::Wandering, &vehicle, Some(target), &mut rng);
        assert!(wander.length() > 0.0);
    }

    #[test]
    fn test_missing_target_is_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut vehicle = vehicle_at(Vec3::ZERO);
        vehicle.set_velocity(Vec3::X);

        for mode in SteeringMode::ALL {
            assert_eq!(compute_force(mode, &vehicle, None, &mut rng), Vec3::ZERO);
        }
    }

    #[test]
    fn test_params_lookup() {
        let params = SteeringParams {
            fleeing: BehaviorParams::new(4.0, 1.0).with_radius(10.0),
            ..Default::default()
        };
        assert_eq!(params.params(SteeringMode::Fleeing).threshold_squared, 100.0);
        assert_eq!(params.params(SteeringMode::Seeking).max_speed, 1.0);
        assert!(params.fleeing.is_valid());
        assert!(!BehaviorParams::new(-1.0, 1.0).is_valid());
    }
}

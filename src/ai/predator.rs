//! Predator: chases a prey target, wanders when it has none

use glam::Vec3;
use hecs::Entity;

use super::steering::{SteeringMode, compute_force, wander_force};
use super::vehicle::{SteeringContext, SteeringForceSource, Vehicle};

/// Force source for hunting agents.
///
/// The chase target is an entity reference; the driver resolves it to a
/// position before each tick. A target that no longer resolves behaves as
/// no target at all.
#[derive(Debug, Clone, Default)]
pub struct Predator {
    /// Multiplier on the containment force
    pub bounding_force_scale: f32,
    target: Option<Entity>,
    target_position: Option<Vec3>,
}

impl Predator {
    #[must_use]
    pub fn new(bounding_force_scale: f32) -> Self {
        Self {
            bounding_force_scale,
            target: None,
            target_position: None,
        }
    }

    /// Entity currently being chased
    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// Start chasing `target`, or stop with `None`
    pub fn set_target(&mut self, target: Option<Entity>) {
        if self.target != target {
            log::debug!("Predator target changed: {:?} -> {:?}", self.target, target);
        }
        self.target = target;
        self.target_position = None;
    }

    /// Record where the target is this tick; `None` means it is gone
    pub fn resolve_target(&mut self, position: Option<Vec3>) {
        self.target_position = position;
    }

    /// Check if the predator has a resolved target this tick
    pub fn is_chasing(&self) -> bool {
        self.target_position.is_some()
    }
}

impl SteeringForceSource for Predator {
    fn total_force(&mut self, vehicle: &Vehicle, ctx: &mut SteeringContext<'_>) -> Vec3 {
        let steering = vehicle.steering();

        let mut total = if self.target_position.is_some() {
            compute_force(SteeringMode::Seeking, vehicle, self.target_position, ctx.rng)
                * steering.seeking.force_scale
        } else {
            wander_force(vehicle, ctx.rng) * steering.wandering.force_scale
        };

        total += ctx.bounding_force(vehicle) * self.bounding_force_scale;
        total.y = 0.0;

        total.clamp_length_max(vehicle.max_force())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{BehaviorParams, VehicleConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn vehicle() -> Vehicle {
        let mut config = VehicleConfig::default();
        config.steering.seeking = BehaviorParams::new(2.0, 1.0);
        config.steering.wandering = BehaviorParams::new(1.0, 1.0);
        Vehicle::new(Vec3::ZERO, config)
    }

    fn force(predator: &mut Predator, vehicle: &Vehicle, seed: u64) -> Vec3 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let threats: Vec<Vec3> = Vec::new();
        let mut ctx = SteeringContext {
            threats: &threats,
            bounds: None,
            obstacles: None,
            rng: &mut rng,
        };
        predator.total_force(vehicle, &mut ctx)
    }

    #[test]
    fn test_chases_resolved_target() {
        let mut world = hecs::World::new();
        let prey = world.spawn(());

        let mut predator = Predator::new(1.0);
        predator.set_target(Some(prey));
        predator.resolve_target(Some(Vec3::new(10.0, 0.0, 0.0)));
        assert!(predator.is_chasing());

        let f = force(&mut predator, &vehicle(), 0);
        assert!((f - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_lost_target_falls_back_to_wandering() {
        let mut world = hecs::World::new();
        let prey = world.spawn(());

        let mut predator = Predator::new(1.0);
        predator.set_target(Some(prey));
        predator.resolve_target(None);
        assert!(!predator.is_chasing());
        assert_eq!(predator.target(), Some(prey));

        let vehicle = vehicle();
        let f = force(&mut predator, &vehicle, 9);
        // Wandering seeks a point roughly forward (-Z) at seeking speed
        assert!((f.length() - 2.0).abs() < 1e-4);
        assert!(f.z < 0.0);
    }

    #[test]
    fn test_set_target_clears_resolution() {
        let mut predator = Predator::new(1.0);
        predator.resolve_target(Some(Vec3::ONE));
        predator.set_target(None);
        assert!(!predator.is_chasing());
    }
}

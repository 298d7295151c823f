//! Prey: runs from every predator in range
//!
//! Each tick the prey asks the threat query for predators inside its
//! fleeing radius and sums one flee force per predator. Predators on the same
//! side reinforce each other; predators on opposite sides partly cancel.
//! Obstacle and boundary forces are blended in before the total is flattened
//! onto the ground plane and clamped.

use glam::Vec3;

use super::steering::flee_force;
use super::threat::ThreatSet;
use super::vehicle::{SteeringContext, SteeringForceSource, Vehicle};

/// Threat-aware force source for prey agents
#[derive(Debug, Clone, Default)]
pub struct Prey {
    /// Multiplier on the containment force
    pub bounding_force_scale: f32,
    threats: ThreatSet,
}

impl Prey {
    #[must_use]
    pub fn new(bounding_force_scale: f32) -> Self {
        Self {
            bounding_force_scale,
            threats: ThreatSet::new(),
        }
    }

    /// Threats found during the most recent tick
    pub fn threats(&self) -> &[Vec3] {
        &self.threats
    }

    /// Check if any predator was in range last tick
    pub fn is_fleeing(&self) -> bool {
        !self.threats.is_empty()
    }
}

impl SteeringForceSource for Prey {
    fn total_force(&mut self, vehicle: &Vehicle, ctx: &mut SteeringContext<'_>) -> Vec3 {
        let steering = vehicle.steering();
        let position = vehicle.position();

        let threats = ctx
            .threats
            .find_within_radius(position, steering.fleeing.threshold_squared);

        if threats.len() != self.threats.len() {
            log::debug!(
                "Prey at {position:?} now sees {} threat(s), was {}",
                threats.len(),
                self.threats.len()
            );
        }

        let mut total: Vec3 = threats
            .iter()
            .map(|&threat| flee_force(vehicle, threat))
            .sum();
        total *= steering.fleeing.force_scale;

        total += ctx.obstacle_force(vehicle) * steering.evading.force_scale;
        total += ctx.bounding_force(vehicle) * self.bounding_force_scale;

        total.y = 0.0;

        self.threats = threats;
        total.clamp_length_max(vehicle.max_force())
    }
}

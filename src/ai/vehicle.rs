//! Vehicle kinematics and the per-tick integration loop
//!
//! A [`Vehicle`] accumulates forces into a transient acceleration, integrates
//! it into velocity and position, then clears the accumulator. Where the
//! forces come from is decided by a [`SteeringForceSource`].

use glam::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::steering::SteeringParams;
use super::threat::ThreatQuery;
use crate::ecs::Transform;
use crate::physics::{Containment, ObstacleAvoidance};

/// Static configuration of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Mass used to turn forces into accelerations
    pub mass: f32,
    /// Upper bound on the magnitude of the blended steering force
    pub max_force: f32,
    /// Per-behavior tuning
    pub steering: SteeringParams,
}

impl VehicleConfig {
    /// Check mass, force limit and every behavior's params
    pub fn is_valid(&self) -> bool {
        let steering = &self.steering;
        self.mass.is_finite()
            && self.mass > 0.0
            && self.max_force.is_finite()
            && self.max_force >= 0.0
            && steering.seeking.is_valid()
            && steering.fleeing.is_valid()
            && steering.evading.is_valid()
            && steering.wandering.is_valid()
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            max_force: 5.0,
            steering: SteeringParams::default(),
        }
    }
}

/// Collaborators a force source may consult during one tick
pub struct SteeringContext<'a> {
    /// Positions of agents to run from
    pub threats: &'a dyn ThreatQuery,
    /// Keeps agents inside the play area
    pub bounds: Option<&'a dyn Containment>,
    /// Static obstacles to sidestep
    pub obstacles: Option<&'a dyn ObstacleAvoidance>,
    /// Randomness for wandering
    pub rng: &'a mut dyn RngCore,
}

impl SteeringContext<'_> {
    /// Containment force for `vehicle`, zero without bounds
    pub fn bounding_force(&self, vehicle: &Vehicle) -> Vec3 {
        self.bounds
            .map_or(Vec3::ZERO, |bounds| bounds.containment_force(vehicle))
    }

    /// Obstacle avoidance force for `vehicle`, zero without obstacles
    pub fn obstacle_force(&self, vehicle: &Vehicle) -> Vec3 {
        self.obstacles
            .map_or(Vec3::ZERO, |obstacles| obstacles.avoidance_force(vehicle))
    }
}

/// Something that decides a vehicle's total steering force each tick
pub trait SteeringForceSource {
    /// Blend every behavior into a single force
    fn total_force(&mut self, vehicle: &Vehicle, ctx: &mut SteeringContext<'_>) -> Vec3;
}

/// Weighted sum of several force sources, evaluated in order
#[derive(Default)]
pub struct BlendedSteering {
    sources: Vec<(Box<dyn SteeringForceSource + Send>, f32)>,
}

impl BlendedSteering {
    /// Create an empty blend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source with a weight
    #[must_use]
    pub fn with(mut self, source: impl SteeringForceSource + Send + 'static, weight: f32) -> Self {
        self.push(source, weight);
        self
    }

    /// Add a source with a weight
    pub fn push(&mut self, source: impl SteeringForceSource + Send + 'static, weight: f32) {
        self.sources.push((Box::new(source), weight));
    }

    /// Number of blended sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if no sources were added
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SteeringForceSource for BlendedSteering {
    fn total_force(&mut self, vehicle: &Vehicle, ctx: &mut SteeringContext<'_>) -> Vec3 {
        self.sources
            .iter_mut()
            .map(|(source, weight)| source.total_force(vehicle, ctx) * *weight)
            .sum()
    }
}

/// An autonomous agent's kinematic state
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    transform: Transform,
    velocity: Vec3,
    /// normalize(velocity), zero while stationary
    direction: Vec3,
    /// Transient accumulator, cleared every tick
    acceleration: Vec3,
    config: VehicleConfig,
}

impl Vehicle {
    /// Create a stationary vehicle.
    ///
    /// `config` must pass [`VehicleConfig::is_valid`]; a non-positive mass
    /// would turn every applied force into infinities.
    pub fn new(position: Vec3, config: VehicleConfig) -> Self {
        debug_assert!(config.is_valid(), "invalid vehicle config: {config:?}");
        Self {
            transform: Transform::from_position(position),
            velocity: Vec3::ZERO,
            direction: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            config,
        }
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Position and heading
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Unit direction of travel, zero while stationary
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Acceleration accumulated so far this tick
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    pub fn mass(&self) -> f32 {
        self.config.mass
    }

    pub fn max_force(&self) -> f32 {
        self.config.max_force
    }

    /// Per-behavior tuning
    pub fn steering(&self) -> &SteeringParams {
        &self.config.steering
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    /// Overwrite the velocity, keeping direction and heading consistent
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.sync_direction();
    }

    /// Accumulate a force, scaled by inverse mass
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force / self.config.mass;
    }

    /// Accumulate an acceleration directly
    pub fn apply_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration += acceleration;
    }

    /// Integrate the accumulated acceleration over `dt` seconds.
    ///
    /// Must run after every force for the tick has been applied and before
    /// [`Vehicle::reset`].
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.sync_direction();
        self.transform.translate(self.velocity * dt);
    }

    /// Clear the per-tick acceleration
    pub fn reset(&mut self) {
        self.acceleration = Vec3::ZERO;
    }

    /// Run one simulation step: compute, apply, integrate, reset.
    ///
    /// Returns the force that was applied.
    pub fn tick<S>(&mut self, source: &mut S, ctx: &mut SteeringContext<'_>, dt: f32) -> Vec3
    where
        S: SteeringForceSource + ?Sized,
    {
        let force = source.total_force(self, ctx);
        self.apply_force(force);
        self.integrate(dt);
        self.reset();
        force
    }

    fn sync_direction(&mut self) {
        self.direction = self.velocity.normalize_or_zero();
        self.transform.face_horizontal(self.direction);
    }
}

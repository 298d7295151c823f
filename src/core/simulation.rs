//! Simulation driver
//!
//! Owns the world and advances every agent once per [`Simulation::step`].
//! Each step snapshots predator and prey positions into spatial grids first,
//! so every agent reads the same read-only view of the population no matter
//! in which order agents are ticked.

use glam::Vec3;
use hecs::Entity;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::{Predator, Prey, SpatialGrid, SteeringContext, Vehicle};
use crate::core::config::{ConfigError, SimulationConfig};
use crate::core::debug::{DebugInfo, DebugLine};
use crate::ecs::{Name, World};
use crate::physics::SamplingError;

/// A running prey/predator simulation
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    rng: ChaCha8Rng,
    /// Debug information and stats
    pub debug: DebugInfo,
}

impl Simulation {
    /// Validate `config` and spawn the initial population
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or spawn points could not
    /// be sampled
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut simulation = Self::empty(config);
        simulation.populate()?;

        log::info!(
            "Simulation started with {} prey and {} predators (seed {})",
            simulation.world.prey_count(),
            simulation.world.predator_count(),
            simulation.config.seed
        );
        Ok(simulation)
    }

    /// Create a simulation with no agents
    pub fn empty(config: SimulationConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            world: World::new(),
            debug: DebugInfo::new(),
        }
    }

    /// Spawn a prey at `position` using the configured prey tuning
    pub fn spawn_prey_at(&mut self, position: Vec3) -> Entity {
        let index = self.world.prey_count();
        self.world.spawn_prey(
            Name::new(format!("prey-{index}")),
            Vehicle::new(position, self.config.prey),
            Prey::new(self.config.bounding_force_scale),
        )
    }

    /// Spawn a predator at `position` using the configured predator tuning
    pub fn spawn_predator_at(&mut self, position: Vec3) -> Entity {
        let index = self.world.predator_count();
        self.world.spawn_predator(
            Name::new(format!("predator-{index}")),
            Vehicle::new(position, self.config.predator),
            Predator::new(self.config.bounding_force_scale),
        )
    }

    /// Remove an agent. Predators chasing it fall back to wandering or pick
    /// a new target on the next step.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        match self.world.despawn(entity) {
            Ok(()) => {
                log::debug!("Despawned {entity:?}");
                true
            }
            Err(_) => false,
        }
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            log::warn!("Ignoring step with invalid dt {dt}");
            return;
        }

        let cell_size = self.config.cell_size;
        let predators = SpatialGrid::from_entries(
            cell_size,
            self.world
                .query::<(&Vehicle, &Predator)>()
                .iter()
                .map(|(entity, (vehicle, _))| (entity, vehicle.position())),
        );
        let prey = SpatialGrid::from_entries(
            cell_size,
            self.world
                .query::<(&Vehicle, &Prey)>()
                .iter()
                .map(|(entity, (vehicle, _))| (entity, vehicle.position())),
        );

        for (_, (vehicle, predator)) in self.world.query_mut::<(&Vehicle, &mut Predator)>() {
            acquire_target(vehicle, predator, &prey);
        }

        let Self {
            config, world, rng, ..
        } = self;
        let mut ctx = SteeringContext {
            threats: &predators,
            bounds: Some(&config.plane),
            obstacles: Some(&config.obstacles),
            rng,
        };

        for (_, (vehicle, prey)) in world.query_mut::<(&mut Vehicle, &mut Prey)>() {
            vehicle.tick(prey, &mut ctx, dt);
        }
        for (_, (vehicle, predator)) in world.query_mut::<(&mut Vehicle, &mut Predator)>() {
            vehicle.tick(predator, &mut ctx, dt);
        }

        self.debug.record_tick(dt);
    }

    /// Segments from each prey to the threats it fled from last step
    pub fn threat_lines(&self) -> Vec<DebugLine> {
        self.debug.threat_lines(&self.world)
    }

    /// Number of prey that saw at least one threat last step
    pub fn fleeing_count(&self) -> usize {
        self.world
            .query::<&Prey>()
            .iter()
            .filter(|(_, prey)| prey.is_fleeing())
            .count()
    }

    /// Number of predators with a live target
    pub fn chasing_count(&self) -> usize {
        self.world
            .query::<&Predator>()
            .iter()
            .filter(|(_, predator)| predator.is_chasing())
            .count()
    }

    /// Get the world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get the config the simulation was created with
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Spawn predators anywhere on the plane, then prey clear of them
    fn populate(&mut self) -> Result<(), SamplingError> {
        let plane = self.config.plane;

        let mut predator_positions = Vec::with_capacity(self.config.predator_count);
        for _ in 0..self.config.predator_count {
            let position = plane.random_position_above(&mut self.rng);
            predator_positions.push(position);
            self.spawn_predator_at(position);
        }

        for i in 0..self.config.prey_count {
            let position = match predator_positions.get(i % predator_positions.len().max(1)) {
                Some(&avoid) => {
                    plane.random_position_above_from(avoid, self.config.spawn_clearance, &mut self.rng)?
                }
                None => plane.random_position_above(&mut self.rng),
            };
            self.spawn_prey_at(position);
        }
        Ok(())
    }
}

/// Keep a predator's target while it stays in range, otherwise switch to the
/// nearest prey in range
fn acquire_target(vehicle: &Vehicle, predator: &mut Predator, prey: &SpatialGrid) {
    let position = vehicle.position();
    let radius_squared = vehicle.steering().seeking.threshold_squared;

    let current = predator
        .target()
        .and_then(|target| prey.position_of(target))
        .filter(|target| target.distance_squared(position) <= radius_squared);

    if current.is_none() {
        let next = prey.nearest_within(position, radius_squared);
        predator.set_target(next.map(|(entity, _)| entity));
        predator.resolve_target(next.map(|(_, target)| target));
    } else {
        predator.resolve_target(current);
    }
}

/// Errors that can occur while setting up a simulation
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Config(ConfigError),
    Sampling(SamplingError),
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SamplingError> for SimulationError {
    fn from(e: SamplingError) -> Self {
        Self::Sampling(e)
    }
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Sampling(e) => write!(f, "Spawn failed: {e}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Sampling(e) => Some(e),
        }
    }
}

//! World wrapper around hecs

use hecs::Entity;

use crate::ai::{Predator, Prey, Vehicle};
use crate::ecs::Name;

/// Simulation world holding every agent and its components
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn a prey agent
    pub fn spawn_prey(&mut self, name: Name, vehicle: Vehicle, prey: Prey) -> Entity {
        self.inner.spawn((name, vehicle, prey))
    }

    /// Spawn a predator agent
    pub fn spawn_predator(&mut self, name: Name, vehicle: Vehicle, predator: Predator) -> Entity {
        self.inner.spawn((name, vehicle, predator))
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of live prey
    pub fn prey_count(&self) -> usize {
        self.inner.query::<&Prey>().iter().count()
    }

    /// Number of live predators
    pub fn predator_count(&self) -> usize {
        self.inner.query::<&Predator>().iter().count()
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::VehicleConfig;
    use glam::Vec3;

    #[test]
    fn test_spawn_and_count() {
        let mut world = World::new();
        let prey = world.spawn_prey(
            Name::new("prey"),
            Vehicle::new(Vec3::ZERO, VehicleConfig::default()),
            Prey::new(1.0),
        );
        world.spawn_predator(
            Name::new("predator"),
            Vehicle::new(Vec3::X, VehicleConfig::default()),
            Predator::new(1.0),
        );

        assert_eq!(world.len(), 2);
        assert_eq!(world.prey_count(), 1);
        assert_eq!(world.predator_count(), 1);
        assert_eq!(world.get::<Name>(prey).unwrap().0, "prey");

        world.despawn(prey).unwrap();
        assert!(!world.contains(prey));
        assert_eq!(world.prey_count(), 0);
        assert!(world.despawn(prey).is_err());
    }
}

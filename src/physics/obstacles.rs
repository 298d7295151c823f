//! Static obstacle avoidance

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ai::{Vehicle, evade_force};

/// Produces a force that steers a vehicle around obstacles
pub trait ObstacleAvoidance {
    fn avoidance_force(&self, vehicle: &Vehicle) -> Vec3;
}

/// Spherical obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Vec3,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Distance from `point` to the obstacle's surface, zero inside it
    pub fn surface_distance(&self, point: Vec3) -> f32 {
        (self.center.distance(point) - self.radius).max(0.0)
    }
}

/// A set of obstacles and how far ahead vehicles look for them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
    /// Obstacles whose surface is farther than this are ignored
    pub look_ahead: f32,
}

impl ObstacleField {
    #[must_use]
    pub fn new(look_ahead: f32) -> Self {
        Self {
            obstacles: Vec::new(),
            look_ahead,
        }
    }

    #[must_use]
    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl ObstacleAvoidance for ObstacleField {
    /// Sum of evasion forces from every obstacle within look-ahead
    fn avoidance_force(&self, vehicle: &Vehicle) -> Vec3 {
        let position = vehicle.position();
        self.obstacles
            .iter()
            .filter(|obstacle| obstacle.surface_distance(position) <= self.look_ahead)
            .map(|obstacle| evade_force(vehicle, obstacle.center))
            .sum()
    }
}

//! Box-shaped play area
//!
//! [`CubePlane`] is the ground agents move on. It hands out random spawn
//! points on its top face and pulls agents back once they stray too far
//! from the centre.

use glam::Vec3;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::ai::{Vehicle, desired_velocity_to_force};

/// Attempts made by [`CubePlane::random_position_above_from`] before giving up
pub const MAX_SAMPLE_ATTEMPTS: usize = 64;

/// Produces a force that keeps a vehicle inside some region
pub trait Containment {
    fn containment_force(&self, vehicle: &Vehicle) -> Vec3;
}

/// Axis-aligned box whose top face is the walkable plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubePlane {
    /// World-space centre of the box
    pub center: Vec3,
    /// Full extents of the box
    pub size: Vec3,
    /// Distance from the edge at which agents start turning back
    pub margin: f32,
}

impl CubePlane {
    /// Create a plane with no margin
    #[must_use]
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            size,
            margin: 0.0,
        }
    }

    /// Set the turn-back margin
    #[must_use]
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Uniform random point on the top face
    pub fn random_position_above(&self, rng: &mut dyn RngCore) -> Vec3 {
        let x = rng.gen_range(-0.5f32..=0.5) * self.size.x;
        let z = rng.gen_range(-0.5f32..=0.5) * self.size.z;
        self.center + Vec3::new(x, self.size.y, z)
    }

    /// Random point on the top face strictly farther than `offset` from
    /// `avoid`.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::Unsatisfiable`] if no point of the face is
    /// far enough away, and [`SamplingError::Exhausted`] if
    /// [`MAX_SAMPLE_ATTEMPTS`] samples all landed too close.
    pub fn random_position_above_from(
        &self,
        avoid: Vec3,
        offset: f32,
        rng: &mut dyn RngCore,
    ) -> Result<Vec3, SamplingError> {
        if !offset.is_finite() || self.farthest_distance_above(avoid) <= offset {
            return Err(SamplingError::Unsatisfiable { offset });
        }

        for _ in 0..MAX_SAMPLE_ATTEMPTS {
            let candidate = self.random_position_above(rng);
            if candidate.distance(avoid) > offset {
                return Ok(candidate);
            }
        }

        Err(SamplingError::Exhausted {
            attempts: MAX_SAMPLE_ATTEMPTS,
            offset,
        })
    }

    /// Check whether `position` lies over the inner region of the face
    pub fn contains(&self, position: Vec3) -> bool {
        let half = self.inner_half_extents();
        let local = position - self.center;
        local.x.abs() <= half.x && local.z.abs() <= half.y
    }

    /// Distance from `point` to the farthest corner of the top face
    fn farthest_distance_above(&self, point: Vec3) -> f32 {
        let top = self.center + Vec3::new(0.0, self.size.y, 0.0);
        let half_x = self.size.x.abs() * 0.5;
        let half_z = self.size.z.abs() * 0.5;
        [(-half_x, -half_z), (-half_x, half_z), (half_x, -half_z), (half_x, half_z)]
            .into_iter()
            .map(|(x, z)| (top + Vec3::new(x, 0.0, z)).distance(point))
            .fold(0.0, f32::max)
    }

    fn inner_half_extents(&self) -> glam::Vec2 {
        glam::Vec2::new(
            (self.size.x.abs() * 0.5 - self.margin).max(0.0),
            (self.size.z.abs() * 0.5 - self.margin).max(0.0),
        )
    }
}

impl Default for CubePlane {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::new(100.0, 0.0, 100.0)).with_margin(5.0)
    }
}

impl Containment for CubePlane {
    /// Seek the centre at seeking speed while outside the inner region
    fn containment_force(&self, vehicle: &Vehicle) -> Vec3 {
        let position = vehicle.position();
        if self.contains(position) {
            return Vec3::ZERO;
        }

        let mut to_center = self.center - position;
        to_center.y = 0.0;
        let desired = to_center.normalize_or_zero() * vehicle.steering().seeking.max_speed;
        desired_velocity_to_force(vehicle, desired)
    }
}

/// Errors from rejection sampling
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingError {
    /// No point of the volume is farther than `offset` from the avoid point
    Unsatisfiable { offset: f32 },
    /// Every attempt landed too close
    Exhausted { attempts: usize, offset: f32 },
}

impl std::fmt::Display for SamplingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsatisfiable { offset } => {
                write!(f, "no point on the plane is farther than {offset} from the avoid point")
            }
            Self::Exhausted { attempts, offset } => {
                write!(f, "no point farther than {offset} found after {attempts} attempts")
            }
        }
    }
}

impl std::error::Error for SamplingError {}

//! Proximity queries over a population of agents
//!
//! [`ThreatQuery`] is the read-only contract prey use to find nearby
//! predators. [`SpatialGrid`] answers it from a per-tick snapshot of entity
//! positions bucketed into a uniform grid over the horizontal plane.

use glam::Vec3;
use hecs::Entity;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Threat positions found by one query, valid for the current tick only
pub type ThreatSet = SmallVec<[Vec3; 8]>;

/// Finds threats near a point
pub trait ThreatQuery {
    /// All threat positions whose squared distance to `point` is at most
    /// `radius_squared`. Order is unspecified.
    fn find_within_radius(&self, point: Vec3, radius_squared: f32) -> ThreatSet;
}

impl ThreatQuery for [Vec3] {
    fn find_within_radius(&self, point: Vec3, radius_squared: f32) -> ThreatSet {
        self.iter()
            .copied()
            .filter(|p| p.distance_squared(point) <= radius_squared)
            .collect()
    }
}

impl ThreatQuery for Vec<Vec3> {
    fn find_within_radius(&self, point: Vec3, radius_squared: f32) -> ThreatSet {
        self.as_slice().find_within_radius(point, radius_squared)
    }
}

/// Default edge length of a grid cell
pub const DEFAULT_CELL_SIZE: f32 = 10.0;

type Cell = (i32, i32);

/// Uniform XZ hash grid over a snapshot of entity positions
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    entries: Vec<(Entity, Vec3)>,
    cells: FxHashMap<Cell, SmallVec<[usize; 4]>>,
    lookup: FxHashMap<Entity, usize>,
}

impl SpatialGrid {
    /// Create an empty grid
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            cell_size,
            entries: Vec::new(),
            cells: FxHashMap::default(),
            lookup: FxHashMap::default(),
        }
    }

    /// Build a grid from `(entity, position)` pairs
    pub fn from_entries(cell_size: f32, entries: impl IntoIterator<Item = (Entity, Vec3)>) -> Self {
        let mut grid = Self::new(cell_size);
        for (entity, position) in entries {
            grid.insert(entity, position);
        }
        grid
    }

    /// Add an entity. Re-inserting an entity keeps its first position.
    pub fn insert(&mut self, entity: Entity, position: Vec3) {
        if self.lookup.contains_key(&entity) {
            log::warn!("Entity {entity:?} inserted twice into spatial grid");
            return;
        }
        let index = self.entries.len();
        self.entries.push((entity, position));
        self.lookup.insert(entity, index);
        self.cells.entry(self.cell_of(position)).or_default().push(index);
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the grid is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position an entity had when the snapshot was taken
    pub fn position_of(&self, entity: Entity) -> Option<Vec3> {
        self.lookup.get(&entity).map(|&index| self.entries[index].1)
    }

    /// Closest entity within the radius, if any
    pub fn nearest_within(&self, point: Vec3, radius_squared: f32) -> Option<(Entity, Vec3)> {
        let mut best: Option<(f32, Entity, Vec3)> = None;
        self.visit_within(point, radius_squared, |entity, position, distance_squared| {
            if best.is_none_or(|(d, _, _)| distance_squared < d) {
                best = Some((distance_squared, entity, position));
            }
        });
        best.map(|(_, entity, position)| (entity, position))
    }

    /// Entities within the radius, with their positions
    pub fn entities_within(&self, point: Vec3, radius_squared: f32) -> Vec<(Entity, Vec3)> {
        let mut found = Vec::new();
        self.visit_within(point, radius_squared, |entity, position, _| {
            found.push((entity, position));
        });
        found
    }

    fn cell_of(&self, position: Vec3) -> Cell {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.z / self.cell_size).floor() as i32,
        )
    }

    fn visit_within(&self, point: Vec3, radius_squared: f32, mut visit: impl FnMut(Entity, Vec3, f32)) {
        if self.entries.is_empty() || radius_squared.is_nan() || radius_squared < 0.0 {
            return;
        }

        let mut check = |index: usize| {
            let (entity, position) = self.entries[index];
            let distance_squared = position.distance_squared(point);
            if distance_squared <= radius_squared {
                visit(entity, position, distance_squared);
            }
        };

        let radius = radius_squared.sqrt();
        if !radius.is_finite() {
            (0..self.entries.len()).for_each(&mut check);
            return;
        }

        let (min_x, min_z) = self.cell_of(point - Vec3::new(radius, 0.0, radius));
        let (max_x, max_z) = self.cell_of(point + Vec3::new(radius, 0.0, radius));
        let width = i64::from(max_x) - i64::from(min_x) + 1;
        let depth = i64::from(max_z) - i64::from(min_z) + 1;

        // Large radii touch more cells than are occupied; scan everything
        if width.saturating_mul(depth) > self.cells.len() as i64 {
            (0..self.entries.len()).for_each(&mut check);
            return;
        }

        for x in min_x..=max_x {
            for z in min_z..=max_z {
                if let Some(indices) = self.cells.get(&(x, z)) {
                    indices.iter().copied().for_each(&mut check);
                }
            }
        }
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl ThreatQuery for SpatialGrid {
    fn find_within_radius(&self, point: Vec3, radius_squared: f32) -> ThreatSet {
        let mut found = ThreatSet::new();
        self.visit_within(point, radius_squared, |_, position, _| found.push(position));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(count: usize) -> Vec<Entity> {
        let mut world = hecs::World::new();
        (0..count).map(|_| world.spawn(())).collect()
    }

    fn sorted(mut set: ThreatSet) -> Vec<Vec3> {
        set.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.z.total_cmp(&b.z)));
        set.into_vec()
    }

    #[test]
    fn test_slice_query() {
        let threats = vec![
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, 200.0),
            Vec3::new(10.0, 0.0, 0.0),
        ];
        let found = threats.find_within_radius(Vec3::ZERO, 100.0);
        assert_eq!(sorted(found), vec![Vec3::new(0.0, 0.0, 5.0), Vec3::new(10.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_grid_matches_linear_scan() {
        let ids = entities(64);
        let positions: Vec<Vec3> = (0..64)
            .map(|i| {
                let i = i as f32;
                Vec3::new((i * 7.3) % 50.0 - 25.0, 0.0, (i * 3.1) % 40.0 - 20.0)
            })
            .collect();
        let grid = SpatialGrid::from_entries(4.0, ids.iter().copied().zip(positions.iter().copied()));
        assert_eq!(grid.len(), 64);

        for (point, radius) in [
            (Vec3::ZERO, 5.0),
            (Vec3::new(12.0, 0.0, -7.0), 9.5),
            (Vec3::new(-30.0, 0.0, 30.0), 1.0),
            (Vec3::new(3.0, 0.0, 3.0), 1000.0),
        ] {
            let r2 = radius * radius;
            assert_eq!(
                sorted(grid.find_within_radius(point, r2)),
                sorted(positions.find_within_radius(point, r2)),
            );
        }
    }

    #[test]
    fn test_grid_boundary_is_inclusive() {
        let ids = entities(1);
        let grid = SpatialGrid::from_entries(3.0, [(ids[0], Vec3::new(0.0, 0.0, 10.0))]);
        assert_eq!(grid.find_within_radius(Vec3::ZERO, 100.0).len(), 1);
        assert!(grid.find_within_radius(Vec3::ZERO, 99.9).is_empty());
    }

    #[test]
    fn test_nearest_and_lookup() {
        let ids = entities(3);
        let grid = SpatialGrid::from_entries(
            DEFAULT_CELL_SIZE,
            [
                (ids[0], Vec3::new(8.0, 0.0, 0.0)),
                (ids[1], Vec3::new(-3.0, 0.0, 0.0)),
                (ids[2], Vec3::new(0.0, 0.0, 50.0)),
            ],
        );

        assert_eq!(grid.nearest_within(Vec3::ZERO, 100.0).map(|(e, _)| e), Some(ids[1]));
        assert_eq!(grid.nearest_within(Vec3::new(0.0, 0.0, 40.0), 4.0), None);
        assert_eq!(grid.entities_within(Vec3::ZERO, 100.0).len(), 2);
        assert_eq!(grid.position_of(ids[2]), Some(Vec3::new(0.0, 0.0, 50.0)));
    }

    #[test]
    fn test_missing_entity_resolves_to_none() {
        let ids = entities(2);
        let grid = SpatialGrid::from_entries(DEFAULT_CELL_SIZE, [(ids[0], Vec3::ZERO)]);
        assert_eq!(grid.position_of(ids[1]), None);
    }

    #[test]
    fn test_empty_and_degenerate_queries() {
        let grid = SpatialGrid::default();
        assert!(grid.is_empty());
        assert!(grid.find_within_radius(Vec3::ZERO, 100.0).is_empty());

        let ids = entities(1);
        let grid = SpatialGrid::from_entries(DEFAULT_CELL_SIZE, [(ids[0], Vec3::ZERO)]);
        assert!(grid.find_within_radius(Vec3::ZERO, f32::NAN).is_empty());
        assert_eq!(grid.find_within_radius(Vec3::ONE, f32::INFINITY).len(), 1);
        assert_eq!(grid.find_within_radius(Vec3::ZERO, 0.0).len(), 1);
    }

    #[test]
    fn test_huge_finite_radius_scans_everything() {
        let ids = entities(3);
        let grid = SpatialGrid::from_entries(
            DEFAULT_CELL_SIZE,
            [
                (ids[0], Vec3::ZERO),
                (ids[1], Vec3::new(-5000.0, 0.0, 12.0)),
                (ids[2], Vec3::new(1.0e6, 0.0, -1.0e6)),
            ],
        );

        for radius_squared in [f32::MAX, 1.0e30, 1.0e20] {
            assert_eq!(grid.find_within_radius(Vec3::ONE, radius_squared).len(), 3);
            assert_eq!(grid.entities_within(Vec3::ONE, radius_squared).len(), 3);
        }
        assert_eq!(
            grid.nearest_within(Vec3::ONE, f32::MAX).map(|(e, _)| e),
            Some(ids[0])
        );
    }
}

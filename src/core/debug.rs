//! Debug and statistics module

use std::collections::VecDeque;

use glam::Vec3;

use crate::ai::{Prey, Vehicle};
use crate::ecs::World;

/// Tick statistics tracker
#[derive(Debug)]
pub struct TickStats {
    /// Step history for averaging
    step_times: VecDeque<f32>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Average step in seconds
    avg_step: f32,
    /// Total simulated seconds
    elapsed: f64,
    /// Total ticks run
    total_ticks: u64,
}

impl TickStats {
    /// Create a new tick stats tracker
    pub fn new() -> Self {
        Self {
            step_times: VecDeque::with_capacity(120),
            max_samples: 120,
            avg_step: 0.0,
            elapsed: 0.0,
            total_ticks: 0,
        }
    }

    /// Record a tick with the given step
    pub fn record_tick(&mut self, dt: f32) {
        self.total_ticks += 1;
        self.elapsed += f64::from(dt);

        if self.step_times.len() >= self.max_samples {
            self.step_times.pop_front();
        }
        self.step_times.push_back(dt);

        self.avg_step = self.step_times.iter().sum::<f32>() / self.step_times.len() as f32;
    }

    /// Average step over the recent window, in seconds
    pub fn avg_step(&self) -> f32 {
        self.avg_step
    }

    /// Total simulated time in seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Total ticks run
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "Ticks: {} | Simulated: {:.2}s | Step: {:.2}ms",
            self.total_ticks,
            self.elapsed,
            self.avg_step * 1000.0
        )
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Line segment for an external overlay to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub from: Vec3,
    pub to: Vec3,
}

/// Debug overlay information
#[derive(Debug, Default)]
pub struct DebugInfo {
    /// Whether debug overlay is enabled
    pub enabled: bool,
    /// Tick statistics
    pub tick_stats: TickStats,
}

impl DebugInfo {
    /// Create new debug info
    pub fn new() -> Self {
        Self {
            enabled: false,
            tick_stats: TickStats::new(),
        }
    }

    /// Toggle debug overlay
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Record a tick
    pub fn record_tick(&mut self, dt: f32) {
        self.tick_stats.record_tick(dt);
    }

    /// One line from each prey to every threat it reacted to last tick.
    ///
    /// Empty while the overlay is disabled.
    pub fn threat_lines(&self, world: &World) -> Vec<DebugLine> {
        if !self.enabled {
            return Vec::new();
        }

        let mut query = world.query::<(&Vehicle, &Prey)>();
        let lines = query
            .iter()
            .flat_map(|(_, (vehicle, prey))| {
                let from = vehicle.position();
                prey.threats().iter().map(move |&to| DebugLine { from, to })
            })
            .collect();
        lines
    }
}

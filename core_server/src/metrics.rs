use std::collections::VecDeque;

use bevy::prelude::*;

use crate::{
    controller::DistanceController, players::PlayerRegistry, resources::SimulationTick,
};

/// Rolling window of measured tick durations, in milliseconds.
///
/// The server loop records one sample per tick; the window mean is the
/// controller's sole performance signal.
#[derive(Resource, Debug, Clone)]
pub struct TickTimeHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl TickTimeHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push_ms(&mut self, sample_ms: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample_ms);
    }

    /// Mean over the window, or `None` before the first sample lands.
    pub fn mean_ms(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for TickTimeHistory {
    fn default() -> Self {
        Self::with_capacity(100)
    }
}

/// Per-tick snapshot surfaced by the `status` command.
#[derive(Resource, Default, Debug, Clone)]
pub struct ServerMetrics {
    pub tick: u64,
    pub mean_tick_ms: f64,
    pub view_distance: i32,
    pub simulation_distance: i32,
    pub active_players: usize,
}

pub fn collect_metrics(
    tick: Res<SimulationTick>,
    history: Res<TickTimeHistory>,
    controller: Res<DistanceController>,
    players: Res<PlayerRegistry>,
    mut metrics: ResMut<ServerMetrics>,
) {
    metrics.tick = tick.0;
    metrics.mean_tick_ms = history.mean_ms().unwrap_or(0.0);
    metrics.view_distance = controller.view_distance();
    metrics.simulation_distance = controller.simulation_distance();
    metrics.active_players = players.len();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_has_no_mean() {
        let history = TickTimeHistory::with_capacity(4);
        assert!(history.mean_ms().is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn mean_tracks_samples() {
        let mut history = TickTimeHistory::with_capacity(4);
        history.push_ms(10.0);
        history.push_ms(20.0);
        assert_eq!(history.mean_ms(), Some(15.0));
    }

    #[test]
    fn window_evicts_oldest_sample() {
        let mut history = TickTimeHistory::with_capacity(3);
        for sample in [10.0, 20.0, 30.0, 40.0] {
            history.push_ms(sample);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.mean_ms(), Some(30.0));
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let mut history = TickTimeHistory::with_capacity(0);
        assert_eq!(history.capacity(), 1);
        history.push_ms(5.0);
        history.push_ms(7.0);
        assert_eq!(history.mean_ms(), Some(7.0));
    }
}

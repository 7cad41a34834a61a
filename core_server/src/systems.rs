use bevy::prelude::*;

use crate::{
    controller::{DistanceApplier, DistanceController},
    levels::Level,
    metrics::TickTimeHistory,
    players::PlayerRegistry,
    resources::{ServerConfig, SimulationTick},
};

/// Applies controller decisions to the live world: the view distance goes to
/// the player registry, the simulation distance to every active level.
pub struct WorldDistanceApplier<'a, 'w, 's> {
    players: &'a mut PlayerRegistry,
    levels: &'a mut Query<'w, 's, &'static mut Level>,
}

impl<'a, 'w, 's> WorldDistanceApplier<'a, 'w, 's> {
    pub fn new(
        players: &'a mut PlayerRegistry,
        levels: &'a mut Query<'w, 's, &'static mut Level>,
    ) -> Self {
        Self { players, levels }
    }
}

impl DistanceApplier for WorldDistanceApplier<'_, '_, '_> {
    fn apply_view_distance(&mut self, distance: i32) {
        self.players.set_view_distance(distance);
    }

    fn apply_simulation_distance(&mut self, distance: i32) {
        for mut level in self.levels.iter_mut() {
            level.simulation_distance = distance;
        }
    }
}

/// Spawn one level entity per configured name.
pub fn spawn_levels(mut commands: Commands, config: Res<ServerConfig>) {
    for name in &config.level_names {
        commands.spawn(Level::new(name.clone()));
    }
}

/// Push the configured minimum distances out to the world once at startup.
pub fn seed_distances(
    mut controller: ResMut<DistanceController>,
    mut players: ResMut<PlayerRegistry>,
    mut levels: Query<&'static mut Level>,
) {
    let mut applier = WorldDistanceApplier::new(&mut players, &mut levels);
    controller.initialize(&mut applier);
}

pub fn advance_tick(mut tick: ResMut<SimulationTick>) {
    tick.0 = tick.0.wrapping_add(1);
}

/// Interval-gated regulation: consume the rolling mean tick time and move
/// the distances by at most one step.
pub fn regulate_distances(
    tick: Res<SimulationTick>,
    history: Res<TickTimeHistory>,
    mut controller: ResMut<DistanceController>,
    mut players: ResMut<PlayerRegistry>,
    mut levels: Query<&'static mut Level>,
) {
    if tick.0 % controller.adjust_interval_ticks() != 0 {
        return;
    }
    let Some(mean_tick_ms) = history.mean_ms() else {
        return;
    };
    let has_observers = !players.is_empty();
    let mut applier = WorldDistanceApplier::new(&mut players, &mut levels);
    controller.adjust(mean_tick_ms, has_observers, &mut applier);
}

/// One-shot handler for the `view <n>` admin command.
pub fn apply_view_override(
    In(value): In<i32>,
    mut controller: ResMut<DistanceController>,
    mut players: ResMut<PlayerRegistry>,
    mut levels: Query<&'static mut Level>,
) {
    let mut applier = WorldDistanceApplier::new(&mut players, &mut levels);
    controller.set_view_distance(value, &mut applier);
}

/// One-shot handler for the `simdist <n>` admin command.
pub fn apply_simulation_override(
    In(value): In<i32>,
    mut controller: ResMut<DistanceController>,
    mut players: ResMut<PlayerRegistry>,
    mut levels: Query<&'static mut Level>,
) {
    let mut applier = WorldDistanceApplier::new(&mut players, &mut levels);
    controller.set_simulation_distance(value, &mut applier);
}

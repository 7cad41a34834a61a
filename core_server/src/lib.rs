//! Headless shard-server prototype built around an adaptive distance
//! controller.
//!
//! The controller keeps the measured mean tick time inside a configured band
//! by tuning the view distance and the simulation distance one step at a
//! time; [`run_tick`] advances the server by a single tick of the pipeline
//! configured in [`build_headless_app`].

pub mod controller;
pub mod distance_config;
mod levels;
pub mod metrics;
mod players;
mod resources;
pub mod systems;

use bevy::prelude::*;

pub use controller::{
    Adjustment, Band, DistanceApplier, DistanceController, TunedParameter, MANUAL_DISTANCE_MAX,
    MANUAL_DISTANCE_MIN,
};
pub use distance_config::{
    load_distance_config_from_env, DistanceConfigError, DistanceControlConfig,
};
pub use levels::Level;
pub use metrics::{ServerMetrics, TickTimeHistory};
pub use players::{PlayerRegistry, RosterError};
pub use resources::{ServerConfig, SimulationTick};

/// Construct a headless [`App`] wired with the distance-regulation pipeline,
/// using the builtin distance configuration.
pub fn build_headless_app() -> App {
    build_headless_app_with(DistanceControlConfig::builtin())
        .expect("builtin distance config should validate")
}

/// Construct a headless [`App`] from an explicit distance configuration.
///
/// Fails fast when the configuration violates the controller's bounds
/// invariants.
pub fn build_headless_app_with(
    config: DistanceControlConfig,
) -> Result<App, DistanceConfigError> {
    let controller = DistanceController::new(config)?;
    let server_config = ServerConfig::default();
    let history = TickTimeHistory::with_capacity(server_config.tick_time_window);

    let mut app = App::new();
    app.insert_resource(server_config)
        .insert_resource(controller)
        .insert_resource(history)
        .insert_resource(PlayerRegistry::default())
        .insert_resource(SimulationTick::default())
        .insert_resource(ServerMetrics::default())
        .add_plugins(MinimalPlugins)
        .add_systems(
            Startup,
            (systems::spawn_levels, systems::seed_distances).chain(),
        )
        .add_systems(
            Update,
            (
                systems::advance_tick,
                systems::regulate_distances,
                metrics::collect_metrics,
            )
                .chain(),
        );

    Ok(app)
}

/// Execute a single server tick.
///
/// Each call processes the chained systems configured in
/// [`build_headless_app`] (tick increment → regulation → metrics). Callers
/// are responsible for measuring the tick duration and recording it into
/// [`TickTimeHistory`].
pub fn run_tick(app: &mut App) {
    app.update();
}

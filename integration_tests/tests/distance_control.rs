use bevy::ecs::system::RunSystemOnce;
use core_server::{
    build_headless_app_with, run_tick, systems, DistanceControlConfig, DistanceController,
    Level, PlayerRegistry, TickTimeHistory,
};

fn fast_config() -> DistanceControlConfig {
    DistanceControlConfig {
        min_view_distance: 4,
        max_view_distance: 12,
        min_simulation_distance: 2,
        max_simulation_distance: 8,
        mean_tick_to_stay_below_ms: 50.0,
        tick_leeway_ms: 3.0,
        adjust_interval_ticks: 1,
        log_adjustments: false,
        ..DistanceControlConfig::default()
    }
}

fn push_samples(app: &mut bevy::prelude::App, sample_ms: f64, count: usize) {
    let mut history = app.world.resource_mut::<TickTimeHistory>();
    for _ in 0..count {
        history.push_ms(sample_ms);
    }
}

fn level_simulation_distances(app: &mut bevy::prelude::App) -> Vec<i32> {
    let mut query = app.world.query::<&Level>();
    query
        .iter(&app.world)
        .map(|level| level.simulation_distance)
        .collect()
}

#[test]
fn load_cycle_grows_to_ceilings_then_shrinks_to_floors() {
    let mut app = build_headless_app_with(fast_config()).expect("config is valid");
    app.world
        .resource_mut::<PlayerRegistry>()
        .join("ash")
        .unwrap();

    // Sustained headroom: 8 view raises + 6 simulation raises reach the
    // ceilings; extra ticks must hold there.
    push_samples(&mut app, 30.0, 5);
    for _ in 0..20 {
        run_tick(&mut app);
    }
    {
        let controller = app.world.resource::<DistanceController>();
        assert_eq!(controller.view_distance(), 12);
        assert_eq!(controller.simulation_distance(), 8);
    }
    assert_eq!(app.world.resource::<PlayerRegistry>().view_distance(), 12);
    assert!(level_simulation_distances(&mut app).iter().all(|&d| d == 8));

    // Drown the window in overload samples and walk everything back down.
    push_samples(&mut app, 90.0, 60);
    for _ in 0..20 {
        run_tick(&mut app);
    }
    {
        let controller = app.world.resource::<DistanceController>();
        assert_eq!(controller.view_distance(), 4);
        assert_eq!(controller.simulation_distance(), 2);
    }
    assert_eq!(app.world.resource::<PlayerRegistry>().view_distance(), 4);
    assert!(level_simulation_distances(&mut app).iter().all(|&d| d == 2));
}

#[test]
fn manual_overrides_clamp_and_fan_out() {
    let mut app = build_headless_app_with(fast_config()).expect("config is valid");
    run_tick(&mut app);

    app.world
        .run_system_once_with(500, systems::apply_view_override);
    assert_eq!(
        app.world.resource::<DistanceController>().view_distance(),
        200
    );
    assert_eq!(app.world.resource::<PlayerRegistry>().view_distance(), 200);

    app.world
        .run_system_once_with(-5, systems::apply_simulation_override);
    assert_eq!(
        app.world
            .resource::<DistanceController>()
            .simulation_distance(),
        0
    );
    assert!(level_simulation_distances(&mut app).iter().all(|&d| d == 0));
}

#[test]
fn disabled_simulation_gate_keeps_levels_at_seed() {
    let config = DistanceControlConfig {
        adjust_simulation_distance: false,
        ..fast_config()
    };
    let mut app = build_headless_app_with(config).expect("config is valid");
    app.world
        .resource_mut::<PlayerRegistry>()
        .join("ash")
        .unwrap();
    push_samples(&mut app, 30.0, 5);

    for _ in 0..20 {
        run_tick(&mut app);
    }

    // The counter still walked up for priority bookkeeping, but no level
    // ever saw a simulation-distance write: seeding skipped it too, so the
    // spawn value survives.
    let controller = app.world.resource::<DistanceController>();
    assert_eq!(controller.simulation_distance(), 8);
    assert_eq!(controller.view_distance(), 12);
    assert!(level_simulation_distances(&mut app).iter().all(|&d| d == 0));
}

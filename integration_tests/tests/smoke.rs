use core_server::{build_headless_app, run_tick};

#[test]
fn app_initializes() {
    let mut app = build_headless_app();
    // run a single tick to ensure the schedule executes without panic
    run_tick(&mut app);
}

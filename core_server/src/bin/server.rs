use std::io::{BufRead, BufReader};
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::App;
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use tracing::{error, info, warn};

use core_server::{
    build_headless_app_with, load_distance_config_from_env, run_tick, systems,
    DistanceController, PlayerRegistry, RosterError, ServerConfig, ServerMetrics,
    TickTimeHistory,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let distance_config = load_distance_config_from_env();
    let mut app = match build_headless_app_with(distance_config) {
        Ok(app) => app,
        Err(err) => {
            error!(
                target: "rangekeeper::server",
                error = %err,
                "distance config rejected"
            );
            std::process::exit(1);
        }
    };

    let server_config = app.world.resource::<ServerConfig>().clone();

    let command_rx = spawn_command_listener(server_config.command_bind);
    let ticker = crossbeam_channel::tick(Duration::from_millis(server_config.tick_interval_ms));

    info!(
        command_bind = %server_config.command_bind,
        tick_interval_ms = server_config.tick_interval_ms,
        "Rangekeeper headless shard server ready"
    );

    loop {
        select! {
            recv(ticker) -> _ => run_measured_tick(&mut app),
            recv(command_rx) -> message => match message {
                Ok(command) => handle_command(&mut app, command),
                Err(_) => break,
            },
        }
    }
}

/// Advance one tick and record its duration into the rolling window.
fn run_measured_tick(app: &mut App) {
    let started = Instant::now();
    run_tick(app);
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    app.world
        .resource_mut::<TickTimeHistory>()
        .push_ms(elapsed_ms);
}

#[derive(Debug)]
enum Command {
    ViewDistance(i32),
    SimulationDistance(i32),
    Join(String),
    Leave(String),
    Status,
}

fn spawn_command_listener(bind_addr: std::net::SocketAddr) -> Receiver<Command> {
    let listener = TcpListener::bind(bind_addr).expect("command listener bind failed");
    listener
        .set_nonblocking(true)
        .expect("set_nonblocking failed");

    let (sender, receiver) = unbounded::<Command>();
    thread::spawn(move || loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                info!("Command client connected: {}", addr);
                let sender = sender.clone();
                thread::spawn(move || handle_client(stream, sender));
            }
            Err(ref err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(std::time::Duration::from_millis(50));
            }
            Err(err) => {
                warn!("Error accepting command client: {}", err);
                thread::sleep(std::time::Duration::from_millis(200));
            }
        }
    });

    receiver
}

fn handle_client(stream: std::net::TcpStream, sender: Sender<Command>) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match parse_command(trimmed) {
                    Some(cmd) => {
                        if sender.send(cmd).is_err() {
                            break;
                        }
                    }
                    None => warn!("Invalid command: {}", trimmed),
                }
            }
            Err(err) => {
                warn!("Command read error: {}", err);
                break;
            }
        }
    }
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();
    match parts.next()? {
        "view" => {
            let value: i32 = parts.next()?.parse().ok()?;
            Some(Command::ViewDistance(value))
        }
        "simdist" => {
            let value: i32 = parts.next()?.parse().ok()?;
            Some(Command::SimulationDistance(value))
        }
        "join" => Some(Command::Join(parts.next()?.to_string())),
        "leave" => Some(Command::Leave(parts.next()?.to_string())),
        "status" => Some(Command::Status),
        _ => None,
    }
}

fn handle_command(app: &mut App, command: Command) {
    match command {
        Command::ViewDistance(value) => {
            app.world
                .run_system_once_with(value, systems::apply_view_override);
            let applied = app.world.resource::<DistanceController>().view_distance();
            info!(
                target: "rangekeeper::server",
                requested = value,
                applied,
                "command.applied=view_distance"
            );
        }
        Command::SimulationDistance(value) => {
            app.world
                .run_system_once_with(value, systems::apply_simulation_override);
            let applied = app
                .world
                .resource::<DistanceController>()
                .simulation_distance();
            info!(
                target: "rangekeeper::server",
                requested = value,
                applied,
                "command.applied=simulation_distance"
            );
        }
        Command::Join(name) => handle_join(app, &name),
        Command::Leave(name) => handle_leave(app, &name),
        Command::Status => handle_status(app),
    }
}

fn handle_join(app: &mut App, name: &str) {
    let result = {
        let mut players = app.world.resource_mut::<PlayerRegistry>();
        players.join(name)
    };

    match result {
        Ok(online) => info!(
            target: "rangekeeper::server",
            player = name,
            online,
            "roster.joined"
        ),
        Err(err @ RosterError::DuplicatePlayer(_)) => warn!(
            target: "rangekeeper::server",
            player = name,
            error = %err,
            "roster.rejected=duplicate_player"
        ),
        Err(err) => warn!(
            target: "rangekeeper::server",
            player = name,
            error = %err,
            "roster.rejected"
        ),
    }
}

fn handle_leave(app: &mut App, name: &str) {
    let result = {
        let mut players = app.world.resource_mut::<PlayerRegistry>();
        players.leave(name)
    };

    match result {
        Ok(online) => info!(
            target: "rangekeeper::server",
            player = name,
            online,
            "roster.left"
        ),
        Err(err @ RosterError::UnknownPlayer(_)) => warn!(
            target: "rangekeeper::server",
            player = name,
            error = %err,
            "roster.rejected=unknown_player"
        ),
        Err(err) => warn!(
            target: "rangekeeper::server",
            player = name,
            error = %err,
            "roster.rejected"
        ),
    }
}

fn handle_status(app: &mut App) {
    let metrics = app.world.resource::<ServerMetrics>();
    info!(
        target: "rangekeeper::server",
        tick = metrics.tick,
        mean_tick_ms = metrics.mean_tick_ms,
        view_distance = metrics.view_distance,
        simulation_distance = metrics.simulation_distance,
        active_players = metrics.active_players,
        "status"
    );
}

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use bevy::prelude::*;

/// Harness configuration for the headless shard server.
#[derive(Resource, Debug, Clone)]
pub struct ServerConfig {
    pub tick_interval_ms: u64,
    pub command_bind: SocketAddr,
    pub level_names: Vec<String>,
    /// Samples kept in the rolling tick-time window.
    pub tick_time_window: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            command_bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 42000),
            level_names: vec![
                "overworld".to_string(),
                "caverns".to_string(),
                "rift".to_string(),
            ],
            tick_time_window: 100,
        }
    }
}

/// Tracks total server ticks elapsed.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTick(pub u64);

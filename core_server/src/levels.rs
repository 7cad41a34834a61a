use bevy::prelude::Component;

/// An active world region.
///
/// `simulation_distance` is the radius this region keeps under active
/// simulation; the regulation pipeline writes it, the region's own systems
/// read it.
#[derive(Component, Debug, Clone)]
pub struct Level {
    pub name: String,
    pub simulation_distance: i32,
}

impl Level {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            simulation_distance: 0,
        }
    }
}

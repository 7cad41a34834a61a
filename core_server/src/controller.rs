//! Adaptive distance controller.
//!
//! Tunes the view distance and the simulation distance one step at a time to
//! keep the measured mean tick time within
//! `mean_tick_to_stay_below_ms ± tick_leeway_ms`, growing both distances
//! toward their maximums when headroom exists. Simulation distance carries a
//! larger per-unit performance cost than view distance, so it is lowered
//! first and raised last; both distances settle at the mean of their bounds
//! before the controller touches the configured floors and ceilings.

use bevy::prelude::Resource;
use tracing::info;

use crate::distance_config::{DistanceConfigError, DistanceControlConfig};

/// Absolute range manual overrides are clamped to, independent of the
/// configured operating bounds.
pub const MANUAL_DISTANCE_MIN: i32 = 0;
pub const MANUAL_DISTANCE_MAX: i32 = 200;

/// The two parameters under the controller's authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunedParameter {
    View,
    Simulation,
}

/// Position of a measurement relative to the target band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Above,
    Within,
    Below,
}

/// Outcome of a single [`DistanceController::adjust`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Hold,
    Lowered { parameter: TunedParameter, value: i32 },
    Raised { parameter: TunedParameter, value: i32 },
}

/// Receiver for distance changes decided by the controller.
///
/// Applying a simulation distance fans out to every active level; both calls
/// are synchronous, infallible, and safe to repeat with an unchanged value.
pub trait DistanceApplier {
    fn apply_view_distance(&mut self, distance: i32);
    fn apply_simulation_distance(&mut self, distance: i32);
}

/// One rung of a priority ladder: the first rung whose predicate holds is
/// performed and evaluation stops for that call.
struct LadderStep {
    applies: fn(&DistanceController) -> bool,
    perform: fn(&mut DistanceController) -> (TunedParameter, i32),
}

/// Shrink priority when the server runs over the band: simulation distance
/// is the cheapest performance win, view distance the last resort.
const SHRINK_LADDER: &[LadderStep] = &[
    LadderStep {
        applies: |c| c.current_simulation > c.mean_simulation,
        perform: DistanceController::lower_simulation,
    },
    LadderStep {
        applies: |c| c.current_view > c.mean_view,
        perform: DistanceController::lower_view,
    },
    LadderStep {
        applies: |c| c.current_simulation > c.config.min_simulation_distance,
        perform: DistanceController::lower_simulation,
    },
    LadderStep {
        applies: |c| c.current_view > c.config.min_view_distance,
        perform: DistanceController::lower_view,
    },
];

/// Grow priority under headroom: view distance is the most visible to
/// observers and the cheapest to raise; simulation distance is re-expanded
/// last.
const GROW_LADDER: &[LadderStep] = &[
    LadderStep {
        applies: |c| c.current_view < c.mean_view,
        perform: DistanceController::raise_view,
    },
    LadderStep {
        applies: |c| c.current_simulation < c.mean_simulation,
        perform: DistanceController::raise_simulation,
    },
    LadderStep {
        applies: |c| c.current_view < c.config.max_view_distance,
        perform: DistanceController::raise_view,
    },
    LadderStep {
        applies: |c| c.current_simulation < c.config.max_simulation_distance,
        perform: DistanceController::raise_simulation,
    },
];

/// Runtime state of the adaptive distance control loop.
#[derive(Resource, Debug, Clone)]
pub struct DistanceController {
    config: DistanceControlConfig,
    mean_view: i32,
    mean_simulation: i32,
    current_view: i32,
    current_simulation: i32,
}

impl DistanceController {
    /// Validate the configuration and seed both distances at their
    /// configured minimums. Performs no collaborator calls; see
    /// [`DistanceController::initialize`].
    pub fn new(config: DistanceControlConfig) -> Result<Self, DistanceConfigError> {
        config.validate()?;
        // Means are a fixed snapshot of the bounds, not recomputed per call.
        let mean_view = (config.min_view_distance + config.max_view_distance) / 2;
        let mean_simulation =
            (config.min_simulation_distance + config.max_simulation_distance) / 2;
        Ok(Self {
            current_view: config.min_view_distance,
            current_simulation: config.min_simulation_distance,
            mean_view,
            mean_simulation,
            config,
        })
    }

    /// Reset both distances to their configured minimums and push them out
    /// through the applier. Calling this again re-seeds the controller.
    pub fn initialize(&mut self, applier: &mut dyn DistanceApplier) {
        self.current_view = self.config.min_view_distance;
        self.current_simulation = self.config.min_simulation_distance;
        applier.apply_view_distance(self.current_view);
        if self.config.adjust_simulation_distance {
            applier.apply_simulation_distance(self.current_simulation);
        }
    }

    /// Classify a measurement against the target band.
    pub fn band(&self, mean_tick_ms: f64) -> Band {
        let target = self.config.mean_tick_to_stay_below_ms;
        let leeway = self.config.tick_leeway_ms;
        if mean_tick_ms > target + leeway {
            Band::Above
        } else if mean_tick_ms < target - leeway {
            Band::Below
        } else {
            Band::Within
        }
    }

    /// Consume one measurement and move state by at most one step.
    ///
    /// With no active observers, or a measurement inside the dead band, this
    /// is a no-op. Otherwise the matching priority ladder runs and the first
    /// applicable rung moves exactly one distance by exactly one unit,
    /// followed by a single applier call.
    pub fn adjust(
        &mut self,
        mean_tick_ms: f64,
        has_observers: bool,
        applier: &mut dyn DistanceApplier,
    ) -> Adjustment {
        if !has_observers {
            return Adjustment::Hold;
        }
        match self.band(mean_tick_ms) {
            Band::Within => Adjustment::Hold,
            Band::Above => match self.run_ladder(SHRINK_LADDER) {
                Some((parameter, value)) => {
                    self.push(parameter, value, applier);
                    self.log_adjustment(mean_tick_ms, parameter, value, false);
                    Adjustment::Lowered { parameter, value }
                }
                None => Adjustment::Hold,
            },
            Band::Below => match self.run_ladder(GROW_LADDER) {
                Some((parameter, value)) => {
                    self.push(parameter, value, applier);
                    self.log_adjustment(mean_tick_ms, parameter, value, true);
                    Adjustment::Raised { parameter, value }
                }
                None => Adjustment::Hold,
            },
        }
    }

    /// Manual view-distance override: clamp to the absolute range, set, and
    /// apply without consulting the band policy.
    pub fn set_view_distance(&mut self, value: i32, applier: &mut dyn DistanceApplier) {
        self.current_view = value.clamp(MANUAL_DISTANCE_MIN, MANUAL_DISTANCE_MAX);
        applier.apply_view_distance(self.current_view);
    }

    /// Manual simulation-distance override. Applies even when automatic
    /// simulation adjustment is disabled; an explicit administrative request
    /// outranks the automatic gate.
    pub fn set_simulation_distance(&mut self, value: i32, applier: &mut dyn DistanceApplier) {
        self.current_simulation = value.clamp(MANUAL_DISTANCE_MIN, MANUAL_DISTANCE_MAX);
        applier.apply_simulation_distance(self.current_simulation);
    }

    pub fn view_distance(&self) -> i32 {
        self.current_view
    }

    pub fn simulation_distance(&self) -> i32 {
        self.current_simulation
    }

    pub fn mean_view_distance(&self) -> i32 {
        self.mean_view
    }

    pub fn mean_simulation_distance(&self) -> i32 {
        self.mean_simulation
    }

    pub fn adjust_interval_ticks(&self) -> u64 {
        self.config.adjust_interval_ticks
    }

    fn run_ladder(&mut self, ladder: &[LadderStep]) -> Option<(TunedParameter, i32)> {
        for step in ladder {
            if (step.applies)(self) {
                return Some((step.perform)(self));
            }
        }
        None
    }

    fn push(&self, parameter: TunedParameter, value: i32, applier: &mut dyn DistanceApplier) {
        match parameter {
            TunedParameter::View => applier.apply_view_distance(value),
            TunedParameter::Simulation => {
                // State is still tracked when the gate is off so the ladder
                // keeps its mean/priority bookkeeping; only the fan-out is
                // suppressed.
                if self.config.adjust_simulation_distance {
                    applier.apply_simulation_distance(value);
                }
            }
        }
    }

    fn lower_view(&mut self) -> (TunedParameter, i32) {
        self.current_view -= 1;
        (TunedParameter::View, self.current_view)
    }

    fn raise_view(&mut self) -> (TunedParameter, i32) {
        self.current_view += 1;
        (TunedParameter::View, self.current_view)
    }

    fn lower_simulation(&mut self) -> (TunedParameter, i32) {
        self.current_simulation -= 1;
        (TunedParameter::Simulation, self.current_simulation)
    }

    fn raise_simulation(&mut self) -> (TunedParameter, i32) {
        self.current_simulation += 1;
        (TunedParameter::Simulation, self.current_simulation)
    }

    fn log_adjustment(
        &self,
        mean_tick_ms: f64,
        parameter: TunedParameter,
        value: i32,
        raised: bool,
    ) {
        if !self.config.log_adjustments {
            return;
        }
        match (parameter, raised) {
            (TunedParameter::View, true) => info!(
                target: "rangekeeper::distance",
                mean_tick_ms,
                value,
                "view_distance.raised"
            ),
            (TunedParameter::View, false) => info!(
                target: "rangekeeper::distance",
                mean_tick_ms,
                value,
                "view_distance.lowered"
            ),
            (TunedParameter::Simulation, true) => info!(
                target: "rangekeeper::distance",
                mean_tick_ms,
                value,
                "simulation_distance.raised"
            ),
            (TunedParameter::Simulation, false) => info!(
                target: "rangekeeper::distance",
                mean_tick_ms,
                value,
                "simulation_distance.lowered"
            ),
        }
    }
}

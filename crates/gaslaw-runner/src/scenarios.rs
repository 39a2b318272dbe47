use gaslaw_core::{ConstraintMode, Quantity};
use gaslaw_sim::Edit;

/// An edit scheduled at a point in simulated time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEdit {
    /// Seconds from the start of the run.
    pub at: f64,
    pub edit: Edit,
}

/// A scripted sequence of edits starting from the configured initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub initial_mode: ConstraintMode,
    /// Sorted by `at`.
    pub edits: Vec<TimedEdit>,
}

fn at(at: f64, edit: Edit) -> TimedEdit {
    TimedEdit { at, edit }
}

/// The built-in scenario suite.
pub fn standard_scenarios() -> Vec<ScenarioConfig> {
    vec![
        ScenarioConfig {
            name: "stp-hold",
            description: "STP with no edits; population and temperature hold steady",
            initial_mode: ConstraintMode::ConstVolume,
            edits: Vec::new(),
        },
        ScenarioConfig {
            name: "heat-const-volume",
            description: "heat to 546.3 K at constant volume; pressure doubles",
            initial_mode: ConstraintMode::ConstVolume,
            edits: vec![at(0.5, Edit::Set(Quantity::Temperature, 546.3))],
        },
        ScenarioConfig {
            name: "expand-const-pressure",
            description: "expand to 44.828 L at constant pressure; temperature doubles",
            initial_mode: ConstraintMode::ConstPressure,
            edits: vec![at(0.5, Edit::Set(Quantity::Volume, 44.828))],
        },
        ScenarioConfig {
            name: "double-moles-const-temperature",
            description: "add a second mole at constant temperature; pressure doubles",
            initial_mode: ConstraintMode::ConstTemperature,
            edits: vec![at(0.5, Edit::Set(Quantity::Moles, 2.0))],
        },
        ScenarioConfig {
            name: "mode-cycle-tour",
            description: "cycle through all three modes, editing each active pair",
            initial_mode: ConstraintMode::ConstVolume,
            edits: vec![
                at(0.25, Edit::Set(Quantity::Temperature, 400.0)),
                at(0.5, Edit::CycleMode),
                at(0.75, Edit::Set(Quantity::Volume, 30.0)),
                at(1.0, Edit::CycleMode),
                at(1.25, Edit::Set(Quantity::Volume, 15.0)),
                at(1.5, Edit::CycleMode),
                at(1.75, Edit::Set(Quantity::Moles, 1.5)),
                // Volume is frozen again here; this one is rejected.
                at(2.0, Edit::Set(Quantity::Volume, 20.0)),
                at(2.25, Edit::ResetToStp),
            ],
        },
    ]
}

/// Look up a built-in scenario by name.
pub fn find(name: &str) -> Option<ScenarioConfig> {
    standard_scenarios().into_iter().find(|s| s.name == name)
}

//! Simulation phases and the listener notified when they change.

use std::fmt;

/// Which integrator the simulation runs each tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SimulationPhase {
    /// Resting. No integration happens.
    #[default]
    Stable,
    /// Cubes fly apart under gravity and bounce on the floor.
    Dismantling,
    /// Cubes converge onto the targets of the latest rebuild.
    Rebuilding,
}

impl fmt::Display for SimulationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationPhase::Stable => write!(f, "Stable"),
            SimulationPhase::Dismantling => write!(f, "Dismantling"),
            SimulationPhase::Rebuilding => write!(f, "Rebuilding"),
        }
    }
}

/// Receives simulation notifications synchronously, from inside the call
/// that caused them.
pub trait PhaseListener {
    /// Called on every phase transition, including re-entering `Rebuilding`
    /// and the `Stable` reset of a shape load.
    fn on_phase_change(&mut self, phase: SimulationPhase);

    /// Called after a shape load with the new voxel count.
    fn on_voxel_count_change(&mut self, _count: usize) {}
}

impl<F> PhaseListener for F
where
    F: FnMut(SimulationPhase),
{
    fn on_phase_change(&mut self, phase: SimulationPhase) {
        self(phase)
    }
}

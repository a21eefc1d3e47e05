//! # Voxel Simulation
//!
//! The dismantle / rebuild engine behind the showcase.
//!
//! ## Key Components
//!
//! * `VoxelStore` - The fixed set of cubes being animated
//! * `assigner` - Greedy color matching of cubes onto a new target shape
//! * `integrator` - Per-tick explosion and convergence physics
//! * `VoxelSimulation` - The state machine tying them together
//!
//! ## Phases
//!
//! ```text
//!            dismantle()                 rebuild(shape)
//!   Stable ──────────────> Dismantling ─────────────────> Rebuilding
//!     ^  \                                                   |  ^
//!     |   `──────────────── rebuild(shape) ─────────────────>|  | rebuild(shape)
//!     |                                                      |__|
//!     `──────── settled and minimum duration elapsed ────────'
//! ```
//!
//! `dismantle` outside `Stable` is ignored. `rebuild` is accepted from every
//! phase and starts from wherever the cubes currently are.
//!
//! ## Threading
//!
//! Everything runs on the thread that drives the frame loop. Requests such
//! as `dismantle` mutate the simulation directly and listeners are called
//! before the request returns.

use web_time::Instant;

use crate::engine_state::shapes::ShapeDescriptor;

pub mod assigner;
pub mod config;
pub mod integrator;
pub mod phase;
pub mod voxel;

pub use assigner::{RebuildAssignment, RebuildPlan};
pub use config::SimulationConfig;
pub use integrator::RebuildProgress;
pub use phase::{PhaseListener, SimulationPhase};
pub use voxel::{Voxel, VoxelColor, VoxelStore};

/// State of a rebuild in flight.
struct ActiveRebuild {
    plan: RebuildPlan,
    started_at: Instant,
}

/// The voxel engine: store, current phase and the latest rebuild plan.
pub struct VoxelSimulation {
    config: SimulationConfig,
    store: VoxelStore,
    phase: SimulationPhase,
    rebuild: Option<ActiveRebuild>,
    last_progress: RebuildProgress,
    rng: fastrand::Rng,
    listener: Option<Box<dyn PhaseListener>>,
}

impl Default for VoxelSimulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl VoxelSimulation {
    /// Creates an empty, stable simulation.
    pub fn new(config: SimulationConfig) -> Self {
        let rng = config.rng();
        Self {
            config,
            store: VoxelStore::new(),
            phase: SimulationPhase::Stable,
            rebuild: None,
            last_progress: RebuildProgress::default(),
            rng,
            listener: None,
        }
    }

    /// Registers the listener for phase and voxel count changes, replacing
    /// any previous one.
    pub fn set_phase_listener<L>(&mut self, listener: L)
    where
        L: PhaseListener + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Replaces every voxel with a fresh resting set built from `shape` and
    /// returns to `Stable`.
    pub fn load_shape(&mut self, shape: &ShapeDescriptor) {
        self.store.replace_with(shape);
        self.rebuild = None;
        self.last_progress = RebuildProgress::default();
        log::info!("Loaded shape with {} voxels", self.store.len());

        let count = self.store.len();
        if let Some(listener) = self.listener.as_mut() {
            listener.on_voxel_count_change(count);
        }
        self.enter(SimulationPhase::Stable);
    }

    /// Blows the figure apart. Ignored unless the simulation is `Stable`.
    pub fn dismantle(&mut self) {
        if self.phase != SimulationPhase::Stable {
            log::debug!("Ignoring dismantle while {}", self.phase);
            return;
        }

        integrator::explode(self.store.as_mut_slice(), &self.config, &mut self.rng);
        self.enter(SimulationPhase::Dismantling);
    }

    /// Starts moving the existing voxels into `shape`, measured from `now`.
    ///
    /// The voxel set is kept as is. A rebuild already in flight is replaced
    /// and the clock restarts.
    pub fn rebuild(&mut self, shape: &ShapeDescriptor, now: Instant) {
        let plan =
            assigner::assign_targets(self.store.as_slice(), shape, &self.config, &mut self.rng);
        log::debug!(
            "Rebuild plan: {} placed, {} rubble, {} targets dropped",
            plan.placed_count(),
            plan.rubble_count(),
            plan.dropped_targets()
        );

        self.rebuild = Some(ActiveRebuild {
            plan,
            started_at: now,
        });
        self.last_progress = RebuildProgress::default();
        self.enter(SimulationPhase::Rebuilding);
    }

    /// Advances the simulation by one frame.
    ///
    /// Physics takes one fixed step regardless of how much time passed; `now`
    /// only drives activation delays and the rebuild's minimum duration.
    pub fn tick(&mut self, now: Instant) {
        match self.phase {
            SimulationPhase::Stable => {}
            SimulationPhase::Dismantling => {
                integrator::step_dismantle(self.store.as_mut_slice(), &self.config);
            }
            SimulationPhase::Rebuilding => self.tick_rebuild(now),
        }
    }

    fn tick_rebuild(&mut self, now: Instant) {
        let Some(rebuild) = self.rebuild.as_ref() else {
            log::warn!("Rebuilding without a plan, settling");
            self.enter(SimulationPhase::Stable);
            return;
        };

        let elapsed = now.saturating_duration_since(rebuild.started_at);
        let progress = integrator::step_rebuild(
            self.store.as_mut_slice(),
            &rebuild.plan,
            elapsed,
            &self.config,
            &mut self.rng,
        );
        self.last_progress = progress;

        if progress.is_settled() && elapsed > self.config.min_rebuild_duration() {
            self.enter(SimulationPhase::Stable);
        }
    }

    fn enter(&mut self, phase: SimulationPhase) {
        if self.phase != phase {
            log::debug!("Phase {} -> {}", self.phase, phase);
        }
        self.phase = phase;
        if let Some(listener) = self.listener.as_mut() {
            listener.on_phase_change(phase);
        }
    }

    /// The current phase.
    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    /// Every voxel in index order, for drawing.
    pub fn voxels(&self) -> &[Voxel] {
        self.store.as_slice()
    }

    /// Number of voxels set by the last shape load.
    pub fn voxel_count(&self) -> usize {
        self.store.len()
    }

    /// The plan of the most recent rebuild, until the next shape load.
    pub fn rebuild_plan(&self) -> Option<&RebuildPlan> {
        self.rebuild.as_ref().map(|rebuild| &rebuild.plan)
    }

    /// The per-voxel targets of the most recent rebuild, empty when none.
    pub fn assignments(&self) -> &[RebuildAssignment] {
        self.rebuild_plan()
            .map(RebuildPlan::assignments)
            .unwrap_or_default()
    }

    /// What the last rebuild tick observed.
    pub fn rebuild_progress(&self) -> RebuildProgress {
        self.last_progress
    }

    /// The parameters the simulation runs with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

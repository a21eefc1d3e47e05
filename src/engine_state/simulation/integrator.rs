//! # Physics Integrator
//!
//! Advances voxel kinematics by one fixed step per call.
//!
//! There is no delta time: every constant in [`SimulationConfig`] is a
//! per-tick amount, so the animation speed follows the rate at which the host
//! calls the simulation. The showcase assumes a steady display refresh.
//!
//! Two regimes exist:
//!
//! * **Explosion** - explicit Euler under constant gravity, with a damped
//!   bounce and friction on the floor plane.
//! * **Convergence** - each voxel closes a fixed fraction of the distance to
//!   its rebuild target per tick and snaps once it is close enough.

use cgmath::{Vector3, Zero};
use web_time::Duration;

use super::{assigner::RebuildPlan, config::SimulationConfig, voxel::Voxel};

/// Gives every voxel a random outward, upward kick and a random spin.
pub fn explode(voxels: &mut [Voxel], config: &SimulationConfig, rng: &mut fastrand::Rng) {
    let speed = config.explosion_speed;
    let spin = config.explosion_spin;

    for voxel in voxels {
        voxel.velocity = Vector3::new(
            (rng.f32() - 0.5) * speed,
            rng.f32() * speed,
            (rng.f32() - 0.5) * speed,
        );
        voxel.angular_velocity = Vector3::new(
            (rng.f32() - 0.5) * spin,
            (rng.f32() - 0.5) * spin,
            (rng.f32() - 0.5) * spin,
        );
    }
}

/// One explosion step: gravity, integration, floor bounce.
pub fn step_dismantle(voxels: &mut [Voxel], config: &SimulationConfig) {
    for voxel in voxels {
        voxel.velocity.y -= config.gravity;
        voxel.position += voxel.velocity;
        voxel.rotation += voxel.angular_velocity;

        if voxel.position.y < config.floor_y {
            voxel.position.y = config.floor_y;
            voxel.velocity.y *= -config.bounce;
            voxel.velocity.x *= config.floor_friction;
            voxel.velocity.z *= config.floor_friction;
        }
    }
}

/// What a convergence step observed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuildProgress {
    /// Voxels still inside their activation delay
    pub waiting: usize,
    /// Voxels moved towards their target this tick
    pub moving: usize,
    /// Voxels sitting exactly on their target
    pub placed: usize,
}

impl RebuildProgress {
    /// Whether every voxel is active and on its target.
    pub fn is_settled(&self) -> bool {
        self.waiting == 0 && self.moving == 0
    }
}

/// One convergence step, `elapsed` after the rebuild started.
///
/// Voxels without an assignment are left untouched.
pub fn step_rebuild(
    voxels: &mut [Voxel],
    plan: &RebuildPlan,
    elapsed: Duration,
    config: &SimulationConfig,
    rng: &mut fastrand::Rng,
) -> RebuildProgress {
    let mut progress = RebuildProgress::default();
    let rate = config.convergence_rate;

    for (index, voxel) in voxels.iter_mut().enumerate() {
        let Some(assignment) = plan.assignment(index) else {
            continue;
        };

        if elapsed < assignment.delay {
            progress.waiting += 1;
            if rng.f32() < config.jitter_chance {
                voxel.position += Vector3::new(
                    (rng.f32() - 0.5) * config.jitter_amplitude,
                    (rng.f32() - 0.5) * config.jitter_amplitude,
                    (rng.f32() - 0.5) * config.jitter_amplitude,
                );
            }
            continue;
        }

        let offset = assignment.target - voxel.position;
        if voxel.distance2_to(assignment.target) > config.snap_tolerance_sq {
            progress.moving += 1;
            voxel.position += offset * rate;
            voxel.rotation -= voxel.rotation * rate;
        } else {
            progress.placed += 1;
            voxel.position = assignment.target;
            voxel.rotation = Vector3::zero();
            voxel.velocity = Vector3::zero();
            voxel.angular_velocity = Vector3::zero();
        }
    }

    progress
}

//! # Color-Matching Assigner
//!
//! Maps the entries of a target shape onto the existing voxels by color.
//!
//! The matching is greedy and order sensitive. Target entries are visited in
//! descriptor order; each one takes the still-free voxel with the closest
//! color, and the scan stops at the first candidate that is a near-exact
//! match. When several voxels share a color, the lowest free index wins.
//! Voxels that receive no target become rubble and are parked under the
//! floor. Target entries left over once every voxel is taken are dropped.

use cgmath::Vector3;
use web_time::Duration;

use super::{
    config::SimulationConfig,
    voxel::{Voxel, VoxelColor},
};
use crate::engine_state::shapes::ShapeDescriptor;

/// Starting best distance for a scan; larger than any RGB distance.
const UNMATCHED_DISTANCE: f32 = 9999.0;

/// Where one voxel goes during a rebuild.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RebuildAssignment {
    /// Destination of the voxel center
    pub target: Vector3<f32>,
    /// Time after the rebuild starts before the voxel begins to move
    pub delay: Duration,
    /// Set when the voxel has no place in the target shape
    pub is_rubble: bool,
}

impl RebuildAssignment {
    fn placed(target: Vector3<f32>, delay: Duration) -> Self {
        Self {
            target,
            delay,
            is_rubble: false,
        }
    }

    fn rubble(config: &SimulationConfig, rng: &mut fastrand::Rng) -> Self {
        let x = (rng.f32() - 0.5) * config.rubble_spread;
        let z = (rng.f32() - 0.5) * config.rubble_spread;

        Self {
            target: Vector3::new(x, config.floor_y - config.rubble_depth, z),
            delay: Duration::ZERO,
            is_rubble: true,
        }
    }
}

/// The assignments of one rebuild, indexed by voxel id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RebuildPlan {
    assignments: Vec<RebuildAssignment>,
    dropped_targets: usize,
}

impl RebuildPlan {
    /// Assignment of the voxel with id `index`.
    pub fn assignment(&self, index: usize) -> Option<&RebuildAssignment> {
        self.assignments.get(index)
    }

    /// Every assignment in voxel order.
    pub fn assignments(&self) -> &[RebuildAssignment] {
        &self.assignments
    }

    /// Number of voxels with a real target.
    pub fn placed_count(&self) -> usize {
        self.assignments.iter().filter(|a| !a.is_rubble).count()
    }

    /// Number of voxels routed to the rubble area.
    pub fn rubble_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_rubble).count()
    }

    /// Number of target entries that found no free voxel.
    pub fn dropped_targets(&self) -> usize {
        self.dropped_targets
    }
}

/// Computes a target for every voxel from `shape`.
///
/// Runs in `O(targets * voxels)`.
pub fn assign_targets(
    voxels: &[Voxel],
    shape: &ShapeDescriptor,
    config: &SimulationConfig,
    rng: &mut fastrand::Rng,
) -> RebuildPlan {
    let mut slots: Vec<Option<RebuildAssignment>> = vec![None; voxels.len()];
    let mut dropped_targets = 0;

    for entry in shape {
        let wanted = VoxelColor::from_hex(entry.color);

        match closest_free_voxel(voxels, &slots, wanted, config.near_match_distance) {
            Some(index) => {
                let target = entry.world_position();
                slots[index] = Some(RebuildAssignment::placed(
                    target,
                    config.activation_delay(target.y),
                ));
            }
            None => dropped_targets += 1,
        }
    }

    let assignments = slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| RebuildAssignment::rubble(config, rng)))
        .collect();

    RebuildPlan {
        assignments,
        dropped_targets,
    }
}

fn closest_free_voxel(
    voxels: &[Voxel],
    slots: &[Option<RebuildAssignment>],
    wanted: VoxelColor,
    near_match_distance: f32,
) -> Option<usize> {
    let mut best_distance = UNMATCHED_DISTANCE;
    let mut best_index = None;

    for (index, voxel) in voxels.iter().enumerate() {
        if slots[index].is_some() {
            continue;
        }

        let distance = voxel.color().distance(&wanted);
        if distance < best_distance {
            best_distance = distance;
            best_index = Some(index);
            if distance < near_match_distance {
                break;
            }
        }
    }

    best_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{shapes::ShapeEntry, simulation::voxel::VoxelStore};

    const RED: u32 = 0xFF0000;
    const DARK_RED: u32 = 0xF00000;
    const BLUE: u32 = 0x0000FF;
    const GREEN: u32 = 0x00FF00;

    fn store_of(colors: &[u32]) -> VoxelStore {
        let shape = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| ShapeEntry::new(i as i32, 0, 0, color))
            .collect();
        let mut store = VoxelStore::new();
        store.replace_with(&shape);
        store
    }

    fn ground_config() -> SimulationConfig {
        SimulationConfig {
            floor_y: 0.0,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn each_target_takes_a_distinct_voxel() {
        let store = store_of(&[RED, BLUE, GREEN, RED]);
        let shape = ShapeDescriptor::new(vec![
            ShapeEntry::new(0, 1, 0, RED),
            ShapeEntry::new(0, 2, 0, RED),
            ShapeEntry::new(0, 3, 0, GREEN),
        ]);
        let plan = assign_targets(
            store.as_slice(),
            &shape,
            &ground_config(),
            &mut fastrand::Rng::with_seed(1),
        );

        assert_eq!(plan.placed_count(), 3);
        assert_eq!(plan.rubble_count(), 1);
        assert_eq!(plan.assignment(0).map(|a| a.target.y), Some(1.0));
        assert_eq!(plan.assignment(3).map(|a| a.target.y), Some(2.0));
        assert_eq!(plan.assignment(2).map(|a| a.target.y), Some(3.0));
        assert!(plan.assignment(1).is_some_and(|a| a.is_rubble));
    }

    #[test]
    fn near_exact_match_stops_the_scan_early() {
        // Index 0 is close enough to stop the scan even though index 1 is exact
        let store = store_of(&[0xFE0000, RED]);
        let shape = ShapeDescriptor::new(vec![ShapeEntry::new(0, 0, 0, RED)]);
        let plan = assign_targets(
            store.as_slice(),
            &shape,
            &ground_config(),
            &mut fastrand::Rng::with_seed(1),
        );

        assert!(plan.assignment(0).is_some_and(|a| !a.is_rubble));
        assert!(plan.assignment(1).is_some_and(|a| a.is_rubble));
    }

    #[test]
    fn distant_candidates_keep_scanning_for_the_closest() {
        let store = store_of(&[BLUE, DARK_RED, RED]);
        let shape = ShapeDescriptor::new(vec![ShapeEntry::new(0, 0, 0, RED)]);
        let plan = assign_targets(
            store.as_slice(),
            &shape,
            &ground_config(),
            &mut fastrand::Rng::with_seed(1),
        );

        // DARK_RED is 0.059 away, above the early-exit distance
        assert!(plan.assignment(2).is_some_and(|a| !a.is_rubble));
        assert!(plan.assignment(1).is_some_and(|a| a.is_rubble));
    }

    #[test]
    fn earlier_targets_win_contested_voxels() {
        let store = store_of(&[RED, DARK_RED]);
        let shape = ShapeDescriptor::new(vec![
            ShapeEntry::new(0, 5, 0, DARK_RED),
            ShapeEntry::new(0, 9, 0, RED),
        ]);
        let plan = assign_targets(
            store.as_slice(),
            &shape,
            &ground_config(),
            &mut fastrand::Rng::with_seed(1),
        );

        // DARK_RED is closer to index 1, RED gets what is left
        assert_eq!(plan.assignment(1).map(|a| a.target.y), Some(5.0));
        assert_eq!(plan.assignment(0).map(|a| a.target.y), Some(9.0));
    }

    #[test]
    fn surplus_targets_are_dropped() {
        let store = store_of(&[RED]);
        let shape = ShapeDescriptor::new(vec![
            ShapeEntry::new(0, 0, 0, RED),
            ShapeEntry::new(1, 0, 0, RED),
            ShapeEntry::new(2, 0, 0, BLUE),
        ]);
        let plan = assign_targets(
            store.as_slice(),
            &shape,
            &ground_config(),
            &mut fastrand::Rng::with_seed(1),
        );

        assert_eq!(plan.assignments().len(), 1);
        assert_eq!(plan.placed_count(), 1);
        assert_eq!(plan.dropped_targets(), 2);
    }

    #[test]
    fn rubble_is_parked_under_the_floor_near_the_origin() {
        let config = SimulationConfig::default();
        let store = store_of(&[RED; 32]);
        let plan = assign_targets(
            store.as_slice(),
            &ShapeDescriptor::default(),
            &config,
            &mut fastrand::Rng::with_seed(4),
        );

        assert_eq!(plan.rubble_count(), 32);
        for assignment in plan.assignments() {
            assert!(assignment.is_rubble);
            assert_eq!(assignment.delay, Duration::ZERO);
            assert!(assignment.target.y < config.floor_y);
            assert!(assignment.target.x.abs() <= config.rubble_spread / 2.0);
            assert!(assignment.target.z.abs() <= config.rubble_spread / 2.0);
        }
    }

    #[test]
    fn higher_targets_wait_longer() {
        let store = store_of(&[RED, RED, RED]);
        let shape = ShapeDescriptor::new(vec![
            ShapeEntry::new(0, 0, 0, RED),
            ShapeEntry::new(0, 4, 0, RED),
            ShapeEntry::new(0, -3, 0, RED),
        ]);
        let plan = assign_targets(
            store.as_slice(),
            &shape,
            &ground_config(),
            &mut fastrand::Rng::with_seed(1),
        );

        let delays: Vec<Duration> = plan.assignments().iter().map(|a| a.delay).collect();
        assert_eq!(delays[0], Duration::ZERO);
        assert!((delays[1].as_secs_f32() - 0.4).abs() < 1e-4);
        assert_eq!(delays[2], Duration::ZERO);
    }
}

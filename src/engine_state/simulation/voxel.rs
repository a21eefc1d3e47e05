//! # Voxel Store
//!
//! The authoritative sequence of simulated cubes.
//!
//! Voxels are created all at once from a [`ShapeDescriptor`] and are never
//! added or removed afterwards. Each voxel keeps the index it was created
//! with and the color it was created with for its whole life; only the
//! kinematic fields change while the simulation runs.

use cgmath::{InnerSpace, Vector3, Zero};

use crate::engine_state::shapes::ShapeDescriptor;

/// A linear RGB color with every component in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VoxelColor {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl VoxelColor {
    /// Decodes a `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    /// Euclidean distance between two colors in RGB space.
    pub fn distance(&self, other: &VoxelColor) -> f32 {
        let r = self.r - other.r;
        let g = self.g - other.g;
        let b = self.b - other.b;
        (r * r + g * g + b * b).sqrt()
    }

    /// The color as `[r, g, b, 1.0]`.
    pub fn to_rgba(&self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}

/// A single simulated cube.
///
/// Rotation is stored as Euler angles in radians, applied in X, Y, Z order.
#[derive(Clone, Debug, PartialEq)]
pub struct Voxel {
    id: usize,
    color: VoxelColor,
    /// Center of the cube in world space
    pub position: Vector3<f32>,
    /// Displacement applied per tick while dismantling
    pub velocity: Vector3<f32>,
    /// Euler angles in radians
    pub rotation: Vector3<f32>,
    /// Rotation applied per tick while dismantling
    pub angular_velocity: Vector3<f32>,
}

impl Voxel {
    /// Creates a voxel at rest.
    pub fn new(id: usize, position: Vector3<f32>, color: VoxelColor) -> Self {
        Self {
            id,
            color,
            position,
            velocity: Vector3::zero(),
            rotation: Vector3::zero(),
            angular_velocity: Vector3::zero(),
        }
    }

    /// Index of this voxel in its store. Never reassigned.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The color this voxel was created with. Never reassigned.
    pub fn color(&self) -> VoxelColor {
        self.color
    }

    /// Squared distance from the voxel center to `target`.
    pub fn distance2_to(&self, target: Vector3<f32>) -> f32 {
        (target - self.position).magnitude2()
    }
}

/// Owns every voxel of the current figure.
#[derive(Clone, Debug, Default)]
pub struct VoxelStore {
    voxels: Vec<Voxel>,
}

impl VoxelStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every voxel and creates one resting voxel per descriptor
    /// entry, in descriptor order.
    pub fn replace_with(&mut self, shape: &ShapeDescriptor) {
        self.voxels = shape
            .iter()
            .enumerate()
            .map(|(id, entry)| {
                Voxel::new(id, entry.world_position(), VoxelColor::from_hex(entry.color))
            })
            .collect();
    }

    /// Number of voxels.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Whether the store holds no voxels.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Every voxel in index order.
    pub fn as_slice(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Mutable access to the kinematic state of every voxel.
    ///
    /// A slice keeps the length fixed, so callers cannot add or remove voxels.
    pub fn as_mut_slice(&mut self) -> &mut [Voxel] {
        &mut self.voxels
    }

    /// The voxel created at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Voxel> {
        self.voxels.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::shapes::ShapeEntry;

    #[test]
    fn hex_colors_decode_per_channel() {
        let color = VoxelColor::from_hex(0xFF8000);
        assert_eq!(color.r, 1.0);
        assert!((color.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(color.b, 0.0);
    }

    #[test]
    fn color_distance_spans_the_unit_cube() {
        let black = VoxelColor::from_hex(0x000000);
        let white = VoxelColor::from_hex(0xFFFFFF);
        assert!((black.distance(&white) - 3f32.sqrt()).abs() < 1e-6);
        assert_eq!(white.distance(&white), 0.0);
    }

    #[test]
    fn replace_creates_resting_voxels_in_descriptor_order() {
        let shape = ShapeDescriptor::new(vec![
            ShapeEntry::new(3, 1, 0, 0xFF0000),
            ShapeEntry::new(-1, 0, 2, 0x0000FF),
        ]);
        let mut store = VoxelStore::new();
        store.replace_with(&shape);

        assert_eq!(store.len(), 2);
        let second = store.get(1).expect("second voxel");
        assert_eq!(second.id(), 1);
        assert_eq!(second.position, Vector3::new(-1.0, 0.0, 2.0));
        assert_eq!(second.color(), VoxelColor::from_hex(0x0000FF));
        assert_eq!(second.velocity, Vector3::zero());
        assert_eq!(second.rotation, Vector3::zero());
    }

    #[test]
    fn replace_discards_the_previous_figure() {
        let mut store = VoxelStore::new();
        store.replace_with(&ShapeDescriptor::new(vec![ShapeEntry::new(0, 0, 0, 0); 5]));
        store.replace_with(&ShapeDescriptor::new(vec![ShapeEntry::new(0, 0, 0, 0); 2]));

        assert_eq!(store.len(), 2);
    }
}

//! # Shape Source
//!
//! Procedural voxel figures consumed by the simulation on load and rebuild.
//!
//! A [`ShapeDescriptor`] is an ordered list of grid positions with a 24-bit
//! color each. The simulation never owns one: it reads a descriptor once per
//! `load_shape` / `rebuild` call and discards it.
//!
//! ## Key Components
//!
//! * `ShapeEntry` - A single colored cube placement on the unit grid
//! * `ShapeDescriptor` - The ordered collection of entries describing a figure
//! * `ShapeBuilder` - Rounds arbitrary coordinates onto the grid and removes overlaps
//! * `ShapeKind` - The figures shipped with the showcase

use std::{collections::HashMap, fmt};

use cgmath::{Point3, Vector3};

mod avatar;
mod workstation;

/// A single cube placement of a shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShapeEntry {
    /// Position on the unit grid
    pub position: Point3<i32>,
    /// Color as `0xRRGGBB`
    pub color: u32,
}

impl ShapeEntry {
    /// Creates an entry from grid coordinates and a `0xRRGGBB` color.
    pub fn new(x: i32, y: i32, z: i32, color: u32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            color,
        }
    }

    /// The entry position in world space.
    pub fn world_position(&self) -> Vector3<f32> {
        Vector3::new(
            self.position.x as f32,
            self.position.y as f32,
            self.position.z as f32,
        )
    }
}

/// An ordered collection of cube placements describing a target figure.
///
/// Entry order matters: the simulation creates voxels in this order on load,
/// and the rebuild assigner visits targets in this order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeDescriptor {
    entries: Vec<ShapeEntry>,
}

impl ShapeDescriptor {
    /// Creates a descriptor from already gridded entries.
    pub fn new(entries: Vec<ShapeEntry>) -> Self {
        Self { entries }
    }

    /// Number of cube placements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the descriptor holds no placements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the placements in descriptor order.
    pub fn iter(&self) -> std::slice::Iter<'_, ShapeEntry> {
        self.entries.iter()
    }

    /// The placements as a slice.
    pub fn entries(&self) -> &[ShapeEntry] {
        &self.entries
    }
}

impl From<Vec<ShapeEntry>> for ShapeDescriptor {
    fn from(entries: Vec<ShapeEntry>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<ShapeEntry> for ShapeDescriptor {
    fn from_iter<I: IntoIterator<Item = ShapeEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ShapeDescriptor {
    type Item = &'a ShapeEntry;
    type IntoIter = std::slice::Iter<'a, ShapeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Accumulates cube placements for a procedural figure.
///
/// Coordinates are rounded to the nearest grid cell, with halves rounding
/// towards positive infinity. Writing to an occupied cell replaces its color
/// but keeps the cell's original position in the output order.
#[derive(Default)]
pub struct ShapeBuilder {
    entries: Vec<ShapeEntry>,
    occupied: HashMap<Point3<i32>, usize>,
}

impl ShapeBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a cube at the grid cell nearest to `(x, y, z)`.
    pub fn set_block(&mut self, x: f32, y: f32, z: f32, color: u32) {
        let position = Point3::new(round_to_grid(x), round_to_grid(y), round_to_grid(z));

        match self.occupied.get(&position) {
            Some(&index) => self.entries[index].color = color,
            None => {
                self.occupied.insert(position, self.entries.len());
                self.entries.push(ShapeEntry { position, color });
            }
        }
    }

    /// Number of distinct cells placed so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been placed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finishes the figure.
    pub fn build(self) -> ShapeDescriptor {
        ShapeDescriptor::new(self.entries)
    }
}

fn round_to_grid(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}

/// Yields `start, start + 1, ...` while the value stays `<= end`.
pub(crate) fn steps_inclusive(start: f32, end: f32) -> impl Iterator<Item = f32> {
    (0..)
        .map(move |step| start + step as f32)
        .take_while(move |value| *value <= end)
}

/// Yields `start, start + 1, ...` while the value stays `< end`.
pub(crate) fn steps_exclusive(start: f32, end: f32) -> impl Iterator<Item = f32> {
    (0..)
        .map(move |step| start + step as f32)
        .take_while(move |value| *value < end)
}

/// The figures the showcase can display.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// A voxel portrait: cap, sunglasses, beard, shirt with a chest graphic.
    Avatar,
    /// A desk with a monitor full of code and a laptop.
    Workstation,
}

impl ShapeKind {
    /// Every figure in display order.
    pub fn all() -> [ShapeKind; 2] {
        [ShapeKind::Avatar, ShapeKind::Workstation]
    }

    /// Generates the figure standing on the floor plane at `floor_y`.
    ///
    /// The workstation screen content is randomized; pass a seeded `rng`
    /// for reproducible output.
    pub fn generate(&self, floor_y: f32, rng: &mut fastrand::Rng) -> ShapeDescriptor {
        match self {
            ShapeKind::Avatar => avatar::generate(floor_y),
            ShapeKind::Workstation => workstation::generate(floor_y, rng),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Avatar => write!(f, "Avatar"),
            ShapeKind::Workstation => write!(f, "Workstation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rounds_halves_up() {
        let mut builder = ShapeBuilder::new();
        builder.set_block(-2.5, 0.5, 1.4, 0xFFFFFF);

        let shape = builder.build();
        assert_eq!(shape.entries()[0].position, Point3::new(-2, 1, 1));
    }

    #[test]
    fn builder_overwrites_color_but_keeps_first_order() {
        let mut builder = ShapeBuilder::new();
        builder.set_block(0.0, 0.0, 0.0, 0xFF0000);
        builder.set_block(1.0, 0.0, 0.0, 0x00FF00);
        builder.set_block(0.2, -0.2, 0.0, 0x0000FF);

        let shape = builder.build();
        assert_eq!(shape.len(), 2);
        assert_eq!(shape.entries()[0], ShapeEntry::new(0, 0, 0, 0x0000FF));
        assert_eq!(shape.entries()[1], ShapeEntry::new(1, 0, 0, 0x00FF00));
    }

    #[test]
    fn fractional_steps_follow_loop_bounds() {
        let inclusive: Vec<f32> = steps_inclusive(-1.5, 1.5).collect();
        assert_eq!(inclusive, vec![-1.5, -0.5, 0.5, 1.5]);

        let exclusive: Vec<f32> = steps_exclusive(0.0, 2.5).collect();
        assert_eq!(exclusive, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn every_figure_is_non_empty_and_unique_per_cell() {
        let mut rng = fastrand::Rng::with_seed(7);
        for kind in ShapeKind::all() {
            let shape = kind.generate(-12.0, &mut rng);
            assert!(!shape.is_empty(), "{kind} is empty");

            let mut cells = std::collections::HashSet::new();
            for entry in &shape {
                assert!(cells.insert(entry.position), "{kind} repeats a cell");
            }
        }
    }

    #[test]
    fn workstation_is_reproducible_with_a_seed() {
        let first = ShapeKind::Workstation.generate(-12.0, &mut fastrand::Rng::with_seed(3));
        let second = ShapeKind::Workstation.generate(-12.0, &mut fastrand::Rng::with_seed(3));
        assert_eq!(first, second);
    }
}

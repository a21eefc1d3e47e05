//! Rendering system for the voxel showcase.
//!
//! The engine hands a `FrameView` to a `RenderSink` once per frame. The sink
//! owns everything GPU related; the engine never reaches into it beyond the
//! three calls of the trait. `VoxelRenderer` is the `wgpu` implementation.

use cgmath::{Matrix4, Point3};

use crate::{engine_state::simulation::Voxel, error::RenderError};

pub mod renderer;
mod texture;
pub mod vertex;

pub use renderer::VoxelRenderer;

/// Fog starts at this distance from the eye
pub const FOG_NEAR: f32 = 40.0;
/// Fog is opaque from this distance on
pub const FOG_FAR: f32 = 90.0;

/// Edge length of the floor grid
pub const GRID_SIZE: f32 = 200.0;
/// Cells per side of the floor grid
pub const GRID_DIVISIONS: u32 = 50;
/// How far below the simulation floor the grid is drawn
pub const GRID_DROP: f32 = 2.0;

/// Everything a sink needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    /// Voxels in store order
    pub voxels: &'a [Voxel],
    /// Combined view and projection matrix, in WGPU clip space
    pub view_proj: Matrix4<f32>,
    /// Camera position in world space
    pub eye: Point3<f32>,
}

/// Background palette.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Slate night background
    #[default]
    Dark,
    /// Near-white background
    Light,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Background color as `0xRRGGBB`. Fog fades into the same color.
    pub fn background_hex(self) -> u32 {
        match self {
            Theme::Dark => 0x0F172A,
            Theme::Light => 0xF8FAFC,
        }
    }

    /// Background color as RGBA components in `[0, 1]`.
    pub fn background_rgba(self) -> [f32; 4] {
        hex_to_rgba(self.background_hex())
    }

    /// Floor grid line color as `0xRRGGBB`.
    pub fn grid_hex(self) -> u32 {
        match self {
            Theme::Dark => 0x1E293B,
            Theme::Light => 0xE2E8F0,
        }
    }

    /// Floor grid line color as RGBA components in `[0, 1]`.
    pub fn grid_rgba(self) -> [f32; 4] {
        hex_to_rgba(self.grid_hex())
    }

    /// Background color as a render pass clear value.
    pub fn clear_color(self) -> wgpu::Color {
        let [r, g, b, a] = self.background_rgba().map(f64::from);
        wgpu::Color { r, g, b, a }
    }
}

fn hex_to_rgba(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
        1.0,
    ]
}

/// Destination of rendered frames.
pub trait RenderSink {
    /// Draws one frame. A frame that cannot be presented right now may be
    /// skipped without an error.
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError>;

    /// Adapts to a new viewport size in physical pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Switches the background and fog palette.
    fn set_theme(&mut self, theme: Theme);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_the_theme() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn dark_background_is_slate() {
        let [r, g, b, a] = Theme::Dark.background_rgba();
        assert_eq!(r, 15.0 / 255.0);
        assert_eq!(g, 23.0 / 255.0);
        assert_eq!(b, 42.0 / 255.0);
        assert_eq!(a, 1.0);
        assert!(Theme::Light.clear_color().r > 0.9);
    }

    #[test]
    fn grid_follows_the_theme() {
        assert_eq!(Theme::Dark.grid_rgba()[0], 0x1E as f32 / 255.0);
        assert!(Theme::Light.grid_rgba()[2] > Theme::Dark.grid_rgba()[2]);
        assert_ne!(Theme::Light.grid_rgba(), Theme::Light.background_rgba());
    }
}

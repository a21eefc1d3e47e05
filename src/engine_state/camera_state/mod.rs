//! # Camera State Management
//!
//! This module handles all camera-related functionality including:
//! - Orbit camera position and damping
//! - View and projection matrix calculations
//! - Player input processing for camera control
//!
//! ## Core Components
//! - `OrbitCamera`: Circles the figure, optionally rotating on its own
//! - `CameraController`: Collects drag and zoom input between frames
//! - `Projection`: Manages the camera's projection matrix
//!
//! Nothing here touches the GPU; the renderer receives the resulting
//! matrices through a `FrameView`.

use camera::{CameraConfig, CameraController, OrbitCamera, Projection};
use cgmath::{Deg, Matrix4, Point3};

use super::PlayerAction;

pub mod camera;

/// The complete camera system: orbit state, pending input and projection.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: OrbitCamera,
    /// Handles player input and camera movement
    pub camera_controller: CameraController,
    /// Perspective settings for the current viewport
    pub projection: Projection,
}

impl CameraState {
    /// Creates the camera for a `width` x `height` viewport.
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            camera: OrbitCamera::new(config),
            camera_controller: CameraController::new(config),
            projection: Projection::new(
                width,
                height,
                Deg(config.fovy_degrees),
                config.znear,
                config.zfar,
            ),
        }
    }

    /// Queues the camera-related parts of `actions`.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.camera_controller.intake_actions(actions);
    }

    /// Advances the camera by one frame.
    pub fn update(&mut self) {
        self.camera.update(&mut self.camera_controller);
    }

    /// Adapts the projection to a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Turns auto-rotation on or off. The view stays where it is.
    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.camera.auto_rotate = enabled;
    }

    /// Whether the camera is rotating on its own.
    pub fn auto_rotate(&self) -> bool {
        self.camera.auto_rotate
    }

    /// Combined view and projection matrix.
    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }

    /// World position of the eye.
    pub fn eye(&self) -> Point3<f32> {
        self.camera.eye()
    }
}

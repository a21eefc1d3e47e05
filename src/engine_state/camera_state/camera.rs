//! # Orbit Camera
//!
//! This module contains the camera used to look at the figure:
//! - `OrbitCamera`: A camera circling a target point, with damped motion
//! - `Projection`: Perspective projection settings
//! - `CameraController`: Collects drag and zoom input between frames
//! - `CameraConfig`: Tunables for all of the above
//!
//! The camera orbits on a sphere around its target. Angular input is not
//! applied directly: it accumulates into a pending delta, and every update
//! applies a `damping` fraction of that delta and keeps the rest for the
//! following frames. Auto-rotation feeds the same pending delta at a fixed
//! per-frame rate, so it takes the same tick-rate assumption as the voxel
//! simulation.

use cgmath::*;
use std::f32::consts::{PI, TAU};

use crate::engine_state::PlayerAction;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// WGPU expects NDC depth in `[0, 1]` where OpenGL produces `[-1, 1]`:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Keeps the polar angle off the poles so `look_at` stays well defined
const POLAR_EPSILON: f32 = 0.0001;

/// Frames per auto-rotation turn at speed 1.0
const FRAMES_PER_TURN: f32 = 60.0 * 60.0;

/// Camera tunables.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    /// Initial eye position
    pub eye: Point3<f32>,
    /// Point the camera orbits around
    pub target: Point3<f32>,
    /// Vertical field of view in degrees
    pub fovy_degrees: f32,
    /// Near clipping plane distance
    pub znear: f32,
    /// Far clipping plane distance
    pub zfar: f32,
    /// Fraction of pending motion applied per frame
    pub damping: f32,
    /// Auto-rotation speed; 1.0 is one turn per minute at 60 frames per second
    pub auto_rotate_speed: f32,
    /// Radians of orbit per pixel of drag
    pub rotate_sensitivity: f32,
    /// Distance scale per wheel line
    pub zoom_step: f32,
    /// Closest allowed distance to the target
    pub min_distance: f32,
    /// Farthest allowed distance from the target
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Point3::new(20.0, 10.0, 35.0),
            target: Point3::new(0.0, 0.0, 0.0),
            fovy_degrees: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            damping: 0.05,
            auto_rotate_speed: 2.0,
            rotate_sensitivity: 0.005,
            zoom_step: 0.95,
            min_distance: 5.0,
            max_distance: 200.0,
        }
    }
}

/// A camera on a sphere around a target point.
///
/// Angles follow the usual Y-up convention: `azimuth` is measured around Y
/// from the +Z axis, `polar` from the +Y axis.
#[derive(Debug)]
pub struct OrbitCamera {
    /// The point being looked at
    pub target: Point3<f32>,
    /// Distance from the target
    pub distance: f32,
    /// Angle around the Y axis
    pub azimuth: Rad<f32>,
    /// Angle down from the Y axis
    pub polar: Rad<f32>,
    /// Whether the camera spins on its own
    pub auto_rotate: bool,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_zoom: f32,
    damping: f32,
    auto_rotate_speed: f32,
    min_distance: f32,
    max_distance: f32,
}

impl OrbitCamera {
    /// Places the camera at `config.eye` looking at `config.target`.
    pub fn new(config: &CameraConfig) -> Self {
        let offset = config.eye - config.target;
        let distance = offset.magnitude().max(POLAR_EPSILON);
        let azimuth = Rad(offset.x.atan2(offset.z));
        let polar = Rad((offset.y / distance).clamp(-1.0, 1.0).acos());

        Self {
            target: config.target,
            distance,
            azimuth,
            polar,
            auto_rotate: true,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_zoom: 1.0,
            damping: config.damping.clamp(0.0, 1.0),
            auto_rotate_speed: config.auto_rotate_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        }
    }

    /// World position of the eye.
    pub fn eye(&self) -> Point3<f32> {
        let (polar_sin, polar_cos) = self.polar.0.sin_cos();
        let (azimuth_sin, azimuth_cos) = self.azimuth.0.sin_cos();
        self.target
            + Vector3::new(
                polar_sin * azimuth_sin,
                polar_cos,
                polar_sin * azimuth_cos,
            ) * self.distance
    }

    /// Calculates the view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y())
    }

    /// Pulls pending input out of `controller` and advances the damped motion
    /// by one frame.
    pub fn update(&mut self, controller: &mut CameraController) {
        self.pending_azimuth -= controller.rotate_horizontal;
        self.pending_polar -= controller.rotate_vertical;
        self.pending_zoom *= controller.zoom_factor();
        controller.reset();

        if self.auto_rotate {
            self.pending_azimuth += TAU / FRAMES_PER_TURN * self.auto_rotate_speed;
        }

        self.azimuth += Rad(self.pending_azimuth * self.damping);
        self.polar += Rad(self.pending_polar * self.damping);
        self.polar.0 = self.polar.0.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.azimuth = self.azimuth.normalize();

        self.distance = (self.distance * self.pending_zoom)
            .clamp(self.min_distance, self.max_distance);
        self.pending_zoom = 1.0;

        self.pending_azimuth *= 1.0 - self.damping;
        self.pending_polar *= 1.0 - self.damping;
    }
}

/// Represents a camera's projection matrix and related parameters.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection for a viewport of `width` x `height` pixels.
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the aspect ratio for a resized viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// The current aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Calculates the projection matrix, already in WGPU clip space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Collects drag and zoom input until the camera consumes it.
#[derive(Debug)]
pub struct CameraController {
    // Radians of orbit requested since the last update
    rotate_horizontal: f32,
    rotate_vertical: f32,

    // Wheel lines since the last update, positive towards the target
    scroll: f32,

    // Configuration
    sensitivity: f32,
    zoom_step: f32,
}

impl CameraController {
    /// Creates a controller with the drag and zoom settings of `config`.
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: 0.0,
            sensitivity: config.rotate_sensitivity,
            zoom_step: config.zoom_step,
        }
    }

    /// Accumulates the drag and zoom parts of `actions`.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        if let Some((delta_x, delta_y)) = actions.rotate_view {
            self.rotate_horizontal += delta_x as f32 * self.sensitivity;
            self.rotate_vertical += delta_y as f32 * self.sensitivity;
        }
        self.scroll += actions.zoom;
    }

    /// Checks if there is input the camera has not consumed yet.
    pub fn has_updates(&self) -> bool {
        self.rotate_horizontal != 0.0 || self.rotate_vertical != 0.0 || self.scroll != 0.0
    }

    fn zoom_factor(&self) -> f32 {
        self.zoom_step.powf(self.scroll)
    }

    fn reset(&mut self) {
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.scroll = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_camera() -> (OrbitCamera, CameraController) {
        let config = CameraConfig::default();
        let mut camera = OrbitCamera::new(&config);
        camera.auto_rotate = false;
        (camera, CameraController::new(&config))
    }

    #[test]
    fn starts_at_the_configured_eye() {
        let (camera, _) = still_camera();
        let eye = camera.eye();

        assert!((eye.x - 20.0).abs() < 1e-3);
        assert!((eye.y - 10.0).abs() < 1e-3);
        assert!((eye.z - 35.0).abs() < 1e-3);
    }

    #[test]
    fn auto_rotation_orbits_at_constant_distance() {
        let config = CameraConfig::default();
        let mut camera = OrbitCamera::new(&config);
        let mut controller = CameraController::new(&config);
        let start = camera.azimuth;
        let height = camera.eye().y;

        for _ in 0..120 {
            camera.update(&mut controller);
        }

        assert!(camera.azimuth != start);
        assert!((camera.eye().y - height).abs() < 1e-3);
        assert!((camera.eye().distance(camera.target) - camera.distance).abs() < 1e-3);
    }

    #[test]
    fn without_auto_rotation_the_camera_rests() {
        let (mut camera, mut controller) = still_camera();
        let eye = camera.eye();

        for _ in 0..60 {
            camera.update(&mut controller);
        }
        assert_eq!(camera.eye(), eye);
    }

    #[test]
    fn drag_is_applied_gradually() {
        let (mut camera, mut controller) = still_camera();
        let start = camera.azimuth.0;
        controller.intake_actions(&PlayerAction {
            rotate_view: Some((100.0, 0.0)),
            ..PlayerAction::default()
        });
        assert!(controller.has_updates());

        camera.update(&mut controller);
        assert!(!controller.has_updates());
        let first_step = (camera.azimuth.0 - start).abs();

        camera.update(&mut controller);
        let second_step = (camera.azimuth.0 - start).abs() - first_step;

        assert!(first_step > 0.0);
        assert!(second_step > 0.0 && second_step < first_step);
    }

    #[test]
    fn zoom_is_clamped() {
        let (mut camera, mut controller) = still_camera();
        controller.intake_actions(&PlayerAction {
            zoom: 500.0,
            ..PlayerAction::default()
        });
        camera.update(&mut controller);
        assert_eq!(camera.distance, CameraConfig::default().min_distance);

        controller.intake_actions(&PlayerAction {
            zoom: -500.0,
            ..PlayerAction::default()
        });
        camera.update(&mut controller);
        assert_eq!(camera.distance, CameraConfig::default().max_distance);
    }

    #[test]
    fn projection_survives_zero_sized_viewports() {
        let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);
        projection.resize(0, 0);
        assert_eq!(projection.aspect(), 1.0);
    }
}

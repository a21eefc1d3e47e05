//! # Engine State Module
//!
//! The host-level engine: simulation, camera and render sink driven together
//! once per frame.
//!
//! ## Key Components
//!
//! * `EngineState` - The facade the window host talks to
//! * `simulation` - The voxel dismantle / rebuild engine
//! * `shapes` - Shape descriptors and the built-in figures
//! * `camera_state` - Orbit camera and projection
//! * `rendering` - The `RenderSink` seam and its `wgpu` implementation
//! * `buffer_state` - Named GPU buffers used by the renderer
//!
//! ## Frame Order
//!
//! ```text
//! input -> actions -> camera update -> simulation tick -> draw
//! ```
//!
//! Everything runs on the thread that owns the event loop. Dropping the
//! engine releases the render sink and with it every GPU resource.

use web_time::Instant;
use winit::{event::MouseButton, keyboard::KeyCode};

use camera_state::{camera::CameraConfig, CameraState};
use rendering::{FrameView, RenderSink, Theme};
use shapes::{ShapeDescriptor, ShapeKind};
use simulation::{PhaseListener, SimulationConfig, SimulationPhase, VoxelSimulation};

use crate::{application_state::input_state::ProcessedInputState, error::RenderError};

pub mod buffer_state;
pub mod camera_state;
pub mod rendering;
pub mod shapes;
pub mod simulation;

/// The engine facade: owns the simulation, the camera and the render sink.
///
/// # Examples
///
/// ```ignore
/// let mut engine = EngineState::new(renderer, SimulationConfig::default(), &CameraConfig::default(), 1280, 720);
/// engine.load_model(ShapeKind::Avatar);
///
/// // Once per display refresh
/// engine.frame(Instant::now())?;
/// ```
pub struct EngineState<S: RenderSink> {
    simulation: VoxelSimulation,
    camera_state: CameraState,
    render_sink: S,
    current_model: ShapeKind,
    theme: Theme,
    shape_rng: fastrand::Rng,
}

impl<S: RenderSink> EngineState<S> {
    /// Creates an engine with an empty simulation for a `width` x `height`
    /// viewport.
    pub fn new(
        render_sink: S,
        config: SimulationConfig,
        camera_config: &CameraConfig,
        width: u32,
        height: u32,
    ) -> Self {
        let shape_rng = config.rng();
        let theme = Theme::default();
        let mut render_sink = render_sink;
        render_sink.set_theme(theme);

        Self {
            simulation: VoxelSimulation::new(config),
            camera_state: CameraState::new(camera_config, width, height),
            render_sink,
            current_model: ShapeKind::Avatar,
            theme,
            shape_rng,
        }
    }

    /// Replaces every voxel with `shape` and resets to `Stable`.
    pub fn load_shape(&mut self, shape: &ShapeDescriptor) {
        self.simulation.load_shape(shape);
    }

    /// Generates and loads one of the built-in figures.
    pub fn load_model(&mut self, kind: ShapeKind) {
        let shape = self.generate(kind);
        self.current_model = kind;
        self.simulation.load_shape(&shape);
    }

    /// Blows the figure apart when it is at rest.
    pub fn dismantle(&mut self) {
        self.simulation.dismantle();
    }

    /// Rebuilds the current voxels into `shape`, starting now.
    pub fn rebuild(&mut self, shape: &ShapeDescriptor) {
        self.rebuild_at(shape, Instant::now());
    }

    /// Rebuilds the current voxels into `shape`, starting at `now`.
    pub fn rebuild_at(&mut self, shape: &ShapeDescriptor, now: Instant) {
        self.simulation.rebuild(shape, now);
    }

    /// Rebuilds into a freshly generated built-in figure, which becomes the
    /// current model.
    pub fn rebuild_model(&mut self, kind: ShapeKind, now: Instant) {
        let shape = self.generate(kind);
        self.current_model = kind;
        self.simulation.rebuild(&shape, now);
    }

    /// Registers the listener for phase and voxel count changes.
    pub fn on_phase_change<L>(&mut self, listener: L)
    where
        L: PhaseListener + 'static,
    {
        self.simulation.set_phase_listener(listener);
    }

    /// Turns camera auto-rotation on or off. The simulation is unaffected.
    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.camera_state.set_auto_rotate(enabled);
    }

    /// Adapts the camera and the render sink to a new viewport.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.camera_state.resize(width, height);
        self.render_sink.resize(width, height);
    }

    /// Switches the background palette.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.render_sink.set_theme(theme);
    }

    /// Advances the camera and the simulation by one frame and draws it.
    pub fn frame(&mut self, now: Instant) -> Result<(), RenderError> {
        self.camera_state.update();
        self.simulation.tick(now);

        let view = FrameView {
            voxels: self.simulation.voxels(),
            view_proj: self.camera_state.view_proj(),
            eye: self.camera_state.eye(),
        };
        self.render_sink.draw(&view)
    }

    /// Translates one frame of input into engine requests.
    pub fn set_input_commands(&mut self, input: ProcessedInputState, now: Instant) {
        let actions = Self::translate_processed_input(&input);
        self.camera_state.intake_actions(&actions);

        if actions.toggle_theme {
            self.set_theme(self.theme.toggled());
        }
        if actions.toggle_auto_rotate {
            let enabled = !self.camera_state.auto_rotate();
            log::info!("Auto-rotate {}", if enabled { "on" } else { "off" });
            self.set_auto_rotate(enabled);
        }
        if actions.dismantle {
            self.dismantle();
        }
        if let Some(kind) = actions.select_model {
            log::info!("Switching to {kind}");
            self.rebuild_model(kind, now);
        } else if actions.rebuild {
            self.rebuild_model(self.current_model, now);
        }
    }

    /// Translates the processed input state into player actions.
    fn translate_processed_input(input: &ProcessedInputState) -> PlayerAction {
        let mut player_action = PlayerAction::default();

        // One-shot actions trigger on press, not hold
        player_action.dismantle = input.get_key_state(KeyCode::KeyD).is_just_pressed();
        player_action.rebuild = input.get_key_state(KeyCode::KeyR).is_just_pressed();
        player_action.toggle_auto_rotate = input.get_key_state(KeyCode::Space).is_just_pressed();
        player_action.toggle_theme = input.get_key_state(KeyCode::KeyT).is_just_pressed();

        if input.get_key_state(KeyCode::Digit1).is_just_pressed() {
            player_action.select_model = Some(ShapeKind::Avatar);
        } else if input.get_key_state(KeyCode::Digit2).is_just_pressed() {
            player_action.select_model = Some(ShapeKind::Workstation);
        }

        // Orbit while the left button is down and the mouse moved
        if input.get_mouse_button_state(MouseButton::Left).is_active() {
            player_action.rotate_view = input.get_mouse_delta();
        }
        player_action.zoom = input.get_scroll_lines();

        player_action
    }

    fn generate(&mut self, kind: ShapeKind) -> ShapeDescriptor {
        kind.generate(self.simulation.config().floor_y, &mut self.shape_rng)
    }

    /// The simulation being driven.
    pub fn simulation(&self) -> &VoxelSimulation {
        &self.simulation
    }

    /// Shortcut for the simulation phase.
    pub fn phase(&self) -> SimulationPhase {
        self.simulation.phase()
    }

    /// The figure the last load or rebuild targeted.
    pub fn current_model(&self) -> ShapeKind {
        self.current_model
    }

    /// The active background palette.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether the camera is rotating on its own.
    pub fn auto_rotate(&self) -> bool {
        self.camera_state.auto_rotate()
    }

    /// The sink frames are drawn into.
    pub fn render_sink(&self) -> &S {
        &self.render_sink
    }
}

/// Represents player actions derived from one frame of input.
#[derive(Debug, Default)]
pub struct PlayerAction {
    /// One-shot requests, set on the frame the key went down
    dismantle: bool,
    rebuild: bool,
    select_model: Option<ShapeKind>,
    toggle_auto_rotate: bool,
    toggle_theme: bool,

    /// View rotation in pixels - Some while dragging
    pub(crate) rotate_view: Option<(f64, f64)>,

    /// Wheel lines, positive towards the target
    pub(crate) zoom: f32,
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap, rc::Rc};

    use cgmath::Point3;
    use web_time::Duration;

    use super::*;
    use crate::{
        application_state::input_state::RawInputState,
        engine_state::shapes::ShapeEntry,
    };

    #[derive(Default)]
    struct RecordingSink {
        drawn_counts: Vec<usize>,
        eyes: Vec<Point3<f32>>,
        resizes: Vec<(u32, u32)>,
        themes: Vec<Theme>,
        fail_draws: bool,
    }

    impl RenderSink for RecordingSink {
        fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
            if self.fail_draws {
                return Err(RenderError::MissingBuffer("instance_buffer"));
            }
            self.drawn_counts.push(frame.voxels.len());
            self.eyes.push(frame.eye);
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
        }

        fn set_theme(&mut self, theme: Theme) {
            self.themes.push(theme);
        }
    }

    fn engine() -> EngineState<RecordingSink> {
        let config = SimulationConfig {
            seed: Some(3),
            ..SimulationConfig::default()
        };
        EngineState::new(RecordingSink::default(), config, &CameraConfig::default(), 800, 600)
    }

    fn pressed(keys: &[KeyCode]) -> ProcessedInputState {
        ProcessedInputState {
            keyboard_states: keys
                .iter()
                .map(|&key| (key, RawInputState::Pressed))
                .collect(),
            mouse_button_states: HashMap::new(),
            mouse_delta: None,
            scroll_lines: 0.0,
        }
    }

    #[test]
    fn frames_draw_every_voxel() {
        let mut engine = engine();
        engine.load_model(ShapeKind::Avatar);
        let count = engine.simulation().voxel_count();
        assert!(count > 0);

        engine.frame(Instant::now()).expect("draw");
        assert_eq!(engine.render_sink().drawn_counts, vec![count]);
    }

    #[test]
    fn draw_failures_are_returned() {
        let mut engine = engine();
        engine.render_sink.fail_draws = true;
        assert!(engine.frame(Instant::now()).is_err());
    }

    #[test]
    fn resize_and_theme_reach_the_sink() {
        let mut engine = engine();
        engine.on_resize(1024, 768);
        engine.set_theme(Theme::Light);

        assert_eq!(engine.render_sink().resizes, vec![(1024, 768)]);
        assert_eq!(engine.render_sink().themes, vec![Theme::Dark, Theme::Light]);
        assert_eq!(engine.theme(), Theme::Light);
    }

    #[test]
    fn auto_rotate_moves_only_the_camera() {
        let mut engine = engine();
        engine.load_model(ShapeKind::Avatar);
        let voxels = engine.simulation().voxels().to_vec();
        let start = Instant::now();

        engine.set_auto_rotate(false);
        engine.frame(start).expect("draw");
        engine.frame(start).expect("draw");
        let eyes = &engine.render_sink().eyes;
        assert_eq!(eyes[0], eyes[1]);

        engine.set_auto_rotate(true);
        engine.frame(start).expect("draw");
        let eyes = &engine.render_sink().eyes;
        assert_ne!(eyes[1], eyes[2]);
        assert_eq!(engine.simulation().voxels(), voxels.as_slice());
    }

    #[test]
    fn keys_drive_the_simulation() {
        let mut engine = engine();
        engine.load_model(ShapeKind::Avatar);
        let now = Instant::now();

        engine.set_input_commands(pressed(&[KeyCode::KeyD]), now);
        assert_eq!(engine.phase(), SimulationPhase::Dismantling);

        engine.set_input_commands(pressed(&[KeyCode::Digit2]), now);
        assert_eq!(engine.phase(), SimulationPhase::Rebuilding);
        assert_eq!(engine.current_model(), ShapeKind::Workstation);

        engine.set_input_commands(pressed(&[KeyCode::KeyT, KeyCode::Space]), now);
        assert_eq!(engine.theme(), Theme::Light);
        assert!(!engine.auto_rotate());
    }

    #[test]
    fn held_keys_do_not_repeat() {
        let mut engine = engine();
        let mut input = pressed(&[KeyCode::KeyT]);
        input.keyboard_states.insert(KeyCode::KeyT, RawInputState::Held);

        engine.set_input_commands(input, Instant::now());
        assert_eq!(engine.theme(), Theme::Dark);
    }

    #[test]
    fn listener_sees_the_whole_cycle() {
        let mut engine = engine();
        let phases = Rc::new(RefCell::new(Vec::new()));
        let sink = phases.clone();
        engine.on_phase_change(move |phase| sink.borrow_mut().push(phase));

        let target = ShapeDescriptor::new(vec![ShapeEntry::new(0, -12, 0, 0xFFFFFF)]);
        engine.load_shape(&target);
        engine.dismantle();

        let start = Instant::now();
        engine.rebuild_at(&target, start);
        for tick in 1..=300 {
            engine
                .frame(start + Duration::from_millis(16) * tick)
                .expect("draw");
        }

        assert_eq!(
            *phases.borrow(),
            vec![
                SimulationPhase::Stable,
                SimulationPhase::Dismantling,
                SimulationPhase::Rebuilding,
                SimulationPhase::Stable
            ]
        );
    }
}

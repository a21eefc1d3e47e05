//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling
//! - Application lifecycle events
//! - State transitions between initialization and running states

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{
    Graphics, GraphicsBuilder, GraphicsEvent, MaybeGraphics, WINDOW_TITLE,
};
use input_manager::InputManager;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::engine_state::{
    camera_state::camera::CameraConfig,
    rendering::VoxelRenderer,
    shapes::ShapeKind,
    simulation::{PhaseListener, SimulationConfig, SimulationPhase},
    EngineState,
};
use crate::error::RenderError;

/// Where the native build looks for simulation settings
#[cfg(not(target_family = "wasm"))]
pub const SIMULATION_CONFIG_PATH: &str = "assets/config/simulation.json";

/// The main application state container that manages the application's
/// lifecycle.
pub struct ApplicationState {
    /// The current graphics state
    graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    state: Option<InitializedApplicationState>,

    /// Settings the engine is created with
    simulation_config: SimulationConfig,

    /// Last size reported before the engine existed
    pending_size: Option<PhysicalSize<u32>>,
}

/// The fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The engine drawing into the window
    pub engine_state: EngineState<VoxelRenderer>,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,
}

/// Mirrors the simulation phase and voxel count in the window title.
struct WindowTitleListener {
    window: Arc<Window>,
    phase: SimulationPhase,
    voxel_count: usize,
}

impl WindowTitleListener {
    fn refresh(&self) {
        self.window.set_title(&format!(
            "{WINDOW_TITLE} | {} | {} voxels",
            self.phase, self.voxel_count
        ));
    }
}

impl PhaseListener for WindowTitleListener {
    fn on_phase_change(&mut self, phase: SimulationPhase) {
        self.phase = phase;
        self.refresh();
    }

    fn on_voxel_count_change(&mut self, count: usize) {
        log::info!("Voxel count is now {count}");
        self.voxel_count = count;
        self.refresh();
    }
}

impl ApplicationState {
    /// Creates the application, waiting for the event loop to resume before
    /// creating any window.
    pub fn new(
        event_loop_proxy: EventLoopProxy<GraphicsEvent>,
        simulation_config: SimulationConfig,
    ) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(event_loop_proxy)),
            state: None,
            simulation_config,
            pending_size: None,
        }
    }

    /// Builds the engine once the surface is configured; does nothing before
    /// that.
    fn initialize_application_state(&mut self) -> Result<(), RenderError> {
        let MaybeGraphics::Graphics(gfx) = &self.graphics else {
            return Ok(());
        };
        if !gfx.is_surface_configured {
            return Ok(());
        }

        let MaybeGraphics::Graphics(gfx) =
            std::mem::replace(&mut self.graphics, MaybeGraphics::Moved)
        else {
            return Ok(());
        };
        let Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
            ..
        } = gfx;

        let (width, height) = (surface_config.width, surface_config.height);
        let renderer = VoxelRenderer::new(
            surface,
            surface_config,
            device,
            queue,
            self.simulation_config.floor_y,
        )?;

        let mut engine_state = EngineState::new(
            renderer,
            self.simulation_config.clone(),
            &CameraConfig::default(),
            width,
            height,
        );
        engine_state.on_phase_change(WindowTitleListener {
            window: window.clone(),
            phase: SimulationPhase::Stable,
            voxel_count: 0,
        });
        engine_state.load_model(ShapeKind::Avatar);

        self.state = Some(InitializedApplicationState {
            engine_state,
            window,
            input_manager: InputManager::new(),
        });
        Ok(())
    }

    fn initialize_or_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.initialize_application_state() {
            log::error!("Failed to create renderer: {err}");
            event_loop.exit();
        }
    }
}

fn is_exit_request(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event: KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
                ..
            }
    )
}

impl ApplicationHandler<GraphicsEvent> for ApplicationState {
    /// Handles window events for the running engine, or drives the
    /// initialization while there is none yet.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if is_exit_request(&event) {
            event_loop.exit();
            return;
        }

        if self.state.is_none() {
            if let WindowEvent::Resized(size) = event {
                self.pending_size = Some(size);
                if let MaybeGraphics::Graphics(gfx) = &mut self.graphics {
                    gfx.configure(size.width, size.height);
                }
                self.initialize_or_exit(event_loop);
            }
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };

        state.input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                state.engine_state.on_resize(size.width, size.height);
            }
            WindowEvent::Focused(false) => {
                state.input_manager.reset_inputs();
            }
            WindowEvent::RedrawRequested => {
                let now = web_time::Instant::now();
                let input = state.input_manager.get_and_reset_processed_input();
                state.engine_state.set_input_commands(input, now);

                if let Err(err) = state.engine_state.frame(now) {
                    log::error!("Failed to render frame: {err}");
                    event_loop.exit();
                }
            }
            _ => (),
        }
    }

    /// Starts the graphics setup the first time the application resumes.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Receives the outcome of the graphics setup.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: GraphicsEvent) {
        match graphics {
            Ok(mut graphics) => {
                if let Some(size) = self.pending_size {
                    graphics.configure(size.width, size.height);
                }
                self.graphics = MaybeGraphics::Graphics(graphics);
                self.initialize_or_exit(event_loop);
            }
            Err(err) => {
                log::error!("Failed to initialize graphics: {err}");
                event_loop.exit();
            }
        }
    }

    /// Requests the next frame.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    /// Drops the engine, and with it every GPU resource, before the window
    /// goes away.
    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.state.take().is_some() {
            log::info!("Engine shut down");
        }
        self.graphics = MaybeGraphics::Moved;
    }
}

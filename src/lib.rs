#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Showcase
//!
//! An interactive voxel figure that can be blown apart into a physics-driven
//! cloud of cubes and rebuilt into another figure, rendered with WGPU.
//!
//! ## Key Modules
//!
//! * `engine_state` - The simulation, its shapes, the camera and the renderer
//! * `application_state` - Window lifecycle, graphics setup and input
//! * `error` - Error types
//!
//! ## Architecture
//!
//! The voxel simulation is independent of windowing and GPU code: it is
//! driven through `VoxelSimulation` and hands its voxels to whatever
//! `RenderSink` the host provides. The host in this crate is a `winit`
//! application rendering through `wgpu`, on native targets and in the
//! browser.
//!
//! ## Usage
//!
//! ```no_run
//! // Native application initialization
//! fn main() {
//!     voxel_showcase::run();
//! }
//! ```
//!
//! For web applications `run_web` is exported to JavaScript.
//!
//! ## Controls
//!
//! | Input | Action |
//! |---|---|
//! | `D` | Dismantle |
//! | `R` | Rebuild the current figure |
//! | `1` / `2` | Rebuild into the avatar / the workstation |
//! | `Space` | Toggle camera auto-rotation |
//! | `T` | Toggle dark / light theme |
//! | Left drag / wheel | Orbit / zoom |
//! | `Escape` | Quit |

use application_state::{graphics_resources_builder::GraphicsEvent, ApplicationState};
#[cfg(target_family = "wasm")]
use wasm_bindgen::prelude::wasm_bindgen;

use winit::event_loop::EventLoop;

use engine_state::simulation::SimulationConfig;

mod application_state;
pub mod engine_state;
pub mod error;

#[cfg(target_family = "wasm")]
const CANVAS_ID: &str = "wgpu-canvas";

fn init_logger() {
    cfg_if::cfg_if! {
        if #[cfg(target_family = "wasm")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            if console_log::init_with_level(log::Level::Info).is_err() {
                web_sys::console::warn_1(&"Logger already initialized".into());
            }
        } else {
            let mut log_builder = env_logger::Builder::new();
            if log_builder
                .target(env_logger::Target::Stdout)
                .parse_env("RUST_LOG")
                .try_init()
                .is_err()
            {
                eprintln!("Logger already initialized");
            }
        }
    }
    log::info!("Logger initialized");
}

/// Runs the showcase in a native window until it is closed.
#[cfg(not(target_family = "wasm"))]
pub fn run() {
    init_logger();

    let simulation_config =
        SimulationConfig::load_or_default(application_state::SIMULATION_CONFIG_PATH);

    let event_loop = match EventLoop::<GraphicsEvent>::with_user_event().build() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            return;
        }
    };

    let mut state = ApplicationState::new(event_loop.create_proxy(), simulation_config);

    if let Err(err) = event_loop.run_app(&mut state) {
        log::error!("Event loop terminated with an error: {err}");
    }
}

/// Starts the showcase on the `wgpu-canvas` element of the page.
#[cfg(target_family = "wasm")]
#[wasm_bindgen]
pub fn run_web() {
    use winit::platform::web::EventLoopExtWebSys;

    init_logger();

    let event_loop = match EventLoop::<GraphicsEvent>::with_user_event().build() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            return;
        }
    };

    let state = ApplicationState::new(event_loop.create_proxy(), SimulationConfig::default());

    event_loop.spawn_app(state);
}

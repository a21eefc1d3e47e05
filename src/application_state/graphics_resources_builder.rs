//! # Graphics Resources Builder
//!
//! Creates the window and the GPU context the renderer draws with.
//!
//! The main components are:
//! - `Graphics`: The window, surface, device and queue
//! - `GraphicsBuilder`: Runs the asynchronous setup and posts the result back
//!   to the event loop
//! - `MaybeGraphics`: Where the setup currently is
//!
//! On native targets the setup blocks on `pollster`; on the web it is spawned
//! on the browser's executor. Either way the result arrives as a user event
//! carrying `Result<Graphics, GraphicsError>`.

use std::future::Future;
use std::sync::Arc;

use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::error::GraphicsError;

#[cfg(target_family = "wasm")]
use crate::CANVAS_ID;

/// Title shown before the first phase notification
pub const WINDOW_TITLE: &str = "Voxel Showcase";

/// User event delivering the outcome of the graphics setup
pub type GraphicsEvent = Result<Graphics, GraphicsError>;

/// The window and the GPU resources bound to it.
pub struct Graphics {
    /// The window being drawn into
    pub window: Arc<Window>,
    /// The surface of `window`
    pub surface: Surface<'static>,
    /// Surface settings; configured on the surface once `is_surface_configured`
    pub surface_config: SurfaceConfiguration,
    /// The GPU device
    pub device: Device,
    /// The GPU command queue
    pub queue: Queue,
    /// Whether the surface was configured with a non-zero size
    pub is_surface_configured: bool,
}

impl Graphics {
    /// Configures the surface for a new size. Zero sizes are ignored.
    pub fn configure(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.is_surface_configured = true;
    }
}

/// Asynchronously creates the window and GPU context.
///
/// The window and surface are created synchronously because they need the
/// active event loop; adapter and device requests happen in the returned
/// future.
fn create_graphics(
    event_loop: &ActiveEventLoop,
) -> Result<impl Future<Output = GraphicsEvent> + 'static, GraphicsError> {
    #[allow(unused_mut)]
    let mut window_attrs = Window::default_attributes().with_title(WINDOW_TITLE);

    #[cfg(target_family = "wasm")]
    {
        use web_sys::wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(CANVAS_ID))
            .ok_or_else(|| GraphicsError::Platform(format!("canvas `{CANVAS_ID}` not found")))?;
        window_attrs = window_attrs.with_canvas(Some(canvas.unchecked_into()));
    }

    let window = Arc::new(event_loop.create_window(window_attrs)?);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        #[cfg(not(target_family = "wasm"))]
        backends: wgpu::Backends::PRIMARY,
        #[cfg(target_family = "wasm")]
        backends: wgpu::Backends::GL | wgpu::Backends::BROWSER_WEBGPU,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone())?;

    Ok(async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using graphics adapter {:?}", adapter.get_info().name);

        let required_limits = if cfg!(target_family = "wasm") {
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
        } else {
            wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits,
                label: Some("Voxel Showcase Device"),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Colors are authored as display values, so write them unconverted
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| !format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GraphicsError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(GraphicsError::UnsupportedSurface)?;

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        #[allow(unused_mut)]
        let mut graphics = Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
            is_surface_configured: false,
        };

        // The web canvas reports its real size with the first resize event
        #[cfg(not(target_family = "wasm"))]
        graphics.configure(size.width, size.height);

        Ok(graphics)
    })
}

/// Helper struct for managing the asynchronous initialization of graphics
/// resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<GraphicsEvent>>,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// Waiting for the event loop to resume
    Builder(GraphicsBuilder),

    /// Resources are ready but the engine is not built yet
    Graphics(Graphics),

    /// Resources have been moved into the engine
    Moved,
}

impl GraphicsBuilder {
    /// Creates a builder that posts its result through `event_loop_proxy`.
    pub fn new(event_loop_proxy: EventLoopProxy<GraphicsEvent>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Starts the graphics setup once; later calls do nothing.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return;
        };

        let gfx_fut = match create_graphics(event_loop) {
            Ok(gfx_fut) => gfx_fut,
            Err(err) => {
                send(&event_loop_proxy, Err(err));
                return;
            }
        };

        #[cfg(target_family = "wasm")]
        wasm_bindgen_futures::spawn_local(async move {
            send(&event_loop_proxy, gfx_fut.await);
        });

        #[cfg(not(target_family = "wasm"))]
        send(&event_loop_proxy, pollster::block_on(gfx_fut));
    }
}

fn send(event_loop_proxy: &EventLoopProxy<GraphicsEvent>, event: GraphicsEvent) {
    if event_loop_proxy.send_event(event).is_err() {
        log::error!("Event loop closed before graphics were ready");
    }
}

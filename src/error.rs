//! Error types shared across the crate.

use thiserror::Error;

/// Failure to obtain simulation settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file {path}")]
    Read {
        /// Path that was attempted
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while bringing up the window and GPU.
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// The window could not be created
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The window could not be turned into a render surface
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// No adapter can present to the surface
    #[error("no compatible graphics adapter found: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused the device request
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// The adapter reports no usable surface format
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    /// A platform-specific setup step failed
    #[error("{0}")]
    Platform(String),
}

/// Failure while drawing a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The next surface texture could not be acquired
    #[error("failed to acquire surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// A named buffer was used before it was created
    #[error("buffer `{0}` was not allocated")]
    MissingBuffer(&'static str),

    /// A write would run past the end of a buffer
    #[error("write of {len} bytes at offset {offset} overflows buffer `{buffer}` of {size} bytes")]
    OutOfBounds {
        /// Name of the buffer
        buffer: &'static str,
        /// Byte offset of the write
        offset: u64,
        /// Length of the write in bytes
        len: u64,
        /// Allocated size of the buffer
        size: u64,
    },
}

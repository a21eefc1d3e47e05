//! # Voxel Showcase Entry Point
//!
//! Native entry point; calls into the library's `run()`.
//!
//! For web applications, see the `run_web()` function in the library.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    #[cfg(not(target_family = "wasm"))]
    voxel_showcase::run();
}

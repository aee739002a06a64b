//! obj-viewer - a minimal real-time OBJ model viewer
//!
//! Loads ASCII OBJ meshes into flattened interleaved vertex buffers and
//! renders them with a fly-through camera and a camera-mounted spotlight.
//!
//! # Features
//! - Pure, GPU-free OBJ parsing (`resources::parse` / `resources::parse_str`)
//! - Single interleaved vertex buffer per mesh, drawn non-indexed
//! - Backend trait seam over wgpu, mockable for headless tests
//! - Flat Phong-style materials with optional diffuse textures and CPU mips
//! - Free-fly camera and a toggleable flashlight spotlight

pub mod backend;
pub mod engine;
pub mod resources;
pub mod scene;
pub mod window;

pub use engine::{Viewer, ViewerError};
pub use window::Window;

// Re-export wgpu backend for direct access
pub use backend::wgpu_backend::WgpuBackend;

/// Configuration for initializing the viewer
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Enable vsync
    pub vsync: bool,
    /// Vertical field of view in degrees
    pub fov_y_deg: f32,
    /// Near clip plane
    pub z_near: f32,
    /// Far clip plane
    pub z_far: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "OBJ Viewer".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            fov_y_deg: 45.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

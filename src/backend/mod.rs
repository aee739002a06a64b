//! Backend abstraction layer
//!
//! Provides the common trait and types the wgpu backend implements.

pub mod traits;
pub mod types;
pub mod wgpu_backend;

pub use traits::*;
pub use types::*;

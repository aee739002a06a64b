//! Resource management
//!
//! Handles loading and management of meshes, textures, and materials.

mod material;
mod mesh;
mod obj;
mod texture;

pub use material::*;
pub use mesh::*;
pub use obj::*;
pub use texture::*;

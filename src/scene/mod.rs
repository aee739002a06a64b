//! Scene management

mod camera;
mod camera_controller;
mod light;
mod transform;

pub use camera::*;
pub use camera_controller::*;
pub use light::*;
pub use transform::*;

use glam::Vec3;

/// A mesh placed in the world with a material
#[derive(Debug, Clone)]
pub struct PlacedModel {
    pub mesh_id: usize,
    pub material_id: usize,
    pub transform: Transform,
}

impl PlacedModel {
    pub fn new(mesh_id: usize, material_id: usize) -> Self {
        Self {
            mesh_id,
            material_id,
            transform: Transform::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }
}

/// The scene containing all renderable content
pub struct Scene {
    pub camera: Camera,
    pub spotlight: SpotLight,
    pub models: Vec<PlacedModel>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            camera: Camera::default(),
            spotlight: SpotLight::default(),
            models: Vec::new(),
        }
    }

    /// Add a model to the scene, returning its index
    pub fn add_model(&mut self, model: PlacedModel) -> usize {
        let id = self.models.len();
        self.models.push(model);
        id
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

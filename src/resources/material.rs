//! Surface material definitions
//!
//! Materials are flat Blinn-Phong style: an ambient tint, a diffuse color
//! (optionally replaced by a texture), a scalar specular intensity and a
//! shininess exponent.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Material properties for the forward shader
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: f32,
    pub shininess: f32,

    /// Diffuse texture ID (None means untextured flat color)
    pub diffuse_texture: Option<usize>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            ambient: Vec3::new(0.29, 0.30, 0.10),
            diffuse: Vec3::ONE,
            specular: 0.51,
            shininess: 32.0,
            diffuse_texture: None,
        }
    }
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ambient(mut self, ambient: Vec3) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_diffuse(mut self, diffuse: Vec3) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_specular(mut self, specular: f32) -> Self {
        self.specular = specular;
        self
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn with_diffuse_texture(mut self, texture: usize) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    /// Create a uniform data struct for GPU
    pub fn uniform_data(&self) -> MaterialUniformData {
        MaterialUniformData {
            ambient: self.ambient.extend(self.specular),
            diffuse: self.diffuse.extend(self.shininess),
        }
    }

    // Preset materials

    pub fn textured(name: &str, texture: usize) -> Self {
        Self::new(name).with_diffuse_texture(texture)
    }

    pub fn matte(color: Vec3) -> Self {
        Self::new("matte")
            .with_diffuse(color)
            .with_specular(0.05)
            .with_shininess(8.0)
    }

    pub fn shiny(color: Vec3) -> Self {
        Self::new("shiny")
            .with_diffuse(color)
            .with_specular(0.9)
            .with_shininess(128.0)
    }
}

/// Material uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniformData {
    pub ambient: Vec4, // xyz=ambient, w=specular intensity
    pub diffuse: Vec4, // xyz=diffuse, w=shininess
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_data_packs_scalars_into_w_lanes() {
        let material = Material::new("test")
            .with_ambient(Vec3::new(0.1, 0.2, 0.3))
            .with_diffuse(Vec3::new(0.4, 0.5, 0.6))
            .with_specular(0.7)
            .with_shininess(64.0);
        let data = material.uniform_data();
        assert_eq!(data.ambient, Vec4::new(0.1, 0.2, 0.3, 0.7));
        assert_eq!(data.diffuse, Vec4::new(0.4, 0.5, 0.6, 64.0));
    }

    #[test]
    fn uniform_data_is_two_vec4s() {
        assert_eq!(std::mem::size_of::<MaterialUniformData>(), 32);
    }

    #[test]
    fn default_material_is_untextured() {
        let material = Material::default();
        assert!(material.diffuse_texture.is_none());
        assert_eq!(material.shininess, 32.0);
    }
}

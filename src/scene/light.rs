//! Light types for the scene

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use super::Camera;

/// Spot light with smooth cone falloff and distance attenuation
#[derive(Debug, Clone)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Inner cone half-angle in radians (full intensity inside)
    pub inner_angle: f32,
    /// Outer cone half-angle in radians (zero intensity outside)
    pub outer_angle: f32,
    /// Distance attenuation terms (constant, linear, quadratic)
    pub attenuation: Vec3,
    /// Whether the light contributes at all
    pub on: bool,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            inner_angle: 15.0_f32.to_radians(),
            outer_angle: 20.0_f32.to_radians(),
            attenuation: Vec3::new(1.0, 0.07, 0.017),
            on: true,
        }
    }
}

impl SpotLight {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction: direction.normalize(),
            ..Default::default()
        }
    }

    pub fn toggle(&mut self) {
        self.on = !self.on;
    }

    /// Attach the light to the camera, headlamp style.
    pub fn follow_camera(&mut self, camera: &Camera) {
        self.position = camera.position;
        self.direction = camera.forward();
    }

    /// Convert to GPU data format.
    ///
    /// Cone angles are uploaded as cosines so the shader compares them
    /// directly against `dot(light_dir, fragment_dir)`.
    pub fn uniform_data(&self) -> SpotLightUniformData {
        SpotLightUniformData {
            position: self.position.extend(if self.on { 1.0 } else { 0.0 }),
            direction: self.direction.extend(0.0),
            ambient: self.ambient.extend(0.0),
            diffuse: self.diffuse.extend(0.0),
            specular: self.specular.extend(0.0),
            cutoffs: Vec4::new(self.inner_angle.cos(), self.outer_angle.cos(), 0.0, 0.0),
            attenuation: self.attenuation.extend(0.0),
        }
    }
}

/// Spot light uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpotLightUniformData {
    /// xyz = position, w = 1.0 when on
    pub position: Vec4,
    /// xyz = direction, w unused
    pub direction: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    /// x = cos(inner), y = cos(outer), zw unused
    pub cutoffs: Vec4,
    /// x = constant, y = linear, z = quadratic, w unused
    pub attenuation: Vec4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoffs_are_cosines_of_the_cone_angles() {
        let light = SpotLight::default();
        let data = light.uniform_data();
        assert!((data.cutoffs.x - 15.0_f32.to_radians().cos()).abs() < 1e-6);
        assert!((data.cutoffs.y - 20.0_f32.to_radians().cos()).abs() < 1e-6);
        // Inner cone is tighter, so its cosine is larger
        assert!(data.cutoffs.x > data.cutoffs.y);
    }

    #[test]
    fn off_light_uploads_zero_flag() {
        let mut light = SpotLight::default();
        light.toggle();
        assert!(!light.on);
        assert_eq!(light.uniform_data().position.w, 0.0);
        light.toggle();
        assert_eq!(light.uniform_data().position.w, 1.0);
    }

    #[test]
    fn follow_camera_tracks_position_and_forward() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, 0.0));
        let mut light = SpotLight::default();
        light.follow_camera(&camera);
        assert_eq!(light.position, camera.position);
        assert!((light.direction - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn attenuation_terms_land_in_xyz() {
        let data = SpotLight::default().uniform_data();
        assert_eq!(data.attenuation.x, 1.0);
        assert_eq!(data.attenuation.y, 0.07);
        assert_eq!(data.attenuation.z, 0.017);
    }
}

//! Camera controller system
//!
//! Free-fly control: WASD on the view plane, Z/X for vertical movement,
//! mouse look while grabbed, scroll to adjust speed, shift to sprint.

use glam::{Vec2, Vec3};

use super::Camera;

/// Input state for camera controllers
#[derive(Debug, Clone, Default)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,

    /// Sprint modifier (shift)
    pub sprint: bool,

    /// Mouse delta since last frame (in pixels)
    pub mouse_delta: Vec2,

    /// Mouse scroll delta (positive = scroll up)
    pub scroll_delta: f32,

    /// Whether mouse look is active (cursor grabbed)
    pub mouse_look_active: bool,
}

impl CameraInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame deltas (call after update)
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }
}

/// Abstract camera controller trait
pub trait CameraController {
    /// Update the camera based on input and delta time
    fn update(&mut self, camera: &mut Camera, input: &CameraInput, dt: f32);

    /// Reset the controller to default state
    fn reset(&mut self);
}

/// Free-fly camera controller (FPS-style)
pub struct FreeFlyController {
    /// Current yaw angle (horizontal rotation) in radians
    pub yaw: f32,
    /// Current pitch angle (vertical rotation) in radians
    pub pitch: f32,
    /// Base movement speed in units per second
    pub move_speed: f32,
    /// Minimum movement speed
    pub min_speed: f32,
    /// Maximum movement speed
    pub max_speed: f32,
    /// Mouse sensitivity in degrees per pixel
    pub mouse_sensitivity: f32,
    /// Speed multiplier when sprinting
    pub sprint_multiplier: f32,
    /// Speed change per scroll unit
    pub scroll_speed_factor: f32,
}

impl Default for FreeFlyController {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 5.0,
            min_speed: 0.5,
            max_speed: 50.0,
            mouse_sensitivity: 0.1,
            sprint_multiplier: 2.0,
            scroll_speed_factor: 1.2,
        }
    }
}

impl FreeFlyController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize yaw/pitch from camera's current orientation
    pub fn sync_with_camera(&mut self, camera: &Camera) {
        let forward = (camera.target - camera.position).normalize();
        self.yaw = forward.z.atan2(forward.x);
        self.pitch = (-forward.y).asin();
    }

    /// Get the forward direction based on yaw/pitch
    fn forward_direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            -self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Get the right direction (perpendicular to forward, on XZ plane)
    fn right_direction(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, self.yaw.cos()).normalize()
    }
}

impl CameraController for FreeFlyController {
    fn update(&mut self, camera: &mut Camera, input: &CameraInput, dt: f32) {
        // Scroll wheel adjusts speed
        if input.scroll_delta != 0.0 {
            if input.scroll_delta > 0.0 {
                self.move_speed *= self.scroll_speed_factor;
            } else {
                self.move_speed /= self.scroll_speed_factor;
            }
            self.move_speed = self.move_speed.clamp(self.min_speed, self.max_speed);
        }

        // Mouse look
        if input.mouse_look_active && input.mouse_delta != Vec2::ZERO {
            let sensitivity = self.mouse_sensitivity.to_radians();
            self.yaw += input.mouse_delta.x * sensitivity;
            self.pitch += input.mouse_delta.y * sensitivity;

            // Clamp pitch to avoid gimbal lock
            let max_pitch = std::f32::consts::FRAC_PI_2 - 0.01;
            self.pitch = self.pitch.clamp(-max_pitch, max_pitch);

            self.yaw %= 2.0 * std::f32::consts::PI;
        }

        let forward = self.forward_direction();
        let right = self.right_direction();
        let up = Vec3::Y;

        let mut velocity = Vec3::ZERO;

        if input.forward {
            velocity += forward;
        }
        if input.backward {
            velocity -= forward;
        }
        if input.right {
            velocity += right;
        }
        if input.left {
            velocity -= right;
        }
        if input.up {
            velocity += up;
        }
        if input.down {
            velocity -= up;
        }

        // Normalize if moving diagonally
        if velocity.length_squared() > 0.0 {
            velocity = velocity.normalize();
        }

        let speed = if input.sprint {
            self.move_speed * self.sprint_multiplier
        } else {
            self.move_speed
        };

        camera.position += velocity * speed * dt;
        camera.target = camera.position + forward;
    }

    fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.move_speed = 5.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at_origin() -> Camera {
        Camera::new(Vec3::ZERO, Vec3::X)
    }

    #[test]
    fn forward_key_moves_along_view_direction() {
        let mut camera = camera_at_origin();
        let mut controller = FreeFlyController::new();
        let input = CameraInput {
            forward: true,
            ..Default::default()
        };

        controller.update(&mut camera, &input, 1.0);
        // Yaw 0, pitch 0 looks down +X at default speed 5
        assert!((camera.position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn sprint_doubles_displacement() {
        let mut walk = camera_at_origin();
        let mut run = camera_at_origin();
        let mut controller = FreeFlyController::new();

        let mut input = CameraInput {
            forward: true,
            ..Default::default()
        };
        controller.update(&mut walk, &input, 1.0);

        input.sprint = true;
        let mut controller = FreeFlyController::new();
        controller.update(&mut run, &input, 1.0);

        assert!((run.position.length() - 2.0 * walk.position.length()).abs() < 1e-4);
    }

    #[test]
    fn pitch_is_clamped_short_of_vertical() {
        let mut camera = camera_at_origin();
        let mut controller = FreeFlyController::new();
        let input = CameraInput {
            mouse_look_active: true,
            mouse_delta: Vec2::new(0.0, 1e6),
            ..Default::default()
        };

        controller.update(&mut camera, &input, 0.016);
        assert!(controller.pitch < std::f32::consts::FRAC_PI_2);
        assert!(camera.forward().is_finite());
    }

    #[test]
    fn yaw_wraps_instead_of_accumulating() {
        let mut camera = camera_at_origin();
        let mut controller = FreeFlyController::new();
        let input = CameraInput {
            mouse_look_active: true,
            mouse_delta: Vec2::new(1e6, 0.0),
            ..Default::default()
        };

        controller.update(&mut camera, &input, 0.016);
        assert!(controller.yaw.abs() < 2.0 * std::f32::consts::PI);
    }

    #[test]
    fn mouse_delta_is_ignored_when_look_inactive() {
        let mut camera = camera_at_origin();
        let mut controller = FreeFlyController::new();
        let input = CameraInput {
            mouse_delta: Vec2::new(500.0, 500.0),
            ..Default::default()
        };

        controller.update(&mut camera, &input, 0.016);
        assert_eq!(controller.yaw, 0.0);
        assert_eq!(controller.pitch, 0.0);
    }

    #[test]
    fn diagonal_movement_is_not_faster() {
        let mut camera = camera_at_origin();
        let mut controller = FreeFlyController::new();
        let input = CameraInput {
            forward: true,
            right: true,
            ..Default::default()
        };

        controller.update(&mut camera, &input, 1.0);
        assert!((camera.position.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn reset_deltas_clears_per_frame_state() {
        let mut input = CameraInput {
            mouse_delta: Vec2::new(3.0, 4.0),
            scroll_delta: 1.0,
            forward: true,
            ..Default::default()
        };
        input.reset_deltas();
        assert_eq!(input.mouse_delta, Vec2::ZERO);
        assert_eq!(input.scroll_delta, 0.0);
        // Held keys are not deltas
        assert!(input.forward);
    }

    #[test]
    fn scroll_up_raises_speed_within_bounds() {
        let mut camera = camera_at_origin();
        let mut controller = FreeFlyController::new();
        let input = CameraInput {
            scroll_delta: 1.0,
            ..Default::default()
        };

        let before = controller.move_speed;
        controller.update(&mut camera, &input, 0.016);
        assert!(controller.move_speed > before);
        assert!(controller.move_speed <= controller.max_speed);
    }
}

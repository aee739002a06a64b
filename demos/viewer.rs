//! Interactive OBJ model viewer
//!
//! Run with:
//!   cargo run --example viewer -- path/to/model.obj [more.obj ...]
//!
//! Controls:
//!   WASD        - Move camera
//!   Z/X or Q/E  - Move down/up
//!   Shift       - Sprint (2x speed)
//!   Right Mouse - Look around (cursor grabbed while held)
//!   Scroll      - Adjust movement speed
//!   F           - Toggle flashlight
//!   Escape      - Exit

use glam::Vec3;
use obj_viewer::{
    resources::{parse, Material, Mesh, TextureData},
    scene::{CameraController, CameraInput, FreeFlyController, PlacedModel},
    Viewer, ViewerConfig, Window,
};
use std::path::Path;
use std::time::Instant;
use winit::{
    event::{DeviceEvent, ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
};

/// Fixed world slots the loaded models are placed into, in order
const MODEL_SLOTS: [(Vec3, f32); 6] = [
    (Vec3::new(0.0, 0.0, 0.0), 1.0),
    (Vec3::new(-4.0, 0.0, -2.0), 1.0),
    (Vec3::new(4.0, 0.0, -2.0), 1.0),
    (Vec3::new(-3.0, 0.0, 3.0), 0.5),
    (Vec3::new(3.0, 0.0, 3.0), 0.5),
    (Vec3::new(0.0, 0.0, -5.0), 2.0),
];

/// Application state for input handling and frame pacing
struct AppState {
    camera_input: CameraInput,
    free_fly: FreeFlyController,
    last_frame: Instant,
    cursor_grabbed: bool,
    fps_time: f32,
    fps_frames: u32,
}

impl AppState {
    fn new() -> Self {
        Self {
            camera_input: CameraInput::new(),
            free_fly: FreeFlyController::new(),
            last_frame: Instant::now(),
            cursor_grabbed: false,
            fps_time: 0.0,
            fps_frames: 0,
        }
    }

    /// Accumulate a frame; returns the average FPS once per second
    fn tick_fps(&mut self, dt: f32) -> Option<f32> {
        self.fps_time += dt;
        self.fps_frames += 1;
        if self.fps_time >= 1.0 {
            let fps = self.fps_frames as f32 / self.fps_time;
            self.fps_time = 0.0;
            self.fps_frames = 0;
            Some(fps)
        } else {
            None
        }
    }
}

fn main() {
    env_logger::init();

    let model_paths: Vec<String> = std::env::args().skip(1).collect();

    println!("OBJ Viewer");
    println!();
    println!("Controls:");
    println!("  WASD        - Move camera");
    println!("  Z/X or Q/E  - Move down/up");
    println!("  Shift       - Sprint (2x speed)");
    println!("  Right Mouse - Look around");
    println!("  Scroll      - Adjust speed");
    println!("  F           - Toggle flashlight");
    println!("  Escape      - Exit");
    println!();

    let config = ViewerConfig::default();

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut window = Window::new(&event_loop, &config.title, config.width, config.height);

    let mut viewer = match Viewer::new(window.window_arc(), &config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to create viewer: {e}");
            return;
        }
    };

    setup_scene(&mut viewer, &model_paths);

    let mut state = AppState::new();
    state.free_fly.sync_with_camera(&viewer.scene().camera);

    let title = config.title.clone();
    event_loop
        .run(move |event, elwt: &EventLoopWindowTarget<()>| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => {
                    window.handle_event(&event);
                    handle_window_event(&event, &mut state, &mut viewer, &window, elwt);
                }
                Event::DeviceEvent { event, .. } => {
                    handle_device_event(&event, &mut state);
                }
                Event::AboutToWait => {
                    let now = Instant::now();
                    let dt = (now - state.last_frame).as_secs_f32();
                    state.last_frame = now;

                    if let Some(fps) = state.tick_fps(dt) {
                        window.set_title(&format!("{title} - {fps:.0} FPS"));
                    }

                    let scene = viewer.scene_mut();
                    state
                        .free_fly
                        .update(&mut scene.camera, &state.camera_input, dt);
                    let camera = scene.camera.clone();
                    scene.spotlight.follow_camera(&camera);
                    state.camera_input.reset_deltas();

                    window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop failed");
}

fn handle_window_event(
    event: &WindowEvent,
    state: &mut AppState,
    viewer: &mut Viewer,
    window: &Window,
    elwt: &EventLoopWindowTarget<()>,
) {
    match event {
        WindowEvent::CloseRequested => {
            viewer.shutdown();
            elwt.exit();
        }
        WindowEvent::Resized(size) => {
            viewer.resize(size.width, size.height);
        }
        WindowEvent::RedrawRequested => {
            if let Err(e) = viewer.render() {
                log::error!("Render error: {e}");
            }
        }
        WindowEvent::KeyboardInput { event, .. } => {
            let pressed = event.state == ElementState::Pressed;

            if let PhysicalKey::Code(key) = event.physical_key {
                match key {
                    KeyCode::Escape => {
                        viewer.shutdown();
                        elwt.exit();
                    }
                    KeyCode::KeyF if pressed && !event.repeat => {
                        let spotlight = &mut viewer.scene_mut().spotlight;
                        spotlight.toggle();
                        log::info!(
                            "Flashlight {}",
                            if spotlight.on { "on" } else { "off" }
                        );
                    }
                    KeyCode::KeyW => state.camera_input.forward = pressed,
                    KeyCode::KeyS => state.camera_input.backward = pressed,
                    KeyCode::KeyA => state.camera_input.left = pressed,
                    KeyCode::KeyD => state.camera_input.right = pressed,
                    KeyCode::KeyZ | KeyCode::KeyQ => state.camera_input.down = pressed,
                    KeyCode::KeyX | KeyCode::KeyE => state.camera_input.up = pressed,
                    KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                        state.camera_input.sprint = pressed
                    }
                    _ => {}
                }
            }
        }
        WindowEvent::MouseInput {
            state: btn_state,
            button,
            ..
        } => {
            if *button == MouseButton::Right {
                let pressed = *btn_state == ElementState::Pressed;
                state.camera_input.mouse_look_active = pressed;

                if pressed != state.cursor_grabbed {
                    window.grab_cursor(pressed);
                    state.cursor_grabbed = pressed;
                }
            }
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let scroll = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
            };
            state.camera_input.scroll_delta += scroll;
        }
        WindowEvent::Focused(false) => {
            // Release all keys when window loses focus
            state.camera_input = CameraInput::new();
            if state.cursor_grabbed {
                window.grab_cursor(false);
                state.cursor_grabbed = false;
            }
        }
        _ => {}
    }
}

fn handle_device_event(event: &DeviceEvent, state: &mut AppState) {
    if let DeviceEvent::MouseMotion { delta } = event {
        if state.camera_input.mouse_look_active {
            state.camera_input.mouse_delta.x += delta.0 as f32;
            state.camera_input.mouse_delta.y += delta.1 as f32;
        }
    }
}

fn setup_scene(viewer: &mut Viewer, model_paths: &[String]) {
    // Checkerboard floor
    let floor_tex = viewer.add_texture(
        TextureData::checkerboard(256, [200, 200, 200, 255], [60, 60, 60, 255]),
        true,
    );
    let floor_mat = viewer.add_material(
        Material::textured("floor", floor_tex)
            .with_specular(0.1)
            .with_shininess(8.0),
    );
    let floor_mesh = viewer.add_mesh(Mesh::plane(30.0, 12.0));
    let floor = PlacedModel::new(floor_mesh, floor_mat);
    viewer.scene_mut().add_model(floor);

    let model_mat = viewer.add_material(Material::default());

    // Load failures are logged and the model skipped, never fatal
    let mut placed = 0;
    for path in model_paths {
        match parse(path) {
            Ok(vertices) => {
                let name = Path::new(path)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("model");
                let mesh_id = viewer.add_mesh(Mesh::new(name, vertices));

                let (position, scale) = MODEL_SLOTS[placed % MODEL_SLOTS.len()];
                viewer.scene_mut().add_model(
                    PlacedModel::new(mesh_id, model_mat)
                        .with_position(position)
                        .with_scale(Vec3::splat(scale)),
                );
                placed += 1;
            }
            Err(e) => log::error!("Skipping '{path}': {e}"),
        }
    }

    if placed == 0 {
        log::info!("No models loaded; pass .obj paths on the command line");
    }

    let camera = &mut viewer.scene_mut().camera;
    camera.position = Vec3::new(0.0, 2.0, 6.0);
    camera.target = Vec3::new(0.0, 1.0, 0.0);
}

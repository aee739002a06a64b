//! Main viewer orchestrator
//!
//! Owns the backend, the CPU-side resources (meshes, materials, textures) and
//! the scene, and turns them into GPU state lazily on the first frame. All
//! uniform blocks flow through the bind group layout fixed by the embedded
//! shader: group 0 camera, group 1 object, group 2 material + texture +
//! sampler + spotlight.

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::backend::wgpu_backend::WgpuBackend;
use crate::resources::{GpuMesh, GpuTexture, Material, Mesh, MeshError, TextureData};
use crate::scene::{Scene, SpotLightUniformData};
use crate::ViewerConfig;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use winit::window::Window as WinitWindow;

/// Viewer error type
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// GPU resources built once from the CPU-side scene
struct RenderState {
    pipeline: RenderPipelineHandle,

    camera_buffer: BufferHandle,
    camera_bind_group: BindGroupHandle,

    light_buffer: BufferHandle,

    // Per-material bind groups share the sampler and the light buffer
    material_bind_groups: HashMap<usize, BindGroupHandle>,
    material_buffers: Vec<BufferHandle>,

    // Per-model transform resources, parallel to scene.models
    object_bind_groups: Vec<BindGroupHandle>,
    object_buffers: Vec<BufferHandle>,

    gpu_meshes: HashMap<usize, GpuMesh>,
    gpu_textures: HashMap<usize, GpuTexture>,
    fallback_texture: GpuTexture,

    depth_texture: TextureHandle,
    depth_view: TextureViewHandle,
}

const SPOTLIGHT_SHADER: &str = r#"
struct CameraUniform {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
}

// ambient.w = specular intensity, diffuse.w = shininess
struct MaterialUniform {
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
}

// position.w = on flag, cutoffs = (cos inner, cos outer, -, -),
// attenuation = (constant, linear, quadratic, -)
struct SpotLightUniform {
    position: vec4<f32>,
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    cutoffs: vec4<f32>,
    attenuation: vec4<f32>,
}

@group(0) @binding(0) var<uniform> camera: CameraUniform;
@group(1) @binding(0) var<uniform> object: ObjectUniform;
@group(2) @binding(0) var<uniform> material: MaterialUniform;
@group(2) @binding(1) var diffuse_texture: texture_2d<f32>;
@group(2) @binding(2) var diffuse_sampler: sampler;
@group(2) @binding(3) var<uniform> light: SpotLightUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;

    let world_pos = object.model * vec4<f32>(in.position, 1.0);
    out.world_position = world_pos.xyz;
    out.clip_position = camera.view_proj * world_pos;
    out.world_normal = normalize((object.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz);
    out.uv = in.uv;

    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(diffuse_texture, diffuse_sampler, in.uv).rgb * material.diffuse.rgb;

    let normal = normalize(in.world_normal);
    let to_light = light.position.xyz - in.world_position;
    let distance = length(to_light);
    let light_dir = to_light / max(distance, 1e-5);

    let ambient = light.ambient.rgb * material.ambient.rgb * base;

    let ndotl = max(dot(normal, light_dir), 0.0);
    let diffuse = light.diffuse.rgb * ndotl * base;

    let view_dir = normalize(camera.position.xyz - in.world_position);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), material.diffuse.w);
    let specular = light.specular.rgb * spec * material.ambient.w;

    // Soft cone edge between the inner and outer cutoff cosines
    let theta = dot(light_dir, normalize(-light.direction.xyz));
    let cone = clamp(
        (theta - light.cutoffs.y) / max(light.cutoffs.x - light.cutoffs.y, 1e-5),
        0.0,
        1.0,
    );

    let attenuation = 1.0 / (light.attenuation.x
        + light.attenuation.y * distance
        + light.attenuation.z * distance * distance);

    let lit = light.position.w;
    let color = ambient + (diffuse + specular) * cone * attenuation * lit;

    return vec4<f32>(color, 1.0);
}
"#;

/// The interactive model viewer
pub struct Viewer {
    backend: WgpuBackend,
    scene: Scene,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    textures: Vec<(TextureData, bool)>,
    width: u32,
    height: u32,
    render_state: Option<RenderState>,
}

impl Viewer {
    pub fn new(window: Arc<WinitWindow>, config: &ViewerConfig) -> Result<Self, ViewerError> {
        let backend = WgpuBackend::new(Arc::clone(&window), config.vsync)?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let mut scene = Scene::new();
        scene.camera.fov_y = config.fov_y_deg.to_radians();
        scene.camera.near = config.z_near;
        scene.camera.far = config.z_far;
        scene.camera.set_aspect(width as f32, height as f32);

        Ok(Self {
            backend,
            scene,
            meshes: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            width,
            height,
            render_state: None,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Add a mesh and return its ID
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        let id = self.meshes.len();
        self.meshes.push(mesh);
        id
    }

    /// Add a material and return its ID
    pub fn add_material(&mut self, material: Material) -> usize {
        let id = self.materials.len();
        self.materials.push(material);
        id
    }

    /// Add a texture and return its ID
    pub fn add_texture(&mut self, data: TextureData, generate_mipmaps: bool) -> usize {
        let id = self.textures.len();
        self.textures.push((data, generate_mipmaps));
        id
    }

    /// Handle window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.backend.resize(width, height);

        // The surface may clamp to device limits
        let (actual_width, actual_height) = self.backend.surface_size();
        if actual_width == self.width && actual_height == self.height {
            return;
        }

        self.width = actual_width;
        self.height = actual_height;
        self.scene
            .camera
            .set_aspect(actual_width as f32, actual_height as f32);

        if self.render_state.is_some() {
            if let Err(e) = self.recreate_depth_buffer() {
                log::error!("Failed to recreate depth buffer: {e}");
            }
        }
    }

    fn recreate_depth_buffer(&mut self) -> Result<(), ViewerError> {
        let Some(state) = self.render_state.as_mut() else {
            return Ok(());
        };

        self.backend.destroy_texture(state.depth_texture);

        let depth_texture = self.backend.create_texture(&TextureDescriptor {
            label: Some("Depth Buffer".into()),
            width: self.width,
            height: self.height,
            mip_levels: 1,
            format: TextureFormat::Depth32Float,
            usage: TextureUsage::RENDER_ATTACHMENT,
        })?;
        let depth_view = self.backend.create_texture_view(depth_texture)?;

        state.depth_texture = depth_texture;
        state.depth_view = depth_view;
        Ok(())
    }

    fn initialize_render_state(&mut self) -> Result<(), ViewerError> {
        let backend = &mut self.backend;

        let camera_layout = backend.create_bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStageFlags::VERTEX_FRAGMENT,
            ty: BindingType::UniformBuffer,
        }])?;

        let object_layout = backend.create_bind_group_layout(&[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStageFlags::VERTEX,
            ty: BindingType::UniformBuffer,
        }])?;

        let material_layout = backend.create_bind_group_layout(&[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::UniformBuffer,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                },
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::Sampler { comparison: false },
            },
            BindGroupLayoutEntry {
                binding: 3,
                visibility: ShaderStageFlags::FRAGMENT,
                ty: BindingType::UniformBuffer,
            },
        ])?;

        let camera_buffer = backend.create_buffer(&BufferDescriptor {
            label: Some("Camera Buffer".into()),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
            mapped_at_creation: false,
        })?;

        let camera_bind_group = backend.create_bind_group(
            camera_layout,
            &[(
                0,
                BindGroupEntry::Buffer {
                    buffer: camera_buffer,
                    offset: 0,
                    size: None,
                },
            )],
        )?;

        let light_buffer = backend.create_buffer(&BufferDescriptor {
            label: Some("Spotlight Buffer".into()),
            size: std::mem::size_of::<SpotLightUniformData>() as u64,
            usage: BufferUsage::UNIFORM | BufferUsage::COPY_DST,
            mapped_at_creation: false,
        })?;

        let sampler = backend.create_sampler(&SamplerDescriptor {
            label: Some("Diffuse Sampler".into()),
            ..Default::default()
        })?;

        let depth_texture = backend.create_texture(&TextureDescriptor {
            label: Some("Depth Buffer".into()),
            width: self.width,
            height: self.height,
            mip_levels: 1,
            format: TextureFormat::Depth32Float,
            usage: TextureUsage::RENDER_ATTACHMENT,
        })?;
        let depth_view = backend.create_texture_view(depth_texture)?;

        let swapchain_format = backend.swapchain_format();
        let pipeline = backend.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Spotlight Pipeline".into()),
            vertex_shader: SPOTLIGHT_SHADER.into(),
            fragment_shader: Some(SPOTLIGHT_SHADER.into()),
            vertex_layouts: vec![Vertex::layout()],
            bind_group_layouts: vec![camera_layout, object_layout, material_layout],
            primitive_topology: PrimitiveTopology::TriangleList,
            front_face: FrontFace::Ccw,
            cull_mode: CullMode::Back,
            depth_stencil: Some(DepthStencilState {
                format: TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
            }),
            color_targets: vec![ColorTargetState {
                format: swapchain_format,
                write_mask: ColorWrites::ALL,
            }],
        })?;

        // Upload meshes
        let mut gpu_meshes = HashMap::new();
        for (id, mesh) in self.meshes.iter().enumerate() {
            gpu_meshes.insert(id, GpuMesh::upload(backend, mesh)?);
        }

        // Upload textures, plus a 1x1 white fallback for untextured materials
        let mut gpu_textures = HashMap::new();
        for (id, (data, generate_mipmaps)) in self.textures.iter().enumerate() {
            gpu_textures.insert(id, GpuTexture::create(backend, data, *generate_mipmaps)?);
        }
        let fallback_texture = GpuTexture::create(backend, &TextureData::white(), false)?;

        // Per-material uniform buffer + bind group
        let mut material_bind_groups = HashMap::new();
        let mut material_buffers = Vec::new();
        for (id, material) in self.materials.iter().enumerate() {
            let buffer = backend.create_buffer_init(
                &BufferDescriptor {
                    label: Some(format!("Material Buffer {id}")),
                    size: std::mem::size_of_val(&material.uniform_data()) as u64,
                    usage: BufferUsage::UNIFORM,
                    mapped_at_creation: false,
                },
                bytemuck::bytes_of(&material.uniform_data()),
            )?;

            let view = material
                .diffuse_texture
                .and_then(|t| gpu_textures.get(&t))
                .map(|t| t.view)
                .unwrap_or(fallback_texture.view);

            let bind_group = backend.create_bind_group(
                material_layout,
                &[
                    (
                        0,
                        BindGroupEntry::Buffer {
                            buffer,
                            offset: 0,
                            size: None,
                        },
                    ),
                    (1, BindGroupEntry::Texture(view)),
                    (2, BindGroupEntry::Sampler(sampler)),
                    (
                        3,
                        BindGroupEntry::Buffer {
                            buffer: light_buffer,
                            offset: 0,
                            size: None,
                        },
                    ),
                ],
            )?;
            material_bind_groups.insert(id, bind_group);
            material_buffers.push(buffer);
        }

        // Per-model transform buffer + bind group (transforms are static)
        let mut object_bind_groups = Vec::new();
        let mut object_buffers = Vec::new();
        for (id, model) in self.scene.models.iter().enumerate() {
            let uniform = model.transform.uniform_data();
            let buffer = backend.create_buffer_init(
                &BufferDescriptor {
                    label: Some(format!("Object Buffer {id}")),
                    size: std::mem::size_of_val(&uniform) as u64,
                    usage: BufferUsage::UNIFORM,
                    mapped_at_creation: false,
                },
                bytemuck::bytes_of(&uniform),
            )?;

            let bind_group = backend.create_bind_group(
                object_layout,
                &[(
                    0,
                    BindGroupEntry::Buffer {
                        buffer,
                        offset: 0,
                        size: None,
                    },
                )],
            )?;
            object_bind_groups.push(bind_group);
            object_buffers.push(buffer);
        }

        log::info!(
            "Render state ready: {} meshes, {} materials, {} textures, {} models",
            gpu_meshes.len(),
            self.materials.len(),
            gpu_textures.len(),
            self.scene.models.len()
        );

        self.render_state = Some(RenderState {
            pipeline,
            camera_buffer,
            camera_bind_group,
            light_buffer,
            material_bind_groups,
            material_buffers,
            object_bind_groups,
            object_buffers,
            gpu_meshes,
            gpu_textures,
            fallback_texture,
            depth_texture,
            depth_view,
        });

        Ok(())
    }

    /// Render one frame and present it
    pub fn render(&mut self) -> Result<(), ViewerError> {
        if self.render_state.is_none() && !self.meshes.is_empty() {
            self.initialize_render_state()?;
        }

        let frame = self.backend.begin_frame()?;

        if let Some(state) = &self.render_state {
            let camera_uniform = self.scene.camera.uniform_data();
            self.backend
                .write_buffer(state.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));

            let light_uniform = self.scene.spotlight.uniform_data();
            self.backend
                .write_buffer(state.light_buffer, 0, bytemuck::bytes_of(&light_uniform));

            self.backend.begin_render_pass(&RenderPassDescriptor {
                label: Some("Main Pass".into()),
                color_attachments: vec![ColorAttachment {
                    view: frame.swapchain_view,
                    resolve_target: None,
                    load_op: LoadOp::Clear([0.02, 0.02, 0.03, 1.0]),
                    store_op: StoreOp::Store,
                }],
                depth_stencil_attachment: Some(DepthStencilAttachment {
                    view: state.depth_view,
                    depth_load_op: LoadOp::Clear([1.0, 0.0, 0.0, 0.0]),
                    depth_store_op: StoreOp::Store,
                    depth_clear_value: 1.0,
                }),
            });

            self.backend.set_viewport(
                0.0,
                0.0,
                frame.width as f32,
                frame.height as f32,
                0.0,
                1.0,
            );

            self.backend.set_render_pipeline(state.pipeline);
            self.backend.set_bind_group(0, state.camera_bind_group);

            for (idx, model) in self.scene.models.iter().enumerate() {
                let Some(gpu_mesh) = state.gpu_meshes.get(&model.mesh_id) else {
                    continue;
                };
                let Some(&material_bind_group) =
                    state.material_bind_groups.get(&model.material_id)
                else {
                    continue;
                };
                let Some(&object_bind_group) = state.object_bind_groups.get(idx) else {
                    continue;
                };

                self.backend.set_bind_group(1, object_bind_group);
                self.backend.set_bind_group(2, material_bind_group);
                gpu_mesh.draw(&mut self.backend)?;
            }

            self.backend.end_render_pass();
        } else {
            // Nothing loaded yet, just clear
            self.backend.begin_render_pass(&RenderPassDescriptor {
                label: Some("Clear Pass".into()),
                color_attachments: vec![ColorAttachment {
                    view: frame.swapchain_view,
                    resolve_target: None,
                    load_op: LoadOp::Clear([0.02, 0.02, 0.03, 1.0]),
                    store_op: StoreOp::Store,
                }],
                depth_stencil_attachment: None,
            });
            self.backend.end_render_pass();
        }

        self.backend.end_frame()?;
        Ok(())
    }

    /// Release all GPU resources. Idempotent; meshes refuse further draws.
    pub fn shutdown(&mut self) {
        if let Some(mut state) = self.render_state.take() {
            for gpu_mesh in state.gpu_meshes.values_mut() {
                gpu_mesh.release(&mut self.backend);
            }
            for gpu_texture in state.gpu_textures.values() {
                self.backend.destroy_texture(gpu_texture.handle);
            }
            self.backend.destroy_texture(state.fallback_texture.handle);
            self.backend.destroy_texture(state.depth_texture);

            self.backend.destroy_buffer(state.camera_buffer);
            self.backend.destroy_buffer(state.light_buffer);
            for buffer in state
                .material_buffers
                .iter()
                .chain(state.object_buffers.iter())
            {
                self.backend.destroy_buffer(*buffer);
            }
            log::info!("Released GPU resources");
        }
    }

    /// Get current dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

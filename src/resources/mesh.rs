//! Mesh data and GPU geometry lifecycle

use crate::backend::traits::*;
use crate::backend::types::*;
use glam::{Vec2, Vec3};
use thiserror::Error;

/// Geometry lifecycle error type
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("mesh is not loaded to the GPU")]
    NotLoaded,
    #[error("GPU resource failure: {0}")]
    GpuResource(#[from] BackendError),
}

/// CPU-side mesh: a flattened, non-indexed triangle list.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str, vertices: Vec<Vertex>) -> Self {
        Self {
            vertices,
            name: name.to_string(),
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn triangle_count(&self) -> u32 {
        self.vertex_count() / 3
    }

    /// Get vertex data as bytes for the interleaved GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Generate a flat XZ plane centered at the origin (two triangles)
    pub fn plane(size: f32, uv_scale: f32) -> Self {
        let h = size * 0.5;
        let n = Vec3::Y;
        let corners = [
            (Vec3::new(-h, 0.0, -h), Vec2::new(0.0, 0.0)),
            (Vec3::new(-h, 0.0, h), Vec2::new(0.0, uv_scale)),
            (Vec3::new(h, 0.0, h), Vec2::new(uv_scale, uv_scale)),
            (Vec3::new(h, 0.0, -h), Vec2::new(uv_scale, 0.0)),
        ];

        let vertices = [0, 1, 2, 0, 2, 3]
            .iter()
            .map(|&i| {
                let (position, uv) = corners[i];
                Vertex::new(position, n, uv)
            })
            .collect();

        Self {
            vertices,
            name: "plane".to_string(),
        }
    }
}

/// GPU-side geometry: exclusive owner of the vertex buffer handle.
///
/// The buffer is created by `upload`, consumed by non-indexed `draw` calls,
/// and destroyed by `release`. Draw without a live buffer is a precondition
/// failure, not a silent no-op.
#[derive(Debug)]
pub struct GpuMesh {
    vertex_buffer: Option<BufferHandle>,
    vertex_count: u32,
    name: String,
}

impl GpuMesh {
    /// Upload a mesh into a single interleaved vertex buffer
    pub fn upload<B: GraphicsBackend>(backend: &mut B, mesh: &Mesh) -> Result<Self, MeshError> {
        let buffer = backend.create_buffer_init(
            &BufferDescriptor {
                label: Some(format!("{} Vertex Buffer", mesh.name)),
                size: mesh.vertex_bytes().len() as u64,
                usage: BufferUsage::VERTEX,
                mapped_at_creation: false,
            },
            mesh.vertex_bytes(),
        )?;

        log::debug!(
            "Uploaded mesh '{}' ({} vertices)",
            mesh.name,
            mesh.vertex_count()
        );

        Ok(Self {
            vertex_buffer: Some(buffer),
            vertex_count: mesh.vertex_count(),
            name: mesh.name.clone(),
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.vertex_buffer.is_some()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a non-indexed triangle-list draw of the whole mesh.
    ///
    /// Must be called inside an open render pass, after the pipeline and
    /// bind groups are set.
    pub fn draw<B: GraphicsBackend>(&self, backend: &mut B) -> Result<(), MeshError> {
        let buffer = self.vertex_buffer.ok_or(MeshError::NotLoaded)?;
        backend.set_vertex_buffer(0, buffer, 0);
        backend.draw(0..self.vertex_count, 0..1);
        Ok(())
    }

    /// Destroy the vertex buffer. Safe to call more than once; only the
    /// first call releases the handle.
    pub fn release<B: GraphicsBackend>(&mut self, backend: &mut B) {
        if let Some(buffer) = self.vertex_buffer.take() {
            backend.destroy_buffer(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Range;
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    enum Call {
        CreateBufferInit { size: u64, usage: BufferUsage },
        SetVertexBuffer { slot: u32, buffer: BufferHandle },
        Draw { vertices: Range<u32>, instances: Range<u32> },
        DestroyBuffer(BufferHandle),
    }

    /// Backend double that records calls instead of talking to a GPU
    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<Call>,
        next_id: u64,
    }

    impl GraphicsBackend for RecordingBackend {
        fn new(_window: Arc<winit::window::Window>, _vsync: bool) -> BackendResult<Self> {
            unreachable!("recording backend is constructed directly")
        }

        fn resize(&mut self, _width: u32, _height: u32) {}

        fn surface_size(&self) -> (u32, u32) {
            (0, 0)
        }

        fn begin_frame(&mut self) -> BackendResult<FrameContext> {
            Ok(FrameContext {
                swapchain_view: TextureViewHandle(0),
                width: 0,
                height: 0,
            })
        }

        fn end_frame(&mut self) -> BackendResult<()> {
            Ok(())
        }

        fn swapchain_format(&self) -> TextureFormat {
            TextureFormat::Bgra8UnormSrgb
        }

        fn create_buffer(&mut self, desc: &BufferDescriptor) -> BackendResult<BufferHandle> {
            self.calls.push(Call::CreateBufferInit {
                size: desc.size,
                usage: desc.usage,
            });
            self.next_id += 1;
            Ok(BufferHandle(self.next_id))
        }

        fn create_buffer_init(
            &mut self,
            desc: &BufferDescriptor,
            data: &[u8],
        ) -> BackendResult<BufferHandle> {
            assert_eq!(desc.size, data.len() as u64);
            self.calls.push(Call::CreateBufferInit {
                size: desc.size,
                usage: desc.usage,
            });
            self.next_id += 1;
            Ok(BufferHandle(self.next_id))
        }

        fn write_buffer(&mut self, _buffer: BufferHandle, _offset: u64, _data: &[u8]) {}

        fn create_texture(&mut self, _desc: &TextureDescriptor) -> BackendResult<TextureHandle> {
            self.next_id += 1;
            Ok(TextureHandle(self.next_id))
        }

        fn create_texture_view(
            &mut self,
            _texture: TextureHandle,
        ) -> BackendResult<TextureViewHandle> {
            self.next_id += 1;
            Ok(TextureViewHandle(self.next_id))
        }

        fn write_texture(
            &mut self,
            _texture: TextureHandle,
            _mip_level: u32,
            _data: &[u8],
            _width: u32,
            _height: u32,
        ) {
        }

        fn create_sampler(&mut self, _desc: &SamplerDescriptor) -> BackendResult<SamplerHandle> {
            self.next_id += 1;
            Ok(SamplerHandle(self.next_id))
        }

        fn create_bind_group_layout(
            &mut self,
            _entries: &[BindGroupLayoutEntry],
        ) -> BackendResult<BindGroupLayoutHandle> {
            self.next_id += 1;
            Ok(BindGroupLayoutHandle(self.next_id))
        }

        fn create_bind_group(
            &mut self,
            _layout: BindGroupLayoutHandle,
            _entries: &[(u32, BindGroupEntry)],
        ) -> BackendResult<BindGroupHandle> {
            self.next_id += 1;
            Ok(BindGroupHandle(self.next_id))
        }

        fn create_render_pipeline(
            &mut self,
            _desc: &RenderPipelineDescriptor,
        ) -> BackendResult<RenderPipelineHandle> {
            self.next_id += 1;
            Ok(RenderPipelineHandle(self.next_id))
        }

        fn begin_render_pass(&mut self, _desc: &RenderPassDescriptor) {}

        fn end_render_pass(&mut self) {}

        fn set_render_pipeline(&mut self, _pipeline: RenderPipelineHandle) {}

        fn set_bind_group(&mut self, _index: u32, _bind_group: BindGroupHandle) {}

        fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, _offset: u64) {
            self.calls.push(Call::SetVertexBuffer { slot, buffer });
        }

        fn set_viewport(
            &mut self,
            _x: f32,
            _y: f32,
            _width: f32,
            _height: f32,
            _min_depth: f32,
            _max_depth: f32,
        ) {
        }

        fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
            self.calls.push(Call::Draw {
                vertices,
                instances,
            });
        }

        fn destroy_buffer(&mut self, buffer: BufferHandle) {
            self.calls.push(Call::DestroyBuffer(buffer));
        }

        fn destroy_texture(&mut self, _texture: TextureHandle) {}
    }

    fn triangle_mesh() -> Mesh {
        Mesh::new(
            "triangle",
            vec![
                Vertex::new(Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO, Vec2::ZERO),
                Vertex::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, Vec2::ZERO),
                Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, Vec2::ZERO),
            ],
        )
    }

    #[test]
    fn upload_creates_one_interleaved_buffer() {
        let mut backend = RecordingBackend::default();
        let mesh = triangle_mesh();
        let gpu = GpuMesh::upload(&mut backend, &mesh).unwrap();

        assert!(gpu.is_loaded());
        assert_eq!(gpu.vertex_count(), 3);
        assert_eq!(backend.calls.len(), 1);
        assert_eq!(
            backend.calls[0],
            Call::CreateBufferInit {
                size: 3 * 32,
                usage: BufferUsage::VERTEX,
            }
        );
    }

    #[test]
    fn draw_emits_single_triangle_list_draw_of_exact_count() {
        let mut backend = RecordingBackend::default();
        let mesh = triangle_mesh();
        let gpu = GpuMesh::upload(&mut backend, &mesh).unwrap();

        gpu.draw(&mut backend).unwrap();

        assert_eq!(
            &backend.calls[1..],
            &[
                Call::SetVertexBuffer {
                    slot: 0,
                    buffer: BufferHandle(1),
                },
                Call::Draw {
                    vertices: 0..3,
                    instances: 0..1,
                },
            ]
        );
    }

    #[test]
    fn draw_after_release_fails_with_not_loaded() {
        let mut backend = RecordingBackend::default();
        let mesh = triangle_mesh();
        let mut gpu = GpuMesh::upload(&mut backend, &mesh).unwrap();

        gpu.release(&mut backend);
        assert!(!gpu.is_loaded());
        assert!(matches!(gpu.draw(&mut backend), Err(MeshError::NotLoaded)));
    }

    #[test]
    fn release_destroys_the_buffer_exactly_once() {
        let mut backend = RecordingBackend::default();
        let mesh = triangle_mesh();
        let mut gpu = GpuMesh::upload(&mut backend, &mesh).unwrap();

        gpu.release(&mut backend);
        gpu.release(&mut backend);

        let destroys = backend
            .calls
            .iter()
            .filter(|c| matches!(c, Call::DestroyBuffer(_)))
            .count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn parsed_triangle_uploads_and_draws() {
        let vertices = crate::resources::parse_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let mesh = Mesh::new("parsed", vertices);

        let mut backend = RecordingBackend::default();
        let gpu = GpuMesh::upload(&mut backend, &mesh).unwrap();
        gpu.draw(&mut backend).unwrap();

        assert!(backend.calls.contains(&Call::Draw {
            vertices: 0..3,
            instances: 0..1,
        }));
    }

    #[test]
    fn plane_is_two_triangles_with_up_normals() {
        let plane = Mesh::plane(10.0, 4.0);
        assert_eq!(plane.vertex_count(), 6);
        assert_eq!(plane.triangle_count(), 2);
        for v in &plane.vertices {
            assert_eq!(v.normal, Vec3::Y);
            assert_eq!(v.position.y, 0.0);
        }
    }
}

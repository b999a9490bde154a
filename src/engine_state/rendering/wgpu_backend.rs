//! WebGPU implementation of [`GpuBackend`].
//!
//! Each block texture becomes a 2D texture with its own bind group
//! (texture at binding 0, nearest-filtering sampler at binding 1). Each mesh
//! stream becomes a vertex buffer and a `u32` index buffer that keep the
//! texture alive for as long as they are drawn.

use std::rc::Rc;

use log::info;
use thiserror::Error;
use wgpu::util::DeviceExt;

use super::{
    meshing::MeshStream,
    texture::DecodedTexture,
    upload::GpuBackend,
};
use crate::engine_state::voxels::{block::BlockTexture, chunk::ChunkCoordinate};

/// Label of the per-texture bind group layout.
pub const BLOCK_TEXTURE_BIND_GROUP_LAYOUT: &str = "Block Texture Bind Group Layout";

/// Failures while acquiring a device.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("graphics device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// A block texture on the GPU.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
}

/// Vertex and index buffers for one texture stream of one chunk.
pub struct GpuMesh {
    pub coordinate: ChunkCoordinate,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub texture: Rc<GpuTexture>,
}

impl GpuMesh {
    /// Records the draw of this mesh.
    ///
    /// # Arguments
    /// * `render_pass` - Pass with a pipeline whose layout places the block
    ///   texture layout at `texture_bind_group_index`
    /// * `texture_bind_group_index` - Bind group slot of the block texture
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, texture_bind_group_index: u32) {
        render_pass.set_bind_group(texture_bind_group_index, &self.texture.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Owns the device and queue used for uploads.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl WgpuBackend {
    /// Requests an adapter and device without a presentation surface.
    pub async fn new_headless() -> Result<Self, BackendError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::empty(),
            backend_options: wgpu::BackendOptions::from_env_or_default(),
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                label: Some("Chunk Upload Device"),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self::from_device(device, queue))
    }

    /// Wraps an existing device, e.g. the one owned by the renderer.
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some(BLOCK_TEXTURE_BIND_GROUP_LAYOUT),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Block Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        WgpuBackend {
            device,
            queue,
            bind_group_layout,
            sampler,
        }
    }

    /// Layout the render pipeline must use for block textures.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// The device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// The queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl GpuBackend for WgpuBackend {
    type Texture = GpuTexture;
    type Mesh = GpuMesh;

    fn create_texture(&mut self, texture: BlockTexture, image: &DecodedTexture) -> GpuTexture {
        let label = format!("Block Texture {}", texture.file_stem());
        let gpu_texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some(&label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.rgba,
        );
        let view = gpu_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
            label: Some(&label),
        });

        GpuTexture {
            texture: gpu_texture,
            view,
            bind_group,
        }
    }

    fn create_mesh(
        &mut self,
        coordinate: ChunkCoordinate,
        stream: &MeshStream,
        texture: Rc<GpuTexture>,
    ) -> GpuMesh {
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Chunk Vertex Buffer"),
            contents: bytemuck::cast_slice(&stream.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Chunk Index Buffer"),
            contents: bytemuck::cast_slice(&stream.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        GpuMesh {
            coordinate,
            vertex_buffer,
            index_buffer,
            index_count: stream.indices.len() as u32,
            texture,
        }
    }

    fn release_mesh(&mut self, mesh: GpuMesh) {
        mesh.vertex_buffer.destroy();
        mesh.index_buffer.destroy();
    }
}

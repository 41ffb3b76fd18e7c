//! GPU-resident copies of draw batches and image textures.

use wgpu::util::DeviceExt;

use crate::draw::{DrawBatch, DrawUniforms, ImageTexture, Primitive};

/// Creates a buffer holding `contents`, writable later through the queue.
fn init_buffer(
    device: &wgpu::Device,
    contents: &[u8],
    usage: wgpu::BufferUsages,
    label: &str,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: usage | wgpu::BufferUsages::COPY_DST,
    })
}

/// GPU copy of one [`DrawBatch`] plus its uniform block.
pub(crate) struct GpuBatch {
    pub generation: u64,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub vertex_count: u32,
    pub index_count: u32,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl GpuBatch {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        batch: &DrawBatch,
        uniforms: &DrawUniforms,
    ) -> Self {
        let vertex_buffer = init_buffer(
            device,
            bytemuck::cast_slice(&batch.vertices),
            wgpu::BufferUsages::VERTEX,
            "batch vertices",
        );
        let index_buffer = (batch.primitive != Primitive::Points).then(|| {
            init_buffer(
                device,
                bytemuck::cast_slice(&batch.indices),
                wgpu::BufferUsages::INDEX,
                "batch indices",
            )
        });
        let uniform_buffer = init_buffer(
            device,
            bytemuck::bytes_of(uniforms),
            wgpu::BufferUsages::UNIFORM,
            "draw uniforms",
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw uniforms bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            generation: batch.generation,
            vertex_buffer,
            index_buffer,
            vertex_count: batch.vertices.len() as u32,
            index_count: batch.indices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }

    /// Updates the uniform block.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &DrawUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }
}

/// GPU copy of an [`ImageTexture`] with one bind group per filter mode.
pub(crate) struct GpuTexture {
    pub revision: u64,
    pub nearest: wgpu::BindGroup,
    pub linear: wgpu::BindGroup,
    _texture: wgpu::Texture,
}

impl GpuTexture {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        samplers: (&wgpu::Sampler, &wgpu::Sampler),
        image: &ImageTexture,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: image.width.max(1),
            height: image.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("image texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind = |sampler: &wgpu::Sampler, label: &str| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        };
        let nearest = bind(samplers.0, "image nearest bind group");
        let linear = bind(samplers.1, "image linear bind group");

        Self {
            revision: image.revision,
            nearest,
            linear,
            _texture: texture,
        }
    }
}

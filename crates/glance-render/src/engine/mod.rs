//! The wgpu canvas.

mod pipelines;

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;

use crate::buffer::{GpuBatch, GpuTexture};
use crate::canvas::Canvas;
use crate::draw::{flags, CapturedImage, DrawBatch, DrawKey, DrawUniforms, Primitive, RendererId};
use crate::error::{RenderError, RenderResult};
use crate::screenshot::bgra_to_rgba;

use pipelines::{Pipelines, DEPTH_FORMAT};

/// A draw queued for the frame in progress.
#[derive(Debug, Clone, Copy)]
struct QueuedDraw {
    key: DrawKey,
    primitive: Primitive,
    linear: bool,
}

/// Draws batches into a window surface with wgpu.
///
/// Batches are uploaded once per [`DrawKey`] and generation. Uniforms are
/// rewritten on every draw.
pub struct RenderEngine {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
    pipelines: Pipelines,
    batches: HashMap<DrawKey, GpuBatch>,
    textures: HashMap<DrawKey, GpuTexture>,
    frame: Vec<QueuedDraw>,
    background: Vec3,
    last_frame: Option<(Vec3, Vec<QueuedDraw>)>,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`.
    pub async fn new_windowed(window: Arc<winit::window::Window>) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("glance device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        // Colors are written as given, so prefer a linear surface format
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::UnsupportedFormat("no surface format".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "render engine ready: {} ({:?}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            surface_format,
            width,
            height
        );

        let (depth_texture, depth_view) = Self::create_depth_texture(&device, width, height);
        let pipelines = Pipelines::new(&device, surface_format);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            _depth_texture: depth_texture,
            depth_view,
            width,
            height,
            pipelines,
            batches: HashMap::new(),
            textures: HashMap::new(),
            frame: Vec::new(),
            background: Vec3::ONE,
            last_frame: None,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn aligned_bytes_per_row(width: u32) -> u32 {
        let unaligned = width * 4;
        unaligned.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        background: Vec3,
        draws: &[QueuedDraw],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(background.x),
                        g: f64::from(background.y),
                        b: f64::from(background.z),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for draw in draws {
            let Some(gpu) = self.batches.get(&draw.key) else {
                continue;
            };
            pass.set_pipeline(self.pipelines.get(draw.primitive));
            pass.set_bind_group(0, &gpu.bind_group, &[]);
            if draw.primitive == Primitive::Image {
                let Some(texture) = self.textures.get(&draw.key) else {
                    continue;
                };
                let group = if draw.linear {
                    &texture.linear
                } else {
                    &texture.nearest
                };
                pass.set_bind_group(1, group, &[]);
            }
            pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            match (&gpu.index_buffer, draw.primitive) {
                (_, Primitive::Points) => pass.draw(0..6, 0..gpu.vertex_count),
                (Some(indices), _) => {
                    pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..gpu.index_count, 0, 0..1);
                }
                (None, _) => {}
            }
        }
    }

    fn acquire_frame(&mut self) -> RenderResult<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(surface_error)
            }
            Err(err) => Err(surface_error(err)),
        }
    }
}

fn surface_error(err: wgpu::SurfaceError) -> RenderError {
    match err {
        wgpu::SurfaceError::Lost => RenderError::SurfaceLost,
        wgpu::SurfaceError::Outdated => RenderError::SurfaceOutdated,
        wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => RenderError::Timeout,
    }
}

impl Canvas for RenderEngine {
    fn begin_frame(&mut self, background: Vec3) {
        self.frame.clear();
        self.background = background;
    }

    fn draw(&mut self, key: DrawKey, batch: &DrawBatch, uniforms: &DrawUniforms) {
        if batch.is_empty() {
            return;
        }

        match self.batches.get(&key) {
            Some(gpu) if gpu.generation == batch.generation => {
                gpu.write_uniforms(&self.queue, uniforms);
            }
            _ => {
                log::trace!("uploading batch {}:{}", key.renderer, key.slot);
                let gpu =
                    GpuBatch::new(&self.device, &self.pipelines.uniform_layout, batch, uniforms);
                self.batches.insert(key, gpu);
            }
        }

        if let Some(image) = &batch.texture {
            let stale = self
                .textures
                .get(&key)
                .is_none_or(|texture| texture.revision != image.revision);
            if stale {
                let texture = GpuTexture::new(
                    &self.device,
                    &self.queue,
                    &self.pipelines.texture_layout,
                    (&self.pipelines.nearest_sampler, &self.pipelines.linear_sampler),
                    image,
                );
                self.textures.insert(key, texture);
            }
        }

        self.frame.push(QueuedDraw {
            key,
            primitive: batch.primitive,
            linear: uniforms.has(flags::LINEAR_FILTER),
        });
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);

        let (depth_texture, depth_view) = Self::create_depth_texture(&self.device, width, height);
        self._depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self, renderer: RendererId) {
        self.batches.retain(|key, _| key.renderer != renderer);
        self.textures.retain(|key, _| key.renderer != renderer);
        self.frame.retain(|draw| draw.key.renderer != renderer);
        if let Some((_, draws)) = &mut self.last_frame {
            draws.retain(|draw| draw.key.renderer != renderer);
        }
    }

    fn present(&mut self) -> RenderResult<()> {
        let frame = self.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        self.encode_pass(&mut encoder, &view, self.background, &self.frame);
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        self.last_frame = Some((self.background, std::mem::take(&mut self.frame)));
        Ok(())
    }

    fn capture(&mut self) -> RenderResult<CapturedImage> {
        let Some((background, draws)) = &self.last_frame else {
            return Err(RenderError::NoFrame);
        };

        let (width, height) = (self.width, self.height);
        let format = self.surface_config.format;
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capture texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bytes_per_row = Self::aligned_bytes_per_row(width);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("capture readback buffer"),
            size: u64::from(bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("capture encoder"),
            });
        self.encode_pass(&mut encoder, &view, *background, draws);
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            extent,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        rx.recv()
            .map_err(|_| RenderError::BufferMapFailed)?
            .map_err(|_| RenderError::BufferMapFailed)?;

        // Strip row padding
        let data = buffer_slice.get_mapped_range();
        let row_bytes = (width * 4) as usize;
        let mut rgba = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height {
            let start = (row * bytes_per_row) as usize;
            rgba.extend_from_slice(&data[start..start + row_bytes]);
        }
        drop(data);
        buffer.unmap();

        if matches!(
            format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            bgra_to_rgba(&mut rgba);
        }

        Ok(CapturedImage {
            width,
            height,
            rgba,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_alignment() {
        assert_eq!(RenderEngine::aligned_bytes_per_row(64), 256);
        assert_eq!(RenderEngine::aligned_bytes_per_row(65), 512);
        assert_eq!(RenderEngine::aligned_bytes_per_row(1), 256);
    }
}

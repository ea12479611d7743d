//! Accumulation-canvas renderer
//!
//! The tesseract piece never clears between frames: each frame's draw calls are painted
//! over a persistent offscreen texture (the first call being a translucent fade), and the
//! texture is then blitted to the swapchain. The canvas is only wiped on request.

use std::path::Path;

use anyhow::Context;
use common::{
    Camera2D, CameraUniform, Canvas2D, DrawCmd, DrawList, GraphicsContext, Stroke, Vertex,
};
use glam::Vec2;
use std::f32::consts::TAU;

/// Storage format of the accumulation canvas
pub const CANVAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const ELLIPSE_SEGMENTS: usize = 24;
const INITIAL_VERTEX_CAPACITY: usize = 16 * 1024;

/// Turn recorded draw calls into pixel-space triangles
pub fn tessellate(commands: &[DrawCmd], size: Vec2, out: &mut Vec<Vertex>) {
    for command in commands {
        match command {
            DrawCmd::Fill(color) => {
                let corners = [
                    Vec2::ZERO,
                    Vec2::new(size.x, 0.0),
                    size,
                    Vec2::new(0.0, size.y),
                ];
                push_quad(out, corners, *color);
            }
            DrawCmd::Line { a, b, stroke } => push_line(out, *a, *b, *stroke),
            DrawCmd::Polygon { points, stroke } => {
                if points.len() < 2 {
                    continue;
                }
                for (i, a) in points.iter().enumerate() {
                    let b = points[(i + 1) % points.len()];
                    push_line(out, *a, b, *stroke);
                }
            }
            DrawCmd::Ellipse {
                center,
                size: extent,
                color,
            } => {
                let radii = *extent * 0.5;
                for i in 0..ELLIPSE_SEGMENTS {
                    let a0 = i as f32 / ELLIPSE_SEGMENTS as f32 * TAU;
                    let a1 = (i + 1) as f32 / ELLIPSE_SEGMENTS as f32 * TAU;
                    let p0 = *center + Vec2::from_angle(a0) * radii;
                    let p1 = *center + Vec2::from_angle(a1) * radii;
                    out.push(Vertex::new(center.to_array(), *color));
                    out.push(Vertex::new(p0.to_array(), *color));
                    out.push(Vertex::new(p1.to_array(), *color));
                }
            }
        }
    }
}

/// A line becomes a quad of the stroke width. Hairlines thinner than a pixel are drawn
/// one pixel wide with proportionally reduced alpha.
fn push_line(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, stroke: Stroke) {
    let delta = b - a;
    let length = delta.length();
    if !length.is_finite() || length < 1e-4 {
        return;
    }
    let (half_width, alpha_scale) = if stroke.width < 1.0 {
        (0.5, stroke.width.max(0.0))
    } else {
        (stroke.width * 0.5, 1.0)
    };
    let normal = delta.perp() / length * half_width;
    let mut color = stroke.color;
    color[3] *= alpha_scale;
    push_quad(out, [a + normal, b + normal, b - normal, a - normal], color);
}

fn push_quad(out: &mut Vec<Vertex>, corners: [Vec2; 4], color: [f32; 4]) {
    for index in [0, 1, 2, 0, 2, 3] {
        out.push(Vertex::new(corners[index].to_array(), color));
    }
}

struct CanvasTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl CanvasTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Accumulation Canvas"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CANVAS_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }
}

/// Draws [`DrawList`]s into a persistent canvas and presents it
pub struct CanvasRenderer {
    canvas_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    scratch: Vec<Vertex>,

    camera: Camera2D,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    canvas: CanvasTarget,
    sampler: wgpu::Sampler,
    blit_layout: wgpu::BindGroupLayout,
    blit_bind_group: wgpu::BindGroup,
    pending_clear: bool,
}

impl CanvasRenderer {
    pub fn new(ctx: &GraphicsContext) -> Self {
        let device = &ctx.device;
        let (width, height) = (ctx.config.width, ctx.config.height);

        let canvas_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Canvas Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/canvas.wgsl").into()),
        });
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let camera = Camera2D::pixel_space(width as f32, height as f32);
        let camera_buffer =
            common::create_uniform_buffer(device, &CameraUniform::from_camera_2d(&camera));

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let canvas_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Canvas Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let canvas_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Canvas Pipeline"),
            layout: Some(&canvas_layout),
            vertex: wgpu::VertexState {
                module: &canvas_shader,
                entry_point: "vs_canvas",
                buffers: &[Vertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &canvas_shader,
                entry_point: "fs_canvas",
                targets: &[Some(wgpu::ColorTargetState {
                    format: CANVAS_FORMAT,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent::OVER,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blit Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
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
        });

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&blit_layout],
            push_constant_ranges: &[],
        });

        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: "vs_blit",
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: "fs_blit",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Canvas Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let canvas = CanvasTarget::new(device, width, height);
        let blit_bind_group = Self::create_blit_bind_group(device, &blit_layout, &canvas, &sampler);
        let vertex_buffer = Self::create_vertex_buffer(device, INITIAL_VERTEX_CAPACITY);

        Self {
            canvas_pipeline,
            blit_pipeline,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            scratch: Vec::with_capacity(INITIAL_VERTEX_CAPACITY),
            camera,
            camera_buffer,
            camera_bind_group,
            canvas,
            sampler,
            blit_layout,
            blit_bind_group,
            pending_clear: true,
        }
    }

    fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Canvas Vertex Buffer"),
            size: (std::mem::size_of::<Vertex>() * capacity) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_blit_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        canvas: &CanvasTarget,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&canvas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Wipe the canvas before the next draw
    pub fn clear(&mut self) {
        self.pending_clear = true;
    }

    /// Recreate the canvas at the surface's new size. Unless `clear` is set, the region
    /// shared by the old and new canvas is carried over.
    pub fn resize(&mut self, ctx: &GraphicsContext, clear: bool) {
        let (width, height) = (ctx.config.width, ctx.config.height);
        if width == self.canvas.width && height == self.canvas.height {
            return;
        }

        let canvas = CanvasTarget::new(&ctx.device, width, height);
        if clear {
            self.pending_clear = true;
        } else {
            let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Canvas Resize Encoder"),
            });
            encoder.copy_texture_to_texture(
                self.canvas.texture.as_image_copy(),
                canvas.texture.as_image_copy(),
                wgpu::Extent3d {
                    width: width.min(self.canvas.width),
                    height: height.min(self.canvas.height),
                    depth_or_array_layers: 1,
                },
            );
            ctx.queue.submit(std::iter::once(encoder.finish()));
        }

        self.canvas = canvas;
        self.blit_bind_group = Self::create_blit_bind_group(
            &ctx.device,
            &self.blit_layout,
            &self.canvas,
            &self.sampler,
        );
        self.camera.update_pixel_extent(width as f32, height as f32);
        ctx.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::from_camera_2d(&self.camera)]),
        );
        log::info!("canvas resized to {}x{} (cleared: {})", width, height, clear);
    }

    /// Paint `list` over the accumulated canvas
    pub fn draw(
        &mut self,
        ctx: &GraphicsContext,
        encoder: &mut wgpu::CommandEncoder,
        list: &DrawList,
    ) {
        self.scratch.clear();
        tessellate(list.commands(), list.size(), &mut self.scratch);

        if self.scratch.len() > self.vertex_capacity {
            self.vertex_capacity = self.scratch.len().next_power_of_two();
            self.vertex_buffer = Self::create_vertex_buffer(&ctx.device, self.vertex_capacity);
        }
        if !self.scratch.is_empty() {
            ctx.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.scratch));
        }

        let load = if std::mem::take(&mut self.pending_clear) {
            wgpu::LoadOp::Clear(wgpu::Color::BLACK)
        } else {
            wgpu::LoadOp::Load
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Canvas Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.canvas.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if !self.scratch.is_empty() {
            render_pass.set_pipeline(&self.canvas_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..self.scratch.len() as u32, 0..1);
        }
    }

    /// Copy the canvas onto the swapchain view
    pub fn present(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Blit Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.blit_pipeline);
        render_pass.set_bind_group(0, &self.blit_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }

    /// Read the canvas back and write it as a PNG
    pub fn save_png(&self, ctx: &GraphicsContext, path: &Path) -> anyhow::Result<()> {
        let (width, height) = (self.canvas.width, self.canvas.height);
        let unpadded = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Canvas Readback Buffer"),
            size: padded as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Canvas Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            self.canvas.texture.as_image_copy(),
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        ctx.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .context("readback callback never ran")?
            .context("failed to map readback buffer")?;

        let mut pixels = Vec::with_capacity((unpadded * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded as usize) {
                pixels.extend_from_slice(&row[..unpadded as usize]);
            }
        }
        buffer.unmap();

        for pixel in pixels.chunks_mut(4) {
            pixel[3] = 255;
        }

        let image = image::RgbaImage::from_raw(width, height, pixels)
            .context("readback size does not match canvas")?;
        image
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::rgba8;

    #[test]
    fn fill_covers_surface_with_two_triangles() {
        let mut list = DrawList::new(Vec2::new(100.0, 50.0));
        list.fill(rgba8(0, 0, 0, 26));
        let mut out = Vec::new();
        tessellate(list.commands(), list.size(), &mut out);
        assert_eq!(out.len(), 6);
        assert!(out.iter().any(|v| v.position == [100.0, 50.0]));
    }

    #[test]
    fn line_quad_has_stroke_width() {
        let mut out = Vec::new();
        push_line(
            &mut out,
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Stroke::new([1.0; 4], 4.0),
        );
        assert_eq!(out.len(), 6);
        let ys: Vec<f32> = out.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (y.abs() - 2.0).abs() < 1e-5));
    }

    #[test]
    fn hairline_fades_instead_of_vanishing() {
        let mut out = Vec::new();
        push_line(
            &mut out,
            Vec2::ZERO,
            Vec2::new(0.0, 10.0),
            Stroke::new([1.0, 1.0, 1.0, 0.5], 0.2),
        );
        assert!((out[0].color[3] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn degenerate_geometry_is_skipped() {
        let mut list = DrawList::new(Vec2::new(10.0, 10.0));
        let stroke = Stroke::new([1.0; 4], 1.0);
        list.line(Vec2::ONE, Vec2::ONE, stroke);
        list.polygon(&[Vec2::ONE], stroke);
        let mut out = Vec::new();
        tessellate(list.commands(), list.size(), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn closed_polygon_draws_every_side() {
        let mut list = DrawList::new(Vec2::new(10.0, 10.0));
        let square = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        list.polygon(&square, Stroke::new([1.0; 4], 1.0));
        let mut out = Vec::new();
        tessellate(list.commands(), list.size(), &mut out);
        assert_eq!(out.len(), 4 * 6);
    }
}

//! Render pipelines, the shared uniform buffer and the depth attachment.
//!
//! # Bind Groups
//!
//! A single bind group (group 0) holds [`Uniforms`], shared by every draw in a
//! frame. Per-draw data travels in the instance buffer instead.
//!
//! # Pipelines
//!
//! - **Solid**: triangle list, back-face culling (counter-clockwise front
//!   faces), alpha blending, depth test `Less` with writes
//! - **Edges**: line list over the solid pass, depth test `LessEqual` without
//!   writes, no culling
//!
//! Both share the vertex stage (`vs_main`) and the vertex/instance layouts.

use glam::Mat4;

use crate::error::{InitError, InitStage};
use crate::frame::DrawPass;
use crate::mesh::{Instance, Vertex};
use crate::scope::{self, Scope};
use crate::shader::ShaderSource;

/// Depth attachment format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Frame-wide shader uniforms.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    /// Combined projection × view matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Uniforms {
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self {
            view_proj: (projection * view).to_cols_array_2d(),
        }
    }
}

/// The uniform buffer plus a CPU copy that is uploaded lazily.
pub struct UniformState {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    value: Uniforms,
    dirty: bool,
}

impl UniformState {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, value: Uniforms) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            value,
            dirty: true,
        }
    }

    /// Replaces the uniform value; it is uploaded before the next draw.
    pub fn set(&mut self, value: Uniforms) {
        if self.value != value {
            self.value = value;
            self.dirty = true;
        }
    }

    pub fn value(&self) -> &Uniforms {
        &self.value
    }

    /// Uploads the value if it changed since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if self.dirty {
            queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&self.value));
            self.dirty = false;
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Depth texture matching the render target size.
pub struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl DepthBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
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
        Self {
            _texture: texture,
            view,
            size,
        }
    }

    /// Recreates the texture if the target size changed. On failure the
    /// old texture is kept.
    pub fn ensure_size(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<(), wgpu::Error> {
        if self.size() == (width.max(1), height.max(1)) {
            return Ok(());
        }
        *self = scope::capture_all(device, || Self::new(device, width, height))?;
        log::debug!("depth buffer resized to {}x{}", self.size.0, self.size.1);
        Ok(())
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

/// The solid and edge pipelines plus everything they bind.
pub struct Pipelines {
    pub solid: wgpu::RenderPipeline,
    pub edges: wgpu::RenderPipeline,
    pub uniforms: UniformState,
}

impl Pipelines {
    /// Compiles `shader` and builds both pipelines for `color_format`.
    pub fn new(
        device: &wgpu::Device,
        shader: &ShaderSource,
        color_format: wgpu::TextureFormat,
        initial: Uniforms,
    ) -> Result<Self, InitError> {
        let module = scope::capture(device, Scope::Validation, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(shader.label()),
                source: shader.to_wgsl(),
            })
        })
        .map_err(|err| InitError::new(InitStage::Shader, err.to_string()))?;

        scope::capture_all(device, || Self::build(device, &module, color_format, initial))
            .map_err(|err| InitError::new(InitStage::Resources, err.to_string()))
    }

    fn build(
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        color_format: wgpu::TextureFormat,
        initial: Uniforms,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniforms = UniformState::new(device, &bind_group_layout, initial);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let solid = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Solid Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT, Instance::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let edges = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Edge Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT, Instance::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("edges_fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            solid,
            edges,
            uniforms,
        }
    }

    pub fn pipeline(&self, pass: DrawPass) -> &wgpu::RenderPipeline {
        match pass {
            DrawPass::Solid => &self.solid,
            DrawPass::Edges => &self.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn uniforms_combine_projection_and_view() {
        let projection = Mat4::perspective_rh(1.0, 1.5, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::splat(10.0), Vec3::ZERO, Vec3::Z);
        let uniforms = Uniforms::new(projection, view);
        assert_eq!(
            Mat4::from_cols_array_2d(&uniforms.view_proj),
            projection * view
        );
        assert_eq!(std::mem::size_of::<Uniforms>(), 64);
    }
}

//! `wgpu` implementation of `RenderSink`.
//!
//! The unit cube is drawn once per voxel with instancing, on top of a line
//! grid marking the floor. Per frame the renderer uploads the scene uniform
//! (camera, fog, grid color) and the instance data, then records a single
//! pass that clears to the theme background.

use wgpu::{
    BindGroup, BufferUsages, Device, Queue, RenderPipeline, Surface, SurfaceConfiguration,
};

use super::{
    texture::DepthTexture,
    vertex::{cube_geometry, grid_lines, CubeVertex, GridVertex, VoxelInstance},
    FrameView, RenderSink, Theme, FOG_FAR, FOG_NEAR, GRID_DIVISIONS, GRID_DROP, GRID_SIZE,
};
use crate::{
    engine_state::{buffer_state::BufferState, simulation::Voxel},
    error::RenderError,
};

const SCENE_BUFFER: &str = "scene_buffer";
const CUBE_VERTEX_BUFFER: &str = "cube_vertex_buffer";
const CUBE_INDEX_BUFFER: &str = "cube_index_buffer";
const INSTANCE_BUFFER: &str = "instance_buffer";
const GRID_VERTEX_BUFFER: &str = "grid_vertex_buffer";

const VOXEL_SHADER: &str = include_str!("../../../assets/shaders/voxel.wgsl");

/// Per-frame shader constants.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    fog_color: [f32; 4],
    // x: fog start, y: fog end
    fog_range: [f32; 4],
    grid_color: [f32; 4],
}

impl SceneUniform {
    fn new(frame: &FrameView<'_>, theme: Theme) -> Self {
        Self {
            view_proj: frame.view_proj.into(),
            eye: [frame.eye.x, frame.eye.y, frame.eye.z, 1.0],
            fog_color: theme.background_rgba(),
            fog_range: [FOG_NEAR, FOG_FAR, 0.0, 0.0],
            grid_color: theme.grid_rgba(),
        }
    }
}

/// Draws voxels as lit, fogged, instanced cubes onto a window surface.
pub struct VoxelRenderer {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    render_pipeline: RenderPipeline,
    grid_pipeline: RenderPipeline,
    scene_bind_group: BindGroup,
    buffer_state: BufferState,
    depth_texture: DepthTexture,
    index_count: u32,
    grid_vertex_count: u32,
    theme: Theme,
    instances: Vec<VoxelInstance>,
}

impl VoxelRenderer {
    /// Builds the pipelines and static buffers for an already configured
    /// surface. The floor grid is placed a little below `floor_y`.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        floor_y: f32,
    ) -> Result<Self, RenderError> {
        let mut buffer_state = BufferState::new();

        let (vertices, indices) = cube_geometry();
        buffer_state.create_buffer_init(
            &device,
            CUBE_VERTEX_BUFFER,
            bytemuck::cast_slice(&vertices),
            BufferUsages::VERTEX,
        );
        buffer_state.create_buffer_init(
            &device,
            CUBE_INDEX_BUFFER,
            bytemuck::cast_slice(&indices),
            BufferUsages::INDEX,
        );
        let grid = grid_lines(GRID_SIZE, GRID_DIVISIONS, floor_y - GRID_DROP);
        buffer_state.create_buffer_init(
            &device,
            GRID_VERTEX_BUFFER,
            bytemuck::cast_slice(&grid),
            BufferUsages::VERTEX,
        );
        buffer_state.create_buffer(
            &device,
            SCENE_BUFFER,
            std::mem::size_of::<SceneUniform>() as u64,
            BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        );

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer_state.get_entire_binding(SCENE_BUFFER)?,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Voxel Render Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Voxel Shader"),
            source: wgpu::ShaderSource::Wgsl(VOXEL_SHADER.into()),
        });

        let render_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            PipelineKind::Voxels,
        );
        let grid_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            PipelineKind::Grid,
        );

        let depth_texture = DepthTexture::new(&device, &surface_config);

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            render_pipeline,
            grid_pipeline,
            scene_bind_group,
            buffer_state,
            depth_texture,
            index_count: indices.len() as u32,
            grid_vertex_count: grid.len() as u32,
            theme: Theme::default(),
            instances: Vec::new(),
        })
    }

    /// Bytes currently allocated on the GPU by this renderer.
    pub fn allocated_memory(&self) -> u64 {
        self.buffer_state.get_total_allocated_memory()
    }

    fn upload_scene(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let scene = SceneUniform::new(frame, self.theme);
        self.buffer_state.write_buffer(
            &self.queue,
            SCENE_BUFFER,
            0,
            bytemuck::cast_slice(&[scene]),
        )
    }

    fn upload_instances(&mut self, voxels: &[Voxel]) -> Result<u32, RenderError> {
        self.instances.clear();
        self.instances
            .extend(voxels.iter().map(VoxelInstance::from_voxel));
        if self.instances.is_empty() {
            return Ok(0);
        }

        let bytes: &[u8] = bytemuck::cast_slice(&self.instances);
        let grown = self.buffer_state.ensure_capacity(
            &self.device,
            INSTANCE_BUFFER,
            bytes.len() as u64,
            BufferUsages::VERTEX | BufferUsages::COPY_DST,
        );
        if grown {
            log::debug!(
                "Instance buffer grown for {} voxels, {} bytes on the GPU",
                self.instances.len(),
                self.allocated_memory()
            );
        }
        self.buffer_state
            .write_buffer(&self.queue, INSTANCE_BUFFER, 0, bytes)?;

        Ok(self.instances.len() as u32)
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
        if !self.depth_texture.matches(&self.surface_config) {
            self.depth_texture = DepthTexture::new(&self.device, &self.surface_config);
        }
    }
}

impl RenderSink for VoxelRenderer {
    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        self.upload_scene(frame)?;
        let instance_count = self.upload_instances(frame.voxels)?;

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Timed out waiting for the surface, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let view = output.texture.create_view(&Default::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Voxel Command Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Voxel Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.theme.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

            render_pass.set_pipeline(&self.grid_pipeline);
            render_pass.set_vertex_buffer(
                0,
                self.buffer_state.get_buffer(GRID_VERTEX_BUFFER)?.slice(..),
            );
            render_pass.draw(0..self.grid_vertex_count, 0..1);

            if instance_count > 0 {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_vertex_buffer(
                    0,
                    self.buffer_state.get_buffer(CUBE_VERTEX_BUFFER)?.slice(..),
                );
                render_pass.set_vertex_buffer(
                    1,
                    self.buffer_state.get_buffer(INSTANCE_BUFFER)?.slice(..),
                );
                render_pass.set_index_buffer(
                    self.buffer_state.get_buffer(CUBE_INDEX_BUFFER)?.slice(..),
                    wgpu::IndexFormat::Uint16,
                );
                render_pass.draw_indexed(0..self.index_count, 0, 0..instance_count);
            }
        }

        self.queue.submit([encoder.finish()]);
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure();
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

#[derive(Clone, Copy)]
enum PipelineKind {
    Voxels,
    Grid,
}

fn create_pipeline(
    device: &Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    kind: PipelineKind,
) -> RenderPipeline {
    let voxel_buffers = [CubeVertex::desc(), VoxelInstance::desc()];
    let grid_buffers = [GridVertex::desc()];

    let (label, vs_entry, fs_entry, buffers, topology, cull_mode) = match kind {
        PipelineKind::Voxels => (
            "Voxel Render Pipeline",
            "vs_main",
            "fs_main",
            &voxel_buffers[..],
            wgpu::PrimitiveTopology::TriangleList,
            Some(wgpu::Face::Back),
        ),
        PipelineKind::Grid => (
            "Grid Render Pipeline",
            "vs_grid",
            "fs_grid",
            &grid_buffers[..],
            wgpu::PrimitiveTopology::LineList,
            None,
        ),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs_entry),
            compilation_options: Default::default(),
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthTexture::stencil_state()),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use cgmath::{Matrix4, Point3, SquareMatrix};

    use super::*;

    #[test]
    fn scene_uniform_carries_the_theme_colors() {
        let frame = FrameView {
            voxels: &[],
            view_proj: Matrix4::identity(),
            eye: Point3::new(20.0, 10.0, 35.0),
        };
        let scene = SceneUniform::new(&frame, Theme::Light);

        assert_eq!(scene.fog_color, Theme::Light.background_rgba());
        assert_eq!(scene.grid_color, Theme::Light.grid_rgba());
        assert_eq!(scene.eye, [20.0, 10.0, 35.0, 1.0]);
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
    }

    #[test]
    fn shader_defines_every_pipeline_entry_point() {
        for entry in ["fn vs_main", "fn fs_main", "fn vs_grid", "fn fs_grid"] {
            assert!(VOXEL_SHADER.contains(entry), "missing `{entry}`");
        }
    }
}

//! Depth buffer for the voxel pass.

/// A depth texture sized to the surface.
pub struct DepthTexture {
    /// The view bound as the pass depth attachment.
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthTexture {
    /// The texture format used for depth buffers.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching `config`'s dimensions.
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> Self {
        let width = config.width.max(1);
        let height = config.height.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Voxel Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            view,
            width,
            height,
        }
    }

    /// Whether the texture still matches `config`.
    pub fn matches(&self, config: &wgpu::SurfaceConfiguration) -> bool {
        self.width == config.width.max(1) && self.height == config.height.max(1)
    }

    /// Depth state used by the voxel pipeline.
    pub fn stencil_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Self::FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

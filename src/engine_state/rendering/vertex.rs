//! Vertex data structures and layouts for voxel rendering.
//!
//! Every voxel is drawn as an instance of one shared unit cube. The cube
//! mesh lives in a vertex buffer (`CubeVertex`), and each voxel contributes a
//! model matrix and a color (`VoxelInstance`). The floor grid is a plain
//! line list of `GridVertex`.

use cgmath::{Matrix4, Rad};

use crate::engine_state::simulation::Voxel;

/// Edge length of a drawn voxel; slightly under 1 so neighbors show a seam
pub const VOXEL_SIZE: f32 = 0.95;

/// A corner of the unit cube with its face normal.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

impl CubeVertex {
    /// Vertex buffer layout.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Per-voxel instance data.
///
/// # Memory Layout
/// - Model matrix: 4x [f32; 4] (64 bytes)
/// - Color: [f32; 4] (16 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VoxelInstance {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl VoxelInstance {
    /// Builds the instance for one voxel: translation, then XYZ Euler
    /// rotation, then the voxel scale.
    pub fn from_voxel(voxel: &Voxel) -> Self {
        let rotation = Matrix4::from_angle_x(Rad(voxel.rotation.x))
            * Matrix4::from_angle_y(Rad(voxel.rotation.y))
            * Matrix4::from_angle_z(Rad(voxel.rotation.z));
        let model = Matrix4::from_translation(voxel.position)
            * rotation
            * Matrix4::from_scale(VOXEL_SIZE);

        Self {
            model: model.into(),
            color: voxel.color().to_rgba(),
        }
    }

    /// Vertex buffer layout.
    ///
    /// # Shader Attributes
    /// - `location = 2..=5`: model matrix columns (vec4<f32>)
    /// - `location = 6`: color (vec4<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<VoxelInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Unit cube centered on the origin: four vertices per face so every face
/// gets its own normal, wound counter-clockwise when seen from outside.
pub fn cube_geometry() -> (Vec<CubeVertex>, Vec<u16>) {
    // (normal, u axis, v axis) with u x v == normal
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];
    const CORNERS: [(f32, f32); 4] = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in FACES {
        let base = vertices.len() as u16;
        for (su, sv) in CORNERS {
            let position = [0, 1, 2].map(|axis| normal[axis] * 0.5 + u[axis] * su + v[axis] * sv);
            vertices.push(CubeVertex { position, normal });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// An end point of a floor grid line.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex {
    position: [f32; 3],
}

impl GridVertex {
    /// Vertex buffer layout.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GridVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Line list for a square grid of `size` units centered on the Y axis at
/// height `y`, split into `divisions` cells per side.
pub fn grid_lines(size: f32, divisions: u32, y: f32) -> Vec<GridVertex> {
    let half = size / 2.0;
    let divisions = divisions.max(1);
    let step = size / divisions as f32;
    let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);

    for line in 0..=divisions {
        let offset = -half + line as f32 * step;
        vertices.push(GridVertex { position: [-half, y, offset] });
        vertices.push(GridVertex { position: [half, y, offset] });
        vertices.push(GridVertex { position: [offset, y, -half] });
        vertices.push(GridVertex { position: [offset, y, half] });
    }

    vertices
}

#[cfg(test)]
mod tests {
    use cgmath::{Vector3, Zero};

    use super::*;
    use crate::engine_state::simulation::VoxelColor;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    #[test]
    fn cube_faces_wind_outwards() {
        let (vertices, indices) = cube_geometry();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);

        for triangle in indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| vertices[triangle[i] as usize]);
            let facing = cross(sub(b.position, a.position), sub(c.position, a.position));
            let dot: f32 = (0..3).map(|axis| facing[axis] * a.normal[axis]).sum();
            assert!(dot > 0.0, "triangle {triangle:?} faces inwards");
        }
    }

    #[test]
    fn cube_corners_are_on_the_unit_cube() {
        let (vertices, _) = cube_geometry();
        for vertex in vertices {
            assert!(vertex.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn instance_places_and_scales_the_cube() {
        let mut voxel = Voxel::new(0, Vector3::new(1.0, 2.0, 3.0), VoxelColor::from_hex(0xFF0000));
        voxel.rotation = Vector3::zero();
        let instance = VoxelInstance::from_voxel(&voxel);

        assert_eq!(instance.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(instance.model[0][0], VOXEL_SIZE);
        assert_eq!(instance.color, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn grid_spans_the_square_at_one_height() {
        let vertices = grid_lines(200.0, 50, -14.0);
        assert_eq!(vertices.len(), 51 * 4);

        for vertex in &vertices {
            let [x, y, z] = vertex.position;
            assert_eq!(y, -14.0);
            assert!(x.abs() <= 100.0 && z.abs() <= 100.0);
        }
        assert_eq!(vertices[0].position, [-100.0, -14.0, -100.0]);
        assert_eq!(vertices[4].position, [-100.0, -14.0, -96.0]);
    }
}

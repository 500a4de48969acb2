//! Mesh types, vertex formats and per-instance payloads.
//!
//! This module defines the data that flows from the application to the GPU:
//!
//! - [`MeshType`]: the closed set of meshes the renderer knows how to draw
//! - [`Vertex`]: static per-vertex geometry, uploaded once per mesh
//! - [`Instance`]: per-draw model matrix and color, uploaded every frame
//! - [`Transform`]: position, rotation and scale, for building instances
//!
//! # Vertex Layout
//!
//! [`Vertex`] occupies 36 bytes:
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | color     | Float32x3 | 12     | 1               |
//! | normal    | Float32x3 | 24     | 2               |
//!
//! # Instance Layout
//!
//! [`Instance`] occupies 80 bytes and steps once per instance:
//!
//! | Attribute      | Format    | Offset | Shader Location |
//! |----------------|-----------|--------|-----------------|
//! | model column 0 | Float32x4 | 0      | 3               |
//! | model column 1 | Float32x4 | 16     | 4               |
//! | model column 2 | Float32x4 | 32     | 5               |
//! | model column 3 | Float32x4 | 48     | 6               |
//! | color          | Float32x4 | 64     | 7               |

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

/// The fixed set of meshes the renderer can draw.
///
/// Declaration order is draw order: each frame, instanced draws are issued in
/// the order of [`MeshType::ALL`], independent of the order draw requests were
/// appended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshType {
    Triangle,
    Cube,
    Tetrahedron,
    Sphere,
}

impl MeshType {
    /// Number of mesh types.
    pub const COUNT: usize = 4;

    /// Every mesh type, in declaration (and draw) order.
    pub const ALL: [MeshType; MeshType::COUNT] = [
        MeshType::Triangle,
        MeshType::Cube,
        MeshType::Tetrahedron,
        MeshType::Sphere,
    ];

    /// Slot of this mesh type in per-type arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Debug label used for GPU resources belonging to this mesh.
    pub fn label(self) -> &'static str {
        match self {
            MeshType::Triangle => "Triangle",
            MeshType::Cube => "Cube",
            MeshType::Tetrahedron => "Tetrahedron",
            MeshType::Sphere => "Sphere",
        }
    }
}

/// A static mesh vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in model space.
    pub position: [f32; 3],
    /// Vertex color, multiplied with the instance color in the shader.
    pub color: [f32; 3],
    /// Surface normal.
    pub normal: [f32; 3],
}

impl Vertex {
    /// Vertex buffer layout for slot 0.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // color
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    };

    pub const fn new(position: [f32; 3], color: [f32; 3], normal: [f32; 3]) -> Self {
        Self {
            position,
            color,
            normal,
        }
    }
}

/// Per-instance payload: one mesh occurrence in the world.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Instance {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
    /// RGBA color.
    pub color: [f32; 4],
}

impl Instance {
    /// Instance buffer layout for slot 1.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Instance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 4,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: 32,
                shader_location: 5,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: 48,
                shader_location: 6,
                format: wgpu::VertexFormat::Float32x4,
            },
            // color
            wgpu::VertexAttribute {
                offset: 64,
                shader_location: 7,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };

    /// Byte size of one instance in the instance buffer.
    pub const SIZE: u64 = std::mem::size_of::<Instance>() as u64;

    /// Creates an instance from a model matrix and color.
    pub fn new(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }

    /// Builds an instance from a position, a rotation matrix and a uniform scale.
    ///
    /// The model matrix is rotation and scale around the local origin, then
    /// translation to `position`.
    pub fn from_position_rotation(position: Vec3, rotation: Mat3, scale: f32, color: Vec4) -> Self {
        let model = Mat4::from_translation(position)
            * Mat4::from_mat3(rotation)
            * Mat4::from_scale(Vec3::splat(scale));
        Self::new(model, color)
    }

    /// Returns the model matrix.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    /// Moves the instance, keeping rotation and scale.
    pub fn set_position(&mut self, position: Vec3) {
        self.model[3] = [position.x, position.y, position.z, self.model[3][3]];
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec4::ONE)
    }
}

/// Position, rotation and scale of a mesh occurrence.
///
/// Converted to a model matrix in scale → rotate → translate order.
///
/// ```
/// use raijin::{Transform, Vec3, Quat};
///
/// let transform = Transform::new()
///     .position(Vec3::new(0.0, 5.0, 0.0))
///     .rotation(Quat::from_rotation_z(0.5))
///     .uniform_scale(10.0);
/// let matrix = transform.matrix();
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Model matrix for this transform.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_types_iterate_in_declaration_order() {
        for (slot, mesh) in MeshType::ALL.iter().enumerate() {
            assert_eq!(mesh.index(), slot);
        }
        assert!(MeshType::Triangle < MeshType::Sphere);
    }

    #[test]
    fn gpu_layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
        assert_eq!(Vertex::LAYOUT.array_stride, 36);
        assert_eq!(std::mem::size_of::<Instance>(), 80);
        assert_eq!(Instance::LAYOUT.array_stride, Instance::SIZE);
    }

    #[test]
    fn instance_from_position_rotation_places_origin() {
        let instance = Instance::from_position_rotation(
            Vec3::new(5.0, 0.0, 0.0),
            Mat3::IDENTITY,
            10.0,
            Vec4::new(1.0, 0.0, 1.0, 1.0),
        );
        let origin = instance.model_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(5.0, 0.0, 0.0));
        let corner = instance.model_matrix().transform_point3(Vec3::ONE);
        assert_eq!(corner, Vec3::new(15.0, 10.0, 10.0));
        assert_eq!(instance.color, [1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn set_position_keeps_scale() {
        let mut instance = Instance::new(Transform::new().uniform_scale(2.0).matrix(), Vec4::ONE);
        instance.set_position(Vec3::new(1.0, 2.0, 3.0));
        let p = instance.model_matrix().transform_point3(Vec3::X);
        assert_eq!(p, Vec3::new(3.0, 2.0, 3.0));
    }
}

//! Static geometry tables for the built-in mesh types.
//!
//! Every [`MeshType`] has a [`MeshGeometry`]: a vertex list, triangle-list
//! indices for the solid pass and line-list indices for the edge overlay. The
//! tables are generated once at renderer initialization and never change.
//!
//! All primitives use counter-clockwise winding for front faces and are
//! centered at the origin, spanning roughly `[-1, 1]` on each axis.

use crate::mesh::{MeshType, Vertex};

/// CPU-side geometry for one mesh type.
#[derive(Clone, Debug, Default)]
pub struct MeshGeometry {
    pub vertices: Vec<Vertex>,
    /// Triangle-list indices.
    pub indices: Vec<u16>,
    /// Line-list indices for the edge overlay.
    pub edge_indices: Vec<u16>,
}

const SPHERE_SEGMENTS: u16 = 24;
const SPHERE_RINGS: u16 = 16;

impl MeshGeometry {
    /// Geometry table for `mesh`.
    pub fn for_mesh(mesh: MeshType) -> Self {
        match mesh {
            MeshType::Triangle => Self::triangle(),
            MeshType::Cube => Self::cube(),
            MeshType::Tetrahedron => Self::tetrahedron(),
            MeshType::Sphere => Self::sphere(SPHERE_SEGMENTS, SPHERE_RINGS),
        }
    }

    /// A single triangle in the XY plane facing +Z.
    pub fn triangle() -> Self {
        let normal = [0.0, 0.0, 1.0];
        Self {
            vertices: vec![
                Vertex::new([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], normal),
                Vertex::new([-1.0, -1.0, 0.0], [0.0, 1.0, 0.0], normal),
                Vertex::new([1.0, -1.0, 0.0], [0.0, 0.0, 1.0], normal),
            ],
            indices: vec![0, 1, 2],
            edge_indices: vec![0, 1, 1, 2, 2, 0],
        }
    }

    /// An 8-vertex cube with corner normals.
    pub fn cube() -> Self {
        const N: f32 = 0.577;
        #[rustfmt::skip]
        let vertices = vec![
            Vertex::new([ 1.0,  1.0,  1.0], [1.0, 1.0, 1.0], [ N,  N,  N]),
            Vertex::new([-1.0,  1.0,  1.0], [0.0, 0.0, 1.0], [-N,  N,  N]),
            Vertex::new([ 1.0, -1.0,  1.0], [1.0, 0.0, 0.0], [ N, -N,  N]),
            Vertex::new([-1.0, -1.0,  1.0], [0.0, 0.0, 1.0], [-N, -N,  N]),
            Vertex::new([ 1.0,  1.0, -1.0], [1.0, 0.0, 0.0], [ N,  N, -N]),
            Vertex::new([-1.0,  1.0, -1.0], [0.0, 0.0, 1.0], [-N,  N, -N]),
            Vertex::new([ 1.0, -1.0, -1.0], [1.0, 0.0, 0.0], [ N, -N, -N]),
            Vertex::new([-1.0, -1.0, -1.0], [0.0, 0.0, 1.0], [-N, -N, -N]),
        ];

        #[rustfmt::skip]
        let indices = vec![
            0, 1, 3,  0, 3, 2, // front
            5, 4, 6,  5, 6, 7, // back
            1, 5, 7,  1, 7, 3, // left
            4, 0, 2,  4, 2, 6, // right
            4, 5, 1,  4, 1, 0, // top
            7, 6, 2,  7, 2, 3, // bottom
        ];

        #[rustfmt::skip]
        let edge_indices = vec![
            0, 1,  1, 3,  3, 2,  2, 0,
            4, 5,  5, 7,  7, 6,  6, 4,
            0, 4,  1, 5,  2, 6,  3, 7,
        ];

        Self {
            vertices,
            indices,
            edge_indices,
        }
    }

    /// A regular tetrahedron inscribed in the `[-1, 1]` cube.
    pub fn tetrahedron() -> Self {
        const N: f32 = 0.577;
        let vertices = vec![
            Vertex::new([1.0, 1.0, 1.0], [1.0, 1.0, 0.0], [N, N, N]),
            Vertex::new([-1.0, -1.0, 1.0], [0.0, 1.0, 1.0], [-N, -N, N]),
            Vertex::new([-1.0, 1.0, -1.0], [1.0, 0.0, 1.0], [-N, N, -N]),
            Vertex::new([1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [N, -N, -N]),
        ];

        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1,
            0, 1, 3,
            0, 3, 2,
            1, 2, 3,
        ];

        let edge_indices = vec![0, 1, 0, 2, 0, 3, 1, 2, 1, 3, 2, 3];

        Self {
            vertices,
            indices,
            edge_indices,
        }
    }

    /// A UV sphere of radius 1.
    ///
    /// Produces `(segments + 1) × (rings + 1)` vertices; edges follow the
    /// latitude and longitude lines.
    pub fn sphere(segments: u16, rings: u16) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        let mut edge_indices = Vec::with_capacity((segments * rings * 4) as usize);

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = 2.0 * std::f32::consts::PI * seg as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let shade = 0.6 + 0.4 * (ring as f32 / rings as f32);
                vertices.push(Vertex::new([x, y, z], [shade, shade, shade], [x, y, z]));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, current + 1, next]);
                indices.extend_from_slice(&[current + 1, next + 1, next]);

                edge_indices.extend_from_slice(&[current, current + 1]);
                edge_indices.extend_from_slice(&[current, next]);
            }
        }

        Self {
            vertices,
            indices,
            edge_indices,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn edge_index_count(&self) -> u32 {
        self.edge_indices.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_in_range(geometry: &MeshGeometry) {
        let count = geometry.vertices.len() as u16;
        assert!(geometry.indices.iter().all(|&i| i < count));
        assert!(geometry.edge_indices.iter().all(|&i| i < count));
    }

    #[test]
    fn every_mesh_type_has_triangles_and_edges() {
        for mesh in MeshType::ALL {
            let geometry = MeshGeometry::for_mesh(mesh);
            assert!(!geometry.vertices.is_empty(), "{mesh:?}");
            assert_eq!(geometry.indices.len() % 3, 0, "{mesh:?}");
            assert_eq!(geometry.edge_indices.len() % 2, 0, "{mesh:?}");
            assert_indices_in_range(&geometry);
        }
    }

    #[test]
    fn cube_tables() {
        let cube = MeshGeometry::cube();
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.index_count(), 36);
        assert_eq!(cube.edge_index_count(), 24);
    }

    #[test]
    fn sphere_vertex_count_follows_tessellation() {
        let sphere = MeshGeometry::sphere(8, 4);
        assert_eq!(sphere.vertices.len(), 9 * 5);
        assert_eq!(sphere.indices.len(), 8 * 4 * 6);
        for v in &sphere.vertices {
            let p = glam::Vec3::from(v.position);
            assert!((p.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn tetrahedron_faces_point_outward() {
        let tetra = MeshGeometry::tetrahedron();
        for face in tetra.indices.chunks(3) {
            let [a, b, c] = [face[0], face[1], face[2]]
                .map(|i| glam::Vec3::from(tetra.vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn sphere_faces_point_outward() {
        let sphere = MeshGeometry::sphere(24, 16);
        let mut checked = 0;
        for face in sphere.indices.chunks(3) {
            let [a, b, c] = [face[0], face[1], face[2]]
                .map(|i| glam::Vec3::from(sphere.vertices[i as usize].position));
            let normal = (b - a).cross(c - a);
            // Pole triangles collapse to a line.
            if normal.length() < 1e-6 {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "inward face {face:?}");
            checked += 1;
        }
        assert_eq!(checked, 24 * 16 * 2 - 24 * 2);
    }
}

//! Per-mesh GPU resources.
//!
//! Each [`MeshType`] owns one [`MeshResource`]: static vertex and index
//! buffers written once at creation, plus two growable instance buffers (one
//! for the solid pass, one for the edge overlay). Instance buffers only ever
//! grow, following [`grown_capacity`].

use wgpu::util::DeviceExt;

use crate::error::{InitError, InitStage, RendererError};
use crate::frame::DrawPass;
use crate::geometry::MeshGeometry;
use crate::mesh::{Instance, MeshType};
use crate::scope::{self, Scope};

/// Capacity after growing `current` to hold `needed` instances.
///
/// Starts from `baseline` when nothing has been allocated yet and doubles until
/// the capacity covers `needed`. The result is never smaller than `current`.
/// Returns `None` if doubling overflows `u32`.
pub fn grown_capacity(current: u32, needed: u32, baseline: u32) -> Option<u32> {
    let mut capacity = if current == 0 { baseline.max(1) } else { current };
    while capacity < needed {
        capacity = capacity.checked_mul(2)?;
    }
    Some(capacity)
}

/// A vertex buffer of [`Instance`]s with a capacity that only grows.
pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: u32,
    label: String,
}

impl InstanceBuffer {
    fn new(device: &wgpu::Device, label: String, capacity: u32) -> Self {
        let buffer = Self::allocate(device, &label, capacity);
        Self {
            buffer,
            capacity,
            label,
        }
    }

    fn allocate(device: &wgpu::Device, label: &str, capacity: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity as u64 * Instance::SIZE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Capacity in instances.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Grows the buffer so it holds at least `needed` instances.
    ///
    /// The old buffer is discarded once the replacement exists. On failure the
    /// old buffer and capacity are kept.
    fn ensure_capacity(
        &mut self,
        device: &wgpu::Device,
        needed: u32,
        baseline: u32,
    ) -> Result<(), String> {
        let capacity = grown_capacity(self.capacity, needed, baseline)
            .ok_or_else(|| format!("capacity for {needed} instances overflows u32"))?;
        if capacity == self.capacity {
            return Ok(());
        }

        let size = capacity as u64 * Instance::SIZE;
        let max = device.limits().max_buffer_size;
        if size > max {
            return Err(format!("{size} bytes exceeds the device limit of {max} bytes"));
        }

        let buffer = scope::capture(device, Scope::OutOfMemory, || {
            Self::allocate(device, &self.label, capacity)
        })
        .map_err(|err| err.to_string())?;

        log::debug!("{}: {} -> {} instances", self.label, self.capacity, capacity);
        self.buffer = buffer;
        self.capacity = capacity;
        Ok(())
    }

    /// Writes `instances` at offset 0.
    fn upload(&self, queue: &wgpu::Queue, instances: &[Instance]) {
        debug_assert!(instances.len() <= self.capacity as usize);
        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        }
    }
}

/// GPU resources for one mesh type.
pub struct MeshResource {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub edge_index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub edge_index_count: u32,
    pub instances: InstanceBuffer,
    pub edge_instances: InstanceBuffer,
}

impl MeshResource {
    fn instance_buffer(&self, pass: DrawPass) -> &InstanceBuffer {
        match pass {
            DrawPass::Solid => &self.instances,
            DrawPass::Edges => &self.edge_instances,
        }
    }

    fn instance_buffer_mut(&mut self, pass: DrawPass) -> &mut InstanceBuffer {
        match pass {
            DrawPass::Solid => &mut self.instances,
            DrawPass::Edges => &mut self.edge_instances,
        }
    }

    /// Index buffer and index count for `pass`.
    pub fn indices(&self, pass: DrawPass) -> (&wgpu::Buffer, u32) {
        match pass {
            DrawPass::Solid => (&self.index_buffer, self.index_count),
            DrawPass::Edges => (&self.edge_index_buffer, self.edge_index_count),
        }
    }
}

/// Resources for every mesh type, indexed by [`MeshType::index`].
pub struct MeshRegistry {
    slots: [Option<MeshResource>; MeshType::COUNT],
    baseline: u32,
}

impl MeshRegistry {
    /// An empty registry whose instance buffers start at `baseline`.
    pub fn new(baseline: u32) -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            baseline: baseline.max(1),
        }
    }

    /// Creates resources for every mesh type from the built-in geometry.
    pub fn with_builtin_meshes(device: &wgpu::Device, baseline: u32) -> Result<Self, InitError> {
        let mut registry = Self::new(baseline);
        for mesh in MeshType::ALL {
            registry.create_mesh(device, mesh, &MeshGeometry::for_mesh(mesh))?;
        }
        Ok(registry)
    }

    /// Uploads static geometry for `mesh` and allocates its instance buffers at
    /// the baseline capacity.
    ///
    /// Replaces any resources previously created for the same type.
    pub fn create_mesh(
        &mut self,
        device: &wgpu::Device,
        mesh: MeshType,
        geometry: &MeshGeometry,
    ) -> Result<(), InitError> {
        let label = mesh.label();
        let baseline = self.baseline;

        let resource = scope::capture_all(device, || {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            let edge_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Edge Index Buffer")),
                contents: bytemuck::cast_slice(&geometry.edge_indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            MeshResource {
                vertex_buffer,
                index_buffer,
                edge_index_buffer,
                index_count: geometry.index_count(),
                edge_index_count: geometry.edge_index_count(),
                instances: InstanceBuffer::new(device, format!("{label} Instances"), baseline),
                edge_instances: InstanceBuffer::new(
                    device,
                    format!("{label} Edge Instances"),
                    baseline,
                ),
            }
        })
        .map_err(|err| InitError::new(InitStage::Resources, format!("{label} mesh: {err}")))?;

        log::debug!(
            "created {label} mesh: {} vertices, {} indices, {} edge indices",
            geometry.vertices.len(),
            resource.index_count,
            resource.edge_index_count
        );
        self.slots[mesh.index()] = Some(resource);
        Ok(())
    }

    pub fn get(&self, mesh: MeshType) -> Option<&MeshResource> {
        self.slots[mesh.index()].as_ref()
    }

    pub fn baseline(&self) -> u32 {
        self.baseline
    }

    /// Current instance capacity of `mesh` for `pass`, or 0 if the mesh was
    /// never created.
    pub fn capacity(&self, mesh: MeshType, pass: DrawPass) -> u32 {
        self.get(mesh)
            .map_or(0, |resource| resource.instance_buffer(pass).capacity())
    }

    /// Grows the instance buffer of `mesh` for `pass` to hold `needed`
    /// instances.
    pub fn ensure_instance_capacity(
        &mut self,
        device: &wgpu::Device,
        mesh: MeshType,
        pass: DrawPass,
        needed: u32,
    ) -> Result<(), RendererError> {
        let baseline = self.baseline;
        let resource = self.slots[mesh.index()]
            .as_mut()
            .ok_or_else(|| RendererError::ResourceGrowth {
                mesh,
                requested: needed,
                reason: "mesh was never created".to_string(),
            })?;

        resource
            .instance_buffer_mut(pass)
            .ensure_capacity(device, needed, baseline)
            .map_err(|reason| RendererError::ResourceGrowth {
                mesh,
                requested: needed,
                reason,
            })
    }

    /// Writes the instance payloads of `mesh` for `pass`.
    ///
    /// Call [`ensure_instance_capacity`](Self::ensure_instance_capacity) with
    /// `instances.len()` first.
    pub fn upload_instances(
        &self,
        queue: &wgpu::Queue,
        mesh: MeshType,
        pass: DrawPass,
        instances: &[Instance],
    ) {
        if let Some(resource) = self.get(mesh) {
            resource.instance_buffer(pass).upload(queue, instances);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_allocation_starts_at_baseline() {
        assert_eq!(grown_capacity(0, 0, 256), Some(256));
        assert_eq!(grown_capacity(0, 10, 256), Some(256));
        assert_eq!(grown_capacity(0, 0, 0), Some(1));
    }

    #[test]
    fn three_hundred_cubes_grow_baseline_to_512() {
        assert_eq!(grown_capacity(256, 300, 256), Some(512));
    }

    #[test]
    fn growth_picks_smallest_doubling_that_fits() {
        let baseline = 256;
        for needed in [1, 255, 256, 257, 511, 512, 513, 5000, 65_536, 100_000] {
            let capacity = grown_capacity(baseline, needed, baseline).unwrap();
            assert!(capacity >= needed);
            assert_eq!(capacity % baseline, 0);
            assert!((capacity / baseline).is_power_of_two());
            assert!(capacity == baseline || capacity / 2 < needed, "{needed} -> {capacity}");
        }
    }

    #[test]
    fn capacity_sequence_is_monotonic_and_reproducible() {
        let requests = [10, 300, 100, 1200, 0, 513, 4096, 2];
        let run = || {
            let mut capacity = 256;
            requests
                .iter()
                .map(|&needed| {
                    capacity = grown_capacity(capacity, needed, 256).unwrap();
                    capacity
                })
                .collect::<Vec<_>>()
        };

        let first = run();
        assert_eq!(first, run());
        assert_eq!(first, vec![256, 512, 512, 2048, 2048, 2048, 4096, 4096]);
        assert!(first.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(grown_capacity(1 << 31, u32::MAX, 256), None);
    }

    #[test]
    fn unknown_mesh_has_zero_capacity() {
        let registry = MeshRegistry::new(256);
        assert_eq!(registry.capacity(MeshType::Cube, DrawPass::Solid), 0);
        assert!(registry.get(MeshType::Cube).is_none());
    }
}

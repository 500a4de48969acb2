//! Per-frame draw requests.
//!
//! The application appends [`DrawRequest`]s in any order during a frame. At
//! render time the queue is grouped by mesh type in one pass, keeping the
//! append order of same-type requests, and then cleared.

use crate::mesh::{Instance, MeshType};

/// One mesh occurrence to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRequest {
    pub mesh: MeshType,
    pub instance: Instance,
}

/// Append-only list of draw requests for the current frame.
#[derive(Debug, Default)]
pub struct DrawQueue {
    requests: Vec<DrawRequest>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a request.
    pub fn append(&mut self, request: DrawRequest) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[DrawRequest] {
        &self.requests
    }

    /// Groups the queued instances by mesh type.
    ///
    /// The queue itself is left untouched; call [`clear`](Self::clear) once
    /// the frame is done with it.
    pub fn group_by_type(&self) -> GroupedDraws {
        let mut grouped = GroupedDraws::default();
        for request in &self.requests {
            grouped.groups[request.mesh.index()].push(request.instance);
        }
        grouped
    }

    /// Groups the queued instances by mesh type and empties the queue.
    pub fn drain_grouped_by_type(&mut self) -> GroupedDraws {
        let grouped = self.group_by_type();
        self.clear();
        grouped
    }

    /// Drops every queued request, keeping the allocation.
    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

/// Instances grouped per mesh type, in append order within each type.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GroupedDraws {
    groups: [Vec<Instance>; MeshType::COUNT],
}

impl GroupedDraws {
    /// Instances queued for `mesh`.
    pub fn instances(&self, mesh: MeshType) -> &[Instance] {
        &self.groups[mesh.index()]
    }

    /// Non-empty groups in [`MeshType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (MeshType, &[Instance])> + '_ {
        MeshType::ALL
            .into_iter()
            .map(|mesh| (mesh, self.instances(mesh)))
            .filter(|(_, instances)| !instances.is_empty())
    }

    /// Number of mesh types with at least one instance.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    /// Instance count for `mesh`.
    pub fn count(&self, mesh: MeshType) -> u32 {
        self.groups[mesh.index()].len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3, Vec4};

    fn request(mesh: MeshType, tag: f32) -> DrawRequest {
        DrawRequest {
            mesh,
            instance: Instance::new(Mat4::from_translation(Vec3::splat(tag)), Vec4::ONE),
        }
    }

    fn tags(instances: &[Instance]) -> Vec<f32> {
        instances.iter().map(|i| i.model[3][0]).collect()
    }

    #[test]
    fn grouping_is_stable_and_ordered_by_type() {
        let mut queue = DrawQueue::new();
        queue.append(request(MeshType::Sphere, 1.0));
        queue.append(request(MeshType::Cube, 2.0));
        queue.append(request(MeshType::Sphere, 3.0));
        queue.append(request(MeshType::Cube, 4.0));
        queue.append(request(MeshType::Cube, 5.0));

        let grouped = queue.drain_grouped_by_type();
        assert!(queue.is_empty());

        let order: Vec<_> = grouped.iter().map(|(mesh, _)| mesh).collect();
        assert_eq!(order, vec![MeshType::Cube, MeshType::Sphere]);
        assert_eq!(tags(grouped.instances(MeshType::Cube)), vec![2.0, 4.0, 5.0]);
        assert_eq!(tags(grouped.instances(MeshType::Sphere)), vec![1.0, 3.0]);
        assert_eq!(grouped.count(MeshType::Triangle), 0);
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn empty_queue_groups_to_nothing() {
        let mut queue = DrawQueue::new();
        let grouped = queue.drain_grouped_by_type();
        assert!(grouped.is_empty());
        assert_eq!(grouped.iter().count(), 0);
    }

    #[test]
    fn per_type_counts_match_appends() {
        let mut queue = DrawQueue::new();
        let pattern = [
            MeshType::Triangle,
            MeshType::Cube,
            MeshType::Cube,
            MeshType::Tetrahedron,
            MeshType::Sphere,
            MeshType::Cube,
        ];
        for (i, mesh) in pattern.iter().cycle().take(600).enumerate() {
            queue.append(request(*mesh, i as f32));
        }
        assert_eq!(queue.len(), 600);

        let grouped = queue.group_by_type();
        assert_eq!(grouped.count(MeshType::Triangle), 100);
        assert_eq!(grouped.count(MeshType::Cube), 300);
        assert_eq!(grouped.count(MeshType::Tetrahedron), 100);
        assert_eq!(grouped.count(MeshType::Sphere), 100);

        let cubes = tags(grouped.instances(MeshType::Cube));
        assert!(cubes.windows(2).all(|w| w[0] < w[1]));

        queue.clear();
        assert_eq!(queue.len(), 0);
    }
}

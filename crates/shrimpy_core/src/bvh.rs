//! Bounding Volume Hierarchy (BVH) construction.
//!
//! The tree is stored flat: nodes live in one array, the root is index 0 and
//! children are referenced by index. Traversal lives in the renderer; this
//! module only builds the array.

use bytemuck::{Pod, Zeroable};
use shrimpy_math::Aabb;

use crate::error::{SceneError, SceneResult};
use crate::primitives::Triangle;

/// Maximum triangles per leaf node before splitting.
pub const LEAF_MAX_SIZE: usize = 4;

/// Padding applied to flat node bounds (e.g. axis-aligned triangles).
const BOUNDS_PAD: f32 = 0.0001;

/// A BVH node in upload layout (64 bytes).
///
/// Either an internal node with two child indices, or a leaf referencing up
/// to four triangles. A `triangle_count` of 0 marks an internal node.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub triangle_count: u32,
    pub left: u32,
    pub right: u32,
    pub triangles: [u32; LEAF_MAX_SIZE],
    _pad0: [u32; 3],
}

impl BvhNode {
    /// Create an internal node.
    pub fn internal(bounds: Aabb, left: u32, right: u32) -> Self {
        Self {
            bounds,
            triangle_count: 0,
            left,
            right,
            triangles: [0; LEAF_MAX_SIZE],
            _pad0: [0; 3],
        }
    }

    /// Create a leaf node. At most [`LEAF_MAX_SIZE`] ids are kept.
    pub fn leaf(bounds: Aabb, triangle_ids: &[u32]) -> Self {
        let count = triangle_ids.len().min(LEAF_MAX_SIZE);
        let mut triangles = [0; LEAF_MAX_SIZE];
        triangles[..count].copy_from_slice(&triangle_ids[..count]);

        Self {
            bounds,
            triangle_count: count as u32,
            left: 0,
            right: 0,
            triangles,
            _pad0: [0; 3],
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.triangle_count > 0
    }

    /// Triangle ids referenced by a leaf (empty for internal nodes).
    #[inline]
    pub fn triangle_ids(&self) -> &[u32] {
        let count = (self.triangle_count as usize).min(LEAF_MAX_SIZE);
        &self.triangles[..count]
    }
}

/// Build a flat BVH over `triangles`.
///
/// Simple median-split approach: sort triangles by centroid on the longest
/// axis of the centroid bounds, split in half, recurse until a node holds
/// [`LEAF_MAX_SIZE`] or fewer. Parents are always stored before their
/// children. Fails if the tree would need more than `max_nodes` nodes.
pub fn build(triangles: &[Triangle], max_nodes: usize) -> SceneResult<Vec<BvhNode>> {
    if triangles.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids: Vec<u32> = (0..triangles.len() as u32).collect();
    let mut nodes = Vec::with_capacity(max_nodes.min(2 * triangles.len()));
    build_node(triangles, &mut ids, &mut nodes, max_nodes)?;

    log::debug!(
        "BVH built: {} triangles, {} nodes, depth {}",
        triangles.len(),
        nodes.len(),
        depth(&nodes)
    );

    Ok(nodes)
}

/// Recursive construction; returns the index of the created node.
fn build_node(
    triangles: &[Triangle],
    ids: &mut [u32],
    nodes: &mut Vec<BvhNode>,
    max_nodes: usize,
) -> SceneResult<u32> {
    if nodes.len() >= max_nodes {
        return Err(SceneError::CapacityExceeded {
            what: "BVH nodes",
            capacity: max_nodes,
        });
    }

    let bounds = ids
        .iter()
        .fold(Aabb::EMPTY, |acc, &id| {
            Aabb::surrounding(&acc, &triangles[id as usize].bounds())
        })
        .padded(BOUNDS_PAD);

    let index = nodes.len() as u32;

    // Create leaf for small sets
    if ids.len() <= LEAF_MAX_SIZE {
        nodes.push(BvhNode::leaf(bounds, ids));
        return Ok(index);
    }

    // Placeholder; patched once both children have indices.
    nodes.push(BvhNode::internal(bounds, 0, 0));

    // Choose split axis based on centroid spread
    let centroid_bounds = ids.iter().fold(Aabb::EMPTY, |acc, &id| {
        acc.include(triangles[id as usize].centroid())
    });
    let axis = centroid_bounds.longest_axis();

    ids.sort_unstable_by(|&a, &b| {
        let a_val = triangles[a as usize].centroid()[axis];
        let b_val = triangles[b as usize].centroid()[axis];
        a_val.total_cmp(&b_val)
    });

    // Split at midpoint
    let mid = ids.len() / 2;
    let (left_ids, right_ids) = ids.split_at_mut(mid);

    let left = build_node(triangles, left_ids, nodes, max_nodes)?;
    let right = build_node(triangles, right_ids, nodes, max_nodes)?;

    nodes[index as usize] = BvhNode::internal(bounds, left, right);
    Ok(index)
}

/// Depth of the tree rooted at node 0 (a lone leaf has depth 1).
pub fn depth(nodes: &[BvhNode]) -> usize {
    fn walk(nodes: &[BvhNode], index: usize, budget: usize) -> usize {
        match nodes.get(index) {
            Some(node) if budget > 0 && !node.is_leaf() => {
                1 + walk(nodes, node.left as usize, budget - 1)
                    .max(walk(nodes, node.right as usize, budget - 1))
            }
            Some(_) => 1,
            None => 0,
        }
    }
    walk(nodes, 0, nodes.len())
}

//! Stack-bounded BVH traversal.
//!
//! Nodes come from [`shrimpy_core::bvh::build`] (or any external builder)
//! as a flat array rooted at index 0. The walk is iterative with a fixed
//! 64-entry stack; a tree deep enough to overflow it is not an error, the
//! walk just stops and returns the nearest hit found so far.

use shrimpy_core::{BvhNode, Triangle};
use shrimpy_math::{Interval, Ray};

use crate::hittable::Hit;
use crate::triangle::hit_triangle;

/// Traversal stack depth.
pub const STACK_CAPACITY: usize = 64;

/// Nearest triangle hit within `range`, walking `nodes`.
///
/// Out-of-range node or triangle indices are skipped, and no more than
/// `nodes.len()` nodes are ever visited, so a malformed tree cannot loop.
pub fn hit_bvh(nodes: &[BvhNode], triangles: &[Triangle], ray: &Ray, range: Interval) -> Option<Hit> {
    if nodes.is_empty() {
        return None;
    }

    let mut stack = [0u32; STACK_CAPACITY];
    let mut len = 1;
    let mut range = range;
    let mut closest = None;
    let mut visited = 0;

    while len > 0 {
        len -= 1;
        let Some(node) = nodes.get(stack[len] as usize) else {
            continue;
        };

        visited += 1;
        if visited > nodes.len() {
            break;
        }

        match node.bounds.hit(ray) {
            Some(span) if span.min <= range.max => {}
            _ => continue,
        }

        if node.is_leaf() {
            for &id in node.triangle_ids() {
                let Some(triangle) = triangles.get(id as usize) else {
                    continue;
                };
                if let Some(hit) = hit_triangle(ray, triangle) {
                    if range.admits(hit.t) {
                        range = range.clamp_max(hit.t);
                        closest = Some(hit);
                    }
                }
            }
        } else {
            if len + 2 > STACK_CAPACITY {
                break;
            }
            stack[len] = node.right;
            stack[len + 1] = node.left;
            len += 2;
        }
    }

    closest
}

//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over primitive handles. Each level sorts its range by
//! bounding-box centroid along the longest axis and splits at the median.
//! Built once after the scene is assembled and never mutated afterwards.

use umbra_math::{Aabb, Interval, Ray};

use crate::hittable::{HitRecord, PrimitiveId};
use crate::primitive::Primitive;

/// BVH node - a branch with two children, a leaf with one primitive, or
/// nothing at all.
#[derive(Debug, Clone, PartialEq)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node holding a single primitive.
    Leaf { primitive: PrimitiveId, bbox: Aabb },
    /// Empty tree.
    Empty,
}

impl BvhNode {
    /// Recursive construction over a range of handles.
    fn build(primitives: &[Primitive], ids: &mut [PrimitiveId]) -> Self {
        match ids.len() {
            0 => BvhNode::Empty,
            1 => Self::leaf(primitives, ids[0]),
            2 => {
                let left = Self::leaf(primitives, ids[0]);
                let right = Self::leaf(primitives, ids[1]);
                let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());
                BvhNode::Branch {
                    left: Box::new(left),
                    right: Box::new(right),
                    bbox,
                }
            }
            n => {
                let bbox = ids.iter().fold(Aabb::EMPTY, |acc, id| {
                    Aabb::surrounding(&acc, &primitives[id.0].bounding_box())
                });
                let axis = bbox.longest_axis();

                ids.sort_unstable_by(|a, b| {
                    let a_val = primitives[a.0].bounding_box().centroid()[axis];
                    let b_val = primitives[b.0].bounding_box().centroid()[axis];
                    a_val
                        .partial_cmp(&b_val)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                let (left_ids, right_ids) = ids.split_at_mut(n / 2);
                let left = Self::build(primitives, left_ids);
                let right = Self::build(primitives, right_ids);

                BvhNode::Branch {
                    left: Box::new(left),
                    right: Box::new(right),
                    bbox,
                }
            }
        }
    }

    fn leaf(primitives: &[Primitive], id: PrimitiveId) -> Self {
        BvhNode::Leaf {
            primitive: id,
            bbox: primitives[id.0].bounding_box(),
        }
    }

    /// Nearest hit below this node within `ray_t`.
    pub fn hit(&self, primitives: &[Primitive], ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { primitive, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }
                primitives[primitive.0].hit(*primitive, ray, ray_t)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(primitives, ray, ray_t);

                // Only check right up to closest hit
                let right_max = hit_left.as_ref().map_or(ray_t.max, |rec| rec.t);
                let hit_right = right.hit(primitives, ray, ray_t.with_max(right_max));

                hit_right.or(hit_left)
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    fn count(&self) -> (usize, usize) {
        match self {
            BvhNode::Empty => (0, 0),
            BvhNode::Leaf { .. } => (1, 1),
            BvhNode::Branch { left, right, .. } => {
                let (left_nodes, left_depth) = left.count();
                let (right_nodes, right_depth) = right.count();
                (left_nodes + right_nodes + 1, left_depth.max(right_depth) + 1)
            }
        }
    }
}

/// BVH over a primitive arena.
#[derive(Debug, Clone)]
pub struct Bvh {
    root: BvhNode,
    node_count: usize,
    depth: usize,
}

impl Bvh {
    /// Build a hierarchy over every primitive in the slice.
    pub fn build(primitives: &[Primitive]) -> Self {
        let mut ids: Vec<PrimitiveId> = (0..primitives.len()).map(PrimitiveId).collect();
        let root = BvhNode::build(primitives, &mut ids);
        let (node_count, depth) = root.count();

        log::debug!(
            "Built BVH: {} primitives, {} nodes, depth {}",
            primitives.len(),
            node_count,
            depth
        );

        Self {
            root,
            node_count,
            depth,
        }
    }

    /// Nearest hit within `ray_t`. `primitives` must be the slice the tree
    /// was built from.
    #[inline]
    pub fn hit(&self, primitives: &[Primitive], ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.root.hit(primitives, ray, ray_t)
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    pub fn bounding_box(&self) -> Aabb {
        self.root.bounding_box()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::MaterialId;
    use crate::sphere::Sphere;
    use umbra_math::Vec3;

    fn spheres_along_x(count: usize) -> Vec<Primitive> {
        (0..count)
            .map(|i| Primitive::new(Sphere::new(Vec3::new(i as f32, 0.0, -5.0), 0.4), MaterialId(0)))
            .collect()
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(&[]);
        assert!(matches!(bvh.root(), BvhNode::Empty));
        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        assert!(bvh.hit(&[], &ray, Interval::new(0.001, f32::INFINITY)).is_none());
    }

    #[test]
    fn test_bvh_single_and_pair() {
        let one = spheres_along_x(1);
        assert!(matches!(Bvh::build(&one).root(), BvhNode::Leaf { .. }));

        let two = spheres_along_x(2);
        let bvh = Bvh::build(&two);
        match bvh.root() {
            BvhNode::Branch { left, right, .. } => {
                // Pairs keep insertion order.
                assert!(matches!(**left, BvhNode::Leaf { primitive: PrimitiveId(0), .. }));
                assert!(matches!(**right, BvhNode::Leaf { primitive: PrimitiveId(1), .. }));
            }
            other => panic!("expected branch, got {:?}", other),
        }
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let primitives = spheres_along_x(10);
        let bvh = Bvh::build(&primitives);

        assert_eq!(bvh.node_count(), 19);
        assert!(bvh.depth() <= 5);

        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = bvh
            .hit(&primitives, &ray, Interval::new(0.001, f32::INFINITY))
            .expect("should hit sphere at x=5");

        assert_eq!(rec.primitive, PrimitiveId(5));
        assert!((rec.p.z - (-4.6)).abs() < 0.01);
    }

    #[test]
    fn test_nearest_of_overlapping_hits() {
        // Two spheres on the same line of sight; the nearer one must win
        // regardless of which subtree holds it.
        let primitives = vec![
            Primitive::new(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0), MaterialId(0)),
            Primitive::new(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0), MaterialId(1)),
            Primitive::new(Sphere::new(Vec3::new(5.0, 0.0, -3.0), 1.0), MaterialId(0)),
        ];
        let bvh = Bvh::build(&primitives);

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let rec = bvh
            .hit(&primitives, &ray, Interval::new(0.001, f32::INFINITY))
            .expect("hit");
        assert_eq!(rec.primitive, PrimitiveId(1));
        assert_eq!(rec.material, MaterialId(1));
        assert!((rec.t - 2.0).abs() < 1e-4);
    }
}

use crate::geometry::{Interaction, SceneObject, EPSILON};
use crate::math::bbox::BBox3;
use crate::math::ray::Ray;
use crate::math::vector::Vec3;

use arrayvec::ArrayVec;
use order_stat::kth_by;
use partition::partition;

// Traversal never goes deeper than the tree, and the midpoint/median split
// halves every range, so this bounds any realistic scene:
const STACK_SIZE: usize = 64;

/// A node in the flattened arena. Children of an interior node are adjacent
/// in the arena: the right child always lives at `left_child + 1`, so only
/// the left index is stored.
#[derive(Clone, Copy, Debug)]
struct Node {
    bound: BBox3<f64>,
    kind: NodeKind,
}

#[derive(Clone, Copy, Debug)]
enum NodeKind {
    Leaf {
        // Range into the BVH's reordered object array:
        start: u32,
        count: u32,
    },
    Interior {
        left_child: u32,
    },
}

// Structure used while constructing the BVH:
#[derive(Clone, Copy)]
struct ObjectInfo {
    index: u32,
    bound: BBox3<f64>,
    centroid: Vec3<f64>,
}

#[derive(Clone, Copy)]
struct StackItem {
    node: u32,
    // Entry distance into the node's bound, used to prune backtracking:
    t: f64,
}

/// A bounding-volume hierarchy over a set of scene objects.
///
/// Construction clones the objects into the BVH's own reordered array (the
/// caller's sequence is never touched); nodes live in one append-only arena
/// and reference each other by index, never by address.
pub struct BVH<O: SceneObject> {
    objects: Vec<O>,
    nodes: Vec<Node>,
}

impl<O: SceneObject> BVH<O> {
    /// Ranges at or below this size become leaves.
    pub const DEFAULT_THRESHOLD: usize = 2;

    pub fn new(objects: &[O]) -> Self {
        Self::with_threshold(objects, Self::DEFAULT_THRESHOLD)
    }

    /// An empty object sequence builds successfully; every query against it
    /// reports no hit.
    pub fn with_threshold(objects: &[O], threshold: usize) -> Self {
        let threshold = threshold.max(1);

        if objects.is_empty() {
            return BVH {
                objects: Vec::new(),
                nodes: Vec::new(),
            };
        }

        // Record the object information we need for splitting:
        let mut object_infos: Vec<_> = objects
            .iter()
            .enumerate()
            .map(|(index, object)| ObjectInfo {
                index: index as u32,
                bound: object.get_bound(),
                centroid: object.get_centroid(),
            })
            .collect();

        let world_bound = range_bound(&object_infos);

        let mut nodes = Vec::new();
        let mut ordered = Vec::with_capacity(objects.len());
        nodes.push(Node {
            bound: world_bound,
            kind: NodeKind::Leaf { start: 0, count: 0 },
        });
        Self::build_recursive(
            &mut object_infos,
            objects,
            &mut ordered,
            &mut nodes,
            0,
            threshold,
        );

        nodes.shrink_to_fit();

        BVH {
            objects: ordered,
            nodes,
        }
    }

    pub fn get_bound(&self) -> BBox3<f64> {
        match self.nodes.first() {
            Some(node) => node.bound,
            None => BBox3::new(),
        }
    }

    /// The objects in leaf order. Concatenating the leaf ranges in arena
    /// order walks this array front to back.
    pub fn get_objects(&self) -> &[O] {
        &self.objects
    }

    fn build_recursive(
        infos: &mut [ObjectInfo],
        objects: &[O],
        ordered: &mut Vec<O>,
        nodes: &mut Vec<Node>,
        node_index: usize,
        threshold: usize,
    ) {
        if infos.len() <= threshold {
            let start = ordered.len() as u32;
            ordered.extend(infos.iter().map(|info| objects[info.index as usize].clone()));
            nodes[node_index].kind = NodeKind::Leaf {
                start,
                count: infos.len() as u32,
            };
            return;
        }

        // Split along the axis with the widest centroid spread, at the
        // midpoint of that spread:
        let centroid_bound = infos
            .iter()
            .fold(BBox3::new(), |bound, info| bound.combine_pnt(info.centroid));
        let axis = centroid_bound.diagonal().max_dim();
        let mid_point = (centroid_bound.pmin[axis] + centroid_bound.pmax[axis]) / 2.0;

        let split = {
            let (left, _right) = partition(&mut *infos, |info| info.centroid[axis] <= mid_point);
            left.len()
        };

        // All the centroids landed on one side of the midpoint; fall back
        // to a median split so neither half is empty and recursion always
        // terminates:
        let split = if split == 0 || split == infos.len() {
            let mid_index = infos.len() / 2;
            kth_by(infos, mid_index, |a, b| {
                a.centroid[axis].partial_cmp(&b.centroid[axis]).unwrap()
            });
            mid_index
        } else {
            split
        };

        let (left_infos, right_infos) = infos.split_at_mut(split);

        let left_child = nodes.len();
        nodes.push(Node {
            bound: range_bound(left_infos),
            kind: NodeKind::Leaf { start: 0, count: 0 },
        });
        nodes.push(Node {
            bound: range_bound(right_infos),
            kind: NodeKind::Leaf { start: 0, count: 0 },
        });
        nodes[node_index].kind = NodeKind::Interior {
            left_child: left_child as u32,
        };

        Self::build_recursive(left_infos, objects, ordered, nodes, left_child, threshold);
        Self::build_recursive(
            right_infos,
            objects,
            ordered,
            nodes,
            left_child + 1,
            threshold,
        );
    }

    /// Closest-hit query.
    pub fn intersect(&self, ray: Ray<f64>) -> Option<(Interaction, &O)> {
        if self.nodes.is_empty() {
            return None;
        }
        self.nodes[0].bound.intersect(ray)?;

        let mut stack = ArrayVec::<[StackItem; STACK_SIZE]>::new();
        let mut current = 0usize;
        let mut best_t = f64::INFINITY;
        let mut best: Option<&O> = None;

        'walk: loop {
            match self.nodes[current].kind {
                NodeKind::Leaf { start, count } => {
                    let start = start as usize;
                    for object in &self.objects[start..start + count as usize] {
                        if let Some(t) = object.intersect(ray) {
                            if t < best_t {
                                best_t = t;
                                best = Some(object);
                            }
                        }
                    }
                }
                NodeKind::Interior { left_child } => {
                    let left = left_child as usize;
                    let right = left + 1;
                    let t_left = self.nodes[left].bound.intersect(ray);
                    let t_right = self.nodes[right].bound.intersect(ray);

                    match (t_left, t_right) {
                        (Some(tl), Some(tr)) => {
                            // Visit the nearer child first; the farther one
                            // waits on the stack with its entry distance:
                            let (near, far, t_far) = if tl <= tr {
                                (left, right, tr)
                            } else {
                                (right, left, tl)
                            };
                            stack.push(StackItem {
                                node: far as u32,
                                t: t_far,
                            });
                            current = near;
                            continue 'walk;
                        }
                        (Some(_), None) => {
                            current = left;
                            continue 'walk;
                        }
                        (None, Some(_)) => {
                            current = right;
                            continue 'walk;
                        }
                        (None, None) => {}
                    }
                }
            }

            // Backtrack. A popped node whose entry distance cannot beat the
            // running best is skipped without descending:
            current = loop {
                match stack.pop() {
                    Some(item) => {
                        if item.t < best_t {
                            break item.node as usize;
                        }
                    }
                    None => break 'walk,
                }
            };
        }

        best.map(|object| {
            (
                Interaction {
                    p: ray.point_at(best_t),
                    t: best_t,
                },
                object,
            )
        })
    }

    /// Shadow query: the direction's magnitude is the distance to the
    /// occlusion target. Returns true the moment any object hits strictly
    /// nearer than that; there is no need to find the nearest one.
    pub fn intersect_test(&self, ray: Ray<f64>) -> bool {
        if self.nodes.is_empty() {
            return false;
        }

        let target_t = ray.dir.length();
        if target_t == 0.0 {
            return false;
        }
        let ray = Ray::new(ray.org, ray.dir.scale(1.0 / target_t));

        if self.nodes[0].bound.intersect(ray).is_none() {
            return false;
        }

        // The same walk as the closest-hit query, with the running best
        // pinned to the target distance:
        let mut stack = ArrayVec::<[StackItem; STACK_SIZE]>::new();
        let mut current = 0usize;

        'walk: loop {
            match self.nodes[current].kind {
                NodeKind::Leaf { start, count } => {
                    let start = start as usize;
                    for object in &self.objects[start..start + count as usize] {
                        if let Some(t) = object.intersect(ray) {
                            if t < target_t {
                                return true;
                            }
                        }
                    }
                }
                NodeKind::Interior { left_child } => {
                    let left = left_child as usize;
                    let right = left + 1;
                    let t_left = self.nodes[left].bound.intersect(ray);
                    let t_right = self.nodes[right].bound.intersect(ray);

                    match (t_left, t_right) {
                        (Some(tl), Some(tr)) => {
                            let (near, far, t_far) = if tl <= tr {
                                (left, right, tr)
                            } else {
                                (right, left, tl)
                            };
                            stack.push(StackItem {
                                node: far as u32,
                                t: t_far,
                            });
                            current = near;
                            continue 'walk;
                        }
                        (Some(_), None) => {
                            current = left;
                            continue 'walk;
                        }
                        (None, Some(_)) => {
                            current = right;
                            continue 'walk;
                        }
                        (None, None) => {}
                    }
                }
            }

            current = loop {
                match stack.pop() {
                    Some(item) => {
                        if item.t < target_t {
                            break item.node as usize;
                        }
                    }
                    None => break 'walk,
                }
            };
        }

        false
    }
}

fn range_bound(infos: &[ObjectInfo]) -> BBox3<f64> {
    infos
        .iter()
        .fold(BBox3::new(), |bound, info| bound.combine_bnd(info.bound))
        .inflate(EPSILON)
}

pub mod bvh;
pub mod grid;

pub use self::bvh::BVH;
pub use self::grid::Grid;

use crate::geometry::{Interaction, SceneObject};
use crate::math::ray::Ray;

/// Which acceleration structure to build for a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceleratorKind {
    /// No spatial structure; every query scans the full object list.
    Linear,
    Grid,
    BVH,
}

/// A built acceleration structure, carried explicitly through the query
/// path: callers pass this value around instead of consulting some global
/// selection.
///
/// All three variants answer the same two queries with the same contract,
/// and are read-only once built, so independent queries may run against one
/// concurrently.
pub enum Accelerator<O: SceneObject> {
    Linear(Vec<O>),
    Grid(Grid<O>),
    BVH(BVH<O>),
}

impl<O: SceneObject> Accelerator<O> {
    pub fn build(kind: AcceleratorKind, objects: &[O]) -> Self {
        match kind {
            AcceleratorKind::Linear => Accelerator::Linear(objects.to_vec()),
            AcceleratorKind::Grid => Accelerator::Grid(Grid::new(objects)),
            AcceleratorKind::BVH => Accelerator::BVH(BVH::new(objects)),
        }
    }

    pub fn kind(&self) -> AcceleratorKind {
        match self {
            Accelerator::Linear(_) => AcceleratorKind::Linear,
            Accelerator::Grid(_) => AcceleratorKind::Grid,
            Accelerator::BVH(_) => AcceleratorKind::BVH,
        }
    }

    /// Closest-hit query.
    pub fn intersect(&self, ray: Ray<f64>) -> Option<(Interaction, &O)> {
        match self {
            Accelerator::Linear(objects) => linear_intersect(objects, ray),
            Accelerator::Grid(grid) => grid.intersect(ray),
            Accelerator::BVH(bvh) => bvh.intersect(ray),
        }
    }

    /// Shadow query; the ray direction's magnitude encodes the distance to
    /// the occlusion target.
    pub fn intersect_test(&self, ray: Ray<f64>) -> bool {
        match self {
            Accelerator::Linear(objects) => linear_intersect_test(objects, ray),
            Accelerator::Grid(grid) => grid.intersect_test(ray),
            Accelerator::BVH(bvh) => bvh.intersect_test(ray),
        }
    }
}

// The unaccelerated reference path: scan everything, keep the nearest.
fn linear_intersect<O: SceneObject>(objects: &[O], ray: Ray<f64>) -> Option<(Interaction, &O)> {
    let mut best_t = f64::INFINITY;
    let mut best: Option<&O> = None;

    for object in objects {
        if let Some(t) = object.intersect(ray) {
            if t < best_t {
                best_t = t;
                best = Some(object);
            }
        }
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

fn linear_intersect_test<O: SceneObject>(objects: &[O], ray: Ray<f64>) -> bool {
    let target_t = ray.dir.length();
    if target_t == 0.0 {
        return false;
    }
    let ray = Ray::new(ray.org, ray.dir.scale(1.0 / target_t));

    objects.iter().any(|object| match object.intersect(ray) {
        Some(t) => t < target_t,
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{AaBox, Primitive, Sphere, Triangle};
    use crate::math::vector::Vec3;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    // A mixed scene with every primitive kind in it:
    fn mixed_scene(seed: u64) -> Vec<Primitive> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut objects = Vec::new();

        for _ in 0..24 {
            objects.push(Primitive::Sphere(Sphere::new(
                Vec3 {
                    x: rng.gen_range(-8.0, 8.0),
                    y: rng.gen_range(-8.0, 8.0),
                    z: rng.gen_range(-8.0, 8.0),
                },
                rng.gen_range(0.2, 1.5),
            )));
        }
        objects.push(Primitive::AaBox(AaBox::new(
            Vec3 {
                x: -2.0,
                y: -6.0,
                z: -2.0,
            },
            Vec3 {
                x: 2.0,
                y: -5.0,
                z: 2.0,
            },
        )));
        objects.push(Primitive::Triangle(Triangle::new(
            Vec3 {
                x: -4.0,
                y: 4.0,
                z: 0.0,
            },
            Vec3 {
                x: 4.0,
                y: 4.0,
                z: 0.0,
            },
            Vec3 {
                x: 0.0,
                y: 4.0,
                z: 6.0,
            },
        )));

        objects
    }

    fn ray_fan(seed: u64, count: usize) -> Vec<Ray<f64>> {
        let mut rng = Pcg32::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                Ray::new(
                    Vec3 {
                        x: rng.gen_range(-12.0, 12.0),
                        y: rng.gen_range(-12.0, 12.0),
                        z: 12.0,
                    },
                    Vec3 {
                        x: rng.gen_range(-0.3, 0.3),
                        y: rng.gen_range(-0.3, 0.3),
                        z: -1.0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn strategies_agree_on_closest_hits() {
        let objects = mixed_scene(3);
        let linear = Accelerator::build(AcceleratorKind::Linear, &objects);
        let grid = Accelerator::build(AcceleratorKind::Grid, &objects);
        let bvh = Accelerator::build(AcceleratorKind::BVH, &objects);

        let mut hits = 0;
        for ray in ray_fan(5, 200) {
            let reference = linear.intersect(ray).map(|(i, _)| i.t);
            let from_grid = grid.intersect(ray).map(|(i, _)| i.t);
            let from_bvh = bvh.intersect(ray).map(|(i, _)| i.t);

            match (reference, from_grid, from_bvh) {
                (Some(a), Some(b), Some(c)) => {
                    assert!((a - b).abs() < 1e-9);
                    assert!((a - c).abs() < 1e-9);
                    hits += 1;
                }
                (None, None, None) => {}
                other => panic!("strategies disagree: {:?}", other),
            }
        }
        // The fan is aimed at the scene, so a healthy share must connect:
        assert!(hits > 10);
    }

    #[test]
    fn strategies_agree_on_shadow_queries() {
        let objects = mixed_scene(7);
        let linear = Accelerator::build(AcceleratorKind::Linear, &objects);
        let grid = Accelerator::build(AcceleratorKind::Grid, &objects);
        let bvh = Accelerator::build(AcceleratorKind::BVH, &objects);

        let light = Vec3 {
            x: 0.0,
            y: 20.0,
            z: 0.0,
        };
        let mut rng = Pcg32::seed_from_u64(13);
        let mut occluded = 0;

        for _ in 0..200 {
            let from = Vec3 {
                x: rng.gen_range(-10.0, 10.0),
                y: rng.gen_range(-10.0, 10.0),
                z: rng.gen_range(-10.0, 10.0),
            };
            let ray = Ray::new(from, light - from);

            let reference = linear.intersect_test(ray);
            assert_eq!(reference, grid.intersect_test(ray));
            assert_eq!(reference, bvh.intersect_test(ray));
            if reference {
                occluded += 1;
            }
        }
        assert!(occluded > 5);
    }

    #[test]
    fn kind_reports_the_strategy() {
        let objects = mixed_scene(1);
        assert_eq!(
            Accelerator::build(AcceleratorKind::BVH, &objects).kind(),
            AcceleratorKind::BVH
        );
        assert_eq!(
            Accelerator::build(AcceleratorKind::Grid, &objects).kind(),
            AcceleratorKind::Grid
        );
    }

    #[test]
    fn reference_scene_works_by_reference() {
        // The structures never own the scene's primitives; building over
        // references leaves the originals untouched:
        let objects = mixed_scene(9);
        let refs: Vec<&Primitive> = objects.iter().collect();
        let bvh = Accelerator::build(AcceleratorKind::BVH, &refs);

        let ray = Ray::new(
            Vec3 {
                x: 0.0,
                y: -5.5,
                z: 12.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: -1.0,
            },
        );
        let linear = Accelerator::build(AcceleratorKind::Linear, &objects);
        let direct = linear.intersect(ray);
        let through_refs = bvh.intersect(ray);
        assert_eq!(direct.map(|(i, _)| i.t), through_refs.map(|(i, _)| i.t));
    }
}

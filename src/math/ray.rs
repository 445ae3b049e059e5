use crate::math::vector::Vec3;

use num_traits::Float;

/// A ray used to intersect a scene.
///
/// The direction is not required to be unit length: closest-hit distances
/// are parametric in whatever magnitude it carries. Shadow queries go one
/// step further and use the magnitude as the distance to the occlusion
/// target (see the accelerator `intersect_test` methods).
#[derive(Clone, Copy, Debug)]
pub struct Ray<T: Float> {
    /// The origin point of the ray.
    pub org: Vec3<T>,
    /// The direction vector of the ray.
    pub dir: Vec3<T>,
}

impl<T: Float> Ray<T> {
    pub fn new(org: Vec3<T>, dir: Vec3<T>) -> Self {
        Ray { org, dir }
    }

    /// Calculates a point along the ray given a parametric parameter.
    pub fn point_at(self, t: T) -> Vec3<T> {
        self.org + self.dir.scale(t)
    }
}

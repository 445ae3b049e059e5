use crate::geometry::{SceneObject, DET_EPSILON, EPSILON};
use crate::math::bbox::BBox3;
use crate::math::ray::Ray;
use crate::math::vector::Vec3;

/// A triangle with precomputed edge vectors and face normal.
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub points: [Vec3<f64>; 3],
    p0p1: Vec3<f64>,
    p0p2: Vec3<f64>,
    normal: Vec3<f64>,
    bound: BBox3<f64>,
}

impl Triangle {
    pub fn new(p0: Vec3<f64>, p1: Vec3<f64>, p2: Vec3<f64>) -> Self {
        let p0p1 = p1 - p0;
        let p0p2 = p2 - p0;

        // Winding here has to agree with the positive-determinant side of
        // the intersection test below:
        let normal = (p2 - p1).cross(p2 - p0).scale(-1.0).normalize();

        let bound = BBox3::from_pnts(p0.min(p1).min(p2), p0.max(p1).max(p2)).inflate(EPSILON);

        Triangle {
            points: [p0, p1, p2],
            p0p1,
            p0p2,
            normal,
            bound,
        }
    }
}

impl SceneObject for Triangle {
    fn get_bound(&self) -> BBox3<f64> {
        self.bound
    }

    // Ray/triangle intersection test using the Tomas Moller-Ben Trumbore
    // algorithm.
    fn intersect(&self, ray: Ray<f64>) -> Option<f64> {
        let pvec = ray.dir.cross(self.p0p2);
        let det = self.p0p1.dot(pvec);

        // Near-parallel, degenerate, or approaching the back face:
        if det < DET_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.org - self.points[0];
        let u = tvec.dot(pvec) * inv_det;
        if u < 0.0 || u > 1.0 {
            return None;
        }

        let qvec = tvec.cross(self.p0p1);
        let v = ray.dir.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = self.p0p2.dot(qvec) * inv_det;
        if t > 0.0 {
            Some(t)
        } else {
            None
        }
    }

    fn normal_at(&self, _p: Vec3<f64>) -> Vec3<f64> {
        self.normal
    }
}

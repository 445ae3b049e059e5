use crate::geometry::{SceneObject, DET_EPSILON, EPSILON};
use crate::math::bbox::BBox3;
use crate::math::ray::Ray;
use crate::math::vector::Vec3;

/// A plane is unbounded, so its "bounding box" is a large finite slab; the
/// spatial structures stay well-defined and merely coarsen when one is
/// present.
pub const PLANE_EXTENT: f64 = 1.0e6;

/// An infinite plane: unit normal, signed offset, and a point on the plane.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3<f64>,
    pub d: f64,
    point: Vec3<f64>,
}

impl Plane {
    /// Builds the plane through three points, counter-clockwise. A colinear
    /// triple yields a degenerate plane that reports no hits.
    pub fn from_points(p0: Vec3<f64>, p1: Vec3<f64>, p2: Vec3<f64>) -> Self {
        let p01 = (p1 - p0).normalize();
        let p02 = (p2 - p0).normalize();
        let n = p01.cross(p02);

        if n.length2() < DET_EPSILON {
            return Plane {
                normal: Vec3::zero(),
                d: 0.0,
                point: p0,
            };
        }

        let normal = n.normalize();
        Plane {
            normal,
            d: -normal.dot(p0),
            point: p0,
        }
    }

    pub fn from_normal(normal: Vec3<f64>, d: f64) -> Self {
        let normal = normal.normalize();
        Plane {
            normal,
            d,
            point: normal.scale(-d),
        }
    }
}

impl SceneObject for Plane {
    fn get_bound(&self) -> BBox3<f64> {
        BBox3::from_pnts(
            Vec3 {
                x: -PLANE_EXTENT,
                y: -PLANE_EXTENT,
                z: -PLANE_EXTENT,
            },
            Vec3 {
                x: PLANE_EXTENT,
                y: PLANE_EXTENT,
                z: PLANE_EXTENT,
            },
        )
    }

    fn intersect(&self, ray: Ray<f64>) -> Option<f64> {
        // Only a ray approaching the front face (negative denominator) can
        // hit; the floor on t guards against self-intersection.
        let denominator = self.normal.dot(ray.dir);
        if denominator < 0.0 {
            let t = (self.point - ray.org).dot(self.normal) / denominator;
            if t > EPSILON {
                return Some(t);
            }
        }
        None
    }

    fn normal_at(&self, _p: Vec3<f64>) -> Vec3<f64> {
        self.normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The y = 0 ground plane with a +y normal:
    fn ground() -> Plane {
        Plane::from_points(
            Vec3::zero(),
            Vec3 {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: -1.0,
            },
        )
    }

    #[test]
    fn construction_from_points() {
        let p = ground();
        assert!((p.normal.y - 1.0).abs() < 1e-9);
        assert!(p.d.abs() < 1e-9);
    }

    #[test]
    fn front_face_hit() {
        let ray = Ray::new(
            Vec3 {
                x: 0.0,
                y: 2.0,
                z: 0.0,
            },
            Vec3 {
                x: 0.0,
                y: -1.0,
                z: 0.0,
            },
        );
        let t = ground().intersect(ray).unwrap();
        assert!((t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn back_face_and_parallel_rejected() {
        // From below, the denominator is positive:
        let from_below = Ray::new(
            Vec3 {
                x: 0.0,
                y: -2.0,
                z: 0.0,
            },
            Vec3 {
                x: 0.0,
                y: 1.0,
                z: 0.0,
            },
        );
        assert!(ground().intersect(from_below).is_none());

        let parallel = Ray::new(
            Vec3 {
                x: 0.0,
                y: 2.0,
                z: 0.0,
            },
            Vec3 {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
        );
        assert!(ground().intersect(parallel).is_none());
    }

    #[test]
    fn receding_ray_rejected() {
        let away = Ray::new(
            Vec3 {
                x: 0.0,
                y: 2.0,
                z: 0.0,
            },
            Vec3 {
                x: 0.0,
                y: 1.0,
                z: 0.0,
            },
        );
        assert!(ground().intersect(away).is_none());
    }

    #[test]
    fn degenerate_plane_never_hits() {
        let bad = Plane::from_points(
            Vec3::zero(),
            Vec3 {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
            Vec3 {
                x: 2.0,
                y: 0.0,
                z: 0.0,
            },
        );
        let ray = Ray::new(
            Vec3 {
                x: 0.0,
                y: 2.0,
                z: 0.0,
            },
            Vec3 {
                x: 0.0,
                y: -1.0,
                z: 0.0,
            },
        );
        assert!(bad.intersect(ray).is_none());
    }
}

use crate::geometry::{SceneObject, EPSILON};
use crate::math::bbox::BBox3;
use crate::math::ray::Ray;
use crate::math::vector::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub center: Vec3<f64>,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Vec3<f64>, radius: f64) -> Self {
        Sphere { center, radius }
    }
}

impl SceneObject for Sphere {
    fn get_bound(&self) -> BBox3<f64> {
        let r = Vec3 {
            x: self.radius,
            y: self.radius,
            z: self.radius,
        };
        BBox3::from_pnts(self.center - r, self.center + r).inflate(EPSILON)
    }

    fn get_centroid(&self) -> Vec3<f64> {
        self.center
    }

    fn intersect(&self, ray: Ray<f64>) -> Option<f64> {
        let oc = ray.org - self.center;
        let a = ray.dir.dot(ray.dir);
        let b = oc.dot(ray.dir);
        let c = oc.dot(oc) - self.radius * self.radius;

        // Tangent rays (and zero-radius spheres) fall out here:
        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt() / a;
        let b = -b / a;

        let t0 = b - sqrt_d;
        if t0 >= 0.0 {
            return Some(t0);
        }

        // The nearer root is behind the origin; the ray starts inside the
        // sphere if the farther one is still ahead:
        let t1 = b + sqrt_d;
        if t1 >= 0.0 {
            return Some(t1);
        }

        None
    }

    fn normal_at(&self, p: Vec3<f64>) -> Vec3<f64> {
        (p - self.center).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere() -> Sphere {
        Sphere::new(Vec3::zero(), 1.0)
    }

    #[test]
    fn head_on_hit() {
        let ray = Ray::new(
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: 5.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: -1.0,
            },
        );
        let t = unit_sphere().intersect(ray).unwrap();
        assert!((t - 4.0).abs() < 1e-9);

        let p = ray.point_at(t);
        assert!((p.z - 1.0).abs() < 1e-9);

        let n = unit_sphere().normal_at(p);
        assert!((n.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn origin_inside_picks_far_root() {
        let ray = Ray::new(
            Vec3::zero(),
            Vec3 {
                x: 0.0,
                y: 1.0,
                z: 0.0,
            },
        );
        let t = unit_sphere().intersect(ray).unwrap();
        assert!((t - 1.0).abs() < 1e-9);
    }

    #[test]
    fn miss_behind_and_tangent() {
        let behind = Ray::new(
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: 5.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: 1.0,
            },
        );
        assert!(unit_sphere().intersect(behind).is_none());

        let off_axis = Ray::new(
            Vec3 {
                x: 3.0,
                y: 0.0,
                z: 5.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: -1.0,
            },
        );
        assert!(unit_sphere().intersect(off_axis).is_none());

        // Exactly grazing: the discriminant is zero, which counts as a miss.
        let tangent = Ray::new(
            Vec3 {
                x: 1.0,
                y: 0.0,
                z: 5.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: -1.0,
            },
        );
        assert!(unit_sphere().intersect(tangent).is_none());
    }

    #[test]
    fn zero_radius_never_hits() {
        let degenerate = Sphere::new(Vec3::zero(), 0.0);
        let ray = Ray::new(
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: 5.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: -1.0,
            },
        );
        assert!(degenerate.intersect(ray).is_none());
    }

    #[test]
    fn unscaled_direction_scales_distance() {
        // t is parametric in the direction's own magnitude:
        let ray = Ray::new(
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: 5.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: -2.0,
            },
        );
        let t = unit_sphere().intersect(ray).unwrap();
        assert!((t - 2.0).abs() < 1e-9);
    }
}

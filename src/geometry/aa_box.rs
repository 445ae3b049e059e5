use crate::geometry::SceneObject;
use crate::math::bbox::BBox3;
use crate::math::ray::Ray;
use crate::math::vector::Vec3;

/// An axis-aligned box as scene geometry (as opposed to `BBox3`, which is a
/// bounding volume: this one has a surface with outward normals).
#[derive(Clone, Copy, Debug)]
pub struct AaBox {
    pub pmin: Vec3<f64>,
    pub pmax: Vec3<f64>,
}

fn axis_normal(axis: usize, sign: f64) -> Vec3<f64> {
    match axis {
        0 => Vec3 {
            x: sign,
            y: 0.0,
            z: 0.0,
        },
        1 => Vec3 {
            x: 0.0,
            y: sign,
            z: 0.0,
        },
        _ => Vec3 {
            x: 0.0,
            y: 0.0,
            z: sign,
        },
    }
}

impl AaBox {
    pub fn new(pmin: Vec3<f64>, pmax: Vec3<f64>) -> Self {
        AaBox { pmin, pmax }
    }

    /// Slab test that also tracks which face the ray enters and leaves
    /// through. Outside the box the entry face wins; starting inside, the
    /// hit is the exit face instead.
    pub fn intersect_with_normal(&self, ray: Ray<f64>) -> Option<(f64, Vec3<f64>)> {
        let a = 1.0 / ray.dir.x;
        let (tx_min, tx_max) = if a >= 0.0 {
            ((self.pmin.x - ray.org.x) * a, (self.pmax.x - ray.org.x) * a)
        } else {
            ((self.pmax.x - ray.org.x) * a, (self.pmin.x - ray.org.x) * a)
        };

        let b = 1.0 / ray.dir.y;
        let (ty_min, ty_max) = if b >= 0.0 {
            ((self.pmin.y - ray.org.y) * b, (self.pmax.y - ray.org.y) * b)
        } else {
            ((self.pmax.y - ray.org.y) * b, (self.pmin.y - ray.org.y) * b)
        };

        let c = 1.0 / ray.dir.z;
        let (tz_min, tz_max) = if c >= 0.0 {
            ((self.pmin.z - ray.org.z) * c, (self.pmax.z - ray.org.z) * c)
        } else {
            ((self.pmax.z - ray.org.z) * c, (self.pmin.z - ray.org.z) * c)
        };

        // Largest entering t value, and the face it enters through:
        let (mut t_enter, mut face_in) = if tx_min > ty_min {
            (tx_min, axis_normal(0, if a >= 0.0 { -1.0 } else { 1.0 }))
        } else {
            (ty_min, axis_normal(1, if b >= 0.0 { -1.0 } else { 1.0 }))
        };
        if tz_min > t_enter {
            t_enter = tz_min;
            face_in = axis_normal(2, if c >= 0.0 { -1.0 } else { 1.0 });
        }

        // Smallest leaving t value, and the face it leaves through:
        let (mut t_leave, mut face_out) = if tx_max < ty_max {
            (tx_max, axis_normal(0, if a >= 0.0 { 1.0 } else { -1.0 }))
        } else {
            (ty_max, axis_normal(1, if b >= 0.0 { 1.0 } else { -1.0 }))
        };
        if tz_max < t_leave {
            t_leave = tz_max;
            face_out = axis_normal(2, if c >= 0.0 { 1.0 } else { -1.0 });
        }

        if t_enter < t_leave && t_leave > 0.0 {
            if t_enter > 0.0 {
                Some((t_enter, face_in))
            } else {
                Some((t_leave, face_out))
            }
        } else {
            None
        }
    }
}

impl SceneObject for AaBox {
    fn get_bound(&self) -> BBox3<f64> {
        BBox3::from_pnts(self.pmin, self.pmax)
    }

    fn intersect(&self, ray: Ray<f64>) -> Option<f64> {
        self.intersect_with_normal(ray).map(|(t, _)| t)
    }

    /// Recovers the face from the hit point: whichever face plane the point
    /// sits closest to supplies the outward normal.
    fn normal_at(&self, p: Vec3<f64>) -> Vec3<f64> {
        let mut best = f64::INFINITY;
        let mut normal = Vec3::zero();

        for axis in 0..3 {
            let to_min = (p[axis] - self.pmin[axis]).abs();
            if to_min < best {
                best = to_min;
                normal = axis_normal(axis, -1.0);
            }
            let to_max = (p[axis] - self.pmax[axis]).abs();
            if to_max < best {
                best = to_max;
                normal = axis_normal(axis, 1.0);
            }
        }

        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> AaBox {
        AaBox::new(
            Vec3 {
                x: -1.0,
                y: -1.0,
                z: -1.0,
            },
            Vec3 {
                x: 1.0,
                y: 1.0,
                z: 1.0,
            },
        )
    }

    #[test]
    fn entry_face_and_normal() {
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
        let (t, n) = unit_box().intersect_with_normal(ray).unwrap();
        assert!((t - 4.0).abs() < 1e-9);
        assert!((n.z - 1.0).abs() < 1e-9);

        // normal_at agrees with the tracked face:
        let at = unit_box().normal_at(ray.point_at(t));
        assert!((at.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn inside_origin_reports_exit_face() {
        let ray = Ray::new(
            Vec3::zero(),
            Vec3 {
                x: -1.0,
                y: 0.0,
                z: 0.0,
            },
        );
        let (t, n) = unit_box().intersect_with_normal(ray).unwrap();
        assert!((t - 1.0).abs() < 1e-9);
        assert!((n.x + 1.0).abs() < 1e-9);
    }

    #[test]
    fn miss_and_behind_rejected() {
        let miss = Ray::new(
            Vec3 {
                x: 5.0,
                y: 0.0,
                z: 5.0,
            },
            Vec3 {
                x: 0.0,
                y: 0.0,
                z: -1.0,
            },
        );
        assert!(unit_box().intersect(miss).is_none());

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
        assert!(unit_box().intersect(behind).is_none());
    }

    #[test]
    fn oblique_entry_picks_latest_slab() {
        // Coming in at a diagonal toward the +x face:
        let ray = Ray::new(
            Vec3 {
                x: 5.0,
                y: 0.5,
                z: 0.0,
            },
            Vec3 {
                x: -1.0,
                y: -0.1,
                z: 0.0,
            },
        );
        let (_, n) = unit_box().intersect_with_normal(ray).unwrap();
        assert!((n.x - 1.0).abs() < 1e-9);
    }
}

use crate::math::ray::Ray;
use crate::math::vector::Vec3;

use num_traits::Float;

/// An axis-aligned bounding box.
///
/// A freshly constructed box is seeded with infinite corners so that any
/// union resolves it; such a transient empty box must be combined with at
/// least one point or box before it is used for queries.
#[derive(Clone, Copy, Debug)]
pub struct BBox3<T: Copy> {
    pub pmin: Vec3<T>,
    pub pmax: Vec3<T>,
}

pub type BBox3d = BBox3<f64>;

impl<T: Float + Copy> BBox3<T> {
    pub fn new() -> Self {
        BBox3 {
            pmin: Vec3 {
                x: T::infinity(),
                y: T::infinity(),
                z: T::infinity(),
            },
            pmax: Vec3 {
                x: -T::infinity(),
                y: -T::infinity(),
                z: -T::infinity(),
            },
        }
    }

    pub fn from_pnts(pmin: Vec3<T>, pmax: Vec3<T>) -> Self {
        BBox3 { pmin, pmax }
    }

    /// Componentwise union with another box:
    pub fn combine_bnd(self, o: BBox3<T>) -> Self {
        BBox3 {
            pmin: self.pmin.min(o.pmin),
            pmax: self.pmax.max(o.pmax),
        }
    }

    /// Extends the box just enough to contain the given point:
    pub fn combine_pnt(self, p: Vec3<T>) -> Self {
        BBox3 {
            pmin: self.pmin.min(p),
            pmax: self.pmax.max(p),
        }
    }

    pub fn centroid(self) -> Vec3<T> {
        let two = T::one() + T::one();
        (self.pmin + self.pmax).scale(T::one() / two)
    }

    pub fn diagonal(self) -> Vec3<T> {
        self.pmax - self.pmin
    }

    /// Strict interior test, used to detect rays that start inside a
    /// structure's bound:
    pub fn inside(self, p: Vec3<T>) -> bool {
        p.x > self.pmin.x
            && p.x < self.pmax.x
            && p.y > self.pmin.y
            && p.y < self.pmax.y
            && p.z > self.pmin.z
            && p.z < self.pmax.z
    }

    /// Pushes every face of the box outward by `eps`:
    pub fn inflate(self, eps: T) -> Self {
        BBox3 {
            pmin: Vec3 {
                x: self.pmin.x - eps,
                y: self.pmin.y - eps,
                z: self.pmin.z - eps,
            },
            pmax: Vec3 {
                x: self.pmax.x + eps,
                y: self.pmax.y + eps,
                z: self.pmax.z + eps,
            },
        }
    }
}

impl BBox3<f64> {
    /// Slab test. Returns the entry distance of the ray, or the exit
    /// distance when the origin sits inside the box.
    ///
    /// A direction component of exactly zero divides to a signed infinity,
    /// and the `a >= 0` branch then orders the slab so the axis becomes an
    /// always-true or always-false interval on its own. That behavior is
    /// load-bearing; do not special-case zero components away.
    pub fn intersect(&self, ray: Ray<f64>) -> Option<f64> {
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

        // Largest entering and smallest exiting t values:
        let t0 = tx_min.max(ty_min).max(tz_min);
        let t1 = tx_max.min(ty_max).min(tz_max);

        if t0 < t1 && t1 > 0.0 {
            Some(if t0 >= 0.0 { t0 } else { t1 })
        } else {
            None
        }
    }
}

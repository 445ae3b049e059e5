pub mod aa_box;
pub mod plane;
pub mod sphere;
pub mod triangle;

pub use self::aa_box::AaBox;
pub use self::plane::Plane;
pub use self::sphere::Sphere;
pub use self::triangle::Triangle;

use crate::math::bbox::BBox3;
use crate::math::ray::Ray;
use crate::math::vector::Vec3;

/// Geometry epsilon: bounding boxes get inflated by this on every face, and
/// the plane test refuses hits closer than this to avoid self-intersection.
pub const EPSILON: f64 = 1.0e-4;

/// Below this, a Moller-Trumbore determinant counts as a parallel (or
/// degenerate) ray/triangle pair.
pub const DET_EPSILON: f64 = 1.0e-8;

/// What a closest-hit query reports back: the hit point and its parametric
/// distance along the query ray.
#[derive(Clone, Copy, Debug)]
pub struct Interaction {
    pub p: Vec3<f64>,
    pub t: f64,
}

/// A trait for anything the acceleration structures can index and intersect.
///
/// The structures clone objects into their own internal ordering, so for a
/// scene that keeps ownership of its primitives a SceneObject can simply be
/// a reference to one of them.
pub trait SceneObject: Clone {
    fn get_bound(&self) -> BBox3<f64>;

    /// The split/sort key for spatial construction:
    fn get_centroid(&self) -> Vec3<f64> {
        self.get_bound().centroid()
    }

    /// The nearest forward hit distance along the ray, if any. Degenerate
    /// geometry never hits; it is not an error.
    fn intersect(&self, ray: Ray<f64>) -> Option<f64>;

    /// Outward surface normal at a point on the object's surface.
    fn normal_at(&self, p: Vec3<f64>) -> Vec3<f64>;
}

impl<'a, T: SceneObject> SceneObject for &'a T {
    fn get_bound(&self) -> BBox3<f64> {
        (**self).get_bound()
    }

    fn get_centroid(&self) -> Vec3<f64> {
        (**self).get_centroid()
    }

    fn intersect(&self, ray: Ray<f64>) -> Option<f64> {
        (**self).intersect(ray)
    }

    fn normal_at(&self, p: Vec3<f64>) -> Vec3<f64> {
        (**self).normal_at(p)
    }
}

/// The closed set of primitive kinds the tracer handles.
#[derive(Clone, Debug)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
    Plane(Plane),
    AaBox(AaBox),
}

impl SceneObject for Primitive {
    fn get_bound(&self) -> BBox3<f64> {
        match self {
            Primitive::Sphere(s) => s.get_bound(),
            Primitive::Triangle(t) => t.get_bound(),
            Primitive::Plane(p) => p.get_bound(),
            Primitive::AaBox(b) => b.get_bound(),
        }
    }

    fn get_centroid(&self) -> Vec3<f64> {
        match self {
            Primitive::Sphere(s) => s.get_centroid(),
            Primitive::Triangle(t) => t.get_centroid(),
            Primitive::Plane(p) => p.get_centroid(),
            Primitive::AaBox(b) => b.get_centroid(),
        }
    }

    fn intersect(&self, ray: Ray<f64>) -> Option<f64> {
        match self {
            Primitive::Sphere(s) => s.intersect(ray),
            Primitive::Triangle(t) => t.intersect(ray),
            Primitive::Plane(p) => p.intersect(ray),
            Primitive::AaBox(b) => b.intersect(ray),
        }
    }

    fn normal_at(&self, p: Vec3<f64>) -> Vec3<f64> {
        match self {
            Primitive::Sphere(s) => s.normal_at(p),
            Primitive::Triangle(t) => t.normal_at(p),
            Primitive::Plane(pl) => pl.normal_at(p),
            Primitive::AaBox(b) => b.normal_at(p),
        }
    }
}

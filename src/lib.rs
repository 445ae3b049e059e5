//! Ray/scene-intersection core for a Whitted-style ray tracer: per-primitive
//! intersection tests plus two interchangeable acceleration structures over
//! them, a bounding-volume hierarchy and a uniform spatial grid.
//!
//! Both structures are built once per scene and are read-only afterwards;
//! every query is self-contained, so independent rays may be traced against
//! one structure from as many threads as you like.

pub mod accel;
pub mod geometry;
pub mod math;

pub use accel::{Accelerator, AcceleratorKind, Grid, BVH};
pub use geometry::{AaBox, Interaction, Plane, Primitive, SceneObject, Sphere, Triangle};
pub use math::bbox::BBox3;
pub use math::ray::Ray;
pub use math::vector::Vec3;

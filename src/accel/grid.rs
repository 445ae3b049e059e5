use crate::geometry::{Interaction, SceneObject, EPSILON};
use crate::math::bbox::BBox3;
use crate::math::ray::Ray;

use num_traits::clamp;

/// A uniform spatial grid over a set of scene objects.
///
/// The scene bound is carved into `nx * ny * nz` cells; each cell holds the
/// indices of every object whose bound overlaps it (an object spanning
/// several cells appears in each one, on purpose). Traversal walks the
/// cells along the ray with 3D digital-differential stepping.
pub struct Grid<O: SceneObject> {
    objects: Vec<O>,
    cells: Vec<Vec<u32>>,
    bound: BBox3<f64>,
    nx: i32,
    ny: i32,
    nz: i32,
}

// Per-ray stepping state for the Amanatides & Woo walk. The stop indices
// are checked right after every step, which is what keeps the flattened
// cell index in range without any late bounds checks.
struct Walk {
    ix: i32,
    iy: i32,
    iz: i32,
    dtx: f64,
    dty: f64,
    dtz: f64,
    tx_next: f64,
    ty_next: f64,
    tz_next: f64,
    ix_step: i32,
    iy_step: i32,
    iz_step: i32,
    ix_stop: i32,
    iy_stop: i32,
    iz_stop: i32,
}

fn cell_coord(v: f64, min: f64, max: f64, n: i32) -> i32 {
    clamp((v - min) * n as f64 / (max - min), 0.0, (n - 1) as f64) as i32
}

impl<O: SceneObject> Grid<O> {
    /// Multiplier on the cell-density heuristic; bigger means more, smaller
    /// cells for the same scene.
    pub const DEFAULT_DENSITY_FACTOR: f64 = 2.0;

    pub fn new(objects: &[O]) -> Self {
        Self::with_density(objects, Self::DEFAULT_DENSITY_FACTOR)
    }

    /// An empty object sequence builds successfully; every query against it
    /// reports no hit.
    pub fn with_density(objects: &[O], density_factor: f64) -> Self {
        if objects.is_empty() {
            return Grid {
                objects: Vec::new(),
                cells: Vec::new(),
                bound: BBox3::new(),
                nx: 0,
                ny: 0,
                nz: 0,
            };
        }

        let bound = objects
            .iter()
            .fold(BBox3::new(), |bound, object| {
                bound.combine_bnd(object.get_bound())
            })
            .inflate(EPSILON);

        // Resolution heuristic: s is objects per unit of length, from the
        // scene's object density:
        let w = bound.diagonal();
        let s = (objects.len() as f64 / (w.x * w.y * w.z)).powf(1.0 / 3.0);
        let nx = (density_factor * w.x * s) as i32 + 1;
        let ny = (density_factor * w.y * s) as i32 + 1;
        let nz = (density_factor * w.z * s) as i32 + 1;

        let mut cells = vec![Vec::new(); (nx * ny * nz) as usize];

        // Insert every object into each cell its bound overlaps:
        for (index, object) in objects.iter().enumerate() {
            let ob = object.get_bound();

            let ixmin = cell_coord(ob.pmin.x, bound.pmin.x, bound.pmax.x, nx);
            let iymin = cell_coord(ob.pmin.y, bound.pmin.y, bound.pmax.y, ny);
            let izmin = cell_coord(ob.pmin.z, bound.pmin.z, bound.pmax.z, nz);
            let ixmax = cell_coord(ob.pmax.x, bound.pmin.x, bound.pmax.x, nx);
            let iymax = cell_coord(ob.pmax.y, bound.pmin.y, bound.pmax.y, ny);
            let izmax = cell_coord(ob.pmax.z, bound.pmin.z, bound.pmax.z, nz);

            for iz in izmin..=izmax {
                for iy in iymin..=iymax {
                    for ix in ixmin..=ixmax {
                        cells[(ix + nx * iy + nx * ny * iz) as usize].push(index as u32);
                    }
                }
            }
        }

        Grid {
            objects: objects.to_vec(),
            cells,
            bound,
            nx,
            ny,
            nz,
        }
    }

    pub fn get_bound(&self) -> BBox3<f64> {
        self.bound
    }

    pub fn resolution(&self) -> (i32, i32, i32) {
        (self.nx, self.ny, self.nz)
    }

    pub fn get_objects(&self) -> &[O] {
        &self.objects
    }

    // Setup for the Amanatides & Woo walk: the starting cell, the ray
    // parameter increment per cell on each axis, and the first boundary
    // crossing parameters. None when the ray misses the grid entirely.
    fn init_traverse(&self, ray: Ray<f64>) -> Option<Walk> {
        let (ox, oy, oz) = (ray.org.x, ray.org.y, ray.org.z);
        let (dx, dy, dz) = (ray.dir.x, ray.dir.y, ray.dir.z);
        let p0 = self.bound.pmin;
        let p1 = self.bound.pmax;

        let a = 1.0 / dx;
        let (tx_min, tx_max) = if a >= 0.0 {
            ((p0.x - ox) * a, (p1.x - ox) * a)
        } else {
            ((p1.x - ox) * a, (p0.x - ox) * a)
        };

        let b = 1.0 / dy;
        let (ty_min, ty_max) = if b >= 0.0 {
            ((p0.y - oy) * b, (p1.y - oy) * b)
        } else {
            ((p1.y - oy) * b, (p0.y - oy) * b)
        };

        let c = 1.0 / dz;
        let (tz_min, tz_max) = if c >= 0.0 {
            ((p0.z - oz) * c, (p1.z - oz) * c)
        } else {
            ((p1.z - oz) * c, (p0.z - oz) * c)
        };

        let t0 = tx_min.max(ty_min).max(tz_min);
        let t1 = tx_max.min(ty_max).min(tz_max);

        // No overlap, or the grid is entirely behind the origin:
        if t0 > t1 || t1 < 0.0 {
            return None;
        }

        // The starting cell comes from the origin itself when the ray
        // starts inside the grid, and from the entry point otherwise:
        let (ix, iy, iz) = if self.bound.inside(ray.org) {
            (
                cell_coord(ox, p0.x, p1.x, self.nx),
                cell_coord(oy, p0.y, p1.y, self.ny),
                cell_coord(oz, p0.z, p1.z, self.nz),
            )
        } else {
            let p = ray.point_at(t0);
            (
                cell_coord(p.x, p0.x, p1.x, self.nx),
                cell_coord(p.y, p0.y, p1.y, self.ny),
                cell_coord(p.z, p0.z, p1.z, self.nz),
            )
        };

        // Ray parameter increments per cell on each axis:
        let dtx = (tx_max - tx_min) / self.nx as f64;
        let dty = (ty_max - ty_min) / self.ny as f64;
        let dtz = (tz_max - tz_min) / self.nz as f64;

        let (mut tx_next, ix_step, ix_stop) = if dx > 0.0 {
            (tx_min + (ix + 1) as f64 * dtx, 1, self.nx)
        } else {
            (tx_min + (self.nx - ix) as f64 * dtx, -1, -1)
        };
        if dx == 0.0 {
            tx_next = f64::INFINITY;
        }

        let (mut ty_next, iy_step, iy_stop) = if dy > 0.0 {
            (ty_min + (iy + 1) as f64 * dty, 1, self.ny)
        } else {
            (ty_min + (self.ny - iy) as f64 * dty, -1, -1)
        };
        if dy == 0.0 {
            ty_next = f64::INFINITY;
        }

        let (mut tz_next, iz_step, iz_stop) = if dz > 0.0 {
            (tz_min + (iz + 1) as f64 * dtz, 1, self.nz)
        } else {
            (tz_min + (self.nz - iz) as f64 * dtz, -1, -1)
        };
        if dz == 0.0 {
            tz_next = f64::INFINITY;
        }

        Some(Walk {
            ix,
            iy,
            iz,
            dtx,
            dty,
            dtz,
            tx_next,
            ty_next,
            tz_next,
            ix_step,
            iy_step,
            iz_step,
            ix_stop,
            iy_stop,
            iz_stop,
        })
    }

    fn cell(&self, walk: &Walk) -> &[u32] {
        &self.cells[(walk.ix + self.nx * walk.iy + self.nx * self.ny * walk.iz) as usize]
    }

    /// Closest-hit query.
    pub fn intersect(&self, ray: Ray<f64>) -> Option<(Interaction, &O)> {
        if self.objects.is_empty() {
            return None;
        }
        let mut walk = self.init_traverse(ray)?;

        let mut best_t = f64::INFINITY;
        let mut best: Option<&O> = None;

        loop {
            for &index in self.cell(&walk) {
                let object = &self.objects[index as usize];
                if let Some(t) = object.intersect(ray) {
                    if t < best_t {
                        best_t = t;
                        best = Some(object);
                    }
                }
            }

            // Step into whichever neighbor the ray reaches first. A running
            // best nearer than that boundary can no longer be beaten by any
            // farther cell, so it is the answer:
            if walk.tx_next < walk.ty_next && walk.tx_next < walk.tz_next {
                if best_t < walk.tx_next {
                    break;
                }
                walk.tx_next += walk.dtx;
                walk.ix += walk.ix_step;
                if walk.ix == walk.ix_stop {
                    return None;
                }
            } else if walk.ty_next < walk.tz_next {
                if best_t < walk.ty_next {
                    break;
                }
                walk.ty_next += walk.dty;
                walk.iy += walk.iy_step;
                if walk.iy == walk.iy_stop {
                    return None;
                }
            } else {
                if best_t < walk.tz_next {
                    break;
                }
                walk.tz_next += walk.dtz;
                walk.iz += walk.iz_step;
                if walk.iz == walk.iz_stop {
                    return None;
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

    /// Shadow query: the direction's magnitude is the distance to the
    /// occlusion target. Any hit strictly nearer than that answers true.
    pub fn intersect_test(&self, ray: Ray<f64>) -> bool {
        if self.objects.is_empty() {
            return false;
        }

        let target_t = ray.dir.length();
        if target_t == 0.0 {
            return false;
        }
        let ray = Ray::new(ray.org, ray.dir.scale(1.0 / target_t));

        let mut walk = match self.init_traverse(ray) {
            Some(walk) => walk,
            None => return false,
        };

        loop {
            for &index in self.cell(&walk) {
                if let Some(t) = self.objects[index as usize].intersect(ray) {
                    if t < target_t {
                        return true;
                    }
                }
            }

            if walk.tx_next < walk.ty_next && walk.tx_next < walk.tz_next {
                walk.tx_next += walk.dtx;
                walk.ix += walk.ix_step;
                if walk.ix == walk.ix_stop {
                    return false;
                }
            } else if walk.ty_next < walk.tz_next {
                walk.ty_next += walk.dty;
                walk.iy += walk.iy_step;
                if walk.iy == walk.iy_stop {
                    return false;
                }
            } else {
                walk.tz_next += walk.dtz;
                walk.iz += walk.iz_step;
                if walk.iz == walk.iz_stop {
                    return false;
                }
            }
        }
    }
}

use lucent::{Accelerator, AcceleratorKind, Primitive, Ray, Sphere, Vec3};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use simple_error::{bail, SimpleResult};

use std::env;
use std::time::Instant;

const RES: usize = 512;
const NUM_THREADS: usize = 4;

fn main() -> SimpleResult<()> {
    let args: Vec<String> = env::args().collect();
    let kind = match args.get(1).map(|arg| arg.as_str()) {
        None | Some("bvh") => AcceleratorKind::BVH,
        Some("grid") => AcceleratorKind::Grid,
        Some("linear") => AcceleratorKind::Linear,
        Some(other) => bail!("unknown accelerator '{}' (want bvh, grid or linear)", other),
    };

    let objects = random_scene(0x9e3779b9);
    println!("scene: {} objects, accelerator: {:?}", objects.len(), kind);

    let now = Instant::now();
    let accel = Accelerator::build(kind, &objects);
    println!("build: {} us", now.elapsed().as_micros());

    // A fan of primary rays from a fixed eye, split row-wise over scoped
    // threads. The structure is read-only, so the queries share it freely;
    // all per-ray state lives on each thread's own stack.
    let eye = Vec3 {
        x: 13.0,
        y: 2.0,
        z: 3.0,
    };
    let forward = (Vec3::zero() - eye).normalize();
    let right = forward
        .cross(Vec3 {
            x: 0.0,
            y: 1.0,
            z: 0.0,
        })
        .normalize();
    let up = right.cross(forward);

    let accel_ref = &accel;
    let now = Instant::now();
    let hits: usize = crossbeam::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(NUM_THREADS);
        for thread_id in 0..NUM_THREADS {
            handles.push(scope.spawn(move |_| {
                let rows = (thread_id * RES / NUM_THREADS)..((thread_id + 1) * RES / NUM_THREADS);
                let mut hits = 0usize;
                for y in rows {
                    for x in 0..RES {
                        let u = (x as f64 + 0.5) / RES as f64 - 0.5;
                        let v = (y as f64 + 0.5) / RES as f64 - 0.5;
                        let dir = forward + right.scale(u) + up.scale(v);
                        if accel_ref.intersect(Ray::new(eye, dir)).is_some() {
                            hits += 1;
                        }
                    }
                }
                hits
            }));
        }
        handles.into_iter().map(|handle| handle.join().unwrap()).sum()
    })
    .unwrap();
    println!(
        "primary: {}/{} rays hit, {} ms",
        hits,
        RES * RES,
        now.elapsed().as_millis()
    );

    // Shadow batch: from a point just above each small sphere toward the
    // light, with the distance encoded in the direction's magnitude.
    let light = Vec3 {
        x: 7.0,
        y: 10.0,
        z: -5.0,
    };
    let now = Instant::now();
    let mut occluded = 0usize;
    let mut total = 0usize;
    for object in &objects {
        if let Primitive::Sphere(sphere) = object {
            let from = sphere.center
                + Vec3 {
                    x: 0.0,
                    y: sphere.radius + 1.0e-3,
                    z: 0.0,
                };
            if accel.intersect_test(Ray::new(from, light - from)) {
                occluded += 1;
            }
            total += 1;
        }
    }
    println!(
        "shadow: {}/{} points occluded, {} us",
        occluded,
        total,
        now.elapsed().as_micros()
    );

    Ok(())
}

// The usual random sphere field: one big ground sphere and a jittered
// lattice of small ones, with a few large ones in the middle.
fn random_scene(seed: u64) -> Vec<Primitive> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut objects = Vec::new();

    objects.push(Primitive::Sphere(Sphere::new(
        Vec3 {
            x: 0.0,
            y: -1000.0,
            z: 0.0,
        },
        1000.0,
    )));

    for a in -5..5 {
        for b in -5..5 {
            let center = Vec3 {
                x: a as f64 + 0.9 * rng.gen_range(0.0, 1.0),
                y: 0.2,
                z: b as f64 + 0.9 * rng.gen_range(0.0, 1.0),
            };
            let clear_of = center
                - Vec3 {
                    x: 4.0,
                    y: 0.2,
                    z: 0.0,
                };
            if clear_of.length() > 0.9 {
                objects.push(Primitive::Sphere(Sphere::new(center, 0.2)));
            }
        }
    }

    objects.push(Primitive::Sphere(Sphere::new(
        Vec3 {
            x: 0.0,
            y: 1.0,
            z: 0.0,
        },
        1.0,
    )));
    objects.push(Primitive::Sphere(Sphere::new(
        Vec3 {
            x: -4.0,
            y: 1.0,
            z: 0.0,
        },
        1.0,
    )));
    objects.push(Primitive::Sphere(Sphere::new(
        Vec3 {
            x: 4.0,
            y: 1.0,
            z: 0.0,
        },
        1.0,
    )));

    objects
}

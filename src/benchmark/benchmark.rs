use std::time::Instant;

use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::advance_slice;
use crate::simulation::partition::partition_for;
use crate::simulation::states::{Body, NVec3, System};

// Deterministic body cloud, no rand needed
fn body_cloud(n: usize) -> Vec<Body> {
    let mut bodies = Vec::with_capacity(n);

    for i in 0..n {
        let i_f = i as f64;
        bodies.push(Body {
            x: NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            ),
            v: NVec3::zeros(),
            m: 1.0,
        });
    }

    bodies
}

pub fn bench_gravity() {
    // Different system sizes to test
    let ns = [200, 400, 800, 1600, 3200, 6400];

    let gravity = NewtonianGravity { g: 0.1, eps2: 1e-4 };

    for n in ns {
        let bodies = body_cloud(n);
        let mut out = NVec3::zeros();

        // Warm up
        for i in 0..n {
            out += gravity.net_force(i, &bodies);
        }

        let t0 = Instant::now();
        for i in 0..n {
            out += gravity.net_force(i, &bodies);
        }
        let dt = t0.elapsed().as_secs_f64();

        println!("N = {n:5}, net_force sweep = {dt:8.6} s  (checksum {:.3e})", out.norm());
    }
}

pub fn bench_step() {
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let gravity = NewtonianGravity { g: 0.1, eps2: 1e-4 };

    for n in ns {
        let sys = System {
            bodies: body_cloud(n),
            t: 0.0,
        };
        let full = partition_for(n, 1, 0);

        // Warm up
        let _ = advance_slice(&sys, &full, &gravity, 0.001);

        let t0 = Instant::now();
        let updated = advance_slice(&sys, &full, &gravity, 0.001);
        let dt = t0.elapsed().as_secs_f64();

        println!(
            "N = {n:5}, one full step = {dt:8.6} s  (checksum {:.3e})",
            updated[0].x.norm()
        );
    }
}

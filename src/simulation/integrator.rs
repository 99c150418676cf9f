//! Fixed-step time integrator for the local partition
//!
//! Semi-implicit Euler: velocity is kicked from the accumulated force
//! first, then the position drifts with the *updated* velocity. One
//! force evaluation per body per step.

use crate::simulation::forces::NewtonianGravity;
use crate::simulation::partition::Partition;
use crate::simulation::states::{Body, System};

/// Advance the bodies in `partition` by one step of size `dt`.
///
/// Reads only the pre-step state in `sys`: every force evaluation sees
/// the same globally consistent array, regardless of how far other
/// indices have progressed. The updated bodies are returned as a fresh
/// scratch slice; the shared array is untouched until the exchange
/// publishes the slice.
///
/// Cost is O(|partition| * N), the dominant term and the reason the
/// index space is partitioned at all.
pub fn advance_slice(
    sys: &System,
    partition: &Partition,
    gravity: &NewtonianGravity,
    dt: f64,
) -> Vec<Body> {
    let mut updated = Vec::with_capacity(partition.len());

    for i in partition.indices() {
        let f = gravity.net_force(i, &sys.bodies);

        let mut b = sys.bodies[i].clone();

        // Kick: v_n+1 = v_n + (F / m) * dt
        b.v += f / b.m * dt;

        // Drift with the updated velocity: x_n+1 = x_n + v_n+1 * dt
        b.x += b.v * dt;

        updated.push(b);
    }

    updated
}

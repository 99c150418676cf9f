//! Newtonian gravity force kernel
//!
//! Direct pairwise summation with softening. The kernel is stateless:
//! each pair contribution is accumulated into a caller-held force
//! vector, and `net_force` sums contributions over the whole body array
//! for a single index.

use crate::simulation::states::{Body, NVec3};

/// Softened Newtonian gravity (direct N² sum).
///
/// `eps2` is added to the squared separation before inverting, which
/// bounds the force magnitude as two bodies approach coincidence.
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravity {
    pub g: f64,    // gravitational constant
    pub eps2: f64, // softening epsilon^2
}

impl NewtonianGravity {
    /// Accumulate into `out` the force body `a` experiences from `b`.
    ///
    /// r points from a to b, so the contribution pulls a toward b:
    ///   F = g * m_a * m_b / (|r|^2 + eps2) * r_hat
    pub fn accumulate(&self, a: &Body, b: &Body, out: &mut NVec3) {
        let r = b.x - a.x;

        // Softened squared separation: d2 = |r|^2 + eps2
        let d2 = r.norm_squared() + self.eps2;

        // 1 / |r_soft|
        let inv_d = d2.sqrt().recip();

        // Magnitude g m_a m_b / d2, direction r / |r_soft|
        let f = self.g * a.m * b.m / d2;

        *out += f * inv_d * r;
    }

    /// Net force on body `i` from every other body in `bodies`.
    ///
    /// Sums in ascending j order so the result is bit-identical no
    /// matter which rank owns index i.
    pub fn net_force(&self, i: usize, bodies: &[Body]) -> NVec3 {
        let mut out = NVec3::zeros();
        let a = &bodies[i];
        for (j, b) in bodies.iter().enumerate() {
            if j != i {
                self.accumulate(a, b, &mut out);
            }
        }
        out
    }
}

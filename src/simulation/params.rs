//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - system size and step count (`n_bodies`, `steps`),
//! - integration step size `h0`,
//! - softening and gravitational constant (`eps2`, `g`),
//! - random seed for the initial conditions

#[derive(Debug, Clone)]
pub struct Parameters {
    pub n_bodies: usize, // number of bodies N
    pub steps: u64,      // number of integration steps
    pub h0: f64,         // step size
    pub eps2: f64,       // softening
    pub g: f64,          // gravitational constant
    pub seed: u64,       // deterministic seed
}

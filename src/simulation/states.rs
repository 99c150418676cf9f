//! Core state types for the N-body simulation.
//!
//! Defines the replicated body array every process holds:
//! - `Body`   – one point mass (position, velocity, mass)
//! - `System` – the full list of bodies plus the simulation clock `t`
//!
//! `Body` derives `Serialize`/`Deserialize` so slices of it can travel
//! through the cluster collectives; the wire layout is seven `f64` words.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub type NVec3 = Vector3<f64>;

/// One point mass. The index of a body in `System::bodies` is its
/// permanent identity for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub m: f64,   // mass
}

/// Full simulation state as one process sees it.
///
/// Between synchronizations a process only has authoritative values for
/// the indices it owns; after each exchange all processes hold identical
/// copies again.
#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // collection of bodies, index = identity
    pub t: f64,            // time
}

impl System {
    /// Empty system at t = 0. Non-root ranks start here and are filled
    /// by the initial broadcast.
    pub fn empty() -> Self {
        Self {
            bodies: Vec::new(),
            t: 0.0,
        }
    }
}

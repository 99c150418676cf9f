//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`InitialConfig`]    – settings for the generated initial conditions
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! Process topology (rank, world size, root address) deliberately does
//! not live here: it is supplied per-process by the execution
//! environment through the command line, while the scenario file is
//! shared verbatim by every rank.
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! parameters:
//!   n_bodies: 100         # system size N
//!   steps: 100            # number of integration steps
//!   h0: 0.01              # fixed step size
//!   eps2: 1.0e-6          # softening epsilon^2
//!   G: 6.6743e-11         # gravitational constant
//!   seed: 42              # deterministic seed
//!
//! initial:
//!   extent: 1000.0        # positions drawn uniformly from [0, extent)^3
//!   mass: 1.0e20          # uniform body mass
//! ```
//!
//! The scenario builder maps this configuration into the runtime
//! representation consumed by the driver.

use serde::Deserialize;

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub n_bodies: usize, // number of bodies N
    pub steps: u64,      // number of integration steps
    pub h0: f64,         // time step size
    pub eps2: f64,       // softening - prevent singular forces at very small separations
    #[serde(rename = "G")]
    pub g: f64, // gravitational constant
    pub seed: u64,       // deterministic seed to make runs reproducable
}

/// Settings for the generated initial conditions
#[derive(Deserialize, Debug, Clone)]
pub struct InitialConfig {
    pub extent: f64, // side length of the initial position cube
    pub mass: f64,   // uniform mass assigned to every body
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub parameters: ParametersConfig, // global numerical and physical parameters
    pub initial: InitialConfig,       // initial-condition generator settings
}

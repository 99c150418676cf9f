//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime
//! bundle consumed by the driver:
//! - numerical parameters (`Parameters`)
//! - initial-condition settings (`InitialCondition`)
//! - system state (`System`, empty until INIT/BROADCAST)
//!
//! Body generation itself happens on rank 0 only, inside the driver's
//! INIT phase, through `random_bodies`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::ScenarioConfig;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3, System};

/// Settings for the generated initial conditions.
///
/// Positions are drawn uniformly from `[0, extent)` per axis, velocities
/// start at zero and every body carries the same mass.
#[derive(Debug, Clone)]
pub struct InitialCondition {
    pub extent: f64, // side length of the position cube
    pub mass: f64,   // uniform body mass
}

/// Runtime bundle for one simulation run.
///
/// Every rank builds an identical `Scenario` from the same YAML file;
/// only rank 0 ever fills `system.bodies` locally, the rest receive
/// them through the initial broadcast.
pub struct Scenario {
    pub parameters: Parameters,
    pub initial: InitialCondition,
    pub system: System,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Self {
        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            n_bodies: p_cfg.n_bodies,
            steps: p_cfg.steps,
            h0: p_cfg.h0,
            eps2: p_cfg.eps2,
            g: p_cfg.g,
            seed: p_cfg.seed,
        };

        let i_cfg = cfg.initial;
        let initial = InitialCondition {
            extent: i_cfg.extent,
            mass: i_cfg.mass,
        };

        Self {
            parameters,
            initial,
            system: System::empty(),
        }
    }
}

/// Generate the initial body array: exactly `params.n_bodies` bodies,
/// deterministic for a given seed.
pub fn random_bodies(params: &Parameters, initial: &InitialCondition) -> Vec<Body> {
    let mut rng = StdRng::seed_from_u64(params.seed);

    (0..params.n_bodies)
        .map(|_| Body {
            x: NVec3::new(
                rng.gen_range(0.0..initial.extent),
                rng.gen_range(0.0..initial.extent),
                rng.gen_range(0.0..initial.extent),
            ),
            v: NVec3::zeros(),
            m: initial.mass,
        })
        .collect()
}

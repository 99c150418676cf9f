//! Simulation driver: owns the step loop
//!
//! Phase order on every rank:
//! INIT (rank 0 generates the bodies) → BROADCAST (everyone receives
//! the identical initial array) → STEP_LOOP (local compute + global
//! exchange, exactly `steps` times) → DONE (report elapsed wall time).
//!
//! A collective failure anywhere aborts the run with the failing phase
//! named in the error context; no partial results are produced.

use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};

use crate::cluster::Communicator;
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::advance_slice;
use crate::simulation::partition::partition_for;
use crate::simulation::scenario::{random_bodies, Scenario};

/// What each rank knows at DONE. Formatting and printing are the
/// caller's business.
#[derive(Debug)]
pub struct RunReport {
    pub rank: usize,
    pub steps: u64,
    pub elapsed: Duration,
}

/// Run the scenario to completion on this rank.
///
/// The wall clock brackets the step loop only; setup and broadcast are
/// excluded, so per-rank timings are comparable.
pub fn run<C: Communicator>(scenario: &mut Scenario, comm: &mut C) -> Result<RunReport> {
    let rank = comm.rank();
    let world_size = comm.world_size();
    let params = scenario.parameters.clone();
    let n = params.n_bodies;

    // INIT: only the root produces bodies, everyone else waits on the
    // broadcast with an empty array.
    if rank == 0 {
        scenario.system.bodies = random_bodies(&params, &scenario.initial);
        log::info!(
            "rank 0 initialized {n} bodies (seed {}) for {} ranks",
            params.seed,
            world_size
        );
    }

    // BROADCAST: terminal precondition for the step loop; after this
    // barrier every rank holds a bit-identical array.
    comm.broadcast_bodies(&mut scenario.system.bodies)
        .context("initial broadcast failed")?;
    ensure!(
        scenario.system.bodies.len() == n,
        "broadcast delivered {} bodies, scenario expects {n}",
        scenario.system.bodies.len()
    );
    log::debug!("rank {rank} received initial body data");

    let partition = partition_for(n, world_size, rank);
    log::debug!(
        "rank {rank} owns indices [{}, {})",
        partition.start,
        partition.end
    );

    let gravity = NewtonianGravity {
        g: params.g,
        eps2: params.eps2,
    };

    let start = Instant::now();

    for step in 0..params.steps {
        // LOCAL_COMPUTE: scratch copy only, pre-step reads throughout.
        let updated = advance_slice(&scenario.system, &partition, &gravity, params.h0);

        // GLOBAL_SYNC: barrier; step k+1 never sees partial step-k state.
        comm.exchange_slice(step, &updated, &partition, &mut scenario.system.bodies)
            .with_context(|| format!("collective exchange failed at step {step}"))?;

        scenario.system.t += params.h0;

        if rank == 0 && step % 10 == 0 {
            log::info!("completed step {step} of {}", params.steps);
        }
    }

    Ok(RunReport {
        rank,
        steps: params.steps,
        elapsed: start.elapsed(),
    })
}

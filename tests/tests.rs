use gravnet::simulation::driver::run;
use gravnet::simulation::forces::NewtonianGravity;
use gravnet::simulation::integrator::advance_slice;
use gravnet::simulation::params::Parameters;
use gravnet::simulation::partition::partition_for;
use gravnet::simulation::scenario::{random_bodies, InitialCondition, Scenario};
use gravnet::simulation::states::{Body, NVec3, System};
use gravnet::cluster::{ClusterError, LocalCluster, TcpCluster, Topology};

use std::net::TcpListener;
use std::thread;

/// Build a simple 2-body system separated along the x-axis
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> System {
    let b1 = Body {
        x: NVec3::zeros(),
        v: NVec3::zeros(),
        m: m1,
    };
    let b2 = Body {
        x: NVec3::new(dist, 0.0, 0.0),
        v: NVec3::zeros(),
        m: m2,
    };
    System {
        bodies: vec![b1, b2],
        t: 0.0,
    }
}

/// Default physics parameters for tests (natural units)
pub fn test_params(n_bodies: usize, steps: u64) -> Parameters {
    Parameters {
        n_bodies,
        steps,
        h0: 0.001,
        eps2: 1e-2,
        g: 1.0,
        seed: 7,
    }
}

pub fn test_initial() -> InitialCondition {
    InitialCondition {
        extent: 10.0,
        mass: 1.0,
    }
}

/// Run a full simulation on an in-process cluster of `world_size` ranks
/// and return the final body array (asserting every rank ends with the
/// same one).
pub fn run_world(params: &Parameters, initial: &InitialCondition, world_size: usize) -> Vec<Body> {
    let comms = LocalCluster::spawn(world_size).unwrap();

    let handles: Vec<_> = comms
        .into_iter()
        .map(|mut comm| {
            let params = params.clone();
            let initial = initial.clone();
            thread::spawn(move || {
                let mut scenario = Scenario {
                    parameters: params,
                    initial,
                    system: System::empty(),
                };
                run(&mut scenario, &mut comm).unwrap();
                scenario.system.bodies
            })
        })
        .collect();

    let mut results: Vec<Vec<Body>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for other in &results[1..] {
        assert_eq!(other, &results[0], "ranks disagree on the final state");
    }
    results.swap_remove(0)
}

// ==================================================================================
// Partition tests
// ==================================================================================

#[test]
fn partition_tiles_index_space() {
    for n in [0usize, 1, 2, 10, 100, 101] {
        for world_size in [1usize, 2, 3, 7, 16] {
            let parts: Vec<_> = (0..world_size)
                .map(|rank| partition_for(n, world_size, rank))
                .collect();

            assert_eq!(parts[0].start, 0);
            for pair in parts.windows(2) {
                assert_eq!(
                    pair[0].end, pair[1].start,
                    "gap or overlap for n={n}, world={world_size}"
                );
            }
            assert_eq!(parts[world_size - 1].end, n);
        }
    }
}

#[test]
fn partition_remainder_goes_to_last_rank() {
    let parts: Vec<_> = (0..4).map(|rank| partition_for(10, 4, rank)).collect();

    assert_eq!(parts[0].len(), 2);
    assert_eq!(parts[1].len(), 2);
    assert_eq!(parts[2].len(), 2);
    assert_eq!(parts[3].len(), 4, "last rank absorbs the remainder");
}

#[test]
fn partition_more_ranks_than_bodies() {
    // 8 ranks, 3 bodies: everyone but the last rank gets an empty range
    let parts: Vec<_> = (0..8).map(|rank| partition_for(3, 8, rank)).collect();

    for p in &parts[..7] {
        assert!(p.is_empty(), "expected empty range, got {p:?}");
    }
    assert_eq!(parts[7].start, 0);
    assert_eq!(parts[7].end, 3);
}

// ==================================================================================
// Gravity tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let sys = two_body_system(1.3, 2.0, 3.0);
    let gravity = NewtonianGravity { g: 1.0, eps2: 0.0 };

    let mut f_ab = NVec3::zeros();
    let mut f_ba = NVec3::zeros();
    gravity.accumulate(&sys.bodies[0], &sys.bodies[1], &mut f_ab);
    gravity.accumulate(&sys.bodies[1], &sys.bodies[0], &mut f_ba);

    let net = f_ab + f_ba;
    assert!(net.norm() < 1e-12, "forces not equal and opposite: {net:?}");
}

#[test]
fn gravity_inverse_square_law() {
    let sys_r = two_body_system(1.0, 1.0, 1.0);
    let sys_2r = two_body_system(2.0, 1.0, 1.0);
    let gravity = NewtonianGravity { g: 1.0, eps2: 0.0 };

    let f_r = gravity.net_force(0, &sys_r.bodies);
    let f_2r = gravity.net_force(0, &sys_2r.bodies);

    let ratio = f_r.norm() / f_2r.norm();
    assert!((ratio - 4.0).abs() < 1e-12, "Expected ~4x, got {ratio}");
}

#[test]
fn gravity_softening_prevents_blowup() {
    let sys = two_body_system(1e-9, 1.0, 1.0);
    let gravity = NewtonianGravity { g: 1.0, eps2: 0.1 };

    let f = gravity.net_force(0, &sys.bodies);
    assert!(f.norm().is_finite());
    assert!(f.norm() < 1e2, "softening failed; force too large: {}", f.norm());
}

#[test]
fn single_body_feels_no_force() {
    let bodies = vec![Body {
        x: NVec3::new(1.0, 2.0, 3.0),
        v: NVec3::zeros(),
        m: 5.0,
    }];
    let gravity = NewtonianGravity { g: 1.0, eps2: 1e-6 };

    // The kernel is never invoked on the body itself
    assert_eq!(gravity.net_force(0, &bodies), NVec3::zeros());
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn two_bodies_attract_symmetrically() {
    // Two 1e20 kg masses 10 apart on the x-axis, one step of dt = 0.01
    let sys = two_body_system(10.0, 1e20, 1e20);
    let gravity = NewtonianGravity {
        g: 6.6743e-11,
        eps2: 1e-6,
    };
    let full = partition_for(2, 1, 0);

    let updated = advance_slice(&sys, &full, &gravity, 0.01);

    assert!(updated[0].v.x > 0.0, "left body should accelerate right");
    assert!(updated[1].v.x < 0.0, "right body should accelerate left");
    assert!(
        (updated[0].v.x + updated[1].v.x).abs() < updated[0].v.x.abs() * 1e-12,
        "velocity changes should be equal and opposite"
    );

    // Pull stays on the x-axis
    assert_eq!(updated[0].v.y, 0.0);
    assert_eq!(updated[0].v.z, 0.0);
    assert!(updated[0].x.x > sys.bodies[0].x.x);
    assert!(updated[1].x.x < sys.bodies[1].x.x);
}

#[test]
fn single_body_remains_stationary() {
    let params = test_params(1, 25);
    let initial = test_initial();

    let expected = random_bodies(&params, &initial);
    let final_bodies = run_world(&params, &initial, 1);

    assert_eq!(final_bodies[0].v, NVec3::zeros());
    assert_eq!(final_bodies[0].x, expected[0].x, "lone body drifted");
}

#[test]
fn momentum_approximately_conserved() {
    let params = test_params(3, 50);
    let initial = test_initial();

    let final_bodies = run_world(&params, &initial, 1);

    // Zero initial velocities, so total momentum starts at exactly zero
    let total: NVec3 = final_bodies
        .iter()
        .map(|b| b.m * b.v)
        .fold(NVec3::zeros(), |acc, p| acc + p);

    assert!(
        total.norm() < 1e-9,
        "momentum drifted from zero: {:?}",
        total
    );
}

// ==================================================================================
// Cluster tests
// ==================================================================================

#[test]
fn identical_runs_are_bit_identical() {
    let params = test_params(12, 20);
    let initial = test_initial();

    let first = run_world(&params, &initial, 2);
    let second = run_world(&params, &initial, 2);

    assert_eq!(first, second);
}

#[test]
fn world_size_does_not_change_results() {
    let params = test_params(13, 20);
    let initial = test_initial();

    let alone = run_world(&params, &initial, 1);
    let spread = run_world(&params, &initial, 3);

    assert_eq!(alone, spread, "partitioned run diverged from serial run");
}

#[test]
fn empty_partitions_are_no_ops() {
    // More ranks than bodies: idle ranks still hold the final state
    let params = test_params(2, 10);
    let initial = test_initial();

    let alone = run_world(&params, &initial, 1);
    let degenerate = run_world(&params, &initial, 4);

    assert_eq!(alone, degenerate);
}

#[test]
fn tcp_cluster_matches_local_cluster() {
    let params = test_params(10, 5);
    let initial = test_initial();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let worker = {
        let params = params.clone();
        let initial = initial.clone();
        thread::spawn(move || {
            let mut comm = TcpCluster::worker(addr, 1, 2).unwrap();
            let mut scenario = Scenario {
                parameters: params,
                initial,
                system: System::empty(),
            };
            run(&mut scenario, &mut comm).unwrap();
            scenario.system.bodies
        })
    };

    let root = {
        let params = params.clone();
        let initial = initial.clone();
        thread::spawn(move || {
            let mut comm = TcpCluster::root_on(listener, 2).unwrap();
            let mut scenario = Scenario {
                parameters: params,
                initial,
                system: System::empty(),
            };
            run(&mut scenario, &mut comm).unwrap();
            scenario.system.bodies
        })
    };

    let root_bodies = root.join().unwrap();
    let worker_bodies = worker.join().unwrap();
    assert_eq!(root_bodies, worker_bodies, "TCP ranks disagree");

    let local_bodies = run_world(&params, &initial, 2);
    assert_eq!(root_bodies, local_bodies, "TCP and local transports diverge");
}

#[test]
fn invalid_topologies_are_rejected() {
    assert!(matches!(
        Topology::new(0, 0),
        Err(ClusterError::Topology { .. })
    ));
    assert!(matches!(
        Topology::new(3, 3),
        Err(ClusterError::Topology { .. })
    ));
    assert!(Topology::new(2, 3).is_ok());
}
